//! User facts and the substring fact extractor.
//!
//! Extraction is literal: for a rule with trigger `like`, the
//! value is the first whitespace-delimited token after the first `"like "`
//! in the text. Punctuation stays attached ("pizza.") and any use of the
//! word triggers, including "alike" or "like" as a preposition.

use super::{snapshot, Store, MEMORY_DOC};
use ayesha_core::{
    error::AyeshaError,
    persona::{ExtractionPolicy, FactKind, FactSchema},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Facts learned about one user. Only fields with evidence are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl UserFacts {
    pub fn get(&self, kind: FactKind) -> Option<&str> {
        match kind {
            FactKind::Likes => self.likes.as_deref(),
            FactKind::Location => self.location.as_deref(),
        }
    }

    /// Overwrite a fact. Returns `true` if the value changed.
    pub fn set(&mut self, kind: FactKind, value: &str) -> bool {
        let slot = match kind {
            FactKind::Likes => &mut self.likes,
            FactKind::Location => &mut self.location,
        };
        if slot.as_deref() == Some(value) {
            return false;
        }
        *slot = Some(value.to_string());
        true
    }
}

/// Derive facts from `text` according to `schema`, in rule order.
///
/// A trigger with no following token (e.g. text ending in "I like") yields
/// nothing for that rule.
pub fn extract_facts(schema: &FactSchema, text: &str) -> Vec<(FactKind, String)> {
    let mut found = Vec::new();
    for rule in &schema.rules {
        if rule.trigger.is_empty() || !text.contains(rule.trigger.as_str()) {
            continue;
        }
        let needle = format!("{} ", rule.trigger);
        let value = text
            .split_once(needle.as_str())
            .and_then(|(_, rest)| rest.split_whitespace().next());
        match value {
            Some(v) => found.push((rule.fact, v.to_string())),
            None => debug!("trigger '{}' present without a value", rule.trigger),
        }
    }
    found
}

impl Store {
    /// Facts recorded for `user_id`, if any.
    pub fn facts(&self, user_id: u64) -> Option<UserFacts> {
        self.lock().memory.get(&user_id.to_string()).cloned()
    }

    /// Number of users with recorded facts.
    pub fn user_count(&self) -> usize {
        self.lock().memory.len()
    }

    /// Overwrite one fact for `user_id` and persist the full memory map.
    pub fn set_fact(&self, user_id: u64, kind: FactKind, value: &str) -> Result<(), AyeshaError> {
        let pending = {
            let mut state = self.lock();
            state
                .memory
                .entry(user_id.to_string())
                .or_default()
                .set(kind, value);
            let revision = state.next_revision();
            snapshot(MEMORY_DOC, revision, &state.memory)?
        };
        self.write(pending)
    }

    /// Run the extractor over a message and record what it finds.
    ///
    /// With [`ExtractionPolicy::Always`] the memory map is persisted on every
    /// call. With [`ExtractionPolicy::OnTrigger`] messages without any
    /// trigger are skipped and the map is persisted only when a value
    /// changed. Returns the derived facts.
    pub fn learn(
        &self,
        user_id: u64,
        text: &str,
        schema: &FactSchema,
        policy: ExtractionPolicy,
    ) -> Result<Vec<(FactKind, String)>, AyeshaError> {
        if policy == ExtractionPolicy::OnTrigger && !schema.is_triggered(text) {
            return Ok(Vec::new());
        }

        let found = extract_facts(schema, text);
        let pending = {
            let mut state = self.lock();
            let mut changed = false;
            if !found.is_empty() {
                let entry = state.memory.entry(user_id.to_string()).or_default();
                for (kind, value) in &found {
                    changed |= entry.set(*kind, value);
                }
            }

            if changed {
                info!("learned about {user_id}: {found:?}");
            }
            if changed || policy == ExtractionPolicy::Always {
                let revision = state.next_revision();
                Some(snapshot(MEMORY_DOC, revision, &state.memory)?)
            } else {
                None
            }
        };
        if let Some(pending) = pending {
            self.write(pending)?;
        }
        Ok(found)
    }
}
