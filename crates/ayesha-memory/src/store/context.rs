//! Prompt composition: persona intro, personalization clause, and the
//! length-based verbosity suffix.

use super::{Store, UserFacts};
use ayesha_core::{
    context::Context,
    persona::{FactKind, FactSchema, PersonaDescriptor},
};

/// Messages shorter than this many characters get the terse suffix.
pub const CONCISE_THRESHOLD: usize = 50;

pub const CONCISE_SUFFIX: &str = "Respond in one line and keep it simple. \u{1f60a}";

pub const DETAILED_SUFFIX: &str =
    "You can be a bit more detailed here, but keep it light. \u{1f604}";

/// Whether `text` is short enough for a one-line answer.
pub fn is_concise(text: &str) -> bool {
    text.chars().count() < CONCISE_THRESHOLD
}

/// "You know this person likes X and is from Y." Absent facts use the
/// kind's placeholder, so the clause is always complete.
fn personalization(facts: Option<&UserFacts>, schema: &FactSchema) -> String {
    let mut kinds = schema.kinds();
    if kinds.is_empty() {
        kinds.push(FactKind::Likes);
    }
    let phrases: Vec<String> = kinds
        .iter()
        .map(|kind| {
            let value = facts
                .and_then(|f| f.get(*kind))
                .unwrap_or_else(|| kind.placeholder());
            kind.phrase(value)
        })
        .collect();
    format!("You know this person {}.", phrases.join(" and "))
}

impl Store {
    /// Build the system/user prompt pair for a conversational turn.
    pub fn build_context(
        &self,
        user_id: u64,
        text: &str,
        concise: bool,
        persona: &PersonaDescriptor,
        schema: &FactSchema,
    ) -> Context {
        let facts = self.facts(user_id);
        let system_prompt = format!(
            "{} {}",
            persona.intro,
            personalization(facts.as_ref(), schema)
        );
        let suffix = if concise {
            CONCISE_SUFFIX
        } else {
            DETAILED_SUFFIX
        };
        Context::new(&system_prompt, &format!("{text}\n{suffix}"))
    }
}
