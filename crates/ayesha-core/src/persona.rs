//! Persona and fact schema: the parameters that distinguish one bot
//! variant from another while the engine stays the same.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Static description of the assistant's voice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaDescriptor {
    /// Name used in administrative confirmations.
    #[serde(default = "default_name")]
    pub name: String,
    /// System-prompt introduction.
    #[serde(default = "default_intro")]
    pub intro: String,
    /// Cosmetic status lines rotated by the gateway.
    #[serde(default = "default_statuses")]
    pub statuses: Vec<String>,
    /// Lowercase phrases asking for a picture of the bot itself.
    /// Empty disables the refusal branch.
    #[serde(default = "default_self_portrait_triggers")]
    pub self_portrait_triggers: Vec<String>,
    /// Fixed reply for self-portrait requests.
    #[serde(default = "default_refusal")]
    pub refusal: String,
    #[serde(default)]
    pub reply_style: ReplyStyle,
    /// Seconds between status rotations. 0 disables rotation.
    #[serde(default = "default_status_interval")]
    pub status_interval_secs: u64,
}

impl Default for PersonaDescriptor {
    fn default() -> Self {
        Self {
            name: default_name(),
            intro: default_intro(),
            statuses: default_statuses(),
            self_portrait_triggers: default_self_portrait_triggers(),
            refusal: default_refusal(),
            reply_style: ReplyStyle::default(),
            status_interval_secs: default_status_interval(),
        }
    }
}

impl PersonaDescriptor {
    /// Whether `text` asks for a picture of the bot (case-insensitive).
    pub fn is_self_portrait_request(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.self_portrait_triggers
            .iter()
            .any(|t| lower.contains(&t.to_lowercase()))
    }

    /// Pick a random status line, if any are configured.
    pub fn random_status(&self) -> Option<&str> {
        self.statuses
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
    }
}

/// How conversational answers are delivered.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStyle {
    /// Threaded reply to the triggering message.
    #[default]
    Reply,
    /// Plain post in the channel.
    Channel,
}

/// A fact the extractor knows how to learn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactKind {
    Likes,
    Location,
}

impl FactKind {
    /// Stand-in used in the prompt when the fact is unknown.
    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::Likes => "nothing specific",
            Self::Location => "an unknown location",
        }
    }

    /// Predicate phrase for the personalization clause.
    pub fn phrase(&self, value: &str) -> String {
        match self {
            Self::Likes => format!("likes {value}"),
            Self::Location => format!("is from {value}"),
        }
    }
}

/// One `{trigger, fact}` pair: when `trigger` appears in a message, the
/// token after `"{trigger} "` becomes the value of `fact`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactRule {
    pub trigger: String,
    pub fact: FactKind,
}

impl FactRule {
    pub fn new(trigger: &str, fact: FactKind) -> Self {
        Self {
            trigger: trigger.to_string(),
            fact,
        }
    }
}

/// Ordered list of fact rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactSchema {
    pub rules: Vec<FactRule>,
}

impl Default for FactSchema {
    fn default() -> Self {
        Self {
            rules: vec![
                FactRule::new("like", FactKind::Likes),
                FactRule::new("from", FactKind::Location),
            ],
        }
    }
}

impl FactSchema {
    /// Schema that only learns what the user likes.
    pub fn likes_only() -> Self {
        Self {
            rules: vec![FactRule::new("like", FactKind::Likes)],
        }
    }

    /// Whether any rule's trigger occurs in `text`.
    pub fn is_triggered(&self, text: &str) -> bool {
        self.rules.iter().any(|r| text.contains(r.trigger.as_str()))
    }

    /// Distinct fact kinds in rule order.
    pub fn kinds(&self) -> Vec<FactKind> {
        let mut kinds = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            if !kinds.contains(&rule.fact) {
                kinds.push(rule.fact);
            }
        }
        kinds
    }
}

/// When the fact extractor runs for a message in the bound channel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionPolicy {
    /// Every message, before classification; memory is persisted each time.
    #[default]
    Always,
    /// Only messages containing a trigger; persisted only on change.
    OnTrigger,
}

fn default_name() -> String {
    "Ayesha".to_string()
}

fn default_intro() -> String {
    "You are Tina, a friendly and supportive girlfriend chatbot. You speak in a warm and \
     caring tone, always encouraging and uplifting. Keep your responses light-hearted and \
     engaging."
        .to_string()
}

fn default_statuses() -> Vec<String> {
    vec![
        "Chatting with you! \u{1f60a}".to_string(),
        "Learning new things! \u{1f4da}".to_string(),
        "Feeling chatty! \u{1f5e8}\u{fe0f}".to_string(),
        "Just hanging out! \u{1f60e}".to_string(),
    ]
}

fn default_self_portrait_triggers() -> Vec<String> {
    vec![
        "image of yourself".to_string(),
        "send me a picture of you".to_string(),
        "show me you".to_string(),
    ]
}

fn default_refusal() -> String {
    "Aw, sweetie, I'm a chatbot, I don't have a physical body, but I'm always here for you \
     in spirit! \u{1f495}"
        .to_string()
}

fn default_status_interval() -> u64 {
    20
}
