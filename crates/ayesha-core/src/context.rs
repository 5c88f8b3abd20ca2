use serde::{Deserialize, Serialize};

/// Prompt pair passed to the completion backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    /// Persona introduction plus the personalization clause.
    pub system_prompt: String,
    /// The user's message with the verbosity suffix appended.
    pub current_message: String,
}

/// A structured message for API-based providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    /// "system" or "user".
    pub role: String,
    /// The message content.
    pub content: String,
}

impl Context {
    pub fn new(system_prompt: &str, current_message: &str) -> Self {
        Self {
            system_prompt: system_prompt.to_string(),
            current_message: current_message.to_string(),
        }
    }

    /// Convert the context to the ordered `{role, content}` list sent to the
    /// backend: system message first, user message second.
    pub fn to_api_messages(&self) -> Vec<ApiMessage> {
        vec![
            ApiMessage {
                role: "system".to_string(),
                content: self.system_prompt.clone(),
            },
            ApiMessage {
                role: "user".to_string(),
                content: self.current_message.clone(),
            },
        ]
    }
}
