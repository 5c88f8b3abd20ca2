use serde::{Deserialize, Serialize};

use super::defaults::*;

/// Text completion backend config (OpenAI-compatible chat completions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token. Falls back to `AYESHA_API_KEY` when empty.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub temperature: f32,
    /// HTTP client timeout. A timeout surfaces as an ordinary backend failure.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: 0.0,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Image generation config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// When false, image requests fall through to conversation.
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_image_endpoint")]
    pub endpoint: String,
    /// Bearer token. Falls back to `AYESHA_IMAGE_API_KEY`, then the provider key.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_image_model")]
    pub model: String,
    #[serde(default = "default_image_size")]
    pub width: u32,
    #[serde(default = "default_image_size")]
    pub height: u32,
    /// Command prefix; the prompt is everything after it.
    #[serde(default = "default_image_command")]
    pub command: String,
    /// Lowercase phrases that turn the whole message into an image prompt.
    #[serde(default = "default_image_triggers")]
    pub triggers: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_image_endpoint(),
            api_key: String::new(),
            model: default_image_model(),
            width: default_image_size(),
            height: default_image_size(),
            command: default_image_command(),
            triggers: default_image_triggers(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
