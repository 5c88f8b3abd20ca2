mod channels;
mod defaults;
mod providers;


pub use channels::*;
pub use providers::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::AyeshaError;
use crate::persona::{ExtractionPolicy, FactSchema, PersonaDescriptor};
use defaults::*;

/// Environment variable consulted when `provider.api_key` is empty.
pub const API_KEY_ENV: &str = "AYESHA_API_KEY";
/// Environment variable consulted when `image.api_key` is empty.
pub const IMAGE_API_KEY_ENV: &str = "AYESHA_IMAGE_API_KEY";

/// Top-level Ayesha configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ayesha: AyeshaConfig,
    #[serde(default)]
    pub persona: PersonaDescriptor,
    #[serde(default)]
    pub facts: FactsConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AyeshaConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AyeshaConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

impl AyeshaConfig {
    /// Expanded data directory.
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(shellexpand(&self.data_dir))
    }

    /// Where generated images are written.
    pub fn output_path(&self) -> PathBuf {
        self.data_path().join("output")
    }

    /// Where the log file lives.
    pub fn logs_path(&self) -> PathBuf {
        self.data_path().join("logs")
    }
}

/// Fact extraction settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactsConfig {
    #[serde(default)]
    pub policy: ExtractionPolicy,
    #[serde(default)]
    pub rules: FactSchema,
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

impl Config {
    /// Fill empty API keys from the environment.
    pub fn resolve_secrets(&mut self) {
        if self.provider.api_key.is_empty() {
            if let Ok(key) = std::env::var(API_KEY_ENV) {
                self.provider.api_key = key;
            }
        }
        if self.image.api_key.is_empty() {
            self.image.api_key = std::env::var(IMAGE_API_KEY_ENV)
                .unwrap_or_else(|_| self.provider.api_key.clone());
        }
    }
}

/// Parse configuration from TOML text.
pub fn parse(content: &str) -> Result<Config, AyeshaError> {
    toml::from_str(content).map_err(|e| AyeshaError::Config(format!("failed to parse config: {e}")))
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, AyeshaError> {
    let path = Path::new(path);
    if !path.exists() {
        info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| AyeshaError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    parse(&content)
}
