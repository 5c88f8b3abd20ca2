use serde::{Deserialize, Serialize};

use super::defaults::*;

/// Channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChannelConfig {
    pub console: Option<ConsoleConfig>,
}

/// Console channel config: every stdin line becomes a message from a fixed
/// author in a fixed guild channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_console_id")]
    pub guild_id: u64,
    #[serde(default = "default_console_id")]
    pub channel_id: u64,
    #[serde(default = "default_console_author")]
    pub author_id: u64,
    /// Whether the console author may run administrative commands.
    #[serde(default = "default_true")]
    pub admin: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            guild_id: default_console_id(),
            channel_id: default_console_id(),
            author_id: default_console_author(),
            admin: true,
        }
    }
}
