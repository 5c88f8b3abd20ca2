//! Per-guild allowed channel bindings.

use super::{snapshot, Store, ALLOWED_CHANNELS_DOC};
use ayesha_core::error::AyeshaError;
use tracing::info;

impl Store {
    /// Channel the bot may converse in for `guild_id`.
    pub fn allowed_channel(&self, guild_id: u64) -> Option<u64> {
        self.lock()
            .allowed_channels
            .get(&guild_id.to_string())
            .copied()
    }

    /// Whether `channel_id` is the bound channel of `guild_id`.
    /// Messages outside a guild are never allowed.
    pub fn is_allowed(&self, guild_id: Option<u64>, channel_id: u64) -> bool {
        guild_id
            .and_then(|g| self.allowed_channel(g))
            .is_some_and(|bound| bound == channel_id)
    }

    /// Bind `guild_id` to `channel_id`, replacing any previous binding, and
    /// persist the full binding map.
    pub fn set_allowed_channel(&self, guild_id: u64, channel_id: u64) -> Result<(), AyeshaError> {
        let pending = {
            let mut state = self.lock();
            state
                .allowed_channels
                .insert(guild_id.to_string(), channel_id);
            let revision = state.next_revision();
            snapshot(ALLOWED_CHANNELS_DOC, revision, &state.allowed_channels)?
        };
        self.write(pending)?;
        info!("guild {guild_id} bound to channel {channel_id}");
        Ok(())
    }

    /// Number of guilds with a bound channel.
    pub fn binding_count(&self) -> usize {
        self.lock().allowed_channels.len()
    }
}
