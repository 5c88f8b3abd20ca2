//! Message processing pipeline: the main handle_message flow.

use super::routing::{classify, Route};
use super::Gateway;
use crate::commands::{self, CommandContext};
use ayesha_core::message::{IncomingMessage, OutboundAction};
use tracing::{debug, info, warn};

impl Gateway {
    /// Process a single incoming message and return what to send back.
    ///
    /// An empty vector means the message produces no output.
    pub async fn handle_message(&self, incoming: &IncomingMessage) -> Vec<OutboundAction> {
        if incoming.author_is_self {
            return Vec::new();
        }

        info!(
            "[{}] {} says: {}",
            incoming.channel,
            incoming.author_name.as_deref().unwrap_or("unknown"),
            incoming.preview()
        );

        // --- 1. CHANNEL GATE ---
        let bound = self
            .memory
            .is_allowed(incoming.guild_id, incoming.channel_id);

        // --- 2. LEARN FACTS ---
        if bound {
            match self.memory.learn(
                incoming.author_id,
                &incoming.text,
                &self.facts.rules,
                self.facts.policy,
            ) {
                Ok(found) if !found.is_empty() => {
                    debug!("facts from {}: {found:?}", incoming.author_id)
                }
                Ok(_) => {}
                Err(e) => warn!("failed to persist facts for {}: {e}", incoming.author_id),
            }
        }

        // --- 3. CLASSIFY ---
        let image_rules = self.images.as_ref().map(|_| &self.image_config);
        let route = classify(incoming, bound, &self.persona, image_rules);

        // --- 4. DISPATCH ---
        match route {
            Route::Ignore => {
                debug!(
                    "ignoring message in channel {} (guild {:?})",
                    incoming.channel_id, incoming.guild_id
                );
                Vec::new()
            }
            Route::Command(cmd) => {
                let ctx = CommandContext {
                    store: &self.memory,
                    persona: &self.persona,
                    guild_id: incoming.guild_id,
                    author_id: incoming.author_id,
                    is_admin: incoming.is_admin,
                };
                commands::handle(cmd, &ctx)
            }
            Route::SelfPortrait => vec![OutboundAction::reply(self.persona.refusal.clone())],
            Route::Image { prompt } => self.generate_images(&prompt).await,
            Route::Conversation { concise } => self.complete_text(incoming, concise).await,
        }
    }
}
