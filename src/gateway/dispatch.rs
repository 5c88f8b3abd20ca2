//! Backend calls: text completion and image generation.

use super::Gateway;
use ayesha_core::message::{IncomingMessage, OutboundAction};
use tracing::{error, info};

impl Gateway {
    /// Compose the prompt and ask the completion backend for a reply.
    pub(super) async fn complete_text(
        &self,
        incoming: &IncomingMessage,
        concise: bool,
    ) -> Vec<OutboundAction> {
        let context = self.memory.build_context(
            incoming.author_id,
            &incoming.text,
            concise,
            &self.persona,
            &self.facts.rules,
        );

        match self.provider.complete(&context).await {
            Ok(completion) => {
                info!(
                    "[{}] replied via {} in {}ms",
                    incoming.channel,
                    completion.metadata.provider_used,
                    completion.metadata.processing_time_ms
                );
                vec![OutboundAction::reply(completion.text)]
            }
            Err(e) => {
                error!("completion failed for {}: {e}", incoming.author_id);
                vec![OutboundAction::reply(format!("Error fetching response: {e}"))]
            }
        }
    }

    /// Generate images for `prompt`; one file action per image, in order.
    pub(super) async fn generate_images(&self, prompt: &str) -> Vec<OutboundAction> {
        let Some(generator) = &self.images else {
            return Vec::new();
        };

        match generator.generate(prompt).await {
            Ok(paths) if paths.is_empty() => {
                error!("image backend returned no images");
                vec![OutboundAction::reply(
                    "Error generating image: no images returned",
                )]
            }
            Ok(paths) => {
                info!("generated {} image(s) via {}", paths.len(), generator.name());
                paths
                    .into_iter()
                    .map(|path| OutboundAction::SendFile { path })
                    .collect()
            }
            Err(e) => {
                error!("image generation failed: {e}");
                vec![OutboundAction::reply(format!("Error generating image: {e}"))]
            }
        }
    }
}
