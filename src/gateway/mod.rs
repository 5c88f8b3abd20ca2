//! Gateway: the event loop connecting channels, the state store, and the
//! completion/image backends.

mod dispatch;
mod pipeline;
mod routing;

#[cfg(test)]
mod tests;

use ayesha_core::{
    config::{FactsConfig, ImageConfig},
    message::{IncomingMessage, OutboundAction, OutgoingMessage},
    persona::{PersonaDescriptor, ReplyStyle},
    traits::{Channel, ImageGenerator, Provider},
};
use ayesha_memory::Store;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// The central gateway that routes messages between channels and backends.
pub struct Gateway {
    pub(super) provider: Arc<dyn Provider>,
    /// `None` when image generation is disabled.
    pub(super) images: Option<Arc<dyn ImageGenerator>>,
    pub(super) channels: HashMap<String, Arc<dyn Channel>>,
    pub(super) memory: Store,
    pub(super) persona: PersonaDescriptor,
    pub(super) facts: FactsConfig,
    pub(super) image_config: ImageConfig,
}

impl Gateway {
    /// Create a new gateway.
    pub fn new(
        provider: Arc<dyn Provider>,
        images: Option<Arc<dyn ImageGenerator>>,
        channels: HashMap<String, Arc<dyn Channel>>,
        memory: Store,
        persona: PersonaDescriptor,
        facts: FactsConfig,
        image_config: ImageConfig,
    ) -> Self {
        Self {
            provider,
            images,
            channels,
            memory,
            persona,
            facts,
            image_config,
        }
    }

    /// Run the main event loop until every channel closes or Ctrl-C.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        info!(
            "Ayesha gateway running | provider: {} | images: {} | channels: {}",
            self.provider.name(),
            self.images.as_ref().map_or("disabled", |g| g.name()),
            self.channels.keys().cloned().collect::<Vec<_>>().join(", "),
        );

        let (tx, mut rx) = mpsc::channel::<IncomingMessage>(256);

        for (name, channel) in &self.channels {
            let mut channel_rx = channel
                .start()
                .await
                .map_err(|e| anyhow::anyhow!("failed to start channel {name}: {e}"))?;
            let tx = tx.clone();
            let channel_name = name.clone();

            tokio::spawn(async move {
                while let Some(msg) = channel_rx.recv().await {
                    if tx.send(msg).await.is_err() {
                        info!("gateway receiver dropped, stopping {channel_name} forwarder");
                        break;
                    }
                }
            });

            info!("Channel started: {name}");
        }

        drop(tx);

        let status_handle = if self.persona.status_interval_secs > 0
            && !self.persona.statuses.is_empty()
        {
            let gw = self.clone();
            Some(tokio::spawn(async move {
                gw.status_loop().await;
            }))
        } else {
            None
        };

        // Each message runs in its own task; there is no per-user ordering.
        loop {
            tokio::select! {
                msg = rx.recv() => match msg {
                    Some(incoming) => {
                        let gw = self.clone();
                        tokio::spawn(async move {
                            gw.dispatch_message(incoming).await;
                        });
                    }
                    None => {
                        info!("All channels closed");
                        break;
                    }
                },
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        self.shutdown(status_handle).await;
        Ok(())
    }

    /// Handle one message and deliver the resulting actions.
    pub(super) async fn dispatch_message(&self, incoming: IncomingMessage) {
        let actions = self.handle_message(&incoming).await;
        self.deliver(&incoming, actions).await;
    }

    /// Hand each action to the channel the message came from.
    pub(super) async fn deliver(&self, incoming: &IncomingMessage, actions: Vec<OutboundAction>) {
        let Some(channel) = self.channels.get(&incoming.channel) else {
            if !actions.is_empty() {
                warn!("no channel named {} to deliver to", incoming.channel);
            }
            return;
        };

        for action in actions {
            let result = match action {
                OutboundAction::Reply { text } => {
                    let reply_to = match self.persona.reply_style {
                        ReplyStyle::Reply => Some(incoming.id),
                        ReplyStyle::Channel => None,
                    };
                    channel
                        .send(OutgoingMessage {
                            text,
                            channel_id: incoming.channel_id,
                            reply_to,
                        })
                        .await
                }
                OutboundAction::Send { text } => {
                    channel
                        .send(OutgoingMessage {
                            text,
                            channel_id: incoming.channel_id,
                            reply_to: None,
                        })
                        .await
                }
                OutboundAction::SendFile { path } => {
                    channel.send_file(incoming.channel_id, &path).await
                }
            };
            if let Err(e) = result {
                error!("failed to deliver to {}: {e}", incoming.channel);
            }
        }
    }

    /// Periodically push a random persona status to every channel.
    async fn status_loop(&self) {
        let mut interval =
            tokio::time::interval(Duration::from_secs(self.persona.status_interval_secs));
        loop {
            interval.tick().await;
            self.rotate_status().await;
        }
    }

    pub(super) async fn rotate_status(&self) {
        let Some(status) = self.persona.random_status() else {
            return;
        };
        for (name, channel) in &self.channels {
            if let Err(e) = channel.set_presence(status).await {
                warn!("failed to set presence on {name}: {e}");
            }
        }
    }

    /// Graceful shutdown: stop background tasks and channels.
    async fn shutdown(&self, status_handle: Option<tokio::task::JoinHandle<()>>) {
        info!("Shutting down...");

        if let Some(h) = status_handle {
            h.abort();
        }

        for (name, channel) in &self.channels {
            if let Err(e) = channel.stop().await {
                warn!("failed to stop channel {name}: {e}");
            }
        }

        info!("Shutdown complete.");
    }
}
