use crate::{
    context::Context,
    error::AyeshaError,
    message::{Completion, IncomingMessage, OutgoingMessage},
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Text completion backend.
///
/// The engine only sees this trait; HTTP, retries, and authentication live
/// in the implementation.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Send the prompt pair to the backend and return the generated text.
    async fn complete(&self, context: &Context) -> Result<Completion, AyeshaError>;

    /// Check if the provider is reachable and configured.
    async fn is_available(&self) -> bool;
}

/// Image generation backend.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Generate images for `prompt` and return the saved artifact paths, in
    /// the order the backend produced them.
    async fn generate(&self, prompt: &str) -> Result<Vec<PathBuf>, AyeshaError>;
}

/// Messaging channel trait.
///
/// Every chat platform implements this trait to receive and send messages.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Start listening for incoming messages.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<IncomingMessage>, AyeshaError>;

    /// Deliver a text message.
    async fn send(&self, message: OutgoingMessage) -> Result<(), AyeshaError>;

    /// Upload a file to a platform channel.
    async fn send_file(&self, channel_id: u64, path: &Path) -> Result<(), AyeshaError>;

    /// Update the bot's visible status line.
    async fn set_presence(&self, _status: &str) -> Result<(), AyeshaError> {
        Ok(())
    }

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), AyeshaError>;
}
