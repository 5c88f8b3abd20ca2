//! Console channel: stdin lines in, stdout lines out.
//!
//! Every input line becomes a message from the configured author in the
//! configured guild channel, so the whole engine can be driven locally.

use async_trait::async_trait;
use ayesha_core::{
    config::ConsoleConfig,
    error::AyeshaError,
    message::{IncomingMessage, OutgoingMessage},
    traits::Channel,
};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

pub struct ConsoleChannel {
    config: ConsoleConfig,
}

impl ConsoleChannel {
    pub fn new(config: ConsoleConfig) -> Self {
        Self { config }
    }

    /// Turn one input line into an inbound message. Blank lines are skipped.
    fn to_incoming(&self, line: &str) -> Option<IncomingMessage> {
        let text = line.trim_end_matches(['\r', '\n']);
        if text.trim().is_empty() {
            return None;
        }
        let mut msg = IncomingMessage::new(
            "console",
            Some(self.config.guild_id),
            self.config.channel_id,
            self.config.author_id,
            text,
        );
        msg.author_name = Some("console".to_string());
        msg.is_admin = self.config.admin;
        Some(msg)
    }

    async fn write_line(&self, line: &str) -> Result<(), AyeshaError> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(format!("{line}\n").as_bytes()).await?;
        stdout.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl Channel for ConsoleChannel {
    fn name(&self) -> &str {
        "console"
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingMessage>, AyeshaError> {
        let (tx, rx) = mpsc::channel(64);
        let channel = ConsoleChannel::new(self.config.clone());

        info!(
            "Console channel reading stdin as user {} in guild {} channel {}",
            self.config.author_id, self.config.guild_id, self.config.channel_id
        );

        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let Some(msg) = channel.to_incoming(&line) else {
                    continue;
                };
                if tx.send(msg).await.is_err() {
                    break;
                }
            }
            info!("console input closed");
        });

        Ok(rx)
    }

    async fn send(&self, message: OutgoingMessage) -> Result<(), AyeshaError> {
        let prefix = if message.reply_to.is_some() {
            "↳ "
        } else {
            ""
        };
        self.write_line(&format!("{prefix}{}", message.text)).await
    }

    async fn send_file(&self, _channel_id: u64, path: &Path) -> Result<(), AyeshaError> {
        self.write_line(&format!("[file] {}", path.display())).await
    }

    async fn set_presence(&self, status: &str) -> Result<(), AyeshaError> {
        debug!("console presence: {status}");
        Ok(())
    }

    async fn stop(&self) -> Result<(), AyeshaError> {
        info!("Console channel stopped");
        Ok(())
    }
}
