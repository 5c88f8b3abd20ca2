use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// An incoming message event from a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub id: Uuid,
    /// Channel name (e.g. "console").
    pub channel: String,
    /// Guild (server) the message was posted in. `None` for direct messages.
    pub guild_id: Option<u64>,
    /// Platform channel the message was posted in.
    pub channel_id: u64,
    /// Platform-specific user ID of the author.
    pub author_id: u64,
    /// Human-readable author name.
    pub author_name: Option<String>,
    /// Whether the bot itself wrote this message.
    #[serde(default)]
    pub author_is_self: bool,
    /// Whether the author holds administrator permission in the guild.
    #[serde(default)]
    pub is_admin: bool,
    /// Message text content.
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl IncomingMessage {
    /// Create a message with a fresh id and the current timestamp.
    pub fn new(
        channel: &str,
        guild_id: Option<u64>,
        channel_id: u64,
        author_id: u64,
        text: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel: channel.to_string(),
            guild_id,
            channel_id,
            author_id,
            author_name: None,
            author_is_self: false,
            is_admin: false,
            text: text.to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Short single-line preview for logs.
    pub fn preview(&self) -> String {
        if self.text.chars().count() > 60 {
            let truncated: String = self.text.chars().take(60).collect();
            format!("{truncated}...")
        } else {
            self.text.clone()
        }
    }
}

/// What the engine wants the channel to do in response to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OutboundAction {
    /// Answer the triggering message with text.
    Reply { text: String },
    /// Post a plain text message in the channel (never threaded).
    Send { text: String },
    /// Upload a file to the channel.
    SendFile { path: PathBuf },
}

impl OutboundAction {
    pub fn reply(text: impl Into<String>) -> Self {
        Self::Reply { text: text.into() }
    }

    pub fn send(text: impl Into<String>) -> Self {
        Self::Send { text: text.into() }
    }

    /// Text carried by this action, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Reply { text } | Self::Send { text } => Some(text),
            Self::SendFile { .. } => None,
        }
    }
}

/// An outgoing text message handed to a channel for delivery.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    /// Platform channel to post in.
    pub channel_id: u64,
    /// When set, the message is delivered as a reply to this inbound message.
    #[serde(default)]
    pub reply_to: Option<Uuid>,
}

/// Metadata about how a completion was generated.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MessageMetadata {
    /// Which provider produced this response.
    pub provider_used: String,
    /// Token count (if available from the provider).
    pub tokens_used: Option<u64>,
    /// Wall-clock processing time in milliseconds.
    pub processing_time_ms: u64,
    /// Model identifier (if applicable).
    pub model: Option<String>,
}

/// Text returned by the completion backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
    pub metadata: MessageMetadata,
}
