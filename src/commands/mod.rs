//! Administrative bot commands, handled without any backend call.


use ayesha_core::{message::OutboundAction, persona::PersonaDescriptor};
use ayesha_memory::Store;
use tracing::{error, info, warn};

/// Grouped context for command execution.
pub struct CommandContext<'a> {
    pub store: &'a Store,
    pub persona: &'a PersonaDescriptor,
    pub guild_id: Option<u64>,
    pub author_id: u64,
    pub is_admin: bool,
}

/// Known bot commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `!setchannel <channel>`. `None` when the argument is missing or is
    /// not a channel reference.
    SetChannel(Option<u64>),
}

impl Command {
    /// Parse a command from message text. Returns `None` for anything that
    /// is not a known command.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        match parts.next()? {
            "!setchannel" => Some(Self::SetChannel(parts.next().and_then(parse_channel_ref))),
            _ => None,
        }
    }
}

/// Accept a channel mention (`<#123>`) or a bare channel id (`123`).
pub fn parse_channel_ref(arg: &str) -> Option<u64> {
    let id = arg
        .strip_prefix("<#")
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(arg);
    id.parse().ok()
}

/// Platform mention for a channel id.
pub fn channel_mention(channel_id: u64) -> String {
    format!("<#{channel_id}>")
}

/// Handle a command and return the actions to perform.
pub fn handle(cmd: Command, ctx: &CommandContext<'_>) -> Vec<OutboundAction> {
    match cmd {
        Command::SetChannel(target) => handle_set_channel(target, ctx),
    }
}

fn handle_set_channel(target: Option<u64>, ctx: &CommandContext<'_>) -> Vec<OutboundAction> {
    let Some(guild_id) = ctx.guild_id else {
        warn!("setchannel from {} outside a guild ignored", ctx.author_id);
        return Vec::new();
    };
    if !ctx.is_admin {
        warn!(
            "setchannel denied for {} in guild {guild_id}: not an administrator",
            ctx.author_id
        );
        return Vec::new();
    }
    let Some(channel_id) = target else {
        warn!("setchannel from {} without a valid channel", ctx.author_id);
        return Vec::new();
    };

    match ctx.store.set_allowed_channel(guild_id, channel_id) {
        Ok(()) => {
            info!("setchannel: guild {guild_id} → channel {channel_id}");
            vec![OutboundAction::send(format!(
                "{} will now reply only in {}",
                ctx.persona.name,
                channel_mention(channel_id)
            ))]
        }
        Err(e) => {
            error!("setchannel: failed to persist binding for guild {guild_id}: {e}");
            vec![OutboundAction::reply(format!(
                "Failed to save channel setting: {e}"
            ))]
        }
    }
}
