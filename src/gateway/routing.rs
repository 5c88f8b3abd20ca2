//! Message classification. Pure: no I/O, no state mutation.

use crate::commands::Command;
use ayesha_core::{config::ImageConfig, message::IncomingMessage, persona::PersonaDescriptor};
use ayesha_memory::is_concise;

/// What the gateway should do with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Produce no output.
    Ignore,
    /// Administrative command.
    Command(Command),
    /// Request for a picture of the bot; answered with the fixed refusal.
    SelfPortrait,
    /// Image generation with the given prompt.
    Image { prompt: String },
    /// Ordinary text completion.
    Conversation { concise: bool },
}

/// Decide the route for `incoming`.
///
/// Order: self messages, commands (recognized in any channel), the channel
/// gate, self-portrait refusals, image requests, then conversation.
/// `image_rules` is `None` when image generation is disabled.
pub fn classify(
    incoming: &IncomingMessage,
    bound: bool,
    persona: &PersonaDescriptor,
    image_rules: Option<&ImageConfig>,
) -> Route {
    if incoming.author_is_self {
        return Route::Ignore;
    }
    if let Some(cmd) = Command::parse(&incoming.text) {
        return Route::Command(cmd);
    }
    if !bound {
        return Route::Ignore;
    }
    if persona.is_self_portrait_request(&incoming.text) {
        return Route::SelfPortrait;
    }
    if let Some(prompt) = image_rules.and_then(|rules| image_prompt(&incoming.text, rules)) {
        return Route::Image { prompt };
    }
    Route::Conversation {
        concise: is_concise(&incoming.text),
    }
}

/// Prompt for an image request, or `None` if `text` is not one.
///
/// The command form passes everything after `"{command} "`; a trigger
/// phrase passes the whole message.
fn image_prompt(text: &str, rules: &ImageConfig) -> Option<String> {
    if !rules.command.is_empty() {
        if let Some(rest) = text.strip_prefix(&format!("{} ", rules.command)) {
            return Some(rest.to_string());
        }
    }
    let lower = text.to_lowercase();
    rules
        .triggers
        .iter()
        .filter(|t| !t.is_empty())
        .any(|t| lower.contains(&t.to_lowercase()))
        .then(|| text.to_string())
}
