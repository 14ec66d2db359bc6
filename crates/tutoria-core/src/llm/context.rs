//! Conversation context shaping for provider calls.
//!
//! The generator never sends the full stored history. It keeps a fixed-size
//! suffix (the most recent [`HISTORY_WINDOW`] messages) and converts all but
//! the last of those into provider turns; the last one is sent as the new
//! user turn.

use tutoria_types::llm::{Message, MessageRole, ProviderTurn, TurnRole};

/// Number of most recent messages the provider gets to see.
pub const HISTORY_WINDOW: usize = 30;

/// Return the most recent `HISTORY_WINDOW` messages, oldest first.
///
/// Truncation is lossy: earlier messages are invisible to the model.
pub fn window(history: &[Message]) -> &[Message] {
    let start = history.len().saturating_sub(HISTORY_WINDOW);
    &history[start..]
}

/// Map a stored role onto the provider's turn role.
pub fn turn_role(role: MessageRole) -> TurnRole {
    match role {
        MessageRole::User => TurnRole::User,
        MessageRole::Assistant => TurnRole::Model,
    }
}

/// Convert every windowed message except the last into provider turns.
pub fn to_provider_turns(windowed: &[Message]) -> Vec<ProviderTurn> {
    let Some((_, prior)) = windowed.split_last() else {
        return Vec::new();
    };

    prior
        .iter()
        .map(|m| ProviderTurn {
            role: turn_role(m.role),
            content: m.content.clone(),
        })
        .collect()
}
