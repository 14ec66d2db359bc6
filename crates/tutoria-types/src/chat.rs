//! Conversation and message types for Tutoria.
//!
//! A conversation belongs to one user and holds an ordered, append-only
//! list of messages. Messages are immutable once persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Re-export MessageRole from llm module (it's used in both chat and llm contexts).
pub use crate::llm::MessageRole;

use crate::llm::Message;

/// A tutoring conversation owned by a single user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub user_id: String,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: u32,
}

/// A persisted message within a conversation.
///
/// Messages are ordered by `created_at`; the v7 `id` breaks ties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Project a stored record onto the generator's `{role, content}` shape.
    pub fn to_message(&self) -> Message {
        Message {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// The user/assistant pair produced by one successful chat turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exchange {
    pub user_message: ChatMessage,
    pub assistant_message: ChatMessage,
}
