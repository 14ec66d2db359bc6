//! ChatRepository trait definition.
//!
//! Provides CRUD operations for conversations and their messages.
//! Follows the same RPITIT pattern as the other repository ports.

use tutoria_types::chat::{ChatMessage, Conversation};
use tutoria_types::error::RepositoryError;
use uuid::Uuid;

/// Repository trait for conversation and message persistence.
///
/// Implementations live in tutoria-infra (e.g., `SqliteChatRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ChatRepository: Send + Sync {
    /// Create a new conversation. Returns the stored conversation.
    fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> impl std::future::Future<Output = Result<Conversation, RepositoryError>> + Send;

    /// Get a conversation by its unique ID.
    fn get_conversation(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Conversation>, RepositoryError>> + Send;

    /// List a user's conversations, most recently updated first.
    fn list_conversations(
        &self,
        user_id: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> impl std::future::Future<Output = Result<Vec<Conversation>, RepositoryError>> + Send;

    /// Set a conversation's title. Returns `NotFound` if it does not exist.
    fn rename_conversation(
        &self,
        id: &Uuid,
        title: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a conversation and its messages. Returns `NotFound` if it does not exist.
    fn delete_conversation(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Persist a user message and the assistant reply atomically.
    ///
    /// Both messages must belong to the same conversation. The conversation's
    /// `message_count` grows by two and `updated_at` moves to the reply time.
    fn save_exchange(
        &self,
        user_message: &ChatMessage,
        assistant_message: &ChatMessage,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get messages for a conversation, ordered by created_at ASC.
    fn get_messages(
        &self,
        conversation_id: &Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;

    /// Get the newest `limit` messages of a conversation, returned oldest first.
    fn get_recent_messages(
        &self,
        conversation_id: &Uuid,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;
}
