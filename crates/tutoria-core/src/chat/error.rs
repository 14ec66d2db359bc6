use thiserror::Error;
use tutoria_types::error::RepositoryError;
use tutoria_types::llm::GenerateError;
use uuid::Uuid;

/// Errors surfaced by [`ChatService`](super::service::ChatService).
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("conversation not found: {0}")]
    ConversationNotFound(Uuid),

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("invalid title: {0}")]
    InvalidTitle(String),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
