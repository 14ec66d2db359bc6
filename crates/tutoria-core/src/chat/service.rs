//! Chat service orchestrating conversations, generation, and persistence.
//!
//! ChatService coordinates between the ChatRepository, ProfileRepository,
//! and ResponseGenerator. A turn is: load the recent stored history, append
//! the new user message in memory, generate, then persist both messages in
//! one transaction. A failed generation leaves storage untouched.
//!
//! Turns on the same conversation run one at a time, so stored messages
//! always alternate user, assistant and each turn sees the previous reply.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use tutoria_types::chat::{ChatMessage, Conversation, Exchange, MessageRole};
use tutoria_types::error::RepositoryError;
use tutoria_types::llm::{GenerateError, Message};

use crate::chat::error::ChatError;
use crate::chat::repository::ChatRepository;
use crate::chat::title::derive_title;
use crate::llm::context::HISTORY_WINDOW;
use crate::llm::generator::ResponseGenerator;
use crate::llm::provider::LlmProvider;
use crate::profile::repository::ProfileRepository;

/// Longest accepted user message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 8_000;

/// Longest accepted user-supplied conversation title, in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// Orchestrates conversation lifecycle and tutor replies.
///
/// Generic over the repositories and the provider so tutoria-core never
/// depends on tutoria-infra.
pub struct ChatService<C: ChatRepository, R: ProfileRepository, P: LlmProvider> {
    chat_repo: C,
    profile_repo: R,
    generator: ResponseGenerator<P>,
    /// One lock per conversation with a turn in flight. Entries are removed
    /// when the last waiter releases.
    turn_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl<C: ChatRepository, R: ProfileRepository, P: LlmProvider> ChatService<C, R, P> {
    pub fn new(chat_repo: C, profile_repo: R, generator: ResponseGenerator<P>) -> Self {
        Self {
            chat_repo,
            profile_repo,
            generator,
            turn_locks: DashMap::new(),
        }
    }

    pub fn chat_repo(&self) -> &C {
        &self.chat_repo
    }

    pub fn profile_repo(&self) -> &R {
        &self.profile_repo
    }

    pub fn generator(&self) -> &ResponseGenerator<P> {
        &self.generator
    }

    // --- Conversation lifecycle ---

    /// Start a new, empty conversation for a user.
    ///
    /// A blank title is treated as absent; the first exchange then names
    /// the conversation.
    pub async fn start_conversation(
        &self,
        user_id: &str,
        title: Option<String>,
    ) -> Result<Conversation, ChatError> {
        let title = match title {
            Some(t) if !t.trim().is_empty() => Some(validate_title(&t)?),
            _ => None,
        };

        let now = Utc::now();
        let conversation = Conversation {
            id: Uuid::now_v7(),
            user_id: user_id.to_string(),
            title,
            created_at: now,
            updated_at: now,
            message_count: 0,
        };

        let created = self.chat_repo.create_conversation(&conversation).await?;
        info!(conversation_id = %created.id, user_id, "Conversation started");
        Ok(created)
    }

    /// Get a conversation, or `ConversationNotFound`.
    pub async fn get_conversation(&self, id: &Uuid) -> Result<Conversation, ChatError> {
        self.chat_repo
            .get_conversation(id)
            .await?
            .ok_or(ChatError::ConversationNotFound(*id))
    }

    /// List a user's conversations, most recently active first.
    pub async fn list_conversations(
        &self,
        user_id: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Conversation>, ChatError> {
        Ok(self
            .chat_repo
            .list_conversations(user_id, limit, offset)
            .await?)
    }

    /// Rename a conversation and return its updated state.
    pub async fn rename_conversation(
        &self,
        id: &Uuid,
        title: &str,
    ) -> Result<Conversation, ChatError> {
        let title = validate_title(title)?;
        self.chat_repo
            .rename_conversation(id, &title)
            .await
            .map_err(|e| not_found_as(e, *id))?;
        self.get_conversation(id).await
    }

    /// Delete a conversation and all of its messages.
    pub async fn delete_conversation(&self, id: &Uuid) -> Result<(), ChatError> {
        self.chat_repo
            .delete_conversation(id)
            .await
            .map_err(|e| not_found_as(e, *id))?;
        info!(conversation_id = %id, "Conversation deleted");
        Ok(())
    }

    /// Get stored messages for a conversation, oldest first.
    pub async fn get_messages(
        &self,
        id: &Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        self.get_conversation(id).await?;
        Ok(self.chat_repo.get_messages(id, limit, offset).await?)
    }

    // --- Tutoring turn ---

    /// Send a user message and return the persisted exchange.
    ///
    /// The generator sees the newest `HISTORY_WINDOW - 1` stored messages
    /// followed by `content`. Nothing is written unless generation succeeds.
    /// A second send to the same conversation waits for the first to finish;
    /// cancelling while waiting returns `Cancelled`.
    pub async fn send_message(
        &self,
        conversation_id: &Uuid,
        content: &str,
        cancel: &CancellationToken,
    ) -> Result<Exchange, ChatError> {
        validate_message(content)?;

        // Clone out of the map so no shard guard is held across `.await`.
        let lock = self
            .turn_locks
            .entry(*conversation_id)
            .or_default()
            .value()
            .clone();

        let result = tokio::select! {
            _ = cancel.cancelled() => Err(ChatError::Generate(GenerateError::Cancelled)),
            guard = lock.lock() => {
                let result = self.run_turn(conversation_id, content, cancel).await;
                drop(guard);
                result
            }
        };

        // Held by the map and by `lock`: nobody else is queued.
        self.turn_locks
            .remove_if(conversation_id, |_, l| Arc::strong_count(l) == 2);
        result
    }

    async fn run_turn(
        &self,
        conversation_id: &Uuid,
        content: &str,
        cancel: &CancellationToken,
    ) -> Result<Exchange, ChatError> {
        let conversation = self.get_conversation(conversation_id).await?;
        let sent_at = Utc::now();

        let prior_limit = (HISTORY_WINDOW - 1) as u32;
        let recent = self
            .chat_repo
            .get_recent_messages(conversation_id, prior_limit)
            .await?;

        let mut history: Vec<Message> = recent.iter().map(ChatMessage::to_message).collect();
        history.push(Message::user(content));

        let profile = self.profile_repo.get_profile(&conversation.user_id).await?;

        debug!(
            conversation_id = %conversation_id,
            prior_messages = recent.len(),
            has_profile = profile.is_some(),
            "Requesting tutor reply"
        );

        let reply = self
            .generator
            .generate_with_cancel(&history, profile.as_ref(), cancel)
            .await?;

        let user_message = ChatMessage {
            id: Uuid::now_v7(),
            conversation_id: *conversation_id,
            role: MessageRole::User,
            content: content.to_string(),
            created_at: sent_at,
        };
        let assistant_message = ChatMessage {
            id: Uuid::now_v7(),
            conversation_id: *conversation_id,
            role: MessageRole::Assistant,
            content: reply,
            created_at: Utc::now(),
        };

        self.chat_repo
            .save_exchange(&user_message, &assistant_message)
            .await?;

        if conversation.title.is_none() && conversation.message_count == 0 {
            let title = derive_title(content);
            // A failed auto-title must not fail a turn that is already stored.
            if let Err(e) = self.chat_repo.rename_conversation(conversation_id, &title).await {
                warn!(conversation_id = %conversation_id, error = %e, "Failed to set conversation title");
            } else {
                debug!(conversation_id = %conversation_id, title = %title, "Conversation titled");
            }
        }

        Ok(Exchange {
            user_message,
            assistant_message,
        })
    }
}

fn validate_message(content: &str) -> Result<(), ChatError> {
    if content.trim().is_empty() {
        return Err(ChatError::InvalidMessage(
            "message must not be empty".to_string(),
        ));
    }
    let chars = content.chars().count();
    if chars > MAX_MESSAGE_CHARS {
        return Err(ChatError::InvalidMessage(format!(
            "message too long: at most {MAX_MESSAGE_CHARS} characters allowed, got {chars}"
        )));
    }
    Ok(())
}

fn validate_title(title: &str) -> Result<String, ChatError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ChatError::InvalidTitle("title must not be empty".to_string()));
    }
    let chars = title.chars().count();
    if chars > MAX_TITLE_CHARS {
        return Err(ChatError::InvalidTitle(format!(
            "title too long: at most {MAX_TITLE_CHARS} characters allowed, got {chars}"
        )));
    }
    Ok(title.to_string())
}

fn not_found_as(error: RepositoryError, id: Uuid) -> ChatError {
    match error {
        RepositoryError::NotFound => ChatError::ConversationNotFound(id),
        other => ChatError::Repository(other),
    }
}
