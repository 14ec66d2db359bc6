//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `tutoria-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, reads on the reader
//! pool and writes on the single-connection writer.

use sqlx::Row;
use tutoria_core::chat::repository::ChatRepository;
use tutoria_types::chat::{ChatMessage, Conversation, MessageRole};
use tutoria_types::error::RepositoryError;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `ChatRepository`.
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ConversationRow {
    id: String,
    user_id: String,
    title: Option<String>,
    created_at: String,
    updated_at: String,
    message_count: i64,
}

impl ConversationRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            title: row.try_get("title")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            message_count: row.try_get("message_count")?,
        })
    }

    fn into_conversation(self) -> Result<Conversation, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid conversation id: {e}")))?;

        Ok(Conversation {
            id,
            user_id: self.user_id,
            title: self.title,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
            message_count: self.message_count as u32,
        })
    }
}

struct ChatMessageRow {
    id: String,
    conversation_id: String,
    role: String,
    content: String,
    created_at: String,
}

impl ChatMessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            conversation_id: row.try_get("conversation_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?;
        let conversation_id = Uuid::parse_str(&self.conversation_id)
            .map_err(|e| RepositoryError::Query(format!("invalid conversation_id: {e}")))?;
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(ChatMessage {
            id,
            conversation_id,
            role,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn map_messages(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<ChatMessage>, RepositoryError> {
    let mut messages = Vec::with_capacity(rows.len());
    for row in rows {
        let msg_row =
            ChatMessageRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
        messages.push(msg_row.into_message()?);
    }
    Ok(messages)
}

async fn insert_message(
    conn: &mut sqlx::SqliteConnection,
    message: &ChatMessage,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r#"INSERT INTO chat_messages (id, conversation_id, role, content, created_at)
           VALUES (?, ?, ?, ?, ?)"#,
    )
    .bind(message.id.to_string())
    .bind(message.conversation_id.to_string())
    .bind(message.role.to_string())
    .bind(&message.content)
    .bind(format_datetime(&message.created_at))
    .execute(conn)
    .await
    .map_err(|e| RepositoryError::Query(e.to_string()))?;

    Ok(())
}

// ---------------------------------------------------------------------------
// ChatRepository implementation
// ---------------------------------------------------------------------------

impl ChatRepository for SqliteChatRepository {
    async fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<Conversation, RepositoryError> {
        sqlx::query(
            r#"INSERT INTO conversations (id, user_id, title, created_at, updated_at, message_count)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(conversation.id.to_string())
        .bind(&conversation.user_id)
        .bind(&conversation.title)
        .bind(format_datetime(&conversation.created_at))
        .bind(format_datetime(&conversation.updated_at))
        .bind(conversation.message_count as i64)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                RepositoryError::Conflict(format!("conversation {} already exists", conversation.id))
            } else {
                RepositoryError::Query(e.to_string())
            }
        })?;

        Ok(conversation.clone())
    }

    async fn get_conversation(&self, id: &Uuid) -> Result<Option<Conversation>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM conversations WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let conversation_row = ConversationRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(conversation_row.into_conversation()?))
            }
            None => Ok(None),
        }
    }

    async fn list_conversations(
        &self,
        user_id: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        // SQLite treats a negative LIMIT as "no limit".
        let rows = sqlx::query(
            r#"SELECT * FROM conversations WHERE user_id = ?
               ORDER BY updated_at DESC, id DESC
               LIMIT ? OFFSET ?"#,
        )
        .bind(user_id)
        .bind(limit.unwrap_or(-1))
        .bind(offset.unwrap_or(0))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut conversations = Vec::with_capacity(rows.len());
        for row in &rows {
            let conversation_row =
                ConversationRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            conversations.push(conversation_row.into_conversation()?);
        }

        Ok(conversations)
    }

    async fn rename_conversation(&self, id: &Uuid, title: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE conversations SET title = ? WHERE id = ?")
            .bind(title)
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete_conversation(&self, id: &Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM conversations WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn save_exchange(
        &self,
        user_message: &ChatMessage,
        assistant_message: &ChatMessage,
    ) -> Result<(), RepositoryError> {
        if user_message.conversation_id != assistant_message.conversation_id {
            return Err(RepositoryError::Conflict(
                "exchange messages belong to different conversations".to_string(),
            ));
        }

        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let updated = sqlx::query(
            r#"UPDATE conversations
               SET message_count = message_count + 2, updated_at = ?
               WHERE id = ?"#,
        )
        .bind(format_datetime(&assistant_message.created_at))
        .bind(user_message.conversation_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if updated.rows_affected() == 0 {
            // Dropping the transaction rolls it back.
            return Err(RepositoryError::NotFound);
        }

        insert_message(&mut *tx, user_message).await?;
        insert_message(&mut *tx, assistant_message).await?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tracing::debug!(conversation_id = %user_message.conversation_id, "Exchange saved");
        Ok(())
    }

    async fn get_messages(
        &self,
        conversation_id: &Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT * FROM chat_messages WHERE conversation_id = ?
               ORDER BY created_at ASC, id ASC
               LIMIT ? OFFSET ?"#,
        )
        .bind(conversation_id.to_string())
        .bind(limit.unwrap_or(-1))
        .bind(offset.unwrap_or(0))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        map_messages(&rows)
    }

    async fn get_recent_messages(
        &self,
        conversation_id: &Uuid,
        limit: u32,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT * FROM (
                   SELECT * FROM chat_messages WHERE conversation_id = ?
                   ORDER BY created_at DESC, id DESC
                   LIMIT ?
               )
               ORDER BY created_at ASC, id ASC"#,
        )
        .bind(conversation_id.to_string())
        .bind(limit as i64)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        map_messages(&rows)
    }
}
