//! SQLite admin statistics queries.

use chrono::{DateTime, Duration, Utc};
use sqlx::Row;
use tutoria_core::stats::repository::StatsRepository;
use tutoria_types::error::RepositoryError;
use tutoria_types::stats::DashboardStats;

use super::format_datetime;
use super::pool::DatabasePool;

/// SQLite-backed implementation of `StatsRepository`.
pub struct SqliteStatsRepository {
    pool: DatabasePool,
}

impl SqliteStatsRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Compute statistics relative to `now`.
    pub async fn dashboard_stats_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<DashboardStats, RepositoryError> {
        let day_ago = format_datetime(&(now - Duration::hours(24)));
        let week_ago = format_datetime(&(now - Duration::days(7)));

        let row = sqlx::query(
            r#"SELECT
                   (SELECT COUNT(*) FROM (
                        SELECT user_id FROM conversations
                        UNION
                        SELECT user_id FROM user_profiles
                   )) AS total_users,
                   (SELECT COUNT(*) FROM conversations) AS total_conversations,
                   (SELECT COUNT(*) FROM chat_messages) AS total_messages,
                   (SELECT COUNT(*) FROM chat_messages WHERE created_at >= ?) AS messages_last_24h,
                   (SELECT COUNT(DISTINCT c.user_id)
                      FROM chat_messages m
                      JOIN conversations c ON c.id = m.conversation_id
                     WHERE m.created_at >= ?) AS active_users_last_7d"#,
        )
        .bind(day_ago)
        .bind(week_ago)
        .fetch_one(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let get = |name: &str| -> Result<u64, RepositoryError> {
            let value: i64 = row
                .try_get(name)
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            Ok(value.max(0) as u64)
        };

        let total_conversations = get("total_conversations")?;
        let total_messages = get("total_messages")?;
        let avg_messages_per_conversation = if total_conversations == 0 {
            0.0
        } else {
            total_messages as f64 / total_conversations as f64
        };

        Ok(DashboardStats {
            total_users: get("total_users")?,
            total_conversations,
            total_messages,
            messages_last_24h: get("messages_last_24h")?,
            active_users_last_7d: get("active_users_last_7d")?,
            avg_messages_per_conversation,
        })
    }
}

impl StatsRepository for SqliteStatsRepository {
    async fn dashboard_stats(&self) -> Result<DashboardStats, RepositoryError> {
        self.dashboard_stats_at(Utc::now()).await
    }
}

#[cfg(test)]
mod tests {
    use tutoria_core::chat::repository::ChatRepository;
    use tutoria_core::profile::repository::ProfileRepository;
    use tutoria_types::chat::{ChatMessage, Conversation, MessageRole};
    use tutoria_types::profile::UserProfile;
    use uuid::Uuid;

    use super::*;
    use crate::sqlite::chat::SqliteChatRepository;
    use crate::sqlite::pool::test_support::test_pool;
    use crate::sqlite::profile::SqliteProfileRepository;

    async fn conversation_with_exchange(
        repo: &SqliteChatRepository,
        user_id: &str,
        at: DateTime<Utc>,
    ) {
        let conversation = Conversation {
            id: Uuid::now_v7(),
            user_id: user_id.to_string(),
            title: None,
            created_at: at,
            updated_at: at,
            message_count: 0,
        };
        repo.create_conversation(&conversation).await.unwrap();

        let message = |role, content: &str| ChatMessage {
            id: Uuid::now_v7(),
            conversation_id: conversation.id,
            role,
            content: content.to_string(),
            created_at: at,
        };
        repo.save_exchange(
            &message(MessageRole::User, "q"),
            &message(MessageRole::Assistant, "a"),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_empty_database() {
        let repo = SqliteStatsRepository::new(test_pool().await);
        let stats = repo.dashboard_stats().await.unwrap();
        assert_eq!(stats, DashboardStats::default());
    }

    #[tokio::test]
    async fn test_counts_and_windows() {
        let pool = test_pool().await;
        let chat = SqliteChatRepository::new(pool.clone());
        let profiles = SqliteProfileRepository::new(pool.clone());
        let stats_repo = SqliteStatsRepository::new(pool);

        let now = Utc::now();
        conversation_with_exchange(&chat, "alice", now - Duration::hours(1)).await;
        conversation_with_exchange(&chat, "alice", now - Duration::days(3)).await;
        conversation_with_exchange(&chat, "bob", now - Duration::days(30)).await;
        profiles
            .upsert_profile("carol", &UserProfile::default())
            .await
            .unwrap();

        let stats = stats_repo.dashboard_stats_at(now).await.unwrap();
        assert_eq!(stats.total_users, 3);
        assert_eq!(stats.total_conversations, 3);
        assert_eq!(stats.total_messages, 6);
        assert_eq!(stats.messages_last_24h, 2);
        assert_eq!(stats.active_users_last_7d, 1);
        assert!((stats.avg_messages_per_conversation - 2.0).abs() < f64::EPSILON);
    }
}
