//! SQLite profile repository implementation.
//!
//! Interests are stored as a JSON array in a TEXT column; the persona is
//! stored verbatim.

use chrono::Utc;
use sqlx::Row;
use tutoria_core::profile::repository::ProfileRepository;
use tutoria_types::error::RepositoryError;
use tutoria_types::profile::UserProfile;

use super::format_datetime;
use super::pool::DatabasePool;

/// SQLite-backed implementation of `ProfileRepository`.
pub struct SqliteProfileRepository {
    pool: DatabasePool,
}

impl SqliteProfileRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl ProfileRepository for SqliteProfileRepository {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, RepositoryError> {
        let row = sqlx::query("SELECT interests, persona FROM user_profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let interests_json: String = row
            .try_get("interests")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let persona: String = row
            .try_get("persona")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let interests: Vec<String> = serde_json::from_str(&interests_json)
            .map_err(|e| RepositoryError::Query(format!("invalid interests JSON: {e}")))?;

        Ok(Some(UserProfile { interests, persona }))
    }

    async fn upsert_profile(
        &self,
        user_id: &str,
        profile: &UserProfile,
    ) -> Result<(), RepositoryError> {
        let interests_json = serde_json::to_string(&profile.interests)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query(
            r#"INSERT INTO user_profiles (user_id, interests, persona, updated_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT(user_id) DO UPDATE SET
                   interests = excluded.interests,
                   persona = excluded.persona,
                   updated_at = excluded.updated_at"#,
        )
        .bind(user_id)
        .bind(interests_json)
        .bind(&profile.persona)
        .bind(format_datetime(&Utc::now()))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::test_support::test_pool;

    #[tokio::test]
    async fn test_missing_profile_is_none() {
        let repo = SqliteProfileRepository::new(test_pool().await);
        assert!(repo.get_profile("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_then_replace() {
        let repo = SqliteProfileRepository::new(test_pool().await);
        let first = UserProfile {
            interests: vec!["chess".to_string(), "music theory".to_string()],
            persona: "Explain like I'm new to programming.".to_string(),
        };
        repo.upsert_profile("u1", &first).await.unwrap();
        assert_eq!(repo.get_profile("u1").await.unwrap(), Some(first));

        let second = UserProfile {
            interests: vec![],
            persona: "Be brief.".to_string(),
        };
        repo.upsert_profile("u1", &second).await.unwrap();
        assert_eq!(repo.get_profile("u1").await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_interest_order_preserved() {
        let repo = SqliteProfileRepository::new(test_pool().await);
        let profile = UserProfile {
            interests: vec!["z".to_string(), "a".to_string(), "m".to_string()],
            persona: String::new(),
        };
        repo.upsert_profile("u1", &profile).await.unwrap();

        let stored = repo.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(stored.interests, vec!["z", "a", "m"]);
    }
}
