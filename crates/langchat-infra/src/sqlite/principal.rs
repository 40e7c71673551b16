//! SQLite principal repository: API key hashes bound to a user and grants.

use std::collections::BTreeSet;

use chrono::Utc;
use langchat_core::repository::principal::PrincipalRepository;
use langchat_types::error::RepositoryError;
use langchat_types::principal::Principal;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, query_error};

/// SQLite-backed implementation of `PrincipalRepository`.
pub struct SqlitePrincipalRepository {
    pool: DatabasePool,
}

impl SqlitePrincipalRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl PrincipalRepository for SqlitePrincipalRepository {
    async fn create_key(&self, key_hash: &str, principal: &Principal) -> Result<(), RepositoryError> {
        let permissions = serde_json::to_string(&principal.permissions)
            .map_err(|e| RepositoryError::Query(format!("invalid permissions: {e}")))?;

        sqlx::query(
            r#"INSERT INTO api_keys (id, key_hash, user_id, username, permissions, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(Uuid::now_v7().to_string())
        .bind(key_hash)
        .bind(&principal.user_id)
        .bind(&principal.username)
        .bind(permissions)
        .bind(format_datetime(&Utc::now()))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(())
    }

    async fn find_by_key_hash(&self, key_hash: &str) -> Result<Option<Principal>, RepositoryError> {
        let row = sqlx::query("SELECT id, user_id, username, permissions FROM api_keys WHERE key_hash = ?")
            .bind(key_hash)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let id: String = row.try_get("id").map_err(query_error)?;
        let raw_permissions: String = row.try_get("permissions").map_err(query_error)?;
        let permissions: BTreeSet<String> = serde_json::from_str(&raw_permissions)
            .map_err(|e| RepositoryError::Query(format!("invalid permissions: {e}")))?;

        let principal = Principal {
            user_id: row.try_get("user_id").map_err(query_error)?,
            username: row.try_get("username").map_err(query_error)?,
            permissions,
        };

        // Best-effort usage stamp; a failure here must not reject the caller.
        if let Err(e) = sqlx::query("UPDATE api_keys SET last_used_at = ? WHERE id = ?")
            .bind(format_datetime(&Utc::now()))
            .bind(&id)
            .execute(&self.pool.writer)
            .await
        {
            tracing::debug!(error = %e, "failed to update api key last_used_at");
        }

        Ok(Some(principal))
    }

    async fn count_keys(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM api_keys")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;
        let count: i64 = row.try_get("cnt").map_err(query_error)?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::test_support::test_pool;

    fn principal() -> Principal {
        Principal {
            user_id: "42".to_string(),
            username: "alice".to_string(),
            permissions: ["chat:completions".to_string()].into_iter().collect(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find_key() {
        let repo = SqlitePrincipalRepository::new(test_pool().await);
        repo.create_key("hash-1", &principal()).await.unwrap();

        let found = repo.find_by_key_hash("hash-1").await.unwrap().unwrap();
        assert_eq!(found.user_id, "42");
        assert_eq!(found.username, "alice");
        assert!(found.permissions.contains("chat:completions"));
        assert_eq!(repo.count_keys().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unknown_hash_returns_none() {
        let repo = SqlitePrincipalRepository::new(test_pool().await);
        assert!(repo.find_by_key_hash("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_hash_rejected() {
        let repo = SqlitePrincipalRepository::new(test_pool().await);
        repo.create_key("hash-1", &principal()).await.unwrap();
        assert!(repo.create_key("hash-1", &principal()).await.is_err());
    }
}
