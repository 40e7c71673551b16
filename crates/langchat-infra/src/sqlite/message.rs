//! SQLite conversation store.
//!
//! Implements `ConversationStore` from `langchat-core`: raw queries, a
//! private Row struct, writes through the single-connection writer pool and
//! reads through the reader pool. Rows are returned in append (rowid) order.

use langchat_core::chat::repository::ConversationStore;
use langchat_types::chat::{ChatMessage, ConversationId, MessageRole};
use langchat_types::error::RepositoryError;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

/// SQLite-backed implementation of `ConversationStore`.
pub struct SqliteConversationStore {
    pool: DatabasePool,
}

impl SqliteConversationStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain ChatMessage.
struct MessageRow {
    id: String,
    conversation_id: String,
    user_id: String,
    username: Option<String>,
    role: String,
    content: String,
    created_at: String,
    model: Option<String>,
    input_tokens: Option<i64>,
    output_tokens: Option<i64>,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            conversation_id: row.try_get("conversation_id")?,
            user_id: row.try_get("user_id")?,
            username: row.try_get("username")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
            model: row.try_get("model")?,
            input_tokens: row.try_get("input_tokens")?,
            output_tokens: row.try_get("output_tokens")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?;
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(ChatMessage {
            id,
            conversation_id: ConversationId::from(self.conversation_id),
            user_id: self.user_id,
            username: self.username,
            role,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
            model: self.model,
            input_tokens: self.input_tokens.map(|v| v as u32),
            output_tokens: self.output_tokens.map(|v| v as u32),
        })
    }
}

impl ConversationStore for SqliteConversationStore {
    async fn append(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO messages (id, conversation_id, user_id, username, role, content, created_at, model, input_tokens, output_tokens)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(message.id.to_string())
        .bind(message.conversation_id.as_str())
        .bind(&message.user_id)
        .bind(&message.username)
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(format_datetime(&message.created_at))
        .bind(&message.model)
        .bind(message.input_tokens.map(|v| v as i64))
        .bind(message.output_tokens.map(|v| v as i64))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return RepositoryError::Conflict(format!(
                        "message {} already stored",
                        message.id
                    ));
                }
            }
            query_error(e)
        })?;

        Ok(())
    }

    async fn list(
        &self,
        conversation_id: &ConversationId,
        user_id: Option<&str>,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = match user_id {
            Some(user_id) => {
                sqlx::query(
                    "SELECT * FROM messages WHERE conversation_id = ? AND user_id = ? ORDER BY rowid ASC",
                )
                .bind(conversation_id.as_str())
                .bind(user_id)
                .fetch_all(&self.pool.reader)
                .await
            }
            None => {
                sqlx::query("SELECT * FROM messages WHERE conversation_id = ? ORDER BY rowid ASC")
                    .bind(conversation_id.as_str())
                    .fetch_all(&self.pool.reader)
                    .await
            }
        }
        .map_err(query_error)?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row = MessageRow::from_row(row).map_err(query_error)?;
            messages.push(msg_row.into_message()?);
        }

        Ok(messages)
    }

    async fn clear(&self, conversation_id: &ConversationId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM messages WHERE conversation_id = ?")
            .bind(conversation_id.as_str())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM messages")
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
    use chrono::Utc;

    fn message(conversation: &str, user: &str, role: MessageRole, content: &str) -> ChatMessage {
        ChatMessage {
            id: Uuid::now_v7(),
            conversation_id: ConversationId::from(conversation),
            user_id: user.to_string(),
            username: Some(format!("{user}-name")),
            role,
            content: content.to_string(),
            created_at: Utc::now(),
            model: None,
            input_tokens: None,
            output_tokens: None,
        }
    }

    #[tokio::test]
    async fn test_append_and_list_preserves_order() {
        let store = SqliteConversationStore::new(test_pool().await);
        let conv = ConversationId::from("c-1");

        for (role, text) in [
            (MessageRole::User, "first"),
            (MessageRole::Assistant, "second"),
            (MessageRole::User, "third"),
        ] {
            store.append(&message("c-1", "u", role, text)).await.unwrap();
        }

        let listed = store.list(&conv, None).await.unwrap();
        let contents: Vec<&str> = listed.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
        assert_eq!(listed[1].role, MessageRole::Assistant);
        assert_eq!(listed[0].username.as_deref(), Some("u-name"));
    }

    #[tokio::test]
    async fn test_assistant_usage_round_trips() {
        let store = SqliteConversationStore::new(test_pool().await);
        let mut reply = message("c-1", "u", MessageRole::Assistant, "hello");
        reply.model = Some("gpt".to_string());
        reply.input_tokens = Some(12);
        reply.output_tokens = Some(4);
        store.append(&reply).await.unwrap();

        let listed = store.list(&ConversationId::from("c-1"), None).await.unwrap();
        assert_eq!(listed[0].id, reply.id);
        assert_eq!(listed[0].model.as_deref(), Some("gpt"));
        assert_eq!(listed[0].input_tokens, Some(12));
        assert_eq!(listed[0].output_tokens, Some(4));
    }

    #[tokio::test]
    async fn test_list_filters_by_user() {
        let store = SqliteConversationStore::new(test_pool().await);
        store
            .append(&message("c-1", "alice", MessageRole::User, "mine"))
            .await
            .unwrap();
        store
            .append(&message("c-1", "bob", MessageRole::User, "theirs"))
            .await
            .unwrap();

        let conv = ConversationId::from("c-1");
        let alice = store.list(&conv, Some("alice")).await.unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].content, "mine");
        assert_eq!(store.list(&conv, None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_clear_only_touches_one_conversation() {
        let store = SqliteConversationStore::new(test_pool().await);
        store
            .append(&message("c-1", "u", MessageRole::User, "a"))
            .await
            .unwrap();
        store
            .append(&message("c-1", "u", MessageRole::Assistant, "b"))
            .await
            .unwrap();
        store
            .append(&message("c-2", "u", MessageRole::User, "c"))
            .await
            .unwrap();

        let removed = store.clear(&ConversationId::from("c-1")).await.unwrap();
        assert_eq!(removed, 2);
        assert!(
            store
                .list(&ConversationId::from("c-1"), None)
                .await
                .unwrap()
                .is_empty()
        );
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_id_is_conflict() {
        let store = SqliteConversationStore::new(test_pool().await);
        let msg = message("c-1", "u", MessageRole::User, "once");
        store.append(&msg).await.unwrap();

        let err = store.append(&msg).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_concurrent_appends_all_land() {
        let store = std::sync::Arc::new(SqliteConversationStore::new(test_pool().await));
        let mut handles = Vec::new();
        for i in 0..10 {
            let store = std::sync::Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .append(&message("c-1", "u", MessageRole::User, &format!("m{i}")))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.count().await.unwrap(), 10);
    }
}
