//! SQLite model repository implementation.
//!
//! Rows hold vendor credentials in plain columns; redaction happens at the
//! service layer before anything is returned to a client.

use langchat_core::repository::model::ModelRepository;
use langchat_types::error::RepositoryError;
use langchat_types::llm::ProviderType;
use langchat_types::model::{ModelConfig, ModelKind};
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

/// SQLite-backed implementation of `ModelRepository`.
pub struct SqliteModelRepository {
    pool: DatabasePool,
}

impl SqliteModelRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct ModelRow {
    id: String,
    name: String,
    kind: String,
    provider: String,
    model: String,
    base_url: Option<String>,
    api_key: Option<String>,
    secret_key: Option<String>,
    temperature: Option<f64>,
    max_tokens: Option<i64>,
    image_size: Option<String>,
    created_at: String,
}

impl ModelRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            kind: row.try_get("kind")?,
            provider: row.try_get("provider")?,
            model: row.try_get("model")?,
            base_url: row.try_get("base_url")?,
            api_key: row.try_get("api_key")?,
            secret_key: row.try_get("secret_key")?,
            temperature: row.try_get("temperature")?,
            max_tokens: row.try_get("max_tokens")?,
            image_size: row.try_get("image_size")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_model(self) -> Result<ModelConfig, RepositoryError> {
        let kind: ModelKind = self
            .kind
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let provider: ProviderType = self
            .provider
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(ModelConfig {
            id: self.id,
            name: self.name,
            kind,
            provider,
            model: self.model,
            base_url: self.base_url,
            api_key: self.api_key,
            secret_key: self.secret_key,
            temperature: self.temperature,
            max_tokens: self.max_tokens.map(|v| v as u32),
            image_size: self.image_size,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn rows_to_models(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<ModelConfig>, RepositoryError> {
    let mut models = Vec::with_capacity(rows.len());
    for row in rows {
        models.push(ModelRow::from_row(row).map_err(query_error)?.into_model()?);
    }
    Ok(models)
}

impl ModelRepository for SqliteModelRepository {
    async fn create(&self, model: &ModelConfig) -> Result<ModelConfig, RepositoryError> {
        sqlx::query(
            r#"INSERT INTO models (id, name, kind, provider, model, base_url, api_key, secret_key, temperature, max_tokens, image_size, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&model.id)
        .bind(&model.name)
        .bind(model.kind.to_string())
        .bind(model.provider.to_string())
        .bind(&model.model)
        .bind(&model.base_url)
        .bind(&model.api_key)
        .bind(&model.secret_key)
        .bind(model.temperature)
        .bind(model.max_tokens.map(|v| v as i64))
        .bind(&model.image_size)
        .bind(format_datetime(&model.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return RepositoryError::Conflict(format!(
                        "model '{}' already exists",
                        model.id
                    ));
                }
            }
            query_error(e)
        })?;

        Ok(model.clone())
    }

    async fn get(&self, id: &str) -> Result<Option<ModelConfig>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM models WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => Ok(Some(
                ModelRow::from_row(&row).map_err(query_error)?.into_model()?,
            )),
            None => Ok(None),
        }
    }

    async fn list(&self, kind: Option<ModelKind>) -> Result<Vec<ModelConfig>, RepositoryError> {
        let rows = match kind {
            Some(kind) => {
                sqlx::query("SELECT * FROM models WHERE kind = ? ORDER BY created_at ASC")
                    .bind(kind.to_string())
                    .fetch_all(&self.pool.reader)
                    .await
            }
            None => {
                sqlx::query("SELECT * FROM models ORDER BY created_at ASC")
                    .fetch_all(&self.pool.reader)
                    .await
            }
        }
        .map_err(query_error)?;

        rows_to_models(&rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::test_support::test_pool;
    use chrono::Utc;

    fn model(id: &str, kind: ModelKind) -> ModelConfig {
        ModelConfig {
            id: id.to_string(),
            name: id.to_uppercase(),
            kind,
            provider: ProviderType::Qwen,
            model: "qwen-plus".to_string(),
            base_url: None,
            api_key: Some("sk-stored".to_string()),
            secret_key: None,
            temperature: Some(0.5),
            max_tokens: Some(2048),
            image_size: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_round_trips_fields() {
        let repo = SqliteModelRepository::new(test_pool().await);
        repo.create(&model("q1", ModelKind::Chat)).await.unwrap();

        let loaded = repo.get("q1").await.unwrap().unwrap();
        assert_eq!(loaded.provider, ProviderType::Qwen);
        assert_eq!(loaded.kind, ModelKind::Chat);
        assert_eq!(loaded.api_key.as_deref(), Some("sk-stored"));
        assert_eq!(loaded.temperature, Some(0.5));
        assert_eq!(loaded.max_tokens, Some(2048));
    }

    #[tokio::test]
    async fn test_list_by_kind() {
        let repo = SqliteModelRepository::new(test_pool().await);
        repo.create(&model("chat", ModelKind::Chat)).await.unwrap();
        repo.create(&model("img", ModelKind::Image)).await.unwrap();

        let images = repo.list(Some(ModelKind::Image)).await.unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].id, "img");
        assert_eq!(repo.list(None).await.unwrap().len(), 2);
    }
}
