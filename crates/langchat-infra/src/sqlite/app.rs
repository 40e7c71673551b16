//! SQLite app repository implementation.

use langchat_core::repository::app::AppRepository;
use langchat_types::app::App;
use langchat_types::error::RepositoryError;
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

/// SQLite-backed implementation of `AppRepository`.
pub struct SqliteAppRepository {
    pool: DatabasePool,
}

impl SqliteAppRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct AppRow {
    id: String,
    name: String,
    description: Option<String>,
    prompt: Option<String>,
    model_id: Option<String>,
    created_at: String,
}

impl AppRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            prompt: row.try_get("prompt")?,
            model_id: row.try_get("model_id")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_app(self) -> Result<App, RepositoryError> {
        Ok(App {
            id: self.id,
            name: self.name,
            description: self.description,
            prompt: self.prompt,
            model_id: self.model_id,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

impl AppRepository for SqliteAppRepository {
    async fn create(&self, app: &App) -> Result<App, RepositoryError> {
        sqlx::query(
            r#"INSERT INTO apps (id, name, description, prompt, model_id, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&app.id)
        .bind(&app.name)
        .bind(&app.description)
        .bind(&app.prompt)
        .bind(&app.model_id)
        .bind(format_datetime(&app.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return RepositoryError::Conflict(format!("app '{}' already exists", app.id));
                }
            }
            query_error(e)
        })?;

        Ok(app.clone())
    }

    async fn get(&self, id: &str) -> Result<Option<App>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM apps WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => {
                let app_row = AppRow::from_row(&row).map_err(query_error)?;
                Ok(Some(app_row.into_app()?))
            }
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<App>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM apps ORDER BY created_at DESC")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        let mut apps = Vec::with_capacity(rows.len());
        for row in &rows {
            apps.push(AppRow::from_row(row).map_err(query_error)?.into_app()?);
        }
        Ok(apps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::test_support::test_pool;
    use chrono::Utc;

    fn app(id: &str, prompt: Option<&str>) -> App {
        App {
            id: id.to_string(),
            name: format!("App {id}"),
            description: Some("test app".to_string()),
            prompt: prompt.map(str::to_string),
            model_id: Some("gpt".to_string()),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = SqliteAppRepository::new(test_pool().await);
        repo.create(&app("a1", Some("You are a helper"))).await.unwrap();

        let loaded = repo.get("a1").await.unwrap().unwrap();
        assert_eq!(loaded.name, "App a1");
        assert_eq!(loaded.system_prompt(), Some("You are a helper"));
        assert_eq!(loaded.model_id.as_deref(), Some("gpt"));
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let repo = SqliteAppRepository::new(test_pool().await);
        assert!(repo.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_is_conflict() {
        let repo = SqliteAppRepository::new(test_pool().await);
        repo.create(&app("a1", None)).await.unwrap();
        let err = repo.create(&app("a1", None)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_list() {
        let repo = SqliteAppRepository::new(test_pool().await);
        repo.create(&app("a1", None)).await.unwrap();
        repo.create(&app("a2", None)).await.unwrap();
        assert_eq!(repo.list().await.unwrap().len(), 2);
    }
}
