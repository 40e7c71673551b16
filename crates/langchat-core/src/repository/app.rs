//! App repository trait definition.

use langchat_types::app::App;
use langchat_types::error::RepositoryError;

/// Repository trait for chat application configuration.
///
/// Implementations live in langchat-infra (e.g., SqliteAppRepository).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait AppRepository: Send + Sync {
    /// Create a new app. Returns the created app.
    fn create(&self, app: &App)
    -> impl std::future::Future<Output = Result<App, RepositoryError>> + Send;

    /// Get an app by its id.
    fn get(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<App>, RepositoryError>> + Send;

    /// List all apps, newest first.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<App>, RepositoryError>> + Send;
}
