//! Model repository trait definition.

use langchat_types::error::RepositoryError;
use langchat_types::model::{ModelConfig, ModelKind};

/// Repository trait for configured vendor models.
///
/// Rows carry credentials. Callers returning models to clients must
/// redact them first (see [`ModelConfig::redacted`]).
pub trait ModelRepository: Send + Sync {
    /// Store a new model configuration.
    fn create(
        &self,
        model: &ModelConfig,
    ) -> impl std::future::Future<Output = Result<ModelConfig, RepositoryError>> + Send;

    /// Get a model by its id.
    fn get(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<ModelConfig>, RepositoryError>> + Send;

    /// List models, optionally restricted to one kind.
    fn list(
        &self,
        kind: Option<ModelKind>,
    ) -> impl std::future::Future<Output = Result<Vec<ModelConfig>, RepositoryError>> + Send;
}
