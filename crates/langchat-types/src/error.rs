use thiserror::Error;

/// Errors from repository operations (used by trait definitions in langchat-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Failures of a single chat turn or chat-related request.
///
/// Validation and permission errors are raised before any stream work
/// begins; backend and persistence errors are delivered through the
/// stream's error terminator. None of them is fatal to the process.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("permission denied: missing '{0}'")]
    PermissionDenied(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("generation failed: {0}")]
    BackendFailure(String),

    #[error("generation timed out after {0}s")]
    Timeout(u64),

    #[error("persistence failure: {0}")]
    PersistenceFailure(#[from] RepositoryError),
}
