//! Principal repository trait definition.

use langchat_types::error::RepositoryError;
use langchat_types::principal::Principal;

/// Lookup of callers by API key.
///
/// Only SHA-256 hashes of keys are stored; plaintext keys are shown once at
/// creation and never persisted.
pub trait PrincipalRepository: Send + Sync {
    /// Store a new API key hash bound to a principal.
    fn create_key(
        &self,
        key_hash: &str,
        principal: &Principal,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Resolve the principal owning a key hash.
    fn find_by_key_hash(
        &self,
        key_hash: &str,
    ) -> impl std::future::Future<Output = Result<Option<Principal>, RepositoryError>> + Send;

    /// Count stored API keys.
    fn count_keys(&self) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
