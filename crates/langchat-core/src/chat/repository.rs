//! ConversationStore trait definition.
//!
//! The durable, append-only message log keyed by conversation id.
//! Follows the same RPITIT pattern as the other repository traits.

use langchat_types::chat::{ChatMessage, ConversationId};
use langchat_types::error::RepositoryError;

/// Repository trait for the persistent conversation log.
///
/// Implementations live in langchat-infra (e.g., `SqliteConversationStore`).
/// `append` must be safe under concurrent writers; the store, not the relay,
/// serializes persistence. The relay never retries an append.
pub trait ConversationStore: Send + Sync {
    /// Append one message to the end of its conversation.
    fn append(
        &self,
        message: &ChatMessage,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// List a conversation's messages in append order.
    ///
    /// When `user_id` is given only that user's messages are returned.
    fn list(
        &self,
        conversation_id: &ConversationId,
        user_id: Option<&str>,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;

    /// Remove every message of a conversation. Returns the number removed.
    fn clear(
        &self,
        conversation_id: &ConversationId,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Count messages across all conversations.
    fn count(&self) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
