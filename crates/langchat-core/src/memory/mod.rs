//! Per-conversation memory window.

pub mod cache;

pub use cache::{ConversationMemory, MemoryCache, TurnGuard};
