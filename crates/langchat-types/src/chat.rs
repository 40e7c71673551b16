//! Conversation and message types for LangChat.
//!
//! A conversation is a named thread of alternating user/assistant messages
//! identified by a stable [`ConversationId`]. The id is the only sharding key
//! for both the in-memory context window and the persistent message log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

// Re-export MessageRole from llm module (it's used in both chat and llm contexts).
pub use crate::llm::{Message, MessageRole};

/// Opaque key identifying a chat thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the id is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ConversationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A message persisted in the conversation log.
///
/// Immutable once stored. Messages are ordered by `created_at` (ties broken
/// by the time-sortable v7 `id`). Assistant messages carry usage metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub conversation_id: ConversationId,
    pub user_id: String,
    pub username: Option<String>,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Model that produced this message (assistant messages only).
    pub model: Option<String>,
    /// Prompt tokens consumed by this turn (assistant messages only).
    pub input_tokens: Option<u32>,
    /// Completion tokens generated for this turn (assistant messages only).
    pub output_tokens: Option<u32>,
}

impl ChatMessage {
    /// Project a persisted row onto the shape held in conversation memory.
    ///
    /// Assistant rows stay assistant messages; every other role becomes a
    /// user message since system prompts are never persisted.
    pub fn to_memory_message(&self) -> Message {
        match self.role {
            MessageRole::Assistant => Message::assistant(self.content.clone()),
            _ => Message::user(self.content.clone()),
        }
    }
}

/// One incoming chat turn.
///
/// Created per call from the request body plus the authenticated caller,
/// discarded once the relay finishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub conversation_id: ConversationId,
    pub user_id: String,
    pub username: Option<String>,
    pub message: String,
    /// Model to generate with; falls back to the app's model, then the configured default.
    pub model_id: Option<String>,
    pub app_id: Option<String>,
}
