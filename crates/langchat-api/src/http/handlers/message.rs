//! Conversation history handlers.
//!
//! Endpoints:
//! - GET    /aigc/chat/messages/{conversationId}       - caller's messages
//! - DELETE /aigc/chat/messages/clean/{conversationId} - clear history and memory

use std::time::Instant;

use axum::extract::{Path, State};
use serde::Serialize;

use langchat_core::permission;
use langchat_types::chat::{ChatMessage, ConversationId};
use langchat_types::principal::Permission;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CleanResult {
    pub conversation_id: ConversationId,
    pub removed: u64,
}

/// GET /aigc/chat/messages/{conversationId}
///
/// Re-initializes conversation memory from the returned list as a side effect.
pub async fn messages(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(conversation_id): Path<String>,
) -> Result<ApiResponse<Vec<ChatMessage>>, AppError> {
    let start = Instant::now();
    let conversation_id = ConversationId::from(conversation_id);

    let messages = state
        .chat_service
        .history(&conversation_id, &principal.user_id)
        .await?;

    Ok(ApiResponse::success(messages, start))
}

/// DELETE /aigc/chat/messages/clean/{conversationId}
pub async fn clean(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(conversation_id): Path<String>,
) -> Result<ApiResponse<CleanResult>, AppError> {
    let start = Instant::now();
    permission::require(&principal, Permission::ChatMessagesClean)?;

    let conversation_id = ConversationId::from(conversation_id);
    let removed = state.chat_service.clean(&conversation_id).await?;

    Ok(ApiResponse::success(
        CleanResult {
            conversation_id,
            removed,
        },
        start,
    ))
}
