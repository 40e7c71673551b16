//! SSE streaming chat endpoint.
//!
//! POST /aigc/chat/completions
//!
//! Validation, permission and lookup errors are returned as a regular error
//! response before the stream opens. Once the stream is open the relay owns
//! the turn and every outcome arrives as an SSE event:
//!
//! - `message` one fragment, `{ "message": "..." }`
//! - `done` success terminator, `{ "message": "", "usage": {...} }`
//! - `error` error terminator, `{ "message": "..." }`
//!
//! Closing the connection drops the relay stream, which cancels generation.

use std::convert::Infallible;
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::StreamExt;
use serde::Deserialize;
use tokio_stream::Stream;

use langchat_core::permission;
use langchat_core::relay::RelayEvent;
use langchat_types::chat::{ChatRequest, ConversationId};
use langchat_types::principal::Permission;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::state::AppState;

/// Request body for the streaming chat endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatCompletionBody {
    #[serde(default)]
    pub conversation_id: String,
    #[serde(default)]
    pub message: String,
    pub model_id: Option<String>,
    pub app_id: Option<String>,
}

/// Render one relay event as an SSE event.
pub fn to_sse_event(event: RelayEvent) -> Event {
    match event {
        RelayEvent::Fragment(text) => Event::default()
            .event("message")
            .data(serde_json::json!({ "message": text }).to_string()),
        RelayEvent::Completed { usage } => Event::default()
            .event("done")
            .data(serde_json::json!({ "message": "", "usage": usage }).to_string()),
        RelayEvent::Failed { message } => Event::default()
            .event("error")
            .data(serde_json::json!({ "message": message }).to_string()),
    }
}

/// POST /aigc/chat/completions: stream one chat turn.
pub async fn completions(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Json(body): Json<ChatCompletionBody>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    permission::require(&principal, Permission::ChatCompletions)?;

    let request = ChatRequest {
        conversation_id: ConversationId::from(body.conversation_id),
        user_id: principal.user_id,
        username: Some(principal.username),
        message: body.message,
        model_id: body.model_id,
        app_id: body.app_id,
    };

    let stream = state.relay.start(request).await?;
    let events = stream.map(|event| Ok::<_, Infallible>(to_sse_event(event)));

    Ok(Sse::new(events).keep_alive(
        KeepAlive::new().interval(Duration::from_secs(state.config.keep_alive_secs.max(1))),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_accepts_camel_case() {
        let body: ChatCompletionBody = serde_json::from_str(
            r#"{"conversationId":"c-1","message":"hi","modelId":"gpt","appId":"a"}"#,
        )
        .unwrap();
        assert_eq!(body.conversation_id, "c-1");
        assert_eq!(body.model_id.as_deref(), Some("gpt"));
        assert_eq!(body.app_id.as_deref(), Some("a"));
    }

    #[test]
    fn test_missing_fields_default_to_blank() {
        let body: ChatCompletionBody = serde_json::from_str("{}").unwrap();
        assert!(body.conversation_id.is_empty());
        assert!(body.message.is_empty());
    }
}
