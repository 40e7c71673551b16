//! App info handler.
//!
//! GET /aigc/app/info?appId=&conversationId=

use std::time::Instant;

use axum::extract::{Query, State};
use serde::Deserialize;

use langchat_types::app::App;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfoQuery {
    pub app_id: String,
    pub conversation_id: Option<String>,
}

/// GET /aigc/app/info: load an app and seed memory with its prompt.
pub async fn app_info(
    State(state): State<AppState>,
    _auth: Authenticated,
    Query(query): Query<AppInfoQuery>,
) -> Result<ApiResponse<App>, AppError> {
    let start = Instant::now();

    if query.app_id.trim().is_empty() {
        return Err(AppError::Validation("appId is required".to_string()));
    }

    let app = state
        .chat_service
        .app_info(&query.app_id, query.conversation_id.as_deref())
        .await?;

    Ok(ApiResponse::success(app, start))
}
