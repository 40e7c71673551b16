//! Template-driven single-shot generation handlers.
//!
//! - POST /aigc/chat/mindmap - Markdown mind map from a chat model
//! - POST /aigc/chat/image   - images from an image model

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use langchat_types::image::GeneratedImage;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindmapBody {
    #[serde(default)]
    pub message: String,
    pub model_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub model_id: String,
}

#[derive(Debug, Serialize)]
pub struct MindmapResult {
    pub message: String,
}

/// POST /aigc/chat/mindmap
pub async fn mindmap(
    State(state): State<AppState>,
    _auth: Authenticated,
    Json(body): Json<MindmapBody>,
) -> Result<ApiResponse<MindmapResult>, AppError> {
    let start = Instant::now();
    let message = state
        .chat_service
        .mindmap(&body.message, body.model_id.as_deref())
        .await?;
    Ok(ApiResponse::success(MindmapResult { message }, start))
}

/// POST /aigc/chat/image
pub async fn image(
    State(state): State<AppState>,
    _auth: Authenticated,
    Json(body): Json<ImageBody>,
) -> Result<ApiResponse<Vec<GeneratedImage>>, AppError> {
    let start = Instant::now();
    if body.model_id.trim().is_empty() {
        return Err(AppError::Validation("modelId is required".to_string()));
    }
    let images = state.chat_service.image(&body.message, &body.model_id).await?;
    Ok(ApiResponse::success(images, start))
}
