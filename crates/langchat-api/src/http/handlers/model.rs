//! Model listing handler.
//!
//! GET /aigc/chat/getImageModels - image models with credentials redacted

use std::time::Instant;

use axum::extract::State;

use langchat_types::model::ModelConfig;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /aigc/chat/getImageModels
pub async fn image_models(
    State(state): State<AppState>,
    _auth: Authenticated,
) -> Result<ApiResponse<Vec<ModelConfig>>, AppError> {
    let start = Instant::now();
    let models = state.chat_service.image_models().await?;
    Ok(ApiResponse::success(models, start))
}
