//! Axum router configuration with middleware.
//!
//! Chat routes live under `/aigc/`; `/health` is unauthenticated.
//! Middleware: CORS and request tracing.

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let aigc_routes = Router::new()
        .route("/chat/completions", post(handlers::chat::completions))
        .route("/app/info", get(handlers::app::app_info))
        .route(
            "/chat/messages/{conversation_id}",
            get(handlers::message::messages),
        )
        .route(
            "/chat/messages/clean/{conversation_id}",
            delete(handlers::message::clean),
        )
        .route("/chat/mindmap", post(handlers::generate::mindmap))
        .route("/chat/image", post(handlers::generate::image))
        .route("/chat/getImageModels", get(handlers::model::image_models));

    Router::new()
        .nest("/aigc", aigc_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
