//! HTTP API layer for LangChat.
//!
//! Axum-based API under `/aigc/` with API key authentication, envelope
//! responses for request/response endpoints and SSE for chat completions.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
