//! Shared domain types for LangChat.
//!
//! This crate contains the core domain types used across the LangChat
//! service: conversations, messages, apps, model configurations, LLM
//! request/stream shapes, global configuration, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod app;
pub mod chat;
pub mod config;
pub mod error;
pub mod image;
pub mod llm;
pub mod model;
pub mod principal;
