//! Relay logic and repository trait definitions for LangChat.
//!
//! This crate defines the "ports" (repository and provider traits) that the
//! infrastructure layer implements, plus the streaming chat relay, the
//! per-conversation memory window, and the request/response services built
//! on top of them. It depends only on `langchat-types` -- never on
//! `langchat-infra` or any database/IO crate.

pub mod chat;
pub mod llm;
pub mod memory;
pub mod permission;
pub mod prompt;
pub mod relay;
pub mod repository;
