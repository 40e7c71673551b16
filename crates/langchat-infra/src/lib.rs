//! Infrastructure layer for LangChat.
//!
//! Contains implementations of the ports defined in `langchat-core`:
//! SQLite storage, OpenAI-compatible generation backends, the config loader
//! and filesystem layout.

pub mod config;
pub mod filesystem;
pub mod llm;
pub mod sqlite;
