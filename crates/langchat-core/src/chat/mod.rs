//! Conversation persistence abstractions and the request/response chat service.
//!
//! This module defines the `ConversationStore` trait that the infrastructure
//! layer implements, and `ChatService` which drives the non-streaming
//! endpoints (history, app info, cleanup, single-shot generation).

pub mod repository;
pub mod service;
