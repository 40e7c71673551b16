//! Generation backend abstractions for LangChat.
//!
//! This module defines the core traits and utilities for provider integration:
//! - `LlmProvider`: RPITIT trait for concrete chat providers
//! - `BoxLlmProvider`: Object-safe wrapper for dynamic dispatch
//! - `ImageProvider` / `BoxImageProvider`: the same pair for image generation
//! - `ProviderRegistry`: model-id indexed lookup used by the relay

pub mod box_provider;
pub mod image;
pub mod provider;
pub mod registry;
