//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (langchat-infra) implements. The core crate never depends on any
//! specific storage technology.

pub mod app;
pub mod model;
pub mod principal;
