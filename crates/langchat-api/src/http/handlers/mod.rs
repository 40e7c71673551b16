//! HTTP request handlers.

pub mod app;
pub mod chat;
pub mod generate;
pub mod message;
pub mod model;
