//! LangChat application layer: HTTP API and state wiring.
//!
//! The `langchat` binary adds the CLI on top of this library.

pub mod http;
pub mod state;

pub use http::router::build_router;
pub use state::AppState;
