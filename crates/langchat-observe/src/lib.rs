//! Observability for LangChat: tracing subscriber setup and optional
//! OpenTelemetry span export.

pub mod tracing_setup;

pub use tracing_setup::{DEFAULT_FILTER, LogFormat, init_tracing, shutdown_tracing};
