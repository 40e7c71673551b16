//! Streaming chat relay.
//!
//! [`ChatRelay`] forwards generation output to a client as it is produced,
//! through a [`StreamSession`] / [`RelayStream`] pair.

pub mod engine;
pub mod session;

pub use engine::{ChatRelay, RelaySettings};
pub use session::{RelayEvent, RelayStream, SendError, SessionState, StreamSession};
