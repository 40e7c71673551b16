//! StreamSession: the producer half of one client stream.
//!
//! A session is owned by exactly one relay task. Fragments flow through a
//! bounded channel to the [`RelayStream`] held by the transport. Exactly one
//! terminal event (`Completed` or `Failed`) is ever emitted; later terminal
//! calls are no-ops and later sends are rejected.
//!
//! Dropping the [`RelayStream`] (client disconnect) cancels the session's
//! token, which the relay uses to stop the upstream generation.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};

use langchat_types::llm::Usage;

/// Event delivered to the client side of a relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    /// One generated text fragment, in backend order.
    Fragment(String),
    /// Success terminator.
    Completed { usage: Usage },
    /// Error terminator with a human-readable cause.
    Failed { message: String },
}

impl RelayEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RelayEvent::Fragment(_))
    }
}

/// Lifecycle state of a [`StreamSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Completed,
    Failed,
    /// The client went away before a terminator was sent.
    Abandoned,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        self != SessionState::Open
    }
}

/// Why a fragment could not be sent.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SendError {
    #[error("stream session already terminated ({0:?})")]
    Terminated(SessionState),

    #[error("client disconnected")]
    Disconnected,
}

/// Producer side of a client stream.
pub struct StreamSession {
    tx: mpsc::Sender<RelayEvent>,
    state: SessionState,
    cancel: CancellationToken,
}

impl StreamSession {
    /// Open a session with `capacity` buffered events.
    ///
    /// Returns the producer half and the stream handed to the transport.
    pub fn open(capacity: usize) -> (StreamSession, RelayStream) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let cancel = CancellationToken::new();
        let stream = RelayStream {
            rx,
            finished: false,
            _cancel_on_drop: cancel.clone().drop_guard(),
        };
        let session = StreamSession {
            tx,
            state: SessionState::Open,
            cancel,
        };
        (session, stream)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Token cancelled when the client disconnects or the session is abandoned.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Send one fragment. Waits while the channel is full.
    pub async fn send(&mut self, fragment: impl Into<String>) -> Result<(), SendError> {
        if self.state.is_terminal() {
            return Err(SendError::Terminated(self.state));
        }
        if self
            .tx
            .send(RelayEvent::Fragment(fragment.into()))
            .await
            .is_err()
        {
            self.abandon();
            return Err(SendError::Disconnected);
        }
        Ok(())
    }

    /// Terminate with success. Returns `false` if the session was already
    /// terminated or the client is gone.
    pub async fn complete(&mut self, usage: Usage) -> bool {
        self.terminate(SessionState::Completed, RelayEvent::Completed { usage })
            .await
    }

    /// Terminate with an error. Returns `false` if the session was already
    /// terminated or the client is gone.
    pub async fn fail(&mut self, message: impl Into<String>) -> bool {
        let message = message.into();
        self.terminate(SessionState::Failed, RelayEvent::Failed { message })
            .await
    }

    /// Mark the session abandoned and cancel in-flight work.
    pub fn abandon(&mut self) {
        if !self.state.is_terminal() {
            self.state = SessionState::Abandoned;
        }
        self.cancel.cancel();
    }

    async fn terminate(&mut self, state: SessionState, event: RelayEvent) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        if self.tx.send(event).await.is_err() {
            self.abandon();
            return false;
        }
        self.state = state;
        true
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        if self.state == SessionState::Open {
            // Relay task ended without a terminator (panic or early return).
            let _ = self.tx.try_send(RelayEvent::Failed {
                message: "relay aborted".to_string(),
            });
        }
    }
}

/// Consumer side of a client stream.
///
/// Yields fragments in order and ends right after the terminal event.
/// Dropping it cancels the producing relay.
pub struct RelayStream {
    rx: mpsc::Receiver<RelayEvent>,
    finished: bool,
    _cancel_on_drop: DropGuard,
}

impl Stream for RelayStream {
    type Item = RelayEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }
        match self.rx.poll_recv(cx) {
            Poll::Ready(Some(event)) => {
                if event.is_terminal() {
                    self.finished = true;
                }
                Poll::Ready(Some(event))
            }
            Poll::Ready(None) => {
                self.finished = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn fragments_then_single_terminator() {
        let (mut session, stream) = StreamSession::open(8);
        session.send("a").await.unwrap();
        session.send("b").await.unwrap();
        assert!(session.complete(Usage::default()).await);
        assert!(!session.complete(Usage::default()).await);
        assert!(!session.fail("late").await);
        drop(session);

        let events: Vec<RelayEvent> = stream.collect().await;
        assert_eq!(
            events,
            vec![
                RelayEvent::Fragment("a".to_string()),
                RelayEvent::Fragment("b".to_string()),
                RelayEvent::Completed {
                    usage: Usage::default()
                },
            ]
        );
    }

    #[tokio::test]
    async fn send_after_fail_is_rejected() {
        let (mut session, _stream) = StreamSession::open(8);
        assert!(session.fail("boom").await);
        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(
            session.send("x").await,
            Err(SendError::Terminated(SessionState::Failed))
        );
    }

    #[tokio::test]
    async fn dropping_stream_abandons_and_cancels() {
        let (mut session, stream) = StreamSession::open(8);
        let token = session.cancellation();
        drop(stream);

        assert!(token.is_cancelled());
        assert_eq!(session.send("x").await, Err(SendError::Disconnected));
        assert_eq!(session.state(), SessionState::Abandoned);
        assert!(!session.complete(Usage::default()).await);
    }

    #[tokio::test]
    async fn dropping_open_session_emits_failure() {
        let (mut session, stream) = StreamSession::open(8);
        session.send("partial").await.unwrap();
        drop(session);

        let events: Vec<RelayEvent> = stream.collect().await;
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[1], RelayEvent::Failed { message } if message == "relay aborted"));
    }
}
