//! One streaming call, from request to terminal state.
//!
//! ```text
//! Idle ──► Requesting ──► Streaming ──► Completed
//!              │              │
//!              ├──────────────┴──► Failed
//!              └──────────────┴──► Cancelled   (from any non-terminal state)
//! ```
//!
//! Every suspension point (waiting for headers, waiting for the next chunk)
//! is raced against the cancellation token, and the token is checked again
//! before each observer callback. Once cancellation is seen the session stops
//! without calling the observer again, no matter how much data is buffered.

use std::future::Future;

use dashgen_types::{StreamError, StreamObserver};
use futures::StreamExt;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::dispatch::ChunkDispatcher;
use crate::reader::frames;
use crate::transport::ByteStream;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, nothing sent yet.
    Idle,
    /// Request sent, waiting for response headers.
    Requesting,
    /// Reading the body.
    Streaming,
    /// The body ended normally.
    Completed,
    /// The caller cancelled.
    Cancelled,
    /// A transport or protocol error ended the session.
    Failed,
}

impl SessionState {
    /// Whether no further transitions are possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

/// How a session ended.
#[derive(Debug)]
pub enum SessionOutcome {
    /// The stream ended normally with this output.
    Completed {
        /// Concatenation of every delta.
        output: String,
    },
    /// The caller cancelled.
    Cancelled,
    /// The session failed; the observer has already seen this error.
    Failed(StreamError),
}

impl SessionOutcome {
    /// The output, if the session completed.
    #[must_use]
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::Completed { output } => Some(output),
            _ => None,
        }
    }

    /// The terminal state this outcome corresponds to.
    #[must_use]
    pub fn state(&self) -> SessionState {
        match self {
            Self::Completed { .. } => SessionState::Completed,
            Self::Cancelled => SessionState::Cancelled,
            Self::Failed(_) => SessionState::Failed,
        }
    }
}

/// A single streaming session.
///
/// Owns its buffers and observer exclusively; nothing is shared with other
/// sessions.
pub struct Session<O> {
    state: SessionState,
    token: CancellationToken,
    dispatcher: ChunkDispatcher,
    observer: O,
}

impl<O: StreamObserver> Session<O> {
    /// Create an idle session.
    #[must_use]
    pub fn new(observer: O, token: CancellationToken) -> Self {
        Self {
            state: SessionState::Idle,
            token,
            dispatcher: ChunkDispatcher::new(),
            observer,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Drive the session to a terminal state.
    ///
    /// `open` performs the request and resolves once headers have arrived.
    pub async fn run<F>(mut self, open: F) -> SessionOutcome
    where
        F: Future<Output = Result<ByteStream, StreamError>>,
    {
        let token = self.token.clone();
        self.transition(SessionState::Requesting);

        let opened = tokio::select! {
            biased;
            () = token.cancelled() => None,
            opened = open => Some(opened),
        };
        let body = match opened {
            None => return self.cancelled(),
            Some(Err(e)) => return self.failed(e),
            Some(Ok(body)) => body,
        };

        self.transition(SessionState::Streaming);
        let mut frames = std::pin::pin!(frames(body));

        loop {
            let next = tokio::select! {
                biased;
                () = token.cancelled() => None,
                frame = frames.next() => Some(frame),
            };
            match next {
                None => return self.cancelled(),
                Some(None) => break,
                Some(Some(Err(e))) => return self.failed(e),
                Some(Some(Ok(frame))) => {
                    if token.is_cancelled() {
                        return self.cancelled();
                    }
                    if let Some(delta) = self.dispatcher.dispatch(&frame) {
                        self.observer.on_chunk(delta);
                    }
                }
            }
        }

        self.completed()
    }

    fn transition(&mut self, next: SessionState) {
        debug_assert!(
            !self.state.is_terminal(),
            "transition out of terminal state {:?}",
            self.state
        );
        tracing::debug!(from = ?self.state, to = ?next, "session state transition");
        self.state = next;
    }

    fn completed(mut self) -> SessionOutcome {
        if self.token.is_cancelled() {
            return self.cancelled();
        }
        self.transition(SessionState::Completed);
        tracing::debug!(
            frames = self.dispatcher.delivered(),
            dropped = self.dispatcher.dropped(),
            bytes = self.dispatcher.accumulated().len(),
            "stream completed"
        );
        self.observer.on_complete(self.dispatcher.accumulated());
        SessionOutcome::Completed {
            output: self.dispatcher.into_output(),
        }
    }

    fn cancelled(mut self) -> SessionOutcome {
        self.transition(SessionState::Cancelled);
        tracing::info!(frames = self.dispatcher.delivered(), "session cancelled");
        SessionOutcome::Cancelled
    }

    fn failed(mut self, error: StreamError) -> SessionOutcome {
        // An abort surfaces as a transport error; it is still a cancellation.
        if self.token.is_cancelled() {
            return self.cancelled();
        }
        self.transition(SessionState::Failed);
        tracing::warn!(error = %error, frames = self.dispatcher.delivered(), "session failed");
        self.observer.on_error(&error);
        SessionOutcome::Failed(error)
    }
}

/// Handle to a running session, returned synchronously by the entry points.
///
/// Dropping the handle detaches the session; it keeps running to completion.
#[derive(Debug)]
pub struct CancelHandle {
    id: String,
    token: CancellationToken,
    task: JoinHandle<SessionOutcome>,
}

impl CancelHandle {
    pub(crate) fn new(id: String, token: CancellationToken, task: JoinHandle<SessionOutcome>) -> Self {
        Self { id, token, task }
    }

    /// Session id, as it appears in log spans.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Request cancellation.
    ///
    /// Idempotent: calling it again, or after the session finished, does
    /// nothing.
    pub fn cancel(&self) {
        if !self.token.is_cancelled() {
            tracing::debug!(session = %self.id, "cancellation requested");
        }
        self.token.cancel();
    }

    /// A clone of the session's token, for cancelling from elsewhere once
    /// the handle itself has been consumed by [`join`](Self::join).
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Whether the session reached a terminal state.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the session to end.
    ///
    /// Errors only if the session task panicked, i.e. an observer callback
    /// panicked.
    pub async fn join(self) -> Result<SessionOutcome, JoinError> {
        self.task.await
    }
}
