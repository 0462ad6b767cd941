//! The callback seam between a streaming session and its consumer.

use crate::error::StreamError;

/// Receives the output of one streaming session.
///
/// Callbacks run synchronously inside the session's task, in frame arrival
/// order. A slow callback stalls its own session and nothing else.
///
/// For a given session:
/// - `on_chunk` is called once per data frame, with only that frame's delta.
/// - Exactly one of `on_complete` / `on_error` follows the last chunk, unless
///   the session is cancelled, in which case neither is called.
pub trait StreamObserver: Send + 'static {
    /// A new delta arrived.
    fn on_chunk(&mut self, delta: &str);

    /// The stream ended normally. `output` is the concatenation of every delta.
    fn on_complete(&mut self, output: &str) {
        let _ = output;
    }

    /// The session failed. Never called for cancellation.
    fn on_error(&mut self, error: &StreamError) {
        let _ = error;
    }
}

type ChunkFn = Box<dyn FnMut(&str) + Send>;
type ErrorFn = Box<dyn FnMut(&StreamError) + Send>;

/// Adapts closures to [`StreamObserver`].
///
/// ```
/// use dashgen_types::FnObserver;
///
/// let observer = FnObserver::new(|delta| print!("{delta}"))
///     .with_complete(|full| println!("\n{} bytes", full.len()))
///     .with_error(|err| eprintln!("generation failed: {err}"));
/// # drop(observer);
/// ```
pub struct FnObserver {
    chunk: ChunkFn,
    complete: Option<ChunkFn>,
    error: Option<ErrorFn>,
}

impl FnObserver {
    /// Observer that only listens for chunks.
    #[must_use]
    pub fn new(on_chunk: impl FnMut(&str) + Send + 'static) -> Self {
        Self {
            chunk: Box::new(on_chunk),
            complete: None,
            error: None,
        }
    }

    /// Also listen for completion.
    #[must_use]
    pub fn with_complete(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.complete = Some(Box::new(f));
        self
    }

    /// Also listen for failure.
    #[must_use]
    pub fn with_error(mut self, f: impl FnMut(&StreamError) + Send + 'static) -> Self {
        self.error = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for FnObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnObserver")
            .field("on_complete", &self.complete.is_some())
            .field("on_error", &self.error.is_some())
            .finish_non_exhaustive()
    }
}

impl StreamObserver for FnObserver {
    fn on_chunk(&mut self, delta: &str) {
        (self.chunk)(delta);
    }

    fn on_complete(&mut self, output: &str) {
        if let Some(f) = self.complete.as_mut() {
            f(output);
        }
    }

    fn on_error(&mut self, error: &StreamError) {
        if let Some(f) = self.error.as_mut() {
            f(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn fn_observer_forwards_every_callback() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (a, b, c) = (log.clone(), log.clone(), log.clone());

        let mut obs = FnObserver::new(move |d| a.lock().unwrap().push(format!("chunk:{d}")))
            .with_complete(move |o| b.lock().unwrap().push(format!("done:{o}")))
            .with_error(move |e| c.lock().unwrap().push(format!("err:{e}")));

        obs.on_chunk("a");
        obs.on_complete("a");
        obs.on_error(&StreamError::InvalidRequest("x".into()));

        assert_eq!(
            *log.lock().unwrap(),
            vec!["chunk:a", "done:a", "err:invalid request: x"]
        );
    }

    #[test]
    fn missing_callbacks_are_no_ops() {
        let mut obs = FnObserver::new(|_| {});
        obs.on_complete("ignored");
        obs.on_error(&StreamError::InvalidRequest("ignored".into()));
    }
}
