//! A ready-made observer that keeps a live preview of the generated document.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashgen_types::{GenerationSummary, StreamError, StreamObserver, estimate_progress};

/// Where the previewed generation stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewStatus {
    /// Chunks are still arriving.
    Streaming,
    /// The stream finished and the summary is available.
    Completed,
    /// The stream failed; see [`PreviewBuffer::error`].
    Failed,
}

#[derive(Debug)]
struct PreviewState {
    html: String,
    chars: usize,
    status: PreviewStatus,
    components: usize,
    summary: Option<GenerationSummary>,
    error: Option<String>,
}

/// Shared, cloneable preview of a streaming generation.
///
/// Hand one clone to the client as the observer and keep another for the
/// UI. Every clone sees the same state.
///
/// ```
/// use dashgen_stream::{PreviewBuffer, PreviewStatus};
/// use dashgen_types::StreamObserver;
///
/// let preview = PreviewBuffer::new(3);
/// let mut observer = preview.clone();
/// observer.on_chunk("<html>");
///
/// assert_eq!(preview.snapshot(), "<html>");
/// assert_eq!(preview.status(), PreviewStatus::Streaming);
/// ```
#[derive(Debug, Clone)]
pub struct PreviewBuffer {
    state: Arc<Mutex<PreviewState>>,
}

impl PreviewBuffer {
    /// Empty preview for a generation with `components` requested components.
    #[must_use]
    pub fn new(components: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(PreviewState {
                html: String::new(),
                chars: 0,
                status: PreviewStatus::Streaming,
                components,
                summary: None,
                error: None,
            })),
        }
    }

    // A panicking observer elsewhere must not wedge the preview.
    fn lock(&self) -> MutexGuard<'_, PreviewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The document received so far.
    #[must_use]
    pub fn snapshot(&self) -> String {
        self.lock().html.clone()
    }

    /// Estimated completion percentage from the characters received so far,
    /// 100 once completed.
    #[must_use]
    pub fn progress(&self) -> f64 {
        let state = self.lock();
        match state.status {
            PreviewStatus::Completed => 100.0,
            _ => estimate_progress(state.chars),
        }
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> PreviewStatus {
        self.lock().status
    }

    /// Summary of the finished document.
    #[must_use]
    pub fn summary(&self) -> Option<GenerationSummary> {
        self.lock().summary.clone()
    }

    /// Message of the error that ended the stream.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    /// Clear everything for a new generation.
    pub fn reset(&self, components: usize) {
        let mut state = self.lock();
        state.html.clear();
        state.chars = 0;
        state.status = PreviewStatus::Streaming;
        state.components = components;
        state.summary = None;
        state.error = None;
    }
}

impl StreamObserver for PreviewBuffer {
    fn on_chunk(&mut self, delta: &str) {
        let mut state = self.lock();
        state.html.push_str(delta);
        state.chars += delta.chars().count();
    }

    fn on_complete(&mut self, output: &str) {
        let mut state = self.lock();
        state.html.clear();
        state.html.push_str(output);
        state.chars = output.chars().count();
        state.summary = Some(GenerationSummary::from_output(output, state.components));
        state.status = PreviewStatus::Completed;
    }

    fn on_error(&mut self, error: &StreamError) {
        let mut state = self.lock();
        state.error = Some(error.to_string());
        state.status = PreviewStatus::Failed;
    }
}
