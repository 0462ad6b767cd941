//! Frame payload extraction and accumulation.

use std::borrow::Cow;

use crate::DATA_PREFIX;

/// Reverse the backend's escaping of line breaks.
///
/// The two-character sequences `\n` and `\r` become LF and CR. Each sequence
/// is replaced exactly once, scanning left to right; a backslash followed by
/// anything else is kept as is.
///
/// ```
/// use dashgen_stream::unescape_payload;
///
/// assert_eq!(unescape_payload(r"line1\nline2"), "line1\nline2");
/// assert_eq!(unescape_payload(r"C:\path"), r"C:\path");
/// ```
#[must_use]
pub fn unescape_payload(payload: &str) -> Cow<'_, str> {
    if !payload.contains('\\') {
        return Cow::Borrowed(payload);
    }

    let mut out = String::with_capacity(payload.len());
    let mut chars = payload.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('n') => {
                out.push('\n');
                chars.next();
            }
            Some('r') => {
                out.push('\r');
                chars.next();
            }
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Turns frames into deltas and keeps the running output.
///
/// Frames that don't start with the data prefix are dropped silently: the
/// backend occasionally emits comments and keep-alives, and a stray frame is
/// not worth failing a generation over.
#[derive(Debug, Default)]
pub struct ChunkDispatcher {
    output: String,
    delivered: usize,
    dropped: usize,
}

impl ChunkDispatcher {
    /// Create a dispatcher with empty output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one frame.
    ///
    /// Returns the unescaped delta, already appended to the accumulated
    /// output, or `None` if the frame was dropped.
    pub fn dispatch(&mut self, frame: &str) -> Option<&str> {
        let Some(payload) = frame.strip_prefix(DATA_PREFIX) else {
            self.dropped += 1;
            tracing::trace!(len = frame.len(), "dropping frame without data prefix");
            return None;
        };

        let start = self.output.len();
        self.output.push_str(&unescape_payload(payload));
        self.delivered += 1;
        Some(&self.output[start..])
    }

    /// Everything delivered so far.
    #[must_use]
    pub fn accumulated(&self) -> &str {
        &self.output
    }

    /// Number of data frames delivered.
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// Number of frames dropped for lacking the data prefix.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Take the accumulated output.
    #[must_use]
    pub fn into_output(self) -> String {
        self.output
    }
}
