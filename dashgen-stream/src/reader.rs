//! Byte chunks in, text frames out.
//!
//! The transport delivers bytes at arbitrary boundaries: a multi-byte UTF-8
//! character or a frame delimiter may be split across two chunks. The
//! [`Utf8Decoder`] holds back incomplete sequences and the [`FrameReader`]
//! holds back incomplete frames, so neither split is observable downstream.

use bytes::Bytes;
use dashgen_types::StreamError;
use futures::{Stream, StreamExt};

use crate::{DATA_PREFIX, FRAME_DELIMITER};

/// Incremental UTF-8 decoder.
///
/// A sequence cut off at the end of a chunk is kept until the next chunk
/// completes it. Bytes that can never form a valid sequence are replaced with
/// U+FFFD instead of failing the stream.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Create an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk, returning all text that is complete so far.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let joined;
        let mut rest: &[u8] = if self.pending.is_empty() {
            chunk
        } else {
            let mut buf = std::mem::take(&mut self.pending);
            buf.extend_from_slice(chunk);
            joined = buf;
            &joined
        };

        let mut out = String::with_capacity(rest.len());
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            // Incomplete sequence at the end of input.
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush whatever is still held back. Incomplete bytes decode lossily.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        let pending = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&pending).into_owned()
    }

    /// Number of bytes waiting for the rest of their sequence.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Split buffered text into complete frames and the trailing remainder.
///
/// Frames are returned in order and without their delimiters. The remainder
/// is everything after the last delimiter and may be empty.
///
/// ```
/// use dashgen_stream::split_frames;
///
/// let (frames, rest) = split_frames("data:a\n\ndata:b\n\ndata:c");
/// assert_eq!(frames, vec!["data:a", "data:b"]);
/// assert_eq!(rest, "data:c");
/// ```
#[must_use]
pub fn split_frames(buffered: &str) -> (Vec<&str>, &str) {
    let mut frames = Vec::new();
    let mut rest = buffered;
    while let Some(pos) = rest.find(FRAME_DELIMITER) {
        frames.push(&rest[..pos]);
        rest = &rest[pos + FRAME_DELIMITER.len()..];
    }
    (frames, rest)
}

/// Decoder plus frame buffer for one session.
#[derive(Debug, Default)]
pub struct FrameReader {
    decoder: Utf8Decoder,
    buffer: String,
}

impl FrameReader {
    /// Create an empty reader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one transport chunk and return every frame it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let text = self.decoder.decode(chunk);
        if text.is_empty() {
            return Vec::new();
        }
        // Held-back text never contains a delimiter, so only the new text and
        // the byte before it can complete one.
        let scan_from = self.buffer.len().saturating_sub(FRAME_DELIMITER.len() - 1);
        self.buffer.push_str(&text);
        if !contains_delimiter(&self.buffer.as_bytes()[scan_from..]) {
            return Vec::new();
        }

        let (frames, consumed) = {
            let (frames, rest) = split_frames(&self.buffer);
            let frames: Vec<String> = frames.into_iter().map(str::to_owned).collect();
            (frames, self.buffer.len() - rest.len())
        };
        self.buffer.drain(..consumed);
        frames
    }

    /// Text held back waiting for a delimiter.
    #[must_use]
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    /// End of stream: the residual segment, if it is a data frame.
    ///
    /// The backend does not terminate its last frame with a blank line, so a
    /// non-empty residual starting with the data prefix counts as one final
    /// frame. Anything else left over is discarded.
    #[must_use]
    pub fn finish(mut self) -> Option<String> {
        let tail = self.decoder.finish();
        self.buffer.push_str(&tail);
        if self.buffer.starts_with(DATA_PREFIX) {
            Some(self.buffer)
        } else {
            if !self.buffer.is_empty() {
                tracing::trace!(len = self.buffer.len(), "discarding residual without data prefix");
            }
            None
        }
    }
}

fn contains_delimiter(bytes: &[u8]) -> bool {
    bytes
        .windows(FRAME_DELIMITER.len())
        .any(|w| w == FRAME_DELIMITER.as_bytes())
}

/// Turn a transport byte stream into a lazy, ordered stream of frames.
///
/// A transport error is yielded once and ends the stream. The returned stream
/// cannot be restarted; a new attempt needs a new byte stream.
pub fn frames<S>(bytes: S) -> impl Stream<Item = Result<String, StreamError>> + Send + 'static
where
    S: Stream<Item = Result<Bytes, StreamError>> + Send + 'static,
{
    async_stream::stream! {
        let mut bytes = std::pin::pin!(bytes);
        let mut reader = FrameReader::new();

        while let Some(chunk) = bytes.next().await {
            match chunk {
                Ok(chunk) => {
                    for frame in reader.push(&chunk) {
                        yield Ok(frame);
                    }
                }
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }

        if let Some(frame) = reader.finish() {
            yield Ok(frame);
        }
    }
}
