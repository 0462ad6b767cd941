#![deny(missing_docs)]
//! Cancellable streaming client for AI-generated dashboards.
//!
//! The backend streams generated HTML as blank-line separated frames of the
//! form `data:<payload>`, with newlines inside the payload escaped as the
//! two-character sequences `\n` and `\r`. This crate turns that byte stream
//! back into text deltas and hands them to a [`StreamObserver`]:
//!
//! ```text
//! bytes ──► reader (UTF-8 + framing) ──► dispatch (unescape, accumulate) ──► observer
//!                     ▲
//!        session (state machine, cancellation)
//! ```
//!
//! Entry points live on [`DashboardClient`]; each call spawns one session
//! and returns its [`CancelHandle`] immediately.
//!
//! [`StreamObserver`]: dashgen_types::StreamObserver

mod error;

pub mod client;
pub mod config;
pub mod dispatch;
pub mod preview;
pub mod reader;
pub mod session;
pub mod transport;

pub use client::DashboardClient;
pub use config::{ClientConfig, ConfigError};
pub use dispatch::{ChunkDispatcher, unescape_payload};
pub use preview::{PreviewBuffer, PreviewStatus};
pub use reader::{FrameReader, Utf8Decoder, frames, split_frames};
pub use session::{CancelHandle, Session, SessionOutcome, SessionState};
pub use transport::{ByteStream, Endpoint, HttpTransport, Transport};

/// Marker every data frame starts with.
pub const DATA_PREFIX: &str = "data:";

/// Separator between frames.
pub const FRAME_DELIMITER: &str = "\n\n";
