#![deny(missing_docs)]
//! Shared vocabulary for the dashgen streaming client.
//!
//! This crate holds everything the streaming core and its callers agree on
//! without pulling in an HTTP stack:
//!
//! - [`request`]: the generation and optimization request bodies.
//! - [`error`]: [`StreamError`] and [`StorageError`].
//! - [`observer`]: the [`StreamObserver`] callback seam.
//! - [`history`]: the [`HistoryStore`] storage seam for generated dashboards.
//! - [`summary`]: progress estimation and the post-generation summary.

pub mod error;
pub mod history;
pub mod observer;
pub mod request;
pub mod summary;

pub use error::*;
pub use history::*;
pub use observer::*;
pub use request::*;
pub use summary::*;
