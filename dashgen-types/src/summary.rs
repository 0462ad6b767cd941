//! Progress estimation while streaming, and the summary built afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Expected size of a generated dashboard, in characters (not bytes).
pub const ESTIMATED_OUTPUT_LEN: usize = 5000;

/// Progress reported before the first byte arrives.
pub const PROGRESS_FLOOR: f64 = 30.0;

/// Progress never passes this value until the stream completes.
pub const PROGRESS_CEILING: f64 = 90.0;

/// Estimate completion percentage from the number of characters received so
/// far. Pass a character count, not `str::len`: CJK-heavy output is three
/// bytes per character and would otherwise saturate early.
///
/// Output length grows the estimate linearly from [`PROGRESS_FLOOR`] and it
/// saturates at [`PROGRESS_CEILING`]; only completion reports 100.
#[must_use]
pub fn estimate_progress(output_chars: usize) -> f64 {
    let ratio = output_chars as f64 / ESTIMATED_OUTPUT_LEN as f64;
    (ratio * 60.0 + PROGRESS_FLOOR).min(PROGRESS_CEILING)
}

/// Statistics about a finished generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSummary {
    /// Number of lines in the generated document.
    pub lines_of_code: usize,
    /// Document size in KiB of UTF-8, rounded to the nearest integer.
    pub size_kib: u64,
    /// Number of components requested.
    pub components: usize,
    /// When the generation finished.
    pub generated_at: DateTime<Utc>,
}

impl GenerationSummary {
    /// Summarise a completed output.
    #[must_use]
    pub fn from_output(output: &str, components: usize) -> Self {
        Self {
            lines_of_code: output.split('\n').count(),
            size_kib: (output.len() as f64 / 1024.0).round() as u64,
            components,
            generated_at: Utc::now(),
        }
    }
}
