use reqwest::StatusCode;
use thiserror::Error;

/// Fatal-to-load failures. Everything below row granularity degrades
/// silently inside the decoder instead of surfacing here.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The feed request failed before any text arrived.
    #[error("feed request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The feed answered with a non-success status.
    #[error("feed returned HTTP {status}")]
    FeedStatus { status: StatusCode },

    /// The fetched body could not be read as CSV text at all.
    #[error("feed is not readable as CSV: {0}")]
    Csv(#[from] csv::Error),
}
