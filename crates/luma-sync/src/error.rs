//! Error types for luma-sync.

/// Result type for luma-sync operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in luma-sync.
///
/// Transport and server failures never reach the UI synchronously: the sweep
/// records them as `failed` entry status and returns a
/// [`SweepOutcome`](crate::SweepOutcome). Only store persistence failures
/// (and manual "sync now" calls) propagate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The sync endpoint is not reachable (includes timeouts).
    #[error("Sync endpoint not reachable at {url}: {source}")]
    NotReachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Invalid base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The endpoint returned a non-2xx response; the whole batch counts as
    /// failed.
    #[error("Sync API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Persisting sweep bookkeeping to the local store failed.
    #[error(transparent)]
    Store(#[from] luma_store::Error),
}

impl Error {
    /// Whether this error came from the transport/server side of a sweep
    /// (as opposed to local store bookkeeping).
    #[must_use]
    pub fn is_transport(&self) -> bool {
        !matches!(self, Error::Store(_) | Error::InvalidUrl(_))
    }
}
