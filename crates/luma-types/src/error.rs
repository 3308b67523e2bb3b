//! Error types for data parsing.

/// Result type for parsing operations.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Errors that can occur when parsing journal data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The sync status string is not one of the known variants.
    #[error("Unknown sync status: {0}")]
    UnknownSyncStatus(String),

    /// A timestamp string could not be parsed as RFC 3339.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
