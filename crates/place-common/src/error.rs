//! Error types for placemap crates.

use thiserror::Error;

/// Result type alias using PlaceError.
pub type PlaceResult<T> = Result<T, PlaceError>;

/// Primary error type for place API operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlaceError {
    /// Network or HTTP failure, with the underlying cause.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service responded, but with no data.
    #[error("No results in response")]
    EmptyResult,

    /// Malformed geometry, zoom or distance input, raised at build time.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The payload arrived but could not be parsed as the requested format.
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl PlaceError {
    /// True for failures the caller can fix by changing its input.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, PlaceError::InvalidArgument(_))
    }
}

impl From<serde_json::Error> for PlaceError {
    fn from(err: serde_json::Error) -> Self {
        PlaceError::Decode(err.to_string())
    }
}
