//! Error types for search providers

use thiserror::Error;

/// Search provider errors
///
/// These never reach the UI: `SearchClient` logs them and substitutes
/// placeholder results.
#[derive(Error, Debug)]
pub enum SearchError {
    /// No API key or access token configured for the provider
    #[error("Missing credentials for {0}")]
    MissingCredentials(String),

    /// API request returned a non-success status
    #[error("Search API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Transport failure from the host HTTP client
    #[error(transparent)]
    BridgeError(#[from] bridge_traits::error::BridgeError),
}

/// Result type for search operations
pub type Result<T> = std::result::Result<T, SearchError>;

impl From<serde_json::Error> for SearchError {
    fn from(error: serde_json::Error) -> Self {
        SearchError::ParseError(error.to_string())
    }
}
