//! Error types for resource retrieval.

use thiserror::Error;

/// Result alias for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Failures while fetching embedded resources.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Transport-level failure
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response status
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Client construction failed
    #[error("failed to build http client: {0}")]
    ClientBuild(String),
}

impl From<ExtractError> for unmask_core::UnmaskError {
    fn from(err: ExtractError) -> Self {
        Self::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let err = ExtractError::Status {
            url: "https://example.com/logo.svg".to_string(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "https://example.com/logo.svg returned HTTP 404"
        );
    }

    #[test]
    fn test_into_core_error() {
        let err: unmask_core::UnmaskError = ExtractError::ClientBuild("tls".to_string()).into();
        assert!(matches!(err, unmask_core::UnmaskError::Network(_)));
    }
}
