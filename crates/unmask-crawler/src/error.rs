use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("cannot crawl {url}: {reason}")]
    InvalidStartUrl { url: String, reason: String },

    #[error("Browser error: {0}")]
    Browser(#[from] unmask_browser::BrowserError),

    #[error("Extract error: {0}")]
    Extract(#[from] unmask_extract::ExtractError),

    #[error("DNS resolver setup failed: {0}")]
    Resolver(String),

    #[error("failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CrawlError>;

impl From<CrawlError> for unmask_core::UnmaskError {
    fn from(err: CrawlError) -> Self {
        match err {
            CrawlError::Output { source, .. } => Self::Io(source),
            CrawlError::Browser(e) => e.into(),
            CrawlError::Extract(e) => e.into(),
            other => Self::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_error_keeps_path() {
        let err = CrawlError::Output {
            path: PathBuf::from("/tmp/emails.txt"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/tmp/emails.txt"));

        let core: unmask_core::UnmaskError = err.into();
        assert!(matches!(core, unmask_core::UnmaskError::Io(_)));
    }
}
