use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserError>;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("chromium error: {0}")]
    ChromiumError(String),

    #[error("navigation failed: {0}")]
    NavigationError(String),

    #[error("empty page: {0}")]
    EmptyPage(String),

    #[error("evaluation failed: {0}")]
    EvaluationError(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("browser already closed")]
    Closed,
}

impl From<BrowserError> for unmask_core::UnmaskError {
    fn from(err: BrowserError) -> Self {
        Self::Browser(err.to_string())
    }
}
