//! Plain HTTP retrieval of embedded resources.

use crate::error::{ExtractError, Result};
use async_trait::async_trait;
use reqwest::Client;
use unmask_core::NetworkConfig;

/// Retrieves the body of a resource referenced by a page.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Fetch `url` and return its body as text.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// [`ResourceFetcher`] backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher with the configured timeout and user agent.
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.fetch_timeout())
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| ExtractError::ClientBuild(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_fetcher_builds_from_defaults() {
        assert!(HttpFetcher::new(&NetworkConfig::default()).is_ok());
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_fetch_missing_resource_is_error() {
        let fetcher = HttpFetcher::new(&NetworkConfig::default()).unwrap();
        let result = fetcher.fetch("https://example.com/definitely-missing.svg").await;
        assert!(matches!(result, Err(ExtractError::Status { status: 404, .. })));
    }
}
