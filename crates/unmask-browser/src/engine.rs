use crate::actions::{sandboxed_expression, PageRenderer, ScriptEvaluator};
use crate::error::{BrowserError, Result};
use crate::fingerprint::FingerprintConfig;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::target::CloseTargetParams;
use chromiumoxide::Page;
use futures_util::stream::StreamExt;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use unmask_core::config::BrowserConfig as BrowserSettings;

/// Browser automation engine.
///
/// One browser session serves the whole crawl: a single tab is reused for
/// every page render. Each expression evaluation gets its own blank tab, which
/// is closed afterwards, so evaluated code never sees a crawled page and a
/// hung or self-navigating expression cannot affect the next one.
pub struct BrowserEngine {
    browser: Mutex<Option<Browser>>,
    page: Page,
    handler: JoinHandle<()>,
    fingerprint: FingerprintConfig,
    navigation_timeout: Duration,
    script_timeout: Duration,
}

impl BrowserEngine {
    /// Launch a browser with default settings and a randomized fingerprint
    pub async fn new() -> Result<Self> {
        Self::launch(&BrowserSettings::default()).await
    }

    /// Launch a browser from configuration
    pub async fn launch(settings: &BrowserSettings) -> Result<Self> {
        let fingerprint = FingerprintConfig::with_user_agent(settings.user_agent.as_deref());

        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(fingerprint.viewport_width, fingerprint.viewport_height)
            .arg(format!("--user-agent={}", fingerprint.user_agent));
        if !settings.headless {
            builder = builder.with_head();
        }
        if settings.disable_cookies {
            builder = builder.arg("--disable-cookies");
        }
        let config = builder.build().map_err(BrowserError::ChromiumError)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        // Spawn browser handler
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler event error: {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        tracing::info!(
            "Browser launched (headless: {}, cookies disabled: {})",
            settings.headless,
            settings.disable_cookies
        );

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            page,
            handler,
            fingerprint,
            navigation_timeout: settings.navigation_timeout(),
            script_timeout: settings.script_timeout(),
        })
    }

    /// User agent presented to sites
    pub fn user_agent(&self) -> &str {
        &self.fingerprint.user_agent
    }

    async fn ensure_open(&self) -> Result<()> {
        if self.browser.lock().await.is_none() {
            return Err(BrowserError::Closed);
        }
        Ok(())
    }

    async fn navigate_and_read(&self, url: &str) -> Result<String> {
        self.page
            .goto(url)
            .await
            .map_err(|e| BrowserError::NavigationError(format!("{url}: {e}")))?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| BrowserError::NavigationError(format!("{url}: {e}")))?;
        self.page
            .content()
            .await
            .map_err(|e| BrowserError::NavigationError(format!("{url}: {e}")))
    }

    async fn open_scratch_page(&self) -> Result<Page> {
        let guard = self.browser.lock().await;
        let browser = guard.as_ref().ok_or(BrowserError::Closed)?;
        browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))
    }

    /// Close a scratch tab through the browser target, which works even while
    /// its renderer is stuck in a script.
    async fn discard_page(&self, page: Page) {
        let guard = self.browser.lock().await;
        let Some(browser) = guard.as_ref() else {
            return;
        };
        let close = browser.execute(CloseTargetParams::new(page.target_id().clone()));
        match tokio::time::timeout(self.script_timeout, close).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => tracing::debug!("closing scratch tab failed: {}", e),
            Err(_) => tracing::debug!("closing scratch tab timed out"),
        }
    }
}

#[async_trait::async_trait]
impl PageRenderer for BrowserEngine {
    async fn render(&self, url: &str) -> Result<String> {
        self.ensure_open().await?;

        let html = tokio::time::timeout(self.navigation_timeout, self.navigate_and_read(url))
            .await
            .map_err(|_| {
                BrowserError::Timeout(format!("{url} after {:?}", self.navigation_timeout))
            })??;

        if html.trim().is_empty() {
            return Err(BrowserError::EmptyPage(url.to_string()));
        }
        Ok(html)
    }

    async fn close(&self) -> Result<()> {
        let Some(mut browser) = self.browser.lock().await.take() else {
            return Ok(());
        };

        let closed = browser
            .close()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()));
        if let Err(e) = browser.wait().await {
            tracing::debug!("waiting for browser exit failed: {}", e);
        }
        self.handler.abort();
        tracing::info!("Browser closed");
        closed.map(|_| ())
    }
}

#[async_trait::async_trait]
impl ScriptEvaluator for BrowserEngine {
    async fn evaluate(&self, expression: &str) -> Result<String> {
        let page = self.open_scratch_page().await?;

        let wrapped = sandboxed_expression(expression);
        let outcome = tokio::time::timeout(self.script_timeout, page.evaluate(wrapped)).await;
        self.discard_page(page).await;

        let result = outcome
            .map_err(|_| BrowserError::Timeout(format!("expression after {:?}", self.script_timeout)))?
            .map_err(|e| BrowserError::EvaluationError(e.to_string()))?;

        result
            .into_value::<String>()
            .map_err(|e| BrowserError::EvaluationError(e.to_string()))
    }
}

impl Drop for BrowserEngine {
    fn drop(&mut self) {
        self.handler.abort();
    }
}
