//! Depth-bounded crawl driver.
//!
//! Pages are visited depth-first from an explicit work list. Each visit
//! renders the page, harvests its addresses and, while depth allows, pushes
//! the in-scope links it finds. Render failures end only the branch they
//! occur on.

use crate::error::{CrawlError, Result};
use crate::links;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use unmask_browser::PageRenderer;
use unmask_core::{CrawlConfig, EmailSet, FrontierNode};
use unmask_extract::EmailExtractor;
use url::Url;

/// What a finished crawl produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CrawlOutcome {
    /// Every address harvested, before validation
    pub emails: EmailSet,
    /// Pages successfully rendered and harvested
    pub pages_visited: usize,
    /// Pages whose render failed or came back blank
    pub pages_failed: usize,
    /// Whether the crawl stopped early on cancellation
    pub cancelled: bool,
}

/// Record a visit to `node` unless its URL was already visited at the same
/// or a shallower depth.
///
/// A page first reached through a deep path is visited again when a shallower
/// path reaches it, since its children then fit within the depth limit.
fn admit(visited: &mut HashMap<String, u32>, node: &FrontierNode) -> bool {
    let key = node.visit_key();
    if visited.get(&key).is_some_and(|&depth| depth <= node.depth) {
        return false;
    }
    visited.insert(key, node.depth);
    true
}

/// Drives a crawl over one renderer session.
pub struct Crawler {
    renderer: Arc<dyn PageRenderer>,
    extractor: EmailExtractor,
    config: CrawlConfig,
    cancel: CancellationToken,
}

impl Crawler {
    /// Create a crawler. `cancel` stops the crawl before its next fetch.
    pub fn new(
        renderer: Arc<dyn PageRenderer>,
        extractor: EmailExtractor,
        config: CrawlConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            renderer,
            extractor,
            config,
            cancel,
        }
    }

    /// Crawl from `start` and close the renderer, whatever the result.
    pub async fn run(&self, start: Url) -> Result<CrawlOutcome> {
        let outcome = self.traverse(start).await;

        if let Err(e) = self.renderer.close().await {
            warn!(error = %e, "failed to close renderer");
        }

        outcome
    }

    async fn traverse(&self, start: Url) -> Result<CrawlOutcome> {
        if !links::is_crawlable(&start) {
            return Err(CrawlError::InvalidStartUrl {
                url: start.to_string(),
                reason: format!("unsupported scheme {}", start.scheme()),
            });
        }

        info!(
            url = %start,
            max_depth = self.config.max_depth,
            scope = %self.config.scope_mode,
            "starting crawl"
        );

        let mut outcome = CrawlOutcome::default();
        // URL (without fragment) -> shallowest depth it has been visited at
        let mut visited: HashMap<String, u32> = HashMap::new();
        let mut stack = vec![FrontierNode::root(start)];

        while let Some(node) = stack.pop() {
            if self.cancel.is_cancelled() {
                info!("crawl cancelled");
                outcome.cancelled = true;
                break;
            }
            if node.exceeds(self.config.max_depth) {
                continue;
            }
            if !self.config.allow_revisits && !admit(&mut visited, &node) {
                debug!(url = %node.url, depth = node.depth, "already visited");
                continue;
            }

            let Some(html) = self.fetch(&node, &mut outcome).await else {
                continue;
            };

            let mut found = self.extractor.harvest_page(&html, &node.url).await;
            if let Some(cap) = self.config.max_addresses_per_page {
                found.truncate(cap);
            }
            debug!(url = %node.url, depth = node.depth, found = found.len(), "visited page");
            outcome.emails.merge(found);
            outcome.pages_visited += 1;

            if node.depth >= self.config.max_depth {
                continue;
            }
            let children = links::links(&html, &node.url, self.config.scope_mode);
            stack.extend(children.into_iter().rev().map(|url| node.child(url)));
        }

        info!(
            pages = outcome.pages_visited,
            failed = outcome.pages_failed,
            emails = outcome.emails.len(),
            "crawl finished"
        );
        Ok(outcome)
    }

    /// Render one page, racing the fetch against cancellation.
    async fn fetch(&self, node: &FrontierNode, outcome: &mut CrawlOutcome) -> Option<String> {
        let rendered = tokio::select! {
            () = self.cancel.cancelled() => {
                info!(url = %node.url, "crawl cancelled during fetch");
                outcome.cancelled = true;
                return None;
            }
            rendered = self.renderer.render(node.url.as_str()) => rendered,
        };

        match rendered {
            Ok(html) if !html.trim().is_empty() => Some(html),
            Ok(_) => {
                warn!(url = %node.url, "blank page");
                outcome.pages_failed += 1;
                None
            }
            Err(e) => {
                warn!(url = %node.url, error = %e, "failed to render page");
                outcome.pages_failed += 1;
                None
            }
        }
    }
}
