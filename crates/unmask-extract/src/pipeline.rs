//! The text pipeline and the per-page harvest built on it.

use crate::harvest::{self, PageScan};
use crate::{cipher, decoder, patterns, tokens, ResourceFetcher};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, warn};
use unmask_browser::ScriptEvaluator;
use unmask_core::{EmailSet, FragmentOrigin, RawFragment};
use url::Url;

static HTML_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment regex is hardcoded and valid"));

static HTML_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag regex is hardcoded and valid"));

/// Run one fragment through the full text pipeline.
///
/// Decodes the fragment, appends any rotation-cipher solutions, strips markup,
/// rewrites spelled-out separators and matches both address grammars.
pub fn extract_emails(fragment: RawFragment<'_>) -> Vec<String> {
    let mut text = decoder::normalize(fragment);

    let rotations = cipher::try_rotations(&text);
    if !rotations.is_empty() {
        debug!(origin = %fragment.origin, count = rotations.len(), "rotation cipher solved");
    }
    text.push(' ');
    text.push_str(&rotations.join(" "));

    let text = HTML_COMMENT.replace_all(&text, "");
    let text = HTML_TAG.replace_all(&text, "");
    let text = tokens::canonicalize(&text);

    patterns::extract(&text)
}

/// Harvests every address a page exposes, through all structural harvesters.
#[derive(Clone)]
pub struct EmailExtractor {
    fetcher: Arc<dyn ResourceFetcher>,
    evaluator: Arc<dyn ScriptEvaluator>,
}

impl EmailExtractor {
    /// Create an extractor using `fetcher` for embedded SVGs and `evaluator`
    /// for `javascript:` links.
    pub fn new(fetcher: Arc<dyn ResourceFetcher>, evaluator: Arc<dyn ScriptEvaluator>) -> Self {
        Self { fetcher, evaluator }
    }

    /// Collect the addresses of one rendered page.
    ///
    /// Failed fetches and evaluations are logged and contribute nothing; they
    /// never abort the rest of the page.
    pub async fn harvest_page(&self, html: &str, page_url: &Url) -> EmailSet {
        let scan = PageScan::parse(html, page_url);
        let mut emails = EmailSet::new();

        for payload in &scan.cf_payloads {
            match harvest::decode_cf_email(payload) {
                Some(decoded) => {
                    emails.extend(extract_emails(RawFragment::new(&decoded, FragmentOrigin::Attribute)));
                }
                None => debug!(payload = %payload, "skipping malformed cfemail payload"),
            }
        }

        for svg_url in &scan.svg_urls {
            match self.fetcher.fetch(svg_url.as_str()).await {
                Ok(body) => {
                    let text = harvest::svg_text(&body);
                    emails.extend(extract_emails(RawFragment::new(&text, FragmentOrigin::Svg)));
                }
                Err(e) => warn!(url = %svg_url, error = %e, "failed to fetch embedded svg"),
            }
        }

        emails.extend(extract_emails(RawFragment::new(html, FragmentOrigin::Body)));

        for href in &scan.hrefs {
            match harvest::script_expression(href) {
                Some(expression) => {
                    let output = self.evaluate(expression).await;
                    emails.extend(extract_emails(RawFragment::new(&output, FragmentOrigin::Script)));
                }
                None => emails.extend(extract_emails(RawFragment::new(href, FragmentOrigin::Link))),
            }
        }

        debug!(url = %page_url, found = emails.len(), "harvested page");
        emails
    }

    async fn evaluate(&self, expression: &str) -> String {
        match self.evaluator.evaluate(expression).await {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, "javascript link evaluation failed");
                String::new()
            }
        }
    }
}

impl std::fmt::Debug for EmailExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailExtractor").finish_non_exhaustive()
    }
}
