//! Link extraction and scope filtering.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::HashSet;
use unmask_core::ScopeMode;
use url::Url;

static LINK_TARGETS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a, iframe, frame").expect("link selector is hardcoded and valid")
});

/// Absolute, in-scope link targets of a page, in document order without
/// duplicates.
///
/// Each `a`, `iframe` and `frame` contributes its `href`, or its `src` when
/// it has no `href`. Targets are resolved against `base`; empty, unparsable
/// and non-HTTP targets are dropped.
pub fn links(html: &str, base: &Url, scope: ScopeMode) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();

    document
        .select(&LINK_TARGETS)
        .filter_map(|el| el.value().attr("href").or_else(|| el.value().attr("src")))
        .map(str::trim)
        .filter(|target| !target.is_empty())
        .filter_map(|target| match base.join(target) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::debug!(link = target, error = %e, "skipping unparsable link");
                None
            }
        })
        .filter(is_crawlable)
        .filter(|url| in_scope(base, url, scope))
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Whether a URL uses a scheme the renderer can fetch.
pub fn is_crawlable(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Whether `link` falls inside the crawl scope rooted at `base`.
pub fn in_scope(base: &Url, link: &Url, scope: ScopeMode) -> bool {
    match scope {
        ScopeMode::HostOnly => same_origin(base, link),
        ScopeMode::HostPathPrefix => {
            same_origin(base, link) && link.path().starts_with(base.path())
        }
        ScopeMode::Unrestricted => true,
    }
}

fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
}
