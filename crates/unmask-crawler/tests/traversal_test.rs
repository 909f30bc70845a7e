use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use unmask_browser::{BrowserError, PageRenderer, ScriptEvaluator};
use unmask_core::{CrawlConfig, ScopeMode};
use unmask_crawler::{CrawlError, Crawler};
use unmask_extract::{EmailExtractor, ExtractError, ResourceFetcher};
use url::Url;

const ROOT: &str = "https://site.test/";

/// Serves canned pages and records every render.
#[derive(Default)]
struct FakeRenderer {
    pages: HashMap<String, String>,
    rendered: Mutex<Vec<String>>,
    closed: AtomicBool,
    cancel_on: Option<(String, CancellationToken)>,
}

impl FakeRenderer {
    fn with_page(mut self, url: &str, html: String) -> Self {
        self.pages.insert(url.to_string(), html);
        self
    }

    fn rendered(&self) -> Vec<String> {
        self.rendered.lock().unwrap().clone()
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageRenderer for FakeRenderer {
    async fn render(&self, url: &str) -> unmask_browser::Result<String> {
        self.rendered.lock().unwrap().push(url.to_string());
        if let Some((trigger, token)) = &self.cancel_on {
            if trigger == url {
                token.cancel();
            }
        }
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| BrowserError::NavigationError(format!("{url} not found")))
    }

    async fn close(&self) -> unmask_browser::Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct NoFetch;

#[async_trait]
impl ResourceFetcher for NoFetch {
    async fn fetch(&self, url: &str) -> unmask_extract::Result<String> {
        Err(ExtractError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

struct NoEval;

#[async_trait]
impl ScriptEvaluator for NoEval {
    async fn evaluate(&self, expression: &str) -> unmask_browser::Result<String> {
        Err(BrowserError::EvaluationError(expression.to_string()))
    }
}

fn page(email: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|link| format!("<a href=\"{link}\">link</a>\n"))
        .collect();
    format!("<html><body>\n<p>Contact: {email}</p>\n{anchors}</body></html>")
}

/// Root links to /a and /b, /a links to /c and back to the root.
fn site() -> FakeRenderer {
    FakeRenderer::default()
        .with_page(ROOT, page("root@site.test", &["/a", "/b", "mailto:x@site.test"]))
        .with_page("https://site.test/a", page("alpha@site.test", &["/c", "/"]))
        .with_page("https://site.test/b", page("bravo@site.test", &[]))
        .with_page("https://site.test/c", page("charlie@site.test", &[]))
}

fn crawl_config(max_depth: u32) -> CrawlConfig {
    CrawlConfig {
        max_depth,
        ..CrawlConfig::default()
    }
}

fn crawler(renderer: &Arc<FakeRenderer>, config: CrawlConfig, cancel: CancellationToken) -> Crawler {
    let extractor = EmailExtractor::new(Arc::new(NoFetch), Arc::new(NoEval));
    Crawler::new(renderer.clone(), extractor, config, cancel)
}

fn root() -> Url {
    Url::parse(ROOT).unwrap()
}

#[tokio::test]
async fn test_max_depth_one_visits_no_children() {
    let renderer = Arc::new(site());

    let outcome = crawler(&renderer, crawl_config(1), CancellationToken::new())
        .run(root())
        .await
        .unwrap();

    assert_eq!(renderer.rendered(), vec![ROOT]);
    assert_eq!(outcome.pages_visited, 1);
    assert!(outcome.emails.contains("root@site.test"));
    assert!(!outcome.emails.contains("alpha@site.test"));
    assert!(renderer.is_closed());
}

#[tokio::test]
async fn test_depth_first_in_discovery_order() {
    let renderer = Arc::new(site());

    let outcome = crawler(&renderer, crawl_config(3), CancellationToken::new())
        .run(root())
        .await
        .unwrap();

    assert_eq!(
        renderer.rendered(),
        vec![
            ROOT,
            "https://site.test/a",
            "https://site.test/c",
            "https://site.test/b",
        ]
    );
    // Four page bodies plus the mailto link on the root
    assert_eq!(outcome.emails.len(), 5);
    assert!(outcome.emails.contains("charlie@site.test"));
    assert!(outcome.emails.contains("x@site.test"));
}

#[tokio::test]
async fn test_visited_pages_are_not_rendered_again() {
    let renderer = Arc::new(site());

    crawler(&renderer, crawl_config(5), CancellationToken::new())
        .run(root())
        .await
        .unwrap();

    let rendered = renderer.rendered();
    assert_eq!(rendered.iter().filter(|u| *u == ROOT).count(), 1);
    assert_eq!(rendered.len(), 4);
}

#[tokio::test]
async fn test_page_reached_deep_first_is_revisited_from_shallower_path() {
    // /b is first reached through /a at depth 3, where its children are out
    // of range; the direct link from the root reaches it again at depth 2.
    let renderer = Arc::new(
        FakeRenderer::default()
            .with_page(ROOT, page("root@site.test", &["/a", "/b"]))
            .with_page("https://site.test/a", page("alpha@site.test", &["/b"]))
            .with_page("https://site.test/b", page("bravo@site.test", &["/c"]))
            .with_page("https://site.test/c", page("charlie@site.test", &[])),
    );

    let outcome = crawler(&renderer, crawl_config(3), CancellationToken::new())
        .run(root())
        .await
        .unwrap();

    assert_eq!(
        renderer.rendered(),
        vec![
            ROOT,
            "https://site.test/a",
            "https://site.test/b",
            "https://site.test/b",
            "https://site.test/c",
        ]
    );
    assert!(outcome.emails.contains("charlie@site.test"));
}

#[tokio::test]
async fn test_allow_revisits_follows_cycles_until_depth_limit() {
    let renderer = Arc::new(site());
    let config = CrawlConfig {
        allow_revisits: true,
        ..crawl_config(3)
    };

    crawler(&renderer, config, CancellationToken::new())
        .run(root())
        .await
        .unwrap();

    assert_eq!(
        renderer.rendered(),
        vec![
            ROOT,
            "https://site.test/a",
            "https://site.test/c",
            ROOT,
            "https://site.test/b",
        ]
    );
}

#[tokio::test]
async fn test_failed_render_ends_only_its_branch() {
    let renderer = Arc::new(
        FakeRenderer::default()
            .with_page(ROOT, page("root@site.test", &["/missing", "/blank", "/ok"]))
            .with_page("https://site.test/blank", "   ".to_string())
            .with_page("https://site.test/ok", page("ok@site.test", &[])),
    );

    let outcome = crawler(&renderer, crawl_config(2), CancellationToken::new())
        .run(root())
        .await
        .unwrap();

    assert_eq!(outcome.pages_visited, 2);
    assert_eq!(outcome.pages_failed, 2);
    assert!(outcome.emails.contains("root@site.test"));
    assert!(outcome.emails.contains("ok@site.test"));
}

#[tokio::test]
async fn test_scope_limits_children() {
    let renderer = Arc::new(
        FakeRenderer::default()
            .with_page(
                "https://site.test/blog/",
                page("blog@site.test", &["/blog/post", "/shop", "https://other.test/blog/"]),
            )
            .with_page("https://site.test/blog/post", page("post@site.test", &[])),
    );
    let config = CrawlConfig {
        scope_mode: ScopeMode::HostPathPrefix,
        ..crawl_config(2)
    };

    crawler(&renderer, config, CancellationToken::new())
        .run(Url::parse("https://site.test/blog/").unwrap())
        .await
        .unwrap();

    assert_eq!(
        renderer.rendered(),
        vec!["https://site.test/blog/", "https://site.test/blog/post"]
    );
}

#[tokio::test]
async fn test_per_page_cap() {
    let html = "<p>a@site.test b@site.test c@site.test d@site.test</p>".to_string();
    let renderer = Arc::new(FakeRenderer::default().with_page(ROOT, html));
    let config = CrawlConfig {
        max_addresses_per_page: Some(2),
        ..crawl_config(1)
    };

    let outcome = crawler(&renderer, config, CancellationToken::new())
        .run(root())
        .await
        .unwrap();

    assert_eq!(outcome.emails.len(), 2);
}

#[tokio::test]
async fn test_cancelled_before_start_renders_nothing() {
    let renderer = Arc::new(site());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = crawler(&renderer, crawl_config(3), cancel)
        .run(root())
        .await
        .unwrap();

    assert!(outcome.cancelled);
    assert!(renderer.rendered().is_empty());
    assert!(outcome.emails.is_empty());
    assert!(renderer.is_closed());
}

#[tokio::test]
async fn test_cancellation_keeps_collected_addresses() {
    let cancel = CancellationToken::new();
    let mut renderer = site();
    renderer.cancel_on = Some((ROOT.to_string(), cancel.clone()));
    let renderer = Arc::new(renderer);

    let outcome = crawler(&renderer, crawl_config(3), cancel)
        .run(root())
        .await
        .unwrap();

    assert!(outcome.cancelled);
    assert_eq!(renderer.rendered(), vec![ROOT]);
    assert!(outcome.emails.contains("root@site.test"));
    assert!(renderer.is_closed());
}

#[tokio::test]
async fn test_non_http_start_is_rejected_and_renderer_closed() {
    let renderer = Arc::new(site());

    let result = crawler(&renderer, crawl_config(3), CancellationToken::new())
        .run(Url::parse("ftp://site.test/").unwrap())
        .await;

    assert!(matches!(result, Err(CrawlError::InvalidStartUrl { .. })));
    assert!(renderer.rendered().is_empty());
    assert!(renderer.is_closed());
}
