//! Structural harvesters: markup constructs that hide addresses from a plain
//! text scan.

use crate::decoder;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

static CF_EMAIL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[data-cfemail]").expect("cfemail selector is hardcoded and valid"));

static EMBEDDED: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("object[data], img[src], embed[src]")
        .expect("embed selector is hardcoded and valid")
});

static ANCHOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("anchor selector is hardcoded and valid"));

const SCRIPT_SCHEME: &str = "javascript:";

/// Everything the harvesters need from one page, collected in a single parse.
///
/// The parsed document is not `Send`, so it is dropped before any fetch or
/// evaluation is awaited.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageScan {
    /// Raw `data-cfemail` payloads
    pub cf_payloads: Vec<String>,
    /// Absolute URLs of embedded SVG documents
    pub svg_urls: Vec<Url>,
    /// Anchor `href` values, untouched
    pub hrefs: Vec<String>,
}

impl PageScan {
    /// Parse `html` and collect harvester inputs, resolving embedded
    /// resources against `page_url`.
    pub fn parse(html: &str, page_url: &Url) -> Self {
        let document = Html::parse_document(html);

        let cf_payloads = document
            .select(&CF_EMAIL)
            .filter_map(|el| el.value().attr("data-cfemail"))
            .map(str::to_string)
            .collect();

        let svg_urls = document
            .select(&EMBEDDED)
            .filter_map(|el| el.value().attr("data").or_else(|| el.value().attr("src")))
            .filter_map(|target| match page_url.join(target.trim()) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::debug!(embed = target, error = %e, "skipping unresolvable embed");
                    None
                }
            })
            .filter(is_svg)
            .collect();

        let hrefs = document
            .select(&ANCHOR)
            .filter_map(|el| el.value().attr("href"))
            .map(str::to_string)
            .collect();

        Self {
            cf_payloads,
            svg_urls,
            hrefs,
        }
    }
}

fn is_svg(url: &Url) -> bool {
    url.path().to_ascii_lowercase().ends_with(".svg")
}

/// Decode a `data-cfemail` payload.
///
/// The first hex byte is the XOR key for every byte after it. Returns `None`
/// for malformed hex, an empty payload, or output that is not UTF-8.
pub fn decode_cf_email(payload: &str) -> Option<String> {
    let bytes = hex::decode(payload.trim()).ok()?;
    let (key, body) = bytes.split_first()?;
    if body.is_empty() {
        return None;
    }

    let decoded: Vec<u8> = body.iter().map(|b| b ^ key).collect();
    String::from_utf8(decoded).ok()
}

/// The expression of a `javascript:` URI, or `None` for any other link.
pub fn script_expression(href: &str) -> Option<&str> {
    let trimmed = href.trim_start();
    let prefix = trimmed.get(..SCRIPT_SCHEME.len())?;
    prefix
        .eq_ignore_ascii_case(SCRIPT_SCHEME)
        .then(|| &trimmed[SCRIPT_SCHEME.len()..])
}

/// Text content of an SVG document with hex character references decoded.
pub fn svg_text(body: &str) -> String {
    let document = Html::parse_document(body);
    let text: String = document.root_element().text().collect();
    decoder::decode_hex_char_refs(&text).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_cf(address: &str, key: u8) -> String {
        std::iter::once(key)
            .chain(address.bytes().map(|b| b ^ key))
            .map(|b| format!("{b:02x}"))
            .collect()
    }

    fn page() -> Url {
        Url::parse("https://example.com/team/index.html").unwrap()
    }

    #[test]
    fn test_decode_cf_email() {
        let payload = encode_cf("alice@example.com", 0x5a);
        assert_eq!(decode_cf_email(&payload).as_deref(), Some("alice@example.com"));
        assert_eq!(decode_cf_email(&payload.to_uppercase()).as_deref(), Some("alice@example.com"));
    }

    #[test]
    fn test_decode_cf_email_rejects_malformed() {
        assert_eq!(decode_cf_email(""), None);
        assert_eq!(decode_cf_email("5a"), None);
        assert_eq!(decode_cf_email("5a3"), None);
        assert_eq!(decode_cf_email("zz11"), None);
    }

    #[test]
    fn test_script_expression() {
        assert_eq!(script_expression("javascript:alert(1)"), Some("alert(1)"));
        assert_eq!(script_expression("  JavaScript:void(0)"), Some("void(0)"));
        assert_eq!(script_expression("mailto:a@b.io"), None);
        assert_eq!(script_expression("java"), None);
    }

    #[test]
    fn test_page_scan_collects_inputs() {
        let html = format!(
            r#"<html><body>
                <span class="__cf_email__" data-cfemail="{}">[email protected]</span>
                <img src="/img/contact.svg">
                <img src="photo.png">
                <object data="card.SVG"></object>
                <embed src="https://cdn.example.org/a.svg?v=2">
                <a href="/about">About</a>
                <a href="javascript:void(0)">Mail</a>
                <a>no target</a>
            </body></html>"#,
            encode_cf("team@example.com", 0x21)
        );

        let scan = PageScan::parse(&html, &page());

        assert_eq!(scan.cf_payloads.len(), 1);
        assert_eq!(
            scan.svg_urls.iter().map(Url::as_str).collect::<Vec<_>>(),
            vec![
                "https://example.com/img/contact.svg",
                "https://example.com/team/card.SVG",
                "https://cdn.example.org/a.svg?v=2",
            ]
        );
        assert_eq!(scan.hrefs, vec!["/about", "javascript:void(0)"]);
    }

    #[test]
    fn test_svg_text_decodes_hex_refs() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><text x="0" y="15">bob&#x40;site&#x2e;org</text></svg>"#;
        assert!(svg_text(svg).contains("bob@site.org"));
    }
}
