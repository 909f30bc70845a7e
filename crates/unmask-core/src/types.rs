//! Shared types used across the Unmask workspace.
//!
//! This module defines the data model shared by the extraction pipeline and
//! the traversal driver: scope modes, frontier nodes, raw fragments and the
//! email accumulator.

use crate::error::UnmaskError;
use serde::{Deserialize, Serialize};
use std::collections::btree_set;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Policy restricting which discovered links are admitted into the frontier.
///
/// The numeric codes (1, 2, 3) are the ones accepted on the command line and
/// in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ScopeMode {
    /// Stay on the same scheme, host and port as the page the link was found on.
    #[default]
    HostOnly,
    /// Same host, and the link path must start with the page's path.
    HostPathPrefix,
    /// Follow every link.
    Unrestricted,
}

impl ScopeMode {
    /// Numeric code of this mode.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::HostOnly => 1,
            Self::HostPathPrefix => 2,
            Self::Unrestricted => 3,
        }
    }
}

impl TryFrom<u8> for ScopeMode {
    type Error = UnmaskError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::HostOnly),
            2 => Ok(Self::HostPathPrefix),
            3 => Ok(Self::Unrestricted),
            other => Err(UnmaskError::Validation(format!(
                "invalid scope mode: expected 1, 2 or 3, got {other}"
            ))),
        }
    }
}

impl From<ScopeMode> for u8 {
    fn from(mode: ScopeMode) -> Self {
        mode.code()
    }
}

impl FromStr for ScopeMode {
    type Err = UnmaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" | "host" => Ok(Self::HostOnly),
            "2" | "path" => Ok(Self::HostPathPrefix),
            "3" | "any" => Ok(Self::Unrestricted),
            other => Err(UnmaskError::Validation(format!(
                "invalid scope mode '{other}': expected 1 (host), 2 (path) or 3 (any)"
            ))),
        }
    }
}

impl fmt::Display for ScopeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::HostOnly => "host",
            Self::HostPathPrefix => "path",
            Self::Unrestricted => "any",
        };
        write!(f, "{name}")
    }
}

/// A page waiting to be visited, together with its distance from the root.
///
/// The root page sits at depth 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierNode {
    /// Absolute URL of the page
    pub url: Url,
    /// Depth of the page, starting at 1 for the root
    pub depth: u32,
}

impl FrontierNode {
    /// Create the root node of a traversal.
    #[must_use]
    pub fn root(url: Url) -> Self {
        Self { url, depth: 1 }
    }

    /// Create a node one level below this one.
    #[must_use]
    pub fn child(&self, url: Url) -> Self {
        Self {
            url,
            depth: self.depth.saturating_add(1),
        }
    }

    /// Whether this node lies beyond the configured maximum depth.
    #[must_use]
    pub fn exceeds(&self, max_depth: u32) -> bool {
        self.depth > max_depth
    }

    /// Key used for visited-set lookups: the URL without its fragment.
    #[must_use]
    pub fn visit_key(&self) -> String {
        let mut url = self.url.clone();
        url.set_fragment(None);
        url.into()
    }
}

/// Where a piece of raw text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentOrigin {
    /// The serialized page body
    Body,
    /// A decoded element attribute
    Attribute,
    /// An anchor `href` value
    Link,
    /// Text content of a fetched SVG document
    Svg,
    /// Result of evaluating a `javascript:` expression
    Script,
}

impl fmt::Display for FragmentOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Body => "body",
            Self::Attribute => "attribute",
            Self::Link => "link",
            Self::Svg => "svg",
            Self::Script => "script",
        };
        write!(f, "{name}")
    }
}

/// An immutable text blob handed to the extraction pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFragment<'a> {
    /// The raw text
    pub text: &'a str,
    /// Where the text came from
    pub origin: FragmentOrigin,
}

impl<'a> RawFragment<'a> {
    /// Wrap a piece of text with its origin.
    #[must_use]
    pub fn new(text: &'a str, origin: FragmentOrigin) -> Self {
        Self { text, origin }
    }
}

/// Reversible encodings undone by the decoder, listed in application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObfuscationEncoding {
    /// `%40`-style URL escapes
    PercentEncoded,
    /// `&amp;`, `&#64;`, `&#x40;` entities
    HtmlEntity,
    /// `\u0040`-style escapes
    UnicodeEscape,
    /// Bare `&#x40;` references left in embedded documents
    HexCharRef,
}

impl ObfuscationEncoding {
    /// Order applied to every page fragment.
    pub const FRAGMENT_ORDER: [Self; 3] =
        [Self::PercentEncoded, Self::HtmlEntity, Self::UnicodeEscape];
}

/// Set of candidate addresses collected during a crawl.
///
/// Membership is exact string equality: addresses differing only by letter
/// case are distinct entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailSet {
    addresses: BTreeSet<String>,
}

impl EmailSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an address; returns `true` if it was not present yet.
    pub fn insert(&mut self, address: impl Into<String>) -> bool {
        self.addresses.insert(address.into())
    }

    /// Union another set into this one.
    pub fn merge(&mut self, other: EmailSet) {
        self.addresses.extend(other.addresses);
    }

    /// Exact-string membership test.
    #[must_use]
    pub fn contains(&self, address: &str) -> bool {
        self.addresses.contains(address)
    }

    /// Number of distinct addresses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Whether the set holds no address.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Keep at most `limit` addresses (the lexicographically smallest).
    pub fn truncate(&mut self, limit: usize) {
        if self.addresses.len() > limit {
            self.addresses = std::mem::take(&mut self.addresses)
                .into_iter()
                .take(limit)
                .collect();
        }
    }

    /// Iterate addresses in sorted order.
    pub fn iter(&self) -> btree_set::Iter<'_, String> {
        self.addresses.iter()
    }
}

impl Extend<String> for EmailSet {
    fn extend<T: IntoIterator<Item = String>>(&mut self, iter: T) {
        self.addresses.extend(iter);
    }
}

impl FromIterator<String> for EmailSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self {
            addresses: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for EmailSet {
    type Item = String;
    type IntoIter = btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.addresses.into_iter()
    }
}

impl<'a> IntoIterator for &'a EmailSet {
    type Item = &'a String;
    type IntoIter = btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.addresses.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_mode_codes() {
        for code in 1..=3u8 {
            let mode = ScopeMode::try_from(code).expect("valid scope code");
            assert_eq!(mode.code(), code);
        }
        assert!(ScopeMode::try_from(0).is_err());
        assert!(ScopeMode::try_from(4).is_err());
    }

    #[test]
    fn test_scope_mode_from_str() {
        assert_eq!("2".parse::<ScopeMode>().unwrap(), ScopeMode::HostPathPrefix);
        assert_eq!("any".parse::<ScopeMode>().unwrap(), ScopeMode::Unrestricted);
        assert!("sideways".parse::<ScopeMode>().is_err());
    }

    #[test]
    fn test_scope_mode_serialization() {
        let json = serde_json::to_string(&ScopeMode::HostPathPrefix).expect("serialize mode");
        assert_eq!(json, "2");

        let parsed: ScopeMode = serde_json::from_str("3").expect("deserialize mode");
        assert_eq!(parsed, ScopeMode::Unrestricted);
        assert!(serde_json::from_str::<ScopeMode>("7").is_err());
    }

    #[test]
    fn test_frontier_depth() {
        let root = FrontierNode::root(Url::parse("https://example.com/").unwrap());
        assert_eq!(root.depth, 1);

        let child = root.child(Url::parse("https://example.com/about").unwrap());
        assert_eq!(child.depth, 2);
        assert!(!child.exceeds(2));
        assert!(child.exceeds(1));
    }

    #[test]
    fn test_visit_key_drops_fragment() {
        let node = FrontierNode::root(Url::parse("https://example.com/a#team").unwrap());
        assert_eq!(node.visit_key(), "https://example.com/a");
    }

    #[test]
    fn test_email_set_is_case_sensitive() {
        let mut set = EmailSet::new();
        assert!(set.insert("Bob@example.com"));
        assert!(set.insert("bob@example.com"));
        assert!(!set.insert("bob@example.com"));
        assert_eq!(set.len(), 2);
        assert!(set.contains("Bob@example.com"));
        assert!(!set.contains("BOB@example.com"));
    }

    #[test]
    fn test_email_set_merge_and_truncate() {
        let mut a: EmailSet = vec!["a@x.io".to_string(), "c@x.io".to_string()]
            .into_iter()
            .collect();
        let b: EmailSet = vec!["b@x.io".to_string(), "a@x.io".to_string()]
            .into_iter()
            .collect();
        a.merge(b);
        assert_eq!(a.len(), 3);

        a.truncate(2);
        let kept: Vec<_> = a.into_iter().collect();
        assert_eq!(kept, vec!["a@x.io", "b@x.io"]);
    }
}
