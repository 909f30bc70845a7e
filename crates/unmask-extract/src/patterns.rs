//! Address grammars applied to canonicalized text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Standard `local@domain.tld` shape.
static FORWARD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[a-zA-Z]{2,}\b")
        .expect("address regex is hardcoded and valid")
});

/// Right-to-left addresses: a reversed common suffix, the reversed domain,
/// then the reversed local part.
static REVERSED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:moc|ac|gro|ten|ppa|due|ku\.oc)\.[a-zA-Z0-9.-]+@[A-Za-z0-9._%+-]+\b")
        .expect("reversed address regex is hardcoded and valid")
});

/// Find every address in `text`, forward and reversed.
///
/// Duplicates are kept; callers collect into a set.
pub fn extract(text: &str) -> Vec<String> {
    let mut found = forward_matches(text);
    found.extend(
        REVERSED
            .find_iter(text)
            .map(|m| m.as_str().chars().rev().collect::<String>()),
    );
    found
}

/// Forward-grammar matches.
///
/// A match immediately followed by `@` is not an address: its domain is the
/// local part of the next one (`us@john.doe@example.com` after "at"
/// rewriting), so scanning resumes just past its `@`.
fn forward_matches(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut start = 0;

    while let Some(m) = FORWARD.find_at(text, start) {
        if text[m.end()..].starts_with('@') {
            start = m
                .as_str()
                .find('@')
                .map_or(m.end(), |at| m.start() + at + 1);
        } else {
            found.push(m.as_str().to_string());
            start = m.end();
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_grammar() {
        let text = "write to sales@example.com or support@help.example.org.";
        assert_eq!(
            extract(text),
            vec!["sales@example.com", "support@help.example.org"]
        );
    }

    #[test]
    fn test_reversed_grammar() {
        assert_eq!(extract("moc.elpmaxe@resu"), vec!["user@example.com"]);
        assert_eq!(extract("ku.oc.pohs@selas"), vec!["sales@shop.co.uk"]);
        assert_eq!(extract("gro.tiforpnon@ofni"), vec!["info@nonprofit.org"]);
    }

    #[test]
    fn test_chained_at_signs_prefer_trailing_address() {
        assert_eq!(
            extract("Contact us@john.doe@example.com"),
            vec!["john.doe@example.com"]
        );
    }

    #[test]
    fn test_duplicates_are_kept() {
        assert_eq!(extract("a@b.io a@b.io").len(), 2);
    }

    #[test]
    fn test_no_address() {
        assert!(extract("nothing to see here @ all").is_empty());
    }
}
