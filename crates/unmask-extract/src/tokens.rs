//! Rewriting of spelled-out separators into canonical `@` and `.` tokens.
//!
//! The rules form an ordered list. Each rule is applied across the whole text
//! until it no longer changes anything, then the next rule runs. Later rules
//! rely on the output of earlier ones, so the order must not change.
//!
//! A later rule can splice text back into a shape an earlier one rewrites
//! (`aDOnospamTb` becomes `aDOTb`), so whole passes over the list repeat until
//! one changes nothing. Every rewrite shortens the text or leaves it as is, so
//! this terminates, and the result is a fixed point: canonicalizing it again
//! returns it unchanged.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

/// How a rule rewrites each of its matches.
enum Rewrite {
    /// Expand a `$1`-style template
    Template(&'static str),
    /// Choose the replacement from the matched text
    Computed(fn(&Captures) -> String),
}

struct RewriteRule {
    name: &'static str,
    pattern: Regex,
    rewrite: Rewrite,
}

impl RewriteRule {
    fn new(name: &'static str, pattern: &str, rewrite: Rewrite) -> Self {
        let pattern = Regex::new(&pattern.replace("NW", "[^0-9A-Za-z_]"))
            .unwrap_or_else(|e| panic!("rewrite rule {name} is hardcoded and valid: {e}"));
        Self {
            name,
            pattern,
            rewrite,
        }
    }

    fn apply_once<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match self.rewrite {
            Rewrite::Template(template) => self.pattern.replace_all(text, template),
            Rewrite::Computed(f) => self.pattern.replace_all(text, f),
        }
    }

    /// Apply until the text stops changing.
    fn apply(&self, mut text: String) -> String {
        loop {
            match self.apply_once(&text) {
                Cow::Owned(next) if next != text => text = next,
                _ => return text,
            }
        }
    }
}

fn collapse_nospam(caps: &Captures) -> String {
    let matched = &caps[0];
    if matched.contains('.') {
        ".".to_string()
    } else if matched.contains('@') {
        "@".to_string()
    } else {
        String::new()
    }
}

static RULES: Lazy<Vec<RewriteRule>> = Lazy::new(|| {
    vec![
        // dots
        RewriteRule::new(
            "spelled-dot",
            r"NW*\.NW*|NW+[Dd][O0o][tT]NW+",
            Rewrite::Template("."),
        ),
        RewriteRule::new(
            "upper-dot-in-lower",
            r"([a-z0-9])(?:DOT|D0T|DoT)([a-z0-9])",
            Rewrite::Template("${1}.${2}"),
        ),
        RewriteRule::new(
            "lower-dot-in-upper",
            r"([A-Z0-9])(?:dot|d0t|dOt)([A-Z0-9])",
            Rewrite::Template("${1}.${2}"),
        ),
        // ats
        RewriteRule::new(
            "spelled-at",
            r"NW*@NW*|NW+[Aa][Tt]NW+",
            Rewrite::Template("@"),
        ),
        RewriteRule::new(
            "upper-at-in-lower",
            r"([a-z0-9])AT([a-z0-9])",
            Rewrite::Template("${1}@${2}"),
        ),
        RewriteRule::new(
            "lower-at-in-upper",
            r"([A-Z0-9])at([A-Z0-9])",
            Rewrite::Template("${1}@${2}"),
        ),
        // anti-spam insertions
        RewriteRule::new(
            "upper-remove",
            r"([a-z0-9])REMOVE([a-z0-9@.])",
            Rewrite::Template("${1}${2}"),
        ),
        RewriteRule::new(
            "lower-remove",
            r"([A-Z0-9])remove([A-Z0-9@.])",
            Rewrite::Template("${1}${2}"),
        ),
        RewriteRule::new(
            "nospam",
            r"[^0-9A-Za-z]*n[^0-9A-Za-z]*[o0][^0-9A-Za-z]*[s5][^0-9A-Za-z]*p[^0-9A-Za-z]*a[^0-9A-Za-z]*m[^0-9A-Za-z]*",
            Rewrite::Computed(collapse_nospam),
        ),
    ]
});

/// Rewrite textual `at`/`dot` substitutions and anti-spam insertions into
/// canonical address tokens.
pub fn canonicalize(text: &str) -> String {
    let mut text = text.to_string();
    loop {
        let rewritten = apply_pass(text.clone());
        if rewritten == text {
            return text;
        }
        text = rewritten;
    }
}

/// One ordered pass over every rule.
fn apply_pass(text: String) -> String {
    RULES.iter().fold(text, |text, rule| {
        let rewritten = rule.apply(text);
        tracing::trace!(rule = rule.name, "applied rewrite rule");
        rewritten
    })
}
