//! Reversal of the character encodings pages use to hide addresses.
//!
//! Every decoding step leaves input it cannot interpret untouched, so the
//! steps can be chained blindly over arbitrary page text.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;
use unmask_core::{ObfuscationEncoding, RawFragment};

static HTML_ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(?:#([0-9]{1,7})|#[xX]([0-9A-Fa-f]{1,6})|([A-Za-z][A-Za-z0-9]*));")
        .expect("entity regex is hardcoded and valid")
});

static UNICODE_ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\u([0-9A-Fa-f]{4})").expect("unicode escape regex is hardcoded and valid")
});

static HEX_CHAR_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&#x([0-9A-Fa-f]+);").expect("hex reference regex is hardcoded and valid")
});

/// Decode a page fragment: percent escapes, then HTML entities, then
/// unicode escapes.
pub fn normalize(fragment: RawFragment<'_>) -> String {
    ObfuscationEncoding::FRAGMENT_ORDER
        .iter()
        .fold(fragment.text.to_string(), |text, encoding| {
            decode(*encoding, &text).into_owned()
        })
}

/// Apply a single decoding step.
pub fn decode(encoding: ObfuscationEncoding, text: &str) -> Cow<'_, str> {
    match encoding {
        ObfuscationEncoding::PercentEncoded => percent_decode(text),
        ObfuscationEncoding::HtmlEntity => unescape_entities(text),
        ObfuscationEncoding::UnicodeEscape => decode_unicode_escapes(text),
        ObfuscationEncoding::HexCharRef => decode_hex_char_refs(text),
    }
}

/// Query-string unescaping: `+` becomes a space and `%XX` the byte it names.
///
/// Text with a malformed escape, or whose decoded bytes are not UTF-8, is
/// returned unchanged.
pub fn percent_decode(text: &str) -> Cow<'_, str> {
    if !text.contains(['%', '+']) || has_malformed_escape(text) {
        return Cow::Borrowed(text);
    }

    let spaced = text.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => Cow::Owned(decoded.into_owned()),
        Err(_) => Cow::Borrowed(text),
    }
}

fn has_malformed_escape(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        b == b'%'
            && !(bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit))
    })
}

/// Unescape numeric and common named HTML entities.
pub fn unescape_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    HTML_ENTITY.replace_all(text, |caps: &Captures| {
        let decoded = if let Some(dec) = caps.get(1) {
            dec.as_str().parse::<u32>().ok().and_then(char::from_u32)
        } else if let Some(hex) = caps.get(2) {
            u32::from_str_radix(hex.as_str(), 16)
                .ok()
                .and_then(char::from_u32)
        } else {
            caps.get(3).and_then(|name| named_entity(name.as_str()))
        };

        match decoded {
            Some(ch) => ch.to_string(),
            None => caps[0].to_string(),
        }
    })
}

fn named_entity(name: &str) -> Option<char> {
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "commat" => '@',
        "period" => '.',
        "lowbar" => '_',
        "hyphen" | "dash" => '-',
        "plus" => '+',
        "percnt" => '%',
        "num" => '#',
        "colon" => ':',
        "sol" => '/',
        _ => return None,
    };
    Some(ch)
}

/// Replace each `\uXXXX` escape with the character named by its low byte.
///
/// Not a full code-point decode: `\u0040` becomes `@`,
/// and the high byte of the escape is discarded.
pub fn decode_unicode_escapes(text: &str) -> Cow<'_, str> {
    UNICODE_ESCAPE.replace_all(text, |caps: &Captures| {
        u16::from_str_radix(&caps[1], 16)
            .map(|value| char::from(value.to_be_bytes()[1]).to_string())
            .unwrap_or_default()
    })
}

/// Replace `&#xNN;` references with the raw bytes they encode.
///
/// Each decoded byte becomes one Latin-1 character; a reference whose digits
/// do not form whole bytes decodes to nothing.
pub fn decode_hex_char_refs(text: &str) -> Cow<'_, str> {
    HEX_CHAR_REF.replace_all(text, |caps: &Captures| {
        hex::decode(&caps[1])
            .map(|bytes| bytes.into_iter().map(char::from).collect::<String>())
            .unwrap_or_default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use unmask_core::FragmentOrigin;

    fn body(text: &str) -> RawFragment<'_> {
        RawFragment::new(text, FragmentOrigin::Body)
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("info%40example.com"), "info@example.com");
        assert_eq!(percent_decode("a+b"), "a b");
    }

    #[test]
    fn test_percent_decode_malformed_passes_through() {
        let css = "width: 100%; contact+us%40x.io";
        assert_eq!(percent_decode(css), css);
        assert_eq!(percent_decode("trailing %4"), "trailing %4");
    }

    #[test]
    fn test_percent_decode_invalid_utf8_passes_through() {
        assert_eq!(percent_decode("bad %FF byte"), "bad %FF byte");
    }

    #[test]
    fn test_unescape_entities() {
        assert_eq!(unescape_entities("joe&#64;example&#46;com"), "joe@example.com");
        assert_eq!(unescape_entities("joe&#x40;example.com"), "joe@example.com");
        assert_eq!(unescape_entities("joe&commat;example&period;com"), "joe@example.com");
        assert_eq!(unescape_entities("a &amp; b &unknown;"), "a & b &unknown;");
    }

    #[test]
    fn test_decode_unicode_escapes() {
        assert_eq!(decode_unicode_escapes("joe\\u0040example.com"), "joe@example.com");
        assert_eq!(decode_unicode_escapes("\\u002e"), ".");
        // High byte is dropped
        assert_eq!(decode_unicode_escapes("\\u0140"), "@");
        assert_eq!(decode_unicode_escapes("\\uZZZZ"), "\\uZZZZ");
    }

    #[test]
    fn test_decode_hex_char_refs() {
        assert_eq!(decode_hex_char_refs("a&#x40;b&#x2e;io"), "a@b.io");
        assert_eq!(decode_hex_char_refs("odd&#x4;digits"), "odddigits");
    }

    #[test]
    fn test_normalize_chains_all_steps() {
        let raw = "mail%3A%20joe&#64;example\\u002ecom";
        assert_eq!(normalize(body(raw)), "mail: joe@example.com");
    }

    #[test]
    fn test_normalize_is_noop_on_plain_text() {
        let plain = "Reach us at sales@example.com today.";
        let once = normalize(body(plain));
        assert_eq!(once, plain);
        assert_eq!(normalize(body(&once)), once);
    }
}
