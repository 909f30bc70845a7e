//! Brute-force solver for letter-rotation ciphers.

use once_cell::sync::Lazy;
use regex::Regex;

/// Strict address grammar a rotated candidate must match in full.
static ROTATED_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.(com|edu|net|ca|co.uk|co|org|gov|info|de|au|nl|ru|fr|br|uk|io|me|dev)+$",
    )
    .expect("rotation grammar is hardcoded and valid")
});

/// Shift an ASCII letter forward by `shift` places, preserving case.
fn rotate_char(ch: char, shift: u8) -> char {
    let base = match ch {
        'a'..='z' => b'a',
        'A'..='Z' => b'A',
        _ => return ch,
    };
    char::from(base + (ch as u8 - base + shift) % 26)
}

/// Apply a Caesar shift to every ASCII letter of `text`.
pub fn rotate(text: &str, shift: u8) -> String {
    text.chars().map(|ch| rotate_char(ch, shift % 26)).collect()
}

/// Try every rotation from 1 to 25 and keep those whose whole text is an
/// address.
///
/// Only succeeds when the entire input is a rotated address, so callers pass
/// short, already isolated snippets.
pub fn try_rotations(text: &str) -> Vec<String> {
    (1..26)
        .map(|shift| rotate(text, shift))
        .filter(|candidate| ROTATED_ADDRESS.is_match(candidate))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_preserves_case_and_symbols() {
        assert_eq!(rotate("Abz-9@", 1), "Bca-9@");
        assert_eq!(rotate("hello", 26), "hello");
    }

    #[test]
    fn test_rot13_address_recovered() {
        let hidden = rotate("user@example.com", 13);
        assert_eq!(hidden, "hfre@rknzcyr.pbz");

        let found = try_rotations(&hidden);
        assert!(found.contains(&"user@example.com".to_string()));
    }

    #[test]
    fn test_unrecoverable_rotation_is_rejected() {
        // No shift turns `dlt` into a known TLD
        assert!(try_rotations("hvdr@gvzcoz.dlt").is_empty());
    }

    #[test]
    fn test_every_shift_is_recoverable() {
        for shift in 1..26 {
            let hidden = rotate("Sales.Team@Widgets.org", shift);
            let found = try_rotations(&hidden);
            assert!(
                found.contains(&"Sales.Team@Widgets.org".to_string()),
                "shift {shift} not recovered"
            );
        }
    }

    #[test]
    fn test_only_whole_string_matches() {
        let hidden = format!("write to {}", rotate("user@example.com", 5));
        assert!(try_rotations(&hidden).is_empty());
    }

    #[test]
    fn test_plain_address_not_reported_at_zero_shift() {
        // Rotation 0 is never tried, so a plain address is not echoed back
        assert!(try_rotations("user@example.com").is_empty());
    }
}
