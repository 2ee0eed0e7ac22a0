//! String helpers shared by the ingestion stages.

use sha2::{Digest, Sha256};

/// Longest prefix of `s` whose UTF-8 encoding fits in `max_bytes`.
///
/// The cut always lands on a char boundary, so a multi-byte character that
/// would straddle the budget is dropped entirely.
pub fn truncate_str_by_bytes(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Remove every `\n` (pages are split on spaces, not lines).
pub fn strip_newlines(s: &str) -> String {
    s.replace('\n', "")
}

/// Remove every non-ASCII character.
pub fn to_ascii(s: &str) -> String {
    s.chars().filter(char::is_ascii).collect()
}

/// Lowercase hex SHA-256 of the text's UTF-8 bytes.
pub fn content_hash(s: &str) -> String {
    let digest = Sha256::digest(s.as_bytes());
    format!("{:x}", digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_shorter_than_budget_is_identity() {
        assert_eq!(truncate_str_by_bytes("hello", 10), "hello");
        assert_eq!(truncate_str_by_bytes("hello", 5), "hello");
        assert_eq!(truncate_str_by_bytes("", 0), "");
    }

    #[test]
    fn truncate_ascii_cuts_exactly() {
        assert_eq!(truncate_str_by_bytes("hello world", 5), "hello");
        assert_eq!(truncate_str_by_bytes("hello", 0), "");
    }

    #[test]
    fn truncate_never_splits_multibyte_chars() {
        // "é" is 2 bytes, "€" is 3 bytes, "𝄞" is 4 bytes.
        let s = "aé€𝄞b";
        assert_eq!(truncate_str_by_bytes(s, 1), "a");
        assert_eq!(truncate_str_by_bytes(s, 2), "a");
        assert_eq!(truncate_str_by_bytes(s, 3), "aé");
        assert_eq!(truncate_str_by_bytes(s, 5), "aé");
        assert_eq!(truncate_str_by_bytes(s, 6), "aé€");
        assert_eq!(truncate_str_by_bytes(s, 9), "aé€");
        assert_eq!(truncate_str_by_bytes(s, 10), "aé€𝄞");
    }

    #[test]
    fn truncate_respects_budget_for_every_cut() {
        let s = "Tiếng Việt có dấu — và ký tự 中文 🚀 mixed";
        for budget in 0..=s.len() + 2 {
            let out = truncate_str_by_bytes(s, budget);
            assert!(out.len() <= budget);
            assert!(s.starts_with(out));
            // Re-decoding the bytes must succeed.
            assert!(std::str::from_utf8(out.as_bytes()).is_ok());
        }
    }

    #[test]
    fn strip_newlines_joins_lines() {
        assert_eq!(strip_newlines("a\nb\n\nc"), "abc");
        assert_eq!(strip_newlines("no breaks"), "no breaks");
    }

    #[test]
    fn to_ascii_drops_non_ascii_and_is_idempotent() {
        let once = to_ascii("báo-cáo năm 2023.pdf");
        assert_eq!(once, "bo-co nm 2023.pdf");
        assert!(once.is_ascii());
        assert_eq!(to_ascii(&once), once);
    }

    #[test]
    fn content_hash_is_stable_hex() {
        let a = content_hash("same text");
        let b = content_hash("same text");
        let c = content_hash("other text");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
