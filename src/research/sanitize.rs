//! Research query sanitization.
//!
//! Strips emails, phone numbers, currency amounts, confidentiality markers and
//! long numeric IDs before a query crosses into the provider. Never log the
//! input or the output of these functions.

use std::sync::OnceLock;

use regex::Regex;

use crate::research::config::{MAX_RESEARCH_QUERY_CHARS, MIN_RESEARCH_QUERY_CHARS};
use crate::util::truncate_chars;

// Compile-once regex patterns via OnceLock.
fn re_email() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)[a-z0-9_.+\-]+@[a-z0-9\-]+\.[a-z0-9.\-]+").unwrap())
}

fn re_phone() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"\+?\d{1,3}[-.\s]?\(?\d{2,4}\)?[-.\s]?\d{2,4}[-.\s]?\d{2,4}",
            r"(?:[-.\s]?\d{2,4})?|\d{10,}",
        ))
        .unwrap()
    })
}

fn re_currency() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?i)[$£€][\d,]+(?:\.\d+)?\s?(?:k|m|mm|bn|b)?\b",
            r"|\b(?:USD|EUR|GBP)\s*[\d,]+(?:\.\d+)?\s?(?:k|m|mm|bn|b)?\b",
            r"|\b\d[\d,]*(?:\.\d+)?\s?(?:k|m|mm|bn)\s*(?:USD|EUR|GBP|dollars?|euros?|pounds?)?\b",
        ))
        .unwrap()
    })
}

fn re_confidential() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:confidential|NDA|term\s+sheet|non[\s-]?disclosure)\b").unwrap()
    })
}

fn re_long_numeric() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d{6,}\b").unwrap())
}

fn re_whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Upper bound on stripping passes; each changing pass strictly shortens the string.
const MAX_PASSES: usize = 16;

fn sanitize_pass(s: &str) -> String {
    let mut out = re_email().replace_all(s, " ").into_owned();
    out = re_phone().replace_all(&out, " ").into_owned();
    out = re_currency().replace_all(&out, " ").into_owned();
    out = re_confidential().replace_all(&out, " ").into_owned();
    out = re_long_numeric().replace_all(&out, " ").into_owned();
    out = re_whitespace().replace_all(&out, " ").trim().to_string();
    truncate_chars(&out, MAX_RESEARCH_QUERY_CHARS)
}

/// Sanitize a candidate research query.
///
/// Passes repeat until nothing changes, so removing one pattern can never
/// leave behind a fresh match (e.g. digits re-joined after an email is cut).
/// The result is idempotent and at most 120 characters.
pub fn sanitize(raw: &str) -> String {
    let mut current = raw.trim().to_string();
    for _ in 0..MAX_PASSES {
        let next = sanitize_pass(&current);
        if next == current {
            return next;
        }
        current = next;
    }
    current
}

/// True if a sanitized query is long enough to send.
pub fn is_usable(sanitized: &str) -> bool {
    sanitized.trim().chars().count() >= MIN_RESEARCH_QUERY_CHARS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_email_currency_and_long_id() {
        let out = sanitize("Deal with jane@acme.com worth $1,000,000 ref 123456789 Acme Corp");
        assert!(!out.contains("jane@acme.com"));
        assert!(!out.contains("$1,000,000"));
        assert!(!out.contains("1,000,000"));
        assert!(!out.contains("123456789"));
        assert!(out.contains("Acme Corp"), "got: {}", out);
    }

    #[test]
    fn test_removes_phone() {
        let out = sanitize("Contact +1 555 123 4567 for Acme");
        assert!(!out.contains("555"));
        assert!(!out.contains("4567"));
        assert!(out.contains("Acme"));
    }

    #[test]
    fn test_removes_currency_shapes() {
        assert_eq!(sanitize("Beta Inc raising 1.5m"), "Beta Inc raising");
        assert_eq!(sanitize("Beta Inc £100k round"), "Beta Inc round");
        assert_eq!(sanitize("Beta Inc EUR 5m"), "Beta Inc");
        assert_eq!(sanitize("Beta Inc $2.5bn"), "Beta Inc");
    }

    #[test]
    fn test_removes_confidentiality_markers() {
        let out = sanitize("CONFIDENTIAL term sheet review NDA Gamma Labs non-disclosure");
        assert_eq!(out, "review Gamma Labs");
    }

    #[test]
    fn test_collapses_whitespace_and_caps_length() {
        assert_eq!(sanitize("  Acme    Corp \n news "), "Acme Corp news");
        let long = "Acme Corp ".repeat(30);
        let out = sanitize(&long);
        assert!(out.chars().count() <= MAX_RESEARCH_QUERY_CHARS);
        assert!(!out.ends_with(' '));
    }

    #[test]
    fn test_idempotent() {
        let samples = vec![
            "Call with jane@acme.com about $1,000,000 deal 123456789".to_string(),
            "1 22 x@y.com 33 44 Acme".to_string(),
            "Acme Corp ".repeat(20) + "1234567x",
            "Intro: Kheyti Project (organization, leadership, business, recent news)".to_string(),
            String::new(),
        ];
        for s in samples.iter() {
            let once = sanitize(s);
            assert_eq!(sanitize(&once), once, "not idempotent for: {}", s);
        }
    }

    #[test]
    fn test_is_usable() {
        assert!(!is_usable(""));
        assert!(!is_usable("ab"));
        assert!(!is_usable("   "));
        assert!(is_usable("Acme Corp"));
        assert!(!is_usable(&sanitize("jane@acme.com 123456789")));
    }
}
