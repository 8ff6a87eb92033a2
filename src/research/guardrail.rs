//! Off-target guardrail: are these results about the meeting's counterparty?
//!
//! Checks run against the deduplicated source list:
//!   - domain match: some source host equals the expected domain or is a
//!     proper subdomain of it (never a substring elsewhere in the URL)
//!   - ambiguous acronym domains (root of three characters or fewer) also
//!     need the organization's full display name in the top sources and no
//!     negative term (tickers, known decoy companies)
//!
//! A rejected primary result earns one narrowed retry.

use serde::{Deserialize, Serialize};

use crate::research::config::MAX_RESEARCH_QUERY_CHARS;
use crate::research::domain::{
    domain_root, domain_to_org_name, is_ambiguous_short, normalize_domain,
};
use crate::research::sanitize::sanitize;
use crate::types::{ResearchResult, ResearchSource};
use crate::util::truncate_chars;

/// Sources inspected for the entity and negative-term checks.
const ENTITY_CHECK_TOP_SOURCES: usize = 3;

/// Display names this short are themselves ambiguous.
const MIN_ENTITY_NAME_CHARS: usize = 4;

const NEGATIVE_TERMS: &[&str] = &["ticker", "stock", "nyse", "nasdaq"];

/// Unrelated companies that share an acronym with a known organization.
const DECOY_TERMS: &[(&str, &[&str])] = &[("smg", &["scotts", "miracle-gro", "miracle gro"])];

/// Hosts accepted on the narrowed retry for ambiguous acronym domains.
const PROFILE_HOSTS: &[&str] = &["linkedin.com", "theorg.com"];

const PROFILE_RETRY_SUFFIX: &str = "(site:linkedin.com OR site:theorg.com)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchReason {
    ExpectedDomainNotFound,
    EntityMatchFailed,
    NegativeTermHit,
}

impl MismatchReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            MismatchReason::ExpectedDomainNotFound => "expected_domain_not_found",
            MismatchReason::EntityMatchFailed => "entity_match_failed",
            MismatchReason::NegativeTermHit => "negative_term_hit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardrailAttempt {
    Primary,
    Retry,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GuardrailVerdict {
    pub accepted: bool,
    pub domain_match: bool,
    pub entity_match: bool,
    pub mismatch: Option<MismatchReason>,
    /// Deduplicated, capped sources the checks ran against.
    pub sources: Vec<ResearchSource>,
}

// ---------------------------------------------------------------------------
// Source normalization
// ---------------------------------------------------------------------------

/// Comparison key: scheme- and case-insensitive, no trailing slash.
pub fn normalize_source_url(url: &str) -> String {
    let lower = url.trim().to_lowercase();
    let unified = match lower.strip_prefix("https://") {
        Some(rest) => format!("http://{}", rest),
        None => lower,
    };
    unified.trim_end_matches('/').to_string()
}

/// Drop sources without a title or URL, dedupe by normalized URL, cap.
pub fn dedupe_sources(sources: &[ResearchSource], max_sources: usize) -> Vec<ResearchSource> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for source in sources {
        let title = source.title.trim();
        let url = source.url.trim();
        if title.is_empty() || url.is_empty() {
            continue;
        }
        let key = normalize_source_url(url);
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        out.push(ResearchSource::new(title, url));
        if out.len() >= max_sources {
            break;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

/// True when the URL's host is `expected_domain` or a subdomain of it.
pub fn host_matches(url: &str, expected_domain: &str) -> bool {
    let expected = normalize_domain(expected_domain);
    if expected.is_empty() {
        return false;
    }
    let host = match url::Url::parse(url.trim()) {
        Ok(parsed) => parsed.host_str().map(|h| h.to_lowercase()).unwrap_or_default(),
        Err(_) => return false,
    };
    let host = host.trim_end_matches('.');
    host == expected || host.ends_with(&format!(".{}", expected))
}

/// Negative terms for a domain: generic market terms plus known decoys.
pub fn negative_terms_for(domain: &str) -> Vec<&'static str> {
    let root = domain_root(domain);
    let mut terms = NEGATIVE_TERMS.to_vec();
    if let Some((_, decoys)) = DECOY_TERMS.iter().find(|(r, _)| *r == root) {
        terms.extend_from_slice(decoys);
    }
    terms
}

/// Lower-case, punctuation to spaces, padded so terms match on word edges.
fn word_normalize(s: &str) -> String {
    let spaced: String = s
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    format!(" {} ", spaced.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn contains_phrase(haystack_normalized: &str, phrase: &str) -> bool {
    let needle = word_normalize(phrase);
    !needle.trim().is_empty() && haystack_normalized.contains(&needle)
}

fn entity_haystack(result: &ResearchResult, sources: &[ResearchSource]) -> String {
    let mut text: Vec<&str> = sources
        .iter()
        .take(ENTITY_CHECK_TOP_SOURCES)
        .map(|s| s.title.as_str())
        .collect();
    text.push(&result.summary);
    text.extend(result.key_points.iter().map(String::as_str));
    word_normalize(&text.join(" "))
}

/// Validate one provider result against the expected domain.
pub fn validate(
    result: &ResearchResult,
    expected_domain: &str,
    attempt: GuardrailAttempt,
    max_sources: usize,
) -> GuardrailVerdict {
    let sources = dedupe_sources(&result.sources, max_sources);
    let ambiguous = is_ambiguous_short(expected_domain);

    let host_ok = |url: &str| {
        host_matches(url, expected_domain)
            || (ambiguous
                && attempt == GuardrailAttempt::Retry
                && PROFILE_HOSTS.iter().any(|h| host_matches(url, h)))
    };
    let domain_match = sources.iter().any(|s| host_ok(&s.url));

    let (entity_match, negative_hit) = if ambiguous {
        let haystack = entity_haystack(result, &sources);
        let name = domain_to_org_name(expected_domain);
        let entity =
            name.chars().count() >= MIN_ENTITY_NAME_CHARS && contains_phrase(&haystack, &name);
        let negative = negative_terms_for(expected_domain)
            .iter()
            .any(|t| contains_phrase(&haystack, t));
        (entity, negative)
    } else {
        (domain_match, false)
    };

    let mismatch = if !domain_match {
        Some(MismatchReason::ExpectedDomainNotFound)
    } else if negative_hit {
        Some(MismatchReason::NegativeTermHit)
    } else if !entity_match {
        Some(MismatchReason::EntityMatchFailed)
    } else {
        None
    };

    GuardrailVerdict {
        accepted: mismatch.is_none(),
        domain_match,
        entity_match,
        mismatch,
        sources,
    }
}

/// Narrowed query for the single retry, still within the query length cap.
pub fn retry_query(query: &str, expected_domain: &str) -> String {
    let suffix = if is_ambiguous_short(expected_domain) {
        PROFILE_RETRY_SUFFIX.to_string()
    } else {
        format!("site:{}", normalize_domain(expected_domain))
    };
    let room = MAX_RESEARCH_QUERY_CHARS.saturating_sub(suffix.chars().count() + 1);
    let base = truncate_chars(query, room);
    sanitize(&format!("{} {}", base, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(summary: &str, sources: &[(&str, &str)]) -> ResearchResult {
        ResearchResult {
            summary: summary.to_string(),
            key_points: sources.iter().map(|(t, _)| t.to_string()).collect(),
            sources: sources.iter().map(|(t, u)| ResearchSource::new(t, u)).collect(),
        }
    }

    #[test]
    fn test_host_match_is_strict() {
        assert!(host_matches("https://smg.com/about", "smg.com"));
        assert!(host_matches("https://www.smg.com", "smg.com"));
        assert!(host_matches("http://careers.smg.com/jobs", "smg.com"));
        assert!(!host_matches("https://example.com/x?ref=smg.com", "smg.com"));
        assert!(!host_matches("https://notsmg.com", "smg.com"));
        assert!(!host_matches("not a url", "smg.com"));
        assert!(!host_matches("https://smg.com", ""));
    }

    #[test]
    fn test_dedupe_sources_normalizes_and_caps() {
        let sources = vec![
            ResearchSource::new("A", "https://acme.com/"),
            ResearchSource::new("A again", "HTTP://ACME.com"),
            ResearchSource::new("", "https://acme.com/empty-title"),
            ResearchSource::new("No url", " "),
            ResearchSource::new("B", "https://acme.com/b"),
            ResearchSource::new("C", "https://acme.com/c"),
        ];
        let out = dedupe_sources(&sources, 2);
        assert_eq!(out, vec![
            ResearchSource::new("A", "https://acme.com/"),
            ResearchSource::new("B", "https://acme.com/b"),
        ]);
    }

    #[test]
    fn test_non_ambiguous_domain_needs_host_match_only() {
        let ok = result("Acme Capital invests.", &[("Acme Capital", "https://acmecapital.com/")]);
        let verdict = validate(&ok, "acmecapital.com", GuardrailAttempt::Primary, 5);
        assert!(verdict.accepted);
        assert!(verdict.domain_match);

        let off = result("Other firm.", &[("Other", "https://other.com/?q=acmecapital.com")]);
        let verdict = validate(&off, "acmecapital.com", GuardrailAttempt::Primary, 5);
        assert!(!verdict.accepted);
        assert_eq!(verdict.mismatch, Some(MismatchReason::ExpectedDomainNotFound));
    }

    #[test]
    fn test_ambiguous_domain_rejects_decoy_even_with_host_match() {
        let decoy = result(
            "Scotts Miracle-Gro (NYSE: SMG) reported earnings.",
            &[("Scotts Miracle-Gro stock", "https://smg.com/investors")],
        );
        let verdict = validate(&decoy, "smg.com", GuardrailAttempt::Primary, 5);
        assert!(verdict.domain_match);
        assert!(!verdict.entity_match);
        assert!(!verdict.accepted);
        assert_eq!(verdict.mismatch, Some(MismatchReason::NegativeTermHit));
    }

    #[test]
    fn test_ambiguous_domain_requires_full_name() {
        let vague = result("SMG news.", &[("SMG update", "https://smg.com/news")]);
        let verdict = validate(&vague, "smg.com", GuardrailAttempt::Primary, 5);
        assert_eq!(verdict.mismatch, Some(MismatchReason::EntityMatchFailed));

        let good = result(
            "Service Management Group helps brands improve customer experience.",
            &[("Service Management Group | About", "https://smg.com/about")],
        );
        assert!(validate(&good, "smg.com", GuardrailAttempt::Primary, 5).accepted);
    }

    #[test]
    fn test_profile_hosts_only_count_on_ambiguous_retry() {
        let profile = result(
            "Service Management Group leadership team.",
            &[("Service Management Group | LinkedIn", "https://www.linkedin.com/company/smg")],
        );
        assert!(!validate(&profile, "smg.com", GuardrailAttempt::Primary, 5).accepted);
        assert!(validate(&profile, "smg.com", GuardrailAttempt::Retry, 5).accepted);

        let profile = result("Acme", &[("Acme | LinkedIn", "https://linkedin.com/company/acme")]);
        assert!(!validate(&profile, "acmecapital.com", GuardrailAttempt::Retry, 5).accepted);
    }

    #[test]
    fn test_short_display_name_never_satisfies_entity_check() {
        let r = result("CSA announced a program.", &[("CSA", "https://csa.org/")]);
        let verdict = validate(&r, "csa.org", GuardrailAttempt::Primary, 5);
        assert!(verdict.domain_match);
        assert!(!verdict.entity_match);
        assert!(!verdict.accepted);
    }

    #[test]
    fn test_empty_result_is_domain_not_found() {
        let verdict = validate(
            &ResearchResult::empty(),
            "acmecapital.com",
            GuardrailAttempt::Primary,
            5,
        );
        assert_eq!(verdict.mismatch, Some(MismatchReason::ExpectedDomainNotFound));
        assert!(verdict.sources.is_empty());
    }

    #[test]
    fn test_retry_query_shapes() {
        let smg = "Service Management Group (organization, leadership, business, recent news)";
        assert_eq!(
            retry_query(smg, "smg.com"),
            format!("{} (site:linkedin.com OR site:theorg.com)", smg)
        );
        let acme = "Acme Capital (organization, leadership, business, recent news)";
        assert_eq!(
            retry_query(acme, "acmecapital.com"),
            format!("{} site:acmecapital.com", acme)
        );
        let long = "Acme ".repeat(40);
        let q = retry_query(&long, "smg.com");
        assert!(q.chars().count() <= MAX_RESEARCH_QUERY_CHARS);
        assert!(q.ends_with(PROFILE_RETRY_SUFFIX));
    }
}
