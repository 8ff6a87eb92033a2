//! Email domain classification for research anchoring.
//!
//! Decides whether a domain can stand for an organization:
//!   - consumer: webmail providers, never organization anchors
//!   - personal: likely an individual's vanity domain
//!   - assistant: an executive-assistant service, not the counterparty
//!
//! and turns organization-like domains into display names. Every function is
//! total: empty or malformed input yields "" / false.

use crate::util::{domain_of_email, title_case};

/// Consumer webmail providers (not tied to any organization).
pub const CONSUMER_EMAIL_DOMAINS: &[&str] = &[
    "gmail.com",
    "googlemail.com",
    "outlook.com",
    "hotmail.com",
    "yahoo.com",
    "icloud.com",
    "me.com",
    "live.com",
    "msn.com",
    "aol.com",
    "protonmail.com",
    "proton.me",
    "mail.com",
    "zoho.com",
    "yandex.com",
    "gmx.com",
    "google.com",
];

/// Service prefixes stripped before taking the registrable segment.
const STRIP_PREFIXES: &[&str] = &["www.", "mail.", "calendar.", "cms.", "cms-"];

/// Domain roots whose organization name is not derivable from the domain.
/// Entries here are never treated as personal-looking.
const KNOWN_ORG_OVERRIDES: &[(&str, &str)] = &[
    ("csa", "CSA"),
    ("smg", "Service Management Group"),
    ("ibm", "IBM"),
    ("kpmg", "KPMG"),
    ("pwc", "PwC"),
    ("gatesfoundation", "Gates Foundation"),
    ("rethinkimpact", "Rethink Impact"),
];

/// Markers of executive-assistant / scheduling services.
const ASSISTANT_MARKERS: &[&str] = &[
    "assistant",
    "chiefofstaff",
    "concierge",
    "admin",
    "scheduling",
    "virtualexec",
];

/// Two-letter TLDs commonly used by companies rather than individuals.
const COMPANY_TWO_LETTER_TLDS: &[&str] = &["io", "co", "ai", "us", "uk"];

/// Longest root still treated as a possible personal handle.
const PERSONAL_ROOT_MAX_LEN: usize = 6;

/// Roots this short collide with tickers and unrelated acronyms.
pub const AMBIGUOUS_ROOT_MAX_LEN: usize = 3;

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Lower-case a domain (or email) and drop service prefixes.
///
/// Example: "jane@Mail.BetaCorp.co.uk" → "betacorp.co.uk"
pub fn normalize_domain(domain: &str) -> String {
    let trimmed = domain.trim();
    let mut d = if trimmed.contains('@') {
        domain_of_email(trimmed)
    } else {
        trimmed.trim_end_matches('.').to_lowercase()
    };
    for prefix in STRIP_PREFIXES {
        if let Some(rest) = d.strip_prefix(prefix) {
            d = rest.to_string();
            break;
        }
    }
    d
}

/// Registrable first segment of a domain.
///
/// Example: "smg.com" → "smg", "cms-induslaw.com" → "induslaw"
pub fn domain_root(domain: &str) -> String {
    let d = normalize_domain(domain);
    d.split('.').next().unwrap_or("").to_string()
}

/// True when the root has at most three characters (e.g. smg.com, ac.co).
pub fn is_ambiguous_short(domain: &str) -> bool {
    let len = domain_root(domain).chars().count();
    len > 0 && len <= AMBIGUOUS_ROOT_MAX_LEN
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// True for consumer webmail providers and their subdomains.
pub fn is_consumer_domain(domain: &str) -> bool {
    let d = normalize_domain(domain);
    if d.is_empty() {
        return false;
    }
    CONSUMER_EMAIL_DOMAINS
        .iter()
        .any(|c| d == *c || d.ends_with(&format!(".{}", c)))
}

/// True if the domain is more likely an individual's vanity domain than a company.
///
/// Signals: a short all-alphabetic root not on the known-organization list,
/// a `<name>.me.<cc>` shape, or a bare `<name>.<cc>` shape.
pub fn looks_like_personal_domain(domain: &str) -> bool {
    let d = normalize_domain(domain);
    let labels: Vec<&str> = d.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() < 2 {
        return false;
    }
    let root = labels[0];
    if known_org_name(root).is_some() {
        return false;
    }

    if root.chars().count() <= PERSONAL_ROOT_MAX_LEN
        && root.chars().all(|c| c.is_ascii_alphabetic())
    {
        return true;
    }

    let is_cc = |label: &str| label.len() == 2 && label.chars().all(|c| c.is_ascii_alphabetic());
    if labels.len() == 3 && labels[1] == "me" && is_cc(labels[2]) {
        return true;
    }
    labels.len() == 2 && is_cc(labels[1]) && !COMPANY_TWO_LETTER_TLDS.contains(&labels[1])
}

/// True if the domain belongs to an executive-assistant style service.
pub fn looks_like_assistant_domain(domain: &str) -> bool {
    let root = domain_root(domain);
    if root.is_empty() {
        return false;
    }
    let compact: String = root.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    ASSISTANT_MARKERS
        .iter()
        .any(|m| compact == *m || (m.len() >= 4 && compact.contains(m)))
}

/// True if the domain can stand for an organization anchor.
pub fn is_org_candidate(domain: &str) -> bool {
    !normalize_domain(domain).is_empty()
        && !is_consumer_domain(domain)
        && !looks_like_personal_domain(domain)
        && !looks_like_assistant_domain(domain)
}

// ---------------------------------------------------------------------------
// Organization names
// ---------------------------------------------------------------------------

/// Override name for a domain root, if one is known.
pub fn known_org_name(root: &str) -> Option<&'static str> {
    let root = root.trim().to_lowercase();
    KNOWN_ORG_OVERRIDES
        .iter()
        .find(|(r, _)| *r == root)
        .map(|(_, name)| *name)
}

/// Human-readable organization name for a domain.
///
/// Example: "acme-capital.com" → "Acme Capital", "smg.com" → "Service Management Group"
pub fn domain_to_org_name(domain: &str) -> String {
    let root = domain_root(domain);
    if root.is_empty() {
        return String::new();
    }
    if let Some(name) = known_org_name(&root) {
        return name.to_string();
    }
    title_case(&root.replace(['-', '_'], " "))
}

/// Organization name for an email address (or bare domain).
///
/// Example: "hugo@cms-induslaw.com" → "Induslaw"
pub fn org_from_email_domain(email_or_domain: &str) -> String {
    domain_to_org_name(email_or_domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consumer_domains() {
        assert!(is_consumer_domain("gmail.com"));
        assert!(is_consumer_domain("Outlook.com"));
        assert!(is_consumer_domain("bob@gmail.com"));
        assert!(!is_consumer_domain("acmecapital.com"));
        assert!(!is_consumer_domain(""));
    }

    #[test]
    fn test_personal_domain_shapes() {
        assert!(looks_like_personal_domain("hussein.me.ke"));
        assert!(looks_like_personal_domain("jane.de"));
        assert!(looks_like_personal_domain("acme.com"), "short alphabetic root");
        assert!(!looks_like_personal_domain("smg.com"), "known override");
        assert!(!looks_like_personal_domain("csa.org"), "known override");
        assert!(!looks_like_personal_domain("acmecapital.com"));
        assert!(!looks_like_personal_domain("gridflow.io"));
        assert!(!looks_like_personal_domain(""));
    }

    #[test]
    fn test_assistant_domains() {
        assert!(looks_like_assistant_domain("vanninchiefofstaff.com"));
        assert!(looks_like_assistant_domain("execassistant.co"));
        assert!(looks_like_assistant_domain("admin.org"));
        assert!(!looks_like_assistant_domain("rethinkimpact.com"));
        assert!(!looks_like_assistant_domain(""));
    }

    #[test]
    fn test_ambiguous_short() {
        assert!(is_ambiguous_short("smg.com"));
        assert!(is_ambiguous_short("ac.co"));
        assert!(!is_ambiguous_short("acmecapital.com"));
        assert!(!is_ambiguous_short(""));
    }

    #[test]
    fn test_domain_to_org_name() {
        assert_eq!(domain_to_org_name("cms-induslaw.com"), "Induslaw");
        assert_eq!(domain_to_org_name("mail.betacorp.co.uk"), "Betacorp");
        assert_eq!(domain_to_org_name("acme-capital.com"), "Acme Capital");
        assert_eq!(domain_to_org_name("grid_flow.io"), "Grid Flow");
        assert_eq!(domain_to_org_name("csa.org"), "CSA");
        assert_eq!(domain_to_org_name("smg.com"), "Service Management Group");
        assert_eq!(domain_to_org_name(""), "");
        assert_eq!(domain_to_org_name("   "), "");
    }

    #[test]
    fn test_org_from_email_domain_accepts_addresses() {
        assert_eq!(org_from_email_domain("hugo.huempel@csa.org"), "CSA");
        assert_eq!(org_from_email_domain("www.acme.com"), "Acme");
    }

    #[test]
    fn test_org_candidate() {
        assert!(is_org_candidate("gatesfoundation.org"));
        assert!(is_org_candidate("smg.com"));
        assert!(!is_org_candidate("gmail.com"));
        assert!(!is_org_candidate("hussein.me.ke"));
        assert!(!is_org_candidate("vanninchiefofstaff.com"));
    }
}
