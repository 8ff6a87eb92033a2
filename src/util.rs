/// Extract the lower-cased domain from an email address.
///
/// Example: "Sarah.Chen@Acme.com" → "acme.com". Returns "" when there is no `@`.
pub fn domain_of_email(email: &str) -> String {
    match email.trim().rsplit_once('@') {
        Some((_, domain)) => domain.trim().trim_end_matches('.').to_lowercase(),
        None => String::new(),
    }
}

/// Derive a display name from an email address (best-effort).
///
/// Example: "sarah.chen@acme.com" → "Sarah Chen"
pub fn name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or(email);
    local
        .split(|c: char| c == '.' || c == '_' || c == '-' || c == '+')
        .filter(|s| !s.is_empty() && s.chars().all(|c| c.is_alphabetic()))
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Upper-case the first character, lower-case the rest.
///
/// Example: "ACME" → "Acme"
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Title-case a whitespace-separated phrase.
///
/// Example: "acme capital" → "Acme Capital"
pub fn title_case(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// True if `email` belongs to one of the executive's own domains.
///
/// Subdomains count as internal ("eu.myco.com" is internal for "myco.com").
pub fn is_internal_email(email: &str, internal_domains: &[String]) -> bool {
    let domain = domain_of_email(email);
    if domain.is_empty() {
        return false;
    }
    internal_domains.iter().any(|d| {
        let d = d.trim().to_lowercase();
        !d.is_empty() && (domain == d || domain.ends_with(&format!(".{}", d)))
    })
}

/// Truncate to at most `max` characters on a char boundary, then trim.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.trim().to_string();
    }
    s.chars().take(max).collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_of_email() {
        assert_eq!(domain_of_email("Sarah.Chen@Acme.COM"), "acme.com");
        assert_eq!(domain_of_email("  joe@bigcorp.io "), "bigcorp.io");
        assert_eq!(domain_of_email("not-an-email"), "");
        assert_eq!(domain_of_email(""), "");
    }

    #[test]
    fn test_name_from_email() {
        assert_eq!(name_from_email("sarah.chen@acme.com"), "Sarah Chen");
        assert_eq!(name_from_email("joe_smith@bigcorp.io"), "Joe Smith");
        assert_eq!(name_from_email("alice@example.com"), "Alice");
        assert_eq!(name_from_email("person9@example9.com"), "");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("acme capital"), "Acme Capital");
        assert_eq!(title_case("  grid   flow "), "Grid Flow");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_is_internal_email() {
        let internal = vec!["rpck.com".to_string()];
        assert!(is_internal_email("me@rpck.com", &internal));
        assert!(is_internal_email("me@EU.rpck.com", &internal));
        assert!(!is_internal_email("them@notrpck.com", &internal));
        assert!(!is_internal_email("them@other.com", &[]));
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo");
        assert_eq!(truncate_chars("short", 10), "short");
    }
}
