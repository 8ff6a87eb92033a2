//! Anchor resolution: who or what to research for one meeting.
//!
//! `MeetingContext` derives the non-PII facts the ladder needs (external
//! attendees, external domain counts, the organizer's domain). The ladder is
//! an ordered list of `AnchorStrategy` variants; each proposes at most one
//! `AnchorCandidate` and the first surviving proposal wins.
//!
//! Ladder:
//!   1. SubjectCounterparty  "Call with X", "Intro: X"         (1:1 only)
//!   2. AttendeeDisplayName  sole external attendee's name      (1:1 only)
//!   3. SubjectOrg           "... on X", "re: X", "Intro: X"
//!   4. OrganizerDomain      external organizer's organization
//!   5. AttendeeScan         first usable external attendee
//!   6. DomainFallback       weighted primary domain
//!
//! Subject-derived proposals are dropped when every external domain looks
//! personal or assistant-run: a coincidental subject phrase is not evidence.

use serde::{Deserialize, Serialize};

use crate::research::domain::{
    domain_root, domain_to_org_name, is_consumer_domain, is_org_candidate, known_org_name,
    looks_like_assistant_domain, looks_like_personal_domain, normalize_domain,
};
use crate::types::{Attendee, Meeting};
use crate::util::{domain_of_email, is_internal_email, name_from_email};

/// Longest subject-derived phrase accepted as an anchor.
const MAX_SUBJECT_ANCHOR_CHARS: usize = 60;
const MIN_SUBJECT_ORG_CHARS: usize = 3;
const MAX_COUNTERPARTY_WORDS: usize = 4;

/// Markers that introduce an organization phrase in a subject.
const ORG_MARKERS: &[&str] = &[" on ", " re: ", " regarding ", ":"];

/// Trailing words stripped from a subject organization phrase.
const GENERIC_SUBJECT_WORDS: &[&str] = &["call", "meeting", "introductory", "intro", "sync"];

const COUNTERPARTY_PREFIXES: &[&str] = &["intro:", "introduction:"];
const COUNTERPARTY_SEPARATORS: &[&str] = &[",", "&", " and ", "/", " - ", "(", "|", ":"];

// Primary-domain weights
const WEIGHT_PER_ATTENDEE: i64 = 10;
const WEIGHT_KNOWN_ORG: i64 = 50;
const WEIGHT_PERSONAL: i64 = -40;
const WEIGHT_ASSISTANT: i64 = -30;

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorType {
    Person,
    Org,
    Domain,
}

impl AnchorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnchorType::Person => "person",
            AnchorType::Org => "org",
            AnchorType::Domain => "domain",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorSource {
    SubjectCounterparty,
    SubjectOrg,
    OrganizerDomain,
    Attendee,
}

impl AnchorSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnchorSource::SubjectCounterparty => "subject_counterparty",
            AnchorSource::SubjectOrg => "subject_org",
            AnchorSource::OrganizerDomain => "organizer_domain",
            AnchorSource::Attendee => "attendee",
        }
    }

    pub fn is_subject(&self) -> bool {
        matches!(self, AnchorSource::SubjectCounterparty | AnchorSource::SubjectOrg)
    }
}

/// The resolved research subject for one meeting. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorCandidate {
    pub anchor_text: String,
    pub anchor_type: AnchorType,
    pub anchor_source: AnchorSource,
    pub org_context: Option<String>,
    /// Domain the guardrail expects sources on. Empty when none is known.
    pub primary_domain: String,
}

/// External non-consumer domain and how many participants share it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendeeDomainStat {
    pub domain: String,
    pub count: usize,
}

// =============================================================================
// Meeting context
// =============================================================================

/// Derived view of one meeting, built once per resolution.
pub struct MeetingContext<'a> {
    pub meeting: &'a Meeting,
    pub mailbox: Option<&'a str>,
    /// Attendees outside the executive's domains, in calendar order.
    pub external_attendees: Vec<&'a Attendee>,
    /// Every external domain seen, consumer ones included, first-seen order.
    pub external_domains: Vec<String>,
    /// External non-consumer domains with participant counts.
    pub domain_stats: Vec<AttendeeDomainStat>,
    /// Organizer's domain when external and non-consumer.
    pub organizer_domain: Option<String>,
    /// 1:1 meeting with a single external organization.
    pub person_first: bool,
}

impl<'a> MeetingContext<'a> {
    pub fn new(
        meeting: &'a Meeting,
        mailbox: Option<&'a str>,
        internal_domains: &[String],
    ) -> Self {
        let mailbox_lower = mailbox.map(|m| m.trim().to_lowercase()).unwrap_or_default();
        let mut internal: Vec<String> = internal_domains
            .iter()
            .map(|d| d.trim().to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        let mailbox_domain = domain_of_email(&mailbox_lower);
        if !mailbox_domain.is_empty() {
            internal.push(mailbox_domain);
        }

        let is_external = |email: &str| {
            !email.is_empty()
                && email != mailbox_lower
                && !domain_of_email(email).is_empty()
                && !is_internal_email(email, &internal)
        };

        let mut ctx = Self {
            meeting,
            mailbox,
            external_attendees: Vec::new(),
            external_domains: Vec::new(),
            domain_stats: Vec::new(),
            organizer_domain: None,
            person_first: false,
        };

        for attendee in &meeting.attendees {
            let email = attendee.email_lower();
            if !is_external(&email) {
                continue;
            }
            ctx.external_attendees.push(attendee);
            ctx.record_domain(&normalize_domain(&email));
        }

        let organizer = meeting.organizer_lower();
        if is_external(&organizer) {
            let domain = normalize_domain(&organizer);
            let organizer_attends = meeting.attendees.iter().any(|a| a.email_lower() == organizer);
            if !organizer_attends {
                ctx.record_domain(&domain);
            }
            if !is_consumer_domain(&domain) {
                ctx.organizer_domain = Some(domain);
            }
        }

        // The single counted domain must be the attendee's own, not an absent organizer's.
        ctx.person_first = match (ctx.domain_stats.as_slice(), ctx.external_attendees.as_slice()) {
            ([stat], [attendee]) => normalize_domain(&attendee.email_lower()) == stat.domain,
            _ => false,
        };
        ctx
    }

    fn record_domain(&mut self, domain: &str) {
        if domain.is_empty() {
            return;
        }
        if !self.external_domains.iter().any(|d| d == domain) {
            self.external_domains.push(domain.to_string());
        }
        if is_consumer_domain(domain) {
            return;
        }
        match self.domain_stats.iter_mut().find(|s| s.domain == domain) {
            Some(stat) => stat.count += 1,
            None => self.domain_stats.push(AttendeeDomainStat {
                domain: domain.to_string(),
                count: 1,
            }),
        }
    }

    /// True when at least one external non-consumer domain is present.
    pub fn has_external_domain(&self) -> bool {
        !self.domain_stats.is_empty()
    }

    /// True when any external attendee carries a display name.
    pub fn has_attendee_display_name(&self) -> bool {
        self.external_attendees.iter().any(|a| a.display_name().is_some())
    }

    /// True when no external domain can stand for an organization.
    fn lacks_org_evidence(&self) -> bool {
        self.domain_stats.iter().all(|s| {
            looks_like_personal_domain(&s.domain) || looks_like_assistant_domain(&s.domain)
        })
    }

    /// Known name for someone on `domain`: a display name, or one derived
    /// from the address.
    pub fn person_name_on(&self, domain: &str) -> Option<String> {
        self.external_attendees
            .iter()
            .filter(|a| normalize_domain(&a.email_lower()) == domain)
            .find_map(|a| {
                a.display_name()
                    .map(|n| n.to_string())
                    .or_else(|| Some(name_from_email(&a.email_lower())).filter(|n| !n.is_empty()))
            })
    }

    fn sole_external(&self) -> Option<(&'a Attendee, &str)> {
        if !self.person_first {
            return None;
        }
        Some((self.external_attendees[0], self.domain_stats[0].domain.as_str()))
    }
}

// =============================================================================
// Strategy ladder
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorStrategy {
    SubjectCounterparty,
    AttendeeDisplayName,
    SubjectOrg,
    OrganizerDomain,
    AttendeeScan,
    DomainFallback,
}

pub const ANCHOR_LADDER: &[AnchorStrategy] = &[
    AnchorStrategy::SubjectCounterparty,
    AnchorStrategy::AttendeeDisplayName,
    AnchorStrategy::SubjectOrg,
    AnchorStrategy::OrganizerDomain,
    AnchorStrategy::AttendeeScan,
    AnchorStrategy::DomainFallback,
];

impl AnchorStrategy {
    /// Propose an anchor, or None when this rung does not apply.
    pub fn propose(&self, ctx: &MeetingContext) -> Option<AnchorCandidate> {
        match self {
            AnchorStrategy::SubjectCounterparty => {
                let (attendee, domain) = ctx.sole_external()?;
                let name = counterparty_from_subject(&ctx.meeting.subject)?;
                // A name not matching the attendee may be a third party.
                let org_context = if names_overlap(&name, attendee) {
                    person_org_context(attendee, domain)
                } else {
                    None
                };
                if org_context.is_none() && !is_org_candidate(domain) {
                    return None;
                }
                Some(AnchorCandidate {
                    anchor_text: name,
                    anchor_type: AnchorType::Person,
                    anchor_source: AnchorSource::SubjectCounterparty,
                    org_context,
                    primary_domain: domain.to_string(),
                })
            }
            AnchorStrategy::AttendeeDisplayName => {
                let (attendee, domain) = ctx.sole_external()?;
                let name = attendee.display_name()?;
                // A bare name on a personal domain is never a safe query.
                let org_context = person_org_context(attendee, domain)?;
                Some(AnchorCandidate {
                    anchor_text: name.to_string(),
                    anchor_type: AnchorType::Person,
                    anchor_source: AnchorSource::Attendee,
                    org_context: Some(org_context),
                    primary_domain: domain.to_string(),
                })
            }
            AnchorStrategy::SubjectOrg => {
                let org = extract_org_from_subject(&ctx.meeting.subject)?;
                Some(AnchorCandidate {
                    anchor_text: org,
                    anchor_type: AnchorType::Org,
                    anchor_source: AnchorSource::SubjectOrg,
                    org_context: None,
                    primary_domain: select_primary_domain(ctx).unwrap_or_default(),
                })
            }
            AnchorStrategy::OrganizerDomain => {
                let domain = ctx.organizer_domain.as_deref().filter(|d| is_org_candidate(d))?;
                Some(domain_anchor(domain, AnchorType::Domain, AnchorSource::OrganizerDomain))
            }
            AnchorStrategy::AttendeeScan => {
                if let Some((attendee, domain)) = ctx.sole_external() {
                    if !is_org_candidate(domain) {
                        return None;
                    }
                    let name = Some(name_from_email(&attendee.email_lower()))
                        .filter(|n| !n.is_empty())?;
                    return Some(AnchorCandidate {
                        anchor_text: name,
                        anchor_type: AnchorType::Person,
                        anchor_source: AnchorSource::Attendee,
                        org_context: person_org_context(attendee, domain),
                        primary_domain: domain.to_string(),
                    });
                }
                // Multi-domain: organization anchors only, never a person.
                ctx.external_attendees.iter().find_map(|a| {
                    let domain = normalize_domain(&a.email_lower());
                    let counted = ctx.domain_stats.iter().any(|s| s.domain == domain);
                    (counted && is_org_candidate(&domain))
                        .then(|| domain_anchor(&domain, AnchorType::Org, AnchorSource::Attendee))
                })
            }
            AnchorStrategy::DomainFallback => {
                let domain = select_primary_domain(ctx).filter(|d| is_org_candidate(d))?;
                Some(domain_anchor(&domain, AnchorType::Domain, AnchorSource::Attendee))
            }
        }
    }
}

/// Walk the ladder and return the first surviving anchor.
pub fn resolve_anchor(ctx: &MeetingContext) -> Option<AnchorCandidate> {
    for strategy in ANCHOR_LADDER {
        let Some(candidate) = strategy.propose(ctx) else {
            continue;
        };
        if candidate.anchor_source.is_subject() && ctx.lacks_org_evidence() {
            log::debug!("Dropping subject anchor from {:?}: no organization evidence", strategy);
            continue;
        }
        return Some(candidate);
    }
    None
}

fn domain_anchor(
    domain: &str,
    anchor_type: AnchorType,
    anchor_source: AnchorSource,
) -> AnchorCandidate {
    AnchorCandidate {
        anchor_text: domain_to_org_name(domain),
        anchor_type,
        anchor_source,
        org_context: None,
        primary_domain: domain.to_string(),
    }
}

/// Organization context for a person: their listed company, else the
/// organization behind their domain when it can stand for one.
fn person_org_context(attendee: &Attendee, domain: &str) -> Option<String> {
    if let Some(company) = attendee.company.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        return Some(company.to_string());
    }
    is_org_candidate(domain).then(|| domain_to_org_name(domain))
}

fn name_tokens(s: &str) -> Vec<String> {
    s.to_lowercase()
        .split(|c: char| !c.is_alphabetic())
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

/// True when a subject-derived name shares a token with the attendee's
/// display name or address local part.
fn names_overlap(name: &str, attendee: &Attendee) -> bool {
    let wanted = name_tokens(name);
    let email = attendee.email_lower();
    let local = email.split('@').next().unwrap_or("");
    let mut have = name_tokens(local);
    if let Some(display) = attendee.display_name() {
        have.extend(name_tokens(display));
    }
    wanted.iter().any(|t| have.contains(t))
}

// =============================================================================
// Subject parsing
// =============================================================================

/// Organization phrase after "on", "re:", "regarding" or ":".
///
/// Example: "Introductory call on Kheyti Project" → "Kheyti Project"
pub fn extract_org_from_subject(subject: &str) -> Option<String> {
    let subject = subject.trim();
    let lower = subject.to_ascii_lowercase();
    let (pos, marker) = ORG_MARKERS
        .iter()
        .filter_map(|m| lower.find(m).map(|i| (i, *m)))
        .min_by_key(|(i, _)| *i)?;
    let rest = &subject[pos + marker.len()..];

    let mut words: Vec<&str> = rest
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| matches!(c, ',' | '.' | '-' | '|' | '"' | '\'' | '(' | ')'))
        })
        .filter(|w| !w.is_empty())
        .collect();
    while let Some(last) = words.last() {
        if GENERIC_SUBJECT_WORDS.contains(&last.to_lowercase().as_str()) {
            words.pop();
        } else {
            break;
        }
    }

    let phrase = words.join(" ");
    let len = phrase.chars().count();
    if !(MIN_SUBJECT_ORG_CHARS..=MAX_SUBJECT_ANCHOR_CHARS).contains(&len) || phrase.contains('@') {
        return None;
    }
    let capitalized = words
        .iter()
        .any(|w| w.chars().next().is_some_and(|c| c.is_uppercase()));
    capitalized.then_some(phrase)
}

/// Counterparty name from "Call with X" or "Intro: X" subjects.
///
/// Example: "Follow-up with John Doe, Acme" → "John Doe"
pub fn counterparty_from_subject(subject: &str) -> Option<String> {
    let subject = subject.trim();
    let lower = subject.to_ascii_lowercase();

    let rest = if let Some(prefix) = COUNTERPARTY_PREFIXES.iter().find(|p| lower.starts_with(*p)) {
        &subject[prefix.len()..]
    } else if let Some(i) = lower.find(" with ") {
        &subject[i + " with ".len()..]
    } else if lower.starts_with("with ") {
        &subject["with ".len()..]
    } else {
        return None;
    };

    let rest_lower = rest.to_ascii_lowercase();
    let cut = COUNTERPARTY_SEPARATORS
        .iter()
        .filter_map(|sep| rest_lower.find(sep))
        .min()
        .unwrap_or(rest.len());
    let name = rest[..cut].trim();

    let words = name.split_whitespace().count();
    if name.is_empty()
        || words > MAX_COUNTERPARTY_WORDS
        || name.chars().count() > MAX_SUBJECT_ANCHOR_CHARS
        || name.chars().any(|c| c.is_ascii_digit() || c == '@')
        || !name.chars().next().is_some_and(|c| c.is_uppercase())
    {
        return None;
    }
    Some(name.to_string())
}

// =============================================================================
// Primary domain
// =============================================================================

fn tld_bonus(domain: &str) -> i64 {
    match domain.rsplit('.').next().unwrap_or("") {
        "com" => 5,
        "org" => 4,
        "co" | "io" | "net" => 3,
        _ => 0,
    }
}

fn domain_weight(stat: &AttendeeDomainStat) -> i64 {
    let mut score = stat.count as i64 * WEIGHT_PER_ATTENDEE;
    if known_org_name(&domain_root(&stat.domain)).is_some() {
        score += WEIGHT_KNOWN_ORG;
    }
    if looks_like_personal_domain(&stat.domain) {
        score += WEIGHT_PERSONAL;
    }
    if looks_like_assistant_domain(&stat.domain) {
        score += WEIGHT_ASSISTANT;
    }
    score + tld_bonus(&stat.domain)
}

/// Pick the domain that best represents the external counterparty.
///
/// Highest weight wins; ties go to the organizer's domain, then a domain
/// whose root appears in the subject, then alphabetical order.
pub fn select_primary_domain(ctx: &MeetingContext) -> Option<String> {
    let subject = ctx.meeting.subject.to_lowercase();
    let organizer = ctx.organizer_domain.as_deref();
    ctx.domain_stats
        .iter()
        .map(|s| {
            let root = domain_root(&s.domain);
            let in_subject = !root.is_empty() && subject.contains(&root);
            (domain_weight(s), organizer == Some(s.domain.as_str()), in_subject, &s.domain)
        })
        .max_by(|a, b| {
            a.0.cmp(&b.0)
                .then(a.1.cmp(&b.1))
                .then(a.2.cmp(&b.2))
                .then(b.3.cmp(a.3))
        })
        .map(|(_, _, _, d)| d.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_for<'a>(meeting: &'a Meeting) -> MeetingContext<'a> {
        MeetingContext::new(meeting, Some("me@company.com"), &[])
    }

    #[test]
    fn test_context_counts_external_domains() {
        let meeting = Meeting::new(
            "SMG Optional Call",
            vec![
                Attendee::new("Alice", "alice@smg.com"),
                Attendee::new("Bob", "bob@smg.com"),
                Attendee::new("Me", "me@company.com"),
                Attendee::new("Pat", "pat@gmail.com"),
            ],
        )
        .with_organizer("internal@company.com");
        let ctx = ctx_for(&meeting);
        assert_eq!(ctx.external_attendees.len(), 3);
        assert_eq!(ctx.external_domains, vec!["smg.com", "gmail.com"]);
        assert_eq!(
            ctx.domain_stats,
            vec![AttendeeDomainStat { domain: "smg.com".into(), count: 2 }]
        );
        assert!(ctx.organizer_domain.is_none());
        assert!(!ctx.person_first);
    }

    #[test]
    fn test_organizer_domain_counts_when_not_attending() {
        let meeting = Meeting::new(
            "Partnership review",
            vec![Attendee::new("Jane", "jane@acmecapital.com")],
        )
        .with_organizer("lead@gridflow.io");
        let ctx = ctx_for(&meeting);
        assert_eq!(ctx.organizer_domain.as_deref(), Some("gridflow.io"));
        assert_eq!(ctx.domain_stats.len(), 2);
        assert!(!ctx.person_first);
    }

    #[test]
    fn test_configured_internal_domains_are_not_external() {
        let meeting = Meeting::new("Weekly", vec![Attendee::new("Kim", "kim@rpck.com")]);
        let ctx = MeetingContext::new(&meeting, None, &["rpck.com".to_string()]);
        assert!(ctx.external_attendees.is_empty());
        assert!(ctx.external_domains.is_empty());
    }

    #[test]
    fn test_counterparty_from_subject() {
        assert_eq!(counterparty_from_subject("Call with John Doe").as_deref(), Some("John Doe"));
        assert_eq!(
            counterparty_from_subject("Follow-up with John Doe, Acme").as_deref(),
            Some("John Doe")
        );
        assert_eq!(
            counterparty_from_subject("Intro: Jane Smith & Tom").as_deref(),
            Some("Jane Smith")
        );
        assert_eq!(counterparty_from_subject("test sync with team"), None);
        assert_eq!(counterparty_from_subject("Weekly pipeline review"), None);
        assert_eq!(counterparty_from_subject("Call with 555-1234"), None);
    }

    #[test]
    fn test_extract_org_from_subject() {
        assert_eq!(
            extract_org_from_subject("Introductory call on Kheyti Project").as_deref(),
            Some("Kheyti Project")
        );
        assert_eq!(
            extract_org_from_subject("Intro: Acme Capital").as_deref(),
            Some("Acme Capital")
        );
        assert_eq!(
            extract_org_from_subject("Call re: Gridflow intro call").as_deref(),
            Some("Gridflow")
        );
        assert_eq!(extract_org_from_subject("Notes: ok"), None, "too short");
        assert_eq!(extract_org_from_subject("catch up on stuff"), None, "needs a capital");
        assert_eq!(extract_org_from_subject("SMG Optional Call"), None);
    }

    #[test]
    fn test_person_first_prefers_subject_counterparty() {
        let meeting = Meeting::new(
            "Call with John Doe",
            vec![Attendee::new("John Doe", "john@example.com")],
        );
        let ctx = ctx_for(&meeting);
        assert!(ctx.person_first);
        let anchor = resolve_anchor(&ctx).expect("anchor");
        assert_eq!(anchor.anchor_type, AnchorType::Person);
        assert_eq!(anchor.anchor_source, AnchorSource::SubjectCounterparty);
        assert_eq!(anchor.anchor_text, "John Doe");
        assert_eq!(anchor.org_context.as_deref(), Some("Example"));
        assert_eq!(anchor.primary_domain, "example.com");
    }

    #[test]
    fn test_unrelated_counterparty_gets_no_org_context() {
        let meeting = Meeting::new(
            "Call with Maria Lopez",
            vec![Attendee::new("", "john@example.com")],
        );
        let anchor = resolve_anchor(&ctx_for(&meeting)).expect("anchor");
        assert_eq!(anchor.anchor_text, "Maria Lopez");
        assert!(anchor.org_context.is_none());
    }

    #[test]
    fn test_subject_anchor_dropped_for_personal_domain() {
        let meeting = Meeting::new(
            "Call with Hussein",
            vec![Attendee::new("", "hussein@hussein.me.ke")],
        );
        let ctx = ctx_for(&meeting);
        // Counterparty dropped, no display name, personal domain blocks the rest.
        assert_eq!(resolve_anchor(&ctx), None);
    }

    #[test]
    fn test_multi_domain_scan_skips_personal_domains() {
        let meeting = Meeting::new(
            "Board prep",
            vec![
                Attendee::new("Hussein", "hussein@hussein.me.ke"),
                Attendee::new("Ann", "ann@gatesfoundation.org"),
                Attendee::new("Raj", "raj@vanninchiefofstaff.com"),
            ],
        );
        let anchor = resolve_anchor(&ctx_for(&meeting)).expect("anchor");
        assert_eq!(anchor.anchor_type, AnchorType::Org);
        assert_eq!(anchor.anchor_text, "Gates Foundation");
        assert_eq!(anchor.primary_domain, "gatesfoundation.org");
    }

    #[test]
    fn test_smg_meeting_anchors_on_organization() {
        let meeting = Meeting::new(
            "SMG Optional Call",
            vec![Attendee::new("Alice", "alice@smg.com"), Attendee::new("Bob", "bob@smg.com")],
        )
        .with_organizer("internal@company.com");
        let anchor = resolve_anchor(&ctx_for(&meeting)).expect("anchor");
        assert_eq!(anchor.anchor_text, "Service Management Group");
        assert_eq!(anchor.anchor_source, AnchorSource::Attendee);
        assert_eq!(anchor.primary_domain, "smg.com");
    }

    #[test]
    fn test_organizer_domain_rung() {
        let meeting = Meeting::new(
            "Quarterly review",
            vec![
                Attendee::new("Hugo", "hugo.huempel@csa.org"),
                Attendee::new("Li", "li@gridflow.io"),
            ],
        )
        .with_organizer("li@gridflow.io");
        let anchor = resolve_anchor(&ctx_for(&meeting)).expect("anchor");
        assert_eq!(anchor.anchor_source, AnchorSource::OrganizerDomain);
        assert_eq!(anchor.anchor_text, "Gridflow");
    }

    #[test]
    fn test_select_primary_domain_weights_and_ties() {
        let meeting = Meeting::new(
            "Kickoff with Gridflow",
            vec![
                Attendee::new("A", "a@acmecapital.com"),
                Attendee::new("B", "b@gridflow.com"),
            ],
        );
        // Equal weight; "gridflow" appears in the subject.
        assert_eq!(select_primary_domain(&ctx_for(&meeting)).as_deref(), Some("gridflow.com"));

        let meeting = Meeting::new(
            "Kickoff",
            vec![
                Attendee::new("A", "a@acmecapital.com"),
                Attendee::new("B", "b@acmecapital.com"),
                Attendee::new("C", "c@csa.org"),
            ],
        );
        // Known organization outweighs the extra attendee.
        assert_eq!(select_primary_domain(&ctx_for(&meeting)).as_deref(), Some("csa.org"));

        let meeting = Meeting::new(
            "Kickoff",
            vec![Attendee::new("A", "a@zetacapital.com"), Attendee::new("B", "b@betacapital.com")],
        );
        assert_eq!(select_primary_domain(&ctx_for(&meeting)).as_deref(), Some("betacapital.com"));
    }

    #[test]
    fn test_no_external_participants_yields_no_anchor() {
        let meeting = Meeting::new("Team standup", vec![Attendee::new("Kim", "kim@company.com")]);
        let ctx = ctx_for(&meeting);
        assert!(ctx.external_domains.is_empty());
        assert_eq!(resolve_anchor(&ctx), None);
    }

    #[test]
    fn test_display_name_on_personal_domain_is_not_an_anchor() {
        let meeting = Meeting::new(
            "Project kickoff",
            vec![Attendee::new("Hussein", "hussein@hussein.me.ke")],
        );
        let ctx = ctx_for(&meeting);
        assert!(ctx.person_first);
        assert_eq!(resolve_anchor(&ctx), None);
    }

    #[test]
    fn test_listed_company_keeps_person_anchor_on_personal_domain() {
        let mut attendee = Attendee::new("Hussein", "hussein@hussein.me.ke");
        attendee.company = Some("Kheyti".to_string());
        let meeting = Meeting::new("Project kickoff", vec![attendee]);
        let anchor = resolve_anchor(&ctx_for(&meeting)).expect("anchor");
        assert_eq!(anchor.anchor_type, AnchorType::Person);
        assert_eq!(anchor.org_context.as_deref(), Some("Kheyti"));
    }

    #[test]
    fn test_person_first_requires_attendees_own_domain() {
        let meeting = Meeting::new(
            "Portfolio review",
            vec![Attendee::new("Pat Smith", "pat@gmail.com")],
        )
        .with_organizer("lead@acmecapital.com");
        let ctx = ctx_for(&meeting);
        assert_eq!(ctx.domain_stats.len(), 1);
        assert!(!ctx.person_first, "organizer's domain is not the attendee's");

        let anchor = resolve_anchor(&ctx).expect("anchor");
        assert_eq!(anchor.anchor_source, AnchorSource::OrganizerDomain);
        assert_eq!(anchor.anchor_type, AnchorType::Domain);
        assert_eq!(anchor.anchor_text, "Acmecapital");
        assert!(anchor.org_context.is_none());
    }
}
