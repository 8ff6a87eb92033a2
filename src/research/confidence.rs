//! Anchor confidence scoring and gating for research.
//!
//! Confidence lives in [0, 1]. Research runs only when confidence clears
//! `ResearchConfig::confidence_min` (default 0.70). Inputs are flags and the
//! domain; the subject is read for keyword classes only and never stored.

use crate::research::anchor::AnchorType;
use crate::research::domain::{is_ambiguous_short, is_consumer_domain};
use crate::types::Meeting;

const BASE_CONFIDENCE: f64 = 0.55;

// Bonuses
const BONUS_EXTERNAL_ORG_DOMAIN: f64 = 0.20;
const BONUS_SUBJECT_ORG_KEYWORD: f64 = 0.15;
const BONUS_DISPLAY_NAME: f64 = 0.10;
const BONUS_SUBJECT_ANCHOR_EXTERNAL: f64 = 0.10;

// Penalties
const PENALTY_GENERIC_DOMAIN: f64 = 0.35;
const PENALTY_AMBIGUOUS_ROOT: f64 = 0.30;
const PENALTY_PERSON_NO_ORG: f64 = 0.25;
const PENALTY_VAGUE_SUBJECT: f64 = 0.20;
const PENALTY_TEST_MEETING: f64 = 0.30;

const ORG_KEYWORDS: &[&str] = &[
    "intro",
    "introductory",
    "call on",
    "meeting on",
    "re:",
    "regarding",
    "project",
    "partnership",
];

const VAGUE_SUBJECTS: &[&str] = &[
    "catch up",
    "catch-up",
    "quick chat",
    "sync",
    "check-in",
    "check in",
    "touch base",
    "reconnect",
];

const TEST_MARKERS: &[&str] = &["test", "testing", "dummy", "sandbox", "qa", "asdf", "zzz"];

/// Signals needed to score one anchor candidate.
pub struct ConfidenceInputs<'a> {
    pub meeting: &'a Meeting,
    pub anchor_type: AnchorType,
    pub has_org_context: bool,
    pub primary_domain: &'a str,
    pub anchor_from_subject: bool,
    pub has_external_domain: bool,
    pub has_attendee_display_name: bool,
    pub mailbox: Option<&'a str>,
}

/// Compute anchor confidence in [0, 1].
pub fn compute_confidence(inputs: &ConfidenceInputs) -> f64 {
    let subject = inputs.meeting.subject.trim();
    let domain = inputs.primary_domain.trim();
    let generic = !domain.is_empty() && is_consumer_domain(domain);

    let mut conf = BASE_CONFIDENCE;

    if inputs.has_external_domain && !domain.is_empty() && !generic {
        conf += BONUS_EXTERNAL_ORG_DOMAIN;
    }
    if subject_has_org_keyword(subject) {
        conf += BONUS_SUBJECT_ORG_KEYWORD;
    }
    if inputs.has_attendee_display_name {
        conf += BONUS_DISPLAY_NAME;
    }
    if inputs.anchor_from_subject && inputs.has_external_domain {
        conf += BONUS_SUBJECT_ANCHOR_EXTERNAL;
    }

    if generic {
        conf -= PENALTY_GENERIC_DOMAIN;
    }
    if !domain.is_empty() && is_ambiguous_short(domain) {
        conf -= PENALTY_AMBIGUOUS_ROOT;
    }
    if inputs.anchor_type == AnchorType::Person && !inputs.has_org_context {
        conf -= PENALTY_PERSON_NO_ORG;
    }
    if is_vague_subject(subject) {
        conf -= PENALTY_VAGUE_SUBJECT;
    }
    if is_meeting_like_test(inputs.meeting, inputs.mailbox) {
        conf -= PENALTY_TEST_MEETING;
    }

    // Weights are multiples of 0.05; rounding keeps threshold comparisons exact.
    ((conf * 1000.0).round() / 1000.0).clamp(0.0, 1.0)
}

/// True if the score clears the configured threshold.
pub fn passes_threshold(confidence: f64, confidence_min: f64) -> bool {
    confidence >= confidence_min
}

/// True if the subject carries an organization/project keyword.
pub fn subject_has_org_keyword(subject: &str) -> bool {
    let s = subject.to_lowercase();
    ORG_KEYWORDS.iter().any(|kw| s.contains(kw))
}

/// True if the subject is vague ("quick chat", "sync", "check-in", ...).
/// An empty subject counts as vague.
pub fn is_vague_subject(subject: &str) -> bool {
    let s = subject.trim().to_lowercase();
    if s.is_empty() {
        return true;
    }
    VAGUE_SUBJECTS.iter().any(|v| {
        s == *v || s.starts_with(&format!("{} ", v)) || s.ends_with(&format!(" {}", v))
    })
}

/// True if the subject carries a test marker as a word ("test sync", "QA dry run").
pub fn subject_has_test_marker(subject: &str) -> bool {
    subject
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| TEST_MARKERS.contains(&token))
}

/// True if the meeting looks like a test: a test marker in the subject, or a
/// single attendee who is the requesting mailbox itself.
pub fn is_meeting_like_test(meeting: &Meeting, mailbox: Option<&str>) -> bool {
    if subject_has_test_marker(&meeting.subject) {
        return true;
    }
    let mailbox = match mailbox.map(|m| m.trim().to_lowercase()) {
        Some(m) if !m.is_empty() => m,
        _ => return false,
    };
    meeting.attendees.len() == 1 && meeting.attendees[0].email_lower() == mailbox
}
