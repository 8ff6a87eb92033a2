//! Shared data shapes: calendar meetings in, research fields out.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::research::trace::ResearchTrace;

// =============================================================================
// Meeting input (normalized by the calendar adapter)
// =============================================================================

/// One meeting attendee. Every field is optional because calendar providers
/// routinely omit names and companies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, alias = "address", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl Attendee {
    pub fn new(name: &str, email: &str) -> Self {
        Self {
            name: Some(name.to_string()).filter(|n| !n.trim().is_empty()),
            email: Some(email.to_string()).filter(|e| !e.trim().is_empty()),
            company: None,
        }
    }

    /// Lower-cased, trimmed email, or "" when absent.
    pub fn email_lower(&self) -> String {
        self.email
            .as_deref()
            .map(|e| e.trim().to_lowercase())
            .unwrap_or_default()
    }

    /// Trimmed display name, if one is present and is not just the address.
    pub fn display_name(&self) -> Option<&str> {
        let name = self.name.as_deref()?.trim();
        if name.is_empty() || name.contains('@') {
            return None;
        }
        Some(name)
    }
}

/// Canonical meeting shape. Immutable input to research resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, alias = "title")]
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    #[serde(default, alias = "startTime", skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<FixedOffset>>,
    #[serde(default, alias = "endTime", skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<FixedOffset>>,
}

impl Meeting {
    pub fn new(subject: &str, attendees: Vec<Attendee>) -> Self {
        Self {
            subject: subject.to_string(),
            attendees,
            ..Self::default()
        }
    }

    pub fn with_organizer(mut self, organizer: &str) -> Self {
        self.organizer = Some(organizer.to_string());
        self
    }

    pub fn organizer_lower(&self) -> String {
        self.organizer
            .as_deref()
            .map(|o| o.trim().to_lowercase())
            .unwrap_or_default()
    }
}

// =============================================================================
// Research provider shapes
// =============================================================================

/// A single cited source returned by the research provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchSource {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

impl ResearchSource {
    pub fn new(title: &str, url: &str) -> Self {
        Self {
            title: title.to_string(),
            url: url.to_string(),
        }
    }
}

/// Provider response. An empty value stands for "nothing found" as well as
/// for transport failures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchResult {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub sources: Vec<ResearchSource>,
}

impl ResearchResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_empty() && self.key_points.is_empty() && self.sources.is_empty()
    }
}

// =============================================================================
// Digest output
// =============================================================================

/// Meeting-facing research fields. All empty when research was skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingResearch {
    #[serde(default)]
    pub context_summary: Option<String>,
    #[serde(default)]
    pub news: Vec<ResearchSource>,
    #[serde(default)]
    pub strategic_angles: Vec<String>,
    #[serde(default)]
    pub high_leverage_questions: Vec<String>,
}

impl MeetingResearch {
    pub fn is_populated(&self) -> bool {
        self.context_summary
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }
}

/// A meeting plus whatever research was attached to it in this digest build.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedMeeting {
    #[serde(flatten)]
    pub meeting: Meeting,
    #[serde(flatten)]
    pub research: MeetingResearch,
    /// Dev-only diagnostics. Stripped before production rendering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub research_trace: Option<ResearchTrace>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meeting_deserializes_calendar_aliases() {
        let json = r#"{
            "title": "Intro: Acme Capital",
            "organizer": "Partner@AcmeCapital.com",
            "startTime": "2025-09-08T10:00:00-04:00",
            "attendees": [{"name": "Jane Doe", "address": "jane@acmecapital.com"}]
        }"#;
        let meeting: Meeting = serde_json::from_str(json).expect("parse");
        assert_eq!(meeting.subject, "Intro: Acme Capital");
        assert_eq!(meeting.organizer_lower(), "partner@acmecapital.com");
        assert_eq!(meeting.attendees[0].email_lower(), "jane@acmecapital.com");
        assert!(meeting.start.is_some());
        assert!(meeting.end.is_none());
    }

    #[test]
    fn test_display_name_rejects_addresses() {
        let a = Attendee::new("jane@acme.com", "jane@acme.com");
        assert_eq!(a.display_name(), None);
        let b = Attendee::new("  Jane Doe ", "jane@acme.com");
        assert_eq!(b.display_name(), Some("Jane Doe"));
        let c = Attendee::new("", "x@y.com");
        assert!(c.name.is_none());
    }

    #[test]
    fn test_meeting_research_populated_requires_summary() {
        let mut research = MeetingResearch::default();
        assert!(!research.is_populated());
        research.context_summary = Some("  ".into());
        assert!(!research.is_populated());
        research.context_summary = Some("- Acme raised a fund".into());
        assert!(research.is_populated());
    }
}
