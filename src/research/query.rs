//! Query construction and confidence-gated candidate selection.
//!
//! One anchor yields an ordered chain of query candidates:
//!   1. primary        built from the anchor itself
//!   2. fallback A     ambiguous short domain + known person → person + domain
//!   3. fallback B     person without organization context → organization query
//!   4. domain only    bare primary domain
//! A and B never both apply. The first candidate whose sanitized query is
//! usable and whose confidence clears the threshold is chosen.

use crate::research::anchor::{AnchorCandidate, AnchorSource, AnchorType, MeetingContext};
use crate::research::confidence::{compute_confidence, passes_threshold, ConfidenceInputs};
use crate::research::domain::{domain_to_org_name, is_ambiguous_short, is_org_candidate};
use crate::research::sanitize::{is_usable, sanitize};
use crate::research::trace::SkipReason;

pub const ORG_QUERY_HINTS: &str = "(organization, leadership, business, recent news)";
pub const PERSON_QUERY_HINTS: &str = "(role, company, recent news)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    Primary,
    PersonWithDomain,
    OrgFromDomain,
    DomainOnly,
}

/// A sanitized query plus the signals it was scored with.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryCandidate {
    pub kind: CandidateKind,
    pub query: String,
    /// Sanitized person or organization name the query was built from.
    pub name: String,
    pub anchor_type: AnchorType,
    pub anchor_source: AnchorSource,
    pub has_org_context: bool,
    pub primary_domain: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryChoice {
    Chosen(QueryCandidate),
    /// No candidate qualified. Carries the best-scoring usable candidate for
    /// the trace when one existed.
    Skip {
        reason: SkipReason,
        best: Option<QueryCandidate>,
    },
}

/// "X (organization, leadership, business, recent news)"
pub fn build_org_query(name: &str) -> String {
    format!("{} {}", name.trim(), ORG_QUERY_HINTS)
}

/// "X Y (role, company, recent news)"; the context is optional.
pub fn build_person_query(person: &str, context: Option<&str>) -> String {
    match context.map(str::trim).filter(|c| !c.is_empty()) {
        Some(ctx) => format!("{} {} {}", person.trim(), ctx, PERSON_QUERY_HINTS),
        None => format!("{} {}", person.trim(), PERSON_QUERY_HINTS),
    }
}

/// Query phrasing follows the anchor type, never the shape of the text.
pub fn build_query(anchor_type: AnchorType, name: &str, context: Option<&str>) -> String {
    match anchor_type {
        AnchorType::Person => build_person_query(name, context),
        AnchorType::Org | AnchorType::Domain => build_org_query(name),
    }
}

struct RawCandidate {
    kind: CandidateKind,
    /// Person or organization text, before sanitization.
    name: String,
    context: Option<String>,
    anchor_type: AnchorType,
    anchor_source: AnchorSource,
    has_org_context: bool,
    primary_domain: String,
}

fn candidate_chain(anchor: &AnchorCandidate, ctx: &MeetingContext) -> Vec<RawCandidate> {
    let domain = anchor.primary_domain.clone();
    let mut chain = vec![RawCandidate {
        kind: CandidateKind::Primary,
        name: anchor.anchor_text.clone(),
        context: anchor.org_context.clone(),
        anchor_type: anchor.anchor_type,
        anchor_source: anchor.anchor_source,
        has_org_context: anchor.anchor_type != AnchorType::Person || anchor.org_context.is_some(),
        primary_domain: domain.clone(),
    }];
    if domain.is_empty() {
        return chain;
    }

    let known_person = match anchor.anchor_type {
        AnchorType::Person => Some(anchor.anchor_text.clone()),
        _ => ctx.person_name_on(&domain),
    };

    if is_ambiguous_short(&domain) && known_person.is_some() {
        chain.push(RawCandidate {
            kind: CandidateKind::PersonWithDomain,
            name: known_person.unwrap_or_default(),
            context: Some(domain.clone()),
            anchor_type: AnchorType::Person,
            anchor_source: anchor.anchor_source,
            has_org_context: true,
            primary_domain: domain.clone(),
        });
    } else if anchor.anchor_type == AnchorType::Person
        && anchor.org_context.is_none()
        && is_org_candidate(&domain)
        && !is_ambiguous_short(&domain)
    {
        chain.push(RawCandidate {
            kind: CandidateKind::OrgFromDomain,
            name: domain_to_org_name(&domain),
            context: None,
            anchor_type: AnchorType::Org,
            anchor_source: AnchorSource::Attendee,
            has_org_context: true,
            primary_domain: domain.clone(),
        });
    }

    if is_org_candidate(&domain) {
        chain.push(RawCandidate {
            kind: CandidateKind::DomainOnly,
            name: domain.clone(),
            context: None,
            anchor_type: AnchorType::Domain,
            anchor_source: AnchorSource::Attendee,
            has_org_context: true,
            primary_domain: domain,
        });
    }
    chain
}

/// Pick the first usable candidate that clears `confidence_min`.
pub fn choose_query(
    anchor: &AnchorCandidate,
    ctx: &MeetingContext,
    confidence_min: f64,
) -> QueryChoice {
    let has_display_name = ctx.has_attendee_display_name();
    let mut best: Option<QueryCandidate> = None;
    let mut seen: Vec<String> = Vec::new();

    for raw in candidate_chain(anchor, ctx) {
        // The anchor text itself must survive sanitization, not just the hints.
        let name = sanitize(&raw.name);
        if !is_usable(&name) {
            continue;
        }
        let context = raw.context.as_deref().map(sanitize).filter(|c| is_usable(c));
        let query = sanitize(&build_query(raw.anchor_type, &name, context.as_deref()));
        if seen.iter().any(|q| q.eq_ignore_ascii_case(&query)) {
            continue;
        }
        seen.push(query.clone());

        let confidence = compute_confidence(&ConfidenceInputs {
            meeting: ctx.meeting,
            anchor_type: raw.anchor_type,
            has_org_context: raw.has_org_context,
            primary_domain: &raw.primary_domain,
            anchor_from_subject: raw.anchor_source.is_subject(),
            has_external_domain: ctx.has_external_domain(),
            has_attendee_display_name: has_display_name,
            mailbox: ctx.mailbox,
        });
        let candidate = QueryCandidate {
            kind: raw.kind,
            query,
            name,
            anchor_type: raw.anchor_type,
            anchor_source: raw.anchor_source,
            has_org_context: raw.has_org_context,
            primary_domain: raw.primary_domain,
            confidence,
        };
        if passes_threshold(confidence, confidence_min) {
            return QueryChoice::Chosen(candidate);
        }
        if best.as_ref().is_none_or(|b| candidate.confidence > b.confidence) {
            best = Some(candidate);
        }
    }

    let reason = if seen.is_empty() {
        SkipReason::QuerySanitizedEmpty
    } else {
        SkipReason::LowConfidenceAnchor
    };
    QueryChoice::Skip { reason, best }
}
