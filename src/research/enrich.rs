//! Meeting-facing research fields built from an accepted result.
//!
//! Only results that passed the guardrail reach this module. Skipped
//! meetings keep `MeetingResearch::default()`.

use crate::research::anchor::AnchorType;
use crate::research::config::MAX_RESEARCH_SUMMARY_CHARS;
use crate::types::{MeetingResearch, ResearchResult, ResearchSource};
use crate::util::truncate_chars;

const MAX_SUMMARY_BULLETS: usize = 3;
const MAX_NEWS_ITEMS: usize = 4;
const MAX_STRATEGIC_ANGLES: usize = 4;
const MAX_QUESTIONS: usize = 6;

/// Key points turned into angles before templates fill the rest.
const ANGLES_FROM_KEY_POINTS: usize = 2;

const ORG_ANGLES: &[&str] = &[
    "Confirm {name}'s current priorities and where this meeting fits.",
    "Map the decision makers at {name} and agree on a clear next step.",
    "Look for a concrete, near-term way to add value for {name}.",
];

const PERSON_ANGLES: &[&str] = &[
    "Understand {name}'s role and current mandate before proposing anything.",
    "Find the overlap between {name}'s priorities and ours.",
    "Leave with one specific follow-up owned by {name}.",
];

const ORG_QUESTIONS: &[&str] = &[
    "What are {name}'s top priorities for the next two quarters?",
    "Who else at {name} should be involved in this decision?",
    "What would make this partnership a clear win for {name}?",
];

const PERSON_QUESTIONS: &[&str] = &[
    "What is {name} focused on right now?",
    "What would a successful outcome of this meeting look like for {name}?",
    "Who else should {name} and I bring into this conversation?",
];

/// Fill the four meeting fields from an accepted result.
///
/// `sources` is the guardrail's deduplicated, capped list.
pub fn populate(
    result: &ResearchResult,
    sources: &[ResearchSource],
    anchor_type: AnchorType,
    name: &str,
) -> MeetingResearch {
    let key_points: Vec<&str> = result
        .key_points
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .collect();

    MeetingResearch {
        context_summary: context_summary(&result.summary, &key_points),
        news: sources.iter().take(MAX_NEWS_ITEMS).cloned().collect(),
        strategic_angles: strategic_angles(&key_points, anchor_type, name),
        high_leverage_questions: questions(&key_points, anchor_type, name),
    }
}

fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        current.push(c);
        let at_break = matches!(c, '.' | '!' | '?')
            && chars.peek().is_none_or(|next| next.is_whitespace());
        if at_break {
            let s = current.trim().to_string();
            if !s.is_empty() {
                sentences.push(s);
            }
            current.clear();
        }
    }
    let rest = current.trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}

fn context_summary(summary: &str, key_points: &[&str]) -> Option<String> {
    let mut bullets: Vec<String> = split_sentences(summary)
        .into_iter()
        .take(MAX_SUMMARY_BULLETS)
        .collect();
    if bullets.is_empty() {
        bullets = key_points
            .iter()
            .take(MAX_SUMMARY_BULLETS)
            .map(|k| k.to_string())
            .collect();
    }
    if bullets.is_empty() {
        return None;
    }
    let text = bullets
        .iter()
        .map(|b| format!("- {}", b))
        .collect::<Vec<_>>()
        .join("\n");
    Some(truncate_chars(&text, MAX_RESEARCH_SUMMARY_CHARS))
}

fn fill(template: &str, name: &str) -> String {
    let name = if name.trim().is_empty() { "them" } else { name.trim() };
    template.replace("{name}", name)
}

fn strategic_angles(key_points: &[&str], anchor_type: AnchorType, name: &str) -> Vec<String> {
    let templates = match anchor_type {
        AnchorType::Person => PERSON_ANGLES,
        AnchorType::Org | AnchorType::Domain => ORG_ANGLES,
    };
    let mut angles: Vec<String> = key_points
        .iter()
        .take(ANGLES_FROM_KEY_POINTS)
        .map(|k| format!("Reference recent coverage: {}", k))
        .collect();
    // Templates always pad past the two-angle minimum.
    for template in templates {
        if angles.len() >= MAX_STRATEGIC_ANGLES {
            break;
        }
        angles.push(fill(template, name));
    }
    angles
}

fn questions(key_points: &[&str], anchor_type: AnchorType, name: &str) -> Vec<String> {
    let templates = match anchor_type {
        AnchorType::Person => PERSON_QUESTIONS,
        AnchorType::Org | AnchorType::Domain => ORG_QUESTIONS,
    };
    let mut out: Vec<String> = templates.iter().map(|t| fill(t, name)).collect();
    out.extend(
        key_points
            .iter()
            .map(|k| format!("How does \"{}\" affect what we discuss today?", k)),
    );
    out.truncate(MAX_QUESTIONS);
    out
}
