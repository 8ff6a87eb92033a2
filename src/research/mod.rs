//! Per-meeting research for the daily digest.
//!
//! For each meeting: decide whom or what to research (anchor), turn it into
//! a sanitized query, spend the request's call budget, and accept results
//! only when they verifiably concern the anchor.
//!
//! Flow: anchor → confidence gate → budget/dedupe → provider → guardrail
//! (one narrowed retry) → trace → meeting fields.
//!
//! PII rule: subjects, addresses, anchor text and queries never reach a log
//! line or a trace. Traces carry reason codes, flags and a salted hash.

pub mod anchor;
pub mod budget;
pub mod confidence;
pub mod config;
pub mod domain;
pub mod enrich;
pub mod guardrail;
pub mod orchestrate;
pub mod provider;
pub mod query;
pub mod sanitize;
pub mod trace;

pub use config::ResearchConfig;
pub use orchestrate::{enrich_meetings, DigestResearch, ResearchRequest};
pub use provider::{select_research_provider, ResearchProvider, StubResearchProvider};
