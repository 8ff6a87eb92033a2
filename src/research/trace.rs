//! Per-meeting research trace.
//!
//! A trace records what research did for one meeting using reason codes,
//! numeric signals and a salted query hash. It never carries the subject,
//! attendee addresses, domains, the anchor text or the query itself, so it is
//! safe to log and to show in dev builds.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::research::anchor::{AnchorSource, AnchorType};
use crate::research::guardrail::MismatchReason;

/// Hex characters kept from the salted query digest.
const QUERY_HASH_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchOutcome {
    Success,
    Skipped,
    /// Provider returned nothing usable on every attempt (transport failure
    /// or empty response).
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    EndpointGuard,
    Disabled,
    DevGuard,
    MeetingMarkedTest,
    NoAnchor,
    LowConfidenceAnchor,
    QuerySanitizedEmpty,
    BudgetExhausted,
    OffTargetResults,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::EndpointGuard => "endpoint_guard",
            SkipReason::Disabled => "disabled",
            SkipReason::DevGuard => "dev_guard",
            SkipReason::MeetingMarkedTest => "meeting_marked_test",
            SkipReason::NoAnchor => "no_anchor",
            SkipReason::LowConfidenceAnchor => "low_confidence_anchor",
            SkipReason::QuerySanitizedEmpty => "query_sanitized_empty",
            SkipReason::BudgetExhausted => "budget_exhausted",
            SkipReason::OffTargetResults => "off_target_results",
        }
    }
}

/// Millisecond timing breakdown for one meeting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceTimings {
    pub anchor_ms: u64,
    pub provider_ms: u64,
    pub guardrail_ms: u64,
    pub total_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchTrace {
    pub attempted: bool,
    pub outcome: ResearchOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<SkipReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_type: Option<AnchorType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_source: Option<AnchorSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_hash: Option<String>,
    pub query_len: usize,
    pub timings_ms: TraceTimings,
    pub sources_count: usize,
    pub domain_match_passed: bool,
    pub entity_match_passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mismatch_reason: Option<MismatchReason>,
    pub retry_used: bool,
    pub cache_hit: bool,
}

impl ResearchTrace {
    /// Trace for a meeting research never touched (request gate closed).
    pub fn not_attempted(reason: SkipReason) -> Self {
        Self {
            attempted: false,
            outcome: ResearchOutcome::Skipped,
            skip_reason: Some(reason),
            anchor_type: None,
            anchor_source: None,
            confidence: None,
            query_hash: None,
            query_len: 0,
            timings_ms: TraceTimings::default(),
            sources_count: 0,
            domain_match_passed: false,
            entity_match_passed: false,
            mismatch_reason: None,
            retry_used: false,
            cache_hit: false,
        }
    }

    /// Log one `RESEARCH_RESULT` line. Attempted meetings only.
    pub fn log_result(&self) {
        if !self.attempted {
            return;
        }
        log::info!(
            "RESEARCH_RESULT outcome={} skip_reason={} anchor_type={} anchor_source={} \
             confidence={} query_hash={} query_len={} anchor_ms={} provider_ms={} \
             guardrail_ms={} total_ms={} sources={} domain_match={} entity_match={} \
             mismatch={} retry_used={} cache_hit={}",
            self.outcome_str(),
            self.skip_reason.map(|r| r.as_str()).unwrap_or("-"),
            self.anchor_type.map(|t| t.as_str()).unwrap_or("-"),
            self.anchor_source.map(|s| s.as_str()).unwrap_or("-"),
            self.confidence
                .map(|c| format!("{:.4}", c))
                .unwrap_or_else(|| "-".to_string()),
            self.query_hash.as_deref().unwrap_or("-"),
            self.query_len,
            self.timings_ms.anchor_ms,
            self.timings_ms.provider_ms,
            self.timings_ms.guardrail_ms,
            self.timings_ms.total_ms,
            self.sources_count,
            self.domain_match_passed,
            self.entity_match_passed,
            self.mismatch_reason.map(|m| m.as_str()).unwrap_or("-"),
            self.retry_used,
            self.cache_hit,
        );
    }

    fn outcome_str(&self) -> &'static str {
        match self.outcome {
            ResearchOutcome::Success => "success",
            ResearchOutcome::Skipped => "skipped",
            ResearchOutcome::Error => "error",
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Accumulates trace fields while one meeting moves through the pipeline.
/// `finish` consumes the builder, so a trace cannot change once built.
pub struct TraceBuilder {
    started: Instant,
    trace: ResearchTrace,
}

impl TraceBuilder {
    pub fn start() -> Self {
        let mut trace = ResearchTrace::not_attempted(SkipReason::NoAnchor);
        trace.attempted = true;
        trace.skip_reason = None;
        Self {
            started: Instant::now(),
            trace,
        }
    }

    pub fn anchor(&mut self, anchor_type: AnchorType, anchor_source: AnchorSource) -> &mut Self {
        self.trace.anchor_type = Some(anchor_type);
        self.trace.anchor_source = Some(anchor_source);
        self
    }

    pub fn confidence(&mut self, confidence: f64) -> &mut Self {
        self.trace.confidence = Some(round4(confidence));
        self
    }

    /// Record the hash and length of the sanitized query (never the text).
    pub fn query(&mut self, salt: &str, sanitized_query: &str) -> &mut Self {
        self.trace.query_hash = Some(query_hash(salt, sanitized_query));
        self.trace.query_len = sanitized_query.chars().count();
        self
    }

    pub fn anchor_ms(&mut self, ms: u64) -> &mut Self {
        self.trace.timings_ms.anchor_ms = ms;
        self
    }

    pub fn add_provider_ms(&mut self, ms: u64) -> &mut Self {
        self.trace.timings_ms.provider_ms += ms;
        self
    }

    pub fn add_guardrail_ms(&mut self, ms: u64) -> &mut Self {
        self.trace.timings_ms.guardrail_ms += ms;
        self
    }

    pub fn cache_hit(&mut self) -> &mut Self {
        self.trace.cache_hit = true;
        self
    }

    pub fn retry_used(&mut self) -> &mut Self {
        self.trace.retry_used = true;
        self
    }

    /// Record the guardrail verdict of the latest attempt.
    pub fn verdict(
        &mut self,
        sources_count: usize,
        domain_match_passed: bool,
        entity_match_passed: bool,
        mismatch_reason: Option<MismatchReason>,
    ) -> &mut Self {
        self.trace.sources_count = sources_count;
        self.trace.domain_match_passed = domain_match_passed;
        self.trace.entity_match_passed = entity_match_passed;
        self.trace.mismatch_reason = mismatch_reason;
        self
    }

    pub fn success(self) -> ResearchTrace {
        self.finish(ResearchOutcome::Success, None)
    }

    pub fn skipped(self, reason: SkipReason) -> ResearchTrace {
        self.finish(ResearchOutcome::Skipped, Some(reason))
    }

    pub fn error(self, reason: SkipReason) -> ResearchTrace {
        self.finish(ResearchOutcome::Error, Some(reason))
    }

    fn finish(mut self, outcome: ResearchOutcome, reason: Option<SkipReason>) -> ResearchTrace {
        self.trace.outcome = outcome;
        self.trace.skip_reason = reason;
        self.trace.timings_ms.total_ms = self.started.elapsed().as_millis() as u64;
        self.trace
    }
}

/// First ten hex characters of `sha256(salt + query)`.
pub fn query_hash(salt: &str, query: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(query.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..QUERY_HASH_LEN].to_string()
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_hash_is_salted_and_truncated() {
        let query = "Acme Capital (organization, leadership, business, recent news)";
        let a = query_hash("salt-a", query);
        let b = query_hash("salt-b", query);
        assert_eq!(a.len(), 10);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b, "salt must change the hash");
        assert_eq!(a, query_hash("salt-a", query));
    }

    #[test]
    fn test_builder_records_signals_without_text() {
        let query = "Acme Capital (organization, leadership, business, recent news)";
        let mut builder = TraceBuilder::start();
        builder
            .anchor(AnchorType::Org, AnchorSource::SubjectOrg)
            .confidence(0.849_999_9)
            .query("salt", query)
            .add_provider_ms(12)
            .add_provider_ms(3)
            .verdict(2, true, true, None);
        let trace = builder.success();

        assert!(trace.attempted);
        assert_eq!(trace.outcome, ResearchOutcome::Success);
        assert_eq!(trace.skip_reason, None);
        assert_eq!(trace.confidence, Some(0.85));
        assert_eq!(trace.query_len, query.len());
        assert_eq!(trace.timings_ms.provider_ms, 15);

        let json = serde_json::to_string(&trace).expect("serialize");
        assert!(!json.contains("Acme"), "trace leaked anchor text: {}", json);
        assert!(json.contains("\"anchor_source\":\"subject_org\""));
    }

    #[test]
    fn test_not_attempted_trace() {
        let trace = ResearchTrace::not_attempted(SkipReason::DevGuard);
        assert!(!trace.attempted);
        assert_eq!(trace.outcome, ResearchOutcome::Skipped);
        let json = serde_json::to_value(&trace).expect("serialize");
        assert_eq!(json["skip_reason"], "dev_guard");
        assert!(json.get("query_hash").is_none());
    }

    #[test]
    fn test_skip_reason_codes_match_serde() {
        for reason in [
            SkipReason::EndpointGuard,
            SkipReason::Disabled,
            SkipReason::DevGuard,
            SkipReason::MeetingMarkedTest,
            SkipReason::NoAnchor,
            SkipReason::LowConfidenceAnchor,
            SkipReason::QuerySanitizedEmpty,
            SkipReason::BudgetExhausted,
            SkipReason::OffTargetResults,
        ] {
            let json = serde_json::to_value(reason).expect("serialize");
            assert_eq!(json, reason.as_str());
        }
    }
}
