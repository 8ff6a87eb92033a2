//! One digest-build research pass.
//!
//! `enrich_meetings` is the only entry point. It owns the request-scoped
//! budget and dedupe cache, walks meetings strictly in order, and never
//! fails: every meeting comes back with a trace.

use std::time::Instant;

use serde::Serialize;

use crate::research::anchor::{resolve_anchor, MeetingContext};
use crate::research::budget::{ResearchBudget, ResearchCache};
use crate::research::confidence::is_meeting_like_test;
use crate::research::config::{GateDecision, ResearchConfig};
use crate::research::enrich::populate;
use crate::research::guardrail::{retry_query, validate, GuardrailAttempt, GuardrailVerdict};
use crate::research::provider::ResearchProvider;
use crate::research::query::{choose_query, QueryCandidate, QueryChoice};
use crate::research::trace::{ResearchTrace, SkipReason, TraceBuilder};
use crate::types::{EnrichedMeeting, Meeting, MeetingResearch, ResearchResult};

/// Call-site permissions for one request.
#[derive(Debug, Clone, Default)]
pub struct ResearchRequest<'a> {
    /// The executive's own address. Its domain is internal.
    pub mailbox: Option<&'a str>,
    /// Only digest preview / run / send paths pass true.
    pub allow_research: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestResearch {
    pub meetings: Vec<EnrichedMeeting>,
    pub provider_calls: u32,
    /// False when a request-level gate kept research from running.
    pub research_computed: bool,
}

impl DigestResearch {
    /// Traces with their meeting index, in meeting order.
    pub fn traces(&self) -> impl Iterator<Item = (usize, &ResearchTrace)> {
        self.meetings
            .iter()
            .enumerate()
            .filter_map(|(i, m)| m.research_trace.as_ref().map(|t| (i, t)))
    }

    /// Production rendering never shows traces.
    pub fn for_production(mut self) -> Self {
        for meeting in &mut self.meetings {
            meeting.research_trace = None;
        }
        self
    }
}

/// Run research for every meeting of one digest build.
pub fn enrich_meetings(
    meetings: &[Meeting],
    request: &ResearchRequest,
    config: &ResearchConfig,
    provider: &dyn ResearchProvider,
) -> DigestResearch {
    if let GateDecision::Skip(reason) = config.gate(request.allow_research) {
        log::debug!("Research not run for this request: {}", reason.as_str());
        return DigestResearch {
            meetings: meetings
                .iter()
                .map(|m| EnrichedMeeting {
                    meeting: m.clone(),
                    research: MeetingResearch::default(),
                    research_trace: Some(ResearchTrace::not_attempted(reason)),
                })
                .collect(),
            provider_calls: 0,
            research_computed: false,
        };
    }

    let mut pass = ResearchPass {
        config,
        provider,
        mailbox: request.mailbox,
        budget: ResearchBudget::from_config(config),
        cache: ResearchCache::new(),
    };

    let mut enriched = Vec::with_capacity(meetings.len());
    for meeting in meetings {
        let (research, trace) = pass.research_meeting(meeting);
        trace.log_result();
        enriched.push(EnrichedMeeting {
            meeting: meeting.clone(),
            research,
            research_trace: Some(trace),
        });
    }

    let populated = enriched.iter().filter(|m| m.research.is_populated()).count();
    log::info!(
        "Research pass complete: {} meetings, {} enriched, {} provider calls",
        enriched.len(),
        populated,
        pass.budget.calls_made()
    );

    DigestResearch {
        meetings: enriched,
        provider_calls: pass.budget.calls_made(),
        research_computed: true,
    }
}

// =============================================================================
// Per-request state
// =============================================================================

struct ResearchPass<'a> {
    config: &'a ResearchConfig,
    provider: &'a dyn ResearchProvider,
    mailbox: Option<&'a str>,
    budget: ResearchBudget,
    cache: ResearchCache,
}

impl ResearchPass<'_> {
    fn research_meeting(&mut self, meeting: &Meeting) -> (MeetingResearch, ResearchTrace) {
        let mut trace = TraceBuilder::start();
        let anchor_started = Instant::now();

        if is_meeting_like_test(meeting, self.mailbox) {
            trace.anchor_ms(elapsed_ms(anchor_started));
            return skip(trace, SkipReason::MeetingMarkedTest);
        }

        let ctx = MeetingContext::new(meeting, self.mailbox, &self.config.internal_domains);
        let Some(anchor) = resolve_anchor(&ctx) else {
            trace.anchor_ms(elapsed_ms(anchor_started));
            let reason = if ctx.external_domains.is_empty() {
                SkipReason::NoAnchor
            } else {
                SkipReason::LowConfidenceAnchor
            };
            return skip(trace, reason);
        };
        trace.anchor(anchor.anchor_type, anchor.anchor_source);

        let candidate = match choose_query(&anchor, &ctx, self.config.confidence_min) {
            QueryChoice::Chosen(candidate) => candidate,
            QueryChoice::Skip { reason, best } => {
                if let Some(best) = best {
                    trace
                        .anchor(best.anchor_type, best.anchor_source)
                        .confidence(best.confidence);
                }
                trace.anchor_ms(elapsed_ms(anchor_started));
                return skip(trace, reason);
            }
        };
        trace
            .anchor(candidate.anchor_type, candidate.anchor_source)
            .confidence(candidate.confidence)
            .query(&self.config.trace_salt, &candidate.query)
            .anchor_ms(elapsed_ms(anchor_started));

        let Some(primary) = self.fetch(&candidate.query, false, &mut trace) else {
            return skip(trace, SkipReason::BudgetExhausted);
        };
        let verdict = self.check(&primary, &candidate, GuardrailAttempt::Primary, &mut trace);
        if verdict.accepted {
            return accept(&primary, &verdict, &candidate, trace);
        }

        let mut every_result_empty = primary.is_empty();
        if !candidate.primary_domain.is_empty() {
            let narrowed = retry_query(&candidate.query, &candidate.primary_domain);
            if let Some(retried) = self.fetch(&narrowed, true, &mut trace) {
                trace.retry_used();
                let verdict = self.check(&retried, &candidate, GuardrailAttempt::Retry, &mut trace);
                if verdict.accepted {
                    return accept(&retried, &verdict, &candidate, trace);
                }
                every_result_empty &= retried.is_empty();
            }
        }

        let trace = if every_result_empty {
            trace.error(SkipReason::OffTargetResults)
        } else {
            trace.skipped(SkipReason::OffTargetResults)
        };
        (MeetingResearch::default(), trace)
    }

    /// Cached result, or one new provider call if the budget allows it.
    fn fetch(
        &mut self,
        query: &str,
        retry: bool,
        trace: &mut TraceBuilder,
    ) -> Option<ResearchResult> {
        if let Some(entry) = self.cache.get(query) {
            log::debug!("Research cache hit, saved a {}ms provider call", entry.latency_ms);
            trace.cache_hit();
            return Some(entry.result.clone());
        }
        let claimed = if retry {
            self.budget.try_consume_retry()
        } else {
            self.budget.try_consume()
        };
        if !claimed {
            return None;
        }
        let started = Instant::now();
        let result = self.provider.get_research(query);
        let latency_ms = elapsed_ms(started);
        trace.add_provider_ms(latency_ms);
        self.cache.insert(query, result.clone(), latency_ms);
        Some(result)
    }

    fn check(
        &self,
        result: &ResearchResult,
        candidate: &QueryCandidate,
        attempt: GuardrailAttempt,
        trace: &mut TraceBuilder,
    ) -> GuardrailVerdict {
        let started = Instant::now();
        let verdict = validate(result, &candidate.primary_domain, attempt, self.config.max_sources);
        trace
            .add_guardrail_ms(elapsed_ms(started))
            .verdict(
                verdict.sources.len(),
                verdict.domain_match,
                verdict.entity_match,
                verdict.mismatch,
            );
        verdict
    }
}

fn accept(
    result: &ResearchResult,
    verdict: &GuardrailVerdict,
    candidate: &QueryCandidate,
    trace: TraceBuilder,
) -> (MeetingResearch, ResearchTrace) {
    let research = populate(result, &verdict.sources, candidate.anchor_type, &candidate.name);
    (research, trace.success())
}

fn skip(trace: TraceBuilder, reason: SkipReason) -> (MeetingResearch, ResearchTrace) {
    (MeetingResearch::default(), trace.skipped(reason))
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
