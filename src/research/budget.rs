//! Request-scoped call budget and dedupe cache.
//!
//! Both live for exactly one digest-build request and are created fresh by
//! the orchestrator. Nothing here is global.

use std::collections::HashMap;

use crate::research::config::ResearchConfig;
use crate::types::ResearchResult;

/// Provider-call allowance for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchBudget {
    remaining: u32,
    hard_cap: u32,
    calls_made: u32,
}

impl ResearchBudget {
    pub fn new(budget: u32, hard_cap: u32) -> Self {
        Self {
            remaining: budget.min(hard_cap),
            hard_cap,
            calls_made: 0,
        }
    }

    pub fn from_config(config: &ResearchConfig) -> Self {
        Self::new(config.effective_budget(), config.effective_hard_cap())
    }

    /// Claim one primary call. False once the allotment or the hard cap is spent.
    pub fn try_consume(&mut self) -> bool {
        if self.remaining == 0 || self.calls_made >= self.hard_cap {
            return false;
        }
        self.remaining -= 1;
        self.calls_made += 1;
        true
    }

    /// Claim the single guardrail retry for a meeting. Counts against the
    /// hard cap and drains the allotment, but may run when the allotment is
    /// already spent.
    pub fn try_consume_retry(&mut self) -> bool {
        if self.calls_made >= self.hard_cap {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(1);
        self.calls_made += 1;
        true
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn calls_made(&self) -> u32 {
        self.calls_made
    }
}

/// A provider result and how long the call took.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub result: ResearchResult,
    pub latency_ms: u64,
}

/// Same-request results keyed by lower-cased sanitized query.
#[derive(Debug, Default)]
pub struct ResearchCache {
    entries: HashMap<String, CacheEntry>,
}

impl ResearchCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(query: &str) -> String {
        query.trim().to_lowercase()
    }

    pub fn get(&self, query: &str) -> Option<&CacheEntry> {
        self.entries.get(&Self::key(query))
    }

    pub fn insert(&mut self, query: &str, result: ResearchResult, latency_ms: u64) {
        self.entries
            .insert(Self::key(query), CacheEntry { result, latency_ms });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
