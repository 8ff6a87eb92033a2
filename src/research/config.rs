//! Research configuration: safety caps, gating flags, per-request budget size.
//!
//! Every knob the pipeline reads lives on `ResearchConfig`, which is built once
//! per process (defaults → `~/.daybrief/research.json` → environment) and passed
//! into the orchestrator. Nothing below reads the environment after load.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ResearchError;
use crate::research::trace::SkipReason;

/// Absolute ceiling on provider calls per request, regardless of configuration.
pub const ABSOLUTE_CALL_CEILING: u32 = 8;

/// Default number of new provider calls per request.
pub const DEFAULT_CALL_BUDGET: u32 = 1;

/// Default minimum anchor confidence.
pub const DEFAULT_CONFIDENCE_MIN: f64 = 0.70;

/// Provider HTTP timeout. No transport retries.
pub const PROVIDER_TIMEOUT_SECS: u64 = 10;

// Output caps
pub const MAX_RESEARCH_SOURCES: usize = 5;
pub const MAX_RESEARCH_SUMMARY_CHARS: usize = 600;
pub const MAX_RESEARCH_KEYPOINTS: usize = 6;
pub const MAX_KEYPOINT_CHARS: usize = 180;

// Query bounds after sanitization
pub const MAX_RESEARCH_QUERY_CHARS: usize = 120;
pub const MIN_RESEARCH_QUERY_CHARS: usize = 3;

const DEFAULT_TRACE_SALT: &str = "daybrief-research-trace";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResearchConfig {
    /// Master switch (`RESEARCH_ENABLED`).
    pub enabled: bool,
    /// Set in non-production environments unless `ENABLE_RESEARCH_DEV` is on.
    pub dev_guard: bool,
    /// Anchor confidence threshold, clamped to [0, 1].
    pub confidence_min: f64,
    /// New provider calls allowed per request.
    pub call_budget: u32,
    /// Hard cap on provider calls per request (never above 8).
    pub hard_call_cap: u32,
    /// Salt mixed into trace query hashes.
    pub trace_salt: String,
    /// Sources kept after dedupe.
    pub max_sources: usize,
    pub provider_timeout_secs: u64,
    /// Allow Tavily operations beyond basic search.
    pub allow_advanced: bool,
    /// The executive's own domains; never research anchors.
    pub internal_domains: Vec<String>,
    #[serde(skip)]
    pub tavily_api_key: Option<String>,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dev_guard: true,
            confidence_min: DEFAULT_CONFIDENCE_MIN,
            call_budget: DEFAULT_CALL_BUDGET,
            hard_call_cap: ABSOLUTE_CALL_CEILING,
            trace_salt: DEFAULT_TRACE_SALT.to_string(),
            max_sources: MAX_RESEARCH_SOURCES,
            provider_timeout_secs: PROVIDER_TIMEOUT_SECS,
            allow_advanced: false,
            internal_domains: Vec::new(),
            tavily_api_key: None,
        }
    }
}

/// Outcome of the request-level research gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allowed,
    Skip(SkipReason),
}

impl ResearchConfig {
    /// Load from the default config file (if present) and the process environment.
    pub fn load() -> Result<Self, ResearchError> {
        let path = default_config_path();
        Self::load_from(path.as_deref(), |key| std::env::var(key).ok())
    }

    /// Load from an optional JSON file, then apply overrides from `lookup`.
    pub fn load_from<F>(path: Option<&Path>, lookup: F) -> Result<Self, ResearchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(p) if p.exists() => {
                let content = fs::read_to_string(p)?;
                serde_json::from_str::<ResearchConfig>(&content).map_err(|e| {
                    ResearchError::Config(format!("Failed to parse {}: {}", p.display(), e))
                })?
            }
            _ => ResearchConfig::default(),
        };
        config.apply_env(lookup);
        config.normalize();
        Ok(config)
    }

    /// Environment-only configuration (defaults plus `lookup` overrides).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ResearchConfig::default();
        config.apply_env(lookup);
        config.normalize();
        config
    }

    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(raw) = get("RESEARCH_ENABLED") {
            self.enabled = is_truthy(&raw);
        }

        let app_env = get("APP_ENV")
            .or_else(|| get("ENVIRONMENT"))
            .unwrap_or_else(|| "development".to_string())
            .to_lowercase();
        let dev_enabled = get("ENABLE_RESEARCH_DEV").is_some_and(|v| is_truthy(&v));
        self.dev_guard = app_env == "development" && !dev_enabled;

        if let Some(raw) = get("RESEARCH_CONFIDENCE_MIN") {
            self.confidence_min = parse_confidence_min(&raw);
        }
        if let Some(raw) = get("RESEARCH_CALL_BUDGET") {
            match raw.parse::<u32>() {
                Ok(n) => self.call_budget = n,
                Err(_) => log::warn!("Ignoring unparsable RESEARCH_CALL_BUDGET"),
            }
        }
        if let Some(salt) = get("RESEARCH_TRACE_SALT") {
            self.trace_salt = salt;
        }
        if let Some(raw) = get("TAVILY_ALLOW_ADVANCED") {
            self.allow_advanced = is_truthy(&raw);
        }
        if let Some(raw) = get("RESEARCH_INTERNAL_DOMAINS") {
            self.internal_domains = raw
                .split(',')
                .map(|d| d.trim().to_lowercase())
                .filter(|d| !d.is_empty())
                .collect();
        }
        if let Some(key) = get("TAVILY_API_KEY") {
            self.tavily_api_key = Some(key);
        }
    }

    fn normalize(&mut self) {
        self.confidence_min = clamp_unit(self.confidence_min);
        self.hard_call_cap = self.hard_call_cap.min(ABSOLUTE_CALL_CEILING);
        if self.max_sources == 0 {
            self.max_sources = MAX_RESEARCH_SOURCES;
        }
        if self.provider_timeout_secs == 0 {
            self.provider_timeout_secs = PROVIDER_TIMEOUT_SECS;
        }
    }

    /// Hard cap actually enforced (configured cap, never above the ceiling).
    pub fn effective_hard_cap(&self) -> u32 {
        self.hard_call_cap.min(ABSOLUTE_CALL_CEILING)
    }

    /// Budget actually handed to a request: `min(call_budget, hard cap)`.
    pub fn effective_budget(&self) -> u32 {
        self.call_budget.min(self.effective_hard_cap())
    }

    /// Request-level gate. `allow_research` is the call site's own permission
    /// (only digest preview / run / send paths pass true).
    pub fn gate(&self, allow_research: bool) -> GateDecision {
        if !allow_research {
            return GateDecision::Skip(SkipReason::EndpointGuard);
        }
        if !self.enabled {
            return GateDecision::Skip(SkipReason::Disabled);
        }
        if self.dev_guard {
            return GateDecision::Skip(SkipReason::DevGuard);
        }
        GateDecision::Allowed
    }
}

/// `~/.daybrief/research.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".daybrief").join("research.json"))
}

/// True for "true", "1", "yes" (case-insensitive).
pub fn is_truthy(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

/// Parse a confidence threshold; unparsable input falls back to the default.
pub fn parse_confidence_min(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => clamp_unit(v),
        _ => DEFAULT_CONFIDENCE_MIN,
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        return DEFAULT_CONFIDENCE_MIN;
    }
    v.clamp(0.0, 1.0)
}
