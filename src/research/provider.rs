//! Research providers.
//!
//! `ResearchProvider::get_research` never fails: transport, HTTP and parse
//! errors are logged by code and surface as an empty `ResearchResult`, which
//! the guardrail then rejects for lack of sources.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::ResearchError;
use crate::research::config::{
    ResearchConfig, MAX_KEYPOINT_CHARS, MAX_RESEARCH_KEYPOINTS, MAX_RESEARCH_SOURCES,
    MAX_RESEARCH_SUMMARY_CHARS,
};
use crate::types::{ResearchResult, ResearchSource};
use crate::util::truncate_chars;

const TAVILY_API_URL: &str = "https://api.tavily.com";
const TAVILY_MAX_RESULTS: usize = 5;

/// Snippet length used as a summary when the API returns no answer.
const SNIPPET_SUMMARY_CHARS: usize = 200;

/// Hosts whose pages are rarely about a business counterparty.
const LOW_QUALITY_HOSTS: &[&str] = &[
    "tripod.com",
    "blogspot.com",
    "livejournal.com",
    "tumblr.com",
    "pinterest.com",
];

const SUSPICIOUS_PATTERNS: &[&str] = &["people-search", "find out the truth"];

pub trait ResearchProvider {
    fn get_research(&self, query: &str) -> ResearchResult;
}

// =============================================================================
// Stub
// =============================================================================

/// Offline provider. Returns text but never sources, so nothing it says can
/// pass the guardrail and reach a meeting.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubResearchProvider;

impl ResearchProvider for StubResearchProvider {
    fn get_research(&self, _query: &str) -> ResearchResult {
        ResearchResult {
            summary: "Research provider not configured.".to_string(),
            key_points: vec!["Set TAVILY_API_KEY to enable live research.".to_string()],
            sources: Vec::new(),
        }
    }
}

// =============================================================================
// Tavily
// =============================================================================

/// Tavily endpoints. Only `Search` runs without `TAVILY_ALLOW_ADVANCED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOperation {
    Search,
    Extract,
    Map,
    Crawl,
}

impl SearchOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOperation::Search => "search",
            SearchOperation::Extract => "extract",
            SearchOperation::Map => "map",
            SearchOperation::Crawl => "crawl",
        }
    }

    pub fn is_advanced(&self) -> bool {
        !matches!(self, SearchOperation::Search)
    }
}

#[derive(Debug, Serialize)]
struct TavilySearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'a str,
    include_answer: bool,
    max_results: usize,
}

#[derive(Debug, Default, Deserialize)]
struct TavilySearchResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<TavilyHit>,
}

#[derive(Debug, Default, Deserialize)]
struct TavilyHit {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

pub struct TavilyResearchProvider {
    client: reqwest::blocking::Client,
    api_key: String,
    allow_advanced: bool,
    timeout_secs: u64,
}

impl TavilyResearchProvider {
    pub fn new(api_key: &str, config: &ResearchConfig) -> Result<Self, ResearchError> {
        if api_key.trim().is_empty() {
            return Err(ResearchError::MissingApiKey);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.provider_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.trim().to_string(),
            allow_advanced: config.allow_advanced,
            timeout_secs: config.provider_timeout_secs,
        })
    }

    fn check_operation(&self, op: SearchOperation) -> Result<(), ResearchError> {
        if op.is_advanced() && !self.allow_advanced {
            return Err(ResearchError::AdvancedOperationBlocked(op.as_str().to_string()));
        }
        Ok(())
    }

    /// One search request. No retries.
    fn search(&self, query: &str) -> Result<TavilySearchResponse, ResearchError> {
        self.check_operation(SearchOperation::Search)?;
        let body = TavilySearchRequest {
            api_key: &self.api_key,
            query,
            search_depth: "basic",
            include_answer: true,
            max_results: TAVILY_MAX_RESULTS,
        };
        let resp = self
            .client
            .post(format!("{}/{}", TAVILY_API_URL, SearchOperation::Search.as_str()))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    ResearchError::Timeout(self.timeout_secs)
                } else {
                    ResearchError::from(e)
                }
            })?;

        if !resp.status().is_success() {
            return Err(ResearchError::Http(format!("status {}", resp.status().as_u16())));
        }
        resp.json::<TavilySearchResponse>()
            .map_err(|e| ResearchError::Parse(e.to_string()))
    }
}

impl ResearchProvider for TavilyResearchProvider {
    fn get_research(&self, query: &str) -> ResearchResult {
        let start = Instant::now();
        match self.search(query) {
            Ok(resp) => shape_response(resp),
            Err(e) => {
                log::warn!(
                    "RESEARCH_FAILED error_type={} transient={} duration_ms={}",
                    e.error_type(),
                    e.is_transient(),
                    start.elapsed().as_millis()
                );
                ResearchResult::empty()
            }
        }
    }
}

// =============================================================================
// Response shaping
// =============================================================================

fn host_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
        .unwrap_or_default()
}

fn is_low_quality(hit_url: &str, title: &str) -> bool {
    let host = host_of(hit_url);
    if LOW_QUALITY_HOSTS
        .iter()
        .any(|h| host == *h || host.ends_with(&format!(".{}", h)))
    {
        return true;
    }
    let haystack = format!("{} {}", hit_url.to_lowercase(), title.to_lowercase());
    SUSPICIOUS_PATTERNS.iter().any(|p| haystack.contains(p))
}

fn url_key(url: &str) -> String {
    url.trim().to_lowercase().trim_end_matches('/').to_string()
}

fn shape_response(resp: TavilySearchResponse) -> ResearchResult {
    let mut sources: Vec<ResearchSource> = Vec::new();
    let mut first_snippet: Option<String> = None;
    let mut seen: Vec<String> = Vec::new();

    for hit in resp.results {
        let title = hit.title.unwrap_or_default().trim().to_string();
        let url = hit.url.unwrap_or_default().trim().to_string();
        if title.is_empty() || url.is_empty() || is_low_quality(&url, &title) {
            continue;
        }
        let key = url_key(&url);
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        if first_snippet.is_none() {
            first_snippet = hit
                .content
                .map(|c| truncate_chars(c.trim(), SNIPPET_SUMMARY_CHARS))
                .filter(|c| !c.is_empty());
        }
        sources.push(ResearchSource::new(&title, &url));
        if sources.len() >= MAX_RESEARCH_SOURCES {
            break;
        }
    }

    // Never a summary without sources to back it.
    let summary = if sources.is_empty() {
        String::new()
    } else {
        resp.answer
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .or(first_snippet)
            .map(|s| truncate_chars(&s, MAX_RESEARCH_SUMMARY_CHARS))
            .unwrap_or_default()
    };

    let key_points = sources
        .iter()
        .take(MAX_RESEARCH_KEYPOINTS)
        .map(|s| truncate_chars(&s.title, MAX_KEYPOINT_CHARS))
        .collect();

    ResearchResult {
        summary,
        key_points,
        sources,
    }
}

/// Tavily when research may run and a key is configured, the stub otherwise.
pub fn select_research_provider(
    config: &ResearchConfig,
    research_allowed: bool,
) -> Box<dyn ResearchProvider> {
    if research_allowed {
        if let Some(key) = config.tavily_api_key.as_deref() {
            match TavilyResearchProvider::new(key, config) {
                Ok(provider) => {
                    log::info!("Research provider: tavily");
                    return Box::new(provider);
                }
                Err(e) => {
                    log::warn!("Tavily provider unavailable ({}), using stub", e.error_type())
                }
            }
        }
    }
    log::info!("Research provider: stub");
    Box::new(StubResearchProvider)
}
