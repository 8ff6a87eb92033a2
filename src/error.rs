//! Error types for research enrichment
//!
//! Errors never escape the per-meeting pipeline. They are produced by the
//! provider and loaders, logged by `error_type()` code only, and mapped to
//! empty results or skip reasons by the caller:
//! - Transport: Http, Timeout
//! - Payload: Parse
//! - Policy: AdvancedOperationBlocked, MissingApiKey
//! - Local: Config, Io

use thiserror::Error;

/// Error types for research enrichment
#[derive(Debug, Error)]
pub enum ResearchError {
    // Transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Research request timed out after {0} seconds")]
    Timeout(u64),

    // Payload errors
    #[error("Failed to parse provider response: {0}")]
    Parse(String),

    // Policy errors
    #[error("Operation '{0}' requires TAVILY_ALLOW_ADVANCED")]
    AdvancedOperationBlocked(String),

    #[error("TAVILY_API_KEY not configured")]
    MissingApiKey,

    // Local errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl ResearchError {
    /// Stable code for logs. Never includes the message payload, which may
    /// echo a URL or query fragment.
    pub fn error_type(&self) -> &'static str {
        match self {
            ResearchError::Http(_) => "http_error",
            ResearchError::Timeout(_) => "timeout",
            ResearchError::Parse(_) => "parse_error",
            ResearchError::AdvancedOperationBlocked(_) => "advanced_operation_blocked",
            ResearchError::MissingApiKey => "missing_api_key",
            ResearchError::Config(_) => "config_error",
            ResearchError::Io(_) => "io_error",
        }
    }

    /// Returns true for transport failures. The provider still does not
    /// retry them; the flag only feeds diagnostics.
    pub fn is_transient(&self) -> bool {
        matches!(self, ResearchError::Http(_) | ResearchError::Timeout(_))
    }
}

impl From<std::io::Error> for ResearchError {
    fn from(err: std::io::Error) -> Self {
        ResearchError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for ResearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ResearchError::Timeout(crate::research::config::PROVIDER_TIMEOUT_SECS)
        } else if err.is_decode() {
            ResearchError::Parse(err.to_string())
        } else {
            ResearchError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ResearchError {
    fn from(err: serde_json::Error) -> Self {
        ResearchError::Parse(err.to_string())
    }
}
