use thiserror::Error;

use super::interface::{ProviderAttempt, ServiceKind};

pub const MISSING_FIELDS: &str = "Missing required fields: text, targetLang";

/// Failure of a single provider attempt
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0}: API key missing")]
    MissingCredentials(ServiceKind),

    #[error("{0}: invalid API key")]
    InvalidCredentials(ServiceKind),

    #[error("{0}: character quota exceeded")]
    QuotaExceeded(ServiceKind),

    #[error("{0}: rate limit reached")]
    RateLimited(ServiceKind),

    #[error("{service} HTTP {status}")]
    ProviderHttp { service: ServiceKind, status: u16 },

    #[error("{service}: malformed response: {reason}")]
    MalformedResponse { service: ServiceKind, reason: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Errors returned by the fallback coordinator
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("{0}")]
    InvalidRequest(String),

    /// Every provider failed; `last_error` is the reason given by the last one
    #[error("All translation services are temporarily unavailable")]
    AllProvidersExhausted {
        last_error: String,
        attempts: Vec<ProviderAttempt>,
    },
}
