//! Error taxonomy for provider resolution.
//!
//! All of these stay contained: provider errors never escape the chain,
//! chain exhaustion never escapes a resolver. The only externally visible
//! failure signal is `PipelineResult::errors`.

use crate::capability::Capability;
use thiserror::Error;

/// Failure of a single provider attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Retryable within an attempt: rate limit, model loading, network timeout.
    #[error("transient: {0}")]
    Transient(String),

    /// Non-retryable: bad credentials, 4xx other than 429.
    #[error("hard: {0}")]
    Hard(String),

    /// Body could not be parsed into a payload, or the payload failed the
    /// capability's required-field contract. One shared failure code.
    #[error("invalid_response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Transient(_))
    }

    /// Stable failure code for logs.
    pub fn code(&self) -> &'static str {
        match self {
            ProviderError::Transient(_) => "transient",
            ProviderError::Hard(_) => "hard",
            ProviderError::InvalidResponse(_) => "invalid_response",
        }
    }
}

/// Every provider in a chain failed. Returned as a value, never raised
/// past the resolver that owns the chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("provider chain exhausted for {capability} after {attempts} providers")]
pub struct ChainExhausted {
    pub capability: Capability,
    /// Number of providers tried (not counting per-provider retries).
    pub attempts: usize,
}
