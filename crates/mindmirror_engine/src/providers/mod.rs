//! Provider adapters.
//!
//! Adapters are transport shims only: build the request, map status codes
//! onto the error taxonomy, and decode raw bytes into a candidate payload.
//! Retry policy, validation, and tier tagging all live in the chain driver.

use async_trait::async_trait;
use mindmirror_common::{CapabilityRequest, Payload, ProviderError, ProviderSpec};
use std::time::Duration;

pub mod huggingface;
pub mod openrouter;
pub mod stub;

pub use huggingface::HuggingFaceProvider;
pub use openrouter::OpenRouterProvider;
pub use stub::StubProvider;

/// Minimal adapter interface consumed by the chain.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Static configuration for this provider.
    fn spec(&self) -> &ProviderSpec;

    /// Perform one transport call, bounded by `timeout`.
    async fn call(
        &self,
        request: &CapabilityRequest,
        timeout: Duration,
    ) -> Result<Vec<u8>, ProviderError>;

    /// Decode a raw response body into a candidate payload.
    fn decode(&self, request: &CapabilityRequest, raw: &[u8]) -> Result<Payload, ProviderError>;
}

/// Map an HTTP status + body onto the failure taxonomy.
pub(crate) fn error_for_status(status: reqwest::StatusCode, body: &str) -> ProviderError {
    let detail = format!("HTTP {}: {}", status.as_u16(), truncate(body, 200));
    if status.as_u16() == 429 || status.is_server_error() {
        // Rate limits and 5xx ("model loading" included) are worth a retry.
        ProviderError::Transient(detail)
    } else {
        ProviderError::Hard(detail)
    }
}

/// Map a reqwest transport error onto the failure taxonomy.
pub(crate) fn error_for_transport(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() || err.is_connect() {
        ProviderError::Transient(err.to_string())
    } else {
        ProviderError::Hard(err.to_string())
    }
}

/// Extract the outermost JSON object from text that may carry prose
/// around it. Returns the input unchanged when no braces are found.
pub(crate) fn extract_json(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

/// Parse text into a JSON object payload, tolerating surrounding prose.
pub(crate) fn parse_object_payload(text: &str) -> Result<Payload, ProviderError> {
    serde_json::from_str::<serde_json::Value>(extract_json(text))
        .ok()
        .and_then(|v| v.as_object().cloned())
        .ok_or_else(|| {
            ProviderError::InvalidResponse(format!(
                "response is not a JSON object: {}",
                truncate(text, 120)
            ))
        })
}

pub(crate) fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let too_many = reqwest::StatusCode::TOO_MANY_REQUESTS;
        assert!(error_for_status(too_many, "slow down").is_transient());

        let unavailable = reqwest::StatusCode::SERVICE_UNAVAILABLE;
        assert!(error_for_status(unavailable, "model loading").is_transient());

        let unauthorized = reqwest::StatusCode::UNAUTHORIZED;
        assert!(!error_for_status(unauthorized, "bad token").is_transient());
    }

    #[test]
    fn test_extract_json_strips_prose() {
        let wrapped = "Sure! Here you go:\n{\"a\": 1}\nHope that helps.";
        assert_eq!(extract_json(wrapped), "{\"a\": 1}");
        assert_eq!(extract_json("no json here"), "no json here");
    }

    #[test]
    fn test_parse_object_payload() {
        let payload = parse_object_payload("prefix {\"text\": \"hi\"} suffix").unwrap();
        assert_eq!(payload.get("text").unwrap().as_str().unwrap(), "hi");

        let err = parse_object_payload("[1, 2, 3]").unwrap_err();
        assert_eq!(err.code(), "invalid_response");
    }
}
