//! Static provider configuration.
//!
//! One ordered list per capability, built at process start and read-only
//! afterward. Priority order is fixed configuration, never reordered at
//! runtime.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request/decoder shape for a provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderTask {
    /// Emotion classification (list of label/score pairs).
    TextClassification,
    /// Prompted text generation that must yield a JSON object.
    TextGeneration,
    /// OpenAI-style chat completion that must yield a JSON object.
    ChatCompletion,
    TextToImage,
    AutomaticSpeechRecognition,
    TextToSpeech,
}

/// Configuration entry for one provider in a chain.
#[derive(Debug, Clone)]
pub struct ProviderSpec {
    /// Opaque model/service id (e.g. "openai/whisper-tiny").
    pub id: String,
    /// Lower is tried first.
    pub priority: u32,
    /// Deadline for a single call attempt.
    pub call_timeout: Duration,
    /// Ceiling for the whole attempt sequence (call + backoff + retry).
    pub total_budget: Duration,
    /// Whether a transient failure earns exactly one retry.
    pub retryable: bool,
    /// Full endpoint URL, supplied by the host.
    pub endpoint: String,
    /// Bearer token, if the service wants one.
    pub api_token: Option<String>,
    pub task: ProviderTask,
}

impl ProviderSpec {
    pub fn new(id: impl Into<String>, priority: u32, task: ProviderTask) -> Self {
        let call_timeout = Duration::from_secs(12);
        Self {
            id: id.into(),
            priority,
            call_timeout,
            total_budget: default_total_budget(call_timeout),
            retryable: true,
            endpoint: String::new(),
            api_token: None,
            task,
        }
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self.total_budget = default_total_budget(timeout);
        self
    }

    pub fn with_total_budget(mut self, budget: Duration) -> Self {
        self.total_budget = budget;
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_api_token(mut self, token: Option<String>) -> Self {
        self.api_token = token;
        self
    }
}

/// Call timeout doubled (retry) plus margin for the backoff sleep.
fn default_total_budget(call_timeout: Duration) -> Duration {
    call_timeout * 2 + Duration::from_secs(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_builder() {
        let spec = ProviderSpec::new("test/model", 0, ProviderTask::TextClassification)
            .with_call_timeout(Duration::from_secs(10))
            .with_retryable(false)
            .with_endpoint("https://example.test/models/test");

        assert_eq!(spec.id, "test/model");
        assert_eq!(spec.call_timeout, Duration::from_secs(10));
        assert_eq!(spec.total_budget, Duration::from_secs(23));
        assert!(!spec.retryable);
    }

    #[test]
    fn test_total_budget_override() {
        let spec = ProviderSpec::new("x", 1, ProviderTask::TextToImage)
            .with_call_timeout(Duration::from_secs(45))
            .with_total_budget(Duration::from_secs(50));
        assert_eq!(spec.total_budget, Duration::from_secs(50));
    }
}
