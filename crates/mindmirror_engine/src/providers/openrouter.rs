//! OpenRouter chat-completions adapter, used as the primary reflection
//! provider.

use crate::prompts;
use crate::providers::{
    error_for_status, error_for_transport, parse_object_payload, Provider,
};
use async_trait::async_trait;
use mindmirror_common::{CapabilityRequest, Payload, ProviderError, ProviderSpec};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

pub struct OpenRouterProvider {
    spec: ProviderSpec,
    client: reqwest::Client,
}

impl OpenRouterProvider {
    pub fn new(spec: ProviderSpec) -> Self {
        let client = reqwest::Client::builder()
            .timeout(spec.call_timeout)
            .build()
            .unwrap_or_default();
        Self { spec, client }
    }
}

#[async_trait]
impl Provider for OpenRouterProvider {
    fn spec(&self) -> &ProviderSpec {
        &self.spec
    }

    async fn call(
        &self,
        request: &CapabilityRequest,
        timeout: Duration,
    ) -> Result<Vec<u8>, ProviderError> {
        let token = self.spec.api_token.as_deref().ok_or_else(|| {
            ProviderError::Hard("OpenRouter API key not configured".to_string())
        })?;

        let body = json!({
            "model": self.spec.id,
            "messages": [
                {"role": "system", "content": prompts::REFLECTION_SYSTEM_PROMPT},
                {"role": "user", "content": prompts::build_reflection_prompt(request)},
            ],
            "temperature": 0.7,
            "max_tokens": 500,
        });

        debug!(provider = %self.spec.id, "calling OpenRouter");
        let response = self
            .client
            .post(format!("{}/chat/completions", self.spec.endpoint))
            .timeout(timeout)
            .header("Authorization", format!("Bearer {}", token))
            .header("HTTP-Referer", "https://mindmirror.ai")
            .header("X-Title", "MindMirror AI")
            .json(&body)
            .send()
            .await
            .map_err(error_for_transport)?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(error_for_transport)?
            .to_vec();
        if !status.is_success() {
            return Err(error_for_status(status, &String::from_utf8_lossy(&bytes)));
        }
        Ok(bytes)
    }

    fn decode(&self, _request: &CapabilityRequest, raw: &[u8]) -> Result<Payload, ProviderError> {
        let data: Value = serde_json::from_slice(raw)
            .map_err(|e| ProviderError::InvalidResponse(format!("bad JSON: {}", e)))?;

        let content = data
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| {
                ProviderError::InvalidResponse("no message content in response".to_string())
            })?;

        parse_object_payload(content)
    }
}
