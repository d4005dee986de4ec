//! Priority-ordered provider chain.
//!
//! Walks providers in fixed priority order with a declarative per-spec
//! retry policy: one retry after a constant backoff, only for transient
//! failures on retryable providers. Every failure is logged and contained;
//! exhaustion is returned as a value.

use crate::providers::Provider;
use mindmirror_common::{
    validate, Capability, CapabilityRequest, CapabilityResult, ChainExhausted, DegradationTier,
    Payload, ProviderError,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Constant backoff before the single retry. Not exponential: each provider
/// already runs under its own total budget ceiling.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(1);

pub struct ProviderChain {
    capability: Capability,
    providers: Vec<Arc<dyn Provider>>,
    retry_backoff: Duration,
}

impl ProviderChain {
    /// Build a chain. Providers are ordered by ascending priority here,
    /// once, and never reordered at runtime.
    pub fn new(capability: Capability, mut providers: Vec<Arc<dyn Provider>>) -> Self {
        providers.sort_by_key(|p| p.spec().priority);
        Self {
            capability,
            providers,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Walk the chain. The first provider whose payload passes validation
    /// wins: tier Primary for the first-priority provider, Fallback for any
    /// later one.
    pub async fn resolve(
        &self,
        request: &CapabilityRequest,
    ) -> Result<CapabilityResult, ChainExhausted> {
        for (index, provider) in self.providers.iter().enumerate() {
            let spec = provider.spec();
            let attempt = tokio::time::timeout(
                spec.total_budget,
                self.attempt(provider.as_ref(), request),
            );

            match attempt.await {
                Ok(Ok(payload)) => {
                    let tier = if index == 0 {
                        DegradationTier::Primary
                    } else {
                        DegradationTier::Fallback
                    };
                    info!(
                        capability = %self.capability,
                        provider = %spec.id,
                        %tier,
                        "provider resolved"
                    );
                    return Ok(CapabilityResult::new(payload, spec.id.clone(), tier));
                }
                Ok(Err(err)) => {
                    warn!(
                        capability = %self.capability,
                        provider = %spec.id,
                        code = err.code(),
                        "provider failed: {}",
                        err
                    );
                }
                Err(_) => {
                    warn!(
                        capability = %self.capability,
                        provider = %spec.id,
                        "provider exceeded total budget of {:?}",
                        spec.total_budget
                    );
                }
            }
        }

        Err(ChainExhausted {
            capability: self.capability,
            attempts: self.providers.len(),
        })
    }

    /// One provider's attempt sequence: call, and on a transient failure of
    /// a retryable provider, back off once and call again.
    async fn attempt(
        &self,
        provider: &dyn Provider,
        request: &CapabilityRequest,
    ) -> Result<Payload, ProviderError> {
        let spec = provider.spec();
        let first = self.call_validated(provider, request).await;

        match first {
            Err(ref err) if err.is_transient() && spec.retryable => {
                info!(
                    provider = %spec.id,
                    "transient failure, retrying once after {:?}",
                    self.retry_backoff
                );
                tokio::time::sleep(self.retry_backoff).await;
                self.call_validated(provider, request).await
            }
            other => other,
        }
    }

    async fn call_validated(
        &self,
        provider: &dyn Provider,
        request: &CapabilityRequest,
    ) -> Result<Payload, ProviderError> {
        let spec = provider.spec();
        let raw = tokio::time::timeout(spec.call_timeout, provider.call(request, spec.call_timeout))
            .await
            .map_err(|_| {
                ProviderError::Transient(format!("call timed out after {:?}", spec.call_timeout))
            })??;

        let payload = provider.decode(request, &raw)?;
        if !validate(self.capability, &payload) {
            return Err(ProviderError::InvalidResponse(
                "payload failed required-field contract".to_string(),
            ));
        }
        Ok(payload)
    }
}
