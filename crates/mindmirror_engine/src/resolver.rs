//! Capability resolver: the five-rung degradation ladder.
//!
//! cache -> safety short-circuit -> provider chain -> local fallback ->
//! minimal safe response. `resolve` is a total function: every call returns
//! a contract-valid `CapabilityResult`, never an error.

use crate::cache::{ttl_for, ResponseCache};
use crate::chain::ProviderChain;
use crate::fallback::{local_model_id, minimal_payload, LocalFallback, MINIMAL_MODEL};
use crate::safety::{SafetyInterceptor, Urgency};
use mindmirror_common::{Capability, CapabilityRequest, CapabilityResult, DegradationTier};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct CapabilityResolver {
    capability: Capability,
    chain: ProviderChain,
    cache: Arc<ResponseCache>,
    safety: Arc<SafetyInterceptor>,
    fallback: LocalFallback,
}

impl CapabilityResolver {
    pub fn new(
        capability: Capability,
        chain: ProviderChain,
        cache: Arc<ResponseCache>,
        safety: Arc<SafetyInterceptor>,
    ) -> Self {
        Self {
            capability,
            chain,
            cache,
            safety,
            fallback: LocalFallback::new(),
        }
    }

    /// Swap in a seeded fallback generator (deterministic tests).
    pub fn with_fallback(mut self, fallback: LocalFallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Resolve a request. Never fails; degradation is reported through the
    /// result's tier.
    pub async fn resolve(&self, request: &CapabilityRequest) -> CapabilityResult {
        debug_assert_eq!(request.capability, self.capability);

        let key =
            ResponseCache::cache_key(self.capability, &request.raw_input, &request.context);
        if let Some(mut hit) = self.cache.get(&key) {
            info!(capability = %self.capability, "cache hit");
            hit.from_cache = true;
            return hit;
        }

        // Blank input: nothing for a provider to work with.
        if request.raw_input.trim().is_empty() {
            return self.minimal_result(request);
        }

        if self.capability.is_safety_sensitive()
            && self.safety.classify(&request.raw_input) == Urgency::Urgent
        {
            warn!(
                capability = %self.capability,
                "urgent input detected, skipping all remote providers"
            );
            let result = self.minimal_result(request);
            self.cache
                .put(key, result.clone(), ttl_for(self.capability, result.tier));
            return result;
        }

        match self.chain.resolve(request).await {
            Ok(result) => {
                self.cache
                    .put(key, result.clone(), ttl_for(self.capability, result.tier));
                result
            }
            Err(exhausted) => {
                warn!("{}; using local fallback", exhausted);
                self.local_result(request, &key)
            }
        }
    }

    /// Local deterministic fallback with unconditional defect containment:
    /// if the generator itself errors or panics, fall through to the
    /// minimal tier without caching (an internal fault should be retried
    /// fresh next time).
    fn local_result(&self, request: &CapabilityRequest, key: &str) -> CapabilityResult {
        match catch_unwind(AssertUnwindSafe(|| self.fallback.generate(request))) {
            Ok(Ok(payload)) => {
                let result = CapabilityResult::new(
                    payload,
                    local_model_id(self.capability),
                    DegradationTier::Local,
                );
                self.cache.put(
                    key.to_string(),
                    result.clone(),
                    ttl_for(self.capability, DegradationTier::Local),
                );
                result
            }
            Ok(Err(err)) => {
                error!(capability = %self.capability, "local fallback failed: {}", err);
                self.minimal_result(request)
            }
            Err(_) => {
                error!(capability = %self.capability, "local fallback panicked");
                self.minimal_result(request)
            }
        }
    }

    /// Hardcoded Minimal-tier response. Synchronous, no network, never
    /// fails; also used by the orchestrator for deadline-skipped stages.
    pub fn minimal_result(&self, request: &CapabilityRequest) -> CapabilityResult {
        CapabilityResult::new(
            minimal_payload(self.capability, &request.raw_input),
            MINIMAL_MODEL,
            DegradationTier::Minimal,
        )
    }
}
