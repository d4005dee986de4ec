//! Scriptable stub provider for tests.
//!
//! Counts calls so tests can assert how often a chain actually reached the
//! network layer (cache idempotence, urgency short-circuit, retry-once).

use crate::providers::Provider;
use async_trait::async_trait;
use mindmirror_common::{CapabilityRequest, Payload, ProviderError, ProviderSpec};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// What a stub call should do.
#[derive(Debug, Clone)]
pub enum StubOutcome {
    /// Return this payload (serialized through the normal decode path).
    Payload(Payload),
    /// Return a body that fails to decode as a JSON object.
    Malformed,
    /// Fail the call with the given error.
    Fail(ProviderError),
    /// Sleep past any reasonable call timeout, then answer.
    Hang(Duration),
    /// Simulate an internal defect.
    Panic,
}

pub struct StubProvider {
    spec: ProviderSpec,
    script: Mutex<VecDeque<StubOutcome>>,
    default: StubOutcome,
    calls: AtomicUsize,
}

impl StubProvider {
    pub fn new(spec: ProviderSpec, default: StubOutcome) -> Self {
        Self {
            spec,
            script: Mutex::new(VecDeque::new()),
            default,
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue an outcome for the next call; once the script is drained the
    /// default outcome applies.
    pub fn push_outcome(&self, outcome: StubOutcome) {
        self.script.lock().expect("stub lock poisoned").push_back(outcome);
    }

    /// Number of transport calls made against this provider.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_outcome(&self) -> StubOutcome {
        self.script
            .lock()
            .expect("stub lock poisoned")
            .pop_front()
            .unwrap_or_else(|| self.default.clone())
    }
}

#[async_trait]
impl Provider for StubProvider {
    fn spec(&self) -> &ProviderSpec {
        &self.spec
    }

    async fn call(
        &self,
        _request: &CapabilityRequest,
        _timeout: Duration,
    ) -> Result<Vec<u8>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.next_outcome() {
            StubOutcome::Payload(payload) => Ok(serde_json::to_vec(&payload)
                .expect("stub payload serializes")),
            StubOutcome::Malformed => Ok(b"not a json object".to_vec()),
            StubOutcome::Fail(err) => Err(err),
            StubOutcome::Hang(duration) => {
                tokio::time::sleep(duration).await;
                Ok(b"{}".to_vec())
            }
            StubOutcome::Panic => panic!("stub provider forced panic"),
        }
    }

    fn decode(&self, _request: &CapabilityRequest, raw: &[u8]) -> Result<Payload, ProviderError> {
        serde_json::from_slice::<serde_json::Value>(raw)
            .ok()
            .and_then(|v| v.as_object().cloned())
            .ok_or_else(|| ProviderError::InvalidResponse("stub body is not JSON".to_string()))
    }
}
