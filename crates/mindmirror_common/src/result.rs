//! Canonical resolution outputs.

use crate::capability::Capability;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Capability-shaped response fields.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Which resolution strategy produced a result.
///
/// Ordered: Primary has the highest quality and lowest guaranteed
/// availability, Minimal the reverse.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DegradationTier {
    /// First-priority provider answered.
    Primary,
    /// A lower-priority provider answered.
    Fallback,
    /// Rule-based local generator, no network.
    Local,
    /// Hardcoded safe response, unconditionally available.
    Minimal,
}

impl DegradationTier {
    pub fn is_degraded(self) -> bool {
        self != DegradationTier::Primary
    }
}

impl fmt::Display for DegradationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradationTier::Primary => write!(f, "primary"),
            DegradationTier::Fallback => write!(f, "fallback"),
            DegradationTier::Local => write!(f, "local"),
            DegradationTier::Minimal => write!(f, "minimal"),
        }
    }
}

/// One resolved capability output. Always satisfies the capability's
/// required-field contract by the time a caller sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityResult {
    pub payload: Payload,
    /// Id of the model/service that produced the payload, or a local
    /// generator id ("template", "procedural_svg", "none").
    pub model_used: String,
    pub tier: DegradationTier,
    #[serde(default)]
    pub from_cache: bool,
    pub produced_at: DateTime<Utc>,
}

impl CapabilityResult {
    pub fn new(payload: Payload, model_used: impl Into<String>, tier: DegradationTier) -> Self {
        Self {
            payload,
            model_used: model_used.into(),
            tier,
            from_cache: false,
            produced_at: Utc::now(),
        }
    }

    /// Convenience accessor for a string payload field.
    pub fn text_field(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(|v| v.as_str())
    }
}

/// Per-stage failure note; descriptive, never an exception.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageError {
    pub capability: Capability,
    pub message: String,
}

impl StageError {
    pub fn new(capability: Capability, message: impl Into<String>) -> Self {
        Self {
            capability,
            message: message.into(),
        }
    }

    /// The stage never started because the caller's budget ran out.
    pub fn deadline_exceeded(capability: Capability) -> Self {
        Self::new(capability, "deadline exceeded before stage started")
    }
}

/// Aggregate of one end-to-end pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub results: BTreeMap<Capability, CapabilityResult>,
    /// True when any constituent resolution used a tier below Primary.
    pub fallback_used: bool,
    /// Notes for stages that degraded or were skipped.
    pub errors: Vec<StageError>,
    pub processing_ms: u64,
}

impl PipelineResult {
    pub fn get(&self, capability: Capability) -> Option<&CapabilityResult> {
        self.results.get(&capability)
    }

    /// Model ids per capability, mirroring the per-stage attribution the
    /// host surfaces to users.
    pub fn model_versions(&self) -> BTreeMap<Capability, String> {
        self.results
            .iter()
            .map(|(cap, res)| (*cap, res.model_used.clone()))
            .collect()
    }
}
