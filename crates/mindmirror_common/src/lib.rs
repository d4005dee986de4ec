//! Shared types and contracts for the MindMirror resolution engine.

pub mod capability;
pub mod error;
pub mod labels;
pub mod provider_spec;
pub mod result;
pub mod validate;

pub use capability::{context_keys, Capability, CapabilityRequest};
pub use error::{ChainExhausted, ProviderError};
pub use labels::normalize_emotion_label;
pub use provider_spec::{ProviderSpec, ProviderTask};
pub use result::{CapabilityResult, DegradationTier, Payload, PipelineResult, StageError};
pub use validate::{validate, Severity, Tone};
