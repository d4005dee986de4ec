//! Capabilities and the immutable per-submission request value.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Well-known context keys passed between pipeline stages.
pub mod context_keys {
    /// Dominant emotion label from the Emotion stage.
    pub const PRIMARY_EMOTION: &str = "primary_emotion";
    /// Set to "urgent" when the safety interceptor flags the input.
    pub const URGENCY: &str = "urgency";
    /// Caller-supplied locale hint (e.g. "en").
    pub const LANGUAGE: &str = "language";
    /// Caller-supplied sensitivity hint.
    pub const SENSITIVITY: &str = "sensitivity";
}

/// One AI-backed function the engine can resolve.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Emotion,
    Reflection,
    Art,
    Transcription,
    Speech,
}

impl Capability {
    /// All capabilities in pipeline order.
    pub const ALL: [Capability; 5] = [
        Capability::Emotion,
        Capability::Reflection,
        Capability::Art,
        Capability::Transcription,
        Capability::Speech,
    ];

    /// Whether the safety interceptor may short-circuit this capability.
    pub fn is_safety_sensitive(self) -> bool {
        matches!(self, Capability::Reflection)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Emotion => write!(f, "emotion"),
            Capability::Reflection => write!(f, "reflection"),
            Capability::Art => write!(f, "art"),
            Capability::Transcription => write!(f, "transcription"),
            Capability::Speech => write!(f, "speech"),
        }
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "emotion" => Ok(Capability::Emotion),
            "reflection" => Ok(Capability::Reflection),
            "art" => Ok(Capability::Art),
            "transcription" => Ok(Capability::Transcription),
            "speech" | "tts" => Ok(Capability::Speech),
            other => Err(format!("unknown capability: {}", other)),
        }
    }
}

/// Immutable value describing one resolution request.
///
/// Created per incoming user submission and never mutated; stages derive
/// new requests instead of editing old ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityRequest {
    /// Free-form user text, or base64 audio for Transcription.
    pub raw_input: String,
    pub capability: Capability,
    /// Ordered so derived cache keys are stable.
    pub context: BTreeMap<String, String>,
}

impl CapabilityRequest {
    pub fn new(raw_input: impl Into<String>, capability: Capability) -> Self {
        Self {
            raw_input: raw_input.into(),
            capability,
            context: BTreeMap::new(),
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn with_context_map(mut self, context: BTreeMap<String, String>) -> Self {
        self.context = context;
        self
    }

    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context.get(key).map(|v| v.as_str())
    }

    /// Dominant emotion propagated from an earlier stage, if any.
    pub fn primary_emotion(&self) -> &str {
        self.context_value(context_keys::PRIMARY_EMOTION)
            .unwrap_or("neutral")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_display_roundtrip() {
        for cap in Capability::ALL {
            let parsed: Capability = cap.to_string().parse().unwrap();
            assert_eq!(parsed, cap);
        }
    }

    #[test]
    fn test_capability_parse_aliases() {
        assert_eq!("TTS".parse::<Capability>().unwrap(), Capability::Speech);
        assert!(" Emotion ".parse::<Capability>().is_ok());
        assert!("poetry".parse::<Capability>().is_err());
    }

    #[test]
    fn test_only_reflection_is_safety_sensitive() {
        assert!(Capability::Reflection.is_safety_sensitive());
        assert!(!Capability::Emotion.is_safety_sensitive());
        assert!(!Capability::Art.is_safety_sensitive());
    }

    #[test]
    fn test_request_context_builder() {
        let req = CapabilityRequest::new("hello", Capability::Reflection)
            .with_context(context_keys::PRIMARY_EMOTION, "sadness")
            .with_context(context_keys::LANGUAGE, "en");

        assert_eq!(req.primary_emotion(), "sadness");
        assert_eq!(req.context_value(context_keys::LANGUAGE), Some("en"));
        assert_eq!(req.context_value("missing"), None);
    }

    #[test]
    fn test_primary_emotion_defaults_to_neutral() {
        let req = CapabilityRequest::new("hello", Capability::Art);
        assert_eq!(req.primary_emotion(), "neutral");
    }
}
