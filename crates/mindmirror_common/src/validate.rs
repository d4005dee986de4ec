//! Structural contract checks for provider payloads.
//!
//! Validation is shape-only: required fields present, primitive types
//! correct, enum membership. Semantic quality is never evaluated. A payload
//! that fails here is discarded and the chain advances.

use crate::capability::Capability;
use crate::result::Payload;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Severity of a reflection response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Calm,
    Notice,
    Urgent,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Calm => "calm",
            Severity::Notice => "notice",
            Severity::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "calm" => Ok(Severity::Calm),
            "notice" => Ok(Severity::Notice),
            "urgent" => Ok(Severity::Urgent),
            other => Err(format!("unknown severity: {}", other)),
        }
    }
}

/// Voice of a reflection response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Gentle,
    Encouraging,
    Practical,
    Creative,
}

impl Tone {
    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Gentle => "gentle",
            Tone::Encouraging => "encouraging",
            Tone::Practical => "practical",
            Tone::Creative => "creative",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gentle" => Ok(Tone::Gentle),
            "encouraging" => Ok(Tone::Encouraging),
            "practical" => Ok(Tone::Practical),
            "creative" => Ok(Tone::Creative),
            other => Err(format!("unknown tone: {}", other)),
        }
    }
}

/// Image formats the Art contract accepts.
const ART_FORMATS: [&str; 3] = ["png", "jpeg", "svg"];

/// Check a payload against its capability's required-field contract.
pub fn validate(capability: Capability, payload: &Payload) -> bool {
    match capability {
        Capability::Emotion => validate_emotion(payload),
        Capability::Reflection => validate_reflection(payload),
        Capability::Art => validate_art(payload),
        Capability::Transcription => nonempty_string(payload.get("text")),
        Capability::Speech => validate_speech(payload),
    }
}

fn validate_emotion(payload: &Payload) -> bool {
    let emotions_ok = payload
        .get("emotions")
        .and_then(|v| v.as_array())
        .map(|arr| !arr.is_empty() && arr.iter().all(|e| nonempty_string(Some(e))))
        .unwrap_or(false);

    let scores_ok = payload
        .get("scores")
        .and_then(|v| v.as_object())
        .map(|obj| obj.values().all(|s| s.is_number()))
        .unwrap_or(false);

    emotions_ok && scores_ok
}

fn validate_reflection(payload: &Payload) -> bool {
    if !nonempty_string(payload.get("reflection")) {
        return false;
    }
    if !nonempty_string(payload.get("poem_line")) {
        return false;
    }

    let actions_ok = payload
        .get("micro_actions")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().all(valid_micro_action))
        .unwrap_or(false);
    if !actions_ok {
        return false;
    }

    let severity_ok = payload
        .get("severity")
        .and_then(|v| v.as_str())
        .map(|s| s.parse::<Severity>().is_ok())
        .unwrap_or(false);

    let tone_ok = payload
        .get("tone")
        .and_then(|v| v.as_str())
        .map(|s| s.parse::<Tone>().is_ok())
        .unwrap_or(false);

    severity_ok && tone_ok
}

fn valid_micro_action(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    nonempty_string(obj.get("label"))
        && obj
            .get("duration_seconds")
            .map(|d| d.is_i64() || d.is_u64())
            .unwrap_or(false)
        && nonempty_string(obj.get("instruction"))
}

fn validate_art(payload: &Payload) -> bool {
    nonempty_string(payload.get("image"))
        && payload
            .get("format")
            .and_then(|v| v.as_str())
            .map(|f| ART_FORMATS.contains(&f))
            .unwrap_or(false)
}

fn validate_speech(payload: &Payload) -> bool {
    // Audio may be null when synthesis was impossible; a present string
    // must come with a format tag.
    match payload.get("audio") {
        Some(Value::Null) => true,
        Some(Value::String(s)) => !s.is_empty() && nonempty_string(payload.get("format")),
        _ => false,
    }
}

fn nonempty_string(value: Option<&Value>) -> bool {
    value
        .and_then(|v| v.as_str())
        .map(|s| !s.is_empty())
        .unwrap_or(false)
}
