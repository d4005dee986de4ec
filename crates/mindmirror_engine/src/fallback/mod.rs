//! Local deterministic fallbacks and the minimal tier.
//!
//! The Local tier is rule-based generation with no network dependency; the
//! Minimal tier is a hardcoded safe payload that can never fail. Both are
//! built here so every resolver degrades the same way.

pub mod art;
pub mod templates;

use crate::safety::{crisis_resource, SafetyInterceptor, Urgency};
use anyhow::Result;
use mindmirror_common::{Capability, CapabilityRequest, Payload};
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use std::sync::Mutex;

/// Model id recorded on Minimal-tier results.
pub const MINIMAL_MODEL: &str = "none";

static DEFAULT_INTERCEPTOR: Lazy<SafetyInterceptor> = Lazy::new(SafetyInterceptor::new);

/// Generator id recorded on Local-tier results.
pub fn local_model_id(capability: Capability) -> &'static str {
    match capability {
        Capability::Emotion => "template",
        Capability::Reflection => "template_v1",
        Capability::Art => "procedural_svg",
        Capability::Transcription | Capability::Speech => "none",
    }
}

/// Rule-based generators for every capability, sharing one injectable RNG.
pub struct LocalFallback {
    rng: Mutex<StdRng>,
}

impl LocalFallback {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Seeded RNG so tests can assert deterministic template selection.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Generate the Local-tier payload for a request. Errors and panics
    /// here are defects; the resolver contains both.
    pub fn generate(&self, request: &CapabilityRequest) -> Result<Payload> {
        match request.capability {
            Capability::Emotion => Ok(emotion_fallback(&request.raw_input)),
            Capability::Reflection => Ok(self.reflection_fallback(&request.raw_input)),
            Capability::Art => Ok(art_fallback(request.primary_emotion())),
            Capability::Transcription => Ok(transcription_fallback()),
            Capability::Speech => Ok(speech_fallback()),
        }
    }

    /// Template reflection: deterministic category, randomized selection
    /// among that category's templates only.
    fn reflection_fallback(&self, text: &str) -> Payload {
        let category = templates::detect_category(text);
        let template = templates::template_for(category);

        let (reflection_idx, poem_idx) = {
            let mut rng = self.rng.lock().expect("rng lock poisoned");
            (
                rng.gen_range(0..template.reflections.len()),
                rng.gen_range(0..template.poems.len()),
            )
        };

        let mut reflection = template.reflections[reflection_idx].to_string();
        let severity = if DEFAULT_INTERCEPTOR.classify(text) == Urgency::Urgent {
            reflection.push(' ');
            reflection.push_str(crisis_resource("global"));
            "urgent"
        } else {
            templates::baseline_severity(category)
        };

        let micro_actions: Vec<serde_json::Value> = template
            .actions
            .iter()
            .take(2)
            .map(|(label, duration, instruction)| {
                json!({
                    "label": label,
                    "duration_seconds": duration,
                    "instruction": instruction,
                })
            })
            .collect();

        let mut payload = Payload::new();
        payload.insert("reflection".to_string(), json!(reflection));
        payload.insert("poem_line".to_string(), json!(template.poems[poem_idx]));
        payload.insert("micro_actions".to_string(), json!(micro_actions));
        payload.insert("severity".to_string(), json!(severity));
        payload.insert("tone".to_string(), json!(template.tone));
        payload.insert(
            "explainability".to_string(),
            json!(format!("Detected mood: {}. Template reflection used for reliability.", category)),
        );
        payload
    }
}

impl Default for LocalFallback {
    fn default() -> Self {
        Self::new()
    }
}

/// Keyword-scored emotion detection.
pub fn emotion_fallback(text: &str) -> Payload {
    const KEYWORDS: &[(&str, &[&str])] = &[
        ("joy", &["happy", "joy", "excited", "great", "wonderful", "amazing", "love", "glad"]),
        ("sadness", &["sad", "depressed", "down", "unhappy", "miserable", "crying", "tears"]),
        ("anger", &["angry", "mad", "furious", "annoyed", "frustrated", "irritated"]),
        ("fear", &["scared", "afraid", "anxious", "worried", "nervous", "fear", "panic"]),
        ("love", &["love", "adore", "cherish", "care", "affection"]),
        ("surprise", &["surprised", "shocked", "amazed", "unexpected", "wow"]),
        ("gratitude", &["thank", "grateful", "appreciate", "thankful"]),
    ];

    let lower = text.to_lowercase();
    let mut scored: Vec<(&str, f64)> = KEYWORDS
        .iter()
        .filter_map(|(emotion, words)| {
            let count = words.iter().filter(|w| lower.contains(**w)).count();
            (count > 0).then(|| (*emotion, (count as f64 * 0.3).min(0.9)))
        })
        .collect();

    if scored.is_empty() {
        scored.push(("neutral", 0.7));
    }
    // Score-descending, label tie-break, so output is fully deterministic.
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then(a.0.cmp(&b.0)));

    let emotions: Vec<serde_json::Value> = scored
        .iter()
        .take(3)
        .map(|(e, _)| json!(e))
        .collect();
    let scores: serde_json::Map<String, serde_json::Value> = scored
        .iter()
        .map(|(e, s)| (e.to_string(), json!(s)))
        .collect();

    let mut payload = Payload::new();
    payload.insert("emotions".to_string(), serde_json::Value::Array(emotions));
    payload.insert("scores".to_string(), serde_json::Value::Object(scores));
    payload
}

/// Procedural art payload; inline SVG, not base64.
pub fn art_fallback(emotion: &str) -> Payload {
    let mut payload = Payload::new();
    payload.insert("image".to_string(), json!(art::procedural_svg(emotion)));
    payload.insert("format".to_string(), json!("svg"));
    payload
}

fn transcription_fallback() -> Payload {
    let mut payload = Payload::new();
    payload.insert(
        "text".to_string(),
        json!("[Audio transcription unavailable. Please speak clearly and try again, or use text input.]"),
    );
    payload
}

fn speech_fallback() -> Payload {
    let mut payload = Payload::new();
    payload.insert("audio".to_string(), serde_json::Value::Null);
    payload.insert(
        "note".to_string(),
        json!("Speech synthesis temporarily unavailable."),
    );
    payload
}

/// Hardcoded Minimal-tier payload. Unconditionally available; the last
/// rung of the degradation ladder.
pub fn minimal_payload(capability: Capability, raw_input: &str) -> Payload {
    match capability {
        Capability::Emotion => {
            let mut payload = Payload::new();
            payload.insert("emotions".to_string(), json!(["neutral"]));
            payload.insert("scores".to_string(), json!({"neutral": 0.5}));
            payload
        }
        Capability::Reflection => minimal_reflection(raw_input),
        Capability::Art => art_fallback("neutral"),
        Capability::Transcription => {
            let mut payload = Payload::new();
            payload.insert("text".to_string(), json!("[Transcription failed - please try again]"));
            payload
        }
        Capability::Speech => speech_fallback(),
    }
}

fn minimal_reflection(raw_input: &str) -> Payload {
    let urgent = DEFAULT_INTERCEPTOR.classify(raw_input) == Urgency::Urgent;

    let (reflection, severity) = if urgent {
        (
            format!(
                "I hear you, and I'm concerned. Please reach out for immediate support. {}",
                crisis_resource("global")
            ),
            "urgent",
        )
    } else {
        (
            "I hear you. That sounds really heavy. Try taking a few deep breaths right now. You're not alone in this.".to_string(),
            "notice",
        )
    };

    let mut payload = Payload::new();
    payload.insert("reflection".to_string(), json!(reflection));
    payload.insert(
        "poem_line".to_string(),
        json!("One breath at a time, you find your way."),
    );
    payload.insert(
        "micro_actions".to_string(),
        json!([{
            "label": "Deep breathing",
            "duration_seconds": 60,
            "instruction": "Breathe in slowly for 4 counts, hold for 4, out for 6. Repeat 3 times.",
        }]),
    );
    payload.insert("severity".to_string(), json!(severity));
    payload.insert("tone".to_string(), json!("gentle"));
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindmirror_common::{context_keys, validate};

    #[test]
    fn test_emotion_fallback_scores_keywords() {
        let payload = emotion_fallback("I'm so happy and grateful today, thank you!");
        let emotions: Vec<&str> = payload["emotions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();

        assert!(emotions.contains(&"joy"));
        assert!(emotions.contains(&"gratitude"));
        let gratitude = payload["scores"]["gratitude"].as_f64().unwrap();
        assert!(gratitude > 0.0 && gratitude <= 0.9);
        assert!(validate(Capability::Emotion, &payload));
    }

    #[test]
    fn test_emotion_fallback_defaults_to_neutral() {
        let payload = emotion_fallback("xyzzy");
        assert_eq!(payload["emotions"][0].as_str().unwrap(), "neutral");
        assert_eq!(payload["scores"]["neutral"].as_f64().unwrap(), 0.7);
    }

    #[test]
    fn test_emotion_fallback_is_deterministic() {
        let a = emotion_fallback("worried and sad about everything");
        let b = emotion_fallback("worried and sad about everything");
        assert_eq!(a, b);
    }

    #[test]
    fn test_reflection_fallback_seeded_is_deterministic() {
        let request = CapabilityRequest::new("I'm anxious about tomorrow", Capability::Reflection);
        let a = LocalFallback::with_seed(7).generate(&request).unwrap();
        let b = LocalFallback::with_seed(7).generate(&request).unwrap();
        assert_eq!(a, b);
        assert!(validate(Capability::Reflection, &a));
    }

    #[test]
    fn test_reflection_fallback_selects_within_category() {
        let request = CapabilityRequest::new("feeling lonely and isolated", Capability::Reflection);
        let template = templates::template_for("lonely");

        for seed in 0..16 {
            let payload = LocalFallback::with_seed(seed).generate(&request).unwrap();
            let reflection = payload["reflection"].as_str().unwrap();
            let poem = payload["poem_line"].as_str().unwrap();
            assert!(template.reflections.contains(&reflection));
            assert!(template.poems.contains(&poem));
            assert_eq!(payload["tone"].as_str().unwrap(), template.tone);
        }
    }

    #[test]
    fn test_reflection_fallback_notice_severity() {
        let request = CapabilityRequest::new("overwhelmed, it's too much", Capability::Reflection);
        let payload = LocalFallback::with_seed(1).generate(&request).unwrap();
        assert_eq!(payload["severity"].as_str().unwrap(), "notice");
    }

    #[test]
    fn test_reflection_fallback_embeds_crisis_resource_when_urgent() {
        let request = CapabilityRequest::new("I want to die", Capability::Reflection);
        let payload = LocalFallback::with_seed(1).generate(&request).unwrap();
        assert_eq!(payload["severity"].as_str().unwrap(), "urgent");
        assert!(payload["reflection"].as_str().unwrap().contains("iasp.info"));
    }

    #[test]
    fn test_art_fallback_uses_context_emotion() {
        let request = CapabilityRequest::new("journal text", Capability::Art)
            .with_context(context_keys::PRIMARY_EMOTION, "sadness");
        let payload = LocalFallback::with_seed(1).generate(&request).unwrap();
        assert!(payload["image"].as_str().unwrap().contains("#4169E1"));
        assert!(validate(Capability::Art, &payload));
    }

    #[test]
    fn test_minimal_payloads_always_validate() {
        for capability in Capability::ALL {
            let payload = minimal_payload(capability, "any input");
            assert!(
                validate(capability, &payload),
                "minimal payload for {} must satisfy its own contract",
                capability
            );
        }
    }

    #[test]
    fn test_minimal_reflection_urgent_variant() {
        let payload = minimal_payload(Capability::Reflection, "I want to end my life");
        assert_eq!(payload["severity"].as_str().unwrap(), "urgent");
        assert!(payload["reflection"].as_str().unwrap().contains("iasp.info"));

        let calm = minimal_payload(Capability::Reflection, "rough week");
        assert_eq!(calm["severity"].as_str().unwrap(), "notice");
    }

    #[test]
    fn test_local_and_minimal_fallbacks_validate_for_all_capabilities() {
        let fallback = LocalFallback::with_seed(3);
        for capability in Capability::ALL {
            let request = CapabilityRequest::new("plain diary entry", capability);
            let payload = fallback.generate(&request).unwrap();
            assert!(
                validate(capability, &payload),
                "local fallback for {} must satisfy its own contract",
                capability
            );
        }
    }
}
