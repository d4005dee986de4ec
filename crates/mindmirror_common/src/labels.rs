//! Emotion label normalization.
//!
//! Providers disagree on label vocabularies; everything is mapped onto one
//! canonical set before scoring or template lookup.

/// Canonical emotion labels the rest of the engine understands.
pub const CANONICAL_EMOTIONS: [&str; 8] = [
    "joy",
    "sadness",
    "anger",
    "fear",
    "love",
    "surprise",
    "gratitude",
    "neutral",
];

/// Map a provider-specific emotion label onto the canonical set.
///
/// Unknown labels pass through lowercased rather than being dropped.
pub fn normalize_emotion_label(label: &str) -> String {
    let lower = label.trim().to_lowercase();
    let mapped = match lower.as_str() {
        "happy" | "happiness" | "excited" | "joy" => "joy",
        "sad" | "sadness" | "depressed" => "sadness",
        "angry" | "anger" | "mad" => "anger",
        "scared" | "fear" | "anxious" | "anxiety" | "worried" => "fear",
        "love" | "affection" | "caring" => "love",
        "surprised" | "surprise" | "amazed" => "surprise",
        "neutral" | "calm" => "neutral",
        _ => return lower,
    };
    mapped.to_string()
}
