//! Prompt builders for generative providers.

use mindmirror_common::{context_keys, CapabilityRequest};

/// System prompt for chat-completion reflection providers.
pub const REFLECTION_SYSTEM_PROMPT: &str = "You are an empathetic mental wellness assistant. \
     Respond ONLY with valid JSON matching the exact schema provided.";

/// Per-emotion style fragments for art generation.
const ART_STYLES: &[(&str, &str)] = &[
    ("joy", "abstract art, vibrant colors, warm yellows and oranges, flowing shapes, uplifting, energetic, positive energy, digital art"),
    ("sadness", "abstract art, cool blues and purples, gentle waves, melancholic, soft gradients, contemplative, serene, digital art"),
    ("anger", "abstract art, intense reds and blacks, sharp angles, dynamic movement, powerful, bold strokes, dramatic, digital art"),
    ("fear", "abstract art, dark purples and grays, swirling patterns, mysterious, ethereal, shadowy, atmospheric, digital art"),
    ("love", "abstract art, soft pinks and warm reds, heart shapes, gentle curves, romantic, tender, harmonious, digital art"),
    ("surprise", "abstract art, bright oranges and yellows, explosive patterns, dynamic, energetic, unexpected, vibrant, digital art"),
    ("neutral", "abstract art, balanced colors, geometric patterns, calm, centered, minimalist, peaceful, digital art"),
];

/// Build the user prompt for reflection generation, folding in whatever
/// context the caller supplied.
pub fn build_reflection_prompt(request: &CapabilityRequest) -> String {
    let mut context_info = String::new();
    if let Some(language) = request.context_value(context_keys::LANGUAGE) {
        context_info.push_str(&format!("\nPreferred language: {}", language));
    }
    if let Some(sensitivity) = request.context_value(context_keys::SENSITIVITY) {
        context_info.push_str(&format!("\nSensitivity level: {}", sensitivity));
    }
    if let Some(emotion) = request.context_value(context_keys::PRIMARY_EMOTION) {
        context_info.push_str(&format!("\nDetected mood: {}", emotion));
    }

    format!(
        r#"You are an empathetic mental wellness assistant. Given the user's text and context, produce a JSON object with these exact fields:

User text: "{input}"
{context_info}

Required JSON structure:
{{
  "reflection": "1-3 sentences of empathetic, non-judgmental reflection",
  "poem_line": "One poetic line capturing the emotion",
  "micro_actions": [
    {{"label": "Action name", "duration_seconds": 60, "instruction": "Clear step-by-step instruction"}},
    {{"label": "Action name", "duration_seconds": 180, "instruction": "Clear step-by-step instruction"}}
  ],
  "severity": "calm" or "notice" or "urgent",
  "tone": "gentle" or "encouraging" or "practical" or "creative"
}}

Guidelines:
- Keep reflection kind, warm, and validating
- Micro-actions must be realistic, under 5 minutes, no equipment needed
- severity: "calm" for mild feelings, "notice" for elevated stress, "urgent" for crisis indicators
- Respond ONLY with valid JSON, no other text

Output JSON:"#,
        input = request.raw_input,
        context_info = context_info,
    )
}

/// Build a text-to-image prompt from the detected emotion plus a short
/// summary of the user's text.
pub fn build_art_prompt(emotion: &str, content_summary: &str) -> String {
    let style = ART_STYLES
        .iter()
        .find(|(e, _)| *e == emotion)
        .or_else(|| ART_STYLES.iter().find(|(e, _)| *e == "neutral"))
        .map(|(_, s)| *s)
        .unwrap_or_default();

    let summary: String = content_summary.chars().take(200).collect();
    if summary.trim().is_empty() {
        format!("{}, high quality, artistic, beautiful", style)
    } else {
        format!(
            "{}, inspired by: {}, high quality, artistic, beautiful",
            style,
            summary.trim()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindmirror_common::Capability;

    #[test]
    fn test_reflection_prompt_embeds_input_and_context() {
        let request = CapabilityRequest::new("rough day at work", Capability::Reflection)
            .with_context(context_keys::PRIMARY_EMOTION, "sadness")
            .with_context(context_keys::LANGUAGE, "en");

        let prompt = build_reflection_prompt(&request);
        assert!(prompt.contains("rough day at work"));
        assert!(prompt.contains("Detected mood: sadness"));
        assert!(prompt.contains("Preferred language: en"));
        assert!(prompt.contains("micro_actions"));
    }

    #[test]
    fn test_art_prompt_by_emotion() {
        let prompt = build_art_prompt("anger", "argued with a friend");
        assert!(prompt.contains("intense reds"));
        assert!(prompt.contains("argued with a friend"));

        let unknown = build_art_prompt("melancholy", "");
        assert!(unknown.contains("balanced colors"));
    }

    #[test]
    fn test_art_prompt_truncates_summary() {
        let long = "x".repeat(500);
        let prompt = build_art_prompt("joy", &long);
        assert!(prompt.len() < 500);
    }
}
