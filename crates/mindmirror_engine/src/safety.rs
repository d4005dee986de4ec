//! Crisis phrase screening.
//!
//! Runs before any provider is consulted. An `Urgent` classification makes
//! the Reflection resolver skip every remote chain and answer with the
//! minimal safe response; for other capabilities it is informational only.

use once_cell::sync::Lazy;

/// High-risk phrases. Plain case-insensitive substring match, first match
/// wins; negations are not handled ("I would never harm myself" still
/// matches), preserving the original coarse contract.
pub static CRISIS_PHRASES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "kill myself",
        "end my life",
        "suicide",
        "want to die",
        "harm myself",
        "cut myself",
        "hurt myself",
        "no reason to live",
        "better off dead",
    ]
});

/// Crisis resource lines by region.
pub static CRISIS_RESOURCES: &[(&str, &str)] = &[
    (
        "global",
        "If you're in crisis, please reach out: International Association for Suicide Prevention: https://www.iasp.info/resources/Crisis_Centres/",
    ),
    ("us", "National Suicide Prevention Lifeline: 988 or 1-800-273-8255"),
    ("uk", "Samaritans: 116 123"),
    ("sri_lanka", "Sumithrayo: 011-2692909 or 011-2696666"),
];

/// Resource line for a region, falling back to the global one.
pub fn crisis_resource(region: &str) -> &'static str {
    CRISIS_RESOURCES
        .iter()
        .find(|(r, _)| *r == region)
        .or_else(|| CRISIS_RESOURCES.iter().find(|(r, _)| *r == "global"))
        .map(|(_, text)| *text)
        .unwrap_or("")
}

/// Classification of raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Urgent,
    Normal,
}

/// Scans raw input for crisis indicators.
pub struct SafetyInterceptor {
    phrases: Vec<String>,
}

impl SafetyInterceptor {
    /// Interceptor with the built-in phrase list.
    pub fn new() -> Self {
        Self::with_phrases(CRISIS_PHRASES.iter().map(|p| p.to_string()).collect())
    }

    /// Interceptor with a custom phrase list (matched lowercased).
    pub fn with_phrases(phrases: Vec<String>) -> Self {
        Self {
            phrases: phrases.into_iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    pub fn classify(&self, raw_input: &str) -> Urgency {
        let lower = raw_input.to_lowercase();
        if self.phrases.iter().any(|p| lower.contains(p.as_str())) {
            Urgency::Urgent
        } else {
            Urgency::Normal
        }
    }
}

impl Default for SafetyInterceptor {
    fn default() -> Self {
        Self::new()
    }
}
