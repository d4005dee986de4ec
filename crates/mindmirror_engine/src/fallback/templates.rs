//! Reflection template bank for the local fallback tier.
//!
//! Category detection is keyword-matched and deterministic; only the
//! selection among one category's templates is randomized, through the
//! injectable RNG owned by `LocalFallback`.

/// One suggested micro-action: label, duration in seconds, instruction.
pub type MicroAction = (&'static str, u64, &'static str);

pub struct ReflectionTemplate {
    pub category: &'static str,
    pub reflections: &'static [&'static str],
    pub poems: &'static [&'static str],
    pub actions: &'static [MicroAction],
    pub tone: &'static str,
}

pub const TEMPLATES: &[ReflectionTemplate] = &[
    ReflectionTemplate {
        category: "sad",
        reflections: &[
            "I hear the weight you're carrying. Sadness is a natural response to loss or disappointment, and it's okay to feel this way.",
            "Your feelings are valid. Sometimes sadness is our heart's way of processing what matters to us.",
            "It's brave to acknowledge sadness. This feeling won't last forever, even though it feels heavy right now.",
        ],
        poems: &[
            "Even in the darkest night, stars find a way to shine.",
            "Tears water the seeds of tomorrow's strength.",
            "Your heart knows how to heal, one gentle breath at a time.",
        ],
        actions: &[
            ("Gentle breathing", 120, "Sit comfortably. Breathe in for 4 counts, hold for 4, out for 6. Repeat 5 times."),
            ("Comfort ritual", 180, "Make a warm drink, wrap yourself in a blanket, and sit by a window for 3 minutes."),
        ],
        tone: "gentle",
    },
    ReflectionTemplate {
        category: "anxious",
        reflections: &[
            "Anxiety can feel overwhelming, but you're not alone in this. Your nervous system is trying to protect you.",
            "I see you're feeling anxious. That racing mind and tight chest are real, and there are ways to ease them.",
            "Anxiety is uncomfortable, but it's also temporary. Let's find a way to ground you in this moment.",
        ],
        poems: &[
            "Breathe in calm, breathe out worry. You are safe in this moment.",
            "Like waves, anxiety rises and falls. You are the steady shore.",
            "One breath at a time, you find your center again.",
        ],
        actions: &[
            ("5-4-3-2-1 grounding", 180, "Name 5 things you see, 4 you hear, 3 you touch, 2 you smell, 1 you taste."),
            ("Progressive relaxation", 240, "Tense and release each muscle group: feet, legs, stomach, hands, shoulders, face."),
        ],
        tone: "practical",
    },
    ReflectionTemplate {
        category: "angry",
        reflections: &[
            "Anger is a powerful emotion that tells us something matters. It's okay to feel this way.",
            "I hear your frustration. Anger often masks hurt or unmet needs. You deserve to be heard.",
            "Your anger is valid. Let's find a healthy way to express and release this energy.",
        ],
        poems: &[
            "Fire can warm or burn. Choose how you channel this flame.",
            "Anger is energy seeking expression. Let it flow, then let it go.",
            "Beneath the storm, your calm center waits.",
        ],
        actions: &[
            ("Physical release", 120, "Do 20 jumping jacks or punch a pillow. Let your body express the energy."),
            ("Cooling breath", 180, "Breathe in through nose, out through mouth with a 'ha' sound. Imagine releasing heat."),
        ],
        tone: "encouraging",
    },
    ReflectionTemplate {
        category: "overwhelmed",
        reflections: &[
            "Feeling overwhelmed means you care deeply. It's a sign you're human, not weak.",
            "When everything feels like too much, remember: you only need to take the next small step.",
            "Overwhelm is your system saying 'pause.' Let's break this down into manageable pieces.",
        ],
        poems: &[
            "Mountains are climbed one step at a time, not all at once.",
            "In the chaos, find one small thing you can control.",
            "You don't have to carry it all. Set something down.",
        ],
        actions: &[
            ("Brain dump", 300, "Write everything on your mind for 5 minutes. Don't organize, just release."),
            ("One thing", 120, "Choose the smallest task you can do right now. Do only that. Celebrate it."),
        ],
        tone: "practical",
    },
    ReflectionTemplate {
        category: "lonely",
        reflections: &[
            "Loneliness is painful, and I'm sorry you're feeling this way. Connection is a fundamental human need.",
            "Even in loneliness, you're not truly alone. Your feelings matter, and there are people who care.",
            "Loneliness can feel like an empty room, but small connections can light it up again.",
        ],
        poems: &[
            "Even the moon needs the sun. Reach out, even in small ways.",
            "Loneliness is a bridge, not a destination. Cross it gently.",
            "Your presence matters. Someone needs your light, even if you can't see it yet.",
        ],
        actions: &[
            ("Reach out", 180, "Send a text to someone you haven't talked to in a while. Just say hi."),
            ("Self-compassion", 120, "Place hand on heart. Say: 'I am here for myself. I am worthy of connection.'"),
        ],
        tone: "gentle",
    },
    ReflectionTemplate {
        category: "neutral",
        reflections: &[
            "Thank you for sharing. Sometimes just expressing what's on our mind can bring clarity.",
            "I'm here with you. Whatever you're feeling is valid and worth acknowledging.",
            "Taking time to reflect is a gift you give yourself. Keep going.",
        ],
        poems: &[
            "In stillness, we find ourselves.",
            "Every moment of awareness is a step toward growth.",
            "Your journey is uniquely yours. Honor it.",
        ],
        actions: &[
            ("Mindful moment", 120, "Close eyes. Notice your breath. Just be present for 2 minutes."),
            ("Gratitude pause", 180, "Think of 3 small things you're grateful for today. Really feel them."),
        ],
        tone: "creative",
    },
];

/// Categories whose baseline severity is "notice" rather than "calm".
const NOTICE_CATEGORIES: [&str; 3] = ["anxious", "overwhelmed", "angry"];

/// Keyword-match a template category from raw text. Deterministic: the
/// first category whose keyword list matches wins.
pub fn detect_category(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    let matches = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if matches(&["sad", "depressed", "down", "hopeless", "crying"]) {
        "sad"
    } else if matches(&["anxious", "worried", "nervous", "panic", "scared", "afraid"]) {
        "anxious"
    } else if matches(&["angry", "mad", "furious", "frustrated", "irritated"]) {
        "angry"
    } else if matches(&["overwhelmed", "too much", "can't handle", "stressed"]) {
        "overwhelmed"
    } else if matches(&["lonely", "alone", "isolated", "nobody"]) {
        "lonely"
    } else {
        "neutral"
    }
}

/// Template bank entry for a category, defaulting to neutral.
pub fn template_for(category: &str) -> &'static ReflectionTemplate {
    TEMPLATES
        .iter()
        .find(|t| t.category == category)
        .unwrap_or_else(|| {
            TEMPLATES
                .iter()
                .find(|t| t.category == "neutral")
                .expect("neutral template exists")
        })
}

/// Baseline severity for a detected category.
pub fn baseline_severity(category: &str) -> &'static str {
    if NOTICE_CATEGORIES.contains(&category) {
        "notice"
    } else {
        "calm"
    }
}
