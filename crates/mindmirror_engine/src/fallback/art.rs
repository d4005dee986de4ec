//! Procedural SVG art for the local fallback tier.

/// Primary/secondary/accent hex colors per emotion.
const COLOR_SCHEMES: &[(&str, [&str; 3])] = &[
    ("joy", ["#FFD700", "#FFA500", "#FF6347"]),
    ("sadness", ["#4169E1", "#6495ED", "#87CEEB"]),
    ("anger", ["#DC143C", "#8B0000", "#FF4500"]),
    ("fear", ["#9370DB", "#8B008B", "#4B0082"]),
    ("love", ["#FF69B4", "#FF1493", "#FFB6C1"]),
    ("surprise", ["#FF8C00", "#FFA500", "#FFD700"]),
    ("neutral", ["#808080", "#A9A9A9", "#C0C0C0"]),
];

fn scheme_for(emotion: &str) -> [&'static str; 3] {
    COLOR_SCHEMES
        .iter()
        .find(|(e, _)| *e == emotion)
        .or_else(|| COLOR_SCHEMES.iter().find(|(e, _)| *e == "neutral"))
        .map(|(_, colors)| *colors)
        .expect("neutral scheme exists")
}

/// Deterministic 512x512 gradient composition for an emotion.
pub fn procedural_svg(emotion: &str) -> String {
    let [primary, secondary, accent] = scheme_for(emotion);

    format!(
        r##"<?xml version="1.0" encoding="UTF-8"?>
<svg width="512" height="512" xmlns="http://www.w3.org/2000/svg">
    <defs>
        <radialGradient id="grad1">
            <stop offset="0%" style="stop-color:{primary};stop-opacity:0.8" />
            <stop offset="100%" style="stop-color:{secondary};stop-opacity:0.4" />
        </radialGradient>
        <linearGradient id="grad2" x1="0%" y1="0%" x2="100%" y2="100%">
            <stop offset="0%" style="stop-color:{secondary};stop-opacity:0.6" />
            <stop offset="100%" style="stop-color:{accent};stop-opacity:0.8" />
        </linearGradient>
    </defs>

    <rect width="512" height="512" fill="url(#grad1)"/>

    <circle cx="256" cy="256" r="150" fill="url(#grad2)" opacity="0.7"/>
    <circle cx="180" cy="180" r="80" fill="{accent}" opacity="0.5"/>
    <circle cx="350" cy="320" r="100" fill="{primary}" opacity="0.4"/>

    <path d="M 50 256 Q 256 100, 462 256 T 50 256" fill="none" stroke="{secondary}" stroke-width="3" opacity="0.6"/>
    <path d="M 256 50 Q 400 256, 256 462 T 256 50" fill="none" stroke="{accent}" stroke-width="2" opacity="0.5"/>
</svg>"##,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svg_uses_emotion_colors() {
        let svg = procedural_svg("anger");
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("#DC143C"));
        assert!(svg.contains("<svg width=\"512\""));
    }

    #[test]
    fn test_unknown_emotion_gets_neutral_scheme() {
        let svg = procedural_svg("bewildered");
        assert!(svg.contains("#808080"));
    }

    #[test]
    fn test_svg_is_deterministic() {
        assert_eq!(procedural_svg("joy"), procedural_svg("joy"));
    }
}
