//! Condition codes and their display icons.

pub const CLEAR_DAY: &str = "clear_day";
pub const CLOUDY_DAY: &str = "cloudly_day";
pub const CLOUDY_NIGHT: &str = "cloudly_night";

/// Icon shown for codes outside the known vocabulary.
pub const FALLBACK_ICON: &str = "thermometer";

const ICONS: &[(&str, &str, &str)] = &[
    ("clear_day", "sunny", "☀"),
    ("clear_night", "moon", "☾"),
    ("rain", "rainy", "☂"),
    ("snow", "snow", "❄"),
    ("sleet", "snow", "❄"),
    ("wind", "flag", "⚑"),
    ("fog", "cloudy", "☁"),
    ("cloudly_day", "partly-sunny", "⛅"),
    ("cloudly_night", "cloudy-night", "☁"),
    ("storm", "thunderstorm", "⚡"),
    ("hail", "snow", "❄"),
];

pub fn is_known(code: &str) -> bool {
    ICONS.iter().any(|(c, _, _)| *c == code)
}

/// Icon name for a condition code.
pub fn icon_name(code: &str) -> &'static str {
    ICONS
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, icon, _)| *icon)
        .unwrap_or(FALLBACK_ICON)
}

/// Single-character glyph for terminal output.
pub fn glyph(code: &str) -> &'static str {
    ICONS.iter().find(|(c, _, _)| *c == code).map(|(_, _, g)| *g).unwrap_or("🌡")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_map_to_icons() {
        assert_eq!(icon_name("clear_day"), "sunny");
        assert_eq!(icon_name("hail"), "snow");
        assert_eq!(icon_name(CLOUDY_NIGHT), "cloudy-night");
        assert!(is_known("storm"));
    }

    #[test]
    fn unknown_code_falls_back() {
        assert_eq!(icon_name("tornado"), FALLBACK_ICON);
        assert_eq!(glyph(""), "🌡");
        assert!(!is_known("tornado"));
    }
}
