use serde::Serialize;

/// A named color swatch offered when creating or editing a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorItem {
    pub hex: &'static str,
    pub name: &'static str,
}

pub const DEFAULT_COLOR: &str = "#FF0000";

pub const PALETTE: [ColorItem; 20] = [
    ColorItem { hex: "#BF4C4C", name: "Red" },
    ColorItem { hex: "#9ACD32", name: "YellowGreen" },
    ColorItem { hex: "#00BFFF", name: "DeepSkyBlue" },
    ColorItem { hex: "#6A5ACD", name: "SlateBlue" },
    ColorItem { hex: "#FF6347", name: "Tomato" },
    ColorItem { hex: "#FFA500", name: "Orange" },
    ColorItem { hex: "#FFD700", name: "Gold" },
    ColorItem { hex: "#32CD32", name: "LimeGreen" },
    ColorItem { hex: "#20B2AA", name: "LightSeaGreen" },
    ColorItem { hex: "#008080", name: "Teal" },
    ColorItem { hex: "#4682B4", name: "SteelBlue" },
    ColorItem { hex: "#4169E1", name: "RoyalBlue" },
    ColorItem { hex: "#9370DB", name: "MediumPurple" },
    ColorItem { hex: "#DA70D6", name: "Orchid" },
    ColorItem { hex: "#C71585", name: "MediumVioletRed" },
    ColorItem { hex: "#FFB6C1", name: "LightPink" },
    ColorItem { hex: "#D2691E", name: "Chocolate" },
    ColorItem { hex: "#F08080", name: "LightCoral" },
    ColorItem { hex: "#808080", name: "Gray" },
    ColorItem { hex: "#FFF5EE", name: "Seashell" },
];

/// Whether `s` is a `#RRGGBB` color.
pub fn is_hex_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Resolve a palette name (case-insensitive) or a raw `#RRGGBB` value to a
/// normalized uppercase hex string.
pub fn resolve_color(input: &str) -> Option<String> {
    if let Some(item) = PALETTE.iter().find(|c| c.name.eq_ignore_ascii_case(input)) {
        return Some(item.hex.to_string());
    }
    is_hex_color(input).then(|| input.to_ascii_uppercase())
}

/// Palette entry matching a hex value, if the color is not custom.
pub fn palette_name(hex: &str) -> Option<&'static str> {
    PALETTE
        .iter()
        .find(|c| c.hex.eq_ignore_ascii_case(hex))
        .map(|c| c.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_validation() {
        assert!(is_hex_color("#00bfff"));
        assert!(!is_hex_color("00BFFF"));
        assert!(!is_hex_color("#00BFF"));
        assert!(!is_hex_color("#GGGGGG"));
    }

    #[test]
    fn test_resolve_color() {
        assert_eq!(resolve_color("teal").as_deref(), Some("#008080"));
        assert_eq!(resolve_color("#abcdef").as_deref(), Some("#ABCDEF"));
        assert_eq!(resolve_color("mauve"), None);
    }

    #[test]
    fn test_palette_name() {
        assert_eq!(palette_name("#ffd700"), Some("Gold"));
        assert_eq!(palette_name("#123456"), None);
    }
}
