//! Shared palette and color helpers for the dashboard UI.

use eframe::egui::Color32;

use crate::state::LightMode;

/// Dark theme palette, matching the workshop-monitor look of the
/// original dashboard.
pub struct UiColors;

impl UiColors {
    pub const MAIN_BG: Color32 = Color32::from_rgb(30, 30, 30);
    pub const INNER_BG: Color32 = Color32::from_rgb(25, 25, 25);
    pub const EXTREME_BG: Color32 = Color32::from_rgb(20, 20, 20);
    pub const BORDER: Color32 = Color32::from_rgb(60, 60, 60);

    /// Connected / enabled indicator.
    pub const ACTIVE: Color32 = Color32::from_rgb(50, 200, 20);
    /// Disconnected / disabled indicator.
    pub const INACTIVE: Color32 = Color32::from_rgb(200, 50, 20);

    /// A pixel with the light off.
    pub const PIXEL_OFF: Color32 = Color32::from_rgb(42, 42, 42);
}

/// Parses `#RRGGBB` into a [`Color32`]. Anything else is `None`.
pub fn parse_hex_color(hex: &str) -> Option<Color32> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color32::from_rgb(r, g, b))
}

/// Base pixel color for a lighting mode, before debug overrides.
pub fn mode_color(mode: &LightMode, idle_color: &str) -> Color32 {
    match mode {
        LightMode::Timer => Color32::from_rgb(0xFF, 0x44, 0x44),
        LightMode::Weather => Color32::from_rgb(0x44, 0xFF, 0x44),
        LightMode::Idle => {
            parse_hex_color(idle_color).unwrap_or(Color32::from_rgb(0x44, 0x44, 0xFF))
        }
        LightMode::Music | LightMode::Other(_) => Color32::WHITE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(
            parse_hex_color("#FF00AA"),
            Some(Color32::from_rgb(255, 0, 170))
        );
        assert_eq!(parse_hex_color("FF00AA"), None);
        assert_eq!(parse_hex_color("#FF00A"), None);
        assert_eq!(parse_hex_color("#GG0000"), None);
    }

    #[test]
    fn idle_mode_uses_configured_color() {
        assert_eq!(
            mode_color(&LightMode::Idle, "#112233"),
            Color32::from_rgb(0x11, 0x22, 0x33)
        );
        assert_eq!(
            mode_color(&LightMode::Other("disco".into()), "#112233"),
            Color32::WHITE
        );
    }
}
