use ratatui::style::Color;

use super::Theme;

const SKY: Color = Color::Rgb(95, 175, 255);
const AMBER: Color = Color::Rgb(230, 190, 90);

/// Palette for dark terminals. Used when no theme is configured.
pub fn theme() -> Theme {
    Theme {
        name: "dark".to_string(),
        accent: SKY,
        border_focused: SKY,
        key_hint: AMBER,

        success: Color::Rgb(120, 200, 120),
        warning: AMBER,
        error: Color::Rgb(235, 100, 100),
        info: Color::Rgb(140, 160, 235),

        border: Color::Rgb(75, 75, 90),
        selection: Color::Rgb(40, 52, 75),

        text_primary: Color::Rgb(225, 225, 232),
        text_secondary: Color::Rgb(165, 165, 178),
        text_muted: Color::Rgb(110, 110, 122),
    }
}
