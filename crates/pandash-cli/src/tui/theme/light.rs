use ratatui::style::Color;

use super::Theme;

const NAVY: Color = Color::Rgb(25, 85, 170);

/// Palette for light terminal backgrounds.
pub fn theme() -> Theme {
    Theme {
        name: "light".to_string(),
        accent: NAVY,
        border_focused: NAVY,
        key_hint: Color::Rgb(150, 80, 0),

        success: Color::Rgb(30, 130, 50),
        warning: Color::Rgb(180, 120, 0),
        error: Color::Rgb(190, 30, 40),
        info: Color::Rgb(60, 90, 190),

        border: Color::Rgb(180, 180, 190),
        selection: Color::Rgb(215, 225, 245),

        text_primary: Color::Rgb(25, 25, 30),
        text_secondary: Color::Rgb(80, 80, 95),
        text_muted: Color::Rgb(140, 140, 150),
    }
}
