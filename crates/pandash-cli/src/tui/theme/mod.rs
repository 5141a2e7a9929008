//! Color themes for the dashboard.

use pandash_core::dashboard::NoticeLevel;
use ratatui::style::Color;

mod dark;
mod light;

/// Palette used by every view.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Theme name
    pub name: String,

    /// Accent for titles and focus
    pub accent: Color,

    // semantic
    /// Completed tasks, success notices
    pub success: Color,
    /// Paused queues, pending work
    pub warning: Color,
    /// Failures
    pub error: Color,
    /// In-progress work, info notices
    pub info: Color,

    /// Unfocused border
    pub border: Color,
    /// Focused border
    pub border_focused: Color,
    /// Selected row background
    pub selection: Color,

    // text
    /// Body text
    pub text_primary: Color,
    /// Labels
    pub text_secondary: Color,
    /// Hints and placeholders
    pub text_muted: Color,

    /// Key names in hints and the help overlay
    pub key_hint: Color,
}

impl Theme {
    /// Create the dark theme.
    pub fn dark() -> Self {
        dark::theme()
    }

    /// Create the light theme.
    pub fn light() -> Self {
        light::theme()
    }

    /// Create a theme by name; unknown names fall back to dark.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Color for a task or knowledge status key.
    pub fn status_color(&self, status: &str) -> Color {
        match status {
            "completed" | "success" | "transferred" => self.success,
            "failed" | "error" => self.error,
            "running" | "processing" => self.info,
            "pending" | "paused" => self.warning,
            _ => self.text_secondary,
        }
    }

    /// Color for a notice.
    pub const fn notice_color(&self, level: NoticeLevel) -> Color {
        match level {
            NoticeLevel::Info => self.info,
            NoticeLevel::Success => self.success,
            NoticeLevel::Error => self.error,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
