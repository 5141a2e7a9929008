//! Single-line text input with a caret.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::tui::theme::Theme;

/// Bordered one-line input box.
pub struct TextInput<'a> {
    title: &'a str,
    value: &'a str,
    placeholder: &'a str,
    masked: bool,
    focused: bool,
}

impl<'a> TextInput<'a> {
    /// Input titled `title` showing `value`.
    pub const fn new(title: &'a str, value: &'a str) -> Self {
        Self {
            title,
            value,
            placeholder: "",
            masked: false,
            focused: true,
        }
    }

    /// Muted text shown while empty and unfocused.
    #[must_use]
    pub const fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Draw bullets instead of the characters.
    #[must_use]
    pub const fn masked(mut self, masked: bool) -> Self {
        self.masked = masked;
        self
    }

    /// Whether keystrokes currently go here.
    #[must_use]
    pub const fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Text as drawn, without the caret.
    pub fn display_value(&self) -> String {
        if self.masked {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.to_string()
        }
    }

    /// Render into `area` (three rows tall).
    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let border = if self.focused {
            theme.border_focused
        } else {
            theme.border
        };
        let block = Block::default()
            .title(format!(" {} ", self.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));

        let line = if self.value.is_empty() && !self.focused {
            Line::from(Span::styled(
                self.placeholder,
                Style::default().fg(theme.text_muted),
            ))
        } else {
            let mut spans = vec![Span::styled(
                self.display_value(),
                Style::default().fg(theme.text_primary),
            )];
            if self.focused {
                spans.push(Span::styled(
                    "_",
                    Style::default()
                        .fg(theme.accent)
                        .add_modifier(Modifier::SLOW_BLINK),
                ));
            }
            Line::from(spans)
        };

        frame.render_widget(Paragraph::new(line).block(block), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_value() {
        let input = TextInput::new("API key", "secret").masked(true);
        assert_eq!(input.display_value(), "••••••");
    }

    #[test]
    fn test_plain_value() {
        let input = TextInput::new("Search", "report");
        assert_eq!(input.display_value(), "report");
    }
}
