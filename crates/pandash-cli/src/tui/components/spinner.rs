//! Animated spinner shown while a request is in flight.

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

const BRAILLE: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const LINE: &[&str] = &["-", "\\", "|", "/"];

/// Spinner animation variants.
#[derive(Debug, Clone, Copy, Default)]
pub enum SpinnerStyle {
    /// Braille dots
    #[default]
    Braille,
    /// ASCII line, for terminals without Braille glyphs
    Line,
}

impl SpinnerStyle {
    const fn frames(self) -> &'static [&'static str] {
        match self {
            Self::Braille => BRAILLE,
            Self::Line => LINE,
        }
    }
}

/// Animation position, advanced once per UI tick.
#[derive(Debug, Clone, Default)]
pub struct SpinnerState {
    frame: usize,
    tick: u64,
}

impl SpinnerState {
    /// Advance the animation; the frame changes every second tick.
    pub fn tick(&mut self, style: SpinnerStyle) {
        self.tick = self.tick.wrapping_add(1);
        if self.tick % 2 == 0 {
            self.frame = (self.frame + 1) % style.frames().len();
        }
    }

    /// The glyph to draw now.
    pub fn current_frame(&self, style: SpinnerStyle) -> &'static str {
        let frames = style.frames();
        frames[self.frame % frames.len()]
    }
}

/// One-line spinner with a label.
pub struct Spinner<'a> {
    text: &'a str,
    style: SpinnerStyle,
    text_style: Style,
    spinner_style: Style,
}

impl<'a> Spinner<'a> {
    /// Spinner labelled `text`.
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            style: SpinnerStyle::default(),
            text_style: Style::default(),
            spinner_style: Style::default(),
        }
    }

    /// Label style.
    #[must_use]
    pub const fn text_style(mut self, style: Style) -> Self {
        self.text_style = style;
        self
    }

    /// Glyph style.
    #[must_use]
    pub const fn spinner_style(mut self, style: Style) -> Self {
        self.spinner_style = style;
        self
    }

    /// Render into `area`.
    pub fn render(&self, frame: &mut Frame, area: Rect, state: &SpinnerState) {
        let line = Line::from(vec![
            Span::styled(state.current_frame(self.style), self.spinner_style),
            Span::raw(" "),
            Span::styled(self.text, self.text_style),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Spinner with a second, muted line of detail.
pub struct LoadingIndicator<'a> {
    message: &'a str,
    detail: Option<&'a str>,
    accent_style: Style,
    muted_style: Style,
}

impl<'a> LoadingIndicator<'a> {
    /// Indicator showing `message`.
    pub fn new(message: &'a str) -> Self {
        Self {
            message,
            detail: None,
            accent_style: Style::default(),
            muted_style: Style::default(),
        }
    }

    /// Second line.
    #[must_use]
    pub const fn detail(mut self, detail: &'a str) -> Self {
        self.detail = Some(detail);
        self
    }

    /// Glyph style.
    #[must_use]
    pub const fn accent_style(mut self, style: Style) -> Self {
        self.accent_style = style;
        self
    }

    /// Detail style.
    #[must_use]
    pub const fn muted_style(mut self, style: Style) -> Self {
        self.muted_style = style;
        self
    }

    /// Render into `area`.
    pub fn render(&self, frame: &mut Frame, area: Rect, state: &SpinnerState) {
        if area.height == 0 {
            return;
        }

        let mut lines = vec![Line::from(vec![
            Span::styled(state.current_frame(SpinnerStyle::Braille), self.accent_style),
            Span::raw(" "),
            Span::raw(self.message),
        ])];
        if let Some(detail) = self.detail.filter(|_| area.height > 1) {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(detail, self.muted_style),
            ]));
        }

        frame.render_widget(Paragraph::new(lines), area);
    }
}
