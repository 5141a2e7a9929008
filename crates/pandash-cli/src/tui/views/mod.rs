//! One renderer per tab, plus the login screen and the details drawer.
//!
//! Views only read: the dashboard controllers for data and [`AppState`]
//! for cursors and input.

mod browse;
mod knowledge;
mod login;
mod queue;
mod settings;

use pandash_core::dashboard::{Dashboard, Tab};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use super::state::AppState;
use super::theme::Theme;

pub use browse::render_details;

/// Render the login screen or the active tab into `area`.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    dashboard: &Dashboard,
    state: &AppState,
    server: &str,
    theme: &Theme,
) {
    if !state.authenticated {
        let validating = dashboard.context().session.borrow().api_key().is_some();
        login::render(frame, area, state, server, validating, theme);
        return;
    }

    match state.active_tab {
        Tab::Browse => browse::render(frame, area, &dashboard.browse(), state, theme),
        Tab::Queue => queue::render(frame, area, &dashboard.queue(), state, theme),
        Tab::Settings => settings::render(frame, area, &dashboard.settings(), state, theme),
        Tab::Knowledge => knowledge::render(frame, area, &dashboard.knowledge(), state, theme),
    }
}

/// Bordered block titled `title`, highlighted when `focused`.
fn panel(title: String, focused: bool, theme: &Theme) -> Block<'static> {
    let border = if focused {
        theme.border_focused
    } else {
        theme.border
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
}

/// A centered message in its own block.
fn message(frame: &mut Frame, area: Rect, block: Block<'_>, lines: Vec<Line<'_>>) {
    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Key hint spans: `[k] label  [k] label`.
fn hints(pairs: &[(&'static str, &'static str)], theme: &Theme) -> Line<'static> {
    let mut spans = Vec::with_capacity(pairs.len() * 2);
    for (key, label) in pairs {
        spans.push(Span::styled(
            format!("[{key}]"),
            Style::default().fg(theme.key_hint),
        ));
        spans.push(Span::styled(
            format!(" {label}  "),
            Style::default().fg(theme.text_muted),
        ));
    }
    Line::from(spans)
}
