//! API key prompt shown until a key validates.

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph};
use ratatui::Frame;

use crate::tui::components::{centered_rect, LoadingIndicator, TextInput};
use crate::tui::state::AppState;
use crate::tui::theme::Theme;

use super::{hints, panel};

pub fn render(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    server: &str,
    validating: bool,
    theme: &Theme,
) {
    let dialog = centered_rect(70, 60, area);
    frame.render_widget(Clear, dialog);

    let block = panel(" Connect ".to_string(), true, theme);
    let inner = block.inner(dialog);
    frame.render_widget(block, dialog);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    let title = Paragraph::new(Line::from(vec![
        Span::styled("Server ", Style::default().fg(theme.text_secondary)),
        Span::styled(
            server.to_string(),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(title, rows[0]);

    frame.render_widget(
        Paragraph::new("Paste the API key configured on the backend.")
            .style(Style::default().fg(theme.text_muted))
            .alignment(Alignment::Center),
        rows[1],
    );

    TextInput::new(state.input_mode.prompt(), &state.input)
        .masked(true)
        .focused(!validating)
        .placeholder("X-API-Key")
        .render(frame, rows[2], theme);

    if validating {
        LoadingIndicator::new("Validating key")
            .detail("Checking /api/health and /api/info")
            .accent_style(Style::default().fg(theme.accent))
            .muted_style(Style::default().fg(theme.text_muted))
            .render(frame, rows[4], &state.spinner);
    }

    frame.render_widget(
        Paragraph::new(hints(
            &[("Enter", "Save"), ("Esc", "Clear"), ("Ctrl+C", "Quit")],
            theme,
        ))
        .alignment(Alignment::Center),
        rows[6],
    );
}
