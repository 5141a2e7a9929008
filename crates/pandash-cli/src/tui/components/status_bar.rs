//! Status bar: selected account, polling state or the latest notice, key hints.

use std::time::Duration;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::tui::layout::LayoutMode;
use crate::tui::state::AppState;
use crate::tui::theme::Theme;

/// What the status bar reports about the dashboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusInfo<'a> {
    /// Selected account
    pub account: Option<&'a str>,
    /// Queue polling period, when polling
    pub polling: Option<Duration>,
}

/// Status bar component.
pub struct StatusBar;

impl StatusBar {
    /// Render the status bar.
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        info: StatusInfo<'_>,
        mode: LayoutMode,
        theme: &Theme,
    ) {
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(theme.border));
        let inner = if mode == LayoutMode::Minimal {
            area
        } else {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            inner
        };

        match mode {
            LayoutMode::Split | LayoutMode::Tabs => Self::render_full(frame, inner, state, info, theme),
            LayoutMode::Minimal => Self::render_compact(frame, inner, state, info, theme),
        }
    }

    fn render_full(
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        info: StatusInfo<'_>,
        theme: &Theme,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(25),
                Constraint::Percentage(45),
                Constraint::Percentage(30),
            ])
            .split(area);

        frame.render_widget(Paragraph::new(account_line(info, theme)), chunks[0]);
        frame.render_widget(Paragraph::new(middle_line(state, info, theme)), chunks[1]);

        let hints = Line::from(vec![
            Span::styled("[?]", Style::default().fg(theme.text_secondary)),
            Span::raw(" Help  "),
            Span::styled("[L]", Style::default().fg(theme.text_secondary)),
            Span::raw(" Log  "),
            Span::styled("[Q]", Style::default().fg(theme.text_secondary)),
            Span::raw(" Quit"),
        ]);
        frame.render_widget(
            Paragraph::new(hints).style(Style::default().fg(theme.text_muted)),
            chunks[2],
        );
    }

    fn render_compact(
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        info: StatusInfo<'_>,
        theme: &Theme,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(area);

        frame.render_widget(Paragraph::new(account_line(info, theme)), chunks[0]);
        frame.render_widget(Paragraph::new(middle_line(state, info, theme)), chunks[1]);
    }
}

fn account_line(info: StatusInfo<'_>, theme: &Theme) -> Line<'static> {
    match info.account {
        Some(account) => Line::from(vec![
            Span::styled("● ", Style::default().fg(theme.success)),
            Span::styled(
                account.to_string(),
                Style::default()
                    .fg(theme.text_primary)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        None => Line::from(Span::styled(
            "No account",
            Style::default().fg(theme.text_muted),
        )),
    }
}

fn middle_line(state: &AppState, info: StatusInfo<'_>, theme: &Theme) -> Line<'static> {
    if let Some(notice) = state.current_notice() {
        return Line::from(Span::styled(
            notice.message.clone(),
            Style::default().fg(theme.notice_color(notice.level)),
        ));
    }
    Line::from(Span::styled(
        polling_label(info.polling),
        Style::default().fg(theme.text_muted),
    ))
}

/// "Auto-refresh 5s" or "Auto-refresh off".
pub fn polling_label(polling: Option<Duration>) -> String {
    match polling {
        Some(period) if period.subsec_millis() == 0 => {
            format!("Auto-refresh {}s", period.as_secs())
        }
        Some(period) => format!("Auto-refresh {:.1}s", period.as_secs_f64()),
        None => "Auto-refresh off".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polling_label() {
        assert_eq!(polling_label(Some(Duration::from_secs(5))), "Auto-refresh 5s");
        assert_eq!(
            polling_label(Some(Duration::from_millis(2500))),
            "Auto-refresh 2.5s"
        );
        assert_eq!(polling_label(None), "Auto-refresh off");
    }
}
