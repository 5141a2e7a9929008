//! Keybinding reference overlay.

use pandash_core::dashboard::Tab;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::theme::Theme;

/// Keys that work on every tab.
pub const GLOBAL_BINDINGS: &[(&str, &str)] = &[
    ("q / Ctrl+C", "Quit"),
    ("?", "Show this help"),
    ("L", "Toggle notice log"),
    ("1-4", "Jump to tab"),
    ("Tab / S-Tab", "Next / previous tab"),
    ("[ / ]", "Previous / next account"),
    ("r / F5", "Reload this tab"),
    ("R", "Reload queue totals"),
    ("X", "Log out"),
];

/// Keys specific to `tab`.
pub const fn tab_bindings(tab: Tab) -> &'static [(&'static str, &'static str)] {
    match tab {
        Tab::Browse => &[
            ("j / k", "Move selection"),
            ("Enter / l", "Open folder or show details"),
            ("Backspace / h", "Parent folder"),
            ("/", "Search this folder"),
            ("Esc", "Close details / leave search"),
            ("y", "Copy current path"),
        ],
        Tab::Queue => &[
            ("h / l", "Switch transfer / share"),
            ("s", "Start"),
            ("p", "Pause"),
            ("u", "Resume"),
            ("x", "Stop"),
            ("C", "Clear finished tasks"),
            ("e", "Export CSV"),
            ("a", "Toggle auto-refresh"),
        ],
        Tab::Settings => &[
            ("j / k", "Move selection"),
            ("Enter / Space", "Edit value or toggle"),
            ("S / Ctrl+S", "Validate and save"),
            ("r", "Discard edits and reload"),
        ],
        Tab::Knowledge => &[
            ("j / k", "Move selection"),
            ("p / n", "Previous / next page"),
            ("g", "Go to page"),
            ("/", "Keyword filter"),
            ("s / t", "Cycle status / tag"),
            ("f / F", "Date from / to"),
            ("o / O", "Sort field / direction"),
            ("z", "Page size"),
            ("x", "Reset filters"),
            (", . v", "Pick and toggle column"),
            ("e", "Export CSV"),
            ("y / Enter", "Copy / open link"),
        ],
    }
}

/// Help overlay component.
pub struct HelpOverlay;

impl HelpOverlay {
    /// Render the overlay above everything else.
    pub fn render(frame: &mut Frame, area: Rect, tab: Tab, theme: &Theme) {
        let overlay_area = centered_rect(80, 85, area);
        frame.render_widget(Clear, overlay_area);

        let block = Block::default()
            .title(" Help - Press Esc to close ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.accent));
        let inner = block.inner(overlay_area);
        frame.render_widget(block, overlay_area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(inner);

        let section = |title: String, bindings: &[(&'static str, &'static str)]| {
            let mut lines = vec![
                Line::from(Span::styled(
                    format!(" {title}"),
                    Style::default()
                        .fg(theme.accent)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
            ];
            lines.extend(bindings.iter().map(|&(k, d)| binding_line(k, d, theme)));
            Paragraph::new(lines).wrap(Wrap { trim: false })
        };

        frame.render_widget(section("GLOBAL".to_string(), GLOBAL_BINDINGS), columns[0]);
        frame.render_widget(
            section(tab.title().to_uppercase(), tab_bindings(tab)),
            columns[1],
        );
    }
}

fn binding_line(key: &'static str, description: &'static str, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(
            format!("{key:<15}"),
            Style::default()
                .fg(theme.key_hint)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(description),
    ])
}

/// A rectangle of the given percentages centered in `r`.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(rows[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_tab_documents_keys() {
        for tab in Tab::all() {
            assert!(!tab_bindings(*tab).is_empty(), "{tab:?}");
        }
    }

    #[test]
    fn test_centered_rect_is_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect(80, 50, outer);

        assert_eq!(inner.width, 80);
        assert_eq!(inner.height, 20);
        assert_eq!(inner.x, 10);
        assert_eq!(inner.y, 10);
    }
}
