//! Remote file browser.

use pandash_core::dashboard::browse::{file_details, format_mtime, format_size};
use pandash_core::dashboard::BrowseModule;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;

use crate::tui::components::{Spinner, SpinnerState, SpinnerStyle, TextInput};
use crate::tui::state::{AppState, InputMode};
use crate::tui::theme::Theme;

use super::{message, panel};

pub fn render(
    frame: &mut Frame,
    area: Rect,
    browse: &BrowseModule,
    state: &AppState,
    theme: &Theme,
) {
    let typing = state.input_mode == InputMode::Search;
    let show_search = typing || !browse.search_input().is_empty();

    let mut constraints = vec![Constraint::Length(1)];
    if show_search {
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Min(3));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    frame.render_widget(Paragraph::new(location_line(browse, theme)), rows[0]);

    if show_search {
        TextInput::new(InputMode::Search.prompt(), browse.search_input())
            .focused(typing)
            .render(frame, rows[1], theme);
    }

    render_listing(frame, rows[rows.len() - 1], browse, theme, &state.spinner);
}

fn location_line(browse: &BrowseModule, theme: &Theme) -> Line<'static> {
    if let Some(keyword) = browse.searching() {
        return Line::from(vec![
            Span::styled("Results for ", Style::default().fg(theme.text_secondary)),
            Span::styled(
                format!("\"{keyword}\""),
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" in {}", browse.current_path()),
                Style::default().fg(theme.text_secondary),
            ),
        ]);
    }

    let crumbs = browse.breadcrumbs();
    let last = crumbs.len().saturating_sub(1);
    let mut spans = Vec::new();
    for (i, crumb) in crumbs.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" › ", Style::default().fg(theme.text_muted)));
        }
        let style = if i == last {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text_secondary)
        };
        spans.push(Span::styled(crumb.label, style));
    }
    Line::from(spans)
}

fn render_listing(
    frame: &mut Frame,
    area: Rect,
    browse: &BrowseModule,
    theme: &Theme,
    spinner: &SpinnerState,
) {
    let entries = browse.entries();
    let title = format!(" Files ({}) ", entries.len());
    let block = panel(title, true, theme);

    if let Some(error) = browse.error() {
        message(
            frame,
            area,
            block,
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    error.to_string(),
                    Style::default().fg(theme.error),
                )),
                Line::from(Span::styled(
                    "Press r to retry",
                    Style::default().fg(theme.text_muted),
                )),
            ],
        );
        return;
    }

    if entries.is_empty() {
        if browse.is_loading() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            Spinner::new("Loading")
                .spinner_style(Style::default().fg(theme.accent))
                .text_style(Style::default().fg(theme.text_secondary))
                .render(frame, inner, spinner);
        } else {
            let text = if browse.searching().is_some() {
                "No matches"
            } else {
                "This folder is empty"
            };
            message(
                frame,
                area,
                block,
                vec![
                    Line::from(""),
                    Line::from(Span::styled(text, Style::default().fg(theme.text_muted))),
                ],
            );
        }
        return;
    }

    let block = if browse.is_loading() {
        block.title_bottom(Line::from(Span::styled(
            format!(" {} refreshing ", spinner.current_frame(SpinnerStyle::Braille)),
            Style::default().fg(theme.accent),
        )))
    } else {
        block
    };

    let rows: Vec<Row> = entries
        .iter()
        .map(|entry| {
            let (icon, name_style) = if entry.isdir {
                ("▸ ", Style::default().fg(theme.accent))
            } else {
                ("  ", Style::default().fg(theme.text_primary))
            };
            let size = if entry.isdir {
                "-".to_string()
            } else {
                format_size(entry.size)
            };
            Row::new(vec![
                Cell::from(format!("{icon}{}", entry.name())).style(name_style),
                Cell::from(size).style(Style::default().fg(theme.text_secondary)),
                Cell::from(format_mtime(entry.server_mtime))
                    .style(Style::default().fg(theme.text_secondary)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(20),
            Constraint::Length(10),
            Constraint::Length(17),
        ],
    )
    .header(
        Row::new(vec!["Name", "Size", "Modified"])
            .style(Style::default().fg(theme.text_muted).add_modifier(Modifier::BOLD)),
    )
    .block(block)
    .row_highlight_style(
        Style::default()
            .bg(theme.selection)
            .add_modifier(Modifier::BOLD),
    );

    let mut table_state = TableState::default().with_selected(Some(browse.selected()));
    frame.render_stateful_widget(table, area, &mut table_state);
}

/// Drawer listing the metadata of the opened file.
pub fn render_details(frame: &mut Frame, area: Rect, browse: &BrowseModule, theme: &Theme) {
    let Some(entry) = browse.details() else {
        return;
    };

    let block = panel(format!(" {} ", entry.name()), true, theme)
        .title_bottom(Line::from(Span::styled(
            " Esc to close ",
            Style::default().fg(theme.text_muted),
        )));

    let lines: Vec<Line> = file_details(entry)
        .into_iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(format!("{label:<10} "), Style::default().fg(theme.text_secondary)),
                Span::styled(value, Style::default().fg(theme.text_primary)),
            ])
        })
        .collect();

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}
