//! Knowledge table: summary cards, filters, paged rows, column picker.

use pandash_core::dashboard::KnowledgeModule;
use pandash_core::knowledge::{column, format_cell, status_label, Filters, COLUMNS};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table, TableState};
use ratatui::Frame;

use crate::tui::components::{Spinner, TextInput};
use crate::tui::state::{AppState, InputMode};
use crate::tui::theme::Theme;

use super::{hints, message, panel};

const KNOWLEDGE_INPUTS: [InputMode; 4] = [
    InputMode::KnowledgeSearch,
    InputMode::DateFrom,
    InputMode::DateTo,
    InputMode::PageJump,
];

pub fn render(
    frame: &mut Frame,
    area: Rect,
    knowledge: &KnowledgeModule,
    state: &AppState,
    theme: &Theme,
) {
    let typing = KNOWLEDGE_INPUTS.contains(&state.input_mode);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(if typing { 3 } else { 1 }),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    frame.render_widget(Paragraph::new(summary_line(knowledge, theme)), rows[0]);

    if typing {
        TextInput::new(state.input_mode.prompt(), &state.input).render(frame, rows[1], theme);
    } else {
        frame.render_widget(
            Paragraph::new(filter_line(knowledge.filters(), knowledge.page_size(), theme)),
            rows[1],
        );
    }

    render_table(frame, rows[2], knowledge, state, theme);
    frame.render_widget(
        Paragraph::new(column_picker(knowledge.columns(), state.column_cursor, theme)),
        rows[3],
    );
    frame.render_widget(Paragraph::new(footer_line(knowledge, theme)), rows[4]);
}

fn summary_line(knowledge: &KnowledgeModule, theme: &Theme) -> Line<'static> {
    let cards = knowledge.summary();
    if cards.is_empty() {
        return Line::from(Span::styled(
            "No status summary yet",
            Style::default().fg(theme.text_muted),
        ));
    }

    let mut spans = Vec::new();
    for (status, count) in cards {
        spans.push(Span::styled(
            format!(" {count} "),
            Style::default()
                .fg(theme.status_color(status))
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!("{}  ", status_label(status)),
            Style::default().fg(theme.text_secondary),
        ));
    }
    Line::from(spans)
}

fn filter_line(filters: &Filters, page_size: u32, theme: &Theme) -> Line<'static> {
    let label = Style::default().fg(theme.text_muted);
    let value = Style::default().fg(theme.text_primary);
    let or_any = |s: &str| if s.is_empty() { "any".to_string() } else { s.to_string() };

    let status = match filters.status.as_slice() {
        [] => "any".to_string(),
        [only] => only.clone(),
        many => many.join("+"),
    };
    let dates = if filters.date_from.is_empty() && filters.date_to.is_empty() {
        "any".to_string()
    } else {
        format!("{}..{}", filters.date_from, filters.date_to)
    };

    Line::from(vec![
        Span::styled("search ", label),
        Span::styled(format!("{}  ", or_any(&filters.search)), value),
        Span::styled("status ", label),
        Span::styled(format!("{status}  "), value),
        Span::styled("tag ", label),
        Span::styled(format!("{}  ", or_any(&filters.tag)), value),
        Span::styled("created ", label),
        Span::styled(format!("{dates}  "), value),
        Span::styled("sort ", label),
        Span::styled(
            format!("{} {}  ", filters.sort, filters.order.as_str()),
            value,
        ),
        Span::styled("per page ", label),
        Span::styled(page_size.to_string(), value),
    ])
}

fn render_table(
    frame: &mut Frame,
    area: Rect,
    knowledge: &KnowledgeModule,
    state: &AppState,
    theme: &Theme,
) {
    let block = panel(" Knowledge ".to_string(), true, theme);

    if let Some(error) = knowledge.error() {
        message(
            frame,
            area,
            block,
            vec![
                Line::from(""),
                Line::from(Span::styled(error.to_string(), Style::default().fg(theme.error))),
                Line::from(Span::styled(
                    "Press r to retry",
                    Style::default().fg(theme.text_muted),
                )),
            ],
        );
        return;
    }

    let entries = knowledge.result().map(|r| r.entries.as_slice()).unwrap_or_default();
    if entries.is_empty() {
        if knowledge.is_loading() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            Spinner::new("Loading entries")
                .spinner_style(Style::default().fg(theme.accent))
                .render(frame, inner, &state.spinner);
        } else {
            message(
                frame,
                area,
                block,
                vec![
                    Line::from(""),
                    Line::from(Span::styled(
                        "No entries match these filters",
                        Style::default().fg(theme.text_muted),
                    )),
                ],
            );
        }
        return;
    }

    let keys = knowledge.columns();
    let header = Row::new(
        keys.iter()
            .map(|key| column(key).map_or(*key, |c| c.label))
            .collect::<Vec<_>>(),
    )
    .style(
        Style::default()
            .fg(theme.text_muted)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = entries
        .iter()
        .map(|entry| {
            Row::new(
                keys.iter()
                    .map(|key| {
                        let cell = Cell::from(format_cell(key, entry));
                        if *key == "status" {
                            let raw = entry.raw("status").unwrap_or_default();
                            cell.style(Style::default().fg(theme.status_color(raw)))
                        } else {
                            cell
                        }
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .collect();

    let widths: Vec<Constraint> = keys.iter().map(|key| column_width(key)).collect();
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().bg(theme.selection));

    let selected = state.knowledge_cursor.min(entries.len() - 1);
    let mut table_state = TableState::default().with_selected(Some(selected));
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn column_width(key: &str) -> Constraint {
    match key {
        "article_title" | "new_title" => Constraint::Min(20),
        "article_url" | "original_link" | "new_link" | "error_message" => Constraint::Min(16),
        "original_password" | "new_password" => Constraint::Length(6),
        "created_at" | "updated_at" => Constraint::Length(16),
        "status" => Constraint::Length(11),
        _ => Constraint::Length(10),
    }
}

fn column_picker(visible: &[&'static str], cursor: usize, theme: &Theme) -> Line<'static> {
    let mut spans = vec![Span::styled("cols ", Style::default().fg(theme.text_muted))];
    for (i, col) in COLUMNS.iter().enumerate() {
        let on = visible.contains(&col.key);
        let mut style = Style::default().fg(if on {
            theme.text_primary
        } else {
            theme.text_muted
        });
        if i == cursor {
            style = style.bg(theme.selection).add_modifier(Modifier::BOLD);
        }
        let mark = if on { "■" } else { "□" };
        spans.push(Span::styled(format!("{mark}{}", col.label), style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn footer_line(knowledge: &KnowledgeModule, theme: &Theme) -> Line<'static> {
    let pagination = knowledge.pagination();
    let mut line = hints(&[("p/n", "Page"), ("g", "Go to"), ("e", "Export")], theme);
    line.spans.insert(
        0,
        Span::styled(
            format!(
                "Page {} of {}  {} entries  ",
                pagination.page,
                pagination.total_pages.max(1),
                pagination.total
            ),
            Style::default().fg(theme.text_secondary),
        ),
    );
    line
}
