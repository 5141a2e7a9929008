//! Transfer and share queues of the selected account.

use pandash_core::api::QueueKind;
use pandash_core::dashboard::queue::{AccountView, QueuePanel, QueueSection};
use pandash_core::dashboard::QueueModule;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table};
use ratatui::Frame;

use crate::tui::components::{Spinner, SpinnerStyle};
use crate::tui::state::AppState;
use crate::tui::theme::Theme;
use crate::ui::{format_counters, loop_state};

use super::{hints, message, panel};

pub fn render(frame: &mut Frame, area: Rect, queue: &QueueModule, state: &AppState, theme: &Theme) {
    let block = panel(" Queues ".to_string(), false, theme);

    match queue.panel() {
        QueuePanel::NoAccount => message(
            frame,
            area,
            block,
            vec![
                Line::from(""),
                Line::from("No account selected."),
                Line::from(Span::styled(
                    "Use [ and ] to pick one.",
                    Style::default().fg(theme.text_muted),
                )),
            ],
        ),
        QueuePanel::Loading => {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let label = format!(
                "Loading queues for {}",
                queue.current_account().unwrap_or_default()
            );
            Spinner::new(&label)
                .spinner_style(Style::default().fg(theme.accent))
                .render(frame, inner, &state.spinner);
        }
        QueuePanel::Failed(error) => message(
            frame,
            area,
            block,
            vec![
                Line::from(""),
                Line::from(Span::styled(error, Style::default().fg(theme.error))),
                Line::from(Span::styled(
                    "The next refresh retries. Press r to retry now.",
                    Style::default().fg(theme.text_muted),
                )),
            ],
        ),
        QueuePanel::Unavailable { account, reason } => message(
            frame,
            area,
            block,
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("Account {account} is unavailable"),
                    Style::default().fg(theme.warning),
                )),
                Line::from(Span::styled(
                    reason.unwrap_or_else(|| "no reason given".to_string()),
                    Style::default().fg(theme.text_muted),
                )),
            ],
        ),
        QueuePanel::Ready(view) => render_ready(frame, area, queue, &view, state, theme),
    }
}

fn render_ready(
    frame: &mut Frame,
    area: Rect,
    queue: &QueueModule,
    view: &AccountView,
    state: &AppState,
    theme: &Theme,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Percentage(50),
            Constraint::Percentage(50),
            Constraint::Length(1),
        ])
        .split(area);

    let polling = if queue.is_polling() {
        format!("every {}s", queue.interval().as_secs_f64())
    } else {
        "off".to_string()
    };
    let mut summary = vec![
        Span::styled(
            view.account.clone(),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  updated {}  auto-refresh {polling}", view.updated_at),
            Style::default().fg(theme.text_secondary),
        ),
    ];
    if queue.is_loading() {
        summary.push(Span::styled(
            format!("  {}", state.spinner.current_frame(SpinnerStyle::Braille)),
            Style::default().fg(theme.accent),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(summary)), rows[0]);

    for (kind, area) in [(QueueKind::Transfer, rows[1]), (QueueKind::Share, rows[2])] {
        render_section(frame, area, view.section(kind), state.queue_focus == kind, theme);
    }

    frame.render_widget(
        Paragraph::new(hints(
            &[
                ("s", "Start"),
                ("p", "Pause"),
                ("u", "Resume"),
                ("x", "Stop"),
                ("C", "Clear"),
                ("e", "Export"),
                ("a", "Auto"),
            ],
            theme,
        )),
        rows[3],
    );
}

fn render_section(
    frame: &mut Frame,
    area: Rect,
    section: &QueueSection,
    focused: bool,
    theme: &Theme,
) {
    let state_label = loop_state(section.is_running, section.is_paused);
    let state_color = match state_label {
        "running" => theme.success,
        "paused" => theme.warning,
        _ => theme.text_muted,
    };
    let title = match section.kind {
        QueueKind::Transfer => " Transfer queue ",
        QueueKind::Share => " Share queue ",
    };

    let mut block = panel(title.to_string(), focused, theme)
        .title(Line::from(Span::styled(
            format!(" {state_label} "),
            Style::default().fg(state_color),
        )))
        .title_bottom(Line::from(Span::styled(
            format!(" {} ", format_counters(&section.counters)),
            Style::default().fg(theme.text_secondary),
        )));
    if let Some(note) = section.overflow_note() {
        block = block.title_bottom(
            Line::from(Span::styled(
                format!(" {note} "),
                Style::default().fg(theme.text_muted),
            ))
            .right_aligned(),
        );
    }

    if section.rows.is_empty() {
        message(
            frame,
            area,
            block,
            vec![Line::from(Span::styled(
                "Queue is empty",
                Style::default().fg(theme.text_muted),
            ))],
        );
        return;
    }

    let (primary, secondary) = match section.kind {
        QueueKind::Transfer => ("Link", "Target"),
        QueueKind::Share => ("File", "Share link"),
    };
    let rows: Vec<Row> = section
        .rows
        .iter()
        .map(|row| {
            Row::new(vec![
                Cell::from(row.status.clone())
                    .style(Style::default().fg(theme.status_color(&row.status.to_lowercase()))),
                Cell::from(row.primary.clone()),
                Cell::from(row.secondary.clone())
                    .style(Style::default().fg(theme.text_secondary)),
                Cell::from(row.created_at.clone()).style(Style::default().fg(theme.text_muted)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Min(20),
            Constraint::Min(16),
            Constraint::Length(19),
        ],
    )
    .header(
        Row::new(vec!["Status", primary, secondary, "Created"])
            .style(Style::default().fg(theme.text_muted).add_modifier(Modifier::BOLD)),
    )
    .block(block);

    frame.render_widget(table, area);
}
