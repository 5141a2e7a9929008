//! Backend settings form with live validation.

use pandash_core::dashboard::SettingsModule;
use pandash_core::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::components::{LoadingIndicator, SpinnerStyle};
use crate::tui::state::{AppState, InputMode, SettingsRow};
use crate::tui::theme::Theme;

use super::{hints, message, panel};

pub fn render(
    frame: &mut Frame,
    area: Rect,
    settings: &SettingsModule,
    state: &AppState,
    theme: &Theme,
) {
    if settings.current().is_none() {
        let block = panel(" Settings ".to_string(), false, theme);
        if settings.is_loading() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            LoadingIndicator::new("Loading settings")
                .accent_style(Style::default().fg(theme.accent))
                .render(frame, inner, &state.spinner);
        } else {
            message(
                frame,
                area,
                block,
                vec![
                    Line::from(""),
                    Line::from("Settings are not loaded."),
                    Line::from(Span::styled(
                        "Press r to load them.",
                        Style::default().fg(theme.text_muted),
                    )),
                ],
            );
        }
        return;
    }

    let problems = validation_problems(settings);
    let problem_height = if problems.is_empty() {
        0
    } else {
        u16::try_from(problems.len()).unwrap_or(u16::MAX).saturating_add(2)
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),
            Constraint::Length(problem_height),
            Constraint::Length(1),
        ])
        .split(area);

    render_form(frame, rows[0], settings, state, theme);

    if !problems.is_empty() {
        let lines: Vec<Line> = problems
            .into_iter()
            .map(|p| Line::from(Span::styled(format!("• {p}"), Style::default().fg(theme.error))))
            .collect();
        frame.render_widget(
            Paragraph::new(lines)
                .block(panel(" Fix before saving ".to_string(), false, theme))
                .wrap(Wrap { trim: true }),
            rows[1],
        );
    }

    let footer = if settings.is_saving() {
        Line::from(Span::styled(
            format!("{} Saving", state.spinner.current_frame(SpinnerStyle::Braille)),
            Style::default().fg(theme.accent),
        ))
    } else {
        hints(
            &[("Enter", "Edit"), ("S", "Save"), ("r", "Reload")],
            theme,
        )
    };
    frame.render_widget(Paragraph::new(footer), rows[2]);
}

fn render_form(
    frame: &mut Frame,
    area: Rect,
    settings: &SettingsModule,
    state: &AppState,
    theme: &Theme,
) {
    let form = settings.form();
    let label_style = Style::default().fg(theme.text_secondary);
    let value_style = Style::default().fg(theme.text_primary);

    let items: Vec<ListItem> = SettingsRow::all()
        .into_iter()
        .map(|row| {
            let line = match row {
                SettingsRow::Field(field) => {
                    let editing = state.input_mode == InputMode::EditField(field);
                    let mut spans = vec![Span::styled(format!("{:<34}", field.label()), label_style)];
                    if editing {
                        spans.push(Span::styled(
                            state.input.clone(),
                            Style::default()
                                .fg(theme.accent)
                                .add_modifier(Modifier::BOLD),
                        ));
                        spans.push(Span::styled("_", Style::default().fg(theme.accent)));
                    } else {
                        spans.push(Span::styled(form.value(field).to_string(), value_style));
                    }
                    Line::from(spans)
                }
                SettingsRow::RateLimit => toggle_line(
                    "Rate limiting enabled",
                    form.rate_limit_enabled,
                    label_style,
                    theme,
                ),
                SettingsRow::KeyRetention => toggle_line(
                    "Remember API key in browser",
                    form.api_key_retention,
                    label_style,
                    theme,
                ),
            };
            ListItem::new(line)
        })
        .collect();

    let dirty = settings
        .current()
        .is_some_and(|current| form.collect(Some(current)).ok().as_ref() != Some(current));
    let title = if dirty {
        " Settings (modified) "
    } else {
        " Settings "
    };

    let list = List::new(items)
        .block(panel(title.to_string(), true, theme))
        .highlight_style(Style::default().bg(theme.selection))
        .highlight_symbol("> ");
    let mut list_state = ListState::default().with_selected(Some(state.settings_cursor));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn toggle_line(label: &str, on: bool, label_style: Style, theme: &Theme) -> Line<'static> {
    let (mark, color) = if on {
        ("[x]", theme.success)
    } else {
        ("[ ]", theme.text_muted)
    };
    Line::from(vec![
        Span::styled(format!("{label:<34}"), label_style),
        Span::styled(mark, Style::default().fg(color)),
    ])
}

/// Every reason the current form would be rejected on save.
fn validation_problems(settings: &SettingsModule) -> Vec<String> {
    match settings.form().collect(settings.current()) {
        Ok(_) => Vec::new(),
        Err(Error::Validation(errors)) => errors,
        Err(e) => vec![e.to_string()],
    }
}
