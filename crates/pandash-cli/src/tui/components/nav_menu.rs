//! Tab navigation, adapted to the layout mode.
//!
//! The sidebar variant also lists the accounts so the current selection
//! is visible next to the tabs.

use pandash_core::dashboard::Tab;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Tabs};
use ratatui::Frame;

use crate::tui::layout::LayoutMode;
use crate::tui::theme::Theme;

/// Accounts as shown in the sidebar.
#[derive(Debug, Clone, Copy)]
pub struct AccountList<'a> {
    /// Every account the key may use
    pub accounts: &'a [String],
    /// The selected one
    pub selected: Option<&'a str>,
}

/// Navigation menu component.
pub struct NavMenu;

impl NavMenu {
    /// Render the navigation menu based on layout mode.
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        active: Tab,
        accounts: AccountList<'_>,
        mode: LayoutMode,
        theme: &Theme,
    ) {
        match mode {
            LayoutMode::Split => Self::render_sidebar(frame, area, active, accounts, theme),
            LayoutMode::Tabs => Self::render_tabs(frame, area, active, theme),
            LayoutMode::Minimal => Self::render_minimal(frame, area, active, theme),
        }
    }

    fn render_sidebar(
        frame: &mut Frame,
        area: Rect,
        active: Tab,
        accounts: AccountList<'_>,
        theme: &Theme,
    ) {
        let block = Block::default()
            .title(" Pandash ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border));

        let mut items: Vec<ListItem> = Tab::all()
            .iter()
            .enumerate()
            .map(|(i, tab)| {
                let is_active = *tab == active;
                let style = if is_active {
                    Style::default()
                        .fg(theme.accent)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.text_primary)
                };
                let prefix = if is_active { "> " } else { "  " };
                ListItem::new(Line::from(Span::styled(
                    format!("{prefix}[{}] {}", i + 1, tab.title()),
                    style,
                )))
            })
            .collect();

        let rule = || {
            ListItem::new(Line::from(Span::styled(
                "──────────────────",
                Style::default().fg(theme.border),
            )))
        };

        items.push(rule());
        items.push(ListItem::new(Line::from(Span::styled(
            "Accounts  [ ]",
            Style::default().fg(theme.text_muted),
        ))));
        if accounts.accounts.is_empty() {
            items.push(ListItem::new(Line::from(Span::styled(
                "  (none)",
                Style::default().fg(theme.text_muted),
            ))));
        }
        for account in accounts.accounts {
            let is_selected = accounts.selected == Some(account.as_str());
            let (marker, style) = if is_selected {
                ("● ", Style::default().fg(theme.success).add_modifier(Modifier::BOLD))
            } else {
                ("  ", Style::default().fg(theme.text_secondary))
            };
            items.push(ListItem::new(Line::from(Span::styled(
                format!("{marker}{account}"),
                style,
            ))));
        }

        items.push(rule());
        items.push(ListItem::new(Line::from(Span::styled(
            "  [?] Help",
            Style::default().fg(theme.text_muted),
        ))));
        items.push(ListItem::new(Line::from(Span::styled(
            "  [X] Log out",
            Style::default().fg(theme.text_muted),
        ))));

        frame.render_widget(List::new(items).block(block), area);
    }

    fn render_tabs(frame: &mut Frame, area: Rect, active: Tab, theme: &Theme) {
        let titles: Vec<Line> = Tab::all()
            .iter()
            .enumerate()
            .map(|(i, tab)| Line::from(format!(" {} {} ", i + 1, tab.title())))
            .collect();
        let selected = Tab::all().iter().position(|t| *t == active).unwrap_or(0);

        let tabs = Tabs::new(titles)
            .select(selected)
            .style(Style::default().fg(theme.text_secondary))
            .highlight_style(
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            )
            .divider(Span::styled(" │ ", Style::default().fg(theme.border)));

        frame.render_widget(tabs, area);
    }

    fn render_minimal(frame: &mut Frame, area: Rect, active: Tab, theme: &Theme) {
        let spans: Vec<Span> = Tab::all()
            .iter()
            .enumerate()
            .map(|(i, tab)| {
                let style = if *tab == active {
                    Style::default()
                        .fg(theme.accent)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.text_muted)
                };
                Span::styled(format!("[{}]{} ", i + 1, &tab.title()[..1]), style)
            })
            .collect();

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
