//! TUI application main loop.
//!
//! The app owns the [`Dashboard`] and the receiving end of its message
//! channel. Each tick it feeds finished requests, timer ticks and debounced
//! searches back into the controllers, mirrors a few flags into
//! [`AppState`], draws, then waits briefly for a key.

use std::cell::RefCell;
use std::io::{self, Stdout};
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use pandash_core::api::{ApiClient, Overview};
use pandash_core::config::Config;
use pandash_core::dashboard::{
    AppContext, ClientDispatcher, Dashboard, Dispatch, Message, NoticeLevel, Tab,
};
use pandash_core::knowledge::{Filters, KnowledgeEntry, COLUMNS, SORT_FIELDS, STATUS_ORDER};
use pandash_core::session::SessionStore;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem};
use ratatui::Terminal;
use tokio::sync::mpsc;

use super::action::Action;
use super::components::{AccountList, HelpOverlay, NavMenu, SpinnerStyle, StatusBar, StatusInfo};
use super::event::{map_key_event, EventHandler};
use super::layout::ComputedLayout;
use super::state::{AppState, InputMode, SettingsRow};
use super::theme::Theme;
use super::views;
use crate::ui::format_summary;

/// Knowledge page sizes offered by the page size toggle.
const PAGE_SIZES: [u32; 3] = [20, 50, 100];

/// TUI command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct TuiArgs {
    /// Tab to open after login
    pub tab: Option<String>,
    /// Theme name
    pub theme: Option<String>,
}

/// The dashboard TUI.
pub struct App {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    state: AppState,
    events: EventHandler,
    theme: Theme,
    should_quit: bool,
    config: Config,
    session: Rc<RefCell<SessionStore>>,
    dashboard: Dashboard,
    rx: mpsc::UnboundedReceiver<Message>,
    initial_tab: Tab,
}

impl App {
    /// Set up the terminal and start the dashboard.
    pub fn new(args: TuiArgs) -> Result<Self> {
        let config = crate::commands::load_config();
        let session = Rc::new(RefCell::new(crate::commands::load_session()));

        let initial_tab = args
            .tab
            .as_deref()
            .or(Some(config.ui.default_tab.as_str()))
            .and_then(Tab::from_name)
            .unwrap_or_default();
        let theme = Theme::from_name(args.theme.as_deref().unwrap_or(&config.ui.theme));

        let (dashboard, rx) = build_dashboard(&config, &session);

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(EnableMouseCapture)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        Ok(Self {
            terminal,
            state: AppState::default(),
            events: EventHandler::new(Duration::from_millis(100)),
            theme,
            should_quit: false,
            config,
            session,
            dashboard,
            rx,
            initial_tab,
        })
    }

    /// Run until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        let size = self.terminal.size()?;
        self.state.size = (size.width, size.height);

        let tick_rate = Duration::from_millis(100);

        loop {
            self.state.spinner.tick(SpinnerStyle::Braille);

            self.pump_messages();

            self.sync_state();

            self.draw()?;

            if let Ok(Some(event)) = tokio::time::timeout(tick_rate, self.events.next()).await {
                self.handle_event(&event);
                self.collect_notices();
            }

            if self.should_quit {
                break;
            }
        }

        self.events.cancel();
        Ok(())
    }

    /// Feed everything that arrived since the last tick into the dashboard.
    fn pump_messages(&mut self) {
        while let Ok(message) = self.rx.try_recv() {
            self.dashboard.handle_message(message);
        }
        self.collect_notices();

        if self.dashboard.needs_reload() {
            self.rebuild();
        }
    }

    fn collect_notices(&mut self) {
        for notice in self.dashboard.drain_notices() {
            self.state.push_notice(notice);
        }
    }

    /// Start over with a fresh dashboard and channel; the session is kept.
    fn rebuild(&mut self) {
        let (dashboard, rx) = build_dashboard(&self.config, &self.session);
        self.dashboard = dashboard;
        self.rx = rx;
        self.state.details_open = false;
        self.state.knowledge_cursor = 0;
        self.state.settings_cursor = 0;
    }

    fn sync_state(&mut self) {
        if self
            .state
            .set_authenticated(self.dashboard.host().is_authenticated())
        {
            self.dashboard.switch_tab(self.initial_tab);
        }
        self.state.active_tab = self.dashboard.active_tab();
        self.state.details_open = self.dashboard.browse().details().is_some();

        let rows = self
            .dashboard
            .knowledge()
            .result()
            .map_or(0, |r| r.entries.len());
        self.state.knowledge_cursor = self.state.knowledge_cursor.min(rows.saturating_sub(1));
    }

    fn draw(&mut self) -> Result<()> {
        let state = &self.state;
        let theme = &self.theme;
        let dashboard = &self.dashboard;
        let server = self.config.server.base_url.as_str();

        self.terminal.draw(|frame| {
            let size = frame.area();
            let drawer_open =
                state.authenticated && state.active_tab == Tab::Browse && state.details_open;
            let layout = ComputedLayout::compute(size, state.log_visible, drawer_open);

            let host = dashboard.host();
            let selected = host.selected_account();
            let queue = dashboard.queue();

            render_header(frame, layout.header, server, host.overview(), theme);

            NavMenu::render(
                frame,
                layout.navigation,
                state.active_tab,
                AccountList {
                    accounts: host.accounts(),
                    selected: selected.as_deref(),
                },
                layout.mode,
                theme,
            );

            views::render(frame, layout.content, dashboard, state, server, theme);

            if let Some(area) = layout.drawer {
                views::render_details(frame, area, &dashboard.browse(), theme);
            }

            StatusBar::render(
                frame,
                layout.status,
                state,
                StatusInfo {
                    account: selected.as_deref(),
                    polling: queue.is_polling().then(|| queue.interval()),
                },
                layout.mode,
                theme,
            );

            if let Some(area) = layout.log {
                render_log(frame, area, state, theme);
            }

            if state.help_visible {
                HelpOverlay::render(frame, size, state.active_tab, theme);
            }
        })?;

        Ok(())
    }

    fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Key(key) => {
                let action = map_key_event(*key, &self.state);
                self.handle_action(action);
            }
            Event::Resize(width, height) => {
                self.state.size = (*width, *height);
            }
            _ => {}
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::ToggleHelp => self.state.help_visible = !self.state.help_visible,
            Action::ToggleLog => self.state.log_visible = !self.state.log_visible,

            Action::SwitchTab(tab) => {
                self.dashboard.switch_tab(tab);
            }
            Action::NextTab => {
                self.dashboard.switch_tab(self.state.active_tab.next());
            }
            Action::PrevTab => {
                self.dashboard.switch_tab(self.state.active_tab.prev());
            }
            Action::NextAccount => self.dashboard.host_mut().cycle_account(true),
            Action::PrevAccount => self.dashboard.host_mut().cycle_account(false),
            Action::Refresh => self.refresh_active_tab(),
            Action::RefreshSummary => {
                if self.state.authenticated {
                    self.dashboard.host_mut().load_dashboard();
                }
            }
            Action::Logout => self.logout(),

            Action::ListUp => self.move_cursor(false),
            Action::ListDown => self.move_cursor(true),

            Action::BeginInput(mode) => self.begin_input(mode),
            Action::InputChar(c) => self.edit_input(|text| text.push(c)),
            Action::InputBackspace => self.edit_input(|text| {
                text.pop();
            }),
            Action::InputSubmit => self.submit_input(),
            Action::InputCancel => {
                if self.state.input_mode == InputMode::Search {
                    self.dashboard.browse_mut().clear_search();
                }
                self.state.finish_input();
            }

            Action::OpenEntry => self.dashboard.browse_mut().open_selected(),
            Action::GoUp => self.dashboard.browse_mut().go_up(),
            Action::BrowseBack => {
                let mut browse = self.dashboard.browse_mut();
                if browse.details().is_some() {
                    browse.close_details();
                } else if browse.searching().is_some() || !browse.search_input().is_empty() {
                    browse.clear_search();
                }
            }
            Action::CopyPath => {
                let path = self.dashboard.browse().current_path().to_string();
                self.copy_to_clipboard("path", path);
            }

            Action::ToggleQueueFocus => self.state.toggle_queue_focus(),
            Action::QueueControl(action) => {
                self.dashboard
                    .queue_mut()
                    .control(self.state.queue_focus, action);
            }
            Action::ExportQueue => self.dashboard.queue_mut().export(self.state.queue_focus),
            Action::ToggleAutoRefresh => {
                let enabled = !self.dashboard.queue().auto_refresh();
                self.dashboard.queue_mut().set_auto_refresh(enabled);
                let label = if enabled { "on" } else { "off" };
                self.state
                    .notify(NoticeLevel::Info, format!("Auto-refresh {label}"));
            }

            Action::EditSetting => self.edit_setting(),
            Action::SaveSettings => self.dashboard.settings_mut().save(),

            Action::PrevPage => {
                self.dashboard.knowledge_mut().prev_page();
                self.state.knowledge_cursor = 0;
            }
            Action::NextPage => {
                self.dashboard.knowledge_mut().next_page();
                self.state.knowledge_cursor = 0;
            }
            Action::CycleStatus => {
                let mut filters = self.dashboard.knowledge().filters().clone();
                filters.status = next_status(&filters.status);
                self.apply_filters(filters);
            }
            Action::CycleTag => {
                let mut filters = self.dashboard.knowledge().filters().clone();
                filters.tag = next_tag(self.dashboard.knowledge().tags(), &filters.tag);
                self.apply_filters(filters);
            }
            Action::CycleSort => {
                let next = next_sort_field(&self.dashboard.knowledge().filters().sort);
                self.dashboard.knowledge_mut().sort_by(next);
            }
            Action::ToggleOrder => {
                let field = self.dashboard.knowledge().filters().sort.clone();
                self.dashboard.knowledge_mut().sort_by(&field);
            }
            Action::CyclePageSize => {
                let size = next_page_size(self.dashboard.knowledge().page_size());
                self.dashboard.knowledge_mut().set_page_size(size);
                self.state.knowledge_cursor = 0;
            }
            Action::ResetFilters => {
                self.dashboard.knowledge_mut().reset_filters();
                self.state.knowledge_cursor = 0;
            }
            Action::ColumnLeft => AppState::step(&mut self.state.column_cursor, COLUMNS.len(), false),
            Action::ColumnRight => AppState::step(&mut self.state.column_cursor, COLUMNS.len(), true),
            Action::ToggleColumn => {
                if let Some(col) = COLUMNS.get(self.state.column_cursor) {
                    self.dashboard.knowledge_mut().toggle_column(col.key);
                }
            }
            Action::ExportKnowledge => self.dashboard.knowledge_mut().export(),
            Action::CopyLink => {
                if let Some(link) = self.selected_link() {
                    self.copy_to_clipboard("link", link);
                }
            }
            Action::OpenLink => {
                if let Some(link) = self.selected_link() {
                    if let Err(e) = open::that(&link) {
                        self.state
                            .notify(NoticeLevel::Error, format!("Could not open {link}: {e}"));
                    }
                }
            }

            Action::None => {}
        }
    }

    fn refresh_active_tab(&mut self) {
        match self.state.active_tab {
            Tab::Browse => self.dashboard.browse_mut().refresh(),
            Tab::Queue => self.dashboard.queue_mut().refresh(),
            Tab::Settings => self.dashboard.settings_mut().load(),
            Tab::Knowledge => self.dashboard.knowledge_mut().refresh(),
        }
    }

    fn logout(&mut self) {
        let cleared = self.session.borrow_mut().clear_api_key();
        if let Err(e) = cleared {
            self.state
                .notify(NoticeLevel::Error, format!("Failed to forget key: {e}"));
        }
        self.rebuild();
        self.state.notify(NoticeLevel::Info, "Logged out");
    }

    fn move_cursor(&mut self, down: bool) {
        match self.state.active_tab {
            Tab::Browse => self.dashboard.browse_mut().move_selection(down),
            Tab::Queue => {}
            Tab::Settings => {
                let rows = SettingsRow::all().len();
                AppState::step(&mut self.state.settings_cursor, rows, down);
            }
            Tab::Knowledge => {
                let rows = self
                    .dashboard
                    .knowledge()
                    .result()
                    .map_or(0, |r| r.entries.len());
                AppState::step(&mut self.state.knowledge_cursor, rows, down);
            }
        }
    }

    fn begin_input(&mut self, mode: InputMode) {
        let initial = {
            let knowledge = self.dashboard.knowledge();
            match mode {
                InputMode::KnowledgeSearch => knowledge.filters().search.clone(),
                InputMode::DateFrom => knowledge.filters().date_from.clone(),
                InputMode::DateTo => knowledge.filters().date_to.clone(),
                _ => String::new(),
            }
        };
        self.state.begin_input(mode, initial);
    }

    /// Apply `edit` to whatever text is being typed.
    fn edit_input(&mut self, edit: impl FnOnce(&mut String)) {
        if self.state.input_mode == InputMode::Search {
            let mut text = self.dashboard.browse().search_input().to_string();
            edit(&mut text);
            self.dashboard.browse_mut().set_search_input(text);
        } else {
            edit(&mut self.state.input);
        }
    }

    fn submit_input(&mut self) {
        let mode = self.state.input_mode;
        let text = self.state.finish_input();

        match mode {
            InputMode::Normal => {}
            InputMode::ApiKey => self.dashboard.host_mut().save_api_key(&text),
            InputMode::Search => self.dashboard.browse_mut().submit_search(),
            InputMode::EditField(field) => {
                self.dashboard
                    .settings_mut()
                    .form_mut()
                    .set_value(field, text.trim());
            }
            InputMode::KnowledgeSearch => {
                let mut filters = self.dashboard.knowledge().filters().clone();
                filters.search = text.trim().to_string();
                self.apply_filters(filters);
            }
            InputMode::DateFrom | InputMode::DateTo => match parse_date_filter(&text) {
                Ok(date) => {
                    let mut filters = self.dashboard.knowledge().filters().clone();
                    if mode == InputMode::DateFrom {
                        filters.date_from = date;
                    } else {
                        filters.date_to = date;
                    }
                    self.apply_filters(filters);
                }
                Err(message) => self.state.notify(NoticeLevel::Error, message),
            },
            InputMode::PageJump => match text.trim().parse::<i64>() {
                Ok(page) => {
                    self.dashboard.knowledge_mut().go_to_page(page);
                    self.state.knowledge_cursor = 0;
                }
                Err(_) => self
                    .state
                    .notify(NoticeLevel::Error, "Page must be a whole number"),
            },
        }
    }

    fn apply_filters(&mut self, filters: Filters) {
        self.dashboard.knowledge_mut().apply_filters(filters);
        self.state.knowledge_cursor = 0;
    }

    fn edit_setting(&mut self) {
        let Some(row) = self.state.settings_row() else {
            return;
        };
        if self.dashboard.settings().current().is_none() {
            return;
        }

        match row {
            SettingsRow::Field(field) => {
                let value = self.dashboard.settings().form().value(field).to_string();
                self.state.begin_input(InputMode::EditField(field), value);
            }
            SettingsRow::RateLimit => {
                let mut settings = self.dashboard.settings_mut();
                let form = settings.form_mut();
                form.rate_limit_enabled = !form.rate_limit_enabled;
            }
            SettingsRow::KeyRetention => {
                let mut settings = self.dashboard.settings_mut();
                let form = settings.form_mut();
                form.api_key_retention = !form.api_key_retention;
            }
        }
    }

    fn selected_link(&self) -> Option<String> {
        let knowledge = self.dashboard.knowledge();
        let entry = knowledge
            .result()
            .and_then(|r| r.entries.get(self.state.knowledge_cursor))?;
        preferred_link(entry).map(str::to_string)
    }

    fn copy_to_clipboard(&mut self, what: &str, text: String) {
        match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
            Ok(()) => self
                .state
                .notify(NoticeLevel::Success, format!("Copied {what} to clipboard")),
            Err(e) => self
                .state
                .notify(NoticeLevel::Error, format!("Clipboard unavailable: {e}")),
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = self.terminal.backend_mut().execute(LeaveAlternateScreen);
        let _ = self.terminal.backend_mut().execute(DisableMouseCapture);
        let _ = self.terminal.show_cursor();
    }
}

/// A started dashboard wired to a fresh channel.
fn build_dashboard(
    config: &Config,
    session: &Rc<RefCell<SessionStore>>,
) -> (Dashboard, mpsc::UnboundedReceiver<Message>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let dispatcher: Rc<dyn Dispatch> = Rc::new(ClientDispatcher::new(
        ApiClient::from_config(&config.server),
        Rc::clone(session),
        tx.clone(),
    ));
    let ctx = AppContext::new(
        Rc::clone(session),
        dispatcher,
        tx,
        config.export.resolve_directory(),
    );

    let mut dashboard = Dashboard::new(ctx, config.ui.auto_refresh);
    dashboard.start();
    (dashboard, rx)
}

fn render_header(
    frame: &mut ratatui::Frame,
    area: Rect,
    server: &str,
    overview: Option<&Overview>,
    theme: &Theme,
) {
    let mut spans = vec![
        Span::styled(
            format!(" Pandash v{} ", pandash_core::VERSION),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(server.to_string(), Style::default().fg(theme.text_muted)),
    ];
    if let Some(overview) = overview {
        spans.push(Span::styled(
            format!("  {}", format_summary(&overview.queues_summary)),
            Style::default().fg(theme.text_secondary),
        ));
    }
    frame.render_widget(Line::from(spans), area);
}

fn render_log(frame: &mut ratatui::Frame, area: Rect, state: &AppState, theme: &Theme) {
    let block = Block::default()
        .title(" Log ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(area);

    let items: Vec<ListItem> = state
        .log
        .iter()
        .rev()
        .take(inner.height as usize)
        .map(|notice| {
            let text = format!(
                "{} [{}] {}",
                notice.timestamp.format("%H:%M:%S"),
                level_label(notice.level),
                notice.message
            );
            ListItem::new(Span::styled(
                text,
                Style::default().fg(theme.notice_color(notice.level)),
            ))
        })
        .collect();

    let list = if items.is_empty() {
        List::new(vec![ListItem::new(Span::styled(
            "No notices yet",
            Style::default().fg(theme.text_muted),
        ))])
    } else {
        List::new(items)
    };
    frame.render_widget(list.block(block), area);
}

const fn level_label(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "INFO",
        NoticeLevel::Success => "OK",
        NoticeLevel::Error => "ERROR",
    }
}

/// Status filter after `current`: none, each status in turn, none again.
fn next_status(current: &[String]) -> Vec<String> {
    let next = match current {
        [] => STATUS_ORDER.first(),
        [only] => STATUS_ORDER
            .iter()
            .position(|s| s == only)
            .and_then(|i| STATUS_ORDER.get(i + 1)),
        _ => None,
    };
    next.map(|s| vec![(*s).to_string()]).unwrap_or_default()
}

/// Tag filter after `current`: none, each known tag in turn, none again.
fn next_tag(tags: &[String], current: &str) -> String {
    if current.is_empty() {
        return tags.first().cloned().unwrap_or_default();
    }
    tags.iter()
        .position(|t| t == current)
        .and_then(|i| tags.get(i + 1))
        .cloned()
        .unwrap_or_default()
}

fn next_sort_field(current: &str) -> &'static str {
    let i = SORT_FIELDS.iter().position(|f| *f == current).unwrap_or(0);
    SORT_FIELDS[(i + 1) % SORT_FIELDS.len()]
}

fn next_page_size(current: u32) -> u32 {
    PAGE_SIZES
        .iter()
        .copied()
        .find(|size| *size > current)
        .unwrap_or(PAGE_SIZES[0])
}

/// Accept an empty string (no bound) or a `YYYY-MM-DD` date.
fn parse_date_filter(input: &str) -> std::result::Result<String, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(String::new());
    }
    chrono::NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| format!("'{input}' is not a YYYY-MM-DD date"))
}

/// The link worth copying: the re-shared one when present, else the original.
fn preferred_link(entry: &KnowledgeEntry) -> Option<&str> {
    entry.raw("new_link").or_else(|| entry.raw("original_link"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_status_cycles_through_none() {
        let mut status = Vec::new();
        let mut seen = Vec::new();
        for _ in 0..=STATUS_ORDER.len() {
            status = next_status(&status);
            seen.push(status.first().cloned().unwrap_or_default());
        }
        assert_eq!(seen.first().map(String::as_str), Some("pending"));
        assert_eq!(seen.last().map(String::as_str), Some(""));
        assert!(next_status(&["a".into(), "b".into()]).is_empty());
    }

    #[test]
    fn test_next_tag() {
        let tags = vec!["books".to_string(), "video".to_string()];
        assert_eq!(next_tag(&tags, ""), "books");
        assert_eq!(next_tag(&tags, "books"), "video");
        assert_eq!(next_tag(&tags, "video"), "");
        assert_eq!(next_tag(&tags, "gone"), "");
        assert_eq!(next_tag(&[], ""), "");
    }

    #[test]
    fn test_next_sort_field_wraps() {
        assert_eq!(next_sort_field("created_at"), "updated_at");
        assert_eq!(next_sort_field("status"), "created_at");
        assert_eq!(next_sort_field("unknown"), "updated_at");
    }

    #[test]
    fn test_next_page_size() {
        assert_eq!(next_page_size(20), 50);
        assert_eq!(next_page_size(50), 100);
        assert_eq!(next_page_size(100), 20);
        assert_eq!(next_page_size(30), 50);
    }

    #[test]
    fn test_parse_date_filter() {
        assert_eq!(parse_date_filter(" 2024-03-01 "), Ok("2024-03-01".to_string()));
        assert_eq!(parse_date_filter(""), Ok(String::new()));
        assert!(parse_date_filter("03/01/2024").is_err());
        assert!(parse_date_filter("2024-02-30").is_err());
    }

    #[test]
    fn test_preferred_link() {
        let mut entry = KnowledgeEntry {
            original_link: Some("https://pan.example/s/orig".into()),
            ..KnowledgeEntry::default()
        };
        assert_eq!(preferred_link(&entry), Some("https://pan.example/s/orig"));

        entry.new_link = Some("https://pan.example/s/new".into());
        assert_eq!(preferred_link(&entry), Some("https://pan.example/s/new"));

        entry.new_link = Some(String::new());
        assert_eq!(preferred_link(&entry), Some("https://pan.example/s/orig"));
    }
}
