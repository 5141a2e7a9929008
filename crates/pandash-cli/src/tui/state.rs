//! TUI-local state.
//!
//! Everything the dashboard controllers own (entries, snapshots, forms,
//! pagination) is read from them at draw time. This holds only what is
//! purely presentational: cursors, panel toggles, the text being typed
//! and the notice log.

use pandash_core::api::QueueKind;
use pandash_core::dashboard::{Notice, NoticeLevel, Tab};
use pandash_core::settings::FormField;

use super::components::SpinnerState;

/// Notices kept for the log panel.
pub const LOG_CAPACITY: usize = 200;

/// How long a notice stays in the status bar, in seconds.
pub const NOTICE_TTL_SECS: i64 = 5;

/// What the keyboard is typing into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Keys are commands
    #[default]
    Normal,
    /// Login prompt
    ApiKey,
    /// Browse search box; the text lives in the browse controller
    Search,
    /// A numeric settings field
    EditField(FormField),
    /// Knowledge keyword filter
    KnowledgeSearch,
    /// Knowledge `date_from` filter
    DateFrom,
    /// Knowledge `date_to` filter
    DateTo,
    /// Knowledge "go to page"
    PageJump,
}

impl InputMode {
    /// Title of the input box.
    pub const fn prompt(self) -> &'static str {
        match self {
            Self::Normal => "",
            Self::ApiKey => "API key",
            Self::Search => "Search this folder",
            Self::EditField(field) => field.label(),
            Self::KnowledgeSearch => "Search titles and links",
            Self::DateFrom => "Created from (YYYY-MM-DD)",
            Self::DateTo => "Created to (YYYY-MM-DD)",
            Self::PageJump => "Go to page",
        }
    }

    /// Whether keys are being typed into a box.
    pub const fn is_typing(self) -> bool {
        !matches!(self, Self::Normal)
    }
}

/// One row of the settings view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsRow {
    /// Numeric field
    Field(FormField),
    /// `rate_limit.enabled`
    RateLimit,
    /// `ui.api_key_retention`
    KeyRetention,
}

impl SettingsRow {
    /// Every row in display order.
    pub fn all() -> Vec<Self> {
        FormField::all()
            .iter()
            .copied()
            .map(Self::Field)
            .chain([Self::RateLimit, Self::KeyRetention])
            .collect()
    }
}

/// Presentation state of the TUI.
#[derive(Debug)]
pub struct AppState {
    /// Tab the dashboard is showing, mirrored every tick
    pub active_tab: Tab,
    /// Whether a key has been validated, mirrored every tick
    pub authenticated: bool,
    /// Whether the browse details drawer is open, mirrored every tick
    pub details_open: bool,
    /// Current input target
    pub input_mode: InputMode,
    /// Text typed so far (all modes except browse search)
    pub input: String,
    /// Queue section receiving controls
    pub queue_focus: QueueKind,
    /// Highlighted settings row
    pub settings_cursor: usize,
    /// Highlighted knowledge row
    pub knowledge_cursor: usize,
    /// Highlighted column in the column picker
    pub column_cursor: usize,
    /// Is the notice log visible
    pub log_visible: bool,
    /// Is the help overlay visible
    pub help_visible: bool,
    /// Notices, oldest first
    pub log: Vec<Notice>,
    /// Terminal size (width, height)
    pub size: (u16, u16),
    /// Spinner animation
    pub spinner: SpinnerState,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            active_tab: Tab::default(),
            authenticated: false,
            details_open: false,
            input_mode: InputMode::ApiKey,
            input: String::new(),
            queue_focus: QueueKind::Transfer,
            settings_cursor: 0,
            knowledge_cursor: 0,
            column_cursor: 0,
            log_visible: false,
            help_visible: false,
            log: Vec::new(),
            size: (0, 0),
            spinner: SpinnerState::default(),
        }
    }
}

impl AppState {
    /// Append a notice, dropping the oldest past [`LOG_CAPACITY`].
    pub fn push_notice(&mut self, notice: Notice) {
        self.log.push(notice);
        if self.log.len() > LOG_CAPACITY {
            let excess = self.log.len() - LOG_CAPACITY;
            self.log.drain(..excess);
        }
    }

    /// Record a notice raised by the TUI itself.
    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.push_notice(Notice {
            timestamp: chrono::Local::now(),
            level,
            message: message.into(),
        });
    }

    /// The newest notice if it is younger than [`NOTICE_TTL_SECS`].
    pub fn current_notice(&self) -> Option<&Notice> {
        self.log.last().filter(|n| {
            (chrono::Local::now() - n.timestamp).num_seconds() < NOTICE_TTL_SECS
        })
    }

    /// Start typing into `mode`, seeding the box with `initial`.
    pub fn begin_input(&mut self, mode: InputMode, initial: impl Into<String>) {
        self.input_mode = mode;
        self.input = initial.into();
    }

    /// Leave input mode, returning what was typed.
    pub fn finish_input(&mut self) -> String {
        self.input_mode = if self.authenticated {
            InputMode::Normal
        } else {
            InputMode::ApiKey
        };
        std::mem::take(&mut self.input)
    }

    /// Mirror the dashboard's authentication state.
    ///
    /// Losing authentication forces the login prompt; gaining it leaves
    /// the prompt. Returns `true` when the state flipped to authenticated.
    pub fn set_authenticated(&mut self, authenticated: bool) -> bool {
        let gained = authenticated && !self.authenticated;
        if authenticated != self.authenticated {
            self.authenticated = authenticated;
            self.input.clear();
            self.input_mode = if authenticated {
                InputMode::Normal
            } else {
                InputMode::ApiKey
            };
        }
        gained
    }

    /// Move a cursor within `len` rows.
    pub fn step(cursor: &mut usize, len: usize, down: bool) {
        if len == 0 {
            *cursor = 0;
        } else if down {
            *cursor = (*cursor + 1).min(len - 1);
        } else {
            *cursor = cursor.saturating_sub(1);
        }
    }

    /// The highlighted settings row.
    pub fn settings_row(&self) -> Option<SettingsRow> {
        SettingsRow::all().get(self.settings_cursor).copied()
    }

    /// Switch which queue receives controls.
    pub fn toggle_queue_focus(&mut self) {
        self.queue_focus = match self.queue_focus {
            QueueKind::Transfer => QueueKind::Share,
            QueueKind::Share => QueueKind::Transfer,
        };
    }
}
