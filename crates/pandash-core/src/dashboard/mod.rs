//! Host panel and per-tab controllers.
//!
//! Everything here runs on one task. Controllers share state through
//! `Rc<RefCell<_>>`, learn about each other only through the
//! [`EventBus`](crate::bus::EventBus), and reach the network only through the
//! [`Dispatch`] seam. Replies, timer ticks and debounced searches all come back
//! as [`Message`]s which the owner of the [`Dashboard`] feeds into
//! [`Dashboard::handle_message`].
//!
//! ```rust,ignore
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let ctx = AppContext::new(session, dispatcher, tx, export_dir);
//! let mut dashboard = Dashboard::new(ctx, true);
//! dashboard.start();
//! while let Some(message) = rx.recv().await {
//!     dashboard.handle_message(message);
//! }
//! ```

pub mod browse;
pub mod dispatch;
pub mod host;
pub mod knowledge;
pub mod queue;
pub mod settings;

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use tokio::sync::mpsc;

use crate::bus::EventBus;
use crate::error::Error;
use crate::session::SessionStore;

pub use browse::BrowseModule;
pub use dispatch::{
    ApiRequest, ApiResponse, ClientDispatcher, Completion, Dispatch, RecordingDispatcher, Target,
    Ticket,
};
pub use host::ControlPanel;
pub use knowledge::KnowledgeModule;
pub use queue::QueueModule;
pub use settings::SettingsModule;

/// Dashboard tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    /// Remote file browser
    #[default]
    Browse,
    /// Transfer and share queues
    Queue,
    /// Backend settings form
    Settings,
    /// Knowledge table
    Knowledge,
}

impl Tab {
    /// All tabs in display order.
    pub const fn all() -> &'static [Self] {
        &[Self::Browse, Self::Queue, Self::Settings, Self::Knowledge]
    }

    /// Stable lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Browse => "browse",
            Self::Queue => "queue",
            Self::Settings => "settings",
            Self::Knowledge => "knowledge",
        }
    }

    /// Display title.
    pub const fn title(self) -> &'static str {
        match self {
            Self::Browse => "Browse",
            Self::Queue => "Queue",
            Self::Settings => "Settings",
            Self::Knowledge => "Knowledge",
        }
    }

    /// Parse a tab name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    /// Next tab (wrapping).
    #[must_use]
    pub fn next(self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|t| *t == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    /// Previous tab (wrapping).
    #[must_use]
    pub fn prev(self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|t| *t == self).unwrap_or(0);
        all[(idx + all.len() - 1) % all.len()]
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Informational
    Info,
    /// An operation succeeded
    Success,
    /// An operation failed
    Error,
}

/// A transient user-facing message (the toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// When it was raised
    pub timestamp: chrono::DateTime<chrono::Local>,
    /// Severity
    pub level: NoticeLevel,
    /// Text
    pub message: String,
}

/// Everything the controllers post back to the owning loop.
#[derive(Debug)]
pub enum Message {
    /// A dispatched request finished
    Completed(Completion),
    /// The queue auto-refresh timer fired
    QueueTick {
        /// Timer generation the tick belongs to
        generation: u64,
    },
    /// The browse search debounce elapsed
    SearchFire {
        /// Debounce generation
        generation: u64,
        /// Keyword to search for
        keyword: String,
    },
}

/// Shared context handed to every controller.
#[derive(Clone)]
pub struct AppContext {
    /// Event bus
    pub bus: Rc<EventBus>,
    /// API key and selected account
    pub session: Rc<RefCell<SessionStore>>,
    /// Network seam
    pub dispatcher: Rc<dyn Dispatch>,
    /// App channel for timer ticks and debounced calls
    pub tx: mpsc::UnboundedSender<Message>,
    /// Currently visible tab
    pub active_tab: Rc<Cell<Tab>>,
    /// Pending user-facing notices
    pub notices: Rc<RefCell<Vec<Notice>>>,
    /// Directory CSV exports are written to
    pub export_dir: PathBuf,
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("active_tab", &self.active_tab.get())
            .field("export_dir", &self.export_dir)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Create a context with a fresh bus. The active tab starts at [`Tab::Browse`].
    pub fn new(
        session: Rc<RefCell<SessionStore>>,
        dispatcher: Rc<dyn Dispatch>,
        tx: mpsc::UnboundedSender<Message>,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            bus: Rc::new(EventBus::new()),
            session,
            dispatcher,
            tx,
            active_tab: Rc::new(Cell::new(Tab::default())),
            notices: Rc::new(RefCell::new(Vec::new())),
            export_dir,
        }
    }

    /// The selected account, if any.
    pub fn selected_account(&self) -> Option<String> {
        self.session.borrow().selected_account().map(str::to_owned)
    }

    /// Whether `tab` is the visible one.
    pub fn is_active(&self, tab: Tab) -> bool {
        self.active_tab.get() == tab
    }

    /// Raise a user-facing notice.
    pub fn notify(&self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.borrow_mut().push(Notice {
            timestamp: chrono::Local::now(),
            level,
            message: message.into(),
        });
    }

    /// Take all pending notices.
    pub fn drain_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.borrow_mut())
    }
}

/// The wired-up control panel: host plus every tab controller.
pub struct Dashboard {
    ctx: AppContext,
    host: ControlPanel,
    browse: Rc<RefCell<BrowseModule>>,
    queue: Rc<RefCell<QueueModule>>,
    settings: Rc<RefCell<SettingsModule>>,
    knowledge: Rc<RefCell<KnowledgeModule>>,
}

impl fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dashboard")
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    /// Build every controller and subscribe them to the bus.
    pub fn new(ctx: AppContext, auto_refresh: bool) -> Self {
        let host = ControlPanel::new(ctx.clone());

        let browse = Rc::new(RefCell::new(BrowseModule::new(ctx.clone())));
        BrowseModule::attach(&browse);

        let queue = Rc::new(RefCell::new(QueueModule::new(ctx.clone(), auto_refresh)));
        QueueModule::attach(&queue);

        let settings = Rc::new(RefCell::new(SettingsModule::new(ctx.clone())));
        SettingsModule::attach(&settings);

        let knowledge = Rc::new(RefCell::new(KnowledgeModule::new(ctx.clone())));
        KnowledgeModule::attach(&knowledge);

        Self {
            ctx,
            host,
            browse,
            queue,
            settings,
            knowledge,
        }
    }

    /// Resume a stored session, if there is one.
    pub fn start(&mut self) {
        self.host.start();
    }

    /// Shared context.
    pub const fn context(&self) -> &AppContext {
        &self.ctx
    }

    /// Host panel.
    pub const fn host(&self) -> &ControlPanel {
        &self.host
    }

    /// Host panel, mutably.
    pub fn host_mut(&mut self) -> &mut ControlPanel {
        &mut self.host
    }

    /// Browse controller.
    pub fn browse(&self) -> Ref<'_, BrowseModule> {
        self.browse.borrow()
    }

    /// Browse controller, mutably.
    pub fn browse_mut(&self) -> RefMut<'_, BrowseModule> {
        self.browse.borrow_mut()
    }

    /// Queue controller.
    pub fn queue(&self) -> Ref<'_, QueueModule> {
        self.queue.borrow()
    }

    /// Queue controller, mutably.
    pub fn queue_mut(&self) -> RefMut<'_, QueueModule> {
        self.queue.borrow_mut()
    }

    /// Settings controller.
    pub fn settings(&self) -> Ref<'_, SettingsModule> {
        self.settings.borrow()
    }

    /// Settings controller, mutably.
    pub fn settings_mut(&self) -> RefMut<'_, SettingsModule> {
        self.settings.borrow_mut()
    }

    /// Knowledge controller.
    pub fn knowledge(&self) -> Ref<'_, KnowledgeModule> {
        self.knowledge.borrow()
    }

    /// Knowledge controller, mutably.
    pub fn knowledge_mut(&self) -> RefMut<'_, KnowledgeModule> {
        self.knowledge.borrow_mut()
    }

    /// Currently visible tab.
    pub fn active_tab(&self) -> Tab {
        self.ctx.active_tab.get()
    }

    /// Switch tabs. See [`ControlPanel::switch_tab`].
    pub fn switch_tab(&mut self, tab: Tab) -> bool {
        self.host.switch_tab(tab)
    }

    /// Select an account. See [`ControlPanel::select_account`].
    pub fn select_account(&mut self, account: Option<String>) {
        self.host.select_account(account);
    }

    /// Whether a 401 asked for a full restart with fresh state.
    pub const fn needs_reload(&self) -> bool {
        self.host.reload_requested()
    }

    /// Take all pending notices.
    pub fn drain_notices(&self) -> Vec<Notice> {
        self.ctx.drain_notices()
    }

    /// Feed one message from the app channel.
    pub fn handle_message(&mut self, message: Message) {
        match message {
            Message::Completed(completion) => self.route(completion),
            Message::QueueTick { generation } => self.queue.borrow_mut().on_tick(generation),
            Message::SearchFire {
                generation,
                keyword,
            } => self.browse.borrow_mut().on_search_fire(generation, &keyword),
        }
    }

    fn route(&mut self, completion: Completion) {
        let Completion { ticket, result } = completion;

        if ticket.target != Target::ValidateKey && matches!(result, Err(Error::Unauthorized)) {
            self.host.handle_unauthorized();
            return;
        }

        match ticket.target {
            Target::ValidateKey | Target::Accounts | Target::Overview => {
                self.host.on_completion(ticket, result);
            }
            Target::Listing => self.browse.borrow_mut().on_completion(ticket, result),
            Target::Queues | Target::QueueAction | Target::QueueExport => {
                self.queue.borrow_mut().on_completion(ticket, result);
            }
            Target::SettingsLoad | Target::SettingsSave => {
                self.settings.borrow_mut().on_completion(ticket, result);
            }
            Target::KnowledgeEntries
            | Target::KnowledgeTags
            | Target::KnowledgeStatuses
            | Target::KnowledgeExport => {
                self.knowledge.borrow_mut().on_completion(ticket, result);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// A context backed by a recording dispatcher and an in-memory session.
    pub fn context() -> (
        AppContext,
        Rc<RecordingDispatcher>,
        mpsc::UnboundedReceiver<Message>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let recorder = Rc::new(RecordingDispatcher::new());
        let session = Rc::new(RefCell::new(SessionStore::in_memory()));
        let dispatcher: Rc<dyn Dispatch> = recorder.clone();
        let ctx = AppContext::new(session, dispatcher, tx, std::env::temp_dir());
        (ctx, recorder, rx)
    }

    /// Complete a recorded request.
    pub fn complete(
        dashboard: &mut Dashboard,
        ticket: Ticket,
        result: crate::error::Result<ApiResponse>,
    ) {
        dashboard.handle_message(Message::Completed(Completion { ticket, result }));
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{complete, context};
    use super::*;
    use crate::api::{AccountQueues, QueueSnapshot, ServerInfo};

    #[test]
    fn test_tab_navigation() {
        assert_eq!(Tab::Browse.next(), Tab::Queue);
        assert_eq!(Tab::Browse.prev(), Tab::Knowledge);
        assert_eq!(Tab::from_name("SETTINGS"), Some(Tab::Settings));
        assert_eq!(Tab::from_name("overview"), None);
    }

    #[test]
    fn test_unauthorized_reply_requests_reload() {
        let (ctx, recorder, _rx) = context();
        ctx.session.borrow_mut().set_api_key("k").unwrap();
        let mut dashboard = Dashboard::new(ctx.clone(), false);
        dashboard.start();

        let (ticket, _) = recorder.last(Target::Accounts).unwrap();
        complete(&mut dashboard, ticket, Err(Error::Unauthorized));

        assert!(dashboard.needs_reload());
        assert!(ctx.session.borrow().api_key().is_none());
    }

    #[test]
    fn test_account_selection_on_queue_tab_fetches_once() {
        let (ctx, recorder, _rx) = context();
        ctx.session.borrow_mut().set_api_key("k").unwrap();
        let mut dashboard = Dashboard::new(ctx, false);
        dashboard.start();

        let (ticket, _) = recorder.last(Target::Accounts).unwrap();
        complete(
            &mut dashboard,
            ticket,
            Ok(ApiResponse::Info(ServerInfo {
                accounts: vec!["A".into(), "B".into()],
                ..ServerInfo::default()
            })),
        );
        dashboard.switch_tab(Tab::Queue);
        recorder.take();

        dashboard.select_account(Some("B".into()));
        assert_eq!(recorder.count(Target::Queues), 1);

        let (ticket, _) = recorder.last(Target::Queues).unwrap();
        let mut snapshot = QueueSnapshot::default();
        let mut account = AccountQueues {
            available: true,
            ..AccountQueues::default()
        };
        account.transfer.status.pending = 2;
        account.transfer.status.running = 1;
        snapshot.accounts.insert("B".into(), account);
        complete(&mut dashboard, ticket, Ok(ApiResponse::Queues(snapshot)));

        let panel = dashboard.queue().panel();
        let view = panel.ready().expect("queue view");
        assert_eq!(view.transfer.counters.pending, 2);
        assert_eq!(view.transfer.counters.running, 1);
        assert_eq!(view.transfer.counters.completed, 0);
        assert_eq!(view.transfer.counters.failed, 0);
    }
}
