//! Queue tab: per-account transfer and share queues with auto-refresh.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use super::dispatch::{unexpected, ApiRequest, ApiResponse, Target, Ticket};
use super::{AppContext, Message, NoticeLevel, Tab};
use crate::api::{AccountQueues, QueueAction, QueueKind, QueueSnapshot, QueueState, QueueTask};
use crate::bus::{Event, EventKind};
use crate::error::{Error, Result};
use crate::knowledge::truncate;
use crate::refresh::{Epoch, RefreshTimer};

/// Counters shown above a queue table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueCounters {
    /// Waiting
    pub pending: u64,
    /// In progress
    pub running: u64,
    /// Done
    pub completed: u64,
    /// Failed
    pub failed: u64,
}

/// One render-ready task row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueRow {
    /// Status label
    pub status: String,
    /// Link (transfer) or file name (share)
    pub primary: String,
    /// Target path (transfer) or generated link (share)
    pub secondary: String,
    /// Creation time
    pub created_at: String,
}

/// Counters and the first rows of one queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSection {
    /// Which queue
    pub kind: QueueKind,
    /// Counters
    pub counters: QueueCounters,
    /// At most [`crate::QUEUE_ROW_LIMIT`] rows
    pub rows: Vec<QueueRow>,
    /// Rows the server sent
    pub total_rows: usize,
    /// Worker loop active
    pub is_running: bool,
    /// Worker loop paused
    pub is_paused: bool,
}

impl QueueSection {
    fn build(kind: QueueKind, state: &QueueState) -> Self {
        let status = state.status;
        Self {
            kind,
            counters: QueueCounters {
                pending: status.pending,
                running: status.running,
                completed: status.completed,
                failed: status.failed,
            },
            rows: state
                .queue
                .iter()
                .take(crate::QUEUE_ROW_LIMIT)
                .map(|task| queue_row(kind, task))
                .collect(),
            total_rows: state.queue.len(),
            is_running: status.is_running,
            is_paused: status.is_paused,
        }
    }

    /// "showing first 50 of N" when rows were cut.
    pub fn overflow_note(&self) -> Option<String> {
        (self.total_rows > self.rows.len())
            .then(|| format!("showing first {} of {}", self.rows.len(), self.total_rows))
    }
}

/// Both queues of the current account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountView {
    /// Account name
    pub account: String,
    /// Transfer queue
    pub transfer: QueueSection,
    /// Share queue
    pub share: QueueSection,
    /// Snapshot timestamp
    pub updated_at: String,
}

impl AccountView {
    /// The section for `kind`.
    pub const fn section(&self, kind: QueueKind) -> &QueueSection {
        match kind {
            QueueKind::Transfer => &self.transfer,
            QueueKind::Share => &self.share,
        }
    }
}

/// What the queue tab shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueuePanel {
    /// No account selected yet
    NoAccount,
    /// First fetch in flight
    Loading,
    /// Last fetch failed; the next tick retries
    Failed(String),
    /// The account is missing from the snapshot or its service is down
    Unavailable {
        /// Account name
        account: String,
        /// Server-provided reason
        reason: Option<String>,
    },
    /// Counters and rows
    Ready(AccountView),
}

impl QueuePanel {
    /// The account view, if ready.
    pub const fn ready(&self) -> Option<&AccountView> {
        match self {
            Self::Ready(view) => Some(view),
            _ => None,
        }
    }
}

/// Human label for a task status.
pub fn task_status_label(status: &str) -> &str {
    match status {
        "pending" => "Pending",
        "running" => "Running",
        "completed" => "Completed",
        "failed" => "Failed",
        "skipped" => "Skipped",
        other => other,
    }
}

fn queue_row(kind: QueueKind, task: &QueueTask) -> QueueRow {
    let (primary, secondary) = match kind {
        QueueKind::Transfer => (
            truncate(task.share_link.as_deref().unwrap_or("-"), 40),
            truncate(task.target_path.as_deref().unwrap_or("-"), 30),
        ),
        QueueKind::Share => {
            let name = task
                .file_info
                .as_ref()
                .and_then(|f| f.name.as_deref())
                .or(task.title.as_deref())
                .unwrap_or("-");
            (
                truncate(name, 30),
                truncate(task.share_link.as_deref().unwrap_or("not generated"), 40),
            )
        }
    };

    QueueRow {
        status: task_status_label(&task.status).to_string(),
        primary,
        secondary,
        created_at: task.created_at.clone().unwrap_or_else(|| "-".to_string()),
    }
}

/// File name of a queue CSV export taken at `at`.
pub fn export_filename(kind: QueueKind, at: chrono::DateTime<chrono::Utc>) -> String {
    format!("{kind}_results_{}.csv", at.timestamp_millis())
}

/// Select `account` from a snapshot and shape it for display.
pub fn account_view(snapshot: &QueueSnapshot, account: &str) -> QueuePanel {
    match snapshot.accounts.get(account) {
        Some(AccountQueues {
            available: true,
            transfer,
            share,
            ..
        }) => QueuePanel::Ready(AccountView {
            account: account.to_string(),
            transfer: QueueSection::build(QueueKind::Transfer, transfer),
            share: QueueSection::build(QueueKind::Share, share),
            updated_at: snapshot.timestamp.clone(),
        }),
        Some(queues) => QueuePanel::Unavailable {
            account: account.to_string(),
            reason: queues.error.clone(),
        },
        None => QueuePanel::Unavailable {
            account: account.to_string(),
            reason: None,
        },
    }
}

/// Queue tab controller.
#[derive(Debug)]
pub struct QueueModule {
    ctx: AppContext,
    current_account: Option<String>,
    auto_refresh: bool,
    interval: Duration,
    timer: Option<RefreshTimer>,
    timer_generation: u64,
    fetch_epoch: Epoch,
    loading: bool,
    snapshot: Option<QueueSnapshot>,
    error: Option<String>,
}

impl QueueModule {
    /// Create the controller. Nothing runs until the tab is shown.
    pub fn new(ctx: AppContext, auto_refresh: bool) -> Self {
        Self {
            ctx,
            current_account: None,
            auto_refresh,
            interval: Duration::from_millis(crate::DEFAULT_AUTO_REFRESH_MS),
            timer: None,
            timer_generation: 0,
            fetch_epoch: Epoch::default(),
            loading: false,
            snapshot: None,
            error: None,
        }
    }

    /// Subscribe to tab, account and settings events.
    pub fn attach(this: &Rc<RefCell<Self>>) {
        let bus = Rc::clone(&this.borrow().ctx.bus);

        let weak = Rc::downgrade(this);
        bus.subscribe(EventKind::TabChanged, move |event| {
            if let (Event::TabChanged(tab), Some(module)) = (event, Weak::upgrade(&weak)) {
                module.borrow_mut().on_tab_changed(*tab);
            }
        });

        let weak = Rc::downgrade(this);
        bus.subscribe(EventKind::AccountChanged, move |event| {
            if let (Event::AccountChanged(account), Some(module)) = (event, Weak::upgrade(&weak)) {
                module.borrow_mut().on_account_changed(account.clone());
            }
        });

        let weak = Rc::downgrade(this);
        bus.subscribe(EventKind::AccountsLoaded, move |_| {
            if let Some(module) = Weak::upgrade(&weak) {
                let mut module = module.borrow_mut();
                if module.ctx.is_active(Tab::Queue) {
                    module.refresh();
                }
            }
        });

        let weak = Rc::downgrade(this);
        bus.subscribe(EventKind::SettingsUpdated, move |event| {
            if let (Event::SettingsUpdated(prefs), Some(module)) = (event, Weak::upgrade(&weak)) {
                if let Some(period) = prefs.refresh_period() {
                    module.borrow_mut().set_interval(period);
                }
            }
        });
    }

    fn on_tab_changed(&mut self, tab: Tab) {
        if tab == Tab::Queue {
            self.current_account = self.ctx.selected_account();
            self.refresh();
            if self.auto_refresh {
                self.start_timer();
            }
        } else {
            self.stop_timer();
        }
    }

    fn on_account_changed(&mut self, account: Option<String>) {
        self.current_account = account;
        if self.ctx.is_active(Tab::Queue) {
            self.refresh();
        }
    }

    /// Fetch a fresh snapshot.
    pub fn refresh(&mut self) {
        self.loading = true;
        let epoch = self.fetch_epoch.advance();
        self.ctx
            .dispatcher
            .dispatch(Ticket::new(Target::Queues, epoch), ApiRequest::Queues);
    }

    /// A timer tick arrived.
    pub fn on_tick(&mut self, generation: u64) {
        if self.timer.is_none() || generation != self.timer_generation {
            tracing::debug!("ignoring stale queue tick {generation}");
            return;
        }
        if self.ctx.is_active(Tab::Queue) {
            self.refresh();
        }
    }

    /// Turn auto-refresh on or off.
    pub fn set_auto_refresh(&mut self, enabled: bool) {
        self.auto_refresh = enabled;
        if enabled && self.ctx.is_active(Tab::Queue) {
            self.start_timer();
        } else {
            self.stop_timer();
        }
    }

    /// Change the refresh period. A running timer restarts at the new period.
    pub fn set_interval(&mut self, period: Duration) {
        if period == self.interval {
            return;
        }
        self.interval = period;
        if self.timer.is_some() {
            self.start_timer();
        }
    }

    fn start_timer(&mut self) {
        self.stop_timer();
        let generation = self.timer_generation;
        self.timer = Some(RefreshTimer::start(
            self.interval,
            self.ctx.tx.clone(),
            move || Message::QueueTick { generation },
        ));
        tracing::debug!("queue auto-refresh every {:?}", self.interval);
    }

    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop();
        }
        self.timer_generation = self.timer_generation.wrapping_add(1);
    }

    /// Whether auto-refresh is enabled.
    pub const fn auto_refresh(&self) -> bool {
        self.auto_refresh
    }

    /// Whether the refresh timer is running.
    pub fn is_polling(&self) -> bool {
        self.timer.as_ref().is_some_and(RefreshTimer::is_running)
    }

    /// Current refresh period.
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Account the tab shows.
    pub fn current_account(&self) -> Option<&str> {
        self.current_account.as_deref()
    }

    /// Whether a fetch is in flight.
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Current display state.
    pub fn panel(&self) -> QueuePanel {
        let Some(account) = self.current_account.as_deref() else {
            return QueuePanel::NoAccount;
        };
        if let Some(error) = &self.error {
            return QueuePanel::Failed(error.clone());
        }
        match &self.snapshot {
            Some(snapshot) => account_view(snapshot, account),
            None => QueuePanel::Loading,
        }
    }

    fn require_account(&self) -> Option<String> {
        let account = self
            .current_account
            .clone()
            .or_else(|| self.ctx.selected_account());
        if account.is_none() {
            self.ctx
                .notify(NoticeLevel::Error, Error::NoAccount.to_string());
        }
        account
    }

    /// Run a control action on the current account's queue.
    pub fn control(&mut self, kind: QueueKind, action: QueueAction) {
        let Some(account) = self.require_account() else {
            return;
        };
        self.ctx.dispatcher.dispatch(
            Ticket::new(Target::QueueAction, 0),
            ApiRequest::QueueAction {
                kind,
                action,
                account,
            },
        );
    }

    /// Export a queue's results as CSV into the export directory.
    pub fn export(&mut self, kind: QueueKind) {
        let Some(account) = self.require_account() else {
            return;
        };
        let file_name = export_filename(kind, chrono::Utc::now());
        self.ctx.dispatcher.dispatch(
            Ticket::new(Target::QueueExport, 0),
            ApiRequest::ExportQueue {
                kind,
                account,
                destination: self.ctx.export_dir.join(file_name),
            },
        );
    }

    /// Apply a reply addressed to this tab.
    pub fn on_completion(&mut self, ticket: Ticket, result: Result<ApiResponse>) {
        match ticket.target {
            Target::Queues => {
                if !self.fetch_epoch.is_current(ticket.epoch) {
                    tracing::debug!("dropping stale queue snapshot {}", ticket.epoch);
                    return;
                }
                self.loading = false;
                match result {
                    Ok(ApiResponse::Queues(snapshot)) => {
                        self.snapshot = Some(snapshot);
                        self.error = None;
                    }
                    Ok(other) => tracing::warn!("{}", unexpected(ticket.target, &other)),
                    Err(e) => self.error = Some(e.to_string()),
                }
            }
            Target::QueueAction => match result {
                Ok(ApiResponse::ActionDone(message)) => {
                    self.ctx.notify(NoticeLevel::Success, message);
                    self.refresh();
                }
                Ok(other) => tracing::warn!("{}", unexpected(ticket.target, &other)),
                Err(e) => self.ctx.notify(NoticeLevel::Error, e.to_string()),
            },
            Target::QueueExport => match result {
                Ok(ApiResponse::Saved(path)) => self
                    .ctx
                    .notify(NoticeLevel::Success, format!("Exported to {}", path.display())),
                Ok(other) => tracing::warn!("{}", unexpected(ticket.target, &other)),
                Err(e) => self
                    .ctx
                    .notify(NoticeLevel::Error, format!("Export failed: {e}")),
            },
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TaskFileInfo;
    use crate::dashboard::testing::context;
    use crate::dashboard::RecordingDispatcher;
    use crate::settings::UiPreferences;
    use tokio::sync::mpsc;

    fn task(status: &str) -> QueueTask {
        QueueTask {
            status: status.to_string(),
            share_link: Some("https://pan.example.com/s/1abcdef".into()),
            target_path: Some("/incoming".into()),
            ..QueueTask::default()
        }
    }

    fn attached(
        auto_refresh: bool,
    ) -> (
        AppContext,
        Rc<RefCell<QueueModule>>,
        Rc<RecordingDispatcher>,
        mpsc::UnboundedReceiver<Message>,
    ) {
        let (ctx, recorder, rx) = context();
        ctx.session
            .borrow_mut()
            .set_selected_account(Some("A".into()))
            .unwrap();
        let module = Rc::new(RefCell::new(QueueModule::new(ctx.clone(), auto_refresh)));
        QueueModule::attach(&module);
        (ctx, module, recorder, rx)
    }

    fn show(ctx: &AppContext, tab: Tab) {
        ctx.active_tab.set(tab);
        ctx.bus.publish(&Event::TabChanged(tab));
    }

    #[test]
    fn test_missing_counters_render_as_zero() {
        let mut snapshot = QueueSnapshot::default();
        snapshot.accounts.insert(
            "A".into(),
            AccountQueues {
                available: true,
                ..AccountQueues::default()
            },
        );

        let panel = account_view(&snapshot, "A");
        let view = panel.ready().unwrap();
        assert_eq!(view.share.counters, QueueCounters::default());
        assert!(view.transfer.rows.is_empty());
        assert_eq!(view.transfer.overflow_note(), None);
    }

    #[test]
    fn test_rows_capped_with_note() {
        let mut queues = AccountQueues {
            available: true,
            ..AccountQueues::default()
        };
        queues.transfer.queue = (0..60).map(|_| task("pending")).collect();
        let mut snapshot = QueueSnapshot::default();
        snapshot.accounts.insert("A".into(), queues);

        let panel = account_view(&snapshot, "A");
        let section = &panel.ready().unwrap().transfer;
        assert_eq!(section.rows.len(), 50);
        assert_eq!(
            section.overflow_note().as_deref(),
            Some("showing first 50 of 60")
        );
        assert_eq!(section.rows[0].status, "Pending");
        assert_eq!(section.rows[0].secondary, "/incoming");
    }

    #[test]
    fn test_share_row_fallbacks() {
        let titled = QueueTask {
            status: "running".into(),
            title: Some("Quarterly report".into()),
            ..QueueTask::default()
        };
        let row = queue_row(QueueKind::Share, &titled);
        assert_eq!(row.primary, "Quarterly report");
        assert_eq!(row.secondary, "not generated");

        let named = QueueTask {
            file_info: Some(TaskFileInfo {
                name: Some("a".repeat(35)),
            }),
            title: Some("ignored".into()),
            ..QueueTask::default()
        };
        let row = queue_row(QueueKind::Share, &named);
        assert_eq!(row.primary, format!("{}...", "a".repeat(30)));
    }

    #[test]
    fn test_unavailable_account() {
        let mut snapshot = QueueSnapshot::default();
        snapshot.accounts.insert(
            "B".into(),
            AccountQueues {
                available: false,
                error: Some("service offline".into()),
                ..AccountQueues::default()
            },
        );

        assert_eq!(
            account_view(&snapshot, "B"),
            QueuePanel::Unavailable {
                account: "B".into(),
                reason: Some("service offline".into()),
            }
        );
        assert!(matches!(
            account_view(&snapshot, "C"),
            QueuePanel::Unavailable { reason: None, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_refreshes_while_visible() {
        let (ctx, module, recorder, mut rx) = attached(true);

        show(&ctx, Tab::Queue);
        assert_eq!(recorder.count(Target::Queues), 1);
        assert!(module.borrow().is_polling());

        let Some(Message::QueueTick { generation }) = rx.recv().await else {
            panic!("expected a tick");
        };
        module.borrow_mut().on_tick(generation);
        assert_eq!(recorder.count(Target::Queues), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_switching_away_stops_fetches() {
        let (ctx, module, recorder, mut rx) = attached(true);

        show(&ctx, Tab::Queue);
        let Some(Message::QueueTick { generation }) = rx.recv().await else {
            panic!("expected a tick");
        };

        show(&ctx, Tab::Browse);
        assert!(!module.borrow().is_polling());

        // A tick queued before the switch must not fetch.
        module.borrow_mut().on_tick(generation);
        assert_eq!(recorder.count(Target::Queues), 1);

        let next = tokio::time::timeout(Duration::from_secs(30), rx.recv()).await;
        assert!(next.is_err(), "timer still ticking after tab switch");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_polling() {
        let (ctx, module, recorder, mut rx) = attached(true);

        show(&ctx, Tab::Queue);
        let (ticket, _) = recorder.last(Target::Queues).unwrap();
        module
            .borrow_mut()
            .on_completion(ticket, Err(Error::Network("connection refused".into())));
        assert!(matches!(module.borrow().panel(), QueuePanel::Failed(_)));

        let Some(Message::QueueTick { generation }) = rx.recv().await else {
            panic!("expected a tick");
        };
        module.borrow_mut().on_tick(generation);
        assert_eq!(recorder.count(Target::Queues), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settings_update_restarts_timer() {
        let (ctx, module, _recorder, mut rx) = attached(true);
        show(&ctx, Tab::Queue);

        ctx.bus.publish(&Event::SettingsUpdated(UiPreferences {
            auto_refresh_interval: 2000,
            api_key_retention: true,
        }));
        assert_eq!(module.borrow().interval(), Duration::from_millis(2000));

        let started = tokio::time::Instant::now();
        let Some(Message::QueueTick { generation }) = rx.recv().await else {
            panic!("expected a tick");
        };
        assert_eq!(started.elapsed(), Duration::from_millis(2000));
        assert_eq!(generation, module.borrow().timer_generation);
    }

    #[test]
    fn test_account_change_refreshes_only_when_visible() {
        let (ctx, module, recorder, _rx) = attached(false);

        ctx.bus.publish(&Event::AccountChanged(Some("B".into())));
        assert_eq!(recorder.count(Target::Queues), 0);

        show(&ctx, Tab::Queue);
        ctx.bus.publish(&Event::AccountChanged(Some("B".into())));
        assert_eq!(recorder.count(Target::Queues), 2);
        assert_eq!(module.borrow().current_account(), Some("B"));
    }

    #[test]
    fn test_accounts_loaded_refreshes_only_when_visible() {
        let (ctx, _module, recorder, _rx) = attached(false);
        let accounts = || Event::AccountsLoaded(vec!["A".into(), "B".into()]);

        ctx.bus.publish(&accounts());
        assert_eq!(recorder.count(Target::Queues), 0);

        show(&ctx, Tab::Queue);
        ctx.bus.publish(&accounts());
        assert_eq!(recorder.count(Target::Queues), 2);

        show(&ctx, Tab::Browse);
        ctx.bus.publish(&accounts());
        assert_eq!(recorder.count(Target::Queues), 2);
    }

    #[test]
    fn test_stale_snapshot_dropped() {
        let (_ctx, module, recorder, _rx) = attached(false);

        module.borrow_mut().refresh();
        let (stale, _) = recorder.last(Target::Queues).unwrap();
        module.borrow_mut().refresh();

        module.borrow_mut().on_completion(
            stale,
            Ok(ApiResponse::Queues(QueueSnapshot::default())),
        );
        assert!(module.borrow().is_loading());
    }

    #[test]
    fn test_action_without_account_is_local_error() {
        let (ctx, _recorder, _rx) = context();
        let mut module = QueueModule::new(ctx.clone(), false);

        module.control(QueueKind::Transfer, QueueAction::Start);
        module.export(QueueKind::Share);

        let notices = ctx.drain_notices();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].message, "select an account first");
    }

    #[test]
    fn test_action_success_refreshes() {
        let (ctx, module, recorder, _rx) = attached(false);
        show(&ctx, Tab::Queue);

        module
            .borrow_mut()
            .control(QueueKind::Share, QueueAction::Pause);
        let (ticket, request) = recorder.last(Target::QueueAction).unwrap();
        assert_eq!(
            request,
            ApiRequest::QueueAction {
                kind: QueueKind::Share,
                action: QueueAction::Pause,
                account: "A".into(),
            }
        );

        module
            .borrow_mut()
            .on_completion(ticket, Ok(ApiResponse::ActionDone("paused".into())));
        assert_eq!(recorder.count(Target::Queues), 2);
        assert_eq!(ctx.drain_notices()[0].message, "paused");
    }

    #[test]
    fn test_export_file_name() {
        let (ctx, module, recorder, _rx) = attached(false);
        show(&ctx, Tab::Queue);

        module.borrow_mut().export(QueueKind::Transfer);
        let (_, request) = recorder.last(Target::QueueExport).unwrap();
        let ApiRequest::ExportQueue { destination, .. } = request else {
            panic!("expected an export request");
        };
        let name = destination.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("transfer_results_"));
        assert!(name.ends_with(".csv"));
    }
}
