//! End-to-end tests: dashboard controllers driving a mock backend through
//! the real dispatcher.

mod common;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::mpsc;

use common::{spawn_backend, MockBackend, TEST_KEY};

use pandash_core::api::{ApiClient, QueueAction, QueueKind};
use pandash_core::dashboard::queue::QueuePanel;
use pandash_core::dashboard::{
    AppContext, ClientDispatcher, Dashboard, Dispatch, Message, NoticeLevel, Tab,
};
use pandash_core::session::SessionStore;

struct Harness {
    dashboard: Dashboard,
    rx: mpsc::UnboundedReceiver<Message>,
    session: Rc<RefCell<SessionStore>>,
    _export_dir: TempDir,
}

fn harness(backend: &MockBackend, api_key: Option<&str>) -> Harness {
    let (tx, rx) = mpsc::unbounded_channel();
    let session = Rc::new(RefCell::new(SessionStore::in_memory()));
    if let Some(key) = api_key {
        session.borrow_mut().set_api_key(key).unwrap();
    }

    let dispatcher: Rc<dyn Dispatch> = Rc::new(ClientDispatcher::new(
        ApiClient::new(&backend.base_url),
        Rc::clone(&session),
        tx.clone(),
    ));
    let export_dir = TempDir::new().unwrap();
    let ctx = AppContext::new(
        Rc::clone(&session),
        dispatcher,
        tx,
        export_dir.path().to_path_buf(),
    );

    Harness {
        dashboard: Dashboard::new(ctx, false),
        rx,
        session,
        _export_dir: export_dir,
    }
}

impl Harness {
    /// Feed messages until `done` holds.
    async fn pump_until(&mut self, done: impl Fn(&Dashboard) -> bool) {
        let deadline = Duration::from_secs(5);
        tokio::time::timeout(deadline, async {
            while !done(&self.dashboard) {
                let message = self.rx.recv().await.expect("channel open");
                self.dashboard.handle_message(message);
            }
        })
        .await
        .expect("condition not reached in time");
    }

    /// Feed whatever arrives within `window`.
    async fn settle(&mut self, window: Duration) {
        while let Ok(Some(message)) = tokio::time::timeout(window, self.rx.recv()).await {
            self.dashboard.handle_message(message);
        }
    }
}

fn queue_ready_for(dashboard: &Dashboard, account: &str) -> bool {
    matches!(
        dashboard.queue().panel(),
        QueuePanel::Ready(view) if view.account == account
    )
}

/// Selecting an account on the queue tab fetches the snapshot exactly once
/// and the counters match the backend fixture.
#[tokio::test]
async fn test_queue_tab_account_switch_fetches_once() {
    let backend = spawn_backend().await;
    let mut h = harness(&backend, Some(TEST_KEY));

    h.dashboard.start();
    h.pump_until(|d| !d.host().accounts().is_empty()).await;
    assert_eq!(h.dashboard.host().selected_account().as_deref(), Some("A"));

    h.dashboard.switch_tab(Tab::Queue);
    h.pump_until(|d| queue_ready_for(d, "A")).await;
    h.settle(Duration::from_millis(200)).await;
    let before = backend.state.queue_fetches();

    h.dashboard.select_account(Some("B".into()));
    h.pump_until(|d| queue_ready_for(d, "B")).await;
    h.settle(Duration::from_millis(200)).await;

    assert_eq!(backend.state.queue_fetches() - before, 1);

    let panel = h.dashboard.queue().panel();
    let view = panel.ready().unwrap();
    assert_eq!(view.transfer.counters.pending, 2);
    assert_eq!(view.transfer.counters.running, 1);
    assert_eq!(view.transfer.counters.completed, 0);
    assert_eq!(view.transfer.counters.failed, 0);
    assert_eq!(view.share.counters.completed, 4);
}

/// Saving a valid key through the host loads accounts and lists the root.
#[tokio::test]
async fn test_login_flow_lists_root() {
    let backend = spawn_backend().await;
    let mut h = harness(&backend, None);

    h.dashboard.start();
    assert!(!h.dashboard.host().is_authenticated());

    h.dashboard.host_mut().save_api_key(TEST_KEY);
    h.pump_until(|d| d.host().is_authenticated()).await;
    h.pump_until(|d| !d.browse().entries().is_empty()).await;

    assert_eq!(h.dashboard.browse().entries().len(), 2);
    assert_eq!(h.session.borrow().selected_account(), Some("A"));
    assert!(h
        .dashboard
        .drain_notices()
        .iter()
        .any(|n| n.level == NoticeLevel::Success));
}

/// An invalid key is cleared and nothing else is loaded.
#[tokio::test]
async fn test_invalid_key_is_rejected() {
    let backend = spawn_backend().await;
    let mut h = harness(&backend, None);
    h.dashboard.start();

    h.dashboard.host_mut().save_api_key("wrong");
    h.pump_until(|d| {
        d.context()
            .notices
            .borrow()
            .iter()
            .any(|n| n.level == NoticeLevel::Error)
    })
    .await;

    assert!(h.session.borrow().api_key().is_none());
    assert!(!h.dashboard.needs_reload());
    assert!(backend.state.requests_to("/api/files").is_empty());
}

/// A stored key the server rejects forces a reload.
#[tokio::test]
async fn test_stale_key_requests_reload() {
    let backend = spawn_backend().await;
    let mut h = harness(&backend, Some("revoked"));

    h.dashboard.start();
    h.pump_until(Dashboard::needs_reload).await;

    assert!(h.session.borrow().api_key().is_none());
}

/// Queue actions hit the backend and refresh the snapshot afterwards.
#[tokio::test]
async fn test_queue_action_refreshes() {
    let backend = spawn_backend().await;
    let mut h = harness(&backend, Some(TEST_KEY));
    h.dashboard.start();
    h.pump_until(|d| !d.host().accounts().is_empty()).await;

    h.dashboard.switch_tab(Tab::Queue);
    h.pump_until(|d| queue_ready_for(d, "A")).await;
    h.settle(Duration::from_millis(100)).await;
    let before = backend.state.queue_fetches();

    h.dashboard
        .queue_mut()
        .control(QueueKind::Transfer, QueueAction::Start);
    h.pump_until(|_| backend.state.queue_fetches() > before).await;

    assert_eq!(
        backend.state.requests_to("/api/transfer"),
        vec!["POST /api/transfer/start?account=A"]
    );
}

/// Saved settings round-trip and reach the queue interval.
#[tokio::test]
async fn test_settings_save_updates_interval() {
    let backend = spawn_backend().await;
    let mut h = harness(&backend, Some(TEST_KEY));
    h.dashboard.start();
    h.pump_until(|d| !d.host().accounts().is_empty()).await;

    h.dashboard.switch_tab(Tab::Settings);
    h.pump_until(|d| d.settings().current().is_some()).await;

    h.dashboard
        .settings_mut()
        .form_mut()
        .set_value(pandash_core::settings::FormField::RefreshInterval, "2500");
    h.dashboard.settings_mut().save();
    h.pump_until(|d| d.queue().interval() == Duration::from_millis(2500))
        .await;

    assert_eq!(
        h.dashboard.settings().current().map(|s| s.ui.auto_refresh_interval),
        Some(2500)
    );
}
