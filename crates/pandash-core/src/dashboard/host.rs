//! Host panel: API key, account selection, tab switching and the summary.

use std::rc::Rc;

use super::dispatch::{unexpected, ApiRequest, ApiResponse, Target, Ticket};
use super::{AppContext, NoticeLevel, Tab};
use crate::api::Overview;
use crate::bus::{Event, EventKind};
use crate::error::Result;
use crate::refresh::Epoch;

/// The host of the dashboard.
///
/// It is the only writer of the stored key and selected account, and the
/// only publisher of `accountChanged`, `accountsLoaded` and `tabChanged`.
#[derive(Debug)]
pub struct ControlPanel {
    ctx: AppContext,
    accounts: Vec<String>,
    authenticated: bool,
    overview: Option<Overview>,
    reload_requested: bool,
    validate_epoch: Epoch,
    accounts_epoch: Epoch,
    overview_epoch: Epoch,
}

impl ControlPanel {
    /// Create the host and subscribe it to `settingsUpdated`, which carries
    /// the key retention choice into the session.
    pub fn new(ctx: AppContext) -> Self {
        {
            let session = Rc::clone(&ctx.session);
            ctx.bus.subscribe(EventKind::SettingsUpdated, move |event| {
                if let Event::SettingsUpdated(prefs) = event {
                    let retained = session
                        .borrow_mut()
                        .set_retain_api_key(prefs.api_key_retention);
                    if let Err(e) = retained {
                        tracing::warn!("Failed to update session file: {e}");
                    }
                }
            });
        }

        Self {
            ctx,
            accounts: Vec::new(),
            authenticated: false,
            overview: None,
            reload_requested: false,
            validate_epoch: Epoch::default(),
            accounts_epoch: Epoch::default(),
            overview_epoch: Epoch::default(),
        }
    }

    /// Resume a stored session: with a key on file the main view is shown
    /// and accounts and the summary are loaded without re-validating.
    pub fn start(&mut self) {
        if self.ctx.session.borrow().api_key().is_some() {
            self.authenticated = true;
            self.load_accounts();
            self.load_dashboard();
        }
    }

    /// Whether the main view is shown (a key is stored and not rejected).
    pub const fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Known accounts.
    pub fn accounts(&self) -> &[String] {
        &self.accounts
    }

    /// The selected account.
    pub fn selected_account(&self) -> Option<String> {
        self.ctx.selected_account()
    }

    /// Latest dashboard summary.
    pub const fn overview(&self) -> Option<&Overview> {
        self.overview.as_ref()
    }

    /// Whether a 401 asked for a restart with fresh state.
    pub const fn reload_requested(&self) -> bool {
        self.reload_requested
    }

    /// Store and validate a new API key.
    pub fn save_api_key(&mut self, key: &str) {
        let key = key.trim();
        if key.is_empty() {
            self.ctx.notify(NoticeLevel::Error, "Enter an API key");
            return;
        }

        let stored = self.ctx.session.borrow_mut().set_api_key(key);
        if let Err(e) = stored {
            tracing::warn!("Failed to write session file: {e}");
        }

        let epoch = self.validate_epoch.advance();
        self.ctx.dispatcher.dispatch(
            Ticket::new(Target::ValidateKey, epoch),
            ApiRequest::ValidateKey,
        );
    }

    /// Fetch the account list.
    pub fn load_accounts(&mut self) {
        let epoch = self.accounts_epoch.advance();
        self.ctx
            .dispatcher
            .dispatch(Ticket::new(Target::Accounts, epoch), ApiRequest::Info);
    }

    /// Fetch the dashboard summary.
    pub fn load_dashboard(&mut self) {
        let epoch = self.overview_epoch.advance();
        self.ctx
            .dispatcher
            .dispatch(Ticket::new(Target::Overview, epoch), ApiRequest::Overview);
    }

    /// Persist the selection and announce it.
    pub fn select_account(&mut self, account: Option<String>) {
        let stored = self
            .ctx
            .session
            .borrow_mut()
            .set_selected_account(account.clone());
        if let Err(e) = stored {
            tracing::warn!("Failed to write session file: {e}");
        }

        self.ctx.bus.publish(&Event::AccountChanged(account));
    }

    /// Select the next account, or the previous one when `forward` is false (wrapping).
    pub fn cycle_account(&mut self, forward: bool) {
        let len = self.accounts.len();
        if len == 0 {
            return;
        }

        let current = self
            .ctx
            .selected_account()
            .and_then(|a| self.accounts.iter().position(|x| *x == a))
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        let account = self.accounts[next].clone();
        self.select_account(Some(account));
    }

    /// Make `tab` visible and announce it. Switching to the visible tab does nothing.
    pub fn switch_tab(&mut self, tab: Tab) -> bool {
        if self.ctx.active_tab.get() == tab {
            return false;
        }

        self.ctx.active_tab.set(tab);
        self.ctx.bus.publish(&Event::TabChanged(tab));
        true
    }

    /// The stored key was rejected: forget it and ask for a restart.
    pub fn handle_unauthorized(&mut self) {
        let cleared = self.ctx.session.borrow_mut().clear_api_key();
        if let Err(e) = cleared {
            tracing::warn!("Failed to write session file: {e}");
        }

        if !self.reload_requested {
            self.ctx
                .notify(NoticeLevel::Error, "API key rejected, please log in again");
        }
        self.authenticated = false;
        self.reload_requested = true;
    }

    /// Apply a reply addressed to the host.
    pub fn on_completion(&mut self, ticket: Ticket, result: Result<ApiResponse>) {
        match ticket.target {
            Target::ValidateKey if self.validate_epoch.is_current(ticket.epoch) => {
                self.on_validated(result);
            }
            Target::Accounts if self.accounts_epoch.is_current(ticket.epoch) => {
                match result {
                    Ok(ApiResponse::Info(info)) => self.apply_accounts(info.accounts),
                    Ok(other) => tracing::warn!("{}", unexpected(ticket.target, &other)),
                    Err(e) => self
                        .ctx
                        .notify(NoticeLevel::Error, format!("Failed to load accounts: {e}")),
                }
            }
            Target::Overview if self.overview_epoch.is_current(ticket.epoch) => match result {
                Ok(ApiResponse::Overview(overview)) => self.overview = Some(overview),
                Ok(other) => tracing::warn!("{}", unexpected(ticket.target, &other)),
                Err(e) => tracing::warn!("Failed to load dashboard summary: {e}"),
            },
            _ => tracing::debug!("dropping stale reply {ticket:?}"),
        }
    }

    fn on_validated(&mut self, result: Result<ApiResponse>) {
        match result {
            Ok(ApiResponse::Info(info)) => {
                self.authenticated = true;
                self.apply_accounts(info.accounts);
                self.ctx.notify(NoticeLevel::Success, "API key saved");
                self.load_dashboard();
            }
            other => {
                if let Err(e) = &other {
                    tracing::debug!("API key validation failed: {e}");
                }
                let cleared = self.ctx.session.borrow_mut().clear_api_key();
                if let Err(e) = cleared {
                    tracing::warn!("Failed to write session file: {e}");
                }
                self.authenticated = false;
                self.ctx.notify(NoticeLevel::Error, "Invalid API key");
            }
        }
    }

    /// Adopt an account list: pick the first account when none is selected,
    /// then announce `accountsLoaded` followed by `accountChanged`.
    pub fn apply_accounts(&mut self, accounts: Vec<String>) {
        self.accounts = accounts;

        if self.ctx.selected_account().is_none() {
            if let Some(first) = self.accounts.first().cloned() {
                let stored = self
                    .ctx
                    .session
                    .borrow_mut()
                    .set_selected_account(Some(first));
                if let Err(e) = stored {
                    tracing::warn!("Failed to write session file: {e}");
                }
            }
        }

        self.ctx
            .bus
            .publish(&Event::AccountsLoaded(self.accounts.clone()));
        self.ctx
            .bus
            .publish(&Event::AccountChanged(self.ctx.selected_account()));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::api::ServerInfo;
    use crate::dashboard::testing::context;
    use crate::error::Error;
    use crate::settings::UiPreferences;

    fn event_log(ctx: &AppContext) -> Rc<RefCell<Vec<Event>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        for kind in [
            EventKind::AccountChanged,
            EventKind::AccountsLoaded,
            EventKind::TabChanged,
        ] {
            let log = Rc::clone(&log);
            ctx.bus.subscribe(kind, move |e| log.borrow_mut().push(e.clone()));
        }
        log
    }

    #[test]
    fn test_empty_key_rejected_locally() {
        let (ctx, recorder, _rx) = context();
        let mut host = ControlPanel::new(ctx.clone());

        host.save_api_key("   ");

        assert!(recorder.requests().is_empty());
        assert_eq!(ctx.drain_notices()[0].level, NoticeLevel::Error);
    }

    #[test]
    fn test_valid_key_loads_accounts_and_selects_first() {
        let (ctx, recorder, _rx) = context();
        let log = event_log(&ctx);
        let mut host = ControlPanel::new(ctx.clone());

        host.save_api_key(" secret ");
        assert_eq!(ctx.session.borrow().api_key(), Some("secret"));

        let (ticket, request) = recorder.last(Target::ValidateKey).unwrap();
        assert_eq!(request, ApiRequest::ValidateKey);
        host.on_completion(
            ticket,
            Ok(ApiResponse::Info(ServerInfo {
                accounts: vec!["main".into(), "backup".into()],
                ..ServerInfo::default()
            })),
        );

        assert!(host.is_authenticated());
        assert_eq!(host.selected_account().as_deref(), Some("main"));
        assert_eq!(
            *log.borrow(),
            vec![
                Event::AccountsLoaded(vec!["main".into(), "backup".into()]),
                Event::AccountChanged(Some("main".into())),
            ]
        );
        assert_eq!(recorder.count(Target::Overview), 1);
    }

    #[test]
    fn test_invalid_key_is_cleared() {
        let (ctx, recorder, _rx) = context();
        let mut host = ControlPanel::new(ctx.clone());

        host.save_api_key("bad");
        let (ticket, _) = recorder.last(Target::ValidateKey).unwrap();
        host.on_completion(ticket, Err(Error::Unauthorized));

        assert!(!host.is_authenticated());
        assert!(ctx.session.borrow().api_key().is_none());
        assert!(!host.reload_requested());
    }

    #[test]
    fn test_existing_selection_is_kept() {
        let (ctx, _recorder, _rx) = context();
        ctx.session
            .borrow_mut()
            .set_selected_account(Some("backup".into()))
            .unwrap();
        let mut host = ControlPanel::new(ctx);

        host.apply_accounts(vec!["main".into(), "backup".into()]);
        assert_eq!(host.selected_account().as_deref(), Some("backup"));
    }

    #[test]
    fn test_switch_to_active_tab_is_noop() {
        let (ctx, _recorder, _rx) = context();
        let log = event_log(&ctx);
        let mut host = ControlPanel::new(ctx);

        assert!(!host.switch_tab(Tab::Browse));
        assert!(host.switch_tab(Tab::Queue));
        assert!(!host.switch_tab(Tab::Queue));

        assert_eq!(*log.borrow(), vec![Event::TabChanged(Tab::Queue)]);
    }

    #[test]
    fn test_cycle_account_wraps() {
        let (ctx, _recorder, _rx) = context();
        let mut host = ControlPanel::new(ctx);
        host.apply_accounts(vec!["a".into(), "b".into(), "c".into()]);

        host.cycle_account(false);
        assert_eq!(host.selected_account().as_deref(), Some("c"));
        host.cycle_account(true);
        assert_eq!(host.selected_account().as_deref(), Some("a"));
    }

    #[test]
    fn test_settings_updated_adopts_retention() {
        let (ctx, _recorder, _rx) = context();
        let host = ControlPanel::new(ctx.clone());

        ctx.bus.publish(&Event::SettingsUpdated(UiPreferences {
            auto_refresh_interval: 2000,
            api_key_retention: false,
        }));

        assert!(!host.is_authenticated());
        assert!(!ctx.session.borrow().retains_api_key());
    }

    #[test]
    fn test_stale_accounts_reply_dropped() {
        let (ctx, recorder, _rx) = context();
        let mut host = ControlPanel::new(ctx);

        host.load_accounts();
        let (stale, _) = recorder.last(Target::Accounts).unwrap();
        host.load_accounts();

        host.on_completion(
            stale,
            Ok(ApiResponse::Info(ServerInfo {
                accounts: vec!["old".into()],
                ..ServerInfo::default()
            })),
        );
        assert!(host.accounts().is_empty());
    }

    #[test]
    fn test_unauthorized_clears_key_once() {
        let (ctx, _recorder, _rx) = context();
        ctx.session.borrow_mut().set_api_key("k").unwrap();
        let mut host = ControlPanel::new(ctx.clone());
        host.start();

        host.handle_unauthorized();
        host.handle_unauthorized();

        assert!(host.reload_requested());
        assert!(!host.is_authenticated());
        assert_eq!(ctx.drain_notices().len(), 1);
    }
}
