//! Settings tab: load, edit, validate and save the backend settings.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::dispatch::{unexpected, ApiRequest, ApiResponse, Target, Ticket};
use super::{AppContext, NoticeLevel, Tab};
use crate::bus::{Event, EventKind};
use crate::error::Result;
use crate::refresh::Epoch;
use crate::settings::{Settings, SettingsForm};

/// Settings tab controller.
#[derive(Debug)]
pub struct SettingsModule {
    ctx: AppContext,
    current: Option<Settings>,
    form: SettingsForm,
    loading: bool,
    saving: bool,
    load_epoch: Epoch,
    save_epoch: Epoch,
}

impl SettingsModule {
    /// Create the controller with a form holding the defaults.
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            current: None,
            form: SettingsForm::from_settings(&Settings::default()),
            loading: false,
            saving: false,
            load_epoch: Epoch::default(),
            save_epoch: Epoch::default(),
        }
    }

    /// Load whenever the tab is shown.
    pub fn attach(this: &Rc<RefCell<Self>>) {
        let weak = Rc::downgrade(this);
        let bus = Rc::clone(&this.borrow().ctx.bus);
        bus.subscribe(EventKind::TabChanged, move |event| {
            if let (Event::TabChanged(Tab::Settings), Some(module)) =
                (event, Weak::upgrade(&weak))
            {
                module.borrow_mut().load();
            }
        });
    }

    /// Fetch the settings unless a fetch is already running.
    pub fn load(&mut self) {
        if self.loading {
            return;
        }
        if self.ctx.session.borrow().api_key().is_none() {
            self.ctx
                .notify(NoticeLevel::Error, "Configure an API key first");
            return;
        }

        self.loading = true;
        let epoch = self.load_epoch.advance();
        self.ctx.dispatcher.dispatch(
            Ticket::new(Target::SettingsLoad, epoch),
            ApiRequest::GetSettings,
        );
    }

    /// Validate the form and PUT it. Violations are reported together and
    /// nothing is sent.
    pub fn save(&mut self) {
        let settings = match self.form.collect(self.current.as_ref()) {
            Ok(settings) => settings,
            Err(e) => {
                self.ctx
                    .notify(NoticeLevel::Error, format!("Validation failed:\n{e}"));
                return;
            }
        };

        self.saving = true;
        let epoch = self.save_epoch.advance();
        self.ctx.dispatcher.dispatch(
            Ticket::new(Target::SettingsSave, epoch),
            ApiRequest::PutSettings(settings),
        );
    }

    /// Apply a load or save reply.
    pub fn on_completion(&mut self, ticket: Ticket, result: Result<ApiResponse>) {
        match ticket.target {
            Target::SettingsLoad if self.load_epoch.is_current(ticket.epoch) => {
                self.loading = false;
                match result {
                    Ok(ApiResponse::Settings(settings)) => {
                        self.apply_key_retention(settings.ui.api_key_retention);
                        self.adopt(settings);
                    }
                    Ok(other) => tracing::warn!("{}", unexpected(ticket.target, &other)),
                    Err(e) => self
                        .ctx
                        .notify(NoticeLevel::Error, format!("Failed to load settings: {e}")),
                }
            }
            Target::SettingsSave if self.save_epoch.is_current(ticket.epoch) => {
                self.saving = false;
                match result {
                    Ok(ApiResponse::Settings(settings)) => {
                        let prefs = settings.ui.clone();
                        self.adopt(settings);
                        self.ctx.notify(
                            NoticeLevel::Success,
                            "Settings saved and applied to the running services",
                        );
                        self.ctx.bus.publish(&Event::SettingsUpdated(prefs));
                    }
                    Ok(other) => tracing::warn!("{}", unexpected(ticket.target, &other)),
                    Err(e) => self
                        .ctx
                        .notify(NoticeLevel::Error, format!("Failed to save settings: {e}")),
                }
            }
            _ => tracing::debug!("dropping stale settings reply {ticket:?}"),
        }
    }

    /// The backend's retention choice applies as soon as it is known, not
    /// only after a save.
    fn apply_key_retention(&self, retain: bool) {
        let applied = self.ctx.session.borrow_mut().set_retain_api_key(retain);
        if let Err(e) = applied {
            tracing::warn!("Failed to update session file: {e}");
        }
    }

    fn adopt(&mut self, settings: Settings) {
        self.form = SettingsForm::from_settings(&settings);
        self.current = Some(settings);
    }

    /// Last settings the server confirmed.
    pub const fn current(&self) -> Option<&Settings> {
        self.current.as_ref()
    }

    /// The edit form.
    pub const fn form(&self) -> &SettingsForm {
        &self.form
    }

    /// The edit form, mutably.
    pub fn form_mut(&mut self) -> &mut SettingsForm {
        &mut self.form
    }

    /// Whether a load is in flight.
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether a save is in flight.
    pub const fn is_saving(&self) -> bool {
        self.saving
    }
}
