//! Page-lifetime publish/subscribe registry.
//!
//! Tab controllers never call each other; they react to events the host
//! publishes. Delivery is synchronous and in registration order. A publish
//! works on a snapshot of the handlers registered when it starts: a handler
//! subscribed during delivery is first called on the next publish, and one
//! unsubscribed during delivery still receives the in-flight event.
//!
//! Nothing is caught. A panicking handler unwinds through `publish` into the
//! publisher and the remaining handlers are skipped.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::dashboard::Tab;
use crate::settings::UiPreferences;

/// Discriminant of an [`Event`], used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The selected account changed
    AccountChanged,
    /// The account list was (re)loaded
    AccountsLoaded,
    /// The active tab changed
    TabChanged,
    /// Settings were saved
    SettingsUpdated,
}

impl EventKind {
    /// Wire-style event name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::AccountChanged => "accountChanged",
            Self::AccountsLoaded => "accountsLoaded",
            Self::TabChanged => "tabChanged",
            Self::SettingsUpdated => "settingsUpdated",
        }
    }
}

/// An event with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// New selected account, `None` when nothing is selected
    AccountChanged(Option<String>),
    /// Full account list
    AccountsLoaded(Vec<String>),
    /// Newly active tab
    TabChanged(Tab),
    /// Client-facing part of the saved settings
    SettingsUpdated(UiPreferences),
}

impl Event {
    /// Kind of this event.
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::AccountChanged(_) => EventKind::AccountChanged,
            Self::AccountsLoaded(_) => EventKind::AccountsLoaded,
            Self::TabChanged(_) => EventKind::TabChanged,
            Self::SettingsUpdated(_) => EventKind::SettingsUpdated,
        }
    }

    /// Wire-style event name.
    pub const fn name(&self) -> &'static str {
        self.kind().name()
    }
}

/// Identity of a registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// A registered event handler.
pub type Handler = Rc<dyn Fn(&Event)>;

struct Registration {
    id: SubscriptionId,
    kind: EventKind,
    handler: Handler,
}

/// Synchronous in-process event bus.
#[derive(Default)]
pub struct EventBus {
    next_id: Cell<u64>,
    registrations: RefCell<Vec<Registration>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.registrations.borrow().len())
            .finish()
    }
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for events of `kind`.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        self.registrations.borrow_mut().push(Registration {
            id,
            kind,
            handler: Rc::new(handler),
        });
        id
    }

    /// Remove a handler. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registrations = self.registrations.borrow_mut();
        let before = registrations.len();
        registrations.retain(|r| r.id != id);
        registrations.len() != before
    }

    /// Deliver `event` to every handler registered for its kind.
    pub fn publish(&self, event: &Event) {
        let kind = event.kind();
        let snapshot: Vec<Handler> = self
            .registrations
            .borrow()
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| Rc::clone(&r.handler))
            .collect();

        tracing::debug!("publish {} to {} handler(s)", event.name(), snapshot.len());

        for handler in snapshot {
            handler(event);
        }
    }

    /// Number of handlers registered for `kind`.
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.registrations
            .borrow()
            .iter()
            .filter(|r| r.kind == kind)
            .count()
    }
}
