//! Browse tab: remote directory listing and debounced keyword search.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use chrono::TimeZone;

use super::dispatch::{unexpected, ApiRequest, ApiResponse, Target, Ticket};
use super::{AppContext, Message, Tab};
use crate::api::FileEntry;
use crate::bus::{Event, EventKind};
use crate::error::{Error, Result};
use crate::refresh::{Debouncer, Epoch};

/// One breadcrumb: label and the path it opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    /// Segment name ("Root" for `/`)
    pub label: String,
    /// Cumulative path
    pub path: String,
}

/// Split `path` into clickable breadcrumbs, starting at the root.
pub fn breadcrumbs(path: &str) -> Vec<Crumb> {
    let mut crumbs = vec![Crumb {
        label: "Root".to_string(),
        path: "/".to_string(),
    }];

    let mut current = String::new();
    for part in path.split('/').filter(|p| !p.is_empty()) {
        current.push('/');
        current.push_str(part);
        crumbs.push(Crumb {
            label: part.to_string(),
            path: current.clone(),
        });
    }
    crumbs
}

/// Parent of `path`, or `/` at the top.
pub fn parent_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => trimmed[..idx].to_string(),
    }
}

/// Format a byte count with two decimals in B, KB, MB, GB or TB.
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.2} {}", UNITS[unit])
}

/// Format a unix timestamp in local time, or "-" when missing.
pub fn format_mtime(timestamp: Option<i64>) -> String {
    timestamp
        .filter(|t| *t > 0)
        .and_then(|t| chrono::Local.timestamp_opt(t, 0).single())
        .map_or_else(|| "-".to_string(), |dt| dt.format("%Y-%m-%d %H:%M").to_string())
}

/// Label/value rows of the file details drawer.
pub fn file_details(entry: &FileEntry) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("Name", entry.name().to_string()),
        ("Path", entry.path.clone()),
        ("Size", format_size(entry.size)),
        ("Modified", format_mtime(entry.server_mtime)),
    ];
    if let Some(fs_id) = &entry.fs_id {
        rows.push(("fs_id", fs_id.clone()));
    }
    if let Some(md5) = &entry.md5 {
        rows.push(("MD5", md5.clone()));
    }
    rows
}

/// Browse tab controller.
#[derive(Debug)]
pub struct BrowseModule {
    ctx: AppContext,
    current_path: String,
    entries: Vec<FileEntry>,
    selected: usize,
    details: Option<FileEntry>,
    loading: bool,
    error: Option<String>,
    search_input: String,
    searching: Option<String>,
    debouncer: Debouncer<Message>,
    listing_epoch: Epoch,
}

impl BrowseModule {
    /// Create the controller at `/`.
    pub fn new(ctx: AppContext) -> Self {
        let debouncer = Debouncer::new(
            Duration::from_millis(crate::SEARCH_DEBOUNCE_MS),
            ctx.tx.clone(),
        );
        Self {
            ctx,
            current_path: "/".to_string(),
            entries: Vec::new(),
            selected: 0,
            details: None,
            loading: false,
            error: None,
            search_input: String::new(),
            searching: None,
            debouncer,
            listing_epoch: Epoch::default(),
        }
    }

    /// Subscribe to account and tab events.
    pub fn attach(this: &Rc<RefCell<Self>>) {
        let bus = Rc::clone(&this.borrow().ctx.bus);

        let weak = Rc::downgrade(this);
        bus.subscribe(EventKind::AccountChanged, move |event| {
            if let (Event::AccountChanged(Some(_)), Some(module)) = (event, Weak::upgrade(&weak)) {
                module.borrow_mut().load_directory("/");
            }
        });

        let weak = Rc::downgrade(this);
        bus.subscribe(EventKind::TabChanged, move |event| {
            if let (Event::TabChanged(Tab::Browse), Some(module)) = (event, Weak::upgrade(&weak)) {
                let mut module = module.borrow_mut();
                if module.ctx.selected_account().is_some() {
                    let path = module.current_path.clone();
                    module.load_directory(&path);
                }
            }
        });
    }

    /// List `path` for the selected account. Leaves search mode.
    pub fn load_directory(&mut self, path: &str) {
        self.current_path = path.to_string();
        self.searching = None;
        self.details = None;

        let Some(account) = self.ctx.selected_account() else {
            self.fail(Error::NoAccount.to_string());
            return;
        };

        self.loading = true;
        self.error = None;
        let epoch = self.listing_epoch.advance();
        self.ctx.dispatcher.dispatch(
            Ticket::new(Target::Listing, epoch),
            ApiRequest::ListFiles {
                path: path.to_string(),
                account,
            },
        );
    }

    /// Search the current directory for `keyword`.
    pub fn perform_search(&mut self, keyword: &str) {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return;
        }
        self.searching = Some(keyword.to_string());
        self.details = None;

        let Some(account) = self.ctx.selected_account() else {
            self.fail(Error::NoAccount.to_string());
            return;
        };

        self.loading = true;
        self.error = None;
        let epoch = self.listing_epoch.advance();
        self.ctx.dispatcher.dispatch(
            Ticket::new(Target::Listing, epoch),
            ApiRequest::SearchFiles {
                keyword: keyword.to_string(),
                path: self.current_path.clone(),
                account,
            },
        );
    }

    /// The search box changed. Schedules a search after a quiet period.
    pub fn set_search_input(&mut self, value: impl Into<String>) {
        self.search_input = value.into();
        self.debouncer.cancel();

        let keyword = self.search_input.trim().to_string();
        if !keyword.is_empty() {
            self.debouncer
                .schedule(move |generation| Message::SearchFire {
                    generation,
                    keyword,
                });
        }
    }

    /// Enter in the search box: search now and drop the pending call.
    pub fn submit_search(&mut self) {
        self.debouncer.cancel();
        let keyword = self.search_input.clone();
        self.perform_search(&keyword);
    }

    /// The debounce delay elapsed.
    pub fn on_search_fire(&mut self, generation: u64, keyword: &str) {
        if self.debouncer.fired(generation) {
            self.perform_search(keyword);
        } else {
            tracing::debug!("ignoring superseded search for '{keyword}'");
        }
    }

    /// Leave search mode and reload the directory.
    pub fn clear_search(&mut self) {
        self.debouncer.cancel();
        self.search_input.clear();
        let path = self.current_path.clone();
        self.load_directory(&path);
    }

    /// Re-run the last search, or reload the directory.
    pub fn refresh(&mut self) {
        match self.searching.clone() {
            Some(keyword) => self.perform_search(&keyword),
            None => {
                let path = self.current_path.clone();
                self.load_directory(&path);
            }
        }
    }

    /// Open the selected entry: enter a directory or show file details.
    pub fn open_selected(&mut self) {
        let Some(entry) = self.entries.get(self.selected).cloned() else {
            return;
        };
        if entry.isdir {
            self.load_directory(&entry.path);
        } else {
            self.details = Some(entry);
        }
    }

    /// Go to the parent directory.
    pub fn go_up(&mut self) {
        let parent = parent_path(&self.current_path);
        self.load_directory(&parent);
    }

    /// Move the selection by one.
    pub fn move_selection(&mut self, down: bool) {
        if self.entries.is_empty() {
            return;
        }
        self.selected = if down {
            (self.selected + 1).min(self.entries.len() - 1)
        } else {
            self.selected.saturating_sub(1)
        };
    }

    /// Hide the details drawer.
    pub fn close_details(&mut self) {
        self.details = None;
    }

    fn fail(&mut self, message: String) {
        self.loading = false;
        self.entries.clear();
        self.error = Some(message);
    }

    /// Apply a listing or search reply.
    pub fn on_completion(&mut self, ticket: Ticket, result: Result<ApiResponse>) {
        if !self.listing_epoch.is_current(ticket.epoch) {
            tracing::debug!("dropping stale listing {}", ticket.epoch);
            return;
        }

        self.loading = false;
        match result {
            Ok(ApiResponse::Files(entries)) => {
                self.entries = entries;
                self.selected = 0;
                self.error = None;
            }
            Ok(other) => tracing::warn!("{}", unexpected(ticket.target, &other)),
            Err(e) => self.fail(e.to_string()),
        }
    }

    /// Current directory.
    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    /// Breadcrumbs of the current directory.
    pub fn breadcrumbs(&self) -> Vec<Crumb> {
        breadcrumbs(&self.current_path)
    }

    /// Listed entries.
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    /// Index of the highlighted entry.
    pub const fn selected(&self) -> usize {
        self.selected
    }

    /// The highlighted entry.
    pub fn selection(&self) -> Option<&FileEntry> {
        self.entries.get(self.selected)
    }

    /// File shown in the details drawer.
    pub const fn details(&self) -> Option<&FileEntry> {
        self.details.as_ref()
    }

    /// Whether a request is in flight.
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Error of the last request.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Search box text.
    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    /// Keyword of the active search, if the listing shows search results.
    pub fn searching(&self) -> Option<&str> {
        self.searching.as_deref()
    }
}
