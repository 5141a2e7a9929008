//! Knowledge tab: paginated, filterable entries table with CSV export.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use super::dispatch::{unexpected, ApiRequest, ApiResponse, Target, Ticket};
use super::{AppContext, NoticeLevel, Tab};
use crate::bus::{Event, EventKind};
use crate::error::Result;
use crate::knowledge::{
    default_columns, export_filename, summary_cards, EntryPage, EntryQuery, Filters, Pagination,
    COLUMNS,
};
use crate::refresh::Epoch;

/// Knowledge tab controller.
#[derive(Debug)]
pub struct KnowledgeModule {
    ctx: AppContext,
    page: i64,
    page_size: u32,
    filters: Filters,
    columns: Vec<&'static str>,
    tags: Vec<String>,
    statuses: BTreeMap<String, u64>,
    summary: BTreeMap<String, u64>,
    result: Option<EntryPage>,
    loading: bool,
    error: Option<String>,
    initialized: bool,
    entries_epoch: Epoch,
    tags_epoch: Epoch,
    statuses_epoch: Epoch,
}

impl KnowledgeModule {
    /// Create the controller on page 1 with default filters and columns.
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            page: 1,
            page_size: crate::DEFAULT_PAGE_SIZE,
            filters: Filters::default(),
            columns: default_columns(),
            tags: Vec::new(),
            statuses: BTreeMap::new(),
            summary: BTreeMap::new(),
            result: None,
            loading: false,
            error: None,
            initialized: false,
            entries_epoch: Epoch::default(),
            tags_epoch: Epoch::default(),
            statuses_epoch: Epoch::default(),
        }
    }

    /// Load on first activation, reload entries afterwards.
    pub fn attach(this: &Rc<RefCell<Self>>) {
        let weak = Rc::downgrade(this);
        let bus = Rc::clone(&this.borrow().ctx.bus);
        bus.subscribe(EventKind::TabChanged, move |event| {
            if let (Event::TabChanged(Tab::Knowledge), Some(module)) =
                (event, Weak::upgrade(&weak))
            {
                let mut module = module.borrow_mut();
                if module.initialized {
                    module.load_entries();
                } else {
                    module.load_initial();
                }
            }
        });
    }

    /// Fetch tags, status counts and the current page.
    pub fn load_initial(&mut self) {
        self.initialized = true;

        let epoch = self.tags_epoch.advance();
        self.ctx.dispatcher.dispatch(
            Ticket::new(Target::KnowledgeTags, epoch),
            ApiRequest::KnowledgeTags,
        );

        let epoch = self.statuses_epoch.advance();
        self.ctx.dispatcher.dispatch(
            Ticket::new(Target::KnowledgeStatuses, epoch),
            ApiRequest::KnowledgeStatuses,
        );

        self.load_entries();
    }

    /// Reload everything and confirm.
    pub fn refresh(&mut self) {
        self.load_initial();
        self.ctx.notify(NoticeLevel::Info, "Data refreshed");
    }

    /// The query the next entries fetch sends.
    pub fn query(&self) -> EntryQuery {
        EntryQuery {
            page: self.page,
            page_size: self.page_size,
            filters: self.filters.clone(),
        }
    }

    /// Fetch the current page.
    pub fn load_entries(&mut self) {
        self.loading = true;
        self.error = None;
        let epoch = self.entries_epoch.advance();
        self.ctx.dispatcher.dispatch(
            Ticket::new(Target::KnowledgeEntries, epoch),
            ApiRequest::KnowledgeEntries(self.query()),
        );
    }

    /// Jump to `page`. The value is sent as-is; the server decides what an
    /// out-of-range page returns.
    pub fn go_to_page(&mut self, page: i64) {
        self.page = page;
        self.load_entries();
    }

    /// Previous page, if there is one.
    pub fn prev_page(&mut self) {
        if self.pagination().has_prev() {
            self.go_to_page(self.page - 1);
        }
    }

    /// Next page, if there is one.
    pub fn next_page(&mut self) {
        if self.pagination().has_next() {
            self.go_to_page(self.page + 1);
        }
    }

    /// Replace the filters and reload from page 1.
    pub fn apply_filters(&mut self, filters: Filters) {
        self.filters = Filters {
            search: filters.search.trim().to_string(),
            ..filters
        };
        self.page = 1;
        self.load_entries();
        self.ctx.notify(NoticeLevel::Info, "Filters applied");
    }

    /// Restore default filters and reload from page 1.
    pub fn reset_filters(&mut self) {
        self.filters = Filters::default();
        self.page = 1;
        self.load_entries();
        self.ctx.notify(NoticeLevel::Info, "Filters reset");
    }

    /// Change the page size and reload from page 1.
    pub fn set_page_size(&mut self, page_size: u32) {
        self.page_size = page_size.max(1);
        self.page = 1;
        self.load_entries();
    }

    /// Sort by `field`; sorting by the current field flips the direction.
    pub fn sort_by(&mut self, field: &str) {
        if self.filters.sort == field {
            self.filters.order = self.filters.order.toggled();
        } else {
            self.filters.sort = field.to_string();
            self.filters.order = crate::knowledge::SortOrder::Desc;
        }
        self.page = 1;
        self.load_entries();
    }

    /// Show or hide a column. At least one column stays visible.
    pub fn toggle_column(&mut self, key: &str) {
        if let Some(pos) = self.columns.iter().position(|c| *c == key) {
            if self.columns.len() == 1 {
                self.ctx
                    .notify(NoticeLevel::Error, "Select at least one column");
                return;
            }
            self.columns.remove(pos);
        } else if let Some(column) = COLUMNS.iter().find(|c| c.key == key) {
            self.columns.push(column.key);
            self.columns.sort_by_key(|k| COLUMNS.iter().position(|c| c.key == *k));
        }
    }

    /// Export the visible columns under the active filters.
    pub fn export(&mut self) {
        let destination = self
            .ctx
            .export_dir
            .join(export_filename(chrono::Utc::now().date_naive()));
        self.ctx.dispatcher.dispatch(
            Ticket::new(Target::KnowledgeExport, 0),
            ApiRequest::KnowledgeExport {
                fields: self.columns.iter().map(|c| (*c).to_string()).collect(),
                filters: self.filters.clone(),
                destination,
            },
        );
    }

    /// Apply a reply addressed to this tab.
    pub fn on_completion(&mut self, ticket: Ticket, result: Result<ApiResponse>) {
        match ticket.target {
            Target::KnowledgeEntries if self.entries_epoch.is_current(ticket.epoch) => {
                self.loading = false;
                match result {
                    Ok(ApiResponse::Entries(page)) => {
                        if let Some(summary) = &page.summary {
                            self.summary.clone_from(summary);
                        }
                        self.result = Some(page);
                    }
                    Ok(other) => tracing::warn!("{}", unexpected(ticket.target, &other)),
                    Err(e) => self.error = Some(e.to_string()),
                }
            }
            Target::KnowledgeTags if self.tags_epoch.is_current(ticket.epoch) => match result {
                Ok(ApiResponse::Tags(tags)) => self.tags = tags,
                Ok(other) => tracing::warn!("{}", unexpected(ticket.target, &other)),
                Err(e) => tracing::warn!("Failed to load tags: {e}"),
            },
            Target::KnowledgeStatuses if self.statuses_epoch.is_current(ticket.epoch) => {
                match result {
                    Ok(ApiResponse::Statuses(statuses)) => {
                        self.summary.clone_from(&statuses);
                        self.statuses = statuses;
                    }
                    Ok(other) => tracing::warn!("{}", unexpected(ticket.target, &other)),
                    Err(e) => tracing::warn!("Failed to load statuses: {e}"),
                }
            }
            Target::KnowledgeExport => match result {
                Ok(ApiResponse::Saved(path)) => self
                    .ctx
                    .notify(NoticeLevel::Success, format!("Exported to {}", path.display())),
                Ok(other) => tracing::warn!("{}", unexpected(ticket.target, &other)),
                Err(e) => self
                    .ctx
                    .notify(NoticeLevel::Error, format!("Export failed: {e}")),
            },
            _ => tracing::debug!("dropping stale knowledge reply {ticket:?}"),
        }
    }

    /// Requested page.
    pub const fn page(&self) -> i64 {
        self.page
    }

    /// Rows per page.
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Active filters.
    pub const fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Visible column keys in table order.
    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    /// Known tags.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Status counts for the filter list.
    pub const fn statuses(&self) -> &BTreeMap<String, u64> {
        &self.statuses
    }

    /// Summary cards in display order.
    pub fn summary(&self) -> Vec<(&'static str, u64)> {
        summary_cards(&self.summary)
    }

    /// Last page received.
    pub const fn result(&self) -> Option<&EntryPage> {
        self.result.as_ref()
    }

    /// Pagination of the last page, or the requested page before any reply.
    pub fn pagination(&self) -> Pagination {
        self.result.as_ref().map_or(
            Pagination {
                page: self.page,
                page_size: self.page_size,
                total: 0,
                total_pages: 0,
            },
            |r| r.pagination,
        )
    }

    /// Whether a page fetch is in flight.
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Error of the last page fetch.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::testing::context;
    use crate::dashboard::RecordingDispatcher;
    use crate::knowledge::SortOrder;

    fn module() -> (AppContext, KnowledgeModule, Rc<RecordingDispatcher>) {
        let (ctx, recorder, _rx) = context();
        let module = KnowledgeModule::new(ctx.clone());
        (ctx, module, recorder)
    }

    fn last_query(recorder: &RecordingDispatcher) -> EntryQuery {
        match recorder.last(Target::KnowledgeEntries) {
            Some((_, ApiRequest::KnowledgeEntries(query))) => query,
            other => panic!("expected an entries request, got {other:?}"),
        }
    }

    fn page(page: i64, total_pages: i64) -> EntryPage {
        EntryPage {
            entries: Vec::new(),
            pagination: Pagination {
                page,
                page_size: 50,
                total: 120,
                total_pages,
            },
            summary: None,
        }
    }

    #[test]
    fn test_first_activation_loads_everything() {
        let (ctx, recorder, _rx) = context();
        let module = Rc::new(RefCell::new(KnowledgeModule::new(ctx.clone())));
        KnowledgeModule::attach(&module);

        ctx.bus.publish(&Event::TabChanged(Tab::Knowledge));
        assert_eq!(recorder.count(Target::KnowledgeTags), 1);
        assert_eq!(recorder.count(Target::KnowledgeStatuses), 1);
        assert_eq!(recorder.count(Target::KnowledgeEntries), 1);

        ctx.bus.publish(&Event::TabChanged(Tab::Knowledge));
        assert_eq!(recorder.count(Target::KnowledgeTags), 1);
        assert_eq!(recorder.count(Target::KnowledgeEntries), 2);
    }

    #[test]
    fn test_go_to_page_is_not_clamped() {
        let (_ctx, mut module, recorder) = module();

        module.go_to_page(999);
        assert_eq!(last_query(&recorder).page, 999);

        module.go_to_page(-3);
        assert_eq!(last_query(&recorder).page, -3);
    }

    #[test]
    fn test_prev_next_follow_pagination() {
        let (_ctx, mut module, recorder) = module();

        module.load_entries();
        let (ticket, _) = recorder.last(Target::KnowledgeEntries).unwrap();
        module.on_completion(ticket, Ok(ApiResponse::Entries(page(1, 3))));

        module.prev_page();
        assert_eq!(recorder.count(Target::KnowledgeEntries), 1);

        module.next_page();
        assert_eq!(last_query(&recorder).page, 2);

        let (ticket, _) = recorder.last(Target::KnowledgeEntries).unwrap();
        module.on_completion(ticket, Ok(ApiResponse::Entries(page(3, 3))));
        module.next_page();
        assert_eq!(recorder.count(Target::KnowledgeEntries), 2);
    }

    #[test]
    fn test_filters_and_page_size_reset_page() {
        let (_ctx, mut module, recorder) = module();
        module.go_to_page(4);

        module.apply_filters(Filters {
            search: "  rust  ".into(),
            status: vec!["failed".into()],
            ..Filters::default()
        });
        let query = last_query(&recorder);
        assert_eq!(query.page, 1);
        assert_eq!(query.filters.search, "rust");

        module.go_to_page(4);
        module.set_page_size(100);
        let query = last_query(&recorder);
        assert_eq!((query.page, query.page_size), (1, 100));

        module.reset_filters();
        assert_eq!(last_query(&recorder).filters, Filters::default());
    }

    #[test]
    fn test_sort_by_toggles_direction() {
        let (_ctx, mut module, _recorder) = module();

        module.sort_by("created_at");
        assert_eq!(module.filters().order, SortOrder::Asc);

        module.sort_by("status");
        assert_eq!(module.filters().sort, "status");
        assert_eq!(module.filters().order, SortOrder::Desc);
    }

    #[test]
    fn test_columns_keep_table_order_and_one_minimum() {
        let (ctx, mut module, _recorder) = module();

        module.toggle_column("article_id");
        assert_eq!(module.columns()[0], "article_id");

        for key in module.columns().to_vec() {
            module.toggle_column(key);
        }
        assert_eq!(module.columns().len(), 1);
        assert!(ctx
            .drain_notices()
            .iter()
            .any(|n| n.level == NoticeLevel::Error));
    }

    #[test]
    fn test_entries_summary_updates_cards() {
        let (_ctx, mut module, recorder) = module();
        module.load_entries();

        let mut reply = page(1, 1);
        reply.summary = Some(BTreeMap::from([
            ("failed".to_string(), 2),
            ("pending".to_string(), 7),
        ]));
        let (ticket, _) = recorder.last(Target::KnowledgeEntries).unwrap();
        module.on_completion(ticket, Ok(ApiResponse::Entries(reply)));

        assert_eq!(module.summary(), vec![("pending", 7), ("failed", 2)]);
    }

    #[test]
    fn test_export_uses_visible_columns() {
        let (_ctx, mut module, recorder) = module();
        module.export();

        let Some((_, ApiRequest::KnowledgeExport {
            fields,
            destination,
            ..
        })) = recorder.last(Target::KnowledgeExport)
        else {
            panic!("expected an export request");
        };
        assert_eq!(fields, default_columns());
        let name = destination.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("knowledge_export_"));
    }
}
