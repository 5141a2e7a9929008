//! Knowledge table: entry model, filters, pagination, columns and cell formatting.
//!
//! The knowledge table is a paginated admin view over crawled article records
//! served under `/api/knowledge`. Query building and cell formatting are pure
//! so both the dashboard and the CLI share them.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Entry statuses in display order.
pub const STATUS_ORDER: [&str; 5] = ["pending", "processing", "transferred", "completed", "failed"];

/// Human-readable label for a status, falling back to the raw value.
pub fn status_label(status: &str) -> &str {
    match status {
        "pending" => "Pending",
        "processing" => "Processing",
        "transferred" => "Transferred",
        "completed" => "Completed",
        "failed" => "Failed",
        other => other,
    }
}

/// A column of the knowledge table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Column {
    /// Field name on the wire and in export `fields`
    pub key: &'static str,
    /// Header label
    pub label: &'static str,
    /// Visible before the user changes anything
    pub default_visible: bool,
}

/// Every column in table order.
pub const COLUMNS: [Column; 13] = [
    Column { key: "article_id", label: "Article ID", default_visible: false },
    Column { key: "article_title", label: "Title", default_visible: true },
    Column { key: "article_url", label: "Article URL", default_visible: false },
    Column { key: "tag", label: "Tag", default_visible: true },
    Column { key: "original_link", label: "Original link", default_visible: true },
    Column { key: "original_password", label: "Original pwd", default_visible: true },
    Column { key: "new_link", label: "New link", default_visible: true },
    Column { key: "new_password", label: "New pwd", default_visible: true },
    Column { key: "new_title", label: "New title", default_visible: false },
    Column { key: "status", label: "Status", default_visible: true },
    Column { key: "error_message", label: "Error", default_visible: false },
    Column { key: "created_at", label: "Created", default_visible: true },
    Column { key: "updated_at", label: "Updated", default_visible: false },
];

/// Keys of the default-visible columns.
pub fn default_columns() -> Vec<&'static str> {
    COLUMNS
        .iter()
        .filter(|c| c.default_visible)
        .map(|c| c.key)
        .collect()
}

/// Look up a column by key.
pub fn column(key: &str) -> Option<&'static Column> {
    COLUMNS.iter().find(|c| c.key == key)
}

fn stringish<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// One knowledge record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct KnowledgeEntry {
    #[serde(deserialize_with = "stringish")]
    pub id: Option<String>,
    #[serde(deserialize_with = "stringish")]
    pub article_id: Option<String>,
    #[serde(deserialize_with = "stringish")]
    pub article_title: Option<String>,
    #[serde(deserialize_with = "stringish")]
    pub article_url: Option<String>,
    #[serde(deserialize_with = "stringish")]
    pub tag: Option<String>,
    #[serde(deserialize_with = "stringish")]
    pub original_link: Option<String>,
    #[serde(deserialize_with = "stringish")]
    pub original_password: Option<String>,
    #[serde(deserialize_with = "stringish")]
    pub new_link: Option<String>,
    #[serde(deserialize_with = "stringish")]
    pub new_password: Option<String>,
    #[serde(deserialize_with = "stringish")]
    pub new_title: Option<String>,
    #[serde(deserialize_with = "stringish")]
    pub status: Option<String>,
    #[serde(deserialize_with = "stringish")]
    pub error_message: Option<String>,
    #[serde(deserialize_with = "stringish")]
    pub created_at: Option<String>,
    #[serde(deserialize_with = "stringish")]
    pub updated_at: Option<String>,
}

impl KnowledgeEntry {
    /// Raw value of a column, if present and non-empty.
    pub fn raw(&self, key: &str) -> Option<&str> {
        let value = match key {
            "article_id" => &self.article_id,
            "article_title" => &self.article_title,
            "article_url" => &self.article_url,
            "tag" => &self.tag,
            "original_link" => &self.original_link,
            "original_password" => &self.original_password,
            "new_link" => &self.new_link,
            "new_password" => &self.new_password,
            "new_title" => &self.new_title,
            "status" => &self.status,
            "error_message" => &self.error_message,
            "created_at" => &self.created_at,
            "updated_at" => &self.updated_at,
            _ => return None,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }
}

/// Truncate to `max` characters, appending "..." when shortened.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{head}...")
    }
}

/// Render a cell for display.
pub fn format_cell(key: &str, entry: &KnowledgeEntry) -> String {
    let Some(value) = entry.raw(key) else {
        return "-".to_string();
    };

    match key {
        "status" => status_label(value).to_string(),
        "article_url" | "original_link" | "new_link" | "error_message" => truncate(value, 30),
        "original_password" | "new_password" => "••••".to_string(),
        "article_title" | "new_title" => truncate(value, 40),
        "created_at" | "updated_at" => format_datetime(value),
        _ => value.to_string(),
    }
}

/// Format a server timestamp as `YYYY-MM-DD HH:MM`, leaving unparseable values as-is.
pub fn format_datetime(value: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(value) {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    for pattern in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(value, pattern) {
            return dt.format("%Y-%m-%d %H:%M").to_string();
        }
    }
    value.to_string()
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Ascending
    Asc,
    /// Descending
    #[default]
    Desc,
}

impl SortOrder {
    /// Query parameter value.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// The other direction.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Fields the backend accepts for `sort`.
pub const SORT_FIELDS: [&str; 4] = ["created_at", "updated_at", "article_title", "status"];

/// Table filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    /// Free-text search
    pub search: String,
    /// Selected statuses
    pub status: Vec<String>,
    /// Tag filter
    pub tag: String,
    /// Lower date bound (`YYYY-MM-DD`)
    pub date_from: String,
    /// Upper date bound (`YYYY-MM-DD`)
    pub date_to: String,
    /// Sort field
    pub sort: String,
    /// Sort direction
    pub order: SortOrder,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            search: String::new(),
            status: Vec::new(),
            tag: String::new(),
            date_from: String::new(),
            date_to: String::new(),
            sort: "created_at".to_string(),
            order: SortOrder::Desc,
        }
    }
}

impl Filters {
    /// Sort and filter parameters shared by the entries and export endpoints.
    ///
    /// Optional filters are only sent when non-empty, and `status` only when
    /// exactly one status is selected.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("sort", self.sort.clone()),
            ("order", self.order.as_str().to_string()),
        ];

        if !self.search.is_empty() {
            params.push(("search", self.search.clone()));
        }
        if let [only] = self.status.as_slice() {
            params.push(("status", only.clone()));
        }
        if !self.tag.is_empty() {
            params.push(("tag", self.tag.clone()));
        }
        if !self.date_from.is_empty() {
            params.push(("date_from", self.date_from.clone()));
        }
        if !self.date_to.is_empty() {
            params.push(("date_to", self.date_to.clone()));
        }

        params
    }
}

/// A page request for `GET /api/knowledge/entries`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryQuery {
    /// 1-based page number, sent as-is
    pub page: i64,
    /// Rows per page
    pub page_size: u32,
    /// Filters
    pub filters: Filters,
}

impl Default for EntryQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: crate::DEFAULT_PAGE_SIZE,
            filters: Filters::default(),
        }
    }
}

impl EntryQuery {
    /// Query string parameters.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("page_size", self.page_size.to_string()),
        ];
        params.extend(self.filters.params());
        params
    }
}

/// Query string parameters for `GET /api/knowledge/export`.
pub fn export_params(fields: &[&str], filters: &Filters) -> Vec<(&'static str, String)> {
    let mut params = vec![("fields", fields.join(","))];
    params.extend(filters.params());
    params
}

/// Export filename for a given local date.
pub fn export_filename(date: chrono::NaiveDate) -> String {
    format!("knowledge_export_{}.csv", date.format("%Y-%m-%d"))
}

/// Pagination block of an entries response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    /// Current page
    pub page: i64,
    /// Rows per page
    pub page_size: u32,
    /// Total matching rows
    pub total: u64,
    /// Total pages
    pub total_pages: i64,
}

impl Pagination {
    /// Whether a previous page exists.
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Whether a next page exists.
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// A page of entries plus the optional status summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryPage {
    /// Rows
    pub entries: Vec<KnowledgeEntry>,
    /// Pagination
    pub pagination: Pagination,
    /// Per-status counts, when the backend includes them
    pub summary: Option<BTreeMap<String, u64>>,
}

/// Status counts in display order, skipping statuses the server did not report.
pub fn summary_cards(statuses: &BTreeMap<String, u64>) -> Vec<(&'static str, u64)> {
    STATUS_ORDER
        .iter()
        .filter_map(|s| statuses.get(*s).map(|n| (*s, *n)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_default_query_params() {
        let params = EntryQuery::default().params();
        assert_eq!(param(&params, "page"), Some("1"));
        assert_eq!(param(&params, "page_size"), Some("50"));
        assert_eq!(param(&params, "sort"), Some("created_at"));
        assert_eq!(param(&params, "order"), Some("DESC"));
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn test_status_sent_only_when_single() {
        let mut query = EntryQuery::default();
        query.filters.status = vec!["failed".into()];
        assert_eq!(param(&query.params(), "status"), Some("failed"));

        query.filters.status = vec!["failed".into(), "pending".into()];
        assert_eq!(param(&query.params(), "status"), None);
    }

    #[test]
    fn test_optional_filters_skip_empty() {
        let mut query = EntryQuery::default();
        query.filters.tag = "books".into();
        query.filters.date_to = "2024-02-01".into();

        let params = query.params();
        assert_eq!(param(&params, "tag"), Some("books"));
        assert_eq!(param(&params, "date_to"), Some("2024-02-01"));
        assert_eq!(param(&params, "search"), None);
        assert_eq!(param(&params, "date_from"), None);
    }

    #[test]
    fn test_out_of_range_page_sent_as_is() {
        let query = EntryQuery {
            page: 99,
            ..EntryQuery::default()
        };
        assert_eq!(param(&query.params(), "page"), Some("99"));
    }

    #[test]
    fn test_pagination_bounds() {
        let p = Pagination {
            page: 1,
            page_size: 50,
            total: 120,
            total_pages: 3,
        };
        assert!(!p.has_prev());
        assert!(p.has_next());

        let last = Pagination { page: 3, ..p };
        assert!(last.has_prev());
        assert!(!last.has_next());
    }

    #[test]
    fn test_format_cell() {
        let entry = KnowledgeEntry {
            article_title: Some("x".repeat(45)),
            original_password: Some("abcd".into()),
            status: Some("transferred".into()),
            new_link: Some(String::new()),
            created_at: Some("2024-03-05 10:20:30".into()),
            ..KnowledgeEntry::default()
        };

        assert_eq!(format_cell("article_title", &entry), format!("{}...", "x".repeat(40)));
        assert_eq!(format_cell("original_password", &entry), "••••");
        assert_eq!(format_cell("status", &entry), "Transferred");
        assert_eq!(format_cell("new_link", &entry), "-");
        assert_eq!(format_cell("tag", &entry), "-");
        assert_eq!(format_cell("created_at", &entry), "2024-03-05 10:20");
    }

    #[test]
    fn test_export_params_and_filename() {
        let filters = Filters {
            search: "rust".into(),
            ..Filters::default()
        };
        let params = export_params(&default_columns(), &filters);
        assert_eq!(
            param(&params, "fields"),
            Some("article_title,tag,original_link,original_password,new_link,new_password,status,created_at")
        );
        assert_eq!(param(&params, "search"), Some("rust"));

        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        assert_eq!(export_filename(date), "knowledge_export_2024-01-09.csv");
    }

    #[test]
    fn test_summary_cards_order() {
        let mut statuses = BTreeMap::new();
        statuses.insert("failed".to_string(), 2);
        statuses.insert("pending".to_string(), 7);
        statuses.insert("archived".to_string(), 1);

        assert_eq!(summary_cards(&statuses), vec![("pending", 7), ("failed", 2)]);
    }

    #[test]
    fn test_entry_page_decodes() {
        let page: EntryPage = serde_json::from_str(
            r#"{"entries":[{"id":1,"article_id":42,"tag":"a"}],"pagination":{"page":1,"page_size":50,"total":1,"total_pages":1}}"#,
        )
        .unwrap();
        assert_eq!(page.entries[0].article_id.as_deref(), Some("42"));
        assert!(page.summary.is_none());
    }
}
