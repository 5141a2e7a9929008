//! Seam between controllers and network I/O.
//!
//! Controllers describe what they need as an [`ApiRequest`] tagged with a
//! [`Ticket`]. The dispatcher runs it somewhere else and posts a
//! [`Completion`] back onto the app channel. Controllers compare the ticket's
//! epoch against their own to drop replies that a newer request superseded.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::rc::Rc;

use tokio::sync::mpsc;

use super::Message;
use crate::api::{
    ApiClient, FileEntry, Overview, QueueAction, QueueKind, QueueSnapshot, ServerInfo,
};
use crate::error::{Error, Result};
use crate::knowledge::{EntryPage, EntryQuery, Filters};
use crate::session::SessionStore;
use crate::settings::Settings;

/// Request slot a reply belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// API key validation (health + info)
    ValidateKey,
    /// Account list
    Accounts,
    /// Dashboard summary
    Overview,
    /// Browse listing or search
    Listing,
    /// Queue snapshot
    Queues,
    /// Queue control action
    QueueAction,
    /// Queue CSV export
    QueueExport,
    /// Settings fetch
    SettingsLoad,
    /// Settings save
    SettingsSave,
    /// Knowledge entries page
    KnowledgeEntries,
    /// Knowledge tag list
    KnowledgeTags,
    /// Knowledge status counts
    KnowledgeStatuses,
    /// Knowledge CSV export
    KnowledgeExport,
}

/// Identifies which request a reply answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    /// Request slot
    pub target: Target,
    /// Epoch of the slot when the request was issued
    pub epoch: u64,
}

impl Ticket {
    /// Create a ticket.
    pub const fn new(target: Target, epoch: u64) -> Self {
        Self { target, epoch }
    }
}

/// A backend call a controller wants made.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    /// `GET /api/health` then `GET /api/info`
    ValidateKey,
    /// `GET /api/info`
    Info,
    /// `GET /api/control/overview`
    Overview,
    /// `GET /api/files/list`
    ListFiles {
        /// Directory
        path: String,
        /// Account
        account: String,
    },
    /// `GET /api/files/search`
    SearchFiles {
        /// Keyword
        keyword: String,
        /// Directory the search is scoped to
        path: String,
        /// Account
        account: String,
    },
    /// `GET /api/control/queues`
    Queues,
    /// `POST /api/{kind}/{action}`
    QueueAction {
        /// Queue
        kind: QueueKind,
        /// Action
        action: QueueAction,
        /// Account
        account: String,
    },
    /// `GET /api/{kind}/export`, written to `destination`
    ExportQueue {
        /// Queue
        kind: QueueKind,
        /// Account
        account: String,
        /// File to write
        destination: PathBuf,
    },
    /// `GET /api/control/settings`
    GetSettings,
    /// `PUT /api/control/settings`
    PutSettings(Settings),
    /// `GET /api/knowledge/entries`
    KnowledgeEntries(EntryQuery),
    /// `GET /api/knowledge/tags`
    KnowledgeTags,
    /// `GET /api/knowledge/statuses`
    KnowledgeStatuses,
    /// `GET /api/knowledge/export`, written to `destination`
    KnowledgeExport {
        /// Columns to export
        fields: Vec<String>,
        /// Active filters
        filters: Filters,
        /// File to write
        destination: PathBuf,
    },
}

impl ApiRequest {
    /// Endpoint path, for logging.
    pub fn endpoint(&self) -> String {
        match self {
            Self::ValidateKey => "/api/health".to_string(),
            Self::Info => "/api/info".to_string(),
            Self::Overview => "/api/control/overview".to_string(),
            Self::ListFiles { .. } => "/api/files/list".to_string(),
            Self::SearchFiles { .. } => "/api/files/search".to_string(),
            Self::Queues => "/api/control/queues".to_string(),
            Self::QueueAction { kind, action, .. } => format!("/api/{kind}/{action}"),
            Self::ExportQueue { kind, .. } => format!("/api/{kind}/export"),
            Self::GetSettings | Self::PutSettings(_) => "/api/control/settings".to_string(),
            Self::KnowledgeEntries(_) => "/api/knowledge/entries".to_string(),
            Self::KnowledgeTags => "/api/knowledge/tags".to_string(),
            Self::KnowledgeStatuses => "/api/knowledge/statuses".to_string(),
            Self::KnowledgeExport { .. } => "/api/knowledge/export".to_string(),
        }
    }
}

/// Successful reply payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// Server info (also the result of key validation)
    Info(ServerInfo),
    /// Dashboard summary
    Overview(Overview),
    /// Directory listing or search results
    Files(Vec<FileEntry>),
    /// Queue snapshot
    Queues(QueueSnapshot),
    /// Action confirmation message
    ActionDone(String),
    /// Export written to this path
    Saved(PathBuf),
    /// Canonical settings
    Settings(Settings),
    /// Knowledge page
    Entries(EntryPage),
    /// Knowledge tags
    Tags(Vec<String>),
    /// Knowledge status counts
    Statuses(BTreeMap<String, u64>),
}

/// A finished request.
#[derive(Debug)]
pub struct Completion {
    /// Ticket the request was issued with
    pub ticket: Ticket,
    /// Outcome
    pub result: Result<ApiResponse>,
}

/// Something that can run [`ApiRequest`]s.
pub trait Dispatch {
    /// Start `request`. The outcome arrives later as [`Message::Completed`].
    fn dispatch(&self, ticket: Ticket, request: ApiRequest);
}

/// Run a request against the backend.
pub async fn execute(client: &ApiClient, request: ApiRequest) -> Result<ApiResponse> {
    match request {
        ApiRequest::ValidateKey => client.validate_key().await.map(ApiResponse::Info),
        ApiRequest::Info => client.info().await.map(ApiResponse::Info),
        ApiRequest::Overview => client.overview().await.map(ApiResponse::Overview),
        ApiRequest::ListFiles { path, account } => client
            .list_files(&path, &account)
            .await
            .map(ApiResponse::Files),
        ApiRequest::SearchFiles {
            keyword,
            path,
            account,
        } => client
            .search_files(&keyword, &path, &account)
            .await
            .map(ApiResponse::Files),
        ApiRequest::Queues => client.queues().await.map(ApiResponse::Queues),
        ApiRequest::QueueAction {
            kind,
            action,
            account,
        } => client
            .queue_action(kind, action, &account)
            .await
            .map(ApiResponse::ActionDone),
        ApiRequest::ExportQueue {
            kind,
            account,
            destination,
        } => {
            let bytes = client.export_queue(kind, &account).await?;
            write_export(destination, bytes).await
        }
        ApiRequest::GetSettings => client.settings().await.map(ApiResponse::Settings),
        ApiRequest::PutSettings(settings) => client
            .update_settings(&settings)
            .await
            .map(ApiResponse::Settings),
        ApiRequest::KnowledgeEntries(query) => client
            .knowledge_entries(&query)
            .await
            .map(ApiResponse::Entries),
        ApiRequest::KnowledgeTags => client.knowledge_tags().await.map(ApiResponse::Tags),
        ApiRequest::KnowledgeStatuses => client
            .knowledge_statuses()
            .await
            .map(ApiResponse::Statuses),
        ApiRequest::KnowledgeExport {
            fields,
            filters,
            destination,
        } => {
            let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
            let bytes = client.knowledge_export(&fields, &filters).await?;
            write_export(destination, bytes).await
        }
    }
}

async fn write_export(destination: PathBuf, bytes: Vec<u8>) -> Result<ApiResponse> {
    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(&destination, bytes).await?;
    Ok(ApiResponse::Saved(destination))
}

/// Dispatcher that runs requests on the tokio runtime with an [`ApiClient`].
///
/// The API key is read from the session at dispatch time, so a key saved
/// after construction is picked up by the next request.
pub struct ClientDispatcher {
    client: ApiClient,
    session: Rc<RefCell<SessionStore>>,
    tx: mpsc::UnboundedSender<Message>,
}

impl ClientDispatcher {
    /// Create a dispatcher posting completions to `tx`.
    pub const fn new(
        client: ApiClient,
        session: Rc<RefCell<SessionStore>>,
        tx: mpsc::UnboundedSender<Message>,
    ) -> Self {
        Self {
            client,
            session,
            tx,
        }
    }
}

impl Dispatch for ClientDispatcher {
    fn dispatch(&self, ticket: Ticket, request: ApiRequest) {
        let api_key = self.session.borrow().api_key().map(str::to_owned);
        let client = self.client.clone().with_api_key(api_key);
        let tx = self.tx.clone();

        tracing::debug!("dispatch {} ({:?})", request.endpoint(), ticket);

        tokio::spawn(async move {
            let result = execute(&client, request).await;
            if let Err(e) = &result {
                tracing::warn!("{:?} request failed: {e}", ticket.target);
            }
            let _ = tx.send(Message::Completed(Completion { ticket, result }));
        });
    }
}

/// Dispatcher that only records requests. Replies are fed back by hand.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    requests: RefCell<Vec<(Ticket, ApiRequest)>>,
}

impl RecordingDispatcher {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request recorded so far.
    pub fn requests(&self) -> Vec<(Ticket, ApiRequest)> {
        self.requests.borrow().clone()
    }

    /// Remove and return every recorded request.
    pub fn take(&self) -> Vec<(Ticket, ApiRequest)> {
        std::mem::take(&mut *self.requests.borrow_mut())
    }

    /// Number of recorded requests for `target`.
    pub fn count(&self, target: Target) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|(t, _)| t.target == target)
            .count()
    }

    /// The most recent request for `target`.
    pub fn last(&self, target: Target) -> Option<(Ticket, ApiRequest)> {
        self.requests
            .borrow()
            .iter()
            .rev()
            .find(|(t, _)| t.target == target)
            .cloned()
    }
}

impl Dispatch for RecordingDispatcher {
    fn dispatch(&self, ticket: Ticket, request: ApiRequest) {
        self.requests.borrow_mut().push((ticket, request));
    }
}

/// Build the error reported when a reply carries the wrong payload.
pub(crate) fn unexpected(target: Target, response: &ApiResponse) -> Error {
    Error::Internal(format!("unexpected {response:?} for {target:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_names() {
        let action = ApiRequest::QueueAction {
            kind: QueueKind::Share,
            action: QueueAction::Pause,
            account: "A".into(),
        };
        assert_eq!(action.endpoint(), "/api/share/pause");
        assert_eq!(ApiRequest::Queues.endpoint(), "/api/control/queues");
    }

    #[test]
    fn test_recording_dispatcher() {
        let recorder = RecordingDispatcher::new();
        recorder.dispatch(Ticket::new(Target::Queues, 1), ApiRequest::Queues);
        recorder.dispatch(Ticket::new(Target::Queues, 2), ApiRequest::Queues);
        recorder.dispatch(Ticket::new(Target::Overview, 1), ApiRequest::Overview);

        assert_eq!(recorder.count(Target::Queues), 2);
        assert_eq!(recorder.last(Target::Queues).map(|(t, _)| t.epoch), Some(2));
        assert_eq!(recorder.take().len(), 3);
        assert!(recorder.requests().is_empty());
    }

    #[tokio::test]
    async fn test_write_export_creates_parent() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out").join("share_results_1.csv");

        let saved = write_export(path.clone(), b"a,b\n1,2\n".to_vec()).await.unwrap();
        assert_eq!(saved, ApiResponse::Saved(path.clone()));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "a,b\n1,2\n");
    }
}
