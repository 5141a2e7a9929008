//! Wire types for the backend REST API.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Standard response envelope: `{success, data?, error?, message?}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// Whether the call succeeded
    #[serde(default)]
    pub success: bool,
    /// Payload on success
    pub data: Option<T>,
    /// Error text on failure
    #[serde(default)]
    pub error: Option<String>,
    /// Informational text (used by action endpoints)
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `GET /api/health`, which is not wrapped in an envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthStatus {
    /// "ok" when the service is up
    pub status: String,
    /// Server version
    pub version: Option<String>,
    /// Configured account names
    pub accounts: Vec<String>,
    /// Server wall-clock time
    pub timestamp: Option<String>,
}

impl HealthStatus {
    /// Whether the server reports itself healthy.
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// Payload of `GET /api/info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerInfo {
    /// Application name
    pub app_name: Option<String>,
    /// Server version
    pub version: Option<String>,
    /// Deployment environment
    pub environment: Option<String>,
    /// Configured account names
    pub accounts: Vec<String>,
    /// Accounts with a live backend service
    pub active_services: Vec<String>,
}

/// Accepts a string, a number or null and yields an optional string.
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

/// Accepts `0`/`1` as well as `true`/`false`.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Bool(b)) => b,
        Some(serde_json::Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
        Some(serde_json::Value::String(s)) => s == "1" || s.eq_ignore_ascii_case("true"),
        _ => false,
    })
}

/// An entry of a directory listing or search result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEntry {
    /// File or directory name
    #[serde(alias = "filename", deserialize_with = "stringish")]
    pub server_filename: Option<String>,
    /// Absolute path in the remote drive
    pub path: String,
    /// Size in bytes (0 for directories)
    pub size: u64,
    /// Modification time (unix seconds)
    #[serde(alias = "mtime")]
    pub server_mtime: Option<i64>,
    /// Remote file id
    #[serde(deserialize_with = "stringish")]
    pub fs_id: Option<String>,
    /// Whether this is a directory
    #[serde(deserialize_with = "flag")]
    pub isdir: bool,
    /// Content hash, when the backend provides one
    #[serde(deserialize_with = "stringish")]
    pub md5: Option<String>,
}

impl FileEntry {
    /// Display name, falling back to the last path segment.
    pub fn name(&self) -> &str {
        self.server_filename.as_deref().unwrap_or_else(|| {
            self.path
                .rsplit('/')
                .find(|s| !s.is_empty())
                .unwrap_or(self.path.as_str())
        })
    }
}

/// Which backend queue an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueKind {
    /// Save shared links into the drive
    Transfer,
    /// Create share links for files in the drive
    Share,
}

impl QueueKind {
    /// URL path segment.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::Share => "share",
        }
    }
}

impl fmt::Display for QueueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueueKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "transfer" => Ok(Self::Transfer),
            "share" => Ok(Self::Share),
            other => Err(format!("unknown queue '{other}' (expected transfer or share)")),
        }
    }
}

/// Control action on a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueAction {
    /// Start processing
    Start,
    /// Pause after the current task
    Pause,
    /// Resume a paused queue
    Resume,
    /// Stop processing
    Stop,
    /// Drop all tasks
    Clear,
}

impl QueueAction {
    /// URL path segment.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Stop => "stop",
            Self::Clear => "clear",
        }
    }
}

impl fmt::Display for QueueAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueueAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "pause" => Ok(Self::Pause),
            "resume" => Ok(Self::Resume),
            "stop" => Ok(Self::Stop),
            "clear" => Ok(Self::Clear),
            other => Err(format!("unknown action '{other}'")),
        }
    }
}

/// Payload of `GET /api/control/queues`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueSnapshot {
    /// Per-account queue state
    pub accounts: BTreeMap<String, AccountQueues>,
    /// Server time the snapshot was taken
    pub timestamp: String,
}

/// Both queues of one account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountQueues {
    /// Whether the account's backend service is up
    pub available: bool,
    /// Why the account is unavailable
    pub error: Option<String>,
    /// Transfer queue
    pub transfer: QueueState,
    /// Share queue
    pub share: QueueState,
}

/// Status counters and task rows of one queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueState {
    /// Counters
    pub status: QueueStatus,
    /// Task rows in server order
    pub queue: Vec<QueueTask>,
}

/// Queue counters. Missing counts read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueStatus {
    /// All tasks
    pub total: u64,
    /// Waiting
    pub pending: u64,
    /// In progress
    pub running: u64,
    /// Done
    pub completed: u64,
    /// Failed
    pub failed: u64,
    /// Skipped
    pub skipped: u64,
    /// Worker loop active
    pub is_running: bool,
    /// Worker loop paused
    pub is_paused: bool,
}

/// Name carried in a share task's `file_info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskFileInfo {
    /// File name
    pub name: Option<String>,
}

/// One task row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueTask {
    /// pending, running, completed, failed or skipped
    pub status: String,
    /// Source (transfer) or generated (share) link
    #[serde(deserialize_with = "stringish")]
    pub share_link: Option<String>,
    /// Destination directory of a transfer
    #[serde(deserialize_with = "stringish")]
    pub target_path: Option<String>,
    /// Task title
    #[serde(deserialize_with = "stringish")]
    pub title: Option<String>,
    /// File being shared
    pub file_info: Option<TaskFileInfo>,
    /// Creation time as sent by the server
    #[serde(deserialize_with = "stringish")]
    pub created_at: Option<String>,
}

/// Payload of `GET /api/control/overview`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Overview {
    /// Service health
    pub health: OverviewHealth,
    /// Account availability
    pub accounts: Vec<AccountSummary>,
    /// Totals across accounts
    pub queues_summary: QueuesSummary,
}

/// Health block of the overview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverviewHealth {
    /// "healthy" or similar
    pub status: String,
    /// Configured accounts
    pub total_accounts: u64,
    /// Accounts with a live service
    pub active_accounts: u64,
    /// Server time
    pub timestamp: String,
}

/// One account row of the overview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSummary {
    /// Account name
    pub name: String,
    /// Whether the account's service is up
    pub available: bool,
    /// Whether the account is logged in
    pub has_adapter: bool,
}

/// Queue totals across all accounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct QueuesSummary {
    pub total_transfer_pending: u64,
    pub total_transfer_running: u64,
    pub total_transfer_completed: u64,
    pub total_transfer_failed: u64,
    pub total_share_pending: u64,
    pub total_share_running: u64,
    pub total_share_completed: u64,
    pub total_share_failed: u64,
}
