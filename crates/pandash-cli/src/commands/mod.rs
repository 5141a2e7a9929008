//! CLI command definitions and handlers.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use pandash_core::api::{ApiClient, QueueAction, QueueKind};
use pandash_core::config::Config;
use pandash_core::knowledge::{Filters, SortOrder};
use pandash_core::session::SessionStore;

pub mod accounts;
pub mod completions;
pub mod config;
pub mod files;
pub mod knowledge;
pub mod login;
pub mod queues;
pub mod settings;
pub mod tui;

/// Load configuration with graceful fallback to defaults.
///
/// If the config file doesn't exist or can't be parsed, it falls back to defaults.
pub fn load_config() -> Config {
    Config::load().unwrap_or_else(|e| {
        tracing::warn!("Using default configuration: {e}");
        Config::default()
    })
}

/// Load the persisted session.
pub fn load_session() -> SessionStore {
    SessionStore::load_or_default(&SessionStore::default_path())
}

/// Build a client for the configured server carrying the stored API key.
///
/// Fails when no key has been stored yet.
pub fn authenticated_client(config: &Config, session: &SessionStore) -> Result<ApiClient> {
    let Some(key) = session.api_key() else {
        bail!("Not logged in. Run 'pandash login <KEY>' first.");
    };
    Ok(ApiClient::from_config(&config.server).with_api_key(Some(key.to_string())))
}

/// Pick the account a command operates on.
///
/// `--account` wins, then the account selected in the dashboard, then the
/// first account the server reports.
pub async fn resolve_account(
    explicit: Option<String>,
    session: &SessionStore,
    client: &ApiClient,
) -> Result<String> {
    if let Some(account) = explicit {
        return Ok(account);
    }
    if let Some(account) = session.selected_account() {
        return Ok(account.to_string());
    }

    let info = client
        .info()
        .await
        .context("Failed to fetch the account list")?;
    match info.accounts.into_iter().next() {
        Some(account) => Ok(account),
        None => Err(pandash_core::Error::NoAccount.into()),
    }
}

/// Turn a core error into an `anyhow` error carrying the suggestion, if any.
pub fn explain(err: pandash_core::Error) -> anyhow::Error {
    match err.suggestion() {
        Some(hint) => anyhow::anyhow!("{err}\n  hint: {hint}"),
        None => err.into(),
    }
}

/// Pandash - terminal control panel for the pan transfer/share backend
#[derive(Parser)]
#[command(name = "pandash")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand)]
pub enum Command {
    /// Open the full-screen dashboard
    Tui(tui::TuiArgs),

    /// Validate and store an API key
    Login(LoginArgs),

    /// Forget the stored API key
    Logout,

    /// List accounts and select one
    Accounts(AccountsArgs),

    /// Show service health and queue totals
    Overview(OverviewArgs),

    /// Show the transfer and share queues of an account
    Queues(QueuesArgs),

    /// Start, pause, resume, stop or clear a queue
    Control(ControlArgs),

    /// Download a queue as CSV
    Export(ExportArgs),

    /// List or search the remote drive
    Files(FilesArgs),

    /// Show, validate or apply backend settings
    Settings(SettingsArgs),

    /// Query and export the knowledge table
    Knowledge(KnowledgeArgs),

    /// Manage local configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the login command
#[derive(Parser)]
pub struct LoginArgs {
    /// API key issued by the backend
    pub key: String,
}

/// Arguments for the accounts command
#[derive(Parser)]
pub struct AccountsArgs {
    /// Make this account the selected one
    #[arg(long)]
    pub select: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the overview command
#[derive(Parser)]
pub struct OverviewArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the queues command
#[derive(Parser)]
pub struct QueuesArgs {
    /// Account to show (defaults to the selected one)
    #[arg(short, long)]
    pub account: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Queue names accepted on the command line
#[derive(Clone, Copy, ValueEnum, Debug)]
pub enum QueueArg {
    /// Transfer queue
    Transfer,
    /// Share queue
    Share,
}

impl From<QueueArg> for QueueKind {
    fn from(arg: QueueArg) -> Self {
        match arg {
            QueueArg::Transfer => Self::Transfer,
            QueueArg::Share => Self::Share,
        }
    }
}

/// Queue actions accepted on the command line
#[derive(Clone, Copy, ValueEnum, Debug)]
pub enum ActionArg {
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

impl From<ActionArg> for QueueAction {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Start => Self::Start,
            ActionArg::Pause => Self::Pause,
            ActionArg::Resume => Self::Resume,
            ActionArg::Stop => Self::Stop,
            ActionArg::Clear => Self::Clear,
        }
    }
}

/// Arguments for the control command
#[derive(Parser)]
pub struct ControlArgs {
    /// Queue to control
    #[arg(value_enum)]
    pub queue: QueueArg,

    /// Action to perform
    #[arg(value_enum)]
    pub action: ActionArg,

    /// Account to operate on (defaults to the selected one)
    #[arg(short, long)]
    pub account: Option<String>,
}

/// Arguments for the export command
#[derive(Parser)]
pub struct ExportArgs {
    /// Queue to export
    #[arg(value_enum)]
    pub queue: QueueArg,

    /// Account to export (defaults to the selected one)
    #[arg(short, long)]
    pub account: Option<String>,

    /// Output file (defaults to <queue>_results_<timestamp>.csv in the export directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the files command
#[derive(Parser)]
pub struct FilesArgs {
    /// Remote directory to list
    #[arg(default_value = "/")]
    pub path: String,

    /// Search the directory for a keyword instead of listing it
    #[arg(short, long)]
    pub search: Option<String>,

    /// Account to browse (defaults to the selected one)
    #[arg(short, long)]
    pub account: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the settings command
#[derive(Parser)]
pub struct SettingsArgs {
    /// Settings subcommand
    #[command(subcommand)]
    pub action: SettingsAction,
}

/// Settings subcommands
#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the current backend settings as JSON
    Show,

    /// Check a settings JSON file without sending it
    Validate {
        /// Settings file
        file: PathBuf,
    },

    /// Validate a settings JSON file and save it on the server
    Apply {
        /// Settings file
        file: PathBuf,
    },
}

/// Arguments for the knowledge command
#[derive(Parser)]
pub struct KnowledgeArgs {
    /// Knowledge subcommand
    #[command(subcommand)]
    pub action: KnowledgeAction,
}

/// Knowledge subcommands
#[derive(Subcommand)]
pub enum KnowledgeAction {
    /// Print one page of entries
    Entries {
        /// Page number (sent as given)
        #[arg(short, long, default_value = "1")]
        page: i64,

        /// Rows per page
        #[arg(long, default_value_t = pandash_core::DEFAULT_PAGE_SIZE)]
        page_size: u32,

        /// Filters
        #[command(flatten)]
        filters: FilterArgs,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Download matching entries as CSV
    Export {
        /// Comma-separated columns (defaults to the visible table columns)
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,

        /// Filters
        #[command(flatten)]
        filters: FilterArgs,

        /// Output file (defaults to knowledge_export_<date>.csv in the export directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Knowledge table filters
#[derive(Parser, Debug, Default)]
pub struct FilterArgs {
    /// Free-text search
    #[arg(long)]
    pub search: Option<String>,

    /// Only entries with this status
    #[arg(long)]
    pub status: Option<String>,

    /// Only entries with this tag
    #[arg(long)]
    pub tag: Option<String>,

    /// Created on or after (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Created on or before (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,

    /// Sort field (created_at, updated_at, article_title, status)
    #[arg(long, default_value = "created_at")]
    pub sort: String,

    /// Sort ascending instead of descending
    #[arg(long)]
    pub asc: bool,
}

impl FilterArgs {
    /// Convert into the core filter type.
    pub fn into_filters(self) -> Filters {
        Filters {
            search: self.search.unwrap_or_default().trim().to_string(),
            status: self.status.into_iter().collect(),
            tag: self.tag.unwrap_or_default(),
            date_from: self.from.unwrap_or_default(),
            date_to: self.to.unwrap_or_default(),
            sort: self.sort,
            order: if self.asc {
                SortOrder::Asc
            } else {
                SortOrder::Desc
            },
        }
    }
}

/// Arguments for the config command
#[derive(Parser)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show all configuration
    Show,

    /// Show the configuration file path
    Path,

    /// Point the client at another backend
    SetServer {
        /// Base URL, e.g. http://127.0.0.1:5000
        url: String,
    },
}

/// Arguments for the completions command
#[derive(Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: ShellType,
}

/// Supported shell types for completions
#[derive(Clone, Copy, ValueEnum, Debug)]
pub enum ShellType {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell
    Elvish,
}
