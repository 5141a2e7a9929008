//! Pandash CLI - terminal control panel for the pan transfer/share backend
//!
//! Pandash drives the backend's transfer and share queues, browses the
//! remote drive and edits the backend settings, either from a full-screen
//! dashboard or from one-shot commands.
//!
//! ## Quick Start
//!
//! ```bash
//! # Store an API key
//! pandash login 0123456789abcdef
//!
//! # Open the dashboard on the queue tab
//! pandash tui --tab queue
//!
//! # Pause the transfer queue of account A
//! pandash control transfer pause --account A
//! ```

#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unused_async)]
#![allow(clippy::struct_excessive_bools)]

use anyhow::Result;
use clap::Parser;

mod commands;
mod tui;
pub mod ui;

use commands::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        Command::Tui(args) => commands::tui::run(args).await,
        Command::Login(args) => commands::login::run(args).await,
        Command::Logout => commands::login::logout(),
        Command::Accounts(args) => commands::accounts::run(args).await,
        Command::Overview(args) => commands::accounts::overview(args).await,
        Command::Queues(args) => commands::queues::run(args).await,
        Command::Control(args) => commands::queues::control(args).await,
        Command::Export(args) => commands::queues::export(args).await,
        Command::Files(args) => commands::files::run(args).await,
        Command::Settings(args) => commands::settings::run(args).await,
        Command::Knowledge(args) => commands::knowledge::run(args).await,
        Command::Config(args) => commands::config::run(args),
        Command::Completions(args) => {
            commands::completions::run(args.shell);
            Ok(())
        }
    }
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,pandash=info,pandash_core=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
