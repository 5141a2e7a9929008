//! TUI command handler.

use anyhow::Result;

use crate::tui;

/// Arguments for the TUI command.
#[derive(clap::Parser)]
pub struct TuiArgs {
    /// Tab shown after login (browse, queue, settings, knowledge)
    #[arg(long, short)]
    pub tab: Option<String>,

    /// Theme to use (dark, light)
    #[arg(long)]
    pub theme: Option<String>,
}

/// Run the TUI application.
pub async fn run(args: TuiArgs) -> Result<()> {
    let tui_args = tui::TuiArgs {
        tab: args.tab,
        theme: args.theme,
    };

    tui::run(tui_args).await
}
