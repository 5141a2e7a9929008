//! Full-screen dashboard for Pandash.
//!
//! # Usage
//!
//! ```bash
//! # Launch the dashboard
//! pandash tui
//!
//! # Open the queue tab after login, light colors
//! pandash tui --tab queue --theme light
//! ```
//!
//! # Architecture
//!
//! Built on `ratatui` and `crossterm` over the controllers in
//! `pandash_core::dashboard`:
//!
//! - `app`: Terminal setup, message pump and main loop
//! - `state`: Cursors, toggles and the notice log
//! - `action`: User intents
//! - `event`: Terminal event polling and the key map
//! - `layout`: Responsive layouts
//! - `views`: Login screen and one view per tab
//! - `components`: Reusable widgets
//! - `theme`: Color themes

#![allow(
    clippy::use_self,
    clippy::missing_const_for_fn,
    clippy::match_same_arms,
    clippy::option_if_let_else,
    clippy::inefficient_to_string
)]

pub mod action;
pub mod app;
pub mod components;
pub mod event;
pub mod layout;
pub mod state;
pub mod theme;
pub mod views;

pub use app::{App, TuiArgs};

/// Run the TUI application.
pub async fn run(args: TuiArgs) -> anyhow::Result<()> {
    let _guard = suppress_logging();

    let mut app = App::new(args)?;
    app.run().await
}

/// Keep log lines off the alternate screen while the dashboard is up.
fn suppress_logging() -> tracing::subscriber::DefaultGuard {
    use tracing_subscriber::layer::SubscriberExt;

    let noop_subscriber =
        tracing_subscriber::registry().with(tracing_subscriber::filter::LevelFilter::OFF);

    tracing::subscriber::set_default(noop_subscriber)
}
