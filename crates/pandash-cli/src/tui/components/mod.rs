//! Reusable TUI widgets.

mod help_overlay;
mod nav_menu;
mod spinner;
mod status_bar;
mod text_input;

pub use help_overlay::{centered_rect, HelpOverlay};
pub use nav_menu::{AccountList, NavMenu};
pub use spinner::{LoadingIndicator, Spinner, SpinnerState, SpinnerStyle};
pub use status_bar::{StatusBar, StatusInfo};
pub use text_input::TextInput;
