//! User intents produced by the key map and applied by the app.

use pandash_core::api::QueueAction;
use pandash_core::dashboard::Tab;

use super::state::InputMode;

/// Actions that can be triggered by user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Exit the application
    Quit,
    /// Show or hide the help overlay
    ToggleHelp,
    /// Show or hide the notice log
    ToggleLog,

    /// Switch to a specific tab
    SwitchTab(Tab),
    /// Next tab (wraps)
    NextTab,
    /// Previous tab (wraps)
    PrevTab,
    /// Select the next account
    NextAccount,
    /// Select the previous account
    PrevAccount,
    /// Reload whatever the active tab shows
    Refresh,
    /// Reload the queue totals in the header
    RefreshSummary,
    /// Forget the API key
    Logout,

    /// Move the active list cursor up
    ListUp,
    /// Move the active list cursor down
    ListDown,

    /// Start typing into an input box
    BeginInput(InputMode),
    /// Append a character to the input box
    InputChar(char),
    /// Delete the last character of the input box
    InputBackspace,
    /// Commit the input box
    InputSubmit,
    /// Abandon the input box
    InputCancel,

    /// Open the highlighted directory or show file details
    OpenEntry,
    /// Go to the parent directory
    GoUp,
    /// Close the details drawer, or leave search results
    BrowseBack,
    /// Copy the current path
    CopyPath,

    /// Switch which queue receives controls
    ToggleQueueFocus,
    /// Control the focused queue
    QueueControl(QueueAction),
    /// Export the focused queue as CSV
    ExportQueue,
    /// Turn polling on or off
    ToggleAutoRefresh,

    /// Edit or toggle the highlighted settings row
    EditSetting,
    /// Save the settings form
    SaveSettings,

    /// Previous knowledge page
    PrevPage,
    /// Next knowledge page
    NextPage,
    /// Cycle the status filter
    CycleStatus,
    /// Cycle the tag filter
    CycleTag,
    /// Sort by the next sortable field
    CycleSort,
    /// Flip the sort direction
    ToggleOrder,
    /// Cycle the page size
    CyclePageSize,
    /// Clear every filter
    ResetFilters,
    /// Move the column picker left
    ColumnLeft,
    /// Move the column picker right
    ColumnRight,
    /// Show or hide the picked column
    ToggleColumn,
    /// Export the filtered table as CSV
    ExportKnowledge,
    /// Copy the highlighted entry's link
    CopyLink,
    /// Open the highlighted entry's link in a browser
    OpenLink,

    /// No action
    None,
}
