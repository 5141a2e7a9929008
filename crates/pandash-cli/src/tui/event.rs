//! Terminal event polling and the key map.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use pandash_core::api::QueueAction;
use pandash_core::dashboard::Tab;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::action::Action;
use super::state::{AppState, InputMode};

/// Polls crossterm on a background task and forwards events.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel_token: CancellationToken,
}

impl EventHandler {
    /// Spawn the polling task.
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel_token = CancellationToken::new();
        let token = cancel_token.clone();

        tokio::spawn(async move {
            while !token.is_cancelled() {
                if event::poll(tick_rate).unwrap_or(false) {
                    if let Ok(event) = event::read() {
                        if tx.send(event).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Self { rx, cancel_token }
    }

    /// Stop the polling task.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Next terminal event.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// Map a key event to an action based on current state.
pub fn map_key_event(key: KeyEvent, state: &AppState) -> Action {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    if state.help_visible {
        return match key.code {
            KeyCode::Esc | KeyCode::Char('?' | 'q') | KeyCode::F(1) => Action::ToggleHelp,
            _ => Action::None,
        };
    }

    if state.input_mode.is_typing() {
        return handle_input_keys(key);
    }

    if let Some(action) = handle_global_keys(key) {
        return action;
    }

    match state.active_tab {
        Tab::Browse => handle_browse_keys(key),
        Tab::Queue => handle_queue_keys(key),
        Tab::Settings => handle_settings_keys(key),
        Tab::Knowledge => handle_knowledge_keys(key),
    }
}

fn handle_input_keys(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Enter => Action::InputSubmit,
        KeyCode::Esc => Action::InputCancel,
        KeyCode::Backspace => Action::InputBackspace,
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            Action::InputChar(c)
        }
        _ => Action::None,
    }
}

fn handle_global_keys(key: KeyEvent) -> Option<Action> {
    let action = match key.code {
        KeyCode::Char('q' | 'Q') => Action::Quit,
        KeyCode::Char('?') | KeyCode::F(1) => Action::ToggleHelp,
        KeyCode::Char('L') => Action::ToggleLog,
        KeyCode::Tab => Action::NextTab,
        KeyCode::BackTab => Action::PrevTab,
        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            Action::SwitchTab(Tab::all()[index])
        }
        KeyCode::Char('[') => Action::PrevAccount,
        KeyCode::Char(']') => Action::NextAccount,
        KeyCode::Char('r') | KeyCode::F(5) => Action::Refresh,
        KeyCode::Char('R') => Action::RefreshSummary,
        KeyCode::Char('X') => Action::Logout,
        _ => return None,
    };
    Some(action)
}

fn handle_browse_keys(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Action::ListUp,
        KeyCode::Down | KeyCode::Char('j') => Action::ListDown,
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => Action::OpenEntry,
        KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => Action::GoUp,
        KeyCode::Esc => Action::BrowseBack,
        KeyCode::Char('/') => Action::BeginInput(InputMode::Search),
        KeyCode::Char('y') => Action::CopyPath,
        _ => Action::None,
    }
}

fn handle_queue_keys(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Left | KeyCode::Right | KeyCode::Char('h' | 'l') => Action::ToggleQueueFocus,
        KeyCode::Char('s') => Action::QueueControl(QueueAction::Start),
        KeyCode::Char('p') => Action::QueueControl(QueueAction::Pause),
        KeyCode::Char('u') => Action::QueueControl(QueueAction::Resume),
        KeyCode::Char('x') => Action::QueueControl(QueueAction::Stop),
        KeyCode::Char('C') => Action::QueueControl(QueueAction::Clear),
        KeyCode::Char('e') => Action::ExportQueue,
        KeyCode::Char('a') => Action::ToggleAutoRefresh,
        _ => Action::None,
    }
}

fn handle_settings_keys(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Action::ListUp,
        KeyCode::Down | KeyCode::Char('j') => Action::ListDown,
        KeyCode::Enter | KeyCode::Char(' ') => Action::EditSetting,
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Action::SaveSettings
        }
        KeyCode::Char('S') => Action::SaveSettings,
        _ => Action::None,
    }
}

fn handle_knowledge_keys(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Action::ListUp,
        KeyCode::Down | KeyCode::Char('j') => Action::ListDown,
        KeyCode::Left | KeyCode::Char('p' | 'h') => Action::PrevPage,
        KeyCode::Right | KeyCode::Char('n' | 'l') => Action::NextPage,
        KeyCode::Char('g') => Action::BeginInput(InputMode::PageJump),
        KeyCode::Char('/') => Action::BeginInput(InputMode::KnowledgeSearch),
        KeyCode::Char('f') => Action::BeginInput(InputMode::DateFrom),
        KeyCode::Char('F') => Action::BeginInput(InputMode::DateTo),
        KeyCode::Char('s') => Action::CycleStatus,
        KeyCode::Char('t') => Action::CycleTag,
        KeyCode::Char('o') => Action::CycleSort,
        KeyCode::Char('O') => Action::ToggleOrder,
        KeyCode::Char('z') => Action::CyclePageSize,
        KeyCode::Char('x') => Action::ResetFilters,
        KeyCode::Char(',') => Action::ColumnLeft,
        KeyCode::Char('.') => Action::ColumnRight,
        KeyCode::Char('v' | ' ') => Action::ToggleColumn,
        KeyCode::Char('e') => Action::ExportKnowledge,
        KeyCode::Char('y') => Action::CopyLink,
        KeyCode::Enter => Action::OpenLink,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn logged_in(tab: Tab) -> AppState {
        let mut state = AppState::default();
        state.set_authenticated(true);
        state.active_tab = tab;
        state
    }

    #[test]
    fn test_ctrl_c_always_quits() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        let mut state = AppState::default();
        assert_eq!(map_key_event(ctrl_c, &state), Action::Quit);

        state.help_visible = true;
        assert_eq!(map_key_event(ctrl_c, &state), Action::Quit);
    }

    #[test]
    fn test_login_prompt_captures_letters() {
        let state = AppState::default();
        assert_eq!(
            map_key_event(press(KeyCode::Char('q')), &state),
            Action::InputChar('q')
        );
        assert_eq!(
            map_key_event(press(KeyCode::Enter), &state),
            Action::InputSubmit
        );
    }

    #[test]
    fn test_help_swallows_keys() {
        let mut state = logged_in(Tab::Browse);
        state.help_visible = true;
        assert_eq!(map_key_event(press(KeyCode::Char('j')), &state), Action::None);
        assert_eq!(
            map_key_event(press(KeyCode::Esc), &state),
            Action::ToggleHelp
        );
    }

    #[test]
    fn test_digits_switch_tabs() {
        let state = logged_in(Tab::Browse);
        assert_eq!(
            map_key_event(press(KeyCode::Char('2')), &state),
            Action::SwitchTab(Tab::Queue)
        );
        assert_eq!(
            map_key_event(press(KeyCode::Char('4')), &state),
            Action::SwitchTab(Tab::Knowledge)
        );
    }

    #[test]
    fn test_same_key_differs_per_tab() {
        let key = press(KeyCode::Char('s'));
        assert_eq!(
            map_key_event(key, &logged_in(Tab::Queue)),
            Action::QueueControl(QueueAction::Start)
        );
        assert_eq!(
            map_key_event(key, &logged_in(Tab::Knowledge)),
            Action::CycleStatus
        );
        assert_eq!(map_key_event(key, &logged_in(Tab::Browse)), Action::None);
    }

    #[test]
    fn test_clear_needs_shift() {
        let state = logged_in(Tab::Queue);
        let shift_c = KeyEvent::new(KeyCode::Char('C'), KeyModifiers::SHIFT);
        assert_eq!(
            map_key_event(shift_c, &state),
            Action::QueueControl(QueueAction::Clear)
        );
    }

    #[test]
    fn test_summary_reload_is_global() {
        let shift_r = KeyEvent::new(KeyCode::Char('R'), KeyModifiers::SHIFT);
        for tab in Tab::all() {
            assert_eq!(
                map_key_event(shift_r, &logged_in(*tab)),
                Action::RefreshSummary
            );
        }
    }

    #[test]
    fn test_search_mode_types_digits() {
        let mut state = logged_in(Tab::Browse);
        state.begin_input(InputMode::Search, "");
        assert_eq!(
            map_key_event(press(KeyCode::Char('2')), &state),
            Action::InputChar('2')
        );
    }
}
