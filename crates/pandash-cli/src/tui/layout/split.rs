//! Split layout for wide terminals.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │ Header                                               │
//! ├────────────┬────────────────────────┬───────────────┤
//! │ Tabs       │ Content                │ Details?      │
//! │ Accounts   │                        │               │
//! │            ├────────────────────────┤               │
//! │            │ Log?                   │               │
//! ├────────────┴────────────────────────┴───────────────┤
//! │ Status bar                                           │
//! └─────────────────────────────────────────────────────┘
//! ```

use ratatui::layout::{Constraint, Direction, Layout, Rect};

use super::{ComputedLayout, LayoutMode};

const SIDEBAR_WIDTH: u16 = 22;
const DRAWER_WIDTH: u16 = 40;
const LOG_HEIGHT: u16 = 10;

pub fn compute(size: Rect, log_visible: bool, drawer_open: bool) -> ComputedLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(size);

    let mut columns = vec![Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(40)];
    if drawer_open {
        columns.push(Constraint::Length(DRAWER_WIDTH));
    }
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(columns)
        .split(rows[1]);

    let mut content = body[1];
    let drawer = drawer_open.then(|| body[2]);

    let log = if log_visible {
        let split = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(12), Constraint::Length(LOG_HEIGHT)])
            .split(content);
        content = split[0];
        Some(split[1])
    } else {
        None
    };

    ComputedLayout {
        mode: LayoutMode::Split,
        header: rows[0],
        navigation: body[0],
        content,
        status: rows[2],
        log,
        drawer,
    }
}
