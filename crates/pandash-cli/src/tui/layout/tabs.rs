//! Tab layout for medium terminals.
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │ Header                              │
//! │ Tabs                                │
//! ├─────────────────────────────────────┤
//! │ Content                             │
//! ├─────────────────────────────────────┤
//! │ Details? / Log?                     │
//! ├─────────────────────────────────────┤
//! │ Status bar                          │
//! └─────────────────────────────────────┘
//! ```

use ratatui::layout::{Constraint, Direction, Layout, Rect};

use super::{ComputedLayout, LayoutMode};

pub fn compute(size: Rect, log_visible: bool, drawer_open: bool) -> ComputedLayout {
    let mut constraints = vec![
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(8),
    ];
    if drawer_open {
        constraints.push(Constraint::Length(9));
    }
    if log_visible {
        constraints.push(Constraint::Length(8));
    }
    constraints.push(Constraint::Length(2));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(size);

    let mut idx = 3;
    let drawer = drawer_open.then(|| {
        idx += 1;
        chunks[idx - 1]
    });
    let log = log_visible.then(|| {
        idx += 1;
        chunks[idx - 1]
    });

    ComputedLayout {
        mode: LayoutMode::Tabs,
        header: chunks[0],
        navigation: chunks[1],
        content: chunks[2],
        status: chunks[idx],
        log,
        drawer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stacked_panels_in_order() {
        let layout = compute(Rect::new(0, 0, 100, 40), true, true);
        let drawer = layout.drawer.unwrap();
        let log = layout.log.unwrap();

        assert_eq!(layout.navigation.height, 1);
        assert!(layout.content.y < drawer.y);
        assert!(drawer.y < log.y);
        assert!(log.y < layout.status.y);
        assert_eq!(layout.status.height, 2);
    }

    #[test]
    fn test_content_fills_without_panels() {
        let layout = compute(Rect::new(0, 0, 100, 30), false, false);
        assert_eq!(layout.content.height, 30 - 1 - 1 - 2);
    }
}
