//! Minimal layout for narrow terminals.
//!
//! The details drawer replaces the lower half of the content and the log
//! is kept short.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

use super::{ComputedLayout, LayoutMode};

pub fn compute(size: Rect, log_visible: bool, drawer_open: bool) -> ComputedLayout {
    let mut constraints = vec![Constraint::Length(2), Constraint::Min(6)];
    if log_visible {
        constraints.push(Constraint::Length(5));
    }
    constraints.push(Constraint::Length(1));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(size);

    let header = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(chunks[0]);

    let (content, drawer) = if drawer_open {
        let halves = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);
        (halves[0], Some(halves[1]))
    } else {
        (chunks[1], None)
    };

    ComputedLayout {
        mode: LayoutMode::Minimal,
        header: header[0],
        navigation: header[1],
        content,
        status: chunks[chunks.len() - 1],
        log: log_visible.then(|| chunks[2]),
        drawer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_areas_within_bounds() {
        let size = Rect::new(0, 0, 60, 20);
        let layout = compute(size, true, true);

        for area in [
            layout.header,
            layout.navigation,
            layout.content,
            layout.status,
            layout.log.unwrap(),
            layout.drawer.unwrap(),
        ] {
            assert!(area.x + area.width <= size.width);
            assert!(area.y + area.height <= size.height);
        }
    }

    #[test]
    fn test_drawer_splits_content() {
        let layout = compute(Rect::new(0, 0, 60, 20), false, true);
        let drawer = layout.drawer.unwrap();

        assert_eq!(drawer.y, layout.content.y + layout.content.height);
        assert_eq!(layout.status.height, 1);
    }
}
