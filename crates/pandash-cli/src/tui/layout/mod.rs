//! Responsive layouts.
//!
//! - Split layout for wide terminals (120+ cols): sidebar with tabs and accounts
//! - Tab layout for medium terminals (80-119 cols)
//! - Minimal layout for narrow terminals (<80 cols)

use ratatui::layout::Rect;

mod minimal;
mod split;
mod tabs;

/// Layout mode based on terminal size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// Wide terminal: sidebar navigation
    Split,
    /// Medium terminal: horizontal tabs
    Tabs,
    /// Narrow terminal: single column
    Minimal,
}

impl LayoutMode {
    /// Determine layout mode from terminal size.
    pub const fn from_size(width: u16, height: u16) -> Self {
        if width >= 120 && height >= 30 {
            Self::Split
        } else if width >= 80 && height >= 24 {
            Self::Tabs
        } else {
            Self::Minimal
        }
    }
}

/// Areas for one frame.
#[derive(Debug, Clone)]
pub struct ComputedLayout {
    /// Layout mode being used
    pub mode: LayoutMode,
    /// Title bar
    pub header: Rect,
    /// Sidebar or tab strip
    pub navigation: Rect,
    /// Active view
    pub content: Rect,
    /// Status bar
    pub status: Rect,
    /// Notice log, when visible
    pub log: Option<Rect>,
    /// File details drawer, when open
    pub drawer: Option<Rect>,
}

impl ComputedLayout {
    /// Compute layout for the given terminal size and panel visibility.
    pub fn compute(size: Rect, log_visible: bool, drawer_open: bool) -> Self {
        match LayoutMode::from_size(size.width, size.height) {
            LayoutMode::Split => split::compute(size, log_visible, drawer_open),
            LayoutMode::Tabs => tabs::compute(size, log_visible, drawer_open),
            LayoutMode::Minimal => minimal::compute(size, log_visible, drawer_open),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_mode_detection() {
        assert_eq!(LayoutMode::from_size(150, 40), LayoutMode::Split);
        assert_eq!(LayoutMode::from_size(120, 30), LayoutMode::Split);

        assert_eq!(LayoutMode::from_size(100, 30), LayoutMode::Tabs);
        assert_eq!(LayoutMode::from_size(80, 24), LayoutMode::Tabs);
        assert_eq!(LayoutMode::from_size(150, 25), LayoutMode::Tabs);

        assert_eq!(LayoutMode::from_size(79, 24), LayoutMode::Minimal);
        assert_eq!(LayoutMode::from_size(100, 20), LayoutMode::Minimal);
    }

    #[test]
    fn test_panels_follow_flags() {
        let size = Rect::new(0, 0, 120, 40);

        let plain = ComputedLayout::compute(size, false, false);
        assert_eq!(plain.mode, LayoutMode::Split);
        assert!(plain.log.is_none());
        assert!(plain.drawer.is_none());

        let full = ComputedLayout::compute(size, true, true);
        assert!(full.log.is_some());
        assert!(full.drawer.is_some());
    }

    #[test]
    fn test_every_mode_opens_drawer() {
        for size in [
            Rect::new(0, 0, 140, 40),
            Rect::new(0, 0, 100, 30),
            Rect::new(0, 0, 60, 20),
        ] {
            let layout = ComputedLayout::compute(size, false, true);
            let drawer = layout.drawer.unwrap();
            assert!(drawer.width > 0 && drawer.height > 0, "{:?}", layout.mode);
        }
    }
}
