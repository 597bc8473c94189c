//! Default scroll state for an editor pane.
//!
//! [`Viewport`] holds the pane size and scroll offsets and implements
//! [`ViewPort`] so it can be handed straight to an
//! [`Editor`](super::Editor).

use super::ports::ViewPort;

/// A fixed-size window onto a document.
///
/// # Example
///
/// ```
/// use penmark::editor::{Editor, StatusLine, ViewPort, Viewport};
///
/// let lines = (0..100).map(|i| i.to_string()).collect();
/// let mut editor = Editor::with_ports(lines, Viewport::new(80, 24), StatusLine::default());
/// editor.cursor_move_to(50, 0);
/// assert_eq!(editor.view().scroll_row(), 27);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    width: u16,
    height: u16,
    scroll_row: usize,
    scroll_col: usize,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

impl Viewport {
    /// Create a viewport of `width` columns and `height` text rows.
    pub const fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            scroll_row: 0,
            scroll_col: 0,
        }
    }
}

impl ViewPort for Viewport {
    fn rows(&self) -> usize {
        self.height as usize
    }

    fn cols(&self) -> usize {
        self.width as usize
    }

    fn scroll_row(&self) -> usize {
        self.scroll_row
    }

    fn scroll_col(&self) -> usize {
        self.scroll_col
    }

    fn set_scroll(&mut self, row: usize, col: usize) {
        self.scroll_row = row;
        self.scroll_col = col;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_viewport_starts_at_top() {
        let vp = Viewport::new(80, 24);
        assert_eq!((vp.scroll_row(), vp.scroll_col()), (0, 0));
        assert_eq!((vp.rows(), vp.cols()), (24, 80));
    }

    #[test]
    fn test_set_scroll_through_trait() {
        let mut vp = Viewport::new(80, 24);
        vp.set_scroll(40, 7);
        assert_eq!((vp.scroll_row(), vp.scroll_col()), (40, 7));
    }
}
