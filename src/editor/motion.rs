//! Cursor motion, selection growth and view tracking for [`Editor`].
//!
//! Plain `cursor_*` verbs drop the selection before moving; the
//! `cursor_select_*` variants start a Character selection when there is
//! none and then move the pen. Scroll state lives in the host's
//! [`ViewPort`] and is never part of the change log.

use super::actions::Editor;
use super::change::{Change, MoveDelta, signed};
use super::ports::{MessageSink, StatusMessage, ViewPort};
use super::selection::{Position, SelectionMode};
use super::text;

impl<V: ViewPort, M: MessageSink> Editor<V, M> {
    // Motion primitives. These keep the current selection mode.

    pub fn cursor_move_left(&mut self) {
        let pen = self.buffer.pen;
        if pen.col > 0 {
            self.cursor_move(0, -1);
        } else if pen.row > 0 {
            let width = self.buffer.line_width(pen.row - 1);
            self.cursor_move(-1, signed(width));
        } else {
            self.message(StatusMessage::info("Top of file"));
        }
    }

    pub fn cursor_move_right(&mut self) {
        let pen = self.buffer.pen;
        if pen.col < self.buffer.line_width(pen.row) {
            self.cursor_move(0, 1);
        } else if pen.row + 1 < self.buffer.row_count() {
            self.cursor_move(1, -signed(pen.col));
        } else {
            self.message(StatusMessage::info("Bottom of file"));
        }
    }

    /// Up one row toward the goal column, or to the row start on the first row.
    pub fn cursor_move_up_or_begin(&mut self) {
        let goal = self.buffer.goal_col;
        let pen = self.buffer.pen;
        if pen.row == 0 {
            self.message(StatusMessage::info("Top of file"));
            self.cursor_move(0, -signed(pen.col));
        } else {
            let cols = self.col_delta_toward_goal(pen.row - 1);
            self.cursor_move(-1, cols);
        }
        self.buffer.goal_col = goal;
    }

    /// Down one row toward the goal column, or to the row end on the last row.
    pub fn cursor_move_down_or_end(&mut self) {
        let goal = self.buffer.goal_col;
        let pen = self.buffer.pen;
        if pen.row + 1 >= self.buffer.row_count() {
            self.message(StatusMessage::info("End of file"));
            let width = self.buffer.line_width(pen.row);
            self.cursor_move(0, signed(width) - signed(pen.col));
        } else {
            let cols = self.col_delta_toward_goal(pen.row + 1);
            self.cursor_move(1, cols);
        }
        self.buffer.goal_col = goal;
    }

    pub fn cursor_move_word_left(&mut self) {
        let pen = self.buffer.pen;
        if pen.col == 0 {
            self.cursor_move_left();
            return;
        }
        let bounds = text::word_boundaries(self.buffer.line(pen.row));
        self.step_to_boundary_before(&bounds);
    }

    pub fn cursor_move_word_right(&mut self) {
        let pen = self.buffer.pen;
        if pen.col >= self.buffer.line_width(pen.row) {
            self.cursor_move_right();
            return;
        }
        let bounds = text::word_boundaries(self.buffer.line(pen.row));
        self.step_to_boundary_after(&bounds);
    }

    pub fn cursor_move_subword_left(&mut self) {
        let pen = self.buffer.pen;
        if pen.col == 0 {
            self.cursor_move_left();
            return;
        }
        let bounds = text::subword_boundaries(self.buffer.line(pen.row), false);
        self.step_to_boundary_before(&bounds);
    }

    pub fn cursor_move_subword_right(&mut self) {
        let pen = self.buffer.pen;
        if pen.col >= self.buffer.line_width(pen.row) {
            self.cursor_move_right();
            return;
        }
        let bounds = text::subword_boundaries(self.buffer.line(pen.row), true);
        self.step_to_boundary_after(&bounds);
    }

    fn step_to_boundary_before(&mut self, bounds: &[usize]) {
        let col = self.buffer.pen.col;
        let target = bounds.iter().rev().find(|&&b| b < col).copied().unwrap_or(0);
        self.cursor_move(0, signed(target) - signed(col));
    }

    fn step_to_boundary_after(&mut self, bounds: &[usize]) {
        let col = self.buffer.pen.col;
        let width = self.buffer.line_width(self.buffer.pen.row);
        let target = bounds.iter().find(|&&b| b > col).copied().unwrap_or(width);
        self.cursor_move(0, signed(target) - signed(col));
    }

    /// Column offset from the pen to the goal column clamped into `row`.
    pub(super) fn col_delta_toward_goal(&self, row: usize) -> isize {
        let col = self.buffer.goal_col.min(self.buffer.line_width(row));
        signed(col) - signed(self.buffer.pen.col)
    }

    /// Put the pen at `(row, col)`, clamped into the document.
    pub fn cursor_move_to(&mut self, row: usize, col: usize) {
        let to = self.buffer.clamp(Position::new(row, col));
        self.move_pen_to(to);
        self.finish_motion();
    }

    fn finish_motion(&mut self) {
        self.keep_pen_in_view();
        self.settle();
    }

    fn plain(&mut self, motion: fn(&mut Self)) {
        self.selection_none();
        motion(self);
        self.finish_motion();
    }

    fn selecting(&mut self, motion: fn(&mut Self)) {
        if self.buffer.mode == SelectionMode::None {
            self.selection_character();
        }
        motion(self);
        self.finish_motion();
    }

    /// Like [`selecting`](Self::selecting), then grow the selection out to
    /// what the mode covers (whole words in Word mode).
    fn selecting_extended(&mut self, motion: fn(&mut Self)) {
        if self.buffer.mode == SelectionMode::None {
            self.selection_character();
        }
        motion(self);
        let delta = self.extend_selection();
        self.move_and_mark(delta);
        self.finish_motion();
    }

    // Verbs.

    pub fn cursor_left(&mut self) {
        self.plain(Self::cursor_move_left);
    }

    pub fn cursor_right(&mut self) {
        self.plain(Self::cursor_move_right);
    }

    pub fn cursor_up(&mut self) {
        self.plain(Self::cursor_move_up_or_begin);
    }

    pub fn cursor_down(&mut self) {
        self.plain(Self::cursor_move_down_or_end);
    }

    pub fn cursor_select_left(&mut self) {
        self.selecting(Self::cursor_move_left);
    }

    pub fn cursor_select_right(&mut self) {
        self.selecting(Self::cursor_move_right);
    }

    pub fn cursor_select_up(&mut self) {
        self.selecting(Self::cursor_move_up_or_begin);
    }

    pub fn cursor_select_down(&mut self) {
        self.selecting(Self::cursor_move_down_or_end);
    }

    pub fn cursor_word_left(&mut self) {
        self.plain(Self::cursor_move_word_left);
    }

    pub fn cursor_word_right(&mut self) {
        self.plain(Self::cursor_move_word_right);
    }

    pub fn cursor_select_word_left(&mut self) {
        self.selecting_extended(Self::cursor_move_word_left);
    }

    pub fn cursor_select_word_right(&mut self) {
        self.selecting_extended(Self::cursor_move_word_right);
    }

    pub fn cursor_subword_left(&mut self) {
        self.plain(Self::cursor_move_subword_left);
    }

    pub fn cursor_subword_right(&mut self) {
        self.plain(Self::cursor_move_subword_right);
    }

    pub fn cursor_select_subword_left(&mut self) {
        self.selecting_extended(Self::cursor_move_subword_left);
    }

    pub fn cursor_select_subword_right(&mut self) {
        self.selecting_extended(Self::cursor_move_subword_right);
    }

    fn move_to_line_start(&mut self) {
        let col = self.buffer.pen.col;
        self.cursor_move(0, -signed(col));
    }

    fn move_to_line_end(&mut self) {
        let pen = self.buffer.pen;
        let width = self.buffer.line_width(pen.row);
        self.cursor_move(0, signed(width) - signed(pen.col));
    }

    fn move_to_document_start(&mut self) {
        self.move_pen_to(Position::default());
    }

    fn move_to_document_end(&mut self) {
        let end = self.buffer.end_position();
        self.move_pen_to(end);
    }

    pub fn cursor_start_of_line(&mut self) {
        self.plain(Self::move_to_line_start);
    }

    pub fn cursor_end_of_line(&mut self) {
        self.plain(Self::move_to_line_end);
    }

    pub fn cursor_select_to_start_of_line(&mut self) {
        self.selecting(Self::move_to_line_start);
    }

    pub fn cursor_select_to_end_of_line(&mut self) {
        self.selecting(Self::move_to_line_end);
    }

    pub fn cursor_start_of_document(&mut self) {
        self.plain(Self::move_to_document_start);
    }

    pub fn cursor_end_of_document(&mut self) {
        self.plain(Self::move_to_document_end);
    }

    pub fn cursor_select_to_start_of_document(&mut self) {
        self.selecting(Self::move_to_document_start);
    }

    pub fn cursor_select_to_end_of_document(&mut self) {
        self.selecting(Self::move_to_document_end);
    }

    // Paging. The view scrolls by a screen and the pen follows it; the
    // goal column is left alone so repeated paging keeps the column.

    fn page_down(&mut self) {
        let count = self.buffer.row_count();
        let pen = self.buffer.pen;
        if pen.row + 1 >= count {
            self.message(StatusMessage::info("Bottom of file"));
            return;
        }
        let rows = self.view.rows();
        let scroll = self.view.scroll_row();
        let pen_delta = rows.min(count - pen.row - 1);
        let new_scroll = if count <= rows {
            0
        } else if count <= rows * 2 + scroll {
            count - rows
        } else {
            scroll + rows
        };
        let scroll_col = self.view.scroll_col();
        self.view.set_scroll(new_scroll, scroll_col);
        let cols = self.col_delta_toward_goal(pen.row + pen_delta);
        self.apply(Change::Move(MoveDelta::pen(signed(pen_delta), cols)));
    }

    fn page_up(&mut self) {
        let pen = self.buffer.pen;
        if pen.row == 0 {
            self.message(StatusMessage::info("Top of file"));
            return;
        }
        let rows = self.view.rows();
        let pen_delta = rows.min(pen.row);
        let scroll = self.view.scroll_row().saturating_sub(rows);
        let scroll_col = self.view.scroll_col();
        self.view.set_scroll(scroll, scroll_col);
        let cols = self.col_delta_toward_goal(pen.row - pen_delta);
        self.apply(Change::Move(MoveDelta::pen(-signed(pen_delta), cols)));
    }

    fn paged(&mut self, mode: SelectionMode, page: fn(&mut Self)) {
        self.set_selection_mode(mode);
        page(self);
        self.settle();
    }

    pub fn cursor_page_down(&mut self) {
        self.paged(SelectionMode::None, Self::page_down);
    }

    pub fn cursor_page_up(&mut self) {
        self.paged(SelectionMode::None, Self::page_up);
    }

    pub fn cursor_select_character_page_down(&mut self) {
        self.paged(SelectionMode::Character, Self::page_down);
    }

    pub fn cursor_select_character_page_up(&mut self) {
        self.paged(SelectionMode::Character, Self::page_up);
    }

    pub fn cursor_select_block_page_down(&mut self) {
        self.paged(SelectionMode::Block, Self::page_down);
    }

    pub fn cursor_select_block_page_up(&mut self) {
        self.paged(SelectionMode::Block, Self::page_up);
    }

    // View tracking.

    /// Scroll so the pen row sits mid-screen.
    pub fn scroll_to_middle(&mut self) {
        let rows = self.view.rows();
        let count = self.buffer.row_count();
        let row = count
            .saturating_sub(rows)
            .min(self.buffer.pen.row.saturating_sub(rows / 2));
        let col = self.view.scroll_col();
        self.view.set_scroll(row, col);
    }

    /// Scroll one row up, dragging the pen along if it would leave the view.
    pub fn scroll_up(&mut self) {
        let scroll = self.view.scroll_row();
        if scroll == 0 {
            self.message(StatusMessage::info("Top of file"));
            return;
        }
        let scroll = scroll - 1;
        let col = self.view.scroll_col();
        self.view.set_scroll(scroll, col);
        let lowest = (scroll + self.view.rows()).saturating_sub(2);
        let row = self.buffer.pen.row;
        if row > lowest {
            self.follow_scroll(lowest);
        }
        self.settle();
    }

    /// Scroll one row down, dragging the pen along if it would leave the view.
    pub fn scroll_down(&mut self) {
        let scroll = self.view.scroll_row();
        let count = self.buffer.row_count();
        if scroll + self.view.rows() >= count {
            self.message(StatusMessage::info("Bottom of file"));
            return;
        }
        let scroll = scroll + 1;
        let col = self.view.scroll_col();
        self.view.set_scroll(scroll, col);
        let highest = (scroll + 1).min(count - 1);
        let row = self.buffer.pen.row;
        if row < highest {
            self.follow_scroll(highest);
        }
        self.settle();
    }

    fn follow_scroll(&mut self, row: usize) {
        let rows = signed(row) - signed(self.buffer.pen.row);
        let cols = self.col_delta_toward_goal(row);
        self.apply(Change::Move(MoveDelta::pen(rows, cols)));
    }

    /// Whether the span from `upper` to `lower` is fully on screen.
    pub fn is_in_view(&self, upper: Position, lower: Position) -> bool {
        let (top, left) = (self.view.scroll_row(), self.view.scroll_col());
        let first_col = upper.col.min(lower.col);
        let last_col = upper.col.max(lower.col);
        top <= upper.row
            && lower.row < top + self.view.rows()
            && left <= first_col
            && last_col < left + self.view.cols()
    }

    /// Scroll the minimum needed to show the pen.
    pub fn keep_pen_in_view(&mut self) {
        let pen = self.buffer.pen;
        let (mut row, mut col) = (self.view.scroll_row(), self.view.scroll_col());
        let (rows, cols) = (self.view.rows().max(1), self.view.cols().max(1));
        if pen.row < row {
            row = pen.row;
        } else if pen.row >= row + rows {
            row = pen.row + 1 - rows;
        }
        if pen.col < col {
            col = pen.col;
        } else if pen.col >= col + cols {
            col = pen.col + 1 - cols;
        }
        if (row, col) != (self.view.scroll_row(), self.view.scroll_col()) {
            self.view.set_scroll(row, col);
        }
    }

    /// Scroll so the span lands at the preferred spot in the view: a bit
    /// above the upper third, and as far left as keeps the span visible.
    pub fn scroll_to_optimal(&mut self, upper: Position, lower: Position) {
        let (rows, cols) = (self.view.rows(), self.view.cols());
        let height = lower.row - upper.row + 1;
        let left = upper.col.min(lower.col);
        let right = upper.col.max(lower.col);
        let width = right - left + 1;
        let last_row = self.buffer.row_count() - 1;

        let row = if rows > height {
            let lead = fraction(self.prefs.optimal_cursor_row, rows.saturating_sub(1));
            upper.row.saturating_sub(lead).min(last_row)
        } else {
            upper.row
        };
        let col = if cols > width {
            if right < cols {
                0
            } else {
                let lead = fraction(self.prefs.optimal_cursor_col, cols.saturating_sub(1));
                left.saturating_sub(lead).min(right)
            }
        } else {
            left
        };
        self.view.set_scroll(row, col);
    }

    // Line and word selection.

    /// Select the whole of `row` in Line mode.
    pub fn select_line_at(&mut self, row: usize) {
        if row >= self.buffer.row_count() {
            self.selection_none();
            self.settle();
            return;
        }
        let at = Position::new(row, 0);
        self.move_and_mark(MoveDelta::between(&self.buffer, at, at, SelectionMode::Line));
        self.finish_motion();
    }

    /// Select the pen row, or grow a line selection by one row.
    pub fn cursor_select_line(&mut self) {
        if self.buffer.mode != SelectionMode::Line {
            let row = self.buffer.pen.row;
            self.select_line_at(row);
            return;
        }
        let row = self.buffer.pen.row;
        if row + 1 < self.buffer.row_count() {
            self.move_pen_to(Position::new(row + 1, 0));
        }
        self.finish_motion();
    }

    /// Select the word (or run of non-word chars) at `(row, col)`.
    pub fn select_word_at(&mut self, row: usize, col: usize) {
        self.select_text(row, col, 0, SelectionMode::Word);
        let row = self.buffer.pen.row;
        if col < self.buffer.line_width(row) {
            self.cursor_select_word_right();
        }
    }

    // Mouse input, in view coordinates.

    fn document_position(&self, row: usize, col: usize) -> Position {
        Position::new(self.view.scroll_row() + row, self.view.scroll_col() + col)
    }

    /// Click at a view cell. Shift extends the selection; with Alt as well
    /// it becomes a block selection.
    pub fn mouse_click(&mut self, row: usize, col: usize, shift: bool, alt: bool) {
        if shift {
            if alt {
                self.selection_block();
            } else if self.buffer.mode == SelectionMode::None {
                self.selection_character();
            }
        } else {
            self.selection_none();
        }
        self.mouse_release(row, col);
    }

    /// Button released (or dragged) over a view cell.
    pub fn mouse_release(&mut self, row: usize, col: usize) {
        let at = self.document_position(row, col);
        if at.row >= self.buffer.row_count() {
            let end = self.buffer.end_position();
            self.move_pen_to(end);
        } else if self.buffer.mode == SelectionMode::Block {
            let b = &self.buffer;
            let delta = MoveDelta::between(b, b.pen, at, b.mode);
            self.move_and_mark(delta);
        } else {
            let to = self.buffer.clamp(at);
            self.move_pen_to(to);
            if matches!(self.buffer.mode, SelectionMode::Line | SelectionMode::Word) {
                let delta = self.extend_selection();
                self.move_and_mark(delta);
            }
        }
        self.settle();
    }

    pub fn mouse_moved(&mut self, row: usize, col: usize) {
        self.mouse_release(row, col);
    }

    pub fn mouse_double_click(&mut self, row: usize, col: usize) {
        let at = self.document_position(row, col);
        if at.row < self.buffer.row_count() && self.buffer.line_width(at.row) > 0 {
            self.select_word_at(at.row, at.col);
        }
    }

    pub fn mouse_triple_click(&mut self, row: usize, col: usize) {
        self.mouse_release(row, col);
        let row = self.buffer.pen.row;
        self.select_line_at(row);
    }

    // Brackets.

    /// Position of the bracket pairing with the one at `pos`.
    pub fn matching_bracket(&self, pos: Position) -> Option<Position> {
        let here = text::char_at(self.buffer.line(pos.row), pos.col)?;
        let (open, close, forward) = match here {
            '(' => ('(', ')', true),
            '[' => ('[', ']', true),
            '{' => ('{', '}', true),
            ')' => ('(', ')', false),
            ']' => ('[', ']', false),
            '}' => ('{', '}', false),
            _ => return None,
        };
        // The bracket at `pos` is the first one counted.
        let (deeper, shallower) = if forward { (open, close) } else { (close, open) };
        let mut depth = 0usize;
        let mut visit = |row: usize, col: usize, c: char| {
            if c == deeper {
                depth += 1;
            } else if c == shallower {
                depth -= 1;
            }
            (depth == 0).then_some(Position::new(row, col))
        };
        let lines = self.buffer.lines();
        if forward {
            let mut seen = lines[pos.row..].iter().enumerate().map(|(i, line)| (pos.row + i, line));
            seen.find_map(|(row, line)| {
                let skip = if row == pos.row { pos.col } else { 0 };
                line.chars()
                    .enumerate()
                    .skip(skip)
                    .find_map(|(col, c)| visit(row, col, c))
            })
        } else {
            let mut seen = lines[..=pos.row].iter().enumerate().rev();
            seen.find_map(|(row, line)| {
                let chars: Vec<char> = line.chars().collect();
                let end = if row == pos.row { pos.col + 1 } else { chars.len() };
                chars[..end]
                    .iter()
                    .enumerate()
                    .rev()
                    .find_map(|(col, &c)| visit(row, col, c))
            })
        }
    }

    pub fn jump_to_matching_bracket(&mut self) {
        let pen = self.buffer.pen;
        if let Some(to) = self.matching_bracket(pen) {
            self.move_pen_to(to);
            self.finish_motion();
        }
    }
}

/// `ratio` of `of`, rounded toward zero.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn fraction(ratio: f64, of: usize) -> usize {
    (ratio * of as f64) as usize
}

#[cfg(test)]
mod tests {
    use crate::editor::{Editor, Position, SelectionMode, StatusLine, ViewPort, Viewport};

    fn editor(lines: &[&str]) -> Editor {
        Editor::new(lines.iter().map(|s| (*s).to_owned()).collect())
    }

    fn numbered(count: usize, view: Viewport) -> Editor {
        let lines = (0..count).map(|i| format!("line {i}")).collect();
        Editor::with_ports(lines, view, StatusLine::default())
    }

    fn last_message(ed: &Editor) -> Option<String> {
        ed.messages().message().map(|m| m.text.clone())
    }

    #[test]
    fn test_left_and_right_wrap_rows() {
        let mut ed = editor(&["ab", "cd"]);
        ed.cursor_move_to(1, 0);
        ed.cursor_left();
        assert_eq!(ed.pen(), Position::new(0, 2));
        ed.cursor_right();
        assert_eq!(ed.pen(), Position::new(1, 0));
        ed.cursor_move_to(0, 0);
        ed.cursor_left();
        assert_eq!(last_message(&ed).as_deref(), Some("Top of file"));
    }

    #[test]
    fn test_vertical_motion_keeps_goal_column() {
        let mut ed = editor(&["abcdef", "ab", "abcdef"]);
        ed.cursor_move_to(0, 5);
        ed.cursor_down();
        assert_eq!(ed.pen(), Position::new(1, 2));
        ed.cursor_down();
        assert_eq!(ed.pen(), Position::new(2, 5));
        ed.cursor_down();
        assert_eq!(ed.pen(), Position::new(2, 6));
        assert_eq!(last_message(&ed).as_deref(), Some("End of file"));
    }

    #[test]
    fn test_up_on_first_row_goes_to_row_start() {
        let mut ed = editor(&["abc"]);
        ed.cursor_move_to(0, 2);
        ed.cursor_up();
        assert_eq!(ed.pen(), Position::new(0, 0));
    }

    #[test]
    fn test_select_down_starts_character_selection() {
        let mut ed = editor(&["abc", "def"]);
        ed.cursor_move_to(0, 1);
        ed.cursor_select_down();
        assert_eq!(ed.mode(), SelectionMode::Character);
        assert_eq!(ed.selected_text(), ["bc", "d"]);
        ed.cursor_left();
        assert_eq!(ed.mode(), SelectionMode::None);
    }

    #[test]
    fn test_word_motion() {
        let mut ed = editor(&["foo bar", "baz"]);
        ed.cursor_word_right();
        assert_eq!(ed.pen(), Position::new(0, 3));
        ed.cursor_word_right();
        assert_eq!(ed.pen(), Position::new(0, 4));
        ed.cursor_word_right();
        ed.cursor_word_right();
        assert_eq!(ed.pen(), Position::new(1, 0));
        ed.cursor_word_left();
        assert_eq!(ed.pen(), Position::new(0, 7));
        ed.cursor_word_left();
        assert_eq!(ed.pen(), Position::new(0, 4));
    }

    #[test]
    fn test_subword_motion() {
        let mut ed = editor(&["fooBarBaz"]);
        ed.cursor_subword_right();
        assert_eq!(ed.pen(), Position::new(0, 3));
        ed.cursor_subword_right();
        assert_eq!(ed.pen(), Position::new(0, 6));
        ed.cursor_subword_left();
        assert_eq!(ed.pen(), Position::new(0, 3));
    }

    #[test]
    fn test_select_word_at() {
        let mut ed = editor(&["foo bar"]);
        ed.select_word_at(0, 5);
        assert_eq!(ed.selected_text(), ["bar"]);
        ed.select_word_at(0, 1);
        assert_eq!(ed.selected_text(), ["foo"]);
    }

    #[test]
    fn test_select_line_then_grow() {
        let mut ed = editor(&["a", "b", "c"]);
        ed.cursor_select_line();
        assert_eq!(ed.mode(), SelectionMode::Line);
        assert_eq!(ed.selected_text(), ["a", ""]);
        ed.cursor_select_line();
        assert_eq!(ed.selected_text(), ["a", "b", ""]);
    }

    #[test]
    fn test_line_ends_and_document_ends() {
        let mut ed = editor(&["abc", "de"]);
        ed.cursor_end_of_line();
        assert_eq!(ed.pen(), Position::new(0, 3));
        ed.cursor_start_of_line();
        assert_eq!(ed.pen(), Position::new(0, 0));
        ed.cursor_select_to_end_of_document();
        assert_eq!(ed.selected_text(), ["abc", "de"]);
        ed.cursor_start_of_document();
        assert_eq!(ed.pen(), Position::new(0, 0));
        assert_eq!(ed.mode(), SelectionMode::None);
    }

    #[test]
    fn test_page_down_and_up() {
        let mut ed = numbered(30, Viewport::new(80, 10));
        ed.cursor_page_down();
        assert_eq!(ed.pen(), Position::new(10, 0));
        assert_eq!(ed.view().scroll_row(), 10);
        ed.cursor_page_down();
        assert_eq!(ed.pen(), Position::new(20, 0));
        assert_eq!(ed.view().scroll_row(), 20);
        ed.cursor_page_up();
        ed.cursor_page_up();
        assert_eq!(ed.pen(), Position::new(0, 0));
        assert_eq!(ed.view().scroll_row(), 0);
        ed.cursor_page_up();
        assert_eq!(last_message(&ed).as_deref(), Some("Top of file"));
    }

    #[test]
    fn test_character_page_down_selects() {
        let mut ed = numbered(30, Viewport::new(80, 10));
        ed.cursor_select_character_page_down();
        assert_eq!(ed.mode(), SelectionMode::Character);
        assert_eq!(ed.marker(), Position::new(0, 0));
        assert_eq!(ed.pen(), Position::new(10, 0));
    }

    #[test]
    fn test_scroll_to_middle() {
        let mut ed = numbered(30, Viewport::new(80, 10));
        ed.cursor_move_to(20, 0);
        ed.scroll_to_middle();
        assert_eq!(ed.view().scroll_row(), 15);
    }

    #[test]
    fn test_scroll_down_drags_pen() {
        let mut ed = numbered(30, Viewport::new(80, 10));
        ed.scroll_down();
        assert_eq!(ed.view().scroll_row(), 1);
        assert_eq!(ed.pen(), Position::new(2, 0));
        ed.scroll_up();
        ed.scroll_up();
        assert_eq!(last_message(&ed).as_deref(), Some("Top of file"));
    }

    #[test]
    fn test_motion_keeps_pen_in_view() {
        let mut ed = numbered(30, Viewport::new(80, 10));
        ed.cursor_move_to(15, 0);
        assert_eq!(ed.view().scroll_row(), 6);
        ed.cursor_move_to(2, 0);
        assert_eq!(ed.view().scroll_row(), 2);
    }

    #[test]
    fn test_select_text_recenters_out_of_view() {
        let mut ed = numbered(100, Viewport::new(80, 10));
        ed.select_text(50, 0, 4, SelectionMode::Character);
        assert_eq!(ed.selected_text(), ["line"]);
        assert_eq!(ed.view().scroll_row(), 48);
    }

    #[test]
    fn test_mouse_click_and_shift_click() {
        let mut ed = editor(&["hello world", "second"]);
        ed.mouse_click(0, 3, false, false);
        assert_eq!(ed.pen(), Position::new(0, 3));
        ed.mouse_click(1, 2, true, false);
        assert_eq!(ed.mode(), SelectionMode::Character);
        assert_eq!(ed.selected_text(), ["lo world", "se"]);
        ed.mouse_click(9, 0, false, false);
        assert_eq!(ed.pen(), Position::new(1, 6));
        assert_eq!(ed.mode(), SelectionMode::None);
    }

    #[test]
    fn test_mouse_click_clamps_column() {
        let mut ed = editor(&["ab"]);
        ed.mouse_click(0, 40, false, false);
        assert_eq!(ed.pen(), Position::new(0, 2));
    }

    #[test]
    fn test_double_and_triple_click() {
        let mut ed = editor(&["hello world", "x"]);
        ed.mouse_double_click(0, 8);
        assert_eq!(ed.selected_text(), ["world"]);
        ed.mouse_triple_click(0, 4);
        assert_eq!(ed.mode(), SelectionMode::Line);
        assert_eq!(ed.selected_text(), ["hello world", ""]);
    }

    #[test]
    fn test_matching_bracket() {
        let mut ed = editor(&["f(a[1])"]);
        assert_eq!(ed.matching_bracket(Position::new(0, 1)), Some(Position::new(0, 6)));
        assert_eq!(ed.matching_bracket(Position::new(0, 6)), Some(Position::new(0, 1)));
        assert_eq!(ed.matching_bracket(Position::new(0, 3)), Some(Position::new(0, 5)));
        assert_eq!(ed.matching_bracket(Position::new(0, 0)), None);
        ed.cursor_move_to(0, 1);
        ed.jump_to_matching_bracket();
        assert_eq!(ed.pen(), Position::new(0, 6));
    }

    #[test]
    fn test_matching_bracket_across_rows() {
        let ed = editor(&["fn x() {", "  if y {", "  }", "}"]);
        assert_eq!(ed.matching_bracket(Position::new(0, 7)), Some(Position::new(3, 0)));
        assert_eq!(ed.matching_bracket(Position::new(3, 0)), Some(Position::new(0, 7)));
        assert_eq!(ed.matching_bracket(Position::new(0, 8)), None);
    }

    #[test]
    fn test_swap_pen_and_marker() {
        let mut ed = editor(&["abcdef"]);
        ed.cursor_move_to(0, 1);
        ed.cursor_select_to_end_of_line();
        ed.swap_pen_and_marker();
        assert_eq!(ed.pen(), Position::new(0, 1));
        assert_eq!(ed.marker(), Position::new(0, 6));
        assert_eq!(ed.selected_text(), ["bcdef"]);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn motions_stay_in_bounds(moves in prop::collection::vec(0u8..10, 0..60)) {
                let mut ed = editor(&["fooBar baz", "", "  x(y)", "last row"]);
                for m in moves {
                    match m {
                        0 => ed.cursor_left(),
                        1 => ed.cursor_right(),
                        2 => ed.cursor_up(),
                        3 => ed.cursor_down(),
                        4 => ed.cursor_select_word_right(),
                        5 => ed.cursor_select_subword_left(),
                        6 => ed.cursor_page_down(),
                        7 => ed.cursor_select_block_page_up(),
                        8 => ed.mouse_click(usize::from(m), 3, true, false),
                        _ => ed.cursor_select_line(),
                    }
                    let pen = ed.pen();
                    prop_assert!(pen.row < ed.lines().len());
                    prop_assert!(pen.col <= ed.line(pen.row).chars().count());
                }
            }
        }
    }
}
