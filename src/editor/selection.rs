//! Selection model: the row buffer together with pen, marker and mode.
//!
//! [`Selectable`] owns the rows of one open document. Outside this crate the
//! rows are read-only; every mutation is driven by [`ChangeLog`] replay so
//! that it can be reversed.
//!
//! [`ChangeLog`]: super::ChangeLog

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::text;

/// A (row, column) pair. Columns count chars.
///
/// Ordering is document order: row first, then column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// How the pen and marker bound the selected span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionMode {
    #[default]
    None,
    All,
    Block,
    Character,
    Line,
    Word,
}

impl SelectionMode {
    /// Number of selection modes.
    pub const COUNT: isize = 6;

    /// Stable index used for mode deltas in [`MoveDelta`](super::MoveDelta).
    pub const fn index(self) -> isize {
        match self {
            Self::None => 0,
            Self::All => 1,
            Self::Block => 2,
            Self::Character => 3,
            Self::Line => 4,
            Self::Word => 5,
        }
    }

    pub const fn from_index(index: isize) -> Option<Self> {
        match index {
            0 => Some(Self::None),
            1 => Some(Self::All),
            2 => Some(Self::Block),
            3 => Some(Self::Character),
            4 => Some(Self::Line),
            5 => Some(Self::Word),
            _ => None,
        }
    }

    /// Short name for status lines.
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::All => "All",
            Self::Block => "Block",
            Self::Character => "Char",
            Self::Line => "Line",
            Self::Word => "Word",
        }
    }

    /// The mode after this one when cycling.
    pub fn next(self) -> Self {
        Self::from_index((self.index() + 1) % Self::COUNT).unwrap_or_default()
    }
}

/// Row buffer plus cursor state for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selectable {
    pub(crate) lines: Vec<String>,
    pub(crate) pen: Position,
    pub(crate) marker: Position,
    pub(crate) mode: SelectionMode,
    /// Column vertical motion tries to return to.
    pub(crate) goal_col: usize,
}

impl Default for Selectable {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Selectable {
    /// Create a buffer from rows. An empty input becomes a single empty row.
    pub fn new(mut lines: Vec<String>) -> Self {
        if lines.is_empty() {
            lines.push(String::new());
        }
        Self {
            lines,
            pen: Position::default(),
            marker: Position::default(),
            mode: SelectionMode::None,
            goal_col: 0,
        }
    }

    /// Create a buffer from raw document text.
    pub fn from_text(data: &str) -> Self {
        Self::new(text::data_to_lines(data))
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Row content, or `""` for a row past the end.
    pub fn line(&self, row: usize) -> &str {
        self.lines.get(row).map_or("", String::as_str)
    }

    /// Width of a row in columns.
    pub fn line_width(&self, row: usize) -> usize {
        text::width(self.line(row))
    }

    pub fn row_count(&self) -> usize {
        self.lines.len()
    }

    pub const fn pen(&self) -> Position {
        self.pen
    }

    pub const fn marker(&self) -> Position {
        self.marker
    }

    pub const fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub const fn goal_col(&self) -> usize {
        self.goal_col
    }

    /// Flattened document text, for read-only observers.
    pub fn to_data(&self) -> String {
        text::lines_to_data(&self.lines)
    }

    /// Last valid position in the buffer.
    pub fn end_position(&self) -> Position {
        let row = self.lines.len() - 1;
        Position::new(row, self.line_width(row))
    }

    /// Clamp a position into buffer bounds.
    pub fn clamp(&self, pos: Position) -> Position {
        let row = pos.row.min(self.lines.len() - 1);
        Position::new(row, pos.col.min(self.line_width(row)))
    }

    /// Whether a position lies within the buffer.
    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.lines.len() && pos.col <= self.line_width(pos.row)
    }

    /// The selected span as (upper, lower) in document order.
    ///
    /// `upper <= lower` holds for every mode.
    pub fn start_and_end(&self) -> (Position, Position) {
        match self.mode {
            SelectionMode::None => (self.pen, self.pen),
            SelectionMode::All => (Position::default(), self.end_position()),
            SelectionMode::Block => (
                Position::new(self.pen.row.min(self.marker.row), self.pen.col.min(self.marker.col)),
                Position::new(self.pen.row.max(self.marker.row), self.pen.col.max(self.marker.col)),
            ),
            SelectionMode::Character => self.ordered(),
            SelectionMode::Line => {
                let top = self.pen.row.min(self.marker.row);
                let bottom = self.pen.row.max(self.marker.row);
                let lower = if bottom + 1 < self.lines.len() {
                    Position::new(bottom + 1, 0)
                } else {
                    Position::new(bottom, self.line_width(bottom))
                };
                (Position::new(top, 0), lower)
            }
            SelectionMode::Word => {
                let (mut upper, mut lower) = self.ordered();
                let empty = upper == lower;
                if let Some((start, _)) = text::run_at(self.line(upper.row), upper.col) {
                    upper.col = start;
                }
                match text::run_at(self.line(lower.row), lower.col) {
                    Some((start, end)) if empty || start < lower.col => lower.col = end,
                    _ => {}
                }
                (upper, lower)
            }
        }
    }

    fn ordered(&self) -> (Position, Position) {
        if self.marker <= self.pen {
            (self.marker, self.pen)
        } else {
            (self.pen, self.marker)
        }
    }

    /// Rows the selection touches, for row-wise verbs such as indent.
    ///
    /// A character selection ending at column 0 does not claim its last row.
    pub fn selected_row_range(&self) -> RangeInclusive<usize> {
        match self.mode {
            SelectionMode::None => self.pen.row..=self.pen.row,
            SelectionMode::All => 0..=self.lines.len() - 1,
            SelectionMode::Block | SelectionMode::Line => {
                self.pen.row.min(self.marker.row)..=self.pen.row.max(self.marker.row)
            }
            SelectionMode::Character | SelectionMode::Word => {
                let (upper, lower) = self.start_and_end();
                if lower.row > upper.row && lower.col == 0 {
                    upper.row..=lower.row - 1
                } else {
                    upper.row..=lower.row
                }
            }
        }
    }

    /// Text covered by the current selection.
    pub fn selected_text(&self) -> Vec<String> {
        let (upper, lower) = self.start_and_end();
        self.text_between(upper, lower, self.mode)
    }

    /// (chars, rows) in the current selection; row breaks count as chars.
    pub fn count_selected(&self) -> (usize, usize) {
        let lines = self.selected_text();
        let breaks = lines.len().saturating_sub(1);
        let chars = lines.iter().map(|l| text::width(l)).sum::<usize>() + breaks;
        (chars, lines.len())
    }

    /// Text between two positions, sliced the way `mode` selects.
    pub fn text_between(&self, upper: Position, lower: Position, mode: SelectionMode) -> Vec<String> {
        debug_assert!(upper <= lower || mode == SelectionMode::Block);
        match mode {
            SelectionMode::None => Vec::new(),
            SelectionMode::Block => (upper.row..=lower.row.min(self.lines.len() - 1))
                .map(|row| text::slice(self.line(row), upper.col, lower.col).to_owned())
                .collect(),
            SelectionMode::All
            | SelectionMode::Character
            | SelectionMode::Line
            | SelectionMode::Word => {
                if upper.row == lower.row {
                    return vec![text::slice(self.line(upper.row), upper.col, lower.col).to_owned()];
                }
                let mut out = Vec::with_capacity(lower.row - upper.row + 1);
                out.push(text::tail(self.line(upper.row), upper.col).to_owned());
                out.extend(self.lines[upper.row + 1..lower.row].iter().cloned());
                out.push(text::head(self.line(lower.row), lower.col).to_owned());
                out
            }
        }
    }

    /// Remove whatever the current selection covers.
    pub fn delete_selection(&mut self) {
        let (upper, lower) = self.start_and_end();
        self.delete_between(upper, lower, self.mode);
    }

    /// Remove the span between two positions the way `mode` selects.
    ///
    /// The buffer keeps at least one row.
    pub fn delete_between(&mut self, upper: Position, lower: Position, mode: SelectionMode) {
        match mode {
            SelectionMode::None => {}
            SelectionMode::Block => {
                let count = lower.col.saturating_sub(upper.col);
                for row in upper.row..=lower.row.min(self.lines.len() - 1) {
                    let col = upper.col.min(self.line_width(row));
                    text::remove_at(&mut self.lines[row], col, count);
                }
            }
            SelectionMode::All
            | SelectionMode::Character
            | SelectionMode::Line
            | SelectionMode::Word => {
                let tail = text::tail(self.line(lower.row), lower.col).to_owned();
                let head = &mut self.lines[upper.row];
                head.truncate(text::byte_index(head, upper.col));
                head.push_str(&tail);
                if lower.row > upper.row {
                    self.lines.drain(upper.row + 1..=lower.row);
                }
            }
        }
    }

    /// Insert rows at the pen the way the current mode inserts.
    pub fn insert_lines(&mut self, lines: &[String]) {
        self.insert_lines_at(self.pen, lines, self.mode);
    }

    /// Insert rows at `at`.
    ///
    /// - None/Character/Word splice into the row, opening rows for
    ///   multi-line input.
    /// - Line splices at the start of the row, i.e. before it.
    /// - All replaces the whole buffer.
    /// - Block inserts one line per row starting at `at`.
    pub fn insert_lines_at(&mut self, at: Position, lines: &[String], mode: SelectionMode) {
        if lines.is_empty() {
            return;
        }
        match mode {
            SelectionMode::Block => {
                for (i, line) in lines.iter().enumerate() {
                    let row = at.row + i;
                    if row >= self.lines.len() {
                        break;
                    }
                    let col = at.col.min(self.line_width(row));
                    text::insert_at(&mut self.lines[row], col, line);
                }
            }
            SelectionMode::All => self.lines = lines.to_vec(),
            SelectionMode::Line => self.splice(Position::new(at.row, 0), lines),
            SelectionMode::None | SelectionMode::Character | SelectionMode::Word => {
                self.splice(at, lines);
            }
        }
    }

    /// Exact inverse of [`insert_lines_at`](Self::insert_lines_at) with the
    /// same arguments.
    pub fn remove_lines_at(&mut self, at: Position, lines: &[String], mode: SelectionMode) {
        if lines.is_empty() {
            return;
        }
        match mode {
            SelectionMode::Block => {
                for (i, line) in lines.iter().enumerate() {
                    let row = at.row + i;
                    if row >= self.lines.len() {
                        break;
                    }
                    let count = text::width(line);
                    let col = at.col.min(self.line_width(row).saturating_sub(count));
                    text::remove_at(&mut self.lines[row], col, count);
                }
            }
            SelectionMode::All => self.lines = vec![String::new()],
            SelectionMode::Line => self.unsplice(Position::new(at.row, 0), lines),
            SelectionMode::None | SelectionMode::Character | SelectionMode::Word => {
                self.unsplice(at, lines);
            }
        }
    }

    /// Restore text removed by [`delete_selection`](Self::delete_selection),
    /// given pen and marker have not moved since.
    pub fn restore_selection(&mut self, lines: &[String]) {
        let (upper, _) = self.start_and_end();
        self.insert_lines_at(upper, lines, self.mode);
    }

    fn splice(&mut self, at: Position, lines: &[String]) {
        let row = &mut self.lines[at.row];
        let split = text::byte_index(row, at.col);
        let rest = row.split_off(split);
        row.push_str(&lines[0]);
        if lines.len() == 1 {
            row.push_str(&rest);
            return;
        }
        let mut last = lines[lines.len() - 1].clone();
        last.push_str(&rest);
        let middle = lines[1..lines.len() - 1].iter().cloned();
        let tail = middle.chain(std::iter::once(last));
        let insert_at = at.row + 1;
        self.lines.splice(insert_at..insert_at, tail);
    }

    fn unsplice(&mut self, at: Position, lines: &[String]) {
        let first_width = text::width(&lines[0]);
        if lines.len() == 1 {
            text::remove_at(&mut self.lines[at.row], at.col, first_width);
            return;
        }
        let last_row = at.row + lines.len() - 1;
        let last_width = text::width(&lines[lines.len() - 1]);
        let rest = text::tail(self.line(last_row), last_width).to_owned();
        let row = &mut self.lines[at.row];
        row.truncate(text::byte_index(row, at.col));
        row.push_str(&rest);
        self.lines.drain(at.row + 1..=last_row);
    }

    /// Panic if pen or marker left the buffer.
    ///
    /// The marker is unused without a selection and may stray in Block mode.
    pub(crate) fn assert_in_bounds(&self) {
        assert!(!self.lines.is_empty(), "buffer lost its last row");
        assert!(self.contains(self.pen), "pen {:?} out of bounds", self.pen);
        if !matches!(self.mode, SelectionMode::None | SelectionMode::Block) {
            assert!(self.contains(self.marker), "marker {:?} out of bounds", self.marker);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(lines: &[&str]) -> Selectable {
        Selectable::new(lines.iter().map(|s| (*s).to_owned()).collect())
    }

    fn select(buf: &mut Selectable, marker: (usize, usize), pen: (usize, usize), mode: SelectionMode) {
        buf.marker = Position::new(marker.0, marker.1);
        buf.pen = Position::new(pen.0, pen.1);
        buf.mode = mode;
    }

    fn strings(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| (*s).to_owned()).collect()
    }

    // --- start_and_end ---

    #[test]
    fn test_none_selection_is_pen_on_both_ends() {
        let mut buf = buffer(&["hello"]);
        select(&mut buf, (0, 0), (0, 3), SelectionMode::None);
        assert_eq!(buf.start_and_end(), (Position::new(0, 3), Position::new(0, 3)));
    }

    #[test]
    fn test_all_selection_spans_buffer() {
        let buf = buffer(&["one", "three"]);
        let mut buf = buf;
        buf.mode = SelectionMode::All;
        assert_eq!(buf.start_and_end(), (Position::new(0, 0), Position::new(1, 5)));
    }

    #[test]
    fn test_block_selection_uses_min_and_max_independently() {
        let mut buf = buffer(&["abcdef", "abcdef", "abcdef"]);
        select(&mut buf, (0, 4), (2, 1), SelectionMode::Block);
        assert_eq!(buf.start_and_end(), (Position::new(0, 1), Position::new(2, 4)));
    }

    #[test]
    fn test_character_selection_swaps_reversed_ends() {
        let mut buf = buffer(&["abc", "def"]);
        select(&mut buf, (1, 2), (0, 1), SelectionMode::Character);
        assert_eq!(buf.start_and_end(), (Position::new(0, 1), Position::new(1, 2)));
        select(&mut buf, (0, 2), (0, 1), SelectionMode::Character);
        assert_eq!(buf.start_and_end(), (Position::new(0, 1), Position::new(0, 2)));
    }

    #[test]
    fn test_line_selection_covers_full_rows() {
        let mut buf = buffer(&["one", "two", "three"]);
        select(&mut buf, (1, 2), (0, 1), SelectionMode::Line);
        assert_eq!(buf.start_and_end(), (Position::new(0, 0), Position::new(2, 0)));
        select(&mut buf, (1, 2), (2, 1), SelectionMode::Line);
        assert_eq!(buf.start_and_end(), (Position::new(1, 0), Position::new(2, 5)));
    }

    #[test]
    fn test_word_selection_inside_single_word() {
        let mut buf = buffer(&["a.b.c"]);
        select(&mut buf, (0, 2), (0, 2), SelectionMode::Word);
        let (upper, lower) = buf.start_and_end();
        assert_eq!((upper, lower), (Position::new(0, 2), Position::new(0, 3)));
        assert_eq!(buf.selected_text(), vec!["b".to_owned()]);
    }

    #[test]
    fn test_word_selection_extends_outward() {
        let mut buf = buffer(&["hello big world"]);
        select(&mut buf, (0, 8), (0, 2), SelectionMode::Word);
        assert_eq!(buf.start_and_end(), (Position::new(0, 0), Position::new(0, 9)));
    }

    #[test]
    fn test_word_selection_on_boundary_stays() {
        let mut buf = buffer(&["ab cd"]);
        select(&mut buf, (0, 0), (0, 2), SelectionMode::Word);
        assert_eq!(buf.start_and_end(), (Position::new(0, 0), Position::new(0, 2)));
    }

    // --- text extraction ---

    #[test]
    fn test_block_text_slices_each_row() {
        let mut buf = buffer(&["abcdef", "ab", "abcdef"]);
        select(&mut buf, (0, 1), (2, 4), SelectionMode::Block);
        assert_eq!(buf.selected_text(), strings(&["bcd", "b", "bcd"]));
    }

    #[test]
    fn test_character_text_partial_first_and_last() {
        let mut buf = buffer(&["abc", "def", "ghi"]);
        select(&mut buf, (0, 1), (2, 2), SelectionMode::Character);
        assert_eq!(buf.selected_text(), strings(&["bc", "def", "gh"]));
        assert_eq!(buf.count_selected(), (7, 3));
    }

    #[test]
    fn test_none_selection_has_no_text() {
        let buf = buffer(&["abc"]);
        assert!(buf.selected_text().is_empty());
    }

    // --- deletion ---

    #[test]
    fn test_line_delete_of_every_row_leaves_one_empty_row() {
        let mut buf = buffer(&["one", "two"]);
        select(&mut buf, (0, 0), (1, 0), SelectionMode::Line);
        buf.delete_selection();
        assert_eq!(buf.lines(), &[String::new()]);
    }

    #[test]
    fn test_line_delete_of_middle_row() {
        let mut buf = buffer(&["one", "two", "three"]);
        select(&mut buf, (1, 1), (1, 1), SelectionMode::Line);
        buf.delete_selection();
        assert_eq!(buf.lines(), strings(&["one", "three"]));
    }

    #[test]
    fn test_all_delete_leaves_one_empty_row() {
        let mut buf = buffer(&["one", "two"]);
        buf.mode = SelectionMode::All;
        buf.delete_selection();
        assert_eq!(buf.lines(), &[String::new()]);
    }

    #[test]
    fn test_block_delete_removes_columns() {
        let mut buf = buffer(&["abcdef", "ab", "abcdef"]);
        select(&mut buf, (0, 1), (2, 4), SelectionMode::Block);
        buf.delete_selection();
        assert_eq!(buf.lines(), strings(&["aef", "a", "aef"]));
    }

    #[test]
    fn test_character_delete_collapses_rows() {
        let mut buf = buffer(&["abc", "def", "ghi"]);
        select(&mut buf, (0, 1), (2, 2), SelectionMode::Character);
        buf.delete_selection();
        assert_eq!(buf.lines(), strings(&["ai"]));
    }

    // --- insertion ---

    #[test]
    fn test_insert_single_line_splices() {
        let mut buf = buffer(&["abef"]);
        buf.pen = Position::new(0, 2);
        buf.insert_lines(&strings(&["cd"]));
        assert_eq!(buf.lines(), strings(&["abcdef"]));
    }

    #[test]
    fn test_insert_multi_line_opens_rows() {
        let mut buf = buffer(&["abef"]);
        buf.pen = Position::new(0, 2);
        buf.insert_lines(&strings(&["c", "x", "d"]));
        assert_eq!(buf.lines(), strings(&["abc", "x", "def"]));
        buf.remove_lines_at(Position::new(0, 2), &strings(&["c", "x", "d"]), SelectionMode::None);
        assert_eq!(buf.lines(), strings(&["abef"]));
    }

    #[test]
    fn test_insert_block_advances_one_row_per_line() {
        let mut buf = buffer(&["ab", "a", "ab"]);
        buf.pen = Position::new(0, 1);
        buf.insert_lines_at(buf.pen, &strings(&["X", "Y", "Z"]), SelectionMode::Block);
        assert_eq!(buf.lines(), strings(&["aXb", "aY", "aZb"]));
        buf.remove_lines_at(Position::new(0, 1), &strings(&["X", "Y", "Z"]), SelectionMode::Block);
        assert_eq!(buf.lines(), strings(&["ab", "a", "ab"]));
    }

    #[test]
    fn test_insert_line_mode_goes_before_cursor_row() {
        let mut buf = buffer(&["one", "two"]);
        select(&mut buf, (1, 2), (1, 2), SelectionMode::Line);
        buf.insert_lines(&strings(&["new", ""]));
        assert_eq!(buf.lines(), strings(&["one", "new", "two"]));
    }

    #[test]
    fn test_insert_all_replaces_buffer() {
        let mut buf = buffer(&[""]);
        buf.mode = SelectionMode::All;
        buf.insert_lines(&strings(&["x", "y"]));
        assert_eq!(buf.lines(), strings(&["x", "y"]));
    }

    #[test]
    fn test_selected_row_range_skips_row_ending_at_column_zero() {
        let mut buf = buffer(&["a", "b", "c"]);
        select(&mut buf, (0, 0), (2, 0), SelectionMode::Character);
        assert_eq!(buf.selected_row_range(), 0..=1);
        select(&mut buf, (0, 0), (2, 1), SelectionMode::Character);
        assert_eq!(buf.selected_row_range(), 0..=2);
    }

    #[test]
    fn test_next_mode_cycles() {
        assert_eq!(SelectionMode::None.next(), SelectionMode::All);
        assert_eq!(SelectionMode::Word.next(), SelectionMode::None);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_lines() -> impl Strategy<Value = Vec<String>> {
            prop::collection::vec("[a-c .é]{0,6}", 1..6)
        }

        fn arb_mode() -> impl Strategy<Value = SelectionMode> {
            (0..SelectionMode::COUNT).prop_map(|i| SelectionMode::from_index(i).unwrap())
        }

        fn place(lines: &[String], row: usize, col: usize) -> Position {
            let row = row % lines.len();
            Position::new(row, col % (text::width(&lines[row]) + 1))
        }

        proptest! {
            #[test]
            fn start_and_end_is_ordered(
                lines in arb_lines(),
                mode in arb_mode(),
                pen in (0..8usize, 0..8usize),
                marker in (0..8usize, 0..8usize),
            ) {
                let mut buf = Selectable::new(lines.clone());
                buf.pen = place(&lines, pen.0, pen.1);
                buf.marker = place(&lines, marker.0, marker.1);
                buf.mode = mode;
                let (upper, lower) = buf.start_and_end();
                prop_assert!(upper.row <= lower.row);
                if upper.row == lower.row {
                    prop_assert!(upper.col <= lower.col);
                }
            }

            #[test]
            fn select_delete_insert_restores_rows(
                lines in arb_lines(),
                mode in arb_mode(),
                pen in (0..8usize, 0..8usize),
                marker in (0..8usize, 0..8usize),
            ) {
                let mut buf = Selectable::new(lines.clone());
                buf.pen = place(&lines, pen.0, pen.1);
                buf.marker = place(&lines, marker.0, marker.1);
                buf.mode = mode;
                // Insertion happens at the pen, so park it at the upper end.
                let (upper, lower) = buf.start_and_end();
                if mode == SelectionMode::Line {
                    let bottom = buf.pen.row.max(buf.marker.row);
                    buf.pen = upper;
                    buf.marker = Position::new(bottom, 0);
                } else {
                    buf.pen = upper;
                    buf.marker = lower;
                }
                if mode == SelectionMode::Word {
                    buf.mode = SelectionMode::Character;
                }
                let selected = buf.selected_text();
                buf.delete_selection();
                buf.insert_lines(&selected);
                prop_assert_eq!(buf.lines(), lines.as_slice());
            }
        }
    }
}
