//! Reversible edit records.
//!
//! Each [`Change`] carries exactly the data it needs to be applied and
//! reverted against a [`Selectable`]. Replay never clamps: a change is only
//! valid against the state it was recorded in, and coordinates going
//! negative is a bug.

use std::ops::{Add, Neg};

use serde::{Deserialize, Serialize};

use super::selection::{Position, Selectable, SelectionMode};
use super::text;

/// Relative cursor motion: pen and marker offsets plus a mode offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveDelta {
    pub pen_row: isize,
    pub pen_col: isize,
    pub marker_row: isize,
    pub marker_col: isize,
    pub mode: isize,
}

impl MoveDelta {
    /// Move the pen only.
    pub const fn pen(rows: isize, cols: isize) -> Self {
        Self {
            pen_row: rows,
            pen_col: cols,
            marker_row: 0,
            marker_col: 0,
            mode: 0,
        }
    }

    /// Delta taking `from`'s pen, marker and mode to the given targets.
    pub fn between(from: &Selectable, pen: Position, marker: Position, mode: SelectionMode) -> Self {
        Self {
            pen_row: signed(pen.row) - signed(from.pen.row),
            pen_col: signed(pen.col) - signed(from.pen.col),
            marker_row: signed(marker.row) - signed(from.marker.row),
            marker_col: signed(marker.col) - signed(from.marker.col),
            mode: mode.index() - from.mode.index(),
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn apply(self, state: &mut Selectable) {
        state.pen.row = offset(state.pen.row, self.pen_row, "pen row");
        state.pen.col = offset(state.pen.col, self.pen_col, "pen col");
        state.marker.row = offset(state.marker.row, self.marker_row, "marker row");
        state.marker.col = offset(state.marker.col, self.marker_col, "marker col");
        let index = state.mode.index() + self.mode;
        state.mode = SelectionMode::from_index(index)
            .unwrap_or_else(|| panic!("selection mode index {index} out of range"));
    }

    pub(crate) fn revert(self, state: &mut Selectable) {
        (-self).apply(state);
    }
}

impl Add for MoveDelta {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            pen_row: self.pen_row + rhs.pen_row,
            pen_col: self.pen_col + rhs.pen_col,
            marker_row: self.marker_row + rhs.marker_row,
            marker_col: self.marker_col + rhs.marker_col,
            mode: self.mode + rhs.mode,
        }
    }
}

impl Neg for MoveDelta {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            pen_row: -self.pen_row,
            pen_col: -self.pen_col,
            marker_row: -self.marker_row,
            marker_col: -self.marker_col,
            mode: -self.mode,
        }
    }
}

pub(crate) const fn signed(value: usize) -> isize {
    value as isize
}

fn offset(value: usize, delta: isize, what: &str) -> usize {
    match value.checked_add_signed(delta) {
        Some(moved) => moved,
        None => panic!("{what} {value} moved by {delta} before the origin"),
    }
}

/// One opcode of a row diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineDiffOp {
    /// Keep this many rows unchanged.
    Keep(usize),
    Insert(String),
    Delete(String),
}

/// A reversible edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Change {
    Move(MoveDelta),
    /// Insert text at the pen and advance the pen past it.
    InsertText(String),
    /// Remove text following the pen.
    DeleteText(String),
    /// Remove text preceding the pen, pulling the pen back.
    Backspace(String),
    /// Append the next row onto the pen row. The pen sits at the row end.
    Join,
    /// Split the pen row at the pen, opening `rows` rows, then relocate.
    Split { rows: usize, relocate: MoveDelta },
    /// Remove an explicit span, independent of the live selection.
    DeleteRange {
        upper: Position,
        lower: Position,
        text: Vec<String>,
    },
    /// Remove whatever the live selection covers.
    DeleteSelection(Vec<String>),
    /// Insert rows at the pen in the live selection mode.
    Paste(Vec<String>),
    /// Move rows `begin..end` so they land before row `dest`.
    MoveLines { begin: usize, end: usize, dest: usize },
    VerticalInsert {
        text: String,
        begin_row: usize,
        end_row: usize,
        col: usize,
    },
    VerticalDelete {
        text: String,
        begin_row: usize,
        end_row: usize,
        col: usize,
    },
    /// Rewrite the row array from a precomputed diff.
    LineDiff(Vec<LineDiffOp>),
    /// Everything one verb changed, applied and reverted as one step.
    Group(Vec<Change>),
}

impl Change {
    pub const fn is_move(&self) -> bool {
        matches!(self, Self::Move(_))
    }

    /// Short kind name for logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Move(_) => "move",
            Self::InsertText(_) => "insert",
            Self::DeleteText(_) => "delete",
            Self::Backspace(_) => "backspace",
            Self::Join => "join",
            Self::Split { .. } => "split",
            Self::DeleteRange { .. } => "delete-range",
            Self::DeleteSelection(_) => "delete-selection",
            Self::Paste(_) => "paste",
            Self::MoveLines { .. } => "move-lines",
            Self::VerticalInsert { .. } => "vertical-insert",
            Self::VerticalDelete { .. } => "vertical-delete",
            Self::LineDiff(_) => "line-diff",
            Self::Group(_) => "group",
        }
    }

    /// Merge `next` into `self` when both belong to the same burst.
    ///
    /// Only called for two adjacent, already applied entries, so the
    /// merged change applied to the state before `self` yields the state
    /// after `next`.
    pub fn merge(&self, next: &Self) -> Option<Self> {
        match (self, next) {
            (Self::InsertText(a), Self::InsertText(b)) => Some(Self::InsertText(format!("{a}{b}"))),
            (Self::DeleteText(a), Self::DeleteText(b)) => Some(Self::DeleteText(format!("{a}{b}"))),
            (Self::Backspace(a), Self::Backspace(b)) => Some(Self::Backspace(format!("{b}{a}"))),
            (
                Self::Split { rows: a, relocate: ma },
                Self::Split { rows: b, relocate: mb },
            ) if splits_chain(*ma, *mb) => Some(Self::Split {
                rows: a + b,
                relocate: *ma + *mb,
            }),
            _ => None,
        }
    }

    pub(crate) fn apply(&self, state: &mut Selectable) {
        match self {
            Self::Move(delta) => delta.apply(state),
            Self::InsertText(text) => {
                let row = state.pen.row;
                text::insert_at(&mut state.lines[row], state.pen.col, text);
                state.pen.col += text::width(text);
                state.goal_col = state.pen.col;
            }
            Self::DeleteText(text) => {
                let row = state.pen.row;
                text::remove_at(&mut state.lines[row], state.pen.col, text::width(text));
            }
            Self::Backspace(text) => {
                let row = state.pen.row;
                state.pen.col -= text::width(text);
                text::remove_at(&mut state.lines[row], state.pen.col, text::width(text));
            }
            Self::Join => {
                let row = state.pen.row;
                let next = state.lines.remove(row + 1);
                state.lines[row].push_str(&next);
            }
            Self::Split { rows, relocate } => {
                let row = state.pen.row;
                let at = text::byte_index(&state.lines[row], state.pen.col);
                let rest = state.lines[row].split_off(at);
                let opened = (1..(*rows).max(1)).map(|_| String::new()).chain(std::iter::once(rest));
                state.lines.splice(row + 1..row + 1, opened);
                relocate.apply(state);
            }
            Self::DeleteRange { upper, lower, .. } => {
                state.delete_between(*upper, *lower, SelectionMode::Character);
            }
            Self::DeleteSelection(_) => state.delete_selection(),
            Self::Paste(lines) => state.insert_lines(lines),
            Self::MoveLines { begin, end, dest } => move_lines(state, *begin, *end, *dest),
            Self::VerticalInsert {
                text,
                begin_row,
                end_row,
                col,
            } => vertical_insert(state, text, *begin_row, *end_row, *col),
            Self::VerticalDelete {
                text,
                begin_row,
                end_row,
                col,
            } => vertical_delete(state, text, *begin_row, *end_row, *col),
            Self::LineDiff(ops) => state.lines = rewrite(&state.lines, ops, false),
            Self::Group(steps) => {
                for step in steps {
                    step.apply(state);
                }
            }
        }
    }

    pub(crate) fn revert(&self, state: &mut Selectable) {
        match self {
            Self::Move(delta) => delta.revert(state),
            Self::InsertText(text) => {
                let row = state.pen.row;
                state.pen.col -= text::width(text);
                text::remove_at(&mut state.lines[row], state.pen.col, text::width(text));
                state.goal_col = state.pen.col;
            }
            Self::DeleteText(text) => {
                let row = state.pen.row;
                text::insert_at(&mut state.lines[row], state.pen.col, text);
            }
            Self::Backspace(text) => {
                let row = state.pen.row;
                text::insert_at(&mut state.lines[row], state.pen.col, text);
                state.pen.col += text::width(text);
            }
            Self::Join => {
                let row = state.pen.row;
                let at = text::byte_index(&state.lines[row], state.pen.col);
                let rest = state.lines[row].split_off(at);
                state.lines.insert(row + 1, rest);
            }
            Self::Split { rows, relocate } => {
                relocate.revert(state);
                let row = state.pen.row;
                let opened = (*rows).max(1);
                let rest = state.lines[row + opened].clone();
                state.lines.drain(row + 1..=row + opened);
                state.lines[row].push_str(&rest);
            }
            Self::DeleteRange { upper, text, .. } => {
                state.insert_lines_at(*upper, text, SelectionMode::Character);
            }
            Self::DeleteSelection(lines) => state.restore_selection(lines),
            Self::Paste(lines) => {
                let (pen, mode) = (state.pen, state.mode);
                state.remove_lines_at(pen, lines, mode);
            }
            Self::MoveLines { begin, end, dest } => {
                let count = end - begin;
                if begin < dest {
                    move_lines(state, dest - count, *dest, *begin);
                } else {
                    move_lines(state, *dest, dest + count, *end);
                }
            }
            Self::VerticalInsert {
                text,
                begin_row,
                end_row,
                col,
            } => vertical_delete(state, text, *begin_row, *end_row, *col),
            Self::VerticalDelete {
                text,
                begin_row,
                end_row,
                col,
            } => vertical_insert(state, text, *begin_row, *end_row, *col),
            Self::LineDiff(ops) => state.lines = rewrite(&state.lines, ops, true),
            Self::Group(steps) => {
                for step in steps.iter().rev() {
                    step.revert(state);
                }
            }
        }
    }
}

/// Two adjacent splits merge when both move only the pen down onto the rows
/// they open and the second breaks at column 0. The second starts where the
/// first left the pen, so the first landed at the row start too.
fn splits_chain(first: MoveDelta, second: MoveDelta) -> bool {
    let pen_only = |d: MoveDelta| d.marker_row == 0 && d.marker_col == 0 && d.mode == 0;
    pen_only(first) && pen_only(second) && first.pen_row > 0 && second.pen_row > 0 && second.pen_col == 0
}

fn move_lines(state: &mut Selectable, begin: usize, end: usize, dest: usize) {
    assert!(dest < begin || dest > end, "rows {begin}..{end} cannot move to {dest}");
    let count = end - begin;
    let moved: Vec<String> = state.lines.drain(begin..end).collect();
    let tracks_marker = state.mode != SelectionMode::None;
    let dest = if begin < dest {
        state.pen.row -= count;
        if tracks_marker {
            state.marker.row -= count;
        }
        dest - count
    } else {
        state.pen.row += count;
        if tracks_marker {
            state.marker.row += count;
        }
        dest
    };
    state.lines.splice(dest..dest, moved);
}

fn vertical_insert(state: &mut Selectable, text: &str, begin_row: usize, end_row: usize, col: usize) {
    for line in &mut state.lines[begin_row..=end_row] {
        text::insert_at(line, col, text);
    }
}

fn vertical_delete(state: &mut Selectable, text: &str, begin_row: usize, end_row: usize, col: usize) {
    let count = text::width(text);
    for line in &mut state.lines[begin_row..=end_row] {
        text::remove_at(line, col, count);
    }
}

fn rewrite(lines: &[String], ops: &[LineDiffOp], reverse: bool) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len());
    let mut index = 0;
    for op in ops {
        match op {
            LineDiffOp::Keep(count) => {
                out.extend_from_slice(&lines[index..index + count]);
                index += count;
            }
            LineDiffOp::Insert(line) | LineDiffOp::Delete(line) => {
                let adds = matches!(op, LineDiffOp::Insert(_)) != reverse;
                if adds {
                    out.push(line.clone());
                } else {
                    index += 1;
                }
            }
        }
    }
    out
}
