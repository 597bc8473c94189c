//! The action layer: the verbs a controller binds to keys.
//!
//! Every verb turns user intent into [`Change`]s computed against the
//! current content, pushes them through the [`ChangeLog`] and reports
//! anything the user should see through the [`MessageSink`]. Verbs never
//! return errors. Cursor motion lives in `motion.rs`.

use std::ops::RangeInclusive;
use std::path::Path;

use tracing::{debug, info, warn};

use super::bookmarks::{Bookmark, BookmarkData, Bookmarks};
use super::change::{Change, MoveDelta, signed};
use super::change_log::ChangeLog;
use super::find::{Direction, FindOptions, SearchPattern, SubstituteError, Substitution};
use super::line_diff;
use super::ports::{Grammar, MessageSink, StatusLine, StatusMessage, ViewPort};
use super::selection::{Position, Selectable, SelectionMode};
use super::text;
use super::viewport::Viewport;
use crate::storage;

/// User preferences the verbs consult.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorPrefs {
    /// One indent step when the grammar does not name one.
    pub indent: String,
    pub find: FindOptions,
    /// Type the closing half of `' " ( [ {` along with the opener.
    pub auto_pair: bool,
    /// Where recentering puts the target, as a fraction of the view.
    pub optimal_cursor_row: f64,
    pub optimal_cursor_col: f64,
}

impl Default for EditorPrefs {
    fn default() -> Self {
        Self {
            indent: "  ".to_owned(),
            find: FindOptions::default(),
            auto_pair: false,
            optimal_cursor_row: 0.28,
            optimal_cursor_col: 0.98,
        }
    }
}

/// One open document with its log, bookmarks and host capabilities.
#[derive(Debug)]
pub struct Editor<V: ViewPort = Viewport, M: MessageSink = StatusLine> {
    pub(super) buffer: Selectable,
    pub(super) log: ChangeLog,
    pub(super) bookmarks: Bookmarks,
    pub(super) view: V,
    pub(super) messages: M,
    pub(super) grammar: Grammar,
    pub(super) prefs: EditorPrefs,
    pub(super) find: Option<SearchPattern>,
}

impl Editor {
    /// Editor over `lines` with a default viewport and status line.
    pub fn new(lines: Vec<String>) -> Self {
        Self::with_ports(lines, Viewport::default(), StatusLine::default())
    }

    pub fn from_text(data: &str) -> Self {
        Self::new(text::data_to_lines(data))
    }
}

impl<V: ViewPort, M: MessageSink> Editor<V, M> {
    pub fn with_ports(lines: Vec<String>, mut view: V, messages: M) -> Self {
        let buffer = Selectable::new(lines);
        view.document_resized(buffer.row_count());
        Self {
            buffer,
            log: ChangeLog::new(),
            bookmarks: Bookmarks::default(),
            view,
            messages,
            grammar: Grammar::plain(),
            prefs: EditorPrefs::default(),
            find: None,
        }
    }

    #[must_use]
    pub fn with_grammar(mut self, grammar: Grammar) -> Self {
        self.grammar = grammar;
        self
    }

    #[must_use]
    pub fn with_prefs(mut self, prefs: EditorPrefs) -> Self {
        self.prefs = prefs;
        self
    }

    pub const fn buffer(&self) -> &Selectable {
        &self.buffer
    }

    pub fn lines(&self) -> &[String] {
        self.buffer.lines()
    }

    pub fn line(&self, row: usize) -> &str {
        self.buffer.line(row)
    }

    pub const fn pen(&self) -> Position {
        self.buffer.pen()
    }

    pub const fn marker(&self) -> Position {
        self.buffer.marker()
    }

    pub const fn mode(&self) -> SelectionMode {
        self.buffer.mode()
    }

    pub fn start_and_end(&self) -> (Position, Position) {
        self.buffer.start_and_end()
    }

    pub fn selected_text(&self) -> Vec<String> {
        self.buffer.selected_text()
    }

    /// Flattened copy of the document for background observers.
    pub fn to_data(&self) -> String {
        self.buffer.to_data()
    }

    pub const fn log(&self) -> &ChangeLog {
        &self.log
    }

    pub const fn bookmarks(&self) -> &Bookmarks {
        &self.bookmarks
    }

    pub const fn view(&self) -> &V {
        &self.view
    }

    pub const fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub const fn messages(&self) -> &M {
        &self.messages
    }

    pub const fn messages_mut(&mut self) -> &mut M {
        &mut self.messages
    }

    pub const fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub const fn prefs(&self) -> &EditorPrefs {
        &self.prefs
    }

    pub fn is_dirty(&self) -> bool {
        self.log.is_dirty()
    }

    /// Install cursor state, bookmarks and (optionally) a change log
    /// recovered from a previous session.
    ///
    /// Positions are clamped; the content may have changed since.
    pub fn restore(
        &mut self,
        pen: Position,
        marker: Position,
        mode: SelectionMode,
        bookmarks: Bookmarks,
        log: Option<ChangeLog>,
    ) {
        self.buffer.pen = self.buffer.clamp(pen);
        self.buffer.marker = self.buffer.clamp(marker);
        self.buffer.mode = mode;
        self.buffer.goal_col = self.buffer.pen.col;
        self.bookmarks = bookmarks;
        if let Some(log) = log {
            self.log = log;
        }
        self.settle();
    }

    // Plumbing shared by every verb.

    /// Queue `change` and apply it.
    pub(super) fn apply(&mut self, change: Change) {
        self.log.redo_add_change(change, &mut self.buffer);
        self.log.redo(&mut self.buffer);
    }

    /// Run `verb` so all of its changes undo as one step.
    pub(super) fn grouped<T>(&mut self, verb: impl FnOnce(&mut Self) -> T) -> T {
        self.log.begin_group(&mut self.buffer);
        let result = verb(self);
        self.log.end_group(&mut self.buffer);
        result
    }

    /// Check the cursor after a verb and tell the view about the row count.
    pub(super) fn settle(&mut self) {
        self.buffer.assert_in_bounds();
        self.view.document_resized(self.buffer.row_count());
    }

    pub(super) fn message(&mut self, message: StatusMessage) {
        self.messages.set_message(Some(message));
    }

    pub fn clear_message(&mut self) {
        self.messages.set_message(None);
    }

    /// Emit a move, keeping the pen column at or right of the row start
    /// and remembering where it lands as the goal column.
    pub(super) fn move_and_mark(&mut self, mut delta: MoveDelta) {
        let pen_col = signed(self.buffer.pen.col);
        if pen_col + delta.pen_col < 0 {
            delta.pen_col = -pen_col;
        }
        self.buffer.goal_col = (pen_col + delta.pen_col).unsigned_abs();
        self.apply(Change::Move(delta));
    }

    pub(super) fn cursor_move(&mut self, rows: isize, cols: isize) {
        self.move_and_mark(MoveDelta::pen(rows, cols));
    }

    pub(super) fn move_pen_to(&mut self, to: Position) {
        let pen = self.buffer.pen;
        self.cursor_move(
            signed(to.row) - signed(pen.row),
            signed(to.col) - signed(pen.col),
        );
    }

    /// Switch selection mode, dropping the marker at the pen.
    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        if mode == self.buffer.mode {
            return;
        }
        let pen = self.buffer.pen;
        let delta = MoveDelta::between(&self.buffer, pen, pen, mode);
        self.apply(Change::Move(delta));
    }

    /// Delete the live selection and leave no selection behind.
    ///
    /// The selection is first normalised (pen on the upper end, Character
    /// mode unless Block) so the deletion splices back exactly on undo.
    pub(super) fn perform_delete(&mut self) {
        let mode = self.buffer.mode;
        if mode == SelectionMode::None {
            return;
        }
        let removed = self.buffer.selected_text();
        let nothing = removed.iter().all(String::is_empty)
            && (mode == SelectionMode::Block || removed.len() <= 1);
        if !nothing {
            let (upper, lower) = self.buffer.start_and_end();
            let as_mode = if mode == SelectionMode::Block {
                SelectionMode::Block
            } else {
                SelectionMode::Character
            };
            self.move_and_mark(MoveDelta::between(&self.buffer, upper, lower, as_mode));
            self.apply(Change::DeleteSelection(removed));
        }
        let pen = self.buffer.clamp(self.buffer.pen);
        self.move_and_mark(MoveDelta::between(&self.buffer, pen, pen, SelectionMode::None));
    }

    /// Remove `upper..lower`, carrying pen and marker along with the text
    /// that follows the span.
    pub(super) fn perform_delete_range(&mut self, upper: Position, lower: Position) {
        if upper >= lower {
            return;
        }
        let removed = self.buffer.text_between(upper, lower, SelectionMode::Character);
        let pen = shift_past(self.buffer.pen, upper, lower);
        let marker = shift_past(self.buffer.marker, upper, lower);
        self.apply(Change::DeleteRange {
            upper,
            lower,
            text: removed,
        });
        let mode = self.buffer.mode;
        self.move_and_mark(MoveDelta::between(&self.buffer, pen, marker, mode));
    }

    fn has_selection(&self) -> bool {
        self.buffer.mode != SelectionMode::None
    }

    // Selection mode verbs.

    pub fn selection_none(&mut self) {
        self.set_selection_mode(SelectionMode::None);
    }

    pub fn selection_all(&mut self) {
        self.set_selection_mode(SelectionMode::All);
        let delta = self.extend_selection();
        self.move_and_mark(delta);
        self.settle();
    }

    pub fn selection_block(&mut self) {
        self.set_selection_mode(SelectionMode::Block);
    }

    pub fn selection_character(&mut self) {
        self.set_selection_mode(SelectionMode::Character);
    }

    pub fn selection_line(&mut self) {
        self.set_selection_mode(SelectionMode::Line);
    }

    pub fn selection_word(&mut self) {
        self.set_selection_mode(SelectionMode::Word);
    }

    /// Cycle through the selection modes.
    pub fn next_selection_mode(&mut self) {
        let next = self.buffer.mode.next();
        self.set_selection_mode(next);
        debug!(mode = next.name(), "selection mode");
    }

    /// Move that grows pen and marker out to what the mode selects.
    pub(super) fn extend_selection(&self) -> MoveDelta {
        let b = &self.buffer;
        match b.mode {
            SelectionMode::None => MoveDelta::between(b, b.pen, Position::default(), b.mode),
            SelectionMode::All => MoveDelta::between(b, b.end_position(), Position::default(), b.mode),
            SelectionMode::Line => MoveDelta::between(
                b,
                Position::new(b.pen.row, 0),
                Position::new(b.marker.row, 0),
                b.mode,
            ),
            SelectionMode::Word => {
                let (upper, lower) = b.start_and_end();
                if b.pen > b.marker {
                    MoveDelta::between(b, lower, upper, b.mode)
                } else {
                    MoveDelta::between(b, upper, lower, b.mode)
                }
            }
            SelectionMode::Block | SelectionMode::Character => MoveDelta::default(),
        }
    }

    pub fn marker_place(&mut self) {
        let pen = self.buffer.pen;
        let mode = self.buffer.mode;
        self.move_and_mark(MoveDelta::between(&self.buffer, pen, pen, mode));
        self.settle();
    }

    pub fn swap_pen_and_marker(&mut self) {
        if !self.has_selection() {
            return;
        }
        let b = &self.buffer;
        let delta = MoveDelta::between(b, b.marker, b.pen, b.mode);
        self.move_and_mark(delta);
        self.settle();
    }

    /// Select `len` columns from `(row, col)` in `mode`, pen at the start.
    ///
    /// Recenters the view when the span was not visible.
    pub fn select_text(&mut self, row: usize, col: usize, len: usize, mode: SelectionMode) {
        let row = row.min(self.buffer.row_count() - 1);
        let width = self.buffer.line_width(row);
        let col = col.min(width);
        let end = (col + len).min(width);
        let start = Position::new(row, col);
        let stop = Position::new(row, end);
        let in_view = self.is_in_view(start, stop);
        self.selection_none();
        self.move_pen_to(stop);
        self.set_selection_mode(mode);
        self.cursor_move(0, signed(col) - signed(end));
        if !in_view {
            self.scroll_to_optimal(start, stop);
        }
        self.settle();
    }

    // Editing verbs.

    /// Type `text` (a single row) at the pen, replacing any selection.
    pub fn insert(&mut self, text: &str) {
        self.grouped(|ed| {
            if text.contains('\n') {
                ed.edit_paste_data(text);
                return;
            }
            ed.perform_delete();
            if !text.is_empty() {
                ed.apply(Change::InsertText(text.to_owned()));
            }
            ed.settle();
        });
    }

    /// Type one char, auto-pairing brackets and quotes when enabled.
    pub fn insert_printable(&mut self, ch: char) {
        self.grouped(|ed| {
            if ed.prefs.auto_pair && !ed.has_selection() {
                let pen = ed.buffer.pen;
                let next = text::char_at(ed.buffer.line(pen.row), pen.col);
                if is_closer(ch) && next == Some(ch) {
                    ed.cursor_move(0, 1);
                    ed.settle();
                    return;
                }
                if let Some(mate) = closing_mate(ch) {
                    if next.is_none_or(char::is_whitespace) {
                        ed.apply(Change::InsertText(format!("{ch}{mate}")));
                        ed.cursor_move(0, -1);
                        ed.settle();
                        return;
                    }
                }
            }
            ed.insert(ch.encode_utf8(&mut [0; 4]));
        });
    }

    pub fn backspace(&mut self) {
        self.grouped(|ed| {
            if ed.has_selection() {
                ed.perform_delete();
            } else {
                let pen = ed.buffer.pen;
                if pen.col > 0 {
                    let removed = text::slice(ed.buffer.line(pen.row), pen.col - 1, pen.col).to_owned();
                    ed.apply(Change::Backspace(removed));
                } else if pen.row > 0 {
                    ed.cursor_move_left();
                    ed.apply(Change::Join);
                }
            }
            ed.settle();
        });
    }

    /// Backspace to the start of the word or non-word run before the pen.
    pub fn backspace_word(&mut self) {
        self.grouped(|ed| {
            let pen = ed.buffer.pen;
            if ed.has_selection() || pen.col == 0 {
                ed.backspace();
                return;
            }
            let line = ed.buffer.line(pen.row);
            let start = text::run_at(line, pen.col - 1).map_or(pen.col - 1, |(start, _)| start);
            let removed = text::slice(line, start, pen.col).to_owned();
            ed.apply(Change::Backspace(removed));
            ed.settle();
        });
    }

    /// Delete the char under the pen, joining rows at the row end.
    pub fn delete(&mut self) {
        self.grouped(|ed| {
            if ed.has_selection() {
                ed.perform_delete();
            } else {
                let pen = ed.buffer.pen;
                let line = ed.buffer.line(pen.row);
                if let Some(ch) = text::char_at(line, pen.col) {
                    ed.apply(Change::DeleteText(ch.to_string()));
                } else if pen.row + 1 < ed.buffer.row_count() {
                    ed.apply(Change::Join);
                }
            }
            ed.settle();
        });
    }

    pub fn delete_to_end_of_line(&mut self) {
        self.grouped(|ed| {
            if ed.has_selection() {
                ed.perform_delete();
            } else {
                let pen = ed.buffer.pen;
                let rest = text::tail(ed.buffer.line(pen.row), pen.col);
                if !rest.is_empty() {
                    let rest = rest.to_owned();
                    ed.apply(Change::DeleteText(rest));
                } else if pen.row + 1 < ed.buffer.row_count() {
                    ed.apply(Change::Join);
                }
            }
            ed.settle();
        });
    }

    /// Append the next row onto the pen row.
    pub fn join_lines(&mut self) {
        self.grouped(|ed| {
            ed.perform_delete();
            let row = ed.buffer.pen.row;
            if row + 1 < ed.buffer.row_count() {
                ed.cursor_end_of_line();
                ed.apply(Change::Join);
            }
            ed.settle();
        });
    }

    /// Break the row at the pen without moving the pen.
    pub fn split_line(&mut self) {
        self.grouped(|ed| {
            ed.perform_delete();
            ed.apply(Change::Split {
                rows: 1,
                relocate: MoveDelta::default(),
            });
            ed.settle();
        });
    }

    /// Break the row at the pen and move to the new row, auto-indenting
    /// when the grammar names an indent unit.
    pub fn carriage_return(&mut self) {
        self.grouped(|ed| {
            ed.perform_delete();
            let col = signed(ed.buffer.pen.col);
            ed.apply(Change::Split {
                rows: 1,
                relocate: MoveDelta::pen(1, -col),
            });
            if let Some(unit) = ed.grammar.indent.clone() {
                let indent = ed.auto_indent(&unit);
                if !indent.is_empty() {
                    ed.apply(Change::InsertText(indent));
                }
            }
            ed.settle();
        });
    }

    /// Indent for the row just opened by a carriage return.
    fn auto_indent(&mut self, unit: &str) -> String {
        let row = self.buffer.pen.row;
        let above = self.buffer.line(row - 1).to_owned();
        let mut indent = text::leading_whitespace(&above).to_owned();
        let trimmed = above.trim_end();
        let Some(last) = trimmed.chars().last() else {
            return indent;
        };
        match last {
            ':' => indent.push_str(unit),
            '[' | '{' => {
                let closer = text::char_at(self.buffer.line(row), 0);
                if matches!(closer, Some(']' | '}')) {
                    // The closer moves down a row at the outer indent.
                    if !indent.is_empty() {
                        self.apply(Change::InsertText(indent.clone()));
                        self.cursor_move(0, -signed(text::width(&indent)));
                    }
                    self.apply(Change::Split {
                        rows: 1,
                        relocate: MoveDelta::default(),
                    });
                }
                indent.push_str(unit);
            }
            '=' | '+' | '-' | '/' | '*' => {
                indent.push_str(unit);
                indent.push_str(unit);
            }
            _ if trimmed.matches('(').count() > trimmed.matches(')').count() => {
                indent.push_str(unit);
                indent.push_str(unit);
            }
            _ => {}
        }
        indent
    }

    fn indent_unit(&self) -> String {
        self.grammar
            .indent
            .clone()
            .unwrap_or_else(|| self.prefs.indent.clone())
    }

    /// Insert one indent unit at the pen, or at the start of every
    /// selected row.
    pub fn indent(&mut self) {
        self.grouped(|ed| {
            let unit = ed.indent_unit();
            let width = signed(text::width(&unit));
            let (pen, marker) = (ed.buffer.pen, ed.buffer.marker);
            if ed.has_selection() {
                let rows = ed.buffer.selected_row_range();
                ed.apply(Change::VerticalInsert {
                    text: unit,
                    begin_row: *rows.start(),
                    end_row: *rows.end(),
                    col: 0,
                });
                let shift = |pos: Position| if rows.contains(&pos.row) { width } else { 0 };
                ed.move_and_mark(MoveDelta {
                    pen_col: shift(pen),
                    marker_col: shift(marker),
                    ..MoveDelta::default()
                });
            } else {
                ed.apply(Change::VerticalInsert {
                    text: unit,
                    begin_row: pen.row,
                    end_row: pen.row,
                    col: pen.col,
                });
                ed.cursor_move(0, width);
            }
            ed.settle();
        });
    }

    /// Remove one indent unit before the pen, or from the start of every
    /// selected row that carries one.
    pub fn unindent(&mut self) {
        self.grouped(|ed| {
            let unit = ed.indent_unit();
            let width = text::width(&unit);
            if width == 0 {
                return;
            }
            let (pen, marker) = (ed.buffer.pen, ed.buffer.marker);
            if !ed.has_selection() {
                let before = text::slice(ed.buffer.line(pen.row), pen.col.saturating_sub(width), pen.col);
                if pen.col >= width && before == unit {
                    ed.cursor_move(0, -signed(width));
                    ed.apply(Change::VerticalDelete {
                        text: unit,
                        begin_row: pen.row,
                        end_row: pen.row,
                        col: pen.col - width,
                    });
                }
                ed.settle();
                return;
            }

            let rows = ed.buffer.selected_row_range();
            let indented: Vec<bool> = rows
                .clone()
                .map(|row| ed.buffer.line(row).starts_with(unit.as_str()))
                .collect();
            let shift = |pos: Position| {
                let carries = rows.contains(&pos.row) && indented[pos.row - rows.start()];
                if carries { -signed(width.min(pos.col)) } else { 0 }
            };
            // Cursor first, so it never sits past the end of a shortened row.
            ed.move_and_mark(MoveDelta {
                pen_col: shift(pen),
                marker_col: shift(marker),
                ..MoveDelta::default()
            });
            for run in indented_runs(&rows, &indented) {
                ed.apply(Change::VerticalDelete {
                    text: unit.clone(),
                    begin_row: *run.start(),
                    end_row: *run.end(),
                    col: 0,
                });
            }
            ed.settle();
        });
    }

    /// Remove trailing whitespace from every row, one edit per row.
    pub fn strip_trailing_whitespace(&mut self) {
        self.grouped(|ed| {
            let mut stripped = 0;
            for row in 0..ed.buffer.row_count() {
                let line = ed.buffer.line(row);
                let width = text::width(line);
                let kept = text::width(line.trim_end());
                if kept < width {
                    ed.perform_delete_range(Position::new(row, kept), Position::new(row, width));
                    stripped += 1;
                }
            }
            if stripped > 0 {
                debug!(rows = stripped, "stripped trailing whitespace");
            }
            ed.settle();
        });
    }

    /// Move the row below the selection to above it.
    pub fn move_selected_rows_down(&mut self) {
        self.grouped(|ed| {
            let (upper, lower) = ed.selected_rows();
            if lower + 1 >= ed.buffer.row_count() {
                return;
            }
            ed.apply(Change::MoveLines {
                begin: lower + 1,
                end: lower + 2,
                dest: upper,
            });
            ed.settle();
        });
    }

    /// Move the row above the selection to below it.
    pub fn move_selected_rows_up(&mut self) {
        self.grouped(|ed| {
            let (upper, lower) = ed.selected_rows();
            if upper == 0 {
                return;
            }
            ed.apply(Change::MoveLines {
                begin: upper - 1,
                end: upper,
                dest: lower + 1,
            });
            ed.settle();
        });
    }

    /// Rows holding the pen and marker ends of the selection.
    fn selected_rows(&self) -> (usize, usize) {
        let (upper, lower) = self.buffer.start_and_end();
        if self.buffer.mode == SelectionMode::Line {
            let rows = self.buffer.selected_row_range();
            (*rows.start(), *rows.end())
        } else {
            (upper.row, lower.row)
        }
    }

    // Clipboard. The host owns the actual clipboard; these trade in rows.

    /// Copy the selection, reporting how much was taken.
    pub fn edit_copy(&mut self) -> Option<Vec<String>> {
        let clip = self.buffer.selected_text();
        match clip.as_slice() {
            [] => return None,
            [only] => {
                let chars = text::width(only);
                self.message(StatusMessage::info(format!("copied {chars} characters")));
            }
            rows => {
                let count = rows.len();
                self.message(StatusMessage::info(format!("copied {count} lines")));
            }
        }
        Some(clip)
    }

    pub fn edit_cut(&mut self) -> Option<Vec<String>> {
        self.grouped(|ed| {
            let clip = ed.edit_copy()?;
            ed.perform_delete();
            ed.settle();
            Some(clip)
        })
    }

    /// Paste rows at the pen, replacing any selection, and move past them.
    pub fn edit_paste_lines(&mut self, clip: &[String]) {
        self.grouped(|ed| {
            ed.perform_delete();
            let nothing = clip.len() <= 1 && clip.iter().all(String::is_empty);
            if !nothing {
                let pen = ed.buffer.pen;
                ed.apply(Change::Paste(clip.to_vec()));
                let last = clip.len() - 1;
                let end_col = if last == 0 {
                    pen.col + text::width(&clip[0])
                } else {
                    text::width(&clip[last])
                };
                ed.move_pen_to(Position::new(pen.row + last, end_col));
            }
            ed.settle();
        });
    }

    pub fn edit_paste_data(&mut self, data: &str) {
        self.edit_paste_lines(&text::data_to_lines(data));
    }

    pub fn undo(&mut self) {
        if !self.log.can_undo() {
            self.message(StatusMessage::info("Nothing to undo"));
            return;
        }
        self.log.undo(&mut self.buffer);
        self.buffer.goal_col = self.buffer.pen.col;
        self.keep_pen_in_view();
        self.settle();
    }

    pub fn redo(&mut self) {
        if !self.log.can_redo() {
            self.message(StatusMessage::info("Nothing to redo"));
            return;
        }
        self.log.redo(&mut self.buffer);
        self.buffer.goal_col = self.buffer.pen.col;
        self.keep_pen_in_view();
        self.settle();
    }

    // Find and replace.

    /// Compile `search_for` and select the first match in `direction`.
    ///
    /// An empty pattern clears the search.
    pub fn find(&mut self, search_for: &str, direction: Direction) {
        if search_for.is_empty() {
            self.find = None;
            self.selection_none();
            self.settle();
            return;
        }
        match SearchPattern::new(search_for, self.prefs.find) {
            Ok(pattern) => {
                self.find = Some(pattern);
                self.find_current_pattern(direction);
            }
            Err(err) => {
                warn!(%err, pattern = search_for, "find pattern rejected");
                self.message(StatusMessage::error(err.to_string()));
            }
        }
    }

    pub fn find_next(&mut self) {
        self.find_current_pattern(Direction::Forward);
    }

    pub fn find_prior(&mut self) {
        self.find_current_pattern(Direction::Backward);
    }

    fn find_current_pattern(&mut self, direction: Direction) {
        let Some(pattern) = self.find.as_ref() else {
            return;
        };
        match pattern.search(self.buffer.lines(), self.buffer.pen, direction) {
            Some(found) => {
                if found.wrapped {
                    self.message(StatusMessage::info("Find wrapped around."));
                }
                self.select_text(found.start.row, found.start.col, found.len, SelectionMode::Character);
            }
            None => {
                self.selection_none();
                self.message(StatusMessage::info("Not found"));
                self.settle();
            }
        }
    }

    /// Replace the current find selection, expanding group references
    /// when regex find is on.
    pub fn replace_found(&mut self, replace_with: &str) {
        self.grouped(|ed| {
            if !ed.has_selection() {
                return;
            }
            let Some(pattern) = ed.find.clone() else {
                return;
            };
            if ed.prefs.find.use_regex {
                let selected = text::lines_to_data(&ed.buffer.selected_text());
                let replaced = pattern.replace_all(&selected, replace_with).into_owned();
                ed.edit_paste_data(&replaced);
            } else {
                ed.edit_paste_data(replace_with);
            }
        });
    }

    /// Run a `/find/replace/flags` command over the whole document as one
    /// undoable edit.
    pub fn find_replace(&mut self, command: &str) {
        self.grouped(|ed| {
            if command.is_empty() {
                return;
            }
            let substitution = match Substitution::parse(command) {
                Ok(substitution) => substitution,
                Err(err) => {
                    warn!(%err, command, "substitution rejected");
                    let message = match err {
                        SubstituteError::MissingSeparators(_) => StatusMessage::warning(err.to_string()),
                        SubstituteError::Pattern(_) => StatusMessage::error(err.to_string()),
                    };
                    ed.message(message);
                    return;
                }
            };
            let data = ed.buffer.to_data();
            let replaced = substitution.apply(&data);
            ed.apply_document_update(&text::data_to_lines(&replaced));
            ed.settle();
        });
    }

    /// Rewrite the row array to `new_lines` as a single line diff.
    pub(super) fn apply_document_update(&mut self, new_lines: &[String]) {
        let ops = line_diff::diff_lines(self.buffer.lines(), new_lines);
        if line_diff::is_unchanged(&ops) {
            self.message(StatusMessage::info("No matches found"));
            return;
        }
        let old = self.buffer.lines();
        let pen = clamp_to_both(self.buffer.pen, old, new_lines);
        let marker = clamp_to_both(self.buffer.marker, old, new_lines);
        let mode = self.buffer.mode;
        self.move_and_mark(MoveDelta::between(&self.buffer, pen, marker, mode));
        debug!(ops = ops.len(), rows = new_lines.len(), "applying line diff");
        self.apply(Change::LineDiff(ops));
    }

    // Bookmarks.

    fn bookmark_rows(&self) -> RangeInclusive<usize> {
        self.buffer.selected_row_range()
    }

    /// Bookmark the selected rows, replacing any bookmark they overlap.
    pub fn bookmark_add(&mut self) {
        let rows = self.bookmark_rows();
        let data = BookmarkData {
            pen: self.buffer.pen,
            marker: self.buffer.marker,
            mode: self.buffer.mode,
        };
        self.bookmarks.add(Bookmark::new(*rows.start(), *rows.end(), data));
    }

    /// Remove bookmarks overlapping the selected rows.
    pub fn bookmark_remove(&mut self) -> bool {
        let rows = self.bookmark_rows();
        self.bookmarks.remove_overlapping(*rows.start(), *rows.end())
    }

    pub fn bookmark_next(&mut self) {
        let row = *self.bookmark_rows().end();
        match self.bookmarks.next_after(row).cloned() {
            Some(bookmark) => self.bookmark_goto(&bookmark),
            None => self.message(StatusMessage::info("No bookmarks to jump to")),
        }
    }

    pub fn bookmark_prior(&mut self) {
        let row = *self.bookmark_rows().start();
        match self.bookmarks.prior_before(row).cloned() {
            Some(bookmark) => self.bookmark_goto(&bookmark),
            None => self.message(StatusMessage::info("No bookmarks to jump to")),
        }
    }

    /// Restore the cursor state stored in `bookmark` and bring it into view.
    pub fn bookmark_goto(&mut self, bookmark: &Bookmark) {
        let data = bookmark.data;
        let pen = self.buffer.clamp(data.pen);
        let marker = self.buffer.clamp(data.marker);
        self.move_and_mark(MoveDelta::between(&self.buffer, pen, marker, data.mode));
        let (upper, lower) = self.buffer.start_and_end();
        self.scroll_to_optimal(upper, lower);
        self.settle();
    }

    // Saving.

    /// Record the current state as saved.
    pub fn mark_saved(&mut self) {
        self.log.mark_saved();
    }

    /// Write the rows to `path`.
    ///
    /// On failure the document keeps its unsaved state and the reason goes
    /// to the status line.
    pub fn file_write(&mut self, path: &Path) {
        match storage::write_lines(path, self.buffer.lines()) {
            Ok(()) => {
                self.log.mark_saved();
                info!(path = %path.display(), rows = self.buffer.row_count(), "file saved");
                self.message(StatusMessage::info("File saved"));
            }
            Err(err) => {
                warn!(%err, "save failed");
                self.message(StatusMessage::error(err.to_string()));
            }
        }
    }
}

/// Where `pos` ends up once `upper..lower` is removed.
fn shift_past(pos: Position, upper: Position, lower: Position) -> Position {
    if pos <= upper {
        pos
    } else if pos < lower {
        upper
    } else if pos.row == lower.row {
        Position::new(upper.row, upper.col + pos.col - lower.col)
    } else {
        Position::new(pos.row - (lower.row - upper.row), pos.col)
    }
}

/// Clamp `pos` so it is valid in both row arrays.
fn clamp_to_both(pos: Position, old: &[String], new: &[String]) -> Position {
    let last = old.len().min(new.len()).saturating_sub(1);
    let row = pos.row.min(last);
    let width = |lines: &[String]| lines.get(row).map_or(0, |l| text::width(l));
    Position::new(row, pos.col.min(width(old)).min(width(new)))
}

/// Contiguous runs of rows flagged in `indented`.
fn indented_runs(rows: &RangeInclusive<usize>, indented: &[bool]) -> Vec<RangeInclusive<usize>> {
    let mut runs = Vec::new();
    let mut begin = None;
    for (offset, &flag) in indented.iter().enumerate() {
        let row = rows.start() + offset;
        match (flag, begin) {
            (true, None) => begin = Some(row),
            (false, Some(start)) => {
                runs.push(start..=row - 1);
                begin = None;
            }
            _ => {}
        }
    }
    if let Some(start) = begin {
        runs.push(start..=*rows.end());
    }
    runs
}

const fn closing_mate(ch: char) -> Option<char> {
    match ch {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        '\'' => Some('\''),
        '"' => Some('"'),
        _ => None,
    }
}

const fn is_closer(ch: char) -> bool {
    matches!(ch, ')' | ']' | '}' | '\'' | '"')
}
