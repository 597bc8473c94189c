//! Reversible edit log with a replay cursor.
//!
//! Appending runs in two stages. Pure navigation is buffered in a single
//! pending move that only reaches the log when the next edit arrives
//! ([`ChangeLog::redo_add_change`]). Edits of the same kind typed in a row
//! are folded into one entry after they apply ([`Change::merge`]), so an
//! undo step is one burst rather than one keystroke.
//!
//! A verb that makes several edits brackets them with
//! [`ChangeLog::begin_group`] and [`ChangeLog::end_group`]; they land in
//! the log as one [`Change::Group`] and undo together.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::change::{Change, MoveDelta};
use super::selection::Selectable;

/// Ordered log of applied and undone changes.
#[derive(Debug, Clone, Default)]
pub struct ChangeLog {
    entries: Vec<Change>,
    /// Entries before this index are applied.
    redo_index: usize,
    /// Redo index at the last save; `None` once that state is unreachable.
    saved_at: Option<usize>,
    /// Buffered navigation not yet in `entries`.
    navigation: Option<MoveDelta>,
    /// `navigation` has been recorded but not yet applied.
    navigation_pending: bool,
    stall_next_redo: bool,
    /// The last entry was just appended and may fold into its predecessor.
    fresh: bool,
    /// Entries below this index never fold.
    fence: usize,
    /// Nesting depth of open groups.
    group_depth: usize,
    /// Index of the open group's first entry, once it has an edit.
    group_start: Option<usize>,
    /// Navigation from before the open group, already applied.
    group_prior: Option<MoveDelta>,
}

/// Serializable state of a [`ChangeLog`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSnapshot {
    pub entries: Vec<Change>,
    pub redo_index: usize,
    pub saved_at: Option<usize>,
    /// Navigation already reflected in the cursor but not in `entries`.
    pub navigation: Option<MoveDelta>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self {
            saved_at: Some(0),
            ..Self::default()
        }
    }

    pub fn entries(&self) -> &[Change] {
        &self.entries
    }

    pub const fn redo_index(&self) -> usize {
        self.redo_index
    }

    pub const fn saved_at(&self) -> Option<usize> {
        self.saved_at
    }

    pub fn can_undo(&self) -> bool {
        self.redo_index > 0 || (self.navigation.is_some() && !self.navigation_pending)
    }

    pub fn can_redo(&self) -> bool {
        self.redo_index < self.entries.len()
    }

    /// Queue a change. Call [`redo`](Self::redo) to apply it.
    ///
    /// `state` is needed because folding navigation may have to unwind a
    /// buffered move that was already applied.
    pub fn redo_add_change(&mut self, change: Change, state: &mut Selectable) {
        trace!(kind = change.kind(), redo_index = self.redo_index, "add change");
        match change {
            Change::Move(delta) => self.buffer_navigation(delta, state),
            change => self.push_edit(change, state),
        }
    }

    fn buffer_navigation(&mut self, delta: MoveDelta, state: &mut Selectable) {
        let combined = match self.navigation.take() {
            Some(previous) => {
                if !self.navigation_pending {
                    previous.revert(state);
                }
                previous + delta
            }
            None => delta,
        };
        if combined.is_identity() {
            // The net motion is already reflected, so the caller's redo is a no-op.
            self.stall_next_redo = true;
            self.navigation_pending = false;
            return;
        }
        self.navigation = Some(combined);
        self.navigation_pending = true;
    }

    fn push_edit(&mut self, change: Change, state: &mut Selectable) {
        self.stall_next_redo = false;
        self.apply_pending_navigation(state);

        if self.saved_at.is_some_and(|saved| self.redo_index < saved) {
            debug!(redo_index = self.redo_index, "save point discarded");
            self.saved_at = None;
        }
        if self.redo_index < self.entries.len() {
            debug!(
                kept = self.redo_index,
                dropped = self.entries.len() - self.redo_index,
                "truncating redo chain"
            );
            self.entries.truncate(self.redo_index);
        }
        self.fence = self.fence.min(self.redo_index);

        if self.group_depth > 0 {
            if self.group_start.is_none() {
                if let Some(prior) = self.group_prior.take() {
                    self.flush_navigation(prior);
                }
                self.group_start = Some(self.entries.len());
            }
            // Inside a group, moves stay separate steps of the group.
            if let Some(delta) = self.navigation.take() {
                self.push_applied(Change::Move(delta));
            }
            self.entries.push(change);
            return;
        }

        if let Some(delta) = self.navigation.take() {
            self.flush_navigation(delta);
        }
        self.entries.push(change);
        self.fresh = true;
    }

    fn apply_pending_navigation(&mut self, state: &mut Selectable) {
        if self.navigation_pending {
            if let Some(delta) = self.navigation {
                delta.apply(state);
            }
            self.navigation_pending = false;
        }
    }

    /// Append an entry whose effect is already in the state.
    fn push_applied(&mut self, change: Change) {
        self.entries.push(change);
        self.redo_index += 1;
    }

    /// Start collecting the changes of one verb into a single step.
    ///
    /// Groups nest; only the outermost pair has an effect.
    pub fn begin_group(&mut self, state: &mut Selectable) {
        self.group_depth += 1;
        if self.group_depth > 1 {
            return;
        }
        self.apply_pending_navigation(state);
        self.stall_next_redo = false;
        self.group_prior = self.navigation.take();
        self.group_start = None;
    }

    /// Close the group opened by [`begin_group`](Self::begin_group).
    ///
    /// A group holding a single edit stays a plain entry and may fold into
    /// the burst before it. A group without edits leaves its moves as
    /// buffered navigation.
    pub fn end_group(&mut self, state: &mut Selectable) {
        assert!(self.group_depth > 0, "end_group without begin_group");
        self.group_depth -= 1;
        if self.group_depth > 0 {
            return;
        }
        self.apply_pending_navigation(state);
        self.stall_next_redo = false;
        let prior = self.group_prior.take();

        let Some(start) = self.group_start.take() else {
            let combined = match (prior, self.navigation.take()) {
                (Some(before), Some(during)) => Some(before + during),
                (before, during) => before.or(during),
            };
            self.navigation = combined.filter(|delta| !delta.is_identity());
            return;
        };

        if let Some(delta) = self.navigation.take() {
            self.push_applied(Change::Move(delta));
        }
        assert_eq!(self.redo_index, self.entries.len(), "group left changes unapplied");
        if self.entries.len() - start == 1 {
            self.fold_last();
        } else {
            let steps = self.entries.split_off(start);
            trace!(steps = steps.len(), "grouped changes");
            self.entries.push(Change::Group(steps));
            self.redo_index = self.entries.len();
        }
    }

    /// Fold applied navigation into the log.
    fn flush_navigation(&mut self, delta: MoveDelta) {
        let foldable = self.entries.len() > self.fence;
        match self.entries.last_mut() {
            Some(Change::Move(last)) if foldable => {
                let combined = *last + delta;
                if combined.is_identity() {
                    self.entries.pop();
                    self.redo_index -= 1;
                } else {
                    *last = combined;
                }
            }
            _ => self.push_applied(Change::Move(delta)),
        }
    }

    /// Apply the next step.
    ///
    /// Applies queued moves up to and including the next edit, then any
    /// moves that directly follow it.
    pub fn redo(&mut self, state: &mut Selectable) {
        assert!(self.redo_index <= self.entries.len(), "redo index past end of log");
        if self.stall_next_redo {
            self.stall_next_redo = false;
            return;
        }
        if self.navigation_pending {
            if let Some(delta) = self.navigation {
                delta.apply(state);
            }
            self.navigation_pending = false;
            return;
        }
        if let Some(delta) = self.navigation.take() {
            delta.revert(state);
        }

        while self.redo_index < self.entries.len() {
            let change = &self.entries[self.redo_index];
            change.apply(state);
            self.redo_index += 1;
            if !change.is_move() {
                if self.fresh && self.redo_index == self.entries.len() {
                    self.fold_last();
                }
                break;
            }
        }
        while self.entries.get(self.redo_index).is_some_and(Change::is_move) {
            self.entries[self.redo_index].apply(state);
            self.redo_index += 1;
        }
        self.fresh = false;
    }

    fn fold_last(&mut self) {
        let len = self.entries.len();
        if len < 2 || len - 2 < self.fence {
            return;
        }
        if let Some(merged) = self.entries[len - 2].merge(&self.entries[len - 1]) {
            trace!(kind = merged.kind(), "coalesced with previous entry");
            self.entries.truncate(len - 2);
            self.entries.push(merged);
            self.redo_index -= 1;
        }
    }

    /// Revert to before the last edit, including navigation since it.
    pub fn undo(&mut self, state: &mut Selectable) {
        assert!(self.redo_index <= self.entries.len(), "redo index past end of log");
        if let Some(delta) = self.navigation.take() {
            if !self.navigation_pending {
                delta.revert(state);
            }
        }
        self.navigation_pending = false;
        self.stall_next_redo = false;
        self.fresh = false;

        while self.redo_index > 0 {
            self.redo_index -= 1;
            let change = &self.entries[self.redo_index];
            change.revert(state);
            if !change.is_move() {
                break;
            }
        }
        debug!(redo_index = self.redo_index, "undo");
    }

    /// Whether content differs from the last save point.
    ///
    /// A single move entry between the cursor and the save point does not
    /// count; navigation never dirties a document.
    pub fn is_dirty(&self) -> bool {
        let Some(saved) = self.saved_at else {
            return true;
        };
        let at = self.redo_index;
        let clean = saved == at
            || (at + 1 == saved && self.entries.get(at).is_some_and(Change::is_move))
            || (saved + 1 == at && self.entries.get(saved).is_some_and(Change::is_move));
        !clean
    }

    /// Record the current state as saved.
    ///
    /// Later edits never fold into entries made before the save.
    pub fn mark_saved(&mut self) {
        self.saved_at = Some(self.redo_index);
        self.fence = self.redo_index;
    }

    pub fn snapshot(&self) -> LogSnapshot {
        LogSnapshot {
            entries: self.entries.clone(),
            redo_index: self.redo_index,
            saved_at: self.saved_at,
            navigation: self.navigation.filter(|_| !self.navigation_pending),
        }
    }

    /// Rebuild a log from a snapshot taken against the same document state.
    pub fn from_snapshot(snapshot: LogSnapshot) -> Self {
        let redo_index = snapshot.redo_index.min(snapshot.entries.len());
        Self {
            entries: snapshot.entries,
            redo_index,
            saved_at: snapshot.saved_at,
            navigation: snapshot.navigation,
            navigation_pending: false,
            stall_next_redo: false,
            fresh: false,
            fence: redo_index,
            group_depth: 0,
            group_start: None,
            group_prior: None,
        }
    }
}
