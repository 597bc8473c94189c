//! Editing engine: row buffer, selection model, reversible change log and
//! the action layer on top.
//!
//! Every mutation of a document flows through an [`Editor`] verb, which
//! records [`Change`]s in the [`ChangeLog`] so it can be undone and
//! redone. The engine talks to its host only through the [`ViewPort`] and
//! [`MessageSink`] capabilities.

mod actions;
mod bookmarks;
mod change;
mod change_log;
mod find;
pub mod line_diff;
mod motion;
mod ports;
mod selection;
pub mod text;
mod viewport;

pub use actions::{Editor, EditorPrefs};
pub use bookmarks::{Bookmark, BookmarkData, Bookmarks};
pub use change::{Change, LineDiffOp, MoveDelta};
pub use change_log::{ChangeLog, LogSnapshot};
pub use find::{
    Direction, FindOptions, Found, PatternError, SearchPattern, SubstituteError, Substitution,
};
pub use ports::{Grammar, MessageSink, Severity, StatusLine, StatusMessage, ViewPort};
pub use selection::{Position, Selectable, SelectionMode};
pub use viewport::Viewport;
