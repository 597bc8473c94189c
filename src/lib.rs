// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. editor::EditorPrefs)
    clippy::module_name_repetitions
)]

//! # Penmark
//!
//! The editing engine beneath a terminal text editor.
//!
//! Penmark owns a document's rows together with its pen (cursor), marker
//! and selection mode, and records every edit in a reversible change log:
//! - Six selection modes (None, All, Block, Character, Line, Word)
//! - Undo/redo with typing bursts coalesced into single steps
//! - Find, regex substitution and bookmarks
//! - Sessions that survive restarts, undo history included
//!
//! ## Architecture
//!
//! Hosts drive an [`editor::Editor`] through verbs (`insert`, `backspace`,
//! `cursor_down`, `undo`, ...). Every verb turns into [`editor::Change`]
//! records applied through the [`editor::ChangeLog`]; nothing else mutates
//! the rows. The host supplies scroll state and a status line through the
//! [`editor::ViewPort`] and [`editor::MessageSink`] traits.
//!
//! ## Modules
//!
//! - [`editor`]: Selection model, change log and action layer
//! - [`config`]: Preferences from flag files and the command line
//! - [`history`]: Per-file session persistence
//! - [`storage`]: Reading and writing documents

pub mod config;
pub mod editor;
pub mod history;
pub mod storage;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::editor::{
        ChangeLog, Editor, EditorPrefs, Position, Selectable, SelectionMode, StatusMessage,
        Viewport,
    };
}
