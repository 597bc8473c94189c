//! Per-file editing sessions kept between runs.
//!
//! A session stores the cursor, selection mode, bookmarks and (when the
//! document was saved) the change log, keyed by the file's absolute path.
//! A checksum of the saved content guards the log: if the file changed
//! behind our back the log no longer describes it and is dropped.

use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::editor::{
    Bookmarks, ChangeLog, Editor, LogSnapshot, MessageSink, Position, SelectionMode, ViewPort,
    text,
};

/// Everything restored when a file is reopened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub checksum: u64,
    pub pen: Position,
    pub marker: Position,
    pub mode: SelectionMode,
    pub bookmarks: Bookmarks,
    pub log: Option<LogSnapshot>,
}

impl Session {
    /// Capture the editor's state. Unsaved changes mean the file on disk
    /// does not match the log, so the log is left out.
    pub fn capture<V: ViewPort, M: MessageSink>(editor: &Editor<V, M>) -> Self {
        let log = (!editor.is_dirty()).then(|| editor.log().snapshot());
        Self {
            checksum: checksum(editor.lines()),
            pen: editor.pen(),
            marker: editor.marker(),
            mode: editor.mode(),
            bookmarks: editor.bookmarks().clone(),
            log,
        }
    }

    /// Install this session into a freshly loaded editor.
    pub fn restore_into<V: ViewPort, M: MessageSink>(self, editor: &mut Editor<V, M>) {
        let log = if self.checksum == checksum(editor.lines()) {
            self.log.map(ChangeLog::from_snapshot)
        } else {
            if self.log.is_some() {
                warn!("file changed since last session; undo history discarded");
            }
            None
        };
        info!(
            row = self.pen.row,
            col = self.pen.col,
            bookmarks = self.bookmarks.len(),
            has_log = log.is_some(),
            "session restored"
        );
        editor.restore(self.pen, self.marker, self.mode, self.bookmarks, log);
    }
}

/// All remembered sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    sessions: BTreeMap<String, Session>,
}

impl History {
    /// Load the history file. A missing file is an empty history.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read history {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse history {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create history dir {}", parent.display()))?;
        }
        let json = serde_json::to_string(self).context("Failed to serialize history")?;
        fs::write(path, json).with_context(|| format!("Failed to write history {}", path.display()))
    }

    pub fn get(&self, file: &Path) -> Option<&Session> {
        self.sessions.get(&key(file))
    }

    pub fn set(&mut self, file: &Path, session: Session) {
        self.sessions.insert(key(file), session);
    }

    pub fn remove(&mut self, file: &Path) -> Option<Session> {
        self.sessions.remove(&key(file))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

fn key(file: &Path) -> String {
    let absolute = std::path::absolute(file).unwrap_or_else(|_| PathBuf::from(file));
    absolute.display().to_string()
}

/// Checksum of document content as it is written to disk.
pub fn checksum(lines: &[String]) -> u64 {
    hash_bytes(text::lines_to_data(lines).as_bytes())
}

fn hash_bytes(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}
