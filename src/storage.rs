//! Reading and writing a document's rows on disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::editor::text;

/// Why a save did not complete.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Permission error. Try saving to another file: {}", path.display())]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error writing file. The file did not save properly: {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Load a file as rows. A missing file is an empty document.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    match fs::read(path) {
        Ok(bytes) => {
            let data = String::from_utf8_lossy(&bytes);
            Ok(text::data_to_lines(&data))
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(vec![String::new()]),
        Err(err) => Err(err).with_context(|| format!("Failed to read {}", path.display())),
    }
}

/// Write rows joined with `\n`.
pub fn write_lines(path: &Path, lines: &[String]) -> Result<(), SaveError> {
    fs::write(path, text::lines_to_data(lines)).map_err(|source| {
        let path = path.to_path_buf();
        if source.kind() == io::ErrorKind::PermissionDenied {
            SaveError::PermissionDenied { path, source }
        } else {
            SaveError::Write { path, source }
        }
    })
}
