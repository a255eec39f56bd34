//! Argument expansion
//!
//! Turns a mixed list of files and directories into a flat sequence of
//! files. Directories are expanded one level deep, lazily, at the position
//! they occupied in the argument list.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{RenameError, Result};

/// Work queue of pending arguments.
///
/// Directories are only listed when they reach the front of the queue, and
/// the running total is adjusted at that moment: minus one for the
/// directory, plus one per file it contributed.
#[derive(Debug)]
pub struct ArgQueue {
    pending: VecDeque<PathBuf>,
    top_level: usize,
    total: usize,
}

impl ArgQueue {
    /// Create a queue from top-level arguments
    pub fn new<I, P>(args: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let pending: VecDeque<PathBuf> = args.into_iter().map(Into::into).collect();
        let top_level = pending.len();
        Self {
            pending,
            top_level,
            total: top_level,
        }
    }

    /// Number of arguments originally supplied, before any expansion
    pub fn top_level(&self) -> usize {
        self.top_level
    }

    /// Running argument count, adjusted for each directory expanded so far
    pub fn total(&self) -> usize {
        self.total
    }

    /// Pop the next file, expanding any directories encountered on the way
    pub fn next_file(&mut self) -> Result<Option<PathBuf>> {
        while let Some(path) = self.pending.pop_front() {
            if !path.is_dir() {
                return Ok(Some(path));
            }

            self.total -= 1;
            let files = list_files(&path)?;
            if files.is_empty() {
                debug!("Skipped directory (no files): {}", path.display());
                continue;
            }

            debug!(
                "Including directory: {} (contains {} file(s))",
                path.display(),
                files.len()
            );
            self.total += files.len();
            for file in files.into_iter().rev() {
                self.pending.push_front(file);
            }
        }

        Ok(None)
    }
}

/// List the visible regular files directly inside `dir`, sorted by name
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let read_err = |source| RenameError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
