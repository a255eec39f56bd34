//! Error types for the renamer

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a rename run.
///
/// Per-file skips are not errors; see [`crate::rules::Skip`].
#[derive(Error, Debug)]
pub enum RenameError {
    /// Caller supplied an unusable combination of arguments
    #[error("{0}")]
    Usage(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Config error: {0}")]
    Config(String),

    /// The next counter value does not fit in an `i64`
    #[error("Counter overflow: {value} + {increment}")]
    CounterOverflow { value: i64, increment: i64 },

    #[error("Failed to list directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to rename {} to {}: {source}", from.display(), to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not determine current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
}

impl RenameError {
    /// Whether this error was caused by the caller's configuration rather
    /// than by the filesystem
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            RenameError::Usage(_)
                | RenameError::Pattern(_)
                | RenameError::Config(_)
                | RenameError::CounterOverflow { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RenameError>;
