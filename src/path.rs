//! Path decomposition helpers

use std::path::{Path, PathBuf};

/// The pieces of an input path the naming rules work with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParts {
    /// Containing directory as given (empty for a bare file name)
    pub dir: PathBuf,

    /// File name including extension
    pub file_name: String,

    /// Last segment of `dir`, or `None` when there is no directory component
    pub parent_name: Option<String>,
}

impl PathParts {
    /// Split a path into directory, file name and parent directory name.
    ///
    /// Returns `None` when the file name is missing or not valid UTF-8.
    pub fn new(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?.to_string();
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let parent_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty());

        Some(Self {
            dir,
            file_name,
            parent_name,
        })
    }

    /// Join a new file name onto the original containing directory
    pub fn with_file_name(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

/// Split a file name into `(stem, extension)`, the extension keeping its dot.
///
/// The extension starts at the last dot, unless everything before that dot
/// is itself dots: `.bashrc` has no extension, `a.tar.gz` has `.gz`.
pub fn split_ext(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if name[..idx].chars().any(|c| c != '.') => name.split_at(idx),
        _ => (name, ""),
    }
}

/// Check whether two paths refer to the same underlying file.
///
/// Compares device and inode, so a case-only rename on a case-insensitive
/// filesystem is not mistaken for a collision.
#[cfg(unix)]
pub fn same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (std::fs::metadata(a), std::fs::metadata(b)) {
        (Ok(ma), Ok(mb)) => ma.dev() == mb.dev() && ma.ino() == mb.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
pub fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(ca), Ok(cb)) => ca == cb,
        _ => false,
    }
}

/// Whether anything at all exists at `path`, including a dangling symlink
pub fn entry_exists(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}
