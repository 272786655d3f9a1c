//! Git utilities

use std::path::{Path, PathBuf};

/// Check if directory is a git repository root
pub fn is_repo(path: impl AsRef<Path>) -> bool {
    path.as_ref().join(".git").exists()
}

/// Nearest ancestor of `start` (inclusive) containing a `.git` entry.
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    start.ancestors().find(|dir| is_repo(dir)).map(Path::to_path_buf)
}
