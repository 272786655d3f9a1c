//! Filesystem utilities.
//!
//! Helper functions for file operations.

use std::io::Write;
use std::path::{Component, Path, PathBuf};

use tempfile::Builder;
use walkdir::WalkDir;

use crate::error::{Result, SkillsyncError};

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.is_dir() {
        std::fs::create_dir_all(path).map_err(|err| SkillsyncError::io(path, err))?;
    }
    Ok(())
}

/// Read a file, returning None if it doesn't exist.
pub fn read_optional(path: impl AsRef<Path>) -> Result<Option<Vec<u8>>> {
    let path = path.as_ref();
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(SkillsyncError::io(path, err)),
    }
}

/// Write `bytes` to a sibling temp file and rename it onto `path`.
///
/// Readers of `path` see either the old file or the complete new one. On
/// any failure the temp file is removed and `path` is untouched.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    ensure_dir(parent)?;

    let mut temp = Builder::new()
        .prefix(".skillsync-")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|err| SkillsyncError::io(parent, err))?;
    temp.write_all(bytes)
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|err| SkillsyncError::io(temp.path(), err))?;
    temp.persist(path)
        .map_err(|err| SkillsyncError::io(path, err.error))?;
    Ok(())
}

/// Expand `~`, `~/...` and relative paths against `home` and `base`.
#[must_use]
pub fn expand_path(raw: &str, home: Option<&Path>, base: &Path) -> PathBuf {
    let trimmed = raw.trim();
    let expanded = if trimmed == "~" {
        home.map_or_else(|| PathBuf::from(trimmed), Path::to_path_buf)
    } else if let Some(rest) = trimmed.strip_prefix("~/") {
        home.map_or_else(|| PathBuf::from(trimmed), |h| h.join(rest))
    } else {
        PathBuf::from(trimmed)
    };

    let joined = if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    };
    normalize_lexically(&joined)
}

/// Resolve `.` and `..` components without touching the filesystem.
#[must_use]
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component.as_os_str());
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Walk up from `start` looking for a directory entry called `name`.
#[must_use]
pub fn find_upwards(start: &Path, name: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.exists())
}

/// Recursively copy `from` into `to`, creating directories as needed.
pub fn copy_dir(from: &Path, to: &Path) -> Result<u64> {
    let mut copied = 0;
    for entry in WalkDir::new(from).follow_links(false) {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(from).to_path_buf();
            SkillsyncError::io(&path, std::io::Error::other(err.to_string()))
        })?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|err| SkillsyncError::InvariantViolation(err.to_string()))?;
        let dest = to.join(relative);
        if entry.file_type().is_dir() {
            ensure_dir(&dest)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = dest.parent() {
                ensure_dir(parent)?;
            }
            copied += std::fs::copy(entry.path(), &dest)
                .map_err(|err| SkillsyncError::io(entry.path(), err))?;
        }
    }
    Ok(copied)
}
