//! Error types for skillsync.
//!
//! Every failure carries a stable [`ErrorKind`] tag. Message text is not
//! stable; callers match on the kind.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::Scope;

pub type Result<T> = std::result::Result<T, SkillsyncError>;

#[derive(Error, Debug)]
pub enum SkillsyncError {
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error in {} at line {line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("not a skill: {} ({reason})", path.display())]
    NotASkill { path: PathBuf, reason: String },

    #[error("scope '{scope}' is read-only; refusing to {operation}")]
    ScopeViolation { scope: Scope, operation: String },

    #[error("unresolved conflicts: {}", skills.join(", "))]
    Conflict { skills: Vec<String> },

    #[error("operation cancelled after {completed} completed entries")]
    Cancelled { completed: usize },

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("skill not found: {0}")]
    SkillNotFound(String),

    #[error("backup not found: {0}")]
    BackupNotFound(String),

    #[error("backup {id} failed checksum verification")]
    BackupCorrupt { id: String },

    #[error("usage error: {0}")]
    Usage(String),
}

/// Stable tag for each error family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ErrorKind {
    #[serde(rename = "IOError")]
    Io,
    #[serde(rename = "ParseError")]
    Parse,
    NotASkill,
    ScopeViolation,
    Conflict,
    Cancelled,
    InvariantViolation,
    #[serde(rename = "ConfigError")]
    Config,
    #[serde(rename = "UsageError")]
    Usage,
    NotFound,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Io => "IOError",
            Self::Parse => "ParseError",
            Self::NotASkill => "NotASkill",
            Self::ScopeViolation => "ScopeViolation",
            Self::Conflict => "Conflict",
            Self::Cancelled => "Cancelled",
            Self::InvariantViolation => "InvariantViolation",
            Self::Config => "ConfigError",
            Self::Usage => "UsageError",
            Self::NotFound => "NotFound",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SkillsyncError {
    /// Wrap an `std::io::Error` with the path it happened at.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } | Self::BackupCorrupt { .. } => ErrorKind::Io,
            Self::Parse { .. } | Self::Serialization(_) => ErrorKind::Parse,
            Self::NotASkill { .. } => ErrorKind::NotASkill,
            Self::ScopeViolation { .. } => ErrorKind::ScopeViolation,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::InvariantViolation(_) => ErrorKind::InvariantViolation,
            Self::Config(_) => ErrorKind::Config,
            Self::Usage(_) => ErrorKind::Usage,
            Self::SkillNotFound(_) | Self::BackupNotFound(_) => ErrorKind::NotFound,
        }
    }

    /// Errors that abort the surrounding operation instead of being
    /// collected per file or per entry.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::ScopeViolation | ErrorKind::Cancelled | ErrorKind::InvariantViolation
        )
    }

    /// Process exit code the CLI uses when this error ends a command.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self.kind() {
            ErrorKind::Usage | ErrorKind::Config => 2,
            ErrorKind::Conflict => 4,
            ErrorKind::Cancelled => 1,
            _ => 3,
        }
    }
}
