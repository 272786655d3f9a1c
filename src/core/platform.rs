//! Supported skill platforms.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SkillsyncError;

/// On-disk shape a platform uses when a new skill is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillLayout {
    /// `<root>/<name>/SKILL.md`
    Directory,
    /// `<root>/<name>.md`
    SingleFile,
}

/// AI-assistant ecosystems that read skills from a known directory layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "claude-code")]
    ClaudeCode,
    #[serde(rename = "cursor")]
    Cursor,
    #[serde(rename = "codex")]
    Codex,
}

impl Platform {
    pub const ALL: [Self; 3] = [Self::ClaudeCode, Self::Cursor, Self::Codex];

    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::ClaudeCode => "claude-code",
            Self::Cursor => "cursor",
            Self::Codex => "codex",
        }
    }

    /// Short display code, at most three characters.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ClaudeCode => "CC",
            Self::Cursor => "CU",
            Self::Codex => "CX",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::ClaudeCode => "Claude Code",
            Self::Cursor => "Cursor",
            Self::Codex => "Codex",
        }
    }

    /// Configuration directory name, e.g. `.claude`.
    #[must_use]
    pub const fn config_dir(self) -> &'static str {
        match self {
            Self::ClaudeCode => ".claude",
            Self::Cursor => ".cursor",
            Self::Codex => ".codex",
        }
    }

    #[must_use]
    pub const fn layout(self) -> SkillLayout {
        match self {
            Self::ClaudeCode | Self::Codex => SkillLayout::Directory,
            Self::Cursor => SkillLayout::SingleFile,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Platform {
    type Err = SkillsyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "claude-code" | "claude" | "claudecode" | "cc" => Ok(Self::ClaudeCode),
            "cursor" | "cu" => Ok(Self::Cursor),
            "codex" | "cx" => Ok(Self::Codex),
            other => Err(SkillsyncError::Usage(format!(
                "unknown platform '{other}' (expected claude-code|cursor|codex)"
            ))),
        }
    }
}
