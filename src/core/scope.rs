//! Scope tiers and their precedence.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SkillsyncError;

/// The tier a skill was discovered in.
///
/// Variants are declared from highest to lowest precedence, and `Ord`
/// follows precedence: `Scope::Repo < Scope::User` means repo wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Repo,
    User,
    Plugin,
    System,
    Admin,
    Builtin,
}

impl Scope {
    /// All scopes, highest precedence first.
    pub const ALL: [Self; 6] = [
        Self::Repo,
        Self::User,
        Self::Plugin,
        Self::System,
        Self::Admin,
        Self::Builtin,
    ];

    /// Rank within the precedence order; 0 is the highest.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Repo => 0,
            Self::User => 1,
            Self::Plugin => 2,
            Self::System => 3,
            Self::Admin => 4,
            Self::Builtin => 5,
        }
    }

    #[must_use]
    pub const fn is_writable(self) -> bool {
        matches!(self, Self::Repo | Self::User)
    }

    /// True when `self` shadows `other` for the same skill name.
    #[must_use]
    pub const fn outranks(self, other: Self) -> bool {
        self.precedence() < other.precedence()
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Repo => "repo",
            Self::User => "user",
            Self::Plugin => "plugin",
            Self::System => "system",
            Self::Admin => "admin",
            Self::Builtin => "builtin",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Repo => "Repository",
            Self::User => "User",
            Self::Plugin => "Plugin",
            Self::System => "System",
            Self::Admin => "Admin",
            Self::Builtin => "Built-in",
        }
    }
}

impl PartialOrd for Scope {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scope {
    fn cmp(&self, other: &Self) -> Ordering {
        self.precedence().cmp(&other.precedence())
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = SkillsyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "repo" | "project" => Ok(Self::Repo),
            "user" | "global" => Ok(Self::User),
            "plugin" => Ok(Self::Plugin),
            "system" => Ok(Self::System),
            "admin" => Ok(Self::Admin),
            "builtin" | "built-in" => Ok(Self::Builtin),
            other => Err(SkillsyncError::Usage(format!(
                "unknown scope '{other}' (expected repo|user|plugin|system|admin|builtin)"
            ))),
        }
    }
}
