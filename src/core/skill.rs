//! The skill value type.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;

use super::{Platform, Scope};

/// Line terminator style detected in a skill file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// Detect from the first line break in `text`.
    #[must_use]
    pub fn detect(text: &str) -> Self {
        match text.find('\n') {
            Some(idx) if idx > 0 && text.as_bytes()[idx - 1] == b'\r' => Self::CrLf,
            _ => Self::Lf,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }

    /// Rewrite `text` (assumed LF-normalized) with this terminator.
    #[must_use]
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::Lf => text.to_string(),
            Self::CrLf => text.replace('\n', "\r\n"),
        }
    }
}

/// Normalize CRLF and lone CR line breaks to LF.
#[must_use]
pub fn normalize_line_endings(text: &str) -> String {
    if text.contains('\r') {
        text.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        text.to_string()
    }
}

/// The front-matter block exactly as it was read, plus the recognized
/// values it decoded to. Used to re-emit unchanged front-matter verbatim.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrontBlock {
    /// Opening delimiter through closing delimiter line, terminators included.
    pub raw: String,
    pub declared_name: Option<String>,
    pub description: String,
    pub tools: Vec<String>,
    pub raw_front: Mapping,
}

/// Canonical identity of a skill: `platform:scope:name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SkillKey {
    pub platform: Platform,
    pub scope: Scope,
    pub name: String,
}

impl fmt::Display for SkillKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.platform, self.scope, self.name)
    }
}

/// A skill document discovered on one platform in one scope.
///
/// Skills are values: the `with_*` helpers return modified copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub platform: Platform,
    pub scope: Scope,
    pub path: PathBuf,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tools: Vec<String>,
    pub content: String,
    pub modified_at: DateTime<Utc>,
    /// Unrecognized front-matter keys, preserved in file order.
    #[serde(default)]
    pub raw_front: Mapping,
    /// `name:` from front-matter, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_name: Option<String>,
    #[serde(default)]
    pub line_ending: LineEnding,
    #[serde(skip)]
    pub(crate) front: Option<FrontBlock>,
}

impl Skill {
    /// Build a skill with no front-matter.
    pub fn new(
        name: impl Into<String>,
        platform: Platform,
        scope: Scope,
        path: impl Into<PathBuf>,
        content: impl Into<String>,
    ) -> Self {
        let content = content.into();
        Self {
            name: name.into(),
            platform,
            scope,
            path: path.into(),
            description: String::new(),
            tools: Vec::new(),
            line_ending: LineEnding::detect(&content),
            content,
            modified_at: Utc::now(),
            raw_front: Mapping::new(),
            declared_name: None,
            front: None,
        }
    }

    #[must_use]
    pub fn key(&self) -> SkillKey {
        SkillKey {
            platform: self.platform,
            scope: self.scope,
            name: self.name.clone(),
        }
    }

    /// `platform:scope:name`
    #[must_use]
    pub fn skill_key(&self) -> String {
        self.key().to_string()
    }

    #[must_use]
    pub const fn display_scope(&self) -> &'static str {
        self.scope.label()
    }

    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.scope.is_writable()
    }

    /// Body with line endings normalized to LF.
    #[must_use]
    pub fn normalized_content(&self) -> String {
        normalize_line_endings(&self.content)
    }

    /// True when the front-matter block read from disk (if any) still
    /// describes this skill's recognized fields.
    #[must_use]
    pub fn front_unchanged(&self) -> bool {
        self.front.as_ref().is_some_and(|front| {
            front.description == self.description
                && front.tools == self.tools
                && front.raw_front == self.raw_front
                && front.declared_name == self.declared_name
        })
    }

    #[must_use]
    pub fn has_front_matter(&self) -> bool {
        self.front.is_some()
            || !self.description.is_empty()
            || !self.tools.is_empty()
            || !self.raw_front.is_empty()
            || self.declared_name.is_some()
    }

    /// Same document on all recognized fields, ignoring location and mtime.
    #[must_use]
    pub fn same_document(&self, other: &Self) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.tools == other.tools
            && self.content == other.content
            && self.raw_front == other.raw_front
    }

    /// True when recognized front-matter fields differ.
    #[must_use]
    pub fn metadata_differs(&self, other: &Self) -> bool {
        self.description != other.description || self.tools != other.tools
    }

    #[must_use]
    pub fn with_scope(&self, scope: Scope) -> Self {
        Self {
            scope,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_platform(&self, platform: Platform) -> Self {
        Self {
            platform,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_path(&self, path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_description(&self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_tools<I, S>(&self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tools: dedupe_tools(tools.into_iter().map(Into::into)),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_modified_at(&self, modified_at: DateTime<Utc>) -> Self {
        Self {
            modified_at,
            ..self.clone()
        }
    }
}

/// Order-preserving, duplicate-free, blank-free tool list.
pub fn dedupe_tools(tools: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tool in tools {
        let tool = tool.trim().to_string();
        if !tool.is_empty() && !out.contains(&tool) {
            out.push(tool);
        }
    }
    out
}

/// Case-insensitive sort key; exact name breaks ties so the order is total.
#[must_use]
pub fn name_sort_key(name: &str) -> (String, String) {
    (name.to_lowercase(), name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_key_format() {
        let skill = Skill::new("alpha", Platform::ClaudeCode, Scope::Repo, "/x", "A");
        assert_eq!(skill.skill_key(), "claude-code:repo:alpha");
        assert_eq!(skill.display_scope(), "Repository");
    }

    #[test]
    fn with_helpers_return_new_values() {
        let skill = Skill::new("alpha", Platform::Codex, Scope::User, "/x", "A");
        let moved = skill.with_scope(Scope::Repo).with_platform(Platform::Cursor);
        assert_eq!(skill.scope, Scope::User);
        assert_eq!(moved.scope, Scope::Repo);
        assert_eq!(moved.platform, Platform::Cursor);
        assert!(skill.same_document(&moved));
    }

    #[test]
    fn tools_are_deduplicated_in_order() {
        let skill = Skill::new("a", Platform::Codex, Scope::User, "/x", "A")
            .with_tools(["Read", "Write", "Read", " ", "Bash"]);
        assert_eq!(skill.tools, vec!["Read", "Write", "Bash"]);
    }

    #[test]
    fn line_ending_detection() {
        assert_eq!(LineEnding::detect("a\r\nb"), LineEnding::CrLf);
        assert_eq!(LineEnding::detect("a\nb"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("single"), LineEnding::Lf);
        assert_eq!(normalize_line_endings("a\r\nb\rc"), "a\nb\nc");
    }
}
