//! Skill file parsing and serialization.
//!
//! [`SkillParser`] turns a Markdown file with optional YAML front-matter into
//! a [`Skill`]; [`SkillSerializer`] turns it back into bytes. For a parsed
//! skill whose recognized fields were not touched, the round trip is
//! byte-identical: the original front-matter block is re-emitted verbatim.

pub mod frontmatter;
pub mod serializer;

use std::path::{Component, Path};

use chrono::{DateTime, Utc};

use crate::core::{FrontBlock, LineEnding, Platform, Scope, Skill};
use crate::error::{Result, SkillsyncError};

pub use serializer::SkillSerializer;

/// File name of the primary document in a directory-layout skill.
pub const SKILL_FILE: &str = "SKILL.md";

pub struct SkillParser;

impl SkillParser {
    /// Read and parse one skill file.
    pub fn parse_file(path: &Path, platform: Platform, scope: Scope) -> Result<Skill> {
        if !has_markdown_extension(path) {
            return Err(SkillsyncError::NotASkill {
                path: path.to_path_buf(),
                reason: "not a markdown file".to_string(),
            });
        }

        let bytes = std::fs::read(path).map_err(|err| SkillsyncError::io(path, err))?;
        let text = String::from_utf8(bytes).map_err(|err| SkillsyncError::Parse {
            path: path.to_path_buf(),
            line: 1,
            message: format!("file is not valid UTF-8: {err}"),
        })?;

        let modified_at = std::fs::metadata(path)
            .and_then(|meta| meta.modified())
            .map(DateTime::<Utc>::from)
            .map_err(|err| SkillsyncError::io(path, err))?;

        Self::parse_str(&text, path, platform, scope, modified_at)
    }

    /// Parse skill text as if it had been read from `path`.
    pub fn parse_str(
        text: &str,
        path: &Path,
        platform: Platform,
        scope: Scope,
        modified_at: DateTime<Utc>,
    ) -> Result<Skill> {
        if text.trim().is_empty() {
            return Err(SkillsyncError::NotASkill {
                path: path.to_path_buf(),
                reason: "file is empty".to_string(),
            });
        }

        let doc = frontmatter::split(text, path)?;
        if doc.body.trim().is_empty() {
            return Err(SkillsyncError::NotASkill {
                path: path.to_path_buf(),
                reason: "skill body is empty".to_string(),
            });
        }

        let decoded = frontmatter::decode(doc.yaml, path)?;
        let name = decoded
            .name
            .clone()
            .or_else(|| name_from_path(path))
            .ok_or_else(|| SkillsyncError::NotASkill {
                path: path.to_path_buf(),
                reason: "cannot derive a skill name from the path".to_string(),
            })?;
        if !is_safe_skill_name(&name) {
            return Err(SkillsyncError::NotASkill {
                path: path.to_path_buf(),
                reason: format!("unsafe skill name '{name}'"),
            });
        }

        let front = doc.block.map(|raw| FrontBlock {
            raw: raw.to_string(),
            declared_name: decoded.name.clone(),
            description: decoded.description.clone(),
            tools: decoded.tools.clone(),
            raw_front: decoded.extra.clone(),
        });

        Ok(Skill {
            name,
            platform,
            scope,
            path: path.to_path_buf(),
            description: decoded.description,
            tools: decoded.tools,
            content: doc.body.to_string(),
            modified_at,
            raw_front: decoded.extra,
            declared_name: decoded.name,
            line_ending: LineEnding::detect(text),
            front,
        })
    }
}

/// `alpha/SKILL.md` → `alpha`; `alpha.md` → `alpha`.
#[must_use]
pub fn name_from_path(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    if file_name.eq_ignore_ascii_case(SKILL_FILE) {
        return path
            .parent()?
            .file_name()?
            .to_str()
            .map(str::to_string);
    }
    path.file_stem()?.to_str().map(str::to_string)
}

/// A skill name must be a single plain path component so that
/// `root.join(name)` never leaves `root`.
#[must_use]
pub fn is_safe_skill_name(name: &str) -> bool {
    if name.trim().is_empty() || name.contains(['/', '\\', '\0']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// True for the primary document of a directory-layout skill.
#[must_use]
pub fn is_skill_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.eq_ignore_ascii_case(SKILL_FILE))
}

#[must_use]
pub fn has_markdown_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}
