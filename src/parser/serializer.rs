use serde_yaml::{Mapping, Value};

use super::frontmatter::DELIMITER;
use crate::core::Skill;
use crate::error::{Result, SkillsyncError};

/// Renders a [`Skill`] back to file text.
pub struct SkillSerializer;

impl SkillSerializer {
    /// Render `skill` to the exact text that should land on disk.
    ///
    /// Unchanged front-matter is emitted verbatim. Edited front-matter is
    /// re-rendered with `name`, `description`, `tools` first and preserved
    /// keys after, in their original order.
    pub fn to_string(skill: &Skill) -> Result<String> {
        if skill.front_unchanged() {
            if let Some(front) = &skill.front {
                return Ok(format!("{}{}", front.raw, skill.content));
            }
        }

        if !skill.has_front_matter() {
            if starts_with_delimiter(&skill.content) {
                // Keep a body that opens with `---` from being read as front-matter.
                let eol = skill.line_ending.as_str();
                return Ok(format!("{DELIMITER}{eol}{DELIMITER}{eol}{}", skill.content));
            }
            return Ok(skill.content.clone());
        }

        let front = Self::render_front_matter(skill)?;
        Ok(format!("{front}{}", skill.content))
    }

    pub fn to_bytes(skill: &Skill) -> Result<Vec<u8>> {
        Self::to_string(skill).map(String::into_bytes)
    }

    /// The `---` delimited block for `skill`'s current metadata.
    pub fn render_front_matter(skill: &Skill) -> Result<String> {
        let mut mapping = Mapping::new();
        if let Some(name) = &skill.declared_name {
            mapping.insert(Value::from("name"), Value::from(name.as_str()));
        }
        if !skill.description.is_empty() {
            mapping.insert(
                Value::from("description"),
                Value::from(skill.description.as_str()),
            );
        }
        if !skill.tools.is_empty() {
            mapping.insert(
                Value::from("tools"),
                Value::Sequence(skill.tools.iter().map(|t| Value::from(t.as_str())).collect()),
            );
        }
        for (key, value) in &skill.raw_front {
            if !mapping.contains_key(key) {
                mapping.insert(key.clone(), value.clone());
            }
        }

        let yaml = if mapping.is_empty() {
            String::new()
        } else {
            serde_yaml::to_string(&Value::Mapping(mapping))
                .map_err(|err| SkillsyncError::Serialization(err.to_string()))?
        };

        let block = format!("{DELIMITER}\n{yaml}{DELIMITER}\n");
        Ok(skill.line_ending.apply(&block))
    }
}

fn starts_with_delimiter(content: &str) -> bool {
    content
        .split_inclusive('\n')
        .next()
        .is_some_and(|line| line.trim_end() == DELIMITER)
}
