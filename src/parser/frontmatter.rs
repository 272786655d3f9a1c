//! Front-matter splitting and decoding.

use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::core::dedupe_tools;
use crate::error::{Result, SkillsyncError};

pub const DELIMITER: &str = "---";

/// A document split into its verbatim front-matter block and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitDocument<'a> {
    /// Opening through closing delimiter, line terminators included.
    pub block: Option<&'a str>,
    /// YAML between the delimiters.
    pub yaml: &'a str,
    pub body: &'a str,
}

/// Recognized keys pulled out of the front-matter mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedFront {
    pub name: Option<String>,
    pub description: String,
    pub tools: Vec<String>,
    pub extra: Mapping,
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches(['\n', '\r']).trim_end() == DELIMITER
}

/// Split `text` at its front-matter block.
///
/// Front-matter exists only when the very first line is `---`; it runs to
/// the next `---` line. An unterminated block is a parse error.
pub fn split<'a>(text: &'a str, path: &Path) -> Result<SplitDocument<'a>> {
    let mut lines = text.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok(SplitDocument {
            block: None,
            yaml: "",
            body: text,
        });
    };

    if !is_delimiter(first.trim_start_matches('\u{feff}')) {
        return Ok(SplitDocument {
            block: None,
            yaml: "",
            body: text,
        });
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if is_delimiter(line) {
            let block_end = offset + line.len();
            return Ok(SplitDocument {
                block: Some(&text[..block_end]),
                yaml: &text[yaml_start..offset],
                body: &text[block_end..],
            });
        }
        offset += line.len();
    }

    Err(SkillsyncError::Parse {
        path: path.to_path_buf(),
        line: 1,
        message: "front-matter opened with '---' but never closed".to_string(),
    })
}

/// Decode the YAML of a front-matter block.
pub fn decode(yaml: &str, path: &Path) -> Result<DecodedFront> {
    if yaml.trim().is_empty() {
        return Ok(DecodedFront::default());
    }

    let value: Value = serde_yaml::from_str(yaml).map_err(|err| SkillsyncError::Parse {
        path: path.to_path_buf(),
        // +1 for the opening delimiter line.
        line: err.location().map_or(1, |loc| loc.line() + 1),
        message: err.to_string(),
    })?;

    let mapping = match value {
        Value::Null => return Ok(DecodedFront::default()),
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(parse_error(
                path,
                format!("front-matter must be a mapping, found {}", value_kind(&other)),
            ));
        }
    };

    let mut decoded = DecodedFront::default();
    for (key, value) in mapping {
        match key.as_str() {
            Some("description") => {
                decoded.description = scalar_to_string(&value)
                    .ok_or_else(|| parse_error(path, "description must be a scalar"))?;
            }
            Some("tools") => decoded.tools = decode_tools(&value, path)?,
            Some("name") => {
                let name = scalar_to_string(&value)
                    .ok_or_else(|| parse_error(path, "name must be a scalar"))?;
                let name = name.trim().to_string();
                if !name.is_empty() {
                    decoded.name = Some(name);
                }
            }
            _ => {
                decoded.extra.insert(key, value);
            }
        }
    }
    Ok(decoded)
}

fn decode_tools(value: &Value, path: &Path) -> Result<Vec<String>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(list) => Ok(dedupe_tools(list.split(',').map(str::to_string))),
        Value::Sequence(items) => {
            let mut tools = Vec::with_capacity(items.len());
            for item in items {
                tools.push(
                    scalar_to_string(item)
                        .ok_or_else(|| parse_error(path, "tools entries must be scalars"))?,
                );
            }
            Ok(dedupe_tools(tools))
        }
        other => scalar_to_string(other)
            .map(|tool| dedupe_tools([tool]))
            .ok_or_else(|| parse_error(path, "tools must be a string or a list")),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

fn parse_error(path: &Path, message: impl Into<String>) -> SkillsyncError {
    SkillsyncError::Parse {
        path: path.to_path_buf(),
        line: 1,
        message: message.into(),
    }
}
