//! Resolution strategies and per-conflict choices.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SkillsyncError;

/// How a conflicting target is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Target becomes a byte copy of source.
    #[default]
    Overwrite,
    /// Target is left unchanged.
    Skip,
    /// Later `modified_at` wins; ties go to source.
    Newer,
    /// Line-level union with conflict markers.
    Merge,
    /// Merge only when both sides changed from their common lines.
    ThreeWay,
    /// Every conflict needs a caller-supplied [`ResolutionChoice`].
    Interactive,
}

impl Strategy {
    pub const ALL: [Self; 6] = [
        Self::Overwrite,
        Self::Skip,
        Self::Newer,
        Self::Merge,
        Self::ThreeWay,
        Self::Interactive,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overwrite => "overwrite",
            Self::Skip => "skip",
            Self::Newer => "newer",
            Self::Merge => "merge",
            Self::ThreeWay => "three-way",
            Self::Interactive => "interactive",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = SkillsyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "skip" => Ok(Self::Skip),
            "newer" => Ok(Self::Newer),
            "merge" => Ok(Self::Merge),
            "three-way" | "threeway" => Ok(Self::ThreeWay),
            "interactive" => Ok(Self::Interactive),
            other => Err(SkillsyncError::Usage(format!(
                "unknown strategy '{other}' (expected overwrite|skip|newer|merge|three-way|interactive)"
            ))),
        }
    }
}

/// A caller's decision for one conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolutionChoice {
    UseSource,
    UseTarget,
    MergeMechanical,
    Skip,
}

impl ResolutionChoice {
    pub const ALL: [Self; 4] = [
        Self::UseSource,
        Self::UseTarget,
        Self::MergeMechanical,
        Self::Skip,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UseSource => "source",
            Self::UseTarget => "target",
            Self::MergeMechanical => "merge",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for ResolutionChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolutionChoice {
    type Err = SkillsyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "source" | "use-source" | "usesource" | "s" => Ok(Self::UseSource),
            "target" | "use-target" | "usetarget" | "t" => Ok(Self::UseTarget),
            "merge" | "merge-mechanical" | "mergemechanical" | "m" => Ok(Self::MergeMechanical),
            "skip" | "k" => Ok(Self::Skip),
            other => Err(SkillsyncError::Usage(format!(
                "unknown resolution '{other}' (expected source|target|merge|skip)"
            ))),
        }
    }
}

/// Choice plus optional explicit file text that replaces the computed result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub choice: ResolutionChoice,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl From<ResolutionChoice> for Resolution {
    fn from(choice: ResolutionChoice) -> Self {
        Self {
            choice,
            content: None,
        }
    }
}

/// Resolutions keyed by skill name.
pub type ResolutionMap = BTreeMap<String, Resolution>;

/// Parse `name=choice` as given on the command line.
pub fn parse_resolution_arg(arg: &str) -> Result<(String, Resolution), SkillsyncError> {
    let (name, choice) = arg.split_once('=').ok_or_else(|| {
        SkillsyncError::Usage(format!("resolution '{arg}' must look like name=choice"))
    })?;
    let name = name.trim();
    if name.is_empty() {
        return Err(SkillsyncError::Usage(format!(
            "resolution '{arg}' is missing a skill name"
        )));
    }
    Ok((name.to_string(), choice.parse::<ResolutionChoice>()?.into()))
}
