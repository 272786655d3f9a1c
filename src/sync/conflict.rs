//! Classifying source skills against a target platform and scope.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use crate::core::{Platform, Scope, Skill};
use crate::similarity::{DiffHunk, diff_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictType {
    /// Bodies differ.
    Content,
    /// Bodies match; `description` or `tools` differ.
    Metadata,
    /// Target has a skill the source does not.
    Missing,
}

impl ConflictType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Metadata => "metadata",
            Self::Missing => "missing",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conflict {
    pub skill_name: String,
    #[serde(rename = "type")]
    pub conflict_type: ConflictType,
    /// Absent for `missing` conflicts.
    pub source: Option<Skill>,
    pub target: Skill,
    pub hunks: Vec<DiffHunk>,
    pub lines_added: usize,
    pub lines_removed: usize,
}

impl Conflict {
    /// Content or metadata conflict between two present skills.
    #[must_use]
    pub fn between(source: &Skill, target: &Skill) -> Self {
        let diff = diff_text(&source.content, &target.content);
        let conflict_type = if source.normalized_content() == target.normalized_content() {
            ConflictType::Metadata
        } else {
            ConflictType::Content
        };
        Self {
            skill_name: source.name.clone(),
            conflict_type,
            source: Some(source.clone()),
            target: target.clone(),
            hunks: diff.hunks,
            lines_added: diff.lines_added,
            lines_removed: diff.lines_removed,
        }
    }

    #[must_use]
    pub fn missing(target: &Skill) -> Self {
        let diff = diff_text("", &target.content);
        Self {
            skill_name: target.name.clone(),
            conflict_type: ConflictType::Missing,
            source: None,
            target: target.clone(),
            hunks: diff.hunks,
            lines_added: diff.lines_added,
            lines_removed: diff.lines_removed,
        }
    }
}

/// Status of one source skill against the target.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Classification {
    New,
    Identical,
    Conflict(Box<Conflict>),
}

impl Classification {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Identical => "identical",
            Self::Conflict(_) => "conflict",
        }
    }

    #[must_use]
    pub fn conflict(&self) -> Option<&Conflict> {
        match self {
            Self::Conflict(conflict) => Some(conflict),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedEntry {
    pub skill_name: String,
    pub source: Skill,
    pub target: Option<Skill>,
    pub classification: Classification,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConflictReport {
    /// One entry per source skill name, sorted by name.
    pub entries: Vec<DetectedEntry>,
    /// Target-only skills; filled only for bidirectional analysis.
    pub missing: Vec<Conflict>,
}

impl ConflictReport {
    pub fn conflicts(&self) -> impl Iterator<Item = &Conflict> {
        self.entries
            .iter()
            .filter_map(|entry| entry.classification.conflict())
    }

    #[must_use]
    pub fn count(&self, label: &str) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.classification.label() == label)
            .count()
    }
}

/// Classify one pair.
#[must_use]
pub fn classify(source: &Skill, target: Option<&Skill>) -> Classification {
    let Some(target) = target else {
        return Classification::New;
    };
    let same_body = source.normalized_content() == target.normalized_content();
    if same_body && !source.metadata_differs(target) {
        Classification::Identical
    } else {
        Classification::Conflict(Box::new(Conflict::between(source, target)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictDetector {
    pub target_platform: Platform,
    pub target_scope: Scope,
    pub bidirectional: bool,
}

impl ConflictDetector {
    #[must_use]
    pub const fn new(target_platform: Platform, target_scope: Scope) -> Self {
        Self {
            target_platform,
            target_scope,
            bidirectional: false,
        }
    }

    #[must_use]
    pub const fn bidirectional(mut self, enabled: bool) -> Self {
        self.bidirectional = enabled;
        self
    }

    /// Classify `sources` against the target-side skills in `existing`.
    ///
    /// Only skills on the target platform and scope are considered; the
    /// first source per name wins.
    #[must_use]
    pub fn detect(&self, sources: &[Skill], existing: &[Skill]) -> ConflictReport {
        let targets: BTreeMap<&str, &Skill> = existing
            .iter()
            .filter(|s| s.platform == self.target_platform && s.scope == self.target_scope)
            .map(|s| (s.name.as_str(), s))
            .collect();

        let mut by_name: BTreeMap<&str, &Skill> = BTreeMap::new();
        for source in sources {
            by_name.entry(source.name.as_str()).or_insert(source);
        }

        let entries: Vec<DetectedEntry> = by_name
            .values()
            .map(|source| {
                let target = targets.get(source.name.as_str()).copied();
                let classification = classify(source, target);
                debug!(skill = %source.name, status = classification.label(), "classified");
                DetectedEntry {
                    skill_name: source.name.clone(),
                    source: (*source).clone(),
                    target: target.cloned(),
                    classification,
                }
            })
            .collect();

        let missing = if self.bidirectional {
            let source_names: BTreeSet<&str> = by_name.keys().copied().collect();
            targets
                .values()
                .filter(|t| !source_names.contains(t.name.as_str()))
                .map(|t| Conflict::missing(t))
                .collect()
        } else {
            Vec::new()
        };

        ConflictReport { entries, missing }
    }
}
