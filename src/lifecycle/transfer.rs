//! Import of loose skill files and export of discovered skills.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::core::Skill;
use crate::error::{Result, SkillsyncError};
use crate::parser::SkillParser;
use crate::sync::{ExecuteOptions, SyncExecutor, SyncPlan, SyncPlanner, SyncReport, SyncTarget};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Json,
    Yaml,
}

impl ExportFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = SkillsyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(SkillsyncError::Usage(format!(
                "unknown export format '{other}' (expected json|yaml)"
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
struct ExportDocument<'a> {
    version: &'static str,
    exported_at: DateTime<Utc>,
    count: usize,
    skills: &'a [Skill],
}

/// Render `skills` as a JSON or YAML document.
pub fn export_skills(skills: &[Skill], format: ExportFormat, now: DateTime<Utc>) -> Result<String> {
    let doc = ExportDocument {
        version: env!("CARGO_PKG_VERSION"),
        exported_at: now,
        count: skills.len(),
        skills,
    };
    let rendered = match format {
        ExportFormat::Json => serde_json::to_string_pretty(&doc)
            .map_err(|err| SkillsyncError::Serialization(format!("export json: {err}")))?,
        ExportFormat::Yaml => serde_yaml::to_string(&doc)
            .map_err(|err| SkillsyncError::Serialization(format!("export yaml: {err}")))?,
    };
    info!(count = skills.len(), format = format.as_str(), "skills exported");
    Ok(rendered)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportOutcome {
    pub plan: SyncPlan,
    pub report: SyncReport,
}

/// Parse `path` and push it through the planner and executor as a
/// one-skill sync onto `target`.
pub(super) fn import_file(
    executor: &SyncExecutor,
    path: &Path,
    target: &SyncTarget,
    existing: &[Skill],
    planner: &SyncPlanner,
    options: &ExecuteOptions,
) -> Result<ImportOutcome> {
    if !target.scope.is_writable() {
        return Err(SkillsyncError::ScopeViolation {
            scope: target.scope,
            operation: format!("import {}", path.display()),
        });
    }
    let skill = SkillParser::parse_file(path, target.platform, target.scope)?;
    info!(skill = %skill.name, path = %path.display(), "importing");
    let plan = planner.plan(&[skill], target, existing)?;
    let report = executor.apply(&plan, options)?;
    Ok(ImportOutcome { plan, report })
}
