//! Pure sync planning.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use super::conflict::{Classification, Conflict, ConflictDetector, ConflictType};
use super::merge::{ThreeWayOutcome, mechanical_merge, three_way_merge};
use super::strategy::{Resolution, ResolutionChoice, ResolutionMap, Strategy};
use crate::core::{Platform, Scope, Skill, SkillLayout};
use crate::error::{Result, SkillsyncError};
use crate::parser::{SKILL_FILE, SkillSerializer, is_safe_skill_name};

/// What the executor does for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncAction {
    Create,
    Overwrite,
    Skip,
    #[serde(rename = "backup+overwrite")]
    BackupOverwrite,
    MergeWrite,
}

impl SyncAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Overwrite => "overwrite",
            Self::Skip => "skip",
            Self::BackupOverwrite => "backup+overwrite",
            Self::MergeWrite => "merge-write",
        }
    }

    #[must_use]
    pub const fn writes(self) -> bool {
        !matches!(self, Self::Skip)
    }
}

/// One unit of planned work.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanEntry {
    pub skill_name: String,
    pub action: SyncAction,
    pub backup_required: bool,
    /// Exact file text to write; `None` for skips.
    pub resolved_content: Option<String>,
    pub target_path: PathBuf,
    /// `new`, `identical` or `conflict`.
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_type: Option<ConflictType>,
    pub reason: String,
}

impl PlanEntry {
    #[must_use]
    pub fn resolved_bytes(&self) -> Option<&[u8]> {
        self.resolved_content.as_deref().map(str::as_bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncPlan {
    pub target_platform: Platform,
    pub target_scope: Scope,
    pub strategy: Strategy,
    /// Sorted by skill name.
    pub entries: Vec<PlanEntry>,
    /// Target-only skills, reported for bidirectional plans.
    pub missing: Vec<Conflict>,
}

impl SyncPlan {
    #[must_use]
    pub fn count(&self, action: SyncAction) -> usize {
        self.entries.iter().filter(|e| e.action == action).count()
    }

    #[must_use]
    pub fn writes(&self) -> usize {
        self.entries.iter().filter(|e| e.action.writes()).count()
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.writes() == 0
    }
}

/// Where a plan writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTarget {
    pub platform: Platform,
    pub scope: Scope,
    /// Root new skills are created under; existing targets keep their path.
    pub root: Option<PathBuf>,
}

impl SyncTarget {
    #[must_use]
    pub fn new(platform: Platform, scope: Scope, root: Option<PathBuf>) -> Self {
        Self {
            platform,
            scope,
            root,
        }
    }
}

/// Builds a [`SyncPlan`] without touching the filesystem.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncPlanner {
    pub strategy: Strategy,
    pub resolutions: ResolutionMap,
    pub bidirectional: bool,
    /// Snapshot targets before replacing them.
    pub backup: bool,
}

impl Default for SyncPlanner {
    fn default() -> Self {
        Self::new(Strategy::default())
    }
}

impl SyncPlanner {
    #[must_use]
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            resolutions: ResolutionMap::new(),
            bidirectional: false,
            backup: true,
        }
    }

    #[must_use]
    pub fn with_resolutions(mut self, resolutions: ResolutionMap) -> Self {
        self.resolutions = resolutions;
        self
    }

    #[must_use]
    pub const fn with_bidirectional(mut self, enabled: bool) -> Self {
        self.bidirectional = enabled;
        self
    }

    #[must_use]
    pub const fn with_backup(mut self, enabled: bool) -> Self {
        self.backup = enabled;
        self
    }

    /// Plan moving `sources` onto `target`, given the skills that already
    /// exist there.
    ///
    /// Fails with `ScopeViolation` for a read-only target scope and with
    /// `Conflict` when the interactive strategy lacks a resolution.
    pub fn plan(&self, sources: &[Skill], target: &SyncTarget, existing: &[Skill]) -> Result<SyncPlan> {
        if !target.scope.is_writable() {
            return Err(SkillsyncError::ScopeViolation {
                scope: target.scope,
                operation: format!("plan writes to {}", target.platform),
            });
        }

        let report = ConflictDetector::new(target.platform, target.scope)
            .bidirectional(self.bidirectional)
            .detect(sources, existing);

        let mut unresolved = Vec::new();
        let mut entries = Vec::with_capacity(report.entries.len());
        for detected in &report.entries {
            let source = &detected.source;
            let target_path = match &detected.target {
                Some(existing) => existing.path.clone(),
                None => planned_path(target, &source.name)?,
            };
            let outgoing = source
                .with_platform(target.platform)
                .with_scope(target.scope)
                .with_path(&target_path);

            let entry = match &detected.classification {
                Classification::New => PlanEntry {
                    skill_name: source.name.clone(),
                    action: SyncAction::Create,
                    backup_required: false,
                    resolved_content: Some(SkillSerializer::to_string(&outgoing)?),
                    target_path,
                    status: "new",
                    conflict_type: None,
                    reason: "not present on target".to_string(),
                },
                Classification::Identical => skip_entry(source, target_path, "identical", None, "already identical"),
                Classification::Conflict(conflict) => {
                    let Some(existing) = detected.target.as_ref() else {
                        return Err(SkillsyncError::InvariantViolation(format!(
                            "conflict for '{}' without a target skill",
                            source.name
                        )));
                    };
                    match self.resolve_conflict(&outgoing, existing, conflict)? {
                        Some((action, content, reason)) => {
                            self.conflict_entry(source, target_path, conflict, action, content, reason)
                        }
                        None => {
                            unresolved.push(source.name.clone());
                            continue;
                        }
                    }
                }
            };
            debug!(skill = %entry.skill_name, action = entry.action.as_str(), "planned");
            entries.push(entry);
        }

        if !unresolved.is_empty() {
            return Err(SkillsyncError::Conflict { skills: unresolved });
        }

        entries.sort_by(|a, b| a.skill_name.cmp(&b.skill_name));
        let plan = SyncPlan {
            target_platform: target.platform,
            target_scope: target.scope,
            strategy: self.strategy,
            entries,
            missing: report.missing,
        };
        info!(
            entries = plan.entries.len(),
            writes = plan.writes(),
            strategy = %self.strategy,
            "sync plan ready"
        );
        Ok(plan)
    }

    /// Resolve one conflict. `None` means the caller must decide.
    fn resolve_conflict(
        &self,
        source: &Skill,
        target: &Skill,
        conflict: &Conflict,
    ) -> Result<Option<(SyncAction, Option<String>, String)>> {
        let resolution: Resolution = match self.strategy {
            Strategy::Overwrite => ResolutionChoice::UseSource.into(),
            Strategy::Skip => ResolutionChoice::Skip.into(),
            Strategy::Newer => {
                if source.modified_at >= target.modified_at {
                    ResolutionChoice::UseSource.into()
                } else {
                    ResolutionChoice::UseTarget.into()
                }
            }
            Strategy::Merge => ResolutionChoice::MergeMechanical.into(),
            Strategy::ThreeWay => {
                return Ok(Some(match three_way_merge(&source.content, &target.content) {
                    ThreeWayOutcome::Merged(body) => (
                        SyncAction::MergeWrite,
                        Some(render_merged(source, &body)?),
                        "both sides changed; merged".to_string(),
                    ),
                    ThreeWayOutcome::Fallback(body) => (
                        SyncAction::MergeWrite,
                        Some(render_merged(source, &body)?),
                        "one side changed; merged".to_string(),
                    ),
                    ThreeWayOutcome::NoAncestor => self.take_source(source, "no common ancestor; source wins")?,
                }));
            }
            Strategy::Interactive => match self.resolutions.get(&conflict.skill_name) {
                Some(resolution) => resolution.clone(),
                None => return Ok(None),
            },
        };
        apply_resolution(source, target, &resolution, self.backup).map(Some)
    }

    fn take_source(&self, source: &Skill, reason: &str) -> Result<(SyncAction, Option<String>, String)> {
        Ok((
            self.replace_action(),
            Some(SkillSerializer::to_string(source)?),
            reason.to_string(),
        ))
    }

    const fn replace_action(&self) -> SyncAction {
        if self.backup {
            SyncAction::BackupOverwrite
        } else {
            SyncAction::Overwrite
        }
    }

    fn conflict_entry(
        &self,
        source: &Skill,
        target_path: PathBuf,
        conflict: &Conflict,
        action: SyncAction,
        content: Option<String>,
        reason: String,
    ) -> PlanEntry {
        if action == SyncAction::Skip {
            return skip_entry(source, target_path, "conflict", Some(conflict.conflict_type), &reason);
        }
        PlanEntry {
            skill_name: source.name.clone(),
            action,
            backup_required: self.backup && action != SyncAction::Create,
            resolved_content: content,
            target_path,
            status: "conflict",
            conflict_type: Some(conflict.conflict_type),
            reason,
        }
    }
}

/// Turn a resolution into an action and file text.
///
/// Shared by batch strategies and interactive callers. Explicit content in
/// the resolution replaces whatever the choice would have produced.
pub fn apply_resolution(
    source: &Skill,
    target: &Skill,
    resolution: &Resolution,
    backup: bool,
) -> Result<(SyncAction, Option<String>, String)> {
    let replace = if backup {
        SyncAction::BackupOverwrite
    } else {
        SyncAction::Overwrite
    };

    if let Some(content) = &resolution.content {
        if resolution.choice != ResolutionChoice::Skip && resolution.choice != ResolutionChoice::UseTarget {
            return Ok((replace, Some(content.clone()), "explicit content".to_string()));
        }
    }

    Ok(match resolution.choice {
        ResolutionChoice::UseSource => (
            replace,
            Some(SkillSerializer::to_string(source)?),
            "source wins".to_string(),
        ),
        ResolutionChoice::UseTarget => (SyncAction::Skip, None, "target kept".to_string()),
        ResolutionChoice::Skip => (SyncAction::Skip, None, "skipped".to_string()),
        ResolutionChoice::MergeMechanical => {
            let body = mechanical_merge(&source.content, &target.content);
            (
                SyncAction::MergeWrite,
                Some(render_merged(source, &body)?),
                "mechanical merge".to_string(),
            )
        }
    })
}

/// Source front-matter and line endings around a merged LF body.
fn render_merged(source: &Skill, body: &str) -> Result<String> {
    let merged = source.with_content(source.line_ending.apply(body));
    SkillSerializer::to_string(&merged)
}

fn skip_entry(
    source: &Skill,
    target_path: PathBuf,
    status: &'static str,
    conflict_type: Option<ConflictType>,
    reason: &str,
) -> PlanEntry {
    PlanEntry {
        skill_name: source.name.clone(),
        action: SyncAction::Skip,
        backup_required: false,
        resolved_content: None,
        target_path,
        status,
        conflict_type,
        reason: reason.to_string(),
    }
}

/// Path a new skill gets under the target root, per the platform layout.
pub fn planned_path(target: &SyncTarget, name: &str) -> Result<PathBuf> {
    let root = target.root.as_deref().ok_or_else(|| {
        SkillsyncError::Usage(format!(
            "no {} root is available for {}",
            target.scope, target.platform
        ))
    })?;
    layout_path(root, target.platform.layout(), name)
}

/// Path of skill `name` under `root`. Fails for names that would resolve
/// outside `root`.
pub fn layout_path(root: &Path, layout: SkillLayout, name: &str) -> Result<PathBuf> {
    if !is_safe_skill_name(name) {
        return Err(SkillsyncError::InvariantViolation(format!(
            "skill name '{name}' would escape {}",
            root.display()
        )));
    }
    Ok(match layout {
        SkillLayout::Directory => root.join(name).join(SKILL_FILE),
        SkillLayout::SingleFile => root.join(format!("{name}.md")),
    })
}
