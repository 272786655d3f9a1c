//! Promote, demote and delete.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::backup::{BackupController, BackupRecord};
use crate::core::{Platform, Scope, Skill, SkillLayout};
use crate::error::{Result, SkillsyncError};
use crate::parser::is_skill_file;
use crate::sync::layout_path;
use crate::utils::{atomic_write, copy_dir, normalize_lexically};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveOptions {
    /// Remove the source after copying (a move rather than a copy).
    pub remove_source: bool,
    /// Replace an existing destination, backing it up first.
    pub force: bool,
    /// Destination platform; must match the skill's own platform.
    pub to_platform: Option<Platform>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveOutcome {
    pub skill_name: String,
    pub platform: Platform,
    pub from_scope: Scope,
    pub to_scope: Scope,
    pub from: PathBuf,
    pub to: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<BackupRecord>,
    pub source_removed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteOutcome {
    pub skill_name: String,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<BackupRecord>,
}

/// On-disk shape of an existing skill.
#[must_use]
pub fn layout_of(skill: &Skill) -> SkillLayout {
    if is_skill_file(&skill.path) {
        SkillLayout::Directory
    } else {
        SkillLayout::SingleFile
    }
}

/// Copy `skill` from `from_scope` into `to_scope` under `dest_root`.
pub(super) fn move_between(
    backups: &BackupController,
    skill: &Skill,
    expected: Scope,
    to_scope: Scope,
    dest_root: &Path,
    protected: &[PathBuf],
    options: MoveOptions,
) -> Result<MoveOutcome> {
    for scope in [skill.scope, to_scope] {
        if !scope.is_writable() {
            return Err(SkillsyncError::ScopeViolation {
                scope,
                operation: format!("move '{}' from {} to {}", skill.name, skill.scope, to_scope),
            });
        }
    }
    if skill.scope != expected {
        return Err(SkillsyncError::Usage(format!(
            "'{}' is a {} skill; expected a {} skill",
            skill.name, skill.scope, expected
        )));
    }
    if let Some(platform) = options.to_platform.filter(|p| *p != skill.platform) {
        return Err(SkillsyncError::Usage(format!(
            "cannot move '{}' from {} to {}; use sync for cross-platform copies",
            skill.name, skill.platform, platform
        )));
    }

    let layout = layout_of(skill);
    let dest = layout_path(dest_root, layout, &skill.name)?;
    if dest == skill.path {
        return Err(SkillsyncError::InvariantViolation(format!(
            "source and destination are the same file: {}",
            dest.display()
        )));
    }

    let mut backup = None;
    if dest.exists() {
        if !options.force {
            return Err(SkillsyncError::Usage(format!(
                "{} already exists; pass --force to replace it",
                dest.display()
            )));
        }
        backup = Some(backups.snapshot_path(&dest, skill.platform)?);
        remove_skill_files(&dest, layout, protected)?;
    }

    match layout {
        SkillLayout::Directory => {
            let (Some(from_dir), Some(to_dir)) = (skill.path.parent(), dest.parent()) else {
                return Err(SkillsyncError::InvariantViolation(format!(
                    "directory skill without a parent: {}",
                    skill.path.display()
                )));
            };
            guard_skill_dir(from_dir, protected)?;
            guard_skill_dir(to_dir, protected)?;
            copy_dir(from_dir, to_dir)?;
        }
        SkillLayout::SingleFile => {
            let bytes = std::fs::read(&skill.path).map_err(|err| SkillsyncError::io(&skill.path, err))?;
            atomic_write(&dest, &bytes)?;
        }
    }

    if options.remove_source {
        remove_skill_files(&skill.path, layout, protected)?;
    }
    info!(
        skill = %skill.name,
        from = %skill.scope,
        to = %to_scope,
        path = %dest.display(),
        moved = options.remove_source,
        "skill relocated"
    );

    Ok(MoveOutcome {
        skill_name: skill.name.clone(),
        platform: skill.platform,
        from_scope: skill.scope,
        to_scope,
        from: skill.path.clone(),
        to: dest,
        backup,
        source_removed: options.remove_source,
    })
}

pub(super) fn delete_skill(
    backups: &BackupController,
    skill: &Skill,
    protected: &[PathBuf],
    backup: bool,
) -> Result<DeleteOutcome> {
    if !skill.is_writable() {
        return Err(SkillsyncError::ScopeViolation {
            scope: skill.scope,
            operation: format!("delete '{}'", skill.name),
        });
    }
    let layout = layout_of(skill);
    if let (SkillLayout::Directory, Some(dir)) = (layout, skill.path.parent()) {
        guard_skill_dir(dir, protected)?;
    }
    let record = if backup {
        Some(backups.snapshot(skill)?)
    } else {
        warn!(skill = %skill.name, "deleting without backup");
        None
    };
    remove_skill_files(&skill.path, layout, protected)?;
    info!(skill = %skill.name, path = %skill.path.display(), "skill deleted");
    Ok(DeleteOutcome {
        skill_name: skill.name.clone(),
        path: skill.path.clone(),
        backup: record,
    })
}

/// Remove a skill file, or its whole directory for directory-layout skills.
fn remove_skill_files(path: &Path, layout: SkillLayout, protected: &[PathBuf]) -> Result<()> {
    match (layout, path.parent()) {
        (SkillLayout::Directory, Some(dir)) => {
            guard_skill_dir(dir, protected)?;
            std::fs::remove_dir_all(dir).map_err(|err| SkillsyncError::io(dir, err))
        }
        _ => std::fs::remove_file(path).map_err(|err| SkillsyncError::io(path, err)),
    }
}

/// A skill directory may not be a scope root or contain one.
fn guard_skill_dir(dir: &Path, protected: &[PathBuf]) -> Result<()> {
    let dir = normalize_lexically(dir);
    let hit = protected
        .iter()
        .any(|root| normalize_lexically(root).starts_with(&dir));
    if hit || dir.parent().is_none() {
        return Err(SkillsyncError::InvariantViolation(format!(
            "{} is a skills root, not a skill directory",
            dir.display()
        )));
    }
    Ok(())
}
