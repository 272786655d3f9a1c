//! Skill lifecycle: promote, demote, delete, import and export.
//!
//! All writes go through the same backup and atomic-write machinery as
//! sync. Only `repo` and `user` skills can be moved or deleted.

mod moves;
mod transfer;

use std::path::{Path, PathBuf};

use crate::backup::BackupController;
use crate::core::{Scope, Skill};
use crate::error::Result;
use crate::sync::{ExecuteOptions, SyncExecutor, SyncPlanner, SyncTarget};

pub use moves::{DeleteOutcome, MoveOptions, MoveOutcome, layout_of};
pub use transfer::{ExportFormat, ImportOutcome, export_skills};

#[derive(Clone)]
pub struct SkillLifecycle {
    backups: BackupController,
    /// Skills roots that must never be copied or removed as a skill.
    protected_roots: Vec<PathBuf>,
}

impl SkillLifecycle {
    #[must_use]
    pub const fn new(backups: BackupController) -> Self {
        Self {
            backups,
            protected_roots: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_protected_roots(mut self, roots: impl IntoIterator<Item = PathBuf>) -> Self {
        self.protected_roots.extend(roots);
        self
    }

    /// Copy a `repo` skill into the `user` root of the same platform.
    pub fn promote(&self, skill: &Skill, user_root: &Path, options: MoveOptions) -> Result<MoveOutcome> {
        moves::move_between(&self.backups, skill, Scope::Repo, Scope::User, user_root, &self.protected_roots, options)
    }

    /// Copy a `user` skill into the `repo` root of the same platform.
    pub fn demote(&self, skill: &Skill, repo_root: &Path, options: MoveOptions) -> Result<MoveOutcome> {
        moves::move_between(&self.backups, skill, Scope::User, Scope::Repo, repo_root, &self.protected_roots, options)
    }

    pub fn delete(&self, skill: &Skill, backup: bool) -> Result<DeleteOutcome> {
        moves::delete_skill(&self.backups, skill, &self.protected_roots, backup)
    }

    /// Import a skill file onto `target`, resolving conflicts like sync.
    pub fn import(
        &self,
        path: &Path,
        target: &SyncTarget,
        existing: &[Skill],
        planner: &SyncPlanner,
        options: &ExecuteOptions,
    ) -> Result<ImportOutcome> {
        let executor = SyncExecutor::new(self.backups.clone());
        transfer::import_file(&executor, path, target, existing, planner, options)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use tempfile::tempdir;

    use super::*;
    use crate::backup::MemoryBackupStore;
    use crate::core::Platform;
    use crate::error::ErrorKind;
    use crate::parser::SkillParser;
    use crate::sync::{Strategy, SyncAction};

    fn lifecycle() -> (SkillLifecycle, Arc<MemoryBackupStore>) {
        let store = Arc::new(MemoryBackupStore::new());
        (SkillLifecycle::new(BackupController::new(store.clone())), store)
    }

    fn write(path: &Path, text: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    #[test]
    fn promote_copies_directory_with_assets() {
        let dir = tempdir().unwrap();
        let repo = dir.path().join("repo/.claude/skills");
        let user = dir.path().join("home/.claude/skills");
        let skill_path = repo.join("alpha/SKILL.md");
        write(&skill_path, "# Alpha\n");
        write(&repo.join("alpha/notes.txt"), "asset");

        let skill = SkillParser::parse_file(&skill_path, Platform::ClaudeCode, Scope::Repo).unwrap();
        let (lifecycle, _) = lifecycle();
        let outcome = lifecycle.promote(&skill, &user, MoveOptions::default()).unwrap();

        assert_eq!(outcome.to, user.join("alpha/SKILL.md"));
        assert_eq!(fs::read_to_string(user.join("alpha/notes.txt")).unwrap(), "asset");
        assert!(skill_path.exists());
        assert!(!outcome.source_removed);
    }

    #[test]
    fn demote_with_force_backs_up_and_moves() {
        let dir = tempdir().unwrap();
        let user = dir.path().join("home/.cursor/skills");
        let repo = dir.path().join("repo/.cursor/skills");
        write(&user.join("beta.md"), "user copy\n");
        write(&repo.join("beta.md"), "repo copy\n");

        let skill = SkillParser::parse_file(&user.join("beta.md"), Platform::Cursor, Scope::User).unwrap();
        let (lifecycle, store) = lifecycle();

        let err = lifecycle.demote(&skill, &repo, MoveOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);

        let options = MoveOptions {
            remove_source: true,
            force: true,
            ..MoveOptions::default()
        };
        let outcome = lifecycle.demote(&skill, &repo, options).unwrap();
        assert_eq!(fs::read_to_string(repo.join("beta.md")).unwrap(), "user copy\n");
        assert!(!user.join("beta.md").exists());
        assert_eq!(store.len(), 1);
        let backup = outcome.backup.unwrap();
        assert_eq!(lifecycle.backups.get(&backup.id).unwrap(), b"repo copy\n");
    }

    #[test]
    fn wrong_scope_and_platform_are_rejected() {
        let (lifecycle, _) = lifecycle();
        let user_skill = Skill::new("a", Platform::Codex, Scope::User, "/u/a/SKILL.md", "x");
        let err = lifecycle
            .promote(&user_skill, Path::new("/u"), MoveOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);

        let repo_skill = user_skill.with_scope(Scope::Repo);
        let options = MoveOptions {
            to_platform: Some(Platform::Cursor),
            ..MoveOptions::default()
        };
        let err = lifecycle.promote(&repo_skill, Path::new("/u"), options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);

        let system_skill = user_skill.with_scope(Scope::System);
        let err = lifecycle.delete(&system_skill, true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ScopeViolation);
    }

    #[test]
    fn delete_takes_backup_first() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("skills/gamma/SKILL.md");
        write(&path, "gamma\n");
        let skill = SkillParser::parse_file(&path, Platform::Codex, Scope::User).unwrap();

        let (lifecycle, store) = lifecycle();
        let outcome = lifecycle.delete(&skill, true).unwrap();
        assert!(!dir.path().join("skills/gamma").exists());
        assert_eq!(store.len(), 1);
        assert!(outcome.backup.is_some());
    }

    #[test]
    fn delete_refuses_a_skills_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("home/.codex/skills");
        write(&root.join("alpha/SKILL.md"), "alpha\n");
        write(&root.join("SKILL.md"), "stray\n");
        let stray = Skill::new("skills", Platform::Codex, Scope::User, root.join("SKILL.md"), "stray\n");

        let (lifecycle, store) = lifecycle();
        let lifecycle = lifecycle.with_protected_roots([root.clone()]);
        let err = lifecycle.delete(&stray, true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        assert!(root.join("alpha/SKILL.md").exists());
        assert!(store.is_empty());

        let err = lifecycle
            .promote(&stray.with_scope(Scope::Repo), &dir.path().join("out"), MoveOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn import_with_escaping_name_writes_nothing() {
        let dir = tempdir().unwrap();
        let loose = dir.path().join("incoming/evil.md");
        write(&loose, "---\nname: ../../../escaped\n---\nbody\n");
        let root = dir.path().join("home/.codex/skills");

        let (lifecycle, _) = lifecycle();
        let target = SyncTarget::new(Platform::Codex, Scope::User, Some(root.clone()));
        let err = lifecycle
            .import(
                &loose,
                &target,
                &[],
                &SyncPlanner::new(Strategy::Overwrite),
                &ExecuteOptions::default(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotASkill);
        assert!(!dir.path().join("escaped").exists());
        assert!(!root.exists());
    }

    #[test]
    fn import_runs_through_planner() {
        let dir = tempdir().unwrap();
        let loose = dir.path().join("incoming/delta.md");
        write(&loose, "---\ndescription: Delta\n---\nbody\n");
        let root = dir.path().join("home/.codex/skills");

        let (lifecycle, _) = lifecycle();
        let target = SyncTarget::new(Platform::Codex, Scope::User, Some(root.clone()));
        let outcome = lifecycle
            .import(
                &loose,
                &target,
                &[],
                &SyncPlanner::new(Strategy::Overwrite),
                &ExecuteOptions::default(),
            )
            .unwrap();
        assert_eq!(outcome.plan.entries[0].action, SyncAction::Create);
        assert_eq!(outcome.report.committed, 1);
        assert_eq!(
            fs::read_to_string(root.join("delta/SKILL.md")).unwrap(),
            "---\ndescription: Delta\n---\nbody\n"
        );
    }
}
