//! E2E Scenario: promote, demote, delete, import and export through AppContext.

use std::fs;

use chrono::Utc;
use skillsync::core::{CancelToken, Platform, Scope};
use skillsync::discovery::DiscoveryOptions;
use skillsync::error::ErrorKind;
use skillsync::lifecycle::{ExportFormat, MoveOptions, export_skills};
use skillsync::parser::SkillParser;
use skillsync::sync::{Strategy, SyncAction, SyncPlanner, SyncTarget};
use skillsync::test_utils::UnitTestFixture;

#[test]
fn promote_then_demote_back() {
    let fixture = UnitTestFixture::new();
    let repo_path = fixture.write_skill(Platform::ClaudeCode, Scope::Repo, "alpha", "# Alpha\n");
    let ctx = fixture.context();
    let lifecycle = ctx.lifecycle().unwrap();

    let skill = SkillParser::parse_file(&repo_path, Platform::ClaudeCode, Scope::Repo).unwrap();
    let user_root = ctx.write_root(Platform::ClaudeCode, Scope::User).unwrap();
    let promoted = lifecycle
        .promote(
            &skill,
            &user_root,
            MoveOptions {
                remove_source: true,
                ..MoveOptions::default()
            },
        )
        .unwrap();
    assert!(!repo_path.exists());
    assert_eq!(fixture.read(&promoted.to), "# Alpha\n");

    let found = ctx
        .discover(&[Platform::ClaudeCode], &DiscoveryOptions::default())
        .unwrap();
    assert_eq!(found.skills.len(), 1);
    assert_eq!(found.skills[0].scope, Scope::User);

    let user_skill = found.skills[0].clone();
    let repo_root = ctx.write_root(Platform::ClaudeCode, Scope::Repo).unwrap();
    let demoted = lifecycle.demote(&user_skill, &repo_root, MoveOptions::default()).unwrap();
    assert_eq!(demoted.to, repo_path);
    assert!(promoted.to.exists());
}

#[test]
fn delete_can_be_undone_from_backup() {
    let fixture = UnitTestFixture::new();
    let path = fixture.write_skill(Platform::Codex, Scope::User, "beta", "beta body\n");
    let ctx = fixture.context();

    let skill = SkillParser::parse_file(&path, Platform::Codex, Scope::User).unwrap();
    let outcome = ctx.lifecycle().unwrap().delete(&skill, true).unwrap();
    assert!(!path.exists());

    let backup = outcome.backup.unwrap();
    ctx.backups().unwrap().restore(&backup.id).unwrap();
    assert_eq!(fixture.read(&path), "beta body\n");
}

#[test]
fn import_conflict_follows_strategy() {
    let fixture = UnitTestFixture::new();
    let loose = fixture.create_file("downloads/gamma.md", "new gamma\n");
    let existing_path = fixture.write_skill(Platform::Cursor, Scope::User, "gamma", "old gamma\n");
    let ctx = fixture.context();
    let existing = ctx
        .discover(&[Platform::Cursor], &DiscoveryOptions::all_scopes().with_scopes([Scope::User]))
        .unwrap()
        .skills;
    let target = SyncTarget::new(
        Platform::Cursor,
        Scope::User,
        ctx.write_root(Platform::Cursor, Scope::User),
    );
    let lifecycle = ctx.lifecycle().unwrap();

    let skipped = lifecycle
        .import(
            &loose,
            &target,
            &existing,
            &SyncPlanner::new(Strategy::Skip),
            &ctx.execute_options(CancelToken::new()),
        )
        .unwrap();
    assert_eq!(skipped.plan.entries[0].action, SyncAction::Skip);
    assert_eq!(fixture.read(&existing_path), "old gamma\n");

    let replaced = lifecycle
        .import(
            &loose,
            &target,
            &existing,
            &SyncPlanner::new(Strategy::Overwrite),
            &ctx.execute_options(CancelToken::new()),
        )
        .unwrap();
    assert_eq!(replaced.plan.entries[0].action, SyncAction::BackupOverwrite);
    assert_eq!(replaced.report.backups().count(), 1);
    assert_eq!(fixture.read(&existing_path), "new gamma\n");
}

#[test]
fn export_lists_discovered_skills() {
    let fixture = UnitTestFixture::new();
    let _ = fixture.write_skill(Platform::Codex, Scope::User, "delta", "---\ndescription: D\n---\nbody\n");
    let ctx = fixture.context();
    let found = ctx.discover(&Platform::ALL, &ctx.discovery_options()).unwrap();

    let json = export_skills(&found.skills, ExportFormat::Json, Utc::now()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["count"], 1);
    assert_eq!(value["skills"][0]["description"], "D");

    let out = fixture.root.join("export.yaml");
    fs::write(&out, export_skills(&found.skills, ExportFormat::Yaml, Utc::now()).unwrap()).unwrap();
    assert!(fixture.read(&out).contains("delta"));
}

#[test]
fn stray_root_skill_file_is_ignored_and_never_deleted() {
    let fixture = UnitTestFixture::new();
    let alpha = fixture.write_skill(Platform::Codex, Scope::User, "alpha", "alpha\n");
    let root = fixture.skill_root(Platform::Codex, Scope::User);
    let stray = fixture.create_file("home/.codex/skills/SKILL.md", "stray\n");
    let ctx = fixture.context();

    let found = ctx.discover(&[Platform::Codex], &DiscoveryOptions::default()).unwrap();
    let names: Vec<&str> = found.skills.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["alpha"]);
    assert_eq!(found.warnings[0].kind, ErrorKind::NotASkill);

    let skill = SkillParser::parse_file(&stray, Platform::Codex, Scope::User).unwrap();
    let err = ctx.lifecycle().unwrap().delete(&skill, false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvariantViolation);
    assert!(alpha.exists());
    assert!(root.is_dir());
}

#[test]
fn import_cannot_escape_the_skills_root() {
    let fixture = UnitTestFixture::new();
    let loose = fixture.create_file("downloads/evil.md", "---\nname: ../../../escaped\n---\nbody\n");
    let ctx = fixture.context();
    let target = SyncTarget::new(
        Platform::Codex,
        Scope::User,
        ctx.write_root(Platform::Codex, Scope::User),
    );

    let err = ctx
        .lifecycle()
        .unwrap()
        .import(
            &loose,
            &target,
            &[],
            &SyncPlanner::new(Strategy::Overwrite),
            &ctx.execute_options(CancelToken::new()),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotASkill);
    assert!(!fixture.root.join("escaped").exists());
}
