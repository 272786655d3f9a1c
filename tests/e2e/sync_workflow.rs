//! E2E Scenario: planning and applying syncs through the on-disk stack.

use std::fs;

use skillsync::core::{Platform, Scope, Skill};
use skillsync::discovery::DiscoveryOptions;
use skillsync::error::ErrorKind;
use skillsync::sync::{EntryState, Strategy, SyncAction, SyncPlanner, SyncTarget};
use skillsync::test_utils::UnitTestFixture;

fn sources(fixture: &UnitTestFixture, platform: Platform) -> Vec<Skill> {
    fixture
        .engine()
        .discover(&[platform], &fixture.work_dir, &DiscoveryOptions::default())
        .unwrap()
        .skills
}

fn existing(fixture: &UnitTestFixture, platform: Platform, scope: Scope) -> Vec<Skill> {
    fixture
        .engine()
        .discover(
            &[platform],
            &fixture.work_dir,
            &DiscoveryOptions::all_scopes().with_scopes([scope]),
        )
        .unwrap()
        .skills
}

fn user_target(fixture: &UnitTestFixture, platform: Platform) -> SyncTarget {
    SyncTarget::new(platform, Scope::User, Some(fixture.skill_root(platform, Scope::User)))
}

#[test]
fn new_skill_is_created_without_backup() {
    let fixture = UnitTestFixture::new();
    let _ = fixture.write_skill(Platform::ClaudeCode, Scope::User, "alpha", "X");
    let ctx = fixture.context();

    let plan = SyncPlanner::default()
        .plan(
            &sources(&fixture, Platform::ClaudeCode),
            &user_target(&fixture, Platform::Codex),
            &existing(&fixture, Platform::Codex, Scope::User),
        )
        .unwrap();
    assert_eq!(plan.entries.len(), 1);
    assert_eq!(plan.entries[0].skill_name, "alpha");
    assert_eq!(plan.entries[0].action, SyncAction::Create);
    assert!(!plan.entries[0].backup_required);

    let report = ctx
        .executor()
        .unwrap()
        .apply(&plan, &ctx.execute_options(Default::default()))
        .unwrap();
    assert_eq!(report.committed, 1);

    let written = fixture.skill_root(Platform::Codex, Scope::User).join("alpha/SKILL.md");
    assert_eq!(fixture.read(&written), "X");
    assert!(ctx.backups().unwrap().list().unwrap().is_empty());
}

#[test]
fn overwrite_backs_up_old_bytes() {
    let fixture = UnitTestFixture::new();
    let _ = fixture.write_skill(Platform::ClaudeCode, Scope::User, "alpha", "NEW");
    let target_path = fixture.write_skill(Platform::Codex, Scope::User, "alpha", "OLD");
    let ctx = fixture.context();

    let plan = SyncPlanner::new(Strategy::Overwrite)
        .plan(
            &sources(&fixture, Platform::ClaudeCode),
            &user_target(&fixture, Platform::Codex),
            &existing(&fixture, Platform::Codex, Scope::User),
        )
        .unwrap();
    let entry = &plan.entries[0];
    assert_eq!(entry.action, SyncAction::BackupOverwrite);
    assert!(entry.backup_required);
    assert_eq!(entry.resolved_content.as_deref(), Some("NEW"));

    let report = ctx
        .executor()
        .unwrap()
        .apply(&plan, &ctx.execute_options(Default::default()))
        .unwrap();
    assert_eq!(report.outcomes[0].state, EntryState::Committed);
    assert_eq!(fixture.read(&target_path), "NEW");

    let backups = ctx.backups().unwrap();
    let records = backups.list().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(backups.get(&records[0].id).unwrap(), b"OLD");
    assert_eq!(records[0].source_path, target_path);
}

#[test]
fn read_only_target_fails_before_touching_disk() {
    let fixture = UnitTestFixture::new();
    let _ = fixture.write_skill(Platform::ClaudeCode, Scope::User, "alpha", "X");
    let system_root = fixture.root.join("system/codex");
    let target = SyncTarget::new(Platform::Codex, Scope::System, Some(system_root.clone()));

    let err = SyncPlanner::default()
        .plan(&sources(&fixture, Platform::ClaudeCode), &target, &[])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ScopeViolation);
    assert!(!system_root.exists());
}

#[test]
fn second_overwrite_is_a_no_op() {
    let fixture = UnitTestFixture::new();
    let _ = fixture.write_skill(
        Platform::ClaudeCode,
        Scope::User,
        "alpha",
        "---\ndescription: Alpha\ntools: [Read, Grep]\ncustom: kept\n---\n# Alpha\n",
    );
    let _ = fixture.write_skill(Platform::ClaudeCode, Scope::User, "beta", "beta body\n");
    let _ = fixture.write_skill(Platform::Codex, Scope::User, "beta", "old beta\n");
    let ctx = fixture.context();
    let executor = ctx.executor().unwrap();
    let planner = SyncPlanner::new(Strategy::Overwrite);

    let first = planner
        .plan(
            &sources(&fixture, Platform::ClaudeCode),
            &user_target(&fixture, Platform::Codex),
            &existing(&fixture, Platform::Codex, Scope::User),
        )
        .unwrap();
    assert_eq!(first.writes(), 2);
    executor.apply(&first, &ctx.execute_options(Default::default())).unwrap();

    let second = planner
        .plan(
            &sources(&fixture, Platform::ClaudeCode),
            &user_target(&fixture, Platform::Codex),
            &existing(&fixture, Platform::Codex, Scope::User),
        )
        .unwrap();
    assert!(second.is_noop(), "{:?}", second.entries);
}

#[test]
fn line_endings_do_not_cause_conflicts() {
    let fixture = UnitTestFixture::new();
    let _ = fixture.write_skill(Platform::Cursor, Scope::User, "crlf", "line one\r\nline two\r\n");
    let _ = fixture.write_skill(Platform::Cursor, Scope::User, "fresh", "first\r\nsecond\r\n");
    let _ = fixture.write_skill(Platform::Codex, Scope::User, "crlf", "line one\nline two\n");
    let ctx = fixture.context();

    let plan = SyncPlanner::default()
        .plan(
            &sources(&fixture, Platform::Cursor),
            &user_target(&fixture, Platform::Codex),
            &existing(&fixture, Platform::Codex, Scope::User),
        )
        .unwrap();
    assert_eq!(plan.entries[0].skill_name, "crlf");
    assert_eq!(plan.entries[0].action, SyncAction::Skip);
    assert_eq!(plan.entries[1].action, SyncAction::Create);

    ctx.executor()
        .unwrap()
        .apply(&plan, &ctx.execute_options(Default::default()))
        .unwrap();
    let fresh = fixture.skill_root(Platform::Codex, Scope::User).join("fresh/SKILL.md");
    assert_eq!(fs::read(&fresh).unwrap(), b"first\r\nsecond\r\n");
}

#[test]
fn three_way_merges_target_only_edits() {
    let fixture = UnitTestFixture::new();
    let _ = fixture.write_skill(Platform::ClaudeCode, Scope::User, "alpha", "a\nc\n");
    let target_path = fixture.write_skill(Platform::Codex, Scope::User, "alpha", "a\nb\nc\n");
    let ctx = fixture.context();

    let plan = SyncPlanner::new(Strategy::ThreeWay)
        .plan(
            &sources(&fixture, Platform::ClaudeCode),
            &user_target(&fixture, Platform::Codex),
            &existing(&fixture, Platform::Codex, Scope::User),
        )
        .unwrap();
    assert_eq!(plan.entries[0].action, SyncAction::MergeWrite);
    assert_eq!(fixture.read(&target_path), "a\nb\nc\n");

    let report = ctx
        .executor()
        .unwrap()
        .apply(&plan, &ctx.execute_options(Default::default()))
        .unwrap();
    assert_eq!(report.committed, 1);
    let merged = fixture.read(&target_path);
    assert!(merged.contains("=======\nb\n>>>>>>> target\n"), "got {merged}");
    assert_eq!(report.backups().count(), 1);
}

#[test]
fn bidirectional_plan_reports_target_only_skills() {
    let fixture = UnitTestFixture::new();
    let _ = fixture.write_skill(Platform::ClaudeCode, Scope::User, "alpha", "x\n");
    let _ = fixture.write_skill(Platform::Codex, Scope::User, "only-codex", "y\n");

    let plan = SyncPlanner::default()
        .with_bidirectional(true)
        .plan(
            &sources(&fixture, Platform::ClaudeCode),
            &user_target(&fixture, Platform::Codex),
            &existing(&fixture, Platform::Codex, Scope::User),
        )
        .unwrap();
    assert_eq!(plan.missing.len(), 1);
    assert_eq!(plan.missing[0].skill_name, "only-codex");
}
