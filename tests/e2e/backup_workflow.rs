//! E2E Scenario: snapshot, corrupt, verify, restore and prune.

use std::fs;

use chrono::{Duration, Utc};
use skillsync::backup::{BackupController, BackupStore, FsBackupStore};
use skillsync::core::{Platform, Scope};
use skillsync::error::ErrorKind;
use skillsync::parser::SkillParser;
use skillsync::test_utils::UnitTestFixture;

#[test]
fn snapshot_then_restore_round_trip() {
    let fixture = UnitTestFixture::new();
    let path = fixture.write_skill(Platform::ClaudeCode, Scope::User, "alpha", "original\n");
    let ctx = fixture.context();
    let backups = ctx.backups().unwrap();

    let skill = SkillParser::parse_file(&path, Platform::ClaudeCode, Scope::User).unwrap();
    let record = backups.snapshot(&skill).unwrap();
    assert_eq!(record.skill_name.as_deref(), Some("alpha"));
    assert!(record.checksum.starts_with("sha256:"));

    fs::write(&path, "edited\n").unwrap();
    backups.restore(&record.id).unwrap();
    assert_eq!(fixture.read(&path), "original\n");

    // Records survive reopening the store.
    let reopened = FsBackupStore::open(ctx.backup_dir().unwrap()).unwrap();
    assert_eq!(reopened.list().unwrap().len(), 1);
    assert!(reopened.verify(&record.id).unwrap());
}

#[test]
fn corrupted_blob_fails_verification_and_is_kept() {
    let fixture = UnitTestFixture::new();
    let path = fixture.write_skill(Platform::Codex, Scope::User, "beta", "beta\n");
    let ctx = fixture.context();
    let backups = ctx.backups().unwrap();
    let record = backups.snapshot_path(&path, Platform::Codex).unwrap();

    let blob = ctx.backup_dir().unwrap().join(format!("{}.bak", record.id));
    fs::write(&blob, "tampered").unwrap();

    let report = backups.verify(&record.id).unwrap();
    assert!(!report.ok);
    let err = backups.restore(&record.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(backups.list().unwrap().len(), 1);
    assert_eq!(fixture.read(&path), "beta\n");
}

#[test]
fn prune_only_removes_expired_records() {
    let fixture = UnitTestFixture::new();
    let path = fixture.write_skill(Platform::Cursor, Scope::User, "gamma", "g\n");
    let ctx = fixture.context();
    let backups: BackupController = ctx.backups().unwrap();
    let record = backups.snapshot_path(&path, Platform::Cursor).unwrap();

    assert!(backups.prune(30, Utc::now()).unwrap().is_empty());
    let removed = backups.prune(30, Utc::now() + Duration::days(31)).unwrap();
    assert_eq!(removed, vec![record.id.clone()]);
    assert_eq!(backups.get(&record.id).unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn stray_record_does_not_block_listing_or_pruning() {
    let fixture = UnitTestFixture::new();
    let path = fixture.write_skill(Platform::Codex, Scope::User, "delta", "d\n");
    let ctx = fixture.context();
    let backups = ctx.backups().unwrap();
    let record = backups.snapshot_path(&path, Platform::Codex).unwrap();
    fs::write(ctx.backup_dir().unwrap().join("19990101-000000-00000000.json"), "garbage").unwrap();

    assert_eq!(backups.list().unwrap().len(), 1);
    let removed = backups.prune(30, Utc::now() + Duration::days(31)).unwrap();
    assert_eq!(removed, vec![record.id]);
}
