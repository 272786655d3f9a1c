//! E2E Scenario: tiered discovery and precedence collapse.

use skillsync::core::{Platform, Scope};
use skillsync::discovery::DiscoveryOptions;
use skillsync::error::ErrorKind;
use skillsync::test_utils::UnitTestFixture;

#[test]
fn repo_copy_shadows_user_copy() {
    let fixture = UnitTestFixture::new();
    let _ = fixture.write_skill_dir(Platform::ClaudeCode, Scope::User, "alpha", "A");
    let _ = fixture.write_skill_dir(Platform::ClaudeCode, Scope::Repo, "alpha", "B");
    let engine = fixture.engine();

    let collapsed = engine
        .discover(&[Platform::ClaudeCode], &fixture.work_dir, &DiscoveryOptions::default())
        .unwrap();
    assert_eq!(collapsed.skills.len(), 1);
    let alpha = &collapsed.skills[0];
    assert_eq!(alpha.name, "alpha");
    assert_eq!(alpha.scope, Scope::Repo);
    assert_eq!(alpha.content, "B");

    let all = engine
        .discover(&[Platform::ClaudeCode], &fixture.work_dir, &DiscoveryOptions::all_scopes())
        .unwrap();
    assert_eq!(all.skills.len(), 2);
    assert_eq!(all.skills[0].scope, Scope::Repo);
    assert_eq!(all.skills[1].scope, Scope::User);
}

#[test]
fn keys_are_unique_and_order_is_stable() {
    let fixture = UnitTestFixture::new();
    for name in ["zeta", "Beta", "alpha"] {
        let _ = fixture.write_skill(Platform::Cursor, Scope::User, name, &format!("# {name}\n"));
        let _ = fixture.write_skill(Platform::Codex, Scope::User, name, &format!("# {name}\n"));
    }
    let engine = fixture.engine();
    let first = engine
        .discover(&Platform::ALL, &fixture.work_dir, &DiscoveryOptions::default())
        .unwrap();
    let second = engine
        .discover(&Platform::ALL, &fixture.work_dir, &DiscoveryOptions::default())
        .unwrap();

    let keys: Vec<String> = first.skills.iter().map(|s| s.skill_key()).collect();
    assert_eq!(
        keys,
        vec![
            "codex:user:alpha",
            "codex:user:Beta",
            "codex:user:zeta",
            "cursor:user:alpha",
            "cursor:user:Beta",
            "cursor:user:zeta",
        ]
    );
    let again: Vec<String> = second.skills.iter().map(|s| s.skill_key()).collect();
    assert_eq!(keys, again);
}

#[test]
fn bad_files_become_warnings() {
    let fixture = UnitTestFixture::new();
    let _ = fixture.write_skill(Platform::Cursor, Scope::User, "good", "# Good\n");
    let _ = fixture.write_skill(Platform::Cursor, Scope::User, "empty", "");
    let _ = fixture.write_skill(Platform::Cursor, Scope::User, "broken", "---\ndescription: x\n");

    let found = fixture
        .engine()
        .discover(&[Platform::Cursor], &fixture.work_dir, &DiscoveryOptions::default())
        .unwrap();
    assert_eq!(found.skills.len(), 1);
    assert_eq!(found.skills[0].name, "good");

    let mut kinds: Vec<ErrorKind> = found.warnings.iter().map(|w| w.kind).collect();
    kinds.sort_by_key(|k| k.as_str());
    assert_eq!(kinds, vec![ErrorKind::NotASkill, ErrorKind::Parse]);
}

#[test]
fn scope_filter_limits_tiers() {
    let fixture = UnitTestFixture::new();
    let _ = fixture.write_skill(Platform::Codex, Scope::User, "mine", "user\n");
    let _ = fixture.write_skill(Platform::Codex, Scope::Repo, "ours", "repo\n");

    let found = fixture
        .engine()
        .discover(
            &[Platform::Codex],
            &fixture.work_dir,
            &DiscoveryOptions::default().with_scopes([Scope::Repo]),
        )
        .unwrap();
    let names: Vec<&str> = found.skills.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["ours"]);
}
