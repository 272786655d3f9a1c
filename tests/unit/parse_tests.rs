use std::path::Path;

use skillsync::core::{Platform, Scope};
use skillsync::error::{ErrorKind, SkillsyncError};
use skillsync::parser::name_from_path;
use skillsync::similarity::{NameAlgorithm, levenshtein_distance};
use skillsync::sync::Strategy;
use skillsync::test_utils::{TestCase, run_table_tests};

#[test]
fn platform_names_and_aliases() {
    let cases = vec![
        TestCase::new("canonical claude", "claude-code", Some(Platform::ClaudeCode)),
        TestCase::new("short claude", "cc", Some(Platform::ClaudeCode)),
        TestCase::new("mixed case", "Cursor", Some(Platform::Cursor)),
        TestCase::new("padded", "  codex ", Some(Platform::Codex)),
        TestCase::new("unknown", "vscode", None),
    ];
    run_table_tests(cases, |input: &str| input.parse::<Platform>().ok()).unwrap();
}

#[test]
fn scope_names_and_aliases() {
    let cases = vec![
        TestCase::new("project", "project", Some(Scope::Repo)),
        TestCase::new("global", "global", Some(Scope::User)),
        TestCase::new("built-in", "built-in", Some(Scope::Builtin)),
        TestCase::new("unknown", "team", None),
    ];
    run_table_tests(cases, |input: &str| input.parse::<Scope>().ok()).unwrap();
}

#[test]
fn strategy_names() {
    let cases = vec![
        TestCase::new("overwrite", "overwrite", Some(Strategy::Overwrite)),
        TestCase::new("snake three way", "three_way", Some(Strategy::ThreeWay)),
        TestCase::new("joined three way", "threeway", Some(Strategy::ThreeWay)),
        TestCase::new("interactive", "INTERACTIVE", Some(Strategy::Interactive)),
        TestCase::new("unknown", "union", None),
    ];
    run_table_tests(cases, |input: &str| input.parse::<Strategy>().ok()).unwrap();
}

#[test]
fn levenshtein_distances() {
    let cases = vec![
        TestCase::new("classic", ("kitten", "sitting"), 3),
        TestCase::new("empty left", ("", "abc"), 3),
        TestCase::new("same", ("sync", "sync"), 0),
        TestCase::new("one insert", ("http-client", "https-client"), 1),
    ];
    run_table_tests(cases, |(a, b): (&str, &str)| levenshtein_distance(a, b)).unwrap();
}

#[test]
fn name_scores_ignore_case_and_padding() {
    for algorithm in [
        NameAlgorithm::Levenshtein,
        NameAlgorithm::JaroWinkler,
        NameAlgorithm::Combined,
    ] {
        let score = algorithm.score(" Deploy ", "deploy");
        assert!((score - 1.0).abs() < f64::EPSILON, "{algorithm}: {score}");
        assert!(algorithm.score("abc", "xyz") < 0.01, "{algorithm}");
    }
}

#[test]
fn names_derive_from_paths() {
    let cases = vec![
        TestCase::new("directory skill", "/r/.claude/skills/alpha/SKILL.md", Some("alpha".to_string())),
        TestCase::new("lowercase skill file", "/r/.codex/skills/beta/skill.md", Some("beta".to_string())),
        TestCase::new("single file", "/r/.cursor/skills/gamma.md", Some("gamma".to_string())),
    ];
    run_table_tests(cases, |input: &str| name_from_path(Path::new(input))).unwrap();
}

#[test]
fn error_exit_codes() {
    let cases = vec![
        TestCase::new("usage", "usage", 2u8),
        TestCase::new("config", "config", 2),
        TestCase::new("conflict", "conflict", 4),
        TestCase::new("missing skill", "not-found", 3),
        TestCase::new("read-only scope", "scope", 3),
    ];
    run_table_tests(cases, |input: &str| {
        let err = match input {
            "usage" => SkillsyncError::Usage("x".into()),
            "config" => SkillsyncError::Config("x".into()),
            "conflict" => SkillsyncError::Conflict {
                skills: vec!["alpha".into()],
            },
            "scope" => SkillsyncError::ScopeViolation {
                scope: Scope::Admin,
                operation: "write".into(),
            },
            _ => SkillsyncError::SkillNotFound("alpha".into()),
        };
        err.exit_code()
    })
    .unwrap();
    assert_eq!(SkillsyncError::Usage("x".into()).kind(), ErrorKind::Usage);
}
