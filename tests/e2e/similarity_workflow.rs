//! E2E Scenario: name similarity and diff hunks.

use skillsync::core::{Platform, Scope, Skill};
use skillsync::similarity::{DiffLineType, NameAlgorithm, SimilarityEngine, diff_text};

fn skill(name: &str, platform: Platform, content: &str) -> Skill {
    Skill::new(name, platform, Scope::User, format!("/{name}.md"), content)
}

#[test]
fn combined_name_scores() {
    let algorithm = NameAlgorithm::Combined;
    assert!((algorithm.score("http-client", "http-client") - 1.0).abs() < f64::EPSILON);

    let close = algorithm.score("http-client", "https-client");
    assert!(close > 0.85 && close <= 0.95 + 1e-9, "got {close}");

    // Jaro 0.4773 (no prefix boost) averaged with Levenshtein 2/11.
    let far = algorithm.score("http-client", "database");
    assert!((far - 0.329_545).abs() < 1e-5, "got {far}");
    assert!(far < algorithm.score("http-client", "web-client"));
}

#[test]
fn single_line_change_hunk() {
    let diff = diff_text("one\ntwo\nthree\n", "one\nTWO\nthree\n");
    assert_eq!(diff.hunks.len(), 1);
    let hunk = &diff.hunks[0];
    assert_eq!(
        (hunk.source_start, hunk.source_count, hunk.target_start, hunk.target_count),
        (2, 1, 2, 1)
    );
    let changed: Vec<(DiffLineType, &str)> = hunk
        .lines
        .iter()
        .filter(|l| l.line_type != DiffLineType::Context)
        .map(|l| (l.line_type, l.content.as_str()))
        .collect();
    assert_eq!(
        changed,
        vec![(DiffLineType::Removed, "two"), (DiffLineType::Added, "TWO")]
    );
    assert_eq!((diff.lines_added, diff.lines_removed), (1, 1));
    assert!((diff.content_score() - (1.0 - 2.0 / 6.0)).abs() < 1e-9);
}

#[test]
fn compare_and_dedupe_pair_across_platforms() {
    let engine = SimilarityEngine::default();
    let claude = vec![
        skill("http-client", Platform::ClaudeCode, "Use reqwest.\nRetry twice.\n"),
        skill("database", Platform::ClaudeCode, "Use sqlite.\n"),
    ];
    let codex = vec![skill("https-client", Platform::Codex, "Use reqwest.\nRetry twice.\n")];

    let pairs = engine.match_pairs(&claude, &codex);
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].skill_a.name, "http-client");
    assert_eq!(pairs[0].skill_b.name, "https-client");
    assert!((pairs[0].content_score - 1.0).abs() < f64::EPSILON);

    let mut everything = claude;
    everything.extend(codex);
    let dupes = engine.find_duplicates(&everything);
    assert_eq!(dupes.len(), 1);
}

#[test]
fn similarity_is_symmetric_and_reflexive() {
    let engine = SimilarityEngine::default();
    let a = skill("lint-rules", Platform::Cursor, "a\nb\nc\n");
    let b = skill("lint-rule", Platform::Codex, "a\nc\nd\n");
    assert!((engine.similarity(&a, &b) - engine.similarity(&b, &a)).abs() < 1e-12);
    assert!((engine.similarity(&a, &a) - 1.0).abs() < f64::EPSILON);
}
