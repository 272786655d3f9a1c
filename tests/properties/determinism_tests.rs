use proptest::prelude::*;

use skillsync::similarity::{NameAlgorithm, diff_text};

fn algorithm() -> impl Strategy<Value = NameAlgorithm> {
    prop::sample::select(vec![
        NameAlgorithm::Levenshtein,
        NameAlgorithm::JaroWinkler,
        NameAlgorithm::Combined,
    ])
}

fn document() -> impl Strategy<Value = String> {
    prop::collection::vec("[abc]{0,3}", 0..12).prop_map(|lines| lines.join("\n"))
}

proptest! {
    #[test]
    fn test_name_score_bounded(a in "[a-z-]{0,16}", b in "[a-z-]{0,16}", algo in algorithm()) {
        let score = algo.score(&a, &b);
        prop_assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn test_name_score_symmetric(a in "[a-z-]{0,16}", b in "[a-z-]{0,16}", algo in algorithm()) {
        let forward = algo.score(&a, &b);
        let backward = algo.score(&b, &a);
        prop_assert!((forward - backward).abs() < 1e-12);
    }

    #[test]
    fn test_name_score_reflexive(a in "[a-z-]{0,16}", algo in algorithm()) {
        prop_assert!((algo.score(&a, &a) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_diff_deterministic(a in document(), b in document()) {
        prop_assert_eq!(diff_text(&a, &b), diff_text(&a, &b));
    }

    #[test]
    fn test_diff_counts_balance(a in document(), b in document()) {
        let diff = diff_text(&a, &b);
        prop_assert_eq!(
            diff.source_lines + diff.lines_added,
            diff.target_lines + diff.lines_removed
        );
        let score = diff.content_score();
        prop_assert!((0.0..=1.0).contains(&score));
        prop_assert_eq!(diff.is_identical(), diff.hunks.is_empty());
    }

    #[test]
    fn test_self_diff_is_identical(a in document()) {
        let diff = diff_text(&a, &a);
        prop_assert!(diff.is_identical());
        prop_assert!((diff.content_score() - 1.0).abs() < f64::EPSILON);
    }
}
