//! Pairing skills across platforms for compare and dedupe.

use std::cmp::Ordering;

use itertools::Itertools;
use rayon::prelude::*;
use serde::Serialize;

use super::diff::{DiffHunk, diff_text};
use super::name::NameAlgorithm;
use crate::config::SimilarityConfig;
use crate::core::Skill;

/// Scores and hunks for one pair of skills.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub skill_a: Skill,
    pub skill_b: Skill,
    pub name_score: f64,
    pub content_score: f64,
    pub lines_added: usize,
    pub lines_removed: usize,
    pub hunks: Vec<DiffHunk>,
}

impl ComparisonResult {
    #[must_use]
    pub fn best_score(&self) -> f64 {
        self.name_score.max(self.content_score)
    }
}

/// Name algorithm plus the pairing thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityEngine {
    pub algorithm: NameAlgorithm,
    pub name_threshold: f64,
    pub content_threshold: f64,
}

impl Default for SimilarityEngine {
    fn default() -> Self {
        Self::from_config(&SimilarityConfig::default())
    }
}

impl SimilarityEngine {
    #[must_use]
    pub const fn from_config(config: &SimilarityConfig) -> Self {
        Self {
            algorithm: config.algorithm,
            name_threshold: config.name_threshold,
            content_threshold: config.content_threshold,
        }
    }

    /// One threshold for both scores: the `max(name, content) >= t` rule.
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f64) -> Self {
        self.name_threshold = threshold;
        self.content_threshold = threshold;
        self
    }

    #[must_use]
    pub const fn with_algorithm(mut self, algorithm: NameAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    #[must_use]
    pub fn name_similarity(&self, a: &str, b: &str) -> f64 {
        self.algorithm.score(a, b)
    }

    /// Content score of `source` against `target`.
    #[must_use]
    pub fn content_similarity(&self, source: &str, target: &str) -> f64 {
        diff_text(source, target).content_score()
    }

    /// Skill-level similarity: the better of name and content score.
    #[must_use]
    pub fn similarity(&self, a: &Skill, b: &Skill) -> f64 {
        self.compare(a, b).best_score()
    }

    /// Full comparison; the diff runs from `a` (source) to `b` (target).
    #[must_use]
    pub fn compare(&self, a: &Skill, b: &Skill) -> ComparisonResult {
        let diff = diff_text(&a.content, &b.content);
        ComparisonResult {
            name_score: self.name_similarity(&a.name, &b.name),
            content_score: diff.content_score(),
            lines_added: diff.lines_added,
            lines_removed: diff.lines_removed,
            hunks: diff.hunks,
            skill_a: a.clone(),
            skill_b: b.clone(),
        }
    }

    #[must_use]
    pub fn qualifies(&self, result: &ComparisonResult) -> bool {
        result.name_score >= self.name_threshold || result.content_score >= self.content_threshold
    }

    /// Cross-platform pairs from `a` x `b` that clear a threshold.
    ///
    /// Each unordered pair appears once. Sorted by content score, then name
    /// score (both descending), then `skill_a.name`.
    #[must_use]
    pub fn match_pairs(&self, a: &[Skill], b: &[Skill]) -> Vec<ComparisonResult> {
        let pairs: Vec<(&Skill, &Skill)> = a
            .iter()
            .cartesian_product(b)
            .filter(|(left, right)| left.platform != right.platform)
            .unique_by(|(left, right)| {
                let (lk, rk) = (left.skill_key(), right.skill_key());
                if lk <= rk { (lk, rk) } else { (rk, lk) }
            })
            .collect();

        let mut results: Vec<ComparisonResult> = pairs
            .par_iter()
            .map(|(left, right)| self.compare(left, right))
            .filter(|result| self.qualifies(result))
            .collect();
        results.sort_by(compare_ranking);
        results
    }

    /// Cross-platform duplicates within one set.
    #[must_use]
    pub fn find_duplicates(&self, skills: &[Skill]) -> Vec<ComparisonResult> {
        self.match_pairs(skills, skills)
    }
}

fn compare_ranking(x: &ComparisonResult, y: &ComparisonResult) -> Ordering {
    y.content_score
        .total_cmp(&x.content_score)
        .then_with(|| y.name_score.total_cmp(&x.name_score))
        .then_with(|| x.skill_a.name.cmp(&y.skill_a.name))
        .then_with(|| x.skill_b.name.cmp(&y.skill_b.name))
        .then_with(|| x.skill_a.skill_key().cmp(&y.skill_a.skill_key()))
        .then_with(|| x.skill_b.skill_key().cmp(&y.skill_b.skill_key()))
}
