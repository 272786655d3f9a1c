//! Name and content similarity, line diffs and cross-platform matching.

pub mod diff;
pub mod matching;
pub mod name;

pub use diff::{
    DEFAULT_CONTEXT, DiffHunk, DiffLine, DiffLineType, DiffResult, common_lines, diff_lines,
    diff_text, split_lines,
};
pub use matching::{ComparisonResult, SimilarityEngine};
pub use name::{NameAlgorithm, jaro, jaro_winkler, levenshtein_distance, levenshtein_similarity};
