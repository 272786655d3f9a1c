//! Name similarity scores.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SkillsyncError;

/// Jaro-Winkler prefix scale.
const PREFIX_SCALE: f64 = 0.1;
/// Jaro score above which the prefix bonus applies.
const BOOST_THRESHOLD: f64 = 0.7;
const MAX_PREFIX: usize = 4;

/// Name-similarity function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameAlgorithm {
    Levenshtein,
    JaroWinkler,
    #[default]
    Combined,
}

impl NameAlgorithm {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Levenshtein => "levenshtein",
            Self::JaroWinkler => "jaro-winkler",
            Self::Combined => "combined",
        }
    }

    /// Score two names in `[0, 1]`; inputs are trimmed and lowercased.
    #[must_use]
    pub fn score(self, a: &str, b: &str) -> f64 {
        let a = a.trim().to_lowercase();
        let b = b.trim().to_lowercase();
        match self {
            Self::Levenshtein => levenshtein_similarity(&a, &b),
            Self::JaroWinkler => jaro_winkler(&a, &b),
            Self::Combined => 0.5f64.mul_add(jaro_winkler(&a, &b), 0.5 * levenshtein_similarity(&a, &b)),
        }
    }
}

impl fmt::Display for NameAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NameAlgorithm {
    type Err = SkillsyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "levenshtein" => Ok(Self::Levenshtein),
            "jaro-winkler" | "jarowinkler" => Ok(Self::JaroWinkler),
            "combined" => Ok(Self::Combined),
            other => Err(SkillsyncError::Usage(format!(
                "unknown similarity algorithm '{other}' (expected levenshtein|jaro-winkler|combined)"
            ))),
        }
    }
}

/// Levenshtein distance over chars.
#[must_use]
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// `1 - d / max(|a|, |b|)`, counted in chars.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn levenshtein_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let dist = levenshtein_distance(a, b);
    1.0 - (dist as f64 / max_len as f64)
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn jaro(a: &str, b: &str) -> f64 {
    // Greedy matching depends on argument order; fix it so jaro(a, b) == jaro(b, a).
    let (a, b) = if a <= b { (a, b) } else { (b, a) };
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let window = (a.len().max(b.len()) / 2).saturating_sub(1);
    let mut a_matched = vec![false; a.len()];
    let mut b_matched = vec![false; b.len()];
    let mut matches = 0usize;

    for (i, ca) in a.iter().enumerate() {
        let lo = i.saturating_sub(window);
        let hi = (i + window + 1).min(b.len());
        for j in lo..hi {
            if !b_matched[j] && b[j] == *ca {
                a_matched[i] = true;
                b_matched[j] = true;
                matches += 1;
                break;
            }
        }
    }
    if matches == 0 {
        return 0.0;
    }

    let a_seq = a.iter().zip(&a_matched).filter(|(_, m)| **m).map(|(c, _)| c);
    let b_seq = b.iter().zip(&b_matched).filter(|(_, m)| **m).map(|(c, _)| c);
    let half_transpositions = a_seq.zip(b_seq).filter(|(x, y)| x != y).count();

    let m = matches as f64;
    let t = (half_transpositions / 2) as f64;
    (m / a.len() as f64 + m / b.len() as f64 + (m - t) / m) / 3.0
}

/// Jaro-Winkler with prefix scale 0.1, prefix up to 4, boost above 0.7.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn jaro_winkler(a: &str, b: &str) -> f64 {
    let jaro = jaro(a, b);
    if jaro <= BOOST_THRESHOLD {
        return jaro;
    }
    let prefix = a
        .chars()
        .zip(b.chars())
        .take(MAX_PREFIX)
        .take_while(|(x, y)| x == y)
        .count();
    (prefix as f64 * PREFIX_SCALE).mul_add(1.0 - jaro, jaro).min(1.0)
}
