//! Deterministic line merges.

use crate::similarity::{DiffLineType, common_lines, diff_lines, split_lines};

pub const SOURCE_MARKER: &str = "<<<<<<< source";
pub const SEPARATOR: &str = "=======";
pub const TARGET_MARKER: &str = ">>>>>>> target";

/// Outcome of a three-way attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreeWayOutcome {
    /// Both sides changed; carries the marker-merged text.
    Merged(String),
    /// At most one side changed; carries the plain mechanical merge.
    Fallback(String),
    /// The two sides share no lines.
    NoAncestor,
}

/// Union of `source` and `target` with conflict markers around every
/// changed block. Output is LF-terminated.
#[must_use]
pub fn mechanical_merge(source: &str, target: &str) -> String {
    let src = split_lines(source);
    let tgt = split_lines(target);
    let diff = diff_lines(&src, &tgt, usize::MAX / 4);

    let mut out: Vec<String> = Vec::with_capacity(src.len() + tgt.len());
    let Some(hunk) = diff.hunks.first() else {
        return join(&src);
    };

    // With unbounded context there is exactly one hunk spanning everything.
    let mut removed: Vec<&str> = Vec::new();
    let mut added: Vec<&str> = Vec::new();
    for line in &hunk.lines {
        match line.line_type {
            DiffLineType::Context => {
                flush_block(&mut out, &mut removed, &mut added);
                out.push(line.content.clone());
            }
            DiffLineType::Removed => removed.push(&line.content),
            DiffLineType::Added => added.push(&line.content),
        }
    }
    flush_block(&mut out, &mut removed, &mut added);
    join(&out)
}

/// Merge against the implicit ancestor formed by the lines both sides share.
#[must_use]
pub fn three_way_merge(source: &str, target: &str) -> ThreeWayOutcome {
    let src = split_lines(source);
    let tgt = split_lines(target);
    let ancestor = common_lines(&src, &tgt);
    if ancestor.is_empty() {
        return ThreeWayOutcome::NoAncestor;
    }

    let merged = mechanical_merge(source, target);
    if src != ancestor && tgt != ancestor {
        ThreeWayOutcome::Merged(merged)
    } else {
        ThreeWayOutcome::Fallback(merged)
    }
}

fn flush_block(out: &mut Vec<String>, removed: &mut Vec<&str>, added: &mut Vec<&str>) {
    if removed.is_empty() && added.is_empty() {
        return;
    }
    out.push(SOURCE_MARKER.to_string());
    out.extend(removed.drain(..).map(str::to_string));
    out.push(SEPARATOR.to_string());
    out.extend(added.drain(..).map(str::to_string));
    out.push(TARGET_MARKER.to_string());
}

fn join(lines: &[impl AsRef<str>]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(line.as_ref());
        out.push('\n');
    }
    out
}
