//! Line-level LCS diff with context hunks.

use serde::{Deserialize, Serialize};

use crate::core::normalize_line_endings;

/// Context lines kept on each side of a change.
pub const DEFAULT_CONTEXT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffLineType {
    Added,
    Removed,
    Context,
}

impl DiffLineType {
    #[must_use]
    pub const fn marker(self) -> char {
        match self {
            Self::Added => '+',
            Self::Removed => '-',
            Self::Context => ' ',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    #[serde(rename = "type")]
    pub line_type: DiffLineType,
    pub content: String,
}

impl DiffLine {
    fn new(line_type: DiffLineType, content: &str) -> Self {
        Self {
            line_type,
            content: content.to_string(),
        }
    }
}

/// One block of changes.
///
/// `(start, count)` pairs are 1-based and span the changed lines (plus any
/// context between merged changes); `lines` also carries the surrounding
/// context. An empty range starts at the line preceding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffHunk {
    pub source_start: usize,
    pub source_count: usize,
    pub target_start: usize,
    pub target_count: usize,
    pub lines: Vec<DiffLine>,
}

impl DiffHunk {
    #[must_use]
    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.source_start, self.source_count, self.target_start, self.target_count
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    pub hunks: Vec<DiffHunk>,
    pub lines_added: usize,
    pub lines_removed: usize,
    pub source_lines: usize,
    pub target_lines: usize,
}

impl DiffResult {
    #[must_use]
    pub const fn is_identical(&self) -> bool {
        self.lines_added == 0 && self.lines_removed == 0
    }

    /// `1 - (added + removed) / (2 * max(source, target, 1))`, clamped to `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn content_score(&self) -> f64 {
        let denom = 2 * self.source_lines.max(self.target_lines).max(1);
        let changed = self.lines_added + self.lines_removed;
        (1.0 - changed as f64 / denom as f64).clamp(0.0, 1.0)
    }

    /// Unified-style text rendering.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for hunk in &self.hunks {
            out.push_str(&hunk.header());
            out.push('\n');
            for line in &hunk.lines {
                out.push(line.line_type.marker());
                out.push_str(&line.content);
                out.push('\n');
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Equal(usize),
    Delete(usize),
    Insert(usize),
}

impl Op {
    const fn is_change(self) -> bool {
        !matches!(self, Self::Equal(_))
    }

    const fn consumes_source(self) -> bool {
        matches!(self, Self::Equal(_) | Self::Delete(_))
    }

    const fn consumes_target(self) -> bool {
        matches!(self, Self::Equal(_) | Self::Insert(_))
    }
}

/// Split on `\n` after normalizing line endings; a trailing newline does
/// not produce an extra empty line.
#[must_use]
pub fn split_lines(text: &str) -> Vec<String> {
    let normalized = normalize_line_endings(text);
    if normalized.is_empty() {
        return Vec::new();
    }
    let body = normalized.strip_suffix('\n').unwrap_or(&normalized);
    body.split('\n').map(str::to_string).collect()
}

/// Diff `source` against `target` with [`DEFAULT_CONTEXT`] lines of context.
#[must_use]
pub fn diff_text(source: &str, target: &str) -> DiffResult {
    diff_text_with_context(source, target, DEFAULT_CONTEXT)
}

#[must_use]
pub fn diff_text_with_context(source: &str, target: &str, context: usize) -> DiffResult {
    let src = split_lines(source);
    let tgt = split_lines(target);
    diff_lines(&src, &tgt, context)
}

#[must_use]
pub fn diff_lines(src: &[String], tgt: &[String], context: usize) -> DiffResult {
    let ops = lcs_ops(src, tgt);
    let lines_removed = ops.iter().filter(|op| matches!(op, Op::Delete(_))).count();
    let lines_added = ops.iter().filter(|op| matches!(op, Op::Insert(_))).count();

    DiffResult {
        hunks: build_hunks(&ops, src, tgt, context),
        lines_added,
        lines_removed,
        source_lines: src.len(),
        target_lines: tgt.len(),
    }
}

/// Lines common to both sides in LCS order.
#[must_use]
pub fn common_lines(src: &[String], tgt: &[String]) -> Vec<String> {
    lcs_ops(src, tgt)
        .into_iter()
        .filter_map(|op| match op {
            Op::Equal(i) => Some(src[i].clone()),
            _ => None,
        })
        .collect()
}

fn lcs_ops(src: &[String], tgt: &[String]) -> Vec<Op> {
    let prefix = src
        .iter()
        .zip(tgt)
        .take_while(|(a, b)| a == b)
        .count();
    let suffix = src[prefix..]
        .iter()
        .rev()
        .zip(tgt[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let a = &src[prefix..src.len() - suffix];
    let b = &tgt[prefix..tgt.len() - suffix];
    let (n, m) = (a.len(), b.len());

    // table[i][j] = LCS length of a[i..] and b[j..]
    let width = m + 1;
    let mut table = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i * width + j] = if a[i] == b[j] {
                table[(i + 1) * width + j + 1] + 1
            } else {
                table[(i + 1) * width + j].max(table[i * width + j + 1])
            };
        }
    }

    let mut ops: Vec<Op> = (0..prefix).map(Op::Equal).collect();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            ops.push(Op::Equal(prefix + i));
            i += 1;
            j += 1;
        } else if table[(i + 1) * width + j] >= table[i * width + j + 1] {
            ops.push(Op::Delete(prefix + i));
            i += 1;
        } else {
            ops.push(Op::Insert(prefix + j));
            j += 1;
        }
    }
    ops.extend((i..n).map(|k| Op::Delete(prefix + k)));
    ops.extend((j..m).map(|k| Op::Insert(prefix + k)));
    ops.extend((src.len() - suffix..src.len()).map(Op::Equal));
    ops
}

fn build_hunks(ops: &[Op], src: &[String], tgt: &[String], context: usize) -> Vec<DiffHunk> {
    let change_idx: Vec<usize> = ops
        .iter()
        .enumerate()
        .filter(|(_, op)| op.is_change())
        .map(|(idx, _)| idx)
        .collect();
    let Some(&first) = change_idx.first() else {
        return Vec::new();
    };

    // Group changes whose context windows touch or overlap.
    let mut groups: Vec<(usize, usize)> = Vec::new();
    let (mut start, mut end) = (first, first);
    for &idx in &change_idx[1..] {
        if idx - end - 1 <= 2 * context {
            end = idx;
        } else {
            groups.push((start, end));
            start = idx;
            end = idx;
        }
    }
    groups.push((start, end));

    groups
        .into_iter()
        .map(|(start, end)| {
            let src_before = ops[..start].iter().filter(|op| op.consumes_source()).count();
            let tgt_before = ops[..start].iter().filter(|op| op.consumes_target()).count();
            let span = &ops[start..=end];
            let source_count = span.iter().filter(|op| op.consumes_source()).count();
            let target_count = span.iter().filter(|op| op.consumes_target()).count();

            let lo = start.saturating_sub(context);
            let hi = (end + context).min(ops.len() - 1);
            let lines = ops[lo..=hi]
                .iter()
                .map(|op| match *op {
                    Op::Equal(i) => DiffLine::new(DiffLineType::Context, &src[i]),
                    Op::Delete(i) => DiffLine::new(DiffLineType::Removed, &src[i]),
                    Op::Insert(j) => DiffLine::new(DiffLineType::Added, &tgt[j]),
                })
                .collect();

            DiffHunk {
                source_start: if source_count > 0 { src_before + 1 } else { src_before },
                source_count,
                target_start: if target_count > 0 { tgt_before + 1 } else { tgt_before },
                target_count,
                lines,
            }
        })
        .collect()
}
