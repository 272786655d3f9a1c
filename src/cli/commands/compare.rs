//! skillsync compare / diff / dedupe - Similarity across platforms

use std::collections::BTreeSet;

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::colors::{ColorSupport, Styles, styled, with_color};
use crate::cli::commands::{CommandStatus, find_skill, parse_skill_ref, platforms_or_all, warning_messages};
use crate::cli::output::{HumanLayout, emit_human, emit_json, robot_ok};
use crate::core::{Platform, Skill};
use crate::error::{Result, SkillsyncError};
use crate::similarity::{ComparisonResult, NameAlgorithm, SimilarityEngine};
use crate::utils::format_percent;

#[derive(Args, Debug)]
pub struct CompareArgs {
    pub platform_a: Platform,
    pub platform_b: Platform,

    /// One threshold for both name and content scores
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Name similarity algorithm
    #[arg(long)]
    pub algorithm: Option<NameAlgorithm>,
}

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Source skill as platform:name
    pub source: String,

    /// Target skill as platform:name
    pub target: String,
}

#[derive(Args, Debug)]
pub struct DedupeArgs {
    /// Platforms to scan (default: all)
    #[arg(long, short)]
    pub platform: Vec<Platform>,

    #[arg(long)]
    pub threshold: Option<f64>,

    #[arg(long)]
    pub algorithm: Option<NameAlgorithm>,
}

#[derive(Serialize)]
struct PairSummary<'a> {
    a: String,
    b: String,
    name_score: f64,
    content_score: f64,
    lines_added: usize,
    lines_removed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    hunks: Option<&'a [crate::similarity::DiffHunk]>,
}

impl<'a> PairSummary<'a> {
    fn new(result: &'a ComparisonResult, with_hunks: bool) -> Self {
        Self {
            a: result.skill_a.skill_key(),
            b: result.skill_b.skill_key(),
            name_score: result.name_score,
            content_score: result.content_score,
            lines_added: result.lines_added,
            lines_removed: result.lines_removed,
            hunks: with_hunks.then_some(result.hunks.as_slice()),
        }
    }
}

#[derive(Serialize)]
struct CompareReport<'a> {
    pairs: Vec<PairSummary<'a>>,
    only_in_a: Vec<&'a str>,
    only_in_b: Vec<&'a str>,
}

fn engine(ctx: &AppContext, threshold: Option<f64>, algorithm: Option<NameAlgorithm>) -> Result<SimilarityEngine> {
    let mut engine = ctx.similarity;
    if let Some(threshold) = threshold {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(SkillsyncError::Usage(format!(
                "--threshold must be within 0..=1, got {threshold}"
            )));
        }
        engine = engine.with_threshold(threshold);
    }
    if let Some(algorithm) = algorithm {
        engine = engine.with_algorithm(algorithm);
    }
    Ok(engine)
}

pub fn run_compare(ctx: &AppContext, args: &CompareArgs) -> Result<CommandStatus> {
    if args.platform_a == args.platform_b {
        return Err(SkillsyncError::Usage(
            "compare needs two different platforms".to_string(),
        ));
    }
    let engine = engine(ctx, args.threshold, args.algorithm)?;
    let found = ctx.discover(&[args.platform_a, args.platform_b], &ctx.discovery_options())?;
    let side_a = found.for_platform(args.platform_a);
    let side_b = found.for_platform(args.platform_b);
    let pairs = engine.match_pairs(&side_a, &side_b);

    let report = CompareReport {
        pairs: pairs.iter().map(|p| PairSummary::new(p, false)).collect(),
        only_in_a: unmatched(&side_a, &side_b),
        only_in_b: unmatched(&side_b, &side_a),
    };

    if ctx.robot_mode {
        emit_json(&robot_ok(&report).with_warnings(warning_messages(&found)))?;
    } else {
        let support = ColorSupport::detect();
        let mut layout = HumanLayout::new();
        layout.title(&format!("{} vs {}", args.platform_a, args.platform_b));
        push_pairs(&mut layout, &pairs, support);
        if !report.only_in_a.is_empty() {
            layout.blank().section(&format!("only on {}", args.platform_a));
            for name in &report.only_in_a {
                layout.bullet(name);
            }
        }
        if !report.only_in_b.is_empty() {
            layout.blank().section(&format!("only on {}", args.platform_b));
            for name in &report.only_in_b {
                layout.bullet(name);
            }
        }
        emit_human(layout);
    }
    Ok(CommandStatus::partial_if(!found.warnings.is_empty()))
}

pub fn run_diff(ctx: &AppContext, args: &DiffArgs) -> Result<CommandStatus> {
    let (platform_a, name_a) = parse_skill_ref(&args.source)?;
    let (platform_b, name_b) = parse_skill_ref(&args.target)?;
    let a = find_skill(ctx, platform_a, &name_a, None)?;
    let b = find_skill(ctx, platform_b, &name_b, None)?;
    let result = ctx.similarity.compare(&a, &b);

    if ctx.robot_mode {
        emit_json(&robot_ok(PairSummary::new(&result, true)))?;
        return Ok(CommandStatus::Success);
    }

    let support = ColorSupport::detect();
    let mut layout = HumanLayout::new();
    layout
        .push_line(format!("--- {}", a.skill_key()))
        .push_line(format!("+++ {}", b.skill_key()));
    if result.hunks.is_empty() {
        layout.push_line(styled("identical content", Styles::muted, support));
    }
    for hunk in &result.hunks {
        layout.push_line(styled(hunk.header(), Styles::muted, support));
        for line in &hunk.lines {
            let text = format!("{}{}", line.line_type.marker(), line.content);
            layout.push_line(with_color(Styles::diff(text, line.line_type), support));
        }
    }
    layout.blank().push_line(format!(
        "name {}  content {}  +{} -{}",
        format_percent(result.name_score),
        format_percent(result.content_score),
        result.lines_added,
        result.lines_removed
    ));
    emit_human(layout);
    Ok(CommandStatus::Success)
}

pub fn run_dedupe(ctx: &AppContext, args: &DedupeArgs) -> Result<CommandStatus> {
    let engine = engine(ctx, args.threshold, args.algorithm)?;
    let platforms = platforms_or_all(&args.platform);
    let found = ctx.discover(&platforms, &ctx.discovery_options())?;
    let duplicates = engine.find_duplicates(&found.skills);

    if ctx.robot_mode {
        let pairs: Vec<PairSummary<'_>> = duplicates.iter().map(|p| PairSummary::new(p, false)).collect();
        emit_json(&robot_ok(pairs).with_warnings(warning_messages(&found)))?;
    } else {
        let support = ColorSupport::detect();
        let mut layout = HumanLayout::new();
        if duplicates.is_empty() {
            layout.push_line("No duplicates found.");
        }
        push_pairs(&mut layout, &duplicates, support);
        emit_human(layout);
    }
    Ok(CommandStatus::partial_if(!found.warnings.is_empty()))
}

fn push_pairs(layout: &mut HumanLayout, pairs: &[ComparisonResult], support: ColorSupport) {
    for pair in pairs {
        layout.push_line(format!(
            "{} <-> {}  name {}  content {}",
            styled(pair.skill_a.skill_key(), Styles::skill_name, support),
            styled(pair.skill_b.skill_key(), Styles::skill_name, support),
            with_color(Styles::score(format_percent(pair.name_score), pair.name_score), support),
            with_color(
                Styles::score(format_percent(pair.content_score), pair.content_score),
                support
            ),
        ));
    }
}

/// Names in `side` with no exact-name counterpart in `other`.
fn unmatched<'a>(side: &'a [Skill], other: &[Skill]) -> Vec<&'a str> {
    let names: BTreeSet<&str> = other.iter().map(|s| s.name.as_str()).collect();
    side.iter()
        .map(|s| s.name.as_str())
        .filter(|name| !names.contains(name))
        .collect()
}
