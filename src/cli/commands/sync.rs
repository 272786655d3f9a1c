//! skillsync sync - Sync skills from one platform to another

use std::io::IsTerminal;

use clap::Args;
use console::Term;
use serde::Serialize;
use tracing::{debug, info};

use crate::app::AppContext;
use crate::cli::colors::{ColorSupport, Styles, styled, with_color};
use crate::cli::commands::CommandStatus;
use crate::cli::output::{HumanLayout, emit_human, emit_json, robot_ok, robot_partial};
use crate::core::{CancelToken, Platform, Scope};
use crate::discovery::DiscoveryOptions;
use crate::error::{Result, SkillsyncError};
use crate::sync::{
    Conflict, ConflictDetector, Resolution, ResolutionChoice, ResolutionMap, Strategy, SyncPlan,
    SyncPlanner, SyncReport, SyncTarget, parse_resolution_arg,
};

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Platform to read skills from
    #[arg(long)]
    pub from: Platform,

    /// Platform to write skills to
    #[arg(long)]
    pub to: Platform,

    /// Target scope (repo or user)
    #[arg(long, short, default_value = "user")]
    pub scope: Scope,

    /// Conflict strategy (default from config)
    #[arg(long)]
    pub strategy: Option<Strategy>,

    /// Resolve one conflict up front: name=source|target|merge|skip
    #[arg(long, value_name = "NAME=CHOICE")]
    pub resolve: Vec<String>,

    /// Show the plan without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Also sync back from the target platform afterwards
    #[arg(long)]
    pub bidirectional: bool,

    /// Replace targets without taking backups
    #[arg(long)]
    pub no_backup: bool,
}

#[derive(Serialize)]
struct SyncPass {
    plan: SyncPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<SyncReport>,
}

pub fn run(ctx: &AppContext, args: &SyncArgs) -> Result<CommandStatus> {
    if args.from == args.to {
        return Err(SkillsyncError::Usage(
            "--from and --to must name different platforms".to_string(),
        ));
    }
    let strategy = args.strategy.unwrap_or(ctx.config.sync.default_strategy);
    let mut resolutions = ResolutionMap::new();
    for raw in &args.resolve {
        let (name, resolution) = parse_resolution_arg(raw)?;
        resolutions.insert(name, resolution);
    }

    let mut passes = vec![run_pass(ctx, args, args.from, args.to, strategy, &mut resolutions)?];
    if args.bidirectional && !args.dry_run && !passes[0].report.as_ref().is_some_and(|r| r.cancelled) {
        debug!("running reverse pass");
        passes.push(run_pass(ctx, args, args.to, args.from, strategy, &mut resolutions)?);
    }

    let failed: usize = passes.iter().filter_map(|p| p.report.as_ref()).map(|r| r.failed).sum();
    let committed: usize = passes.iter().filter_map(|p| p.report.as_ref()).map(|r| r.committed).sum();
    let cancelled = passes.iter().filter_map(|p| p.report.as_ref()).any(|r| r.cancelled);

    if ctx.robot_mode {
        if failed > 0 {
            emit_json(&robot_partial(&passes, committed, failed))?;
        } else {
            emit_json(&robot_ok(&passes))?;
        }
    } else {
        for pass in &passes {
            render_pass(pass, args.dry_run);
        }
    }

    if cancelled {
        return Err(SkillsyncError::Cancelled { completed: committed });
    }
    Ok(CommandStatus::partial_if(failed > 0))
}

fn run_pass(
    ctx: &AppContext,
    args: &SyncArgs,
    from: Platform,
    to: Platform,
    strategy: Strategy,
    resolutions: &mut ResolutionMap,
) -> Result<SyncPass> {
    if !args.scope.is_writable() {
        return Err(SkillsyncError::ScopeViolation {
            scope: args.scope,
            operation: format!("sync into {to}"),
        });
    }
    let sources = ctx.discover(&[from], &ctx.discovery_options())?.skills;
    let existing_options = DiscoveryOptions {
        follow_symlinks: ctx.config.discovery.follow_symlinks,
        ..DiscoveryOptions::all_scopes().with_scopes([args.scope])
    };
    let existing = ctx.discover(&[to], &existing_options)?.skills;
    let target = SyncTarget::new(to, args.scope, ctx.write_root(to, args.scope));

    if strategy == Strategy::Interactive && !ctx.robot_mode && std::io::stdin().is_terminal() {
        let report = ConflictDetector::new(to, args.scope).detect(&sources, &existing);
        for conflict in report.conflicts() {
            if !resolutions.contains_key(&conflict.skill_name) {
                let choice = prompt_resolution(conflict)?;
                resolutions.insert(conflict.skill_name.clone(), choice.into());
            }
        }
    }

    let planner = SyncPlanner::new(strategy)
        .with_resolutions(resolutions.clone())
        .with_bidirectional(args.bidirectional)
        .with_backup(!args.no_backup);
    let plan = planner.plan(&sources, &target, &existing)?;
    info!(from = %from, to = %to, entries = plan.entries.len(), "plan built");

    let report = if args.dry_run {
        None
    } else {
        let executor = ctx.executor()?;
        Some(executor.apply(&plan, &ctx.execute_options(CancelToken::new()))?)
    };
    Ok(SyncPass { plan, report })
}

/// Ask on the terminal how to resolve one conflict.
fn prompt_resolution(conflict: &Conflict) -> Result<Resolution> {
    let term = Term::stderr();
    let support = ColorSupport::detect();
    let io_err = |err| SkillsyncError::io("<terminal>", err);

    term.write_line(&format!(
        "\n{} {} ({} conflict)",
        styled("conflict:", Styles::warning, support),
        styled(&conflict.skill_name, |s| Styles::skill_name(s), support),
        conflict.conflict_type.as_str()
    ))
    .map_err(io_err)?;
    for hunk in &conflict.hunks {
        term.write_line(&hunk.header()).map_err(io_err)?;
        for line in &hunk.lines {
            let text = format!("{}{}", line.line_type.marker(), line.content);
            term.write_line(&with_color(Styles::diff(text, line.line_type), support))
                .map_err(io_err)?;
        }
    }

    loop {
        term.write_str("[s]ource, [t]arget, [m]erge, s[k]ip? ").map_err(io_err)?;
        let answer = term.read_line().map_err(io_err)?;
        match answer.parse::<ResolutionChoice>() {
            Ok(choice) => return Ok(choice.into()),
            Err(err) => term.write_line(&err.to_string()).map_err(io_err)?,
        }
    }
}

fn render_pass(pass: &SyncPass, dry_run: bool) {
    let support = ColorSupport::detect();
    let plan = &pass.plan;
    let mut layout = HumanLayout::new();
    layout.section(&format!(
        "{} {} -> {} ({}, strategy {})",
        if dry_run { "plan" } else { "sync" },
        plan.target_scope,
        plan.target_platform,
        plan.entries.len(),
        plan.strategy
    ));
    for entry in &plan.entries {
        let state = pass
            .report
            .as_ref()
            .and_then(|r| r.outcomes.iter().find(|o| o.skill_name == entry.skill_name))
            .map(|o| match &o.error {
                Some(err) => format!("{} ({err})", o.state.as_str()),
                None => o.state.as_str().to_string(),
            });
        layout.push_line(format!(
            "{:<18} {:<20} {}{}",
            with_color(Styles::action(entry.action), support),
            entry.skill_name,
            styled(&entry.reason, |s| Styles::muted(s), support),
            state.map(|s| format!("  [{s}]")).unwrap_or_default(),
        ));
    }
    for missing in &plan.missing {
        layout.bullet(&format!("{} exists only on {}", missing.skill_name, plan.target_platform));
    }
    if let Some(report) = &pass.report {
        layout.blank().push_line(format!(
            "{} committed, {} skipped, {} failed",
            report.committed, report.skipped, report.failed
        ));
        for backup in report.backups() {
            layout.bullet(&format!("backup {} <- {}", backup.id, backup.source_path.display()));
        }
    }
    emit_human(layout);
}
