//! skillsync import - Import a skill file onto a platform

use std::path::PathBuf;

use clap::Args;

use crate::app::AppContext;
use crate::cli::commands::CommandStatus;
use crate::cli::output::{HumanLayout, emit_human, emit_json, robot_ok, robot_partial};
use crate::core::{CancelToken, Platform, Scope};
use crate::discovery::DiscoveryOptions;
use crate::error::Result;
use crate::sync::{Strategy, SyncPlanner, SyncTarget};
use crate::utils::expand_path;

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Skill file to import
    pub file: PathBuf,

    /// Destination platform
    #[arg(long)]
    pub to: Platform,

    #[arg(long, short, default_value = "user")]
    pub scope: Scope,

    /// Conflict strategy when the skill already exists
    #[arg(long)]
    pub strategy: Option<Strategy>,
}

pub fn run(ctx: &AppContext, args: &ImportArgs) -> Result<CommandStatus> {
    let path = expand_path(&args.file.to_string_lossy(), ctx.home.as_deref(), &ctx.working_dir);
    let existing_options = DiscoveryOptions {
        follow_symlinks: ctx.config.discovery.follow_symlinks,
        ..DiscoveryOptions::all_scopes().with_scopes([args.scope])
    };
    let existing = ctx.discover(&[args.to], &existing_options)?.skills;
    let target = SyncTarget::new(args.to, args.scope, ctx.write_root(args.to, args.scope));
    let planner = SyncPlanner::new(args.strategy.unwrap_or(ctx.config.sync.default_strategy));

    let outcome = ctx.lifecycle()?.import(
        &path,
        &target,
        &existing,
        &planner,
        &ctx.execute_options(CancelToken::new()),
    )?;

    let failed = outcome.report.failed;
    if ctx.robot_mode {
        if failed > 0 {
            emit_json(&robot_partial(&outcome, outcome.report.committed, failed))?;
        } else {
            emit_json(&robot_ok(&outcome))?;
        }
    } else {
        let mut layout = HumanLayout::new();
        for entry in &outcome.plan.entries {
            layout
                .kv("imported", &entry.skill_name)
                .kv("action", entry.action.as_str())
                .kv("path", &entry.target_path.display().to_string());
        }
        for backup in outcome.report.backups() {
            layout.kv("backup", &backup.id);
        }
        for failure in outcome.report.outcomes.iter().filter_map(|o| o.error.as_deref()) {
            layout.kv("error", failure);
        }
        emit_human(layout);
    }
    Ok(CommandStatus::partial_if(failed > 0))
}
