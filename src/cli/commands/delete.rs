//! skillsync delete - Delete a skill from a writable scope

use clap::Args;

use crate::app::AppContext;
use crate::cli::commands::{CommandStatus, find_skill};
use crate::cli::output::{HumanLayout, emit_human, emit_json, robot_ok};
use crate::core::{Platform, Scope};
use crate::error::{Result, SkillsyncError};

#[derive(Args, Debug)]
pub struct DeleteArgs {
    pub platform: Platform,
    pub name: String,

    /// Scope to delete from
    #[arg(long, short)]
    pub scope: Scope,

    /// Skip the pre-delete backup
    #[arg(long)]
    pub no_backup: bool,
}

pub fn run(ctx: &AppContext, args: &DeleteArgs) -> Result<CommandStatus> {
    if !args.scope.is_writable() {
        return Err(SkillsyncError::ScopeViolation {
            scope: args.scope,
            operation: format!("delete '{}'", args.name),
        });
    }
    let skill = find_skill(ctx, args.platform, &args.name, Some(args.scope))?;
    let outcome = ctx.lifecycle()?.delete(&skill, !args.no_backup)?;

    if ctx.robot_mode {
        emit_json(&robot_ok(&outcome))?;
    } else {
        let mut layout = HumanLayout::new();
        layout
            .kv("deleted", &outcome.skill_name)
            .kv("path", &outcome.path.display().to_string());
        if let Some(backup) = &outcome.backup {
            layout.kv("backup", &backup.id);
        }
        emit_human(layout);
    }
    Ok(CommandStatus::Success)
}
