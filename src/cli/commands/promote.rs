//! skillsync promote / demote - Move skills between repo and user scope

use clap::Args;

use crate::app::AppContext;
use crate::cli::commands::{CommandStatus, find_skill};
use crate::cli::output::{HumanLayout, emit_human, emit_json, robot_ok};
use crate::core::{Platform, Scope};
use crate::error::{Result, SkillsyncError};
use crate::lifecycle::MoveOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Promote,
    Demote,
}

impl Direction {
    const fn scopes(self) -> (Scope, Scope) {
        match self {
            Self::Promote => (Scope::Repo, Scope::User),
            Self::Demote => (Scope::User, Scope::Repo),
        }
    }
}

#[derive(Args, Debug)]
pub struct MoveArgs {
    pub platform: Platform,
    pub name: String,

    /// Remove the original after copying
    #[arg(long = "move")]
    pub remove_source: bool,

    /// Replace an existing destination (it is backed up first)
    #[arg(long)]
    pub force: bool,
}

pub fn run(ctx: &AppContext, args: &MoveArgs, direction: Direction) -> Result<CommandStatus> {
    let (from, to) = direction.scopes();
    let skill = find_skill(ctx, args.platform, &args.name, Some(from))?;
    let dest_root = ctx.write_root(args.platform, to).ok_or_else(|| {
        SkillsyncError::Usage(format!("no {to} root is available for {}", args.platform))
    })?;
    let options = MoveOptions {
        remove_source: args.remove_source,
        force: args.force,
        to_platform: Some(args.platform),
    };

    let lifecycle = ctx.lifecycle()?;
    let outcome = match direction {
        Direction::Promote => lifecycle.promote(&skill, &dest_root, options)?,
        Direction::Demote => lifecycle.demote(&skill, &dest_root, options)?,
    };

    if ctx.robot_mode {
        emit_json(&robot_ok(&outcome))?;
    } else {
        let mut layout = HumanLayout::new();
        layout
            .kv(if outcome.source_removed { "moved" } else { "copied" }, &outcome.skill_name)
            .kv("from", &outcome.from.display().to_string())
            .kv("to", &outcome.to.display().to_string());
        if let Some(backup) = &outcome.backup {
            layout.kv("backup", &backup.id);
        }
        emit_human(layout);
    }
    Ok(CommandStatus::Success)
}
