//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

pub mod backup;
pub mod compare;
pub mod delete;
pub mod export;
pub mod import;
pub mod list;
pub mod promote;
pub mod show;
pub mod sync;

use crate::app::AppContext;
use crate::cli::Commands;
use crate::core::{Platform, Scope, Skill};
use crate::discovery::{DiscoveryOptions, DiscoveryResult};
use crate::error::{Result, SkillsyncError};

/// How a command finished when it did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    /// Completed, but warnings or failed entries were reported.
    Partial,
}

impl CommandStatus {
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Partial => 1,
        }
    }

    #[must_use]
    pub const fn partial_if(condition: bool) -> Self {
        if condition { Self::Partial } else { Self::Success }
    }
}

pub fn run(ctx: &AppContext, command: &Commands) -> Result<CommandStatus> {
    match command {
        Commands::List(args) => list::run(ctx, args),
        Commands::Show(args) => show::run(ctx, args),
        Commands::Compare(args) => compare::run_compare(ctx, args),
        Commands::Diff(args) => compare::run_diff(ctx, args),
        Commands::Dedupe(args) => compare::run_dedupe(ctx, args),
        Commands::Sync(args) => sync::run(ctx, args),
        Commands::Backup(cmd) => backup::run(ctx, cmd),
        Commands::Promote(args) => promote::run(ctx, args, promote::Direction::Promote),
        Commands::Demote(args) => promote::run(ctx, args, promote::Direction::Demote),
        Commands::Delete(args) => delete::run(ctx, args),
        Commands::Import(args) => import::run(ctx, args),
        Commands::Export(args) => export::run(ctx, args),
    }
}

/// Platforms named on the command line, or all of them.
#[must_use]
pub fn platforms_or_all(platforms: &[Platform]) -> Vec<Platform> {
    if platforms.is_empty() {
        Platform::ALL.to_vec()
    } else {
        platforms.to_vec()
    }
}

/// Find `name` on `platform`, optionally pinned to one scope. Without a
/// scope the highest-precedence instance wins.
pub fn find_skill(ctx: &AppContext, platform: Platform, name: &str, scope: Option<Scope>) -> Result<Skill> {
    let options = match scope {
        Some(scope) => DiscoveryOptions::all_scopes().with_scopes([scope]),
        None => ctx.discovery_options(),
    };
    let options = DiscoveryOptions {
        follow_symlinks: ctx.config.discovery.follow_symlinks,
        ..options
    };
    let found = ctx.discover(&[platform], &options)?;
    first_match(&found, platform, name).ok_or_else(|| {
        let location = scope.map_or_else(String::new, |s| format!(" in scope {s}"));
        SkillsyncError::SkillNotFound(format!("{platform}:{name}{location}"))
    })
}

fn first_match(found: &DiscoveryResult, platform: Platform, name: &str) -> Option<Skill> {
    found.find(platform, name).next().cloned()
}

/// Split `platform:name`.
pub fn parse_skill_ref(raw: &str) -> Result<(Platform, String)> {
    let (platform, name) = raw.split_once(':').ok_or_else(|| {
        SkillsyncError::Usage(format!("'{raw}' must look like platform:name"))
    })?;
    let name = name.trim();
    if name.is_empty() {
        return Err(SkillsyncError::Usage(format!("'{raw}' is missing a skill name")));
    }
    Ok((platform.parse()?, name.to_string()))
}

/// Warning lines for robot payloads.
#[must_use]
pub fn warning_messages(found: &DiscoveryResult) -> Vec<String> {
    found
        .warnings
        .iter()
        .map(|w| format!("{}: {} ({})", w.kind, w.path.display(), w.message))
        .collect()
}
