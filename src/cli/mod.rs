//! Command-line surface.
//!
//! Argument parsing lives here; each subcommand's behavior lives in
//! [`commands`]. Commands are thin: they resolve arguments, call the
//! library and render the result.

pub mod colors;
pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

pub use output::OutputMode;

use commands::backup::BackupCommand;
use commands::compare::{CompareArgs, DedupeArgs, DiffArgs};
use commands::delete::DeleteArgs;
use commands::export::ExportArgs;
use commands::import::ImportArgs;
use commands::list::ListArgs;
use commands::promote::MoveArgs;
use commands::show::ShowArgs;
use commands::sync::SyncArgs;

#[derive(Parser, Debug)]
#[command(
    name = "skillsync",
    version,
    about = "Discover, compare, sync and back up AI assistant skills",
    propagate_version = true
)]
pub struct Cli {
    /// Emit JSON on stdout instead of human output
    #[arg(long, global = true)]
    pub robot: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress logging entirely
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Config file to use instead of the global and project files
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Working directory used for repo-scope discovery
    #[arg(long, global = true, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    #[must_use]
    pub const fn output_mode(&self) -> OutputMode {
        OutputMode::from_robot(self.robot)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List discovered skills
    List(ListArgs),
    /// Show one skill
    Show(ShowArgs),
    /// Pair similar skills across two platforms
    Compare(CompareArgs),
    /// Line diff between two skills
    Diff(DiffArgs),
    /// Find cross-platform duplicates
    Dedupe(DedupeArgs),
    /// Sync skills from one platform to another
    Sync(SyncArgs),
    /// Manage backups
    #[command(subcommand)]
    Backup(BackupCommand),
    /// Copy a repo skill into the user scope
    Promote(MoveArgs),
    /// Copy a user skill into the repo scope
    Demote(MoveArgs),
    /// Delete a skill from a writable scope
    Delete(DeleteArgs),
    /// Import a skill file onto a platform
    Import(ImportArgs),
    /// Export discovered skills as JSON or YAML
    Export(ExportArgs),
}
