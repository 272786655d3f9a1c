//! skillsync export - Export discovered skills as JSON or YAML

use std::path::PathBuf;

use chrono::Utc;
use clap::Args;

use crate::app::AppContext;
use crate::cli::commands::{CommandStatus, platforms_or_all};
use crate::core::{Platform, Scope};
use crate::error::Result;
use crate::lifecycle::{ExportFormat, export_skills};
use crate::utils::{atomic_write, expand_path};

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[arg(long, short)]
    pub platform: Vec<Platform>,

    #[arg(long, short)]
    pub scope: Vec<Scope>,

    #[arg(long, short, default_value = "json")]
    pub format: ExportFormat,

    /// Write to a file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub fn run(ctx: &AppContext, args: &ExportArgs) -> Result<CommandStatus> {
    let mut options = ctx.discovery_options();
    if !args.scope.is_empty() {
        options = options.with_scopes(args.scope.iter().copied());
    }
    let found = ctx.discover(&platforms_or_all(&args.platform), &options)?;
    let rendered = export_skills(&found.skills, args.format, Utc::now())?;

    match &args.output {
        Some(path) => {
            let path = expand_path(&path.to_string_lossy(), ctx.home.as_deref(), &ctx.working_dir);
            atomic_write(&path, rendered.as_bytes())?;
            eprintln!("exported {} skill(s) to {}", found.skills.len(), path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(CommandStatus::partial_if(!found.warnings.is_empty()))
}
