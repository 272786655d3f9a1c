//! skillsync list - List discovered skills

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tracing::debug;

use crate::app::AppContext;
use crate::cli::colors::{ColorSupport, Styles, styled, with_color};
use crate::cli::commands::{CommandStatus, platforms_or_all, warning_messages};
use crate::cli::output::{HumanLayout, emit_human, emit_json, robot_ok};
use crate::core::{Platform, Scope, Skill};
use crate::discovery::DiscoveryOptions;
use crate::error::Result;
use crate::utils::truncate_string;

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Platforms to list (default: all)
    #[arg(long, short)]
    pub platform: Vec<Platform>,

    /// Only these scopes
    #[arg(long, short)]
    pub scope: Vec<Scope>,

    /// Show every scope's copy instead of the highest-precedence one
    #[arg(long)]
    pub all_scopes: bool,
}

#[derive(Serialize)]
struct ListedSkill<'a> {
    name: &'a str,
    platform: Platform,
    scope: Scope,
    path: &'a PathBuf,
    description: &'a str,
    tools: &'a [String],
}

impl<'a> From<&'a Skill> for ListedSkill<'a> {
    fn from(skill: &'a Skill) -> Self {
        Self {
            name: &skill.name,
            platform: skill.platform,
            scope: skill.scope,
            path: &skill.path,
            description: &skill.description,
            tools: &skill.tools,
        }
    }
}

pub fn run(ctx: &AppContext, args: &ListArgs) -> Result<CommandStatus> {
    let mut options = if args.all_scopes {
        DiscoveryOptions::all_scopes()
    } else {
        ctx.discovery_options()
    };
    options.follow_symlinks = ctx.config.discovery.follow_symlinks;
    if !args.scope.is_empty() {
        options = options.with_scopes(args.scope.iter().copied());
    }

    let platforms = platforms_or_all(&args.platform);
    debug!(?platforms, all_scopes = args.all_scopes, "listing skills");
    let found = ctx.discover(&platforms, &options)?;

    if ctx.robot_mode {
        let listed: Vec<ListedSkill<'_>> = found.skills.iter().map(ListedSkill::from).collect();
        emit_json(&robot_ok(listed).with_warnings(warning_messages(&found)))?;
    } else {
        let support = ColorSupport::detect();
        let mut layout = HumanLayout::new();
        if found.skills.is_empty() {
            layout.push_line("No skills found.");
        }
        for skill in &found.skills {
            layout.push_line(format!(
                "{:<12} {:<8} {}  {}",
                skill.platform.id(),
                with_color(Styles::scope(skill.scope.as_str(), skill.scope), support),
                styled(&skill.name, |s| Styles::skill_name(s), support),
                styled(truncate_string(&skill.description, 60), Styles::muted, support),
            ));
        }
        for warning in &found.warnings {
            layout.push_line(styled(
                format!("warning: {} ({})", warning.path.display(), warning.message),
                Styles::warning,
                support,
            ));
        }
        emit_human(layout);
    }

    Ok(CommandStatus::partial_if(!found.warnings.is_empty()))
}
