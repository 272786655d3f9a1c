//! skillsync show - Show one skill

use clap::Args;

use crate::app::AppContext;
use crate::cli::commands::{CommandStatus, find_skill};
use crate::cli::output::{HumanLayout, emit_human, emit_json, robot_ok};
use crate::core::{Platform, Scope};
use crate::error::Result;
use crate::parser::SkillSerializer;
use crate::utils::format_size;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Platform the skill lives on
    pub platform: Platform,

    /// Skill name
    pub name: String,

    /// Pin to one scope instead of the highest-precedence copy
    #[arg(long, short)]
    pub scope: Option<Scope>,

    /// Print the file exactly as it would be written
    #[arg(long)]
    pub raw: bool,
}

pub fn run(ctx: &AppContext, args: &ShowArgs) -> Result<CommandStatus> {
    let skill = find_skill(ctx, args.platform, &args.name, args.scope)?;

    if ctx.robot_mode {
        emit_json(&robot_ok(&skill))?;
        return Ok(CommandStatus::Success);
    }

    let rendered = SkillSerializer::to_string(&skill)?;
    if args.raw {
        print!("{rendered}");
        return Ok(CommandStatus::Success);
    }

    let mut layout = HumanLayout::new();
    layout
        .title(&skill.name)
        .kv("platform", skill.platform.display_name())
        .kv("scope", skill.display_scope())
        .kv("path", &skill.path.display().to_string())
        .kv("modified", &skill.modified_at.to_rfc3339())
        .kv("size", &format_size(rendered.len() as u64));
    if !skill.description.is_empty() {
        layout.kv("description", &skill.description);
    }
    if !skill.tools.is_empty() {
        layout.kv("tools", &skill.tools.join(", "));
    }
    for (key, _) in &skill.raw_front {
        if let Some(key) = key.as_str() {
            layout.kv("extra key", key);
        }
    }
    layout.blank().push_line(skill.content.trim_end());
    emit_human(layout);
    Ok(CommandStatus::Success)
}
