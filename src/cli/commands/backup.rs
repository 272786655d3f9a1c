//! skillsync backup - Create, inspect, restore and prune backups

use chrono::Utc;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::app::AppContext;
use crate::backup::BackupRecord;
use crate::cli::colors::{ColorSupport, Styles, styled};
use crate::cli::commands::{CommandStatus, find_skill};
use crate::cli::output::{HumanLayout, emit_human, emit_json, robot_ok};
use crate::core::{Platform, Scope};
use crate::error::Result;
use crate::utils::format_size;

#[derive(Subcommand, Debug)]
pub enum BackupCommand {
    /// Snapshot a skill's current file
    Create(CreateArgs),
    /// List backups, oldest first
    List,
    /// Write a backup back onto its source path
    Restore(IdArgs),
    /// Check stored checksums
    Verify(VerifyArgs),
    /// Delete one backup
    Delete(IdArgs),
    /// Delete backups older than the retention window
    Prune(PruneArgs),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    pub platform: Platform,
    pub name: String,
    #[arg(long, short)]
    pub scope: Option<Scope>,
}

#[derive(Args, Debug)]
pub struct IdArgs {
    pub id: String,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Backup to verify (default: all)
    pub id: Option<String>,
}

#[derive(Args, Debug)]
pub struct PruneArgs {
    /// Retention in days (default from config)
    #[arg(long)]
    pub days: Option<u32>,
}

#[derive(Serialize)]
struct Pruned {
    retention_days: u32,
    removed: Vec<String>,
}

pub fn run(ctx: &AppContext, command: &BackupCommand) -> Result<CommandStatus> {
    let backups = ctx.backups()?;
    match command {
        BackupCommand::Create(args) => {
            let skill = find_skill(ctx, args.platform, &args.name, args.scope)?;
            let record = backups.snapshot(&skill)?;
            emit_record(ctx, &record, "created")?;
            Ok(CommandStatus::Success)
        }
        BackupCommand::List => {
            let records = backups.list()?;
            if ctx.robot_mode {
                emit_json(&robot_ok(&records))?;
            } else {
                let mut layout = HumanLayout::new();
                if records.is_empty() {
                    layout.push_line("No backups.");
                }
                for record in &records {
                    layout.push_line(format!(
                        "{}  {:<12} {:>9}  {}",
                        record.id,
                        record.platform.id(),
                        format_size(record.size),
                        record.source_path.display()
                    ));
                }
                emit_human(layout);
            }
            Ok(CommandStatus::Success)
        }
        BackupCommand::Restore(args) => {
            let record = backups.restore(&args.id)?;
            emit_record(ctx, &record, "restored")?;
            Ok(CommandStatus::Success)
        }
        BackupCommand::Verify(args) => {
            let reports = match &args.id {
                Some(id) => vec![backups.verify(id)?],
                None => backups.verify_all()?,
            };
            let bad = reports.iter().filter(|r| !r.ok).count();
            if ctx.robot_mode {
                emit_json(&robot_ok(&reports))?;
            } else {
                let support = ColorSupport::detect();
                let mut layout = HumanLayout::new();
                for report in &reports {
                    let status = if report.ok {
                        styled("ok", Styles::success, support)
                    } else {
                        styled("CORRUPT", Styles::error, support)
                    };
                    layout.push_line(format!("{}  {status}", report.id));
                }
                emit_human(layout);
            }
            Ok(CommandStatus::partial_if(bad > 0))
        }
        BackupCommand::Delete(args) => {
            backups.delete(&args.id)?;
            if ctx.robot_mode {
                emit_json(&robot_ok(serde_json::json!({ "deleted": args.id })))?;
            } else {
                println!("deleted {}", args.id);
            }
            Ok(CommandStatus::Success)
        }
        BackupCommand::Prune(args) => {
            let retention_days = args.days.unwrap_or(ctx.config.backup.retention_days);
            let removed = backups.prune(retention_days, Utc::now())?;
            if ctx.robot_mode {
                emit_json(&robot_ok(Pruned {
                    retention_days,
                    removed,
                }))?;
            } else {
                println!("pruned {} backup(s) older than {retention_days} days", removed.len());
            }
            Ok(CommandStatus::Success)
        }
    }
}

fn emit_record(ctx: &AppContext, record: &BackupRecord, verb: &str) -> Result<()> {
    if ctx.robot_mode {
        return emit_json(&robot_ok(record));
    }
    let mut layout = HumanLayout::new();
    layout
        .kv(verb, &record.id)
        .kv("path", &record.source_path.display().to_string())
        .kv("checksum", &record.checksum);
    emit_human(layout);
    Ok(())
}
