//! Applying a [`SyncPlan`] to disk.
//!
//! Each entry moves through `pending -> snapshotting -> writing ->
//! committed`, or ends in `skipped` / `failed`. Once an entry is
//! `committed` it never moves again except to `failed-post-commit` when
//! write verification fails.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::planner::{SyncAction, SyncPlan};
use crate::backup::{BackupController, BackupRecord};
use crate::core::CancelToken;
use crate::error::{ErrorKind, Result, SkillsyncError};
use crate::utils::{atomic_write, checksum, read_optional};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryState {
    Pending,
    Snapshotting,
    Writing,
    Committed,
    Skipped,
    Failed,
    FailedPostCommit,
}

impl EntryState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Snapshotting => "snapshotting",
            Self::Writing => "writing",
            Self::Committed => "committed",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
            Self::FailedPostCommit => "failed-post-commit",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Committed | Self::Skipped | Self::Failed | Self::FailedPostCommit
        )
    }

    /// Whether `self -> next` is a legal step.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Snapshotting | Self::Writing | Self::Skipped | Self::Failed)
                | (Self::Snapshotting, Self::Writing | Self::Failed)
                | (Self::Writing, Self::Committed | Self::Failed)
                | (Self::Committed, Self::FailedPostCommit)
        )
    }
}

#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Stop at the first failed entry; later entries stay `pending`.
    pub abort_on_error: bool,
    /// Re-read each written file and compare checksums.
    pub verify_writes: bool,
    pub cancel: CancelToken,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            abort_on_error: false,
            verify_writes: true,
            cancel: CancelToken::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryOutcome {
    pub skill_name: String,
    pub action: SyncAction,
    pub target_path: PathBuf,
    pub state: EntryState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<BackupRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl EntryOutcome {
    fn advance(&mut self, next: EntryState) -> Result<()> {
        if !self.state.can_advance_to(next) {
            return Err(SkillsyncError::InvariantViolation(format!(
                "entry '{}' cannot move from {} to {}",
                self.skill_name,
                self.state.as_str(),
                next.as_str()
            )));
        }
        self.state = next;
        Ok(())
    }

    fn fail(&mut self, next: EntryState, err: &SkillsyncError) {
        self.state = next;
        self.error = Some(err.to_string());
        self.error_kind = Some(err.kind());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncReport {
    /// One outcome per plan entry, in plan order.
    pub outcomes: Vec<EntryOutcome>,
    pub committed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub cancelled: bool,
}

impl SyncReport {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failed == 0 && !self.cancelled
    }

    pub fn backups(&self) -> impl Iterator<Item = &BackupRecord> {
        self.outcomes.iter().filter_map(|o| o.backup.as_ref())
    }

    fn tally(&mut self) {
        self.committed = self.count(EntryState::Committed);
        self.skipped = self.count(EntryState::Skipped);
        self.failed =
            self.count(EntryState::Failed) + self.count(EntryState::FailedPostCommit);
    }

    fn count(&self, state: EntryState) -> usize {
        self.outcomes.iter().filter(|o| o.state == state).count()
    }
}

/// Applies plans entry by entry, taking backups first.
#[derive(Clone)]
pub struct SyncExecutor {
    backups: BackupController,
}

impl SyncExecutor {
    #[must_use]
    pub const fn new(backups: BackupController) -> Self {
        Self { backups }
    }

    #[must_use]
    pub const fn backups(&self) -> &BackupController {
        &self.backups
    }

    /// Execute `plan`.
    ///
    /// Entry failures are recorded in the report rather than returned;
    /// the returned `Err` is reserved for broken invariants.
    pub fn apply(&self, plan: &SyncPlan, options: &ExecuteOptions) -> Result<SyncReport> {
        let mut report = SyncReport {
            outcomes: plan
                .entries
                .iter()
                .map(|entry| EntryOutcome {
                    skill_name: entry.skill_name.clone(),
                    action: entry.action,
                    target_path: entry.target_path.clone(),
                    state: EntryState::Pending,
                    backup: None,
                    error: None,
                    error_kind: None,
                })
                .collect(),
            ..SyncReport::default()
        };

        for (idx, entry) in plan.entries.iter().enumerate() {
            if options.cancel.is_cancelled() {
                let completed = report.outcomes.iter().filter(|o| o.state.is_terminal()).count();
                warn!(completed, "sync cancelled");
                report.cancelled = true;
                break;
            }

            let outcome = &mut report.outcomes[idx];
            if !entry.action.writes() {
                outcome.advance(EntryState::Skipped)?;
                debug!(skill = %entry.skill_name, reason = %entry.reason, "skipped");
                continue;
            }

            let Some(bytes) = entry.resolved_bytes() else {
                return Err(SkillsyncError::InvariantViolation(format!(
                    "write entry '{}' has no content",
                    entry.skill_name
                )));
            };

            if entry.backup_required {
                outcome.advance(EntryState::Snapshotting)?;
                match read_optional(&entry.target_path).and_then(|current| {
                    current
                        .map(|current| {
                            self.backups.snapshot_bytes(
                                &entry.target_path,
                                plan.target_platform,
                                Some(&entry.skill_name),
                                &current,
                            )
                        })
                        .transpose()
                }) {
                    Ok(record) => outcome.backup = record,
                    Err(err) => {
                        error!(skill = %entry.skill_name, error = %err, "backup failed; target untouched");
                        outcome.fail(EntryState::Failed, &err);
                        if options.abort_on_error {
                            break;
                        }
                        continue;
                    }
                }
            }

            outcome.advance(EntryState::Writing)?;
            if let Err(err) = atomic_write(&entry.target_path, bytes) {
                error!(skill = %entry.skill_name, error = %err, "write failed");
                outcome.fail(EntryState::Failed, &err);
                if options.abort_on_error {
                    break;
                }
                continue;
            }
            outcome.advance(EntryState::Committed)?;

            if options.verify_writes {
                if let Err(err) = verify_written(&entry.target_path, bytes) {
                    error!(skill = %entry.skill_name, error = %err, "post-write verification failed");
                    outcome.advance(EntryState::FailedPostCommit)?;
                    outcome.error = Some(err.to_string());
                    outcome.error_kind = Some(err.kind());
                    if options.abort_on_error {
                        break;
                    }
                    continue;
                }
            }
            info!(
                skill = %entry.skill_name,
                action = entry.action.as_str(),
                path = %entry.target_path.display(),
                "committed"
            );
        }

        report.tally();
        info!(
            committed = report.committed,
            skipped = report.skipped,
            failed = report.failed,
            cancelled = report.cancelled,
            "sync finished"
        );
        Ok(report)
    }
}

fn verify_written(path: &std::path::Path, expected: &[u8]) -> Result<()> {
    let actual = read_optional(path)?.unwrap_or_default();
    if checksum(&actual) == checksum(expected) {
        Ok(())
    } else {
        Err(SkillsyncError::InvariantViolation(format!(
            "{} does not match the bytes written",
            path.display()
        )))
    }
}
