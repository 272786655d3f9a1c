use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::store::{BackupRecord, BackupStore};
use crate::core::{Platform, Skill};
use crate::error::{Result, SkillsyncError};
use crate::utils::fs::atomic_write;

/// Result of verifying one backup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub id: String,
    pub ok: bool,
}

/// Policy layer over a [`BackupStore`]: snapshots, restores and pruning.
#[derive(Clone)]
pub struct BackupController {
    store: Arc<dyn BackupStore>,
}

impl BackupController {
    pub fn new(store: Arc<dyn BackupStore>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> Arc<dyn BackupStore> {
        Arc::clone(&self.store)
    }

    /// Snapshot the file currently at `path`.
    pub fn snapshot_path(&self, path: &Path, platform: Platform) -> Result<BackupRecord> {
        let record = self.store.put(path, platform)?;
        info!(id = %record.id, path = %path.display(), "backup created");
        Ok(record)
    }

    /// Snapshot the on-disk file backing `skill`.
    pub fn snapshot(&self, skill: &Skill) -> Result<BackupRecord> {
        let bytes = std::fs::read(&skill.path).map_err(|err| SkillsyncError::io(&skill.path, err))?;
        self.snapshot_bytes(&skill.path, skill.platform, Some(&skill.name), &bytes)
    }

    pub fn snapshot_bytes(
        &self,
        path: &Path,
        platform: Platform,
        skill_name: Option<&str>,
        bytes: &[u8],
    ) -> Result<BackupRecord> {
        let record = self.store.put_bytes(path, platform, skill_name, bytes)?;
        info!(id = %record.id, path = %path.display(), "backup created");
        Ok(record)
    }

    /// All records, sorted by id (oldest first).
    pub fn list(&self) -> Result<Vec<BackupRecord>> {
        let mut records = self.store.list()?;
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }

    pub fn get(&self, id: &str) -> Result<Vec<u8>> {
        self.store.get(id)
    }

    pub fn verify(&self, id: &str) -> Result<VerifyReport> {
        let ok = self.store.verify(id)?;
        if !ok {
            warn!(id, "backup checksum mismatch");
        }
        Ok(VerifyReport {
            id: id.to_string(),
            ok,
        })
    }

    pub fn verify_all(&self) -> Result<Vec<VerifyReport>> {
        self.list()?
            .iter()
            .map(|record| self.verify(&record.id))
            .collect()
    }

    /// Write a verified backup back onto its source path.
    pub fn restore(&self, id: &str) -> Result<BackupRecord> {
        let record = self.store.record(id)?;
        if !self.store.verify(id)? {
            return Err(SkillsyncError::BackupCorrupt { id: id.to_string() });
        }
        let bytes = self.store.get(id)?;
        atomic_write(&record.source_path, &bytes)?;
        info!(id, path = %record.source_path.display(), "backup restored");
        Ok(record)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(id)?;
        info!(id, "backup deleted");
        Ok(())
    }

    /// Remove records created more than `retention_days` before `now`.
    ///
    /// Only runs when asked; returns the removed ids.
    pub fn prune(&self, retention_days: u32, now: DateTime<Utc>) -> Result<Vec<String>> {
        let cutoff = now - Duration::days(i64::from(retention_days));
        let mut removed = Vec::new();
        for record in self.list()? {
            if record.created_at < cutoff {
                self.store.delete(&record.id)?;
                removed.push(record.id);
            }
        }
        info!(removed = removed.len(), retention_days, "backups pruned");
        Ok(removed)
    }
}
