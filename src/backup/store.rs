//! Backup storage port and its implementations.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::Platform;
use crate::error::{Result, SkillsyncError};
use crate::utils::fs::{atomic_write, ensure_dir};
use crate::utils::hash::checksum;

const BLOB_EXT: &str = "bak";
const META_EXT: &str = "json";

/// Metadata for one captured snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub id: String,
    pub platform: Platform,
    pub source_path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub size: u64,
    pub checksum: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_name: Option<String>,
}

/// `YYYYMMDD-HHMMSS-<8 hex>`; sorts by creation time.
#[must_use]
pub fn generate_backup_id(now: DateTime<Utc>) -> String {
    format!("{}-{:08x}", now.format("%Y%m%d-%H%M%S"), rand::random::<u32>())
}

fn validate_id(id: &str) -> Result<()> {
    let valid = !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(SkillsyncError::BackupNotFound(id.to_string()))
    }
}

/// Owner of snapshot bytes. Implementations serialize their own operations.
pub trait BackupStore: Send + Sync {
    /// Store `bytes` as the pre-write content of `source_path`.
    fn put_bytes(
        &self,
        source_path: &Path,
        platform: Platform,
        skill_name: Option<&str>,
        bytes: &[u8],
    ) -> Result<BackupRecord>;

    fn list(&self) -> Result<Vec<BackupRecord>>;

    fn record(&self, id: &str) -> Result<BackupRecord>;

    /// The exact bytes captured by `put`.
    fn get(&self, id: &str) -> Result<Vec<u8>>;

    fn delete(&self, id: &str) -> Result<()>;

    /// Snapshot the current content of `source_path`.
    fn put(&self, source_path: &Path, platform: Platform) -> Result<BackupRecord> {
        let bytes = fs::read(source_path).map_err(|err| SkillsyncError::io(source_path, err))?;
        self.put_bytes(source_path, platform, None, &bytes)
    }

    /// Recompute the checksum of the stored bytes and compare.
    fn verify(&self, id: &str) -> Result<bool> {
        let record = self.record(id)?;
        let bytes = self.get(id)?;
        Ok(checksum(&bytes) == record.checksum)
    }
}

fn new_record(
    id: String,
    source_path: &Path,
    platform: Platform,
    skill_name: Option<&str>,
    bytes: &[u8],
    created_at: DateTime<Utc>,
) -> BackupRecord {
    BackupRecord {
        id,
        platform,
        source_path: source_path.to_path_buf(),
        created_at,
        size: bytes.len() as u64,
        checksum: checksum(bytes),
        skill_name: skill_name.map(str::to_string),
    }
}

/// On-disk store: `<root>/<id>.bak` holds the bytes, `<root>/<id>.json` the record.
pub struct FsBackupStore {
    root: PathBuf,
    lock: Mutex<()>,
}

impl FsBackupStore {
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        ensure_dir(&root)?;
        Ok(Self {
            root,
            lock: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.{BLOB_EXT}"))
    }

    fn meta_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.{META_EXT}"))
    }

    fn read_record(&self, id: &str) -> Result<BackupRecord> {
        validate_id(id)?;
        let path = self.meta_path(id);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(SkillsyncError::BackupNotFound(id.to_string()));
            }
            Err(err) => return Err(SkillsyncError::io(&path, err)),
        };
        serde_json::from_str(&raw).map_err(|err| SkillsyncError::Parse {
            path,
            line: err.line(),
            message: err.to_string(),
        })
    }
}

impl BackupStore for FsBackupStore {
    fn put_bytes(
        &self,
        source_path: &Path,
        platform: Platform,
        skill_name: Option<&str>,
        bytes: &[u8],
    ) -> Result<BackupRecord> {
        let _guard = self.lock.lock();
        let now = Utc::now();
        let mut id = generate_backup_id(now);
        while self.meta_path(&id).exists() {
            id = generate_backup_id(now);
        }

        let record = new_record(id, source_path, platform, skill_name, bytes, now);
        let meta = serde_json::to_vec_pretty(&record)
            .map_err(|err| SkillsyncError::Serialization(err.to_string()))?;

        atomic_write(&self.blob_path(&record.id), bytes)?;
        // Metadata last: a record is listed only once its bytes are durable.
        atomic_write(&self.meta_path(&record.id), &meta)?;
        debug!(id = %record.id, source = %source_path.display(), size = record.size, "backup stored");
        Ok(record)
    }

    fn list(&self) -> Result<Vec<BackupRecord>> {
        let _guard = self.lock.lock();
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(SkillsyncError::io(&self.root, err)),
        };

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| SkillsyncError::io(&self.root, err))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(META_EXT) {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match self.read_record(id) {
                Ok(record) => records.push(record),
                Err(err) => warn!(path = %path.display(), error = %err, "skipping unreadable backup record"),
            }
        }
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }

    fn record(&self, id: &str) -> Result<BackupRecord> {
        let _guard = self.lock.lock();
        self.read_record(id)
    }

    fn get(&self, id: &str) -> Result<Vec<u8>> {
        let _guard = self.lock.lock();
        validate_id(id)?;
        let path = self.blob_path(id);
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(SkillsyncError::BackupNotFound(id.to_string()))
            }
            Err(err) => Err(SkillsyncError::io(&path, err)),
        }
    }

    fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.lock.lock();
        validate_id(id)?;
        let meta = self.meta_path(id);
        if !meta.exists() {
            return Err(SkillsyncError::BackupNotFound(id.to_string()));
        }
        fs::remove_file(&meta).map_err(|err| SkillsyncError::io(&meta, err))?;
        let blob = self.blob_path(id);
        match fs::remove_file(&blob) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(SkillsyncError::io(&blob, err)),
        }
    }
}

/// In-memory store for tests and dry runs.
#[derive(Default)]
pub struct MemoryBackupStore {
    entries: Mutex<BTreeMap<String, (BackupRecord, Vec<u8>)>>,
}

impl MemoryBackupStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Replace stored bytes without touching the record.
    pub fn overwrite_bytes(&self, id: &str, bytes: &[u8]) -> Result<()> {
        let mut entries = self.entries.lock();
        let entry = entries
            .get_mut(id)
            .ok_or_else(|| SkillsyncError::BackupNotFound(id.to_string()))?;
        entry.1 = bytes.to_vec();
        Ok(())
    }
}

impl BackupStore for MemoryBackupStore {
    fn put_bytes(
        &self,
        source_path: &Path,
        platform: Platform,
        skill_name: Option<&str>,
        bytes: &[u8],
    ) -> Result<BackupRecord> {
        let mut entries = self.entries.lock();
        let now = Utc::now();
        let mut id = generate_backup_id(now);
        while entries.contains_key(&id) {
            id = generate_backup_id(now);
        }
        let record = new_record(id, source_path, platform, skill_name, bytes, now);
        entries.insert(record.id.clone(), (record.clone(), bytes.to_vec()));
        Ok(record)
    }

    fn list(&self) -> Result<Vec<BackupRecord>> {
        Ok(self
            .entries
            .lock()
            .values()
            .map(|(record, _)| record.clone())
            .collect())
    }

    fn record(&self, id: &str) -> Result<BackupRecord> {
        self.entries
            .lock()
            .get(id)
            .map(|(record, _)| record.clone())
            .ok_or_else(|| SkillsyncError::BackupNotFound(id.to_string()))
    }

    fn get(&self, id: &str) -> Result<Vec<u8>> {
        self.entries
            .lock()
            .get(id)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| SkillsyncError::BackupNotFound(id.to_string()))
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.entries
            .lock()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| SkillsyncError::BackupNotFound(id.to_string()))
    }
}
