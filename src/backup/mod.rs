//! Pre-write snapshots.
//!
//! [`BackupStore`] is the port that owns snapshot bytes; [`BackupController`]
//! is the policy layer used by sync, lifecycle operations and the CLI.

pub mod controller;
pub mod store;

pub use controller::{BackupController, VerifyReport};
pub use store::{BackupRecord, BackupStore, FsBackupStore, MemoryBackupStore, generate_backup_id};
