//! skillsync - discover, compare, sync and back up AI assistant skills.
//!
//! The library is the kernel; `src/main.rs` is a thin CLI over it. Every
//! top-level operation is synchronous and returns stable, sorted results.

pub mod app;
pub mod backup;
pub mod cli;
pub mod config;
pub mod core;
pub mod discovery;
pub mod error;
pub mod lifecycle;
pub mod parser;
pub mod similarity;
pub mod sync;
pub mod test_utils;
pub mod utils;

pub use error::{ErrorKind, Result, SkillsyncError};
