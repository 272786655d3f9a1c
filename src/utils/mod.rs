//! Utility functions and helpers.

pub mod format;
pub mod fs;
pub mod git;
pub mod hash;

// Re-exports for convenience
pub use format::*;
pub use fs::*;
pub use hash::checksum;
