//! E2E test suite entry point.
//!
//! Scenarios run against the library with a fixture home and working
//! directory; nothing touches the real home directory.

mod backup_workflow;
mod discovery_workflow;
mod lifecycle_workflow;
mod similarity_workflow;
mod sync_workflow;
