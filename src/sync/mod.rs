//! Moving skills between platforms.
//!
//! [`ConflictDetector`] classifies, [`SyncPlanner`] decides, and
//! [`SyncExecutor`] writes. Planning never touches the filesystem.

pub mod conflict;
pub mod executor;
pub mod merge;
pub mod planner;
pub mod strategy;

pub use conflict::{
    Classification, Conflict, ConflictDetector, ConflictReport, ConflictType, DetectedEntry, classify,
};
pub use executor::{EntryOutcome, EntryState, ExecuteOptions, SyncExecutor, SyncReport};
pub use merge::{ThreeWayOutcome, mechanical_merge, three_way_merge};
pub use planner::{
    PlanEntry, SyncAction, SyncPlan, SyncPlanner, SyncTarget, apply_resolution, layout_path, planned_path,
};
pub use strategy::{Resolution, ResolutionChoice, ResolutionMap, Strategy, parse_resolution_arg};
