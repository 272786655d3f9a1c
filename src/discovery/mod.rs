//! Tiered, precedence-ordered skill discovery.

pub mod engine;
pub mod paths;

pub use engine::{
    DiscoveryEngine, DiscoveryOptions, DiscoveryResult, DiscoveryWarning, collapse_precedence,
    sort_skills,
};
pub use paths::{PathInputs, PathResolver, SKILLS_DIR, TierRoots};
