//! Core skill types: platforms, scopes, the skill value and cancellation.

pub mod cancel;
pub mod platform;
pub mod scope;
pub mod skill;

pub use cancel::CancelToken;
pub use platform::{Platform, SkillLayout};
pub use scope::Scope;
pub use skill::{
    FrontBlock, LineEnding, Skill, SkillKey, dedupe_tools, name_sort_key, normalize_line_endings,
};
