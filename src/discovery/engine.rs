use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::paths::PathResolver;
use crate::core::{CancelToken, Platform, Scope, Skill, name_sort_key};
use crate::error::{ErrorKind, Result, SkillsyncError};
use crate::parser::{SKILL_FILE, SkillParser, has_markdown_extension, is_skill_file};

/// Options for [`DiscoveryEngine::discover`].
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Scopes to include; `None` means all.
    pub scope_filter: Option<BTreeSet<Scope>>,
    /// Keep only the highest-precedence instance per `(platform, name)`.
    pub collapse_precedence: bool,
    pub follow_symlinks: bool,
    pub cancel: CancelToken,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            scope_filter: None,
            collapse_precedence: true,
            follow_symlinks: false,
            cancel: CancelToken::default(),
        }
    }
}

impl DiscoveryOptions {
    #[must_use]
    pub fn all_scopes() -> Self {
        Self {
            collapse_precedence: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_scopes(mut self, scopes: impl IntoIterator<Item = Scope>) -> Self {
        self.scope_filter = Some(scopes.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn includes(&self, scope: Scope) -> bool {
        self.scope_filter
            .as_ref()
            .is_none_or(|filter| filter.contains(&scope))
    }
}

/// A non-fatal problem found while walking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryWarning {
    pub path: PathBuf,
    pub kind: ErrorKind,
    pub message: String,
}

impl DiscoveryWarning {
    fn from_error(path: &Path, err: &SkillsyncError) -> Self {
        Self {
            path: path.to_path_buf(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DiscoveryResult {
    pub skills: Vec<Skill>,
    pub warnings: Vec<DiscoveryWarning>,
}

impl DiscoveryResult {
    /// Skills named `name` on `platform`, highest precedence first.
    pub fn find<'a>(&'a self, platform: Platform, name: &'a str) -> impl Iterator<Item = &'a Skill> + 'a {
        self.skills
            .iter()
            .filter(move |s| s.platform == platform && s.name == name)
    }

    #[must_use]
    pub fn for_platform(&self, platform: Platform) -> Vec<Skill> {
        self.skills
            .iter()
            .filter(|s| s.platform == platform)
            .cloned()
            .collect()
    }
}

struct Candidate {
    platform: Platform,
    scope: Scope,
    path: PathBuf,
}

/// Walks resolved tiers and parses every skill file it finds.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryEngine {
    resolver: PathResolver,
}

impl DiscoveryEngine {
    #[must_use]
    pub const fn new(resolver: PathResolver) -> Self {
        Self { resolver }
    }

    #[must_use]
    pub const fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Discover skills for `platforms` as seen from `working_dir`.
    ///
    /// Output is sorted by platform id, then name case-insensitively, then
    /// scope precedence. Per-file failures become warnings.
    pub fn discover(
        &self,
        platforms: &[Platform],
        working_dir: &Path,
        options: &DiscoveryOptions,
    ) -> Result<DiscoveryResult> {
        let mut warnings = Vec::new();
        let mut candidates = Vec::new();

        let unique_platforms: BTreeSet<Platform> = platforms.iter().copied().collect();
        for platform in unique_platforms {
            for (scope, roots) in self.resolver.resolve(platform, working_dir) {
                if !options.includes(scope) {
                    continue;
                }
                for root in roots {
                    options.cancel.check(0)?;
                    collect_candidates(platform, scope, &root, options, &mut candidates, &mut warnings);
                }
            }
        }
        debug!(candidates = candidates.len(), "parsing skill candidates");

        let parsed: Vec<Option<Result<Skill>>> = candidates
            .par_iter()
            .map(|c| {
                if options.cancel.is_cancelled() {
                    None
                } else {
                    Some(SkillParser::parse_file(&c.path, c.platform, c.scope))
                }
            })
            .collect();

        if parsed.iter().any(Option::is_none) {
            let completed = parsed.iter().filter(|p| p.is_some()).count();
            return Err(SkillsyncError::Cancelled { completed });
        }

        let mut seen: HashMap<(Platform, Scope, String), PathBuf> = HashMap::new();
        let mut skills = Vec::new();
        for (candidate, outcome) in candidates.iter().zip(parsed.into_iter().flatten()) {
            match outcome {
                Ok(skill) => {
                    let key = (skill.platform, skill.scope, skill.name.clone());
                    if let Some(first) = seen.get(&key) {
                        warnings.push(DiscoveryWarning {
                            path: skill.path.clone(),
                            kind: ErrorKind::Conflict,
                            message: format!(
                                "skill '{}' already found at {}; ignoring this copy",
                                skill.name,
                                first.display()
                            ),
                        });
                        continue;
                    }
                    seen.insert(key, skill.path.clone());
                    skills.push(skill);
                }
                Err(err) => {
                    debug!(path = %candidate.path.display(), error = %err, "skipping candidate");
                    warnings.push(DiscoveryWarning::from_error(&candidate.path, &err));
                }
            }
        }

        if options.collapse_precedence {
            skills = collapse_precedence(skills);
        }
        sort_skills(&mut skills);

        info!(
            skills = skills.len(),
            warnings = warnings.len(),
            "discovery complete"
        );
        Ok(DiscoveryResult { skills, warnings })
    }
}

/// Keep the highest-precedence instance for each `(platform, name)`.
#[must_use]
pub fn collapse_precedence(skills: Vec<Skill>) -> Vec<Skill> {
    let mut best: HashMap<(Platform, String), Skill> = HashMap::new();
    for skill in skills {
        let key = (skill.platform, skill.name.clone());
        match best.get(&key) {
            Some(current) if !skill.scope.outranks(current.scope) => {}
            _ => {
                best.insert(key, skill);
            }
        }
    }
    best.into_values().collect()
}

/// Stable discovery order: platform id, name (case-insensitive), scope.
pub fn sort_skills(skills: &mut [Skill]) {
    skills.sort_by(|a, b| {
        a.platform
            .id()
            .cmp(b.platform.id())
            .then_with(|| name_sort_key(&a.name).cmp(&name_sort_key(&b.name)))
            .then_with(|| a.scope.cmp(&b.scope))
    });
}

fn collect_candidates(
    platform: Platform,
    scope: Scope,
    root: &Path,
    options: &DiscoveryOptions,
    candidates: &mut Vec<Candidate>,
    warnings: &mut Vec<DiscoveryWarning>,
) {
    if !root.exists() {
        return;
    }
    if let Err(err) = std::fs::read_dir(root) {
        warn!(root = %root.display(), error = %err, "skill root unreadable");
        warnings.push(DiscoveryWarning::from_error(
            root,
            &SkillsyncError::io(root, err),
        ));
        return;
    }
    debug!(platform = %platform, scope = %scope, root = %root.display(), "walking skill root");

    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(2)
        .follow_links(options.follow_symlinks)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().unwrap_or(root).to_path_buf();
                warnings.push(DiscoveryWarning {
                    path,
                    kind: ErrorKind::Io,
                    message: err.to_string(),
                });
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let is_candidate = match entry.depth() {
            1 if is_skill_file(path) => {
                warn!(path = %path.display(), "SKILL.md directly in a skill root; ignoring");
                warnings.push(DiscoveryWarning::from_error(
                    path,
                    &SkillsyncError::NotASkill {
                        path: path.to_path_buf(),
                        reason: format!("{SKILL_FILE} must live in a skill directory, not the root"),
                    },
                ));
                false
            }
            1 => has_markdown_extension(path),
            2 => is_skill_file(path),
            _ => false,
        };
        if is_candidate {
            candidates.push(Candidate {
                platform,
                scope,
                path: path.to_path_buf(),
            });
        }
    }
}
