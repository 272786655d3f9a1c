//! Scope-tier root resolution.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::core::{Platform, Scope};
use crate::utils::fs::expand_path;
use crate::utils::git::find_repo_root;

/// Name of the per-platform skills directory.
pub const SKILLS_DIR: &str = "skills";

/// Caller-supplied inputs for root resolution.
///
/// Override paths are raw strings so `~` and relative forms can be
/// expanded against `home` and the working directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathInputs {
    pub home: Option<PathBuf>,
    pub repo_root_hint: Option<PathBuf>,
    pub skillsync_home: Option<String>,
    pub admin: Option<String>,
    pub system: Option<String>,
    pub builtin: Option<String>,
}

impl PathInputs {
    /// Inputs drawn from the `[paths]` config section and `home`.
    #[must_use]
    pub fn from_config(config: &Config, home: Option<PathBuf>) -> Self {
        Self {
            home,
            repo_root_hint: None,
            skillsync_home: config.paths.skillsync_home.clone(),
            admin: config.paths.admin.clone(),
            system: config.paths.system.clone(),
            builtin: config.paths.builtin.clone(),
        }
    }

    #[must_use]
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    #[must_use]
    pub fn with_repo_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.repo_root_hint = Some(root.into());
        self
    }
}

/// Ordered candidate roots for one platform, keyed by scope in precedence order.
pub type TierRoots = BTreeMap<Scope, Vec<PathBuf>>;

/// Maps `(platform, working dir)` to the roots searched for each scope.
///
/// Resolution never fails: a tier whose root cannot be determined is empty.
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    inputs: PathInputs,
}

impl PathResolver {
    #[must_use]
    pub const fn new(inputs: PathInputs) -> Self {
        Self { inputs }
    }

    #[must_use]
    pub const fn inputs(&self) -> &PathInputs {
        &self.inputs
    }

    #[must_use]
    pub fn home(&self) -> Option<&Path> {
        self.inputs.home.as_deref()
    }

    pub fn resolve(&self, platform: Platform, working_dir: &Path) -> TierRoots {
        let mut tiers: TierRoots = Scope::ALL.iter().map(|s| (*s, Vec::new())).collect();
        let home = self.home();
        let platform_skills = |base: &Path| base.join(platform.config_dir()).join(SKILLS_DIR);

        let user_root = home.map(platform_skills);
        if let Some(root) = &user_root {
            push_root(&mut tiers, Scope::User, root.clone());
        }

        let working_dir = expand_path(&working_dir.to_string_lossy(), home, working_dir);
        let repo_root = self
            .inputs
            .repo_root_hint
            .as_ref()
            .map(|hint| expand_path(&hint.to_string_lossy(), home, &working_dir))
            .or_else(|| find_repo_root(&working_dir));
        let mut repo_roots = vec![platform_skills(&working_dir)];
        if let Some(root) = repo_root {
            repo_roots.push(platform_skills(&root));
        }
        for root in repo_roots {
            // Running from $HOME must not turn user skills into repo skills.
            if user_root.as_ref() != Some(&root) {
                push_root(&mut tiers, Scope::Repo, root);
            }
        }

        let plugin_base = match &self.inputs.skillsync_home {
            Some(raw) => Some(expand_path(raw, home, &working_dir)),
            None => home.map(|h| h.join(".skillsync")),
        };
        if let Some(base) = plugin_base {
            push_root(&mut tiers, Scope::Plugin, base.join("plugins").join(platform.id()));
        }

        for (scope, raw) in [
            (Scope::System, &self.inputs.system),
            (Scope::Admin, &self.inputs.admin),
            (Scope::Builtin, &self.inputs.builtin),
        ] {
            if let Some(raw) = raw {
                let base = expand_path(raw, home, &working_dir);
                push_root(&mut tiers, scope, base.join(platform.id()));
            }
        }

        tiers
    }

    /// First root of a writable tier; where new skills are written.
    pub fn write_root(&self, platform: Platform, scope: Scope, working_dir: &Path) -> Option<PathBuf> {
        self.resolve(platform, working_dir)
            .remove(&scope)
            .and_then(|roots| roots.into_iter().next())
    }
}

fn push_root(tiers: &mut TierRoots, scope: Scope, root: PathBuf) {
    let seen = tiers.values().any(|roots| roots.contains(&root));
    if !seen {
        tiers.entry(scope).or_default().push(root);
    }
}
