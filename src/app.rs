use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::backup::{BackupController, FsBackupStore};
use crate::cli::Cli;
use crate::config::Config;
use crate::core::{CancelToken, Platform, Scope};
use crate::discovery::{DiscoveryEngine, DiscoveryOptions, DiscoveryResult, PathInputs, PathResolver};
use crate::error::{Result, SkillsyncError};
use crate::lifecycle::SkillLifecycle;
use crate::similarity::SimilarityEngine;
use crate::sync::{ExecuteOptions, SyncExecutor};
use crate::utils::expand_path;

/// Everything a command needs, built once from the command line.
pub struct AppContext {
    pub working_dir: PathBuf,
    pub home: Option<PathBuf>,
    pub config: Config,
    pub engine: DiscoveryEngine,
    pub similarity: SimilarityEngine,
    pub robot_mode: bool,
    pub verbosity: u8,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let current = std::env::current_dir().map_err(|err| SkillsyncError::io(".", err))?;
        let home = dirs::home_dir();
        let working_dir = match &cli.cwd {
            Some(dir) => expand_path(&dir.to_string_lossy(), home.as_deref(), &current),
            None => current,
        };
        if !working_dir.is_dir() {
            return Err(SkillsyncError::Usage(format!(
                "working directory {} does not exist",
                working_dir.display()
            )));
        }

        let config = Config::load(cli.config.as_deref(), &working_dir)?;
        Ok(Self::with_config(config, home, working_dir, cli.robot, cli.verbose))
    }

    /// Context over an explicit config, home and working directory.
    #[must_use]
    pub fn with_config(
        config: Config,
        home: Option<PathBuf>,
        working_dir: PathBuf,
        robot_mode: bool,
        verbosity: u8,
    ) -> Self {
        let resolver = PathResolver::new(PathInputs::from_config(&config, home.clone()));
        Self {
            engine: DiscoveryEngine::new(resolver),
            similarity: SimilarityEngine::from_config(&config.similarity),
            working_dir,
            home,
            config,
            robot_mode,
            verbosity,
        }
    }

    #[must_use]
    pub const fn resolver(&self) -> &PathResolver {
        self.engine.resolver()
    }

    /// Discovery options seeded from config.
    #[must_use]
    pub fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            follow_symlinks: self.config.discovery.follow_symlinks,
            ..DiscoveryOptions::default()
        }
    }

    pub fn discover(&self, platforms: &[Platform], options: &DiscoveryOptions) -> Result<DiscoveryResult> {
        self.engine.discover(platforms, &self.working_dir, options)
    }

    /// Where new skills land for `platform` in `scope`.
    #[must_use]
    pub fn write_root(&self, platform: Platform, scope: Scope) -> Option<PathBuf> {
        self.resolver().write_root(platform, scope, &self.working_dir)
    }

    pub fn backup_dir(&self) -> Result<PathBuf> {
        self.config
            .backup_dir(self.home.as_deref(), &self.working_dir)
            .ok_or_else(|| {
                SkillsyncError::Config(
                    "cannot determine a backup directory; set backup.dir or SKILLSYNC_HOME".to_string(),
                )
            })
    }

    /// Backup controller over the on-disk store. Opened on demand so
    /// read-only commands never create the backup directory.
    pub fn backups(&self) -> Result<BackupController> {
        let store = FsBackupStore::open(self.backup_dir()?)?;
        Ok(BackupController::new(Arc::new(store)))
    }

    pub fn executor(&self) -> Result<SyncExecutor> {
        Ok(SyncExecutor::new(self.backups()?))
    }

    pub fn lifecycle(&self) -> Result<SkillLifecycle> {
        let roots = Platform::ALL
            .iter()
            .flat_map(|platform| self.resolver().resolve(*platform, &self.working_dir).into_values())
            .flatten();
        Ok(SkillLifecycle::new(self.backups()?).with_protected_roots(roots))
    }

    #[must_use]
    pub fn execute_options(&self, cancel: CancelToken) -> ExecuteOptions {
        ExecuteOptions {
            abort_on_error: self.config.sync.abort_on_error,
            verify_writes: self.config.sync.verify_writes,
            cancel,
        }
    }

    #[must_use]
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.working_dir).unwrap_or(path)
    }
}
