use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::app::AppContext;
use crate::config::Config;
use crate::core::{Platform, Scope};
use crate::discovery::{DiscoveryEngine, PathInputs, PathResolver, SKILLS_DIR};
use crate::sync::layout_path;

/// Isolated filesystem with a fake home and a working directory.
///
/// ```text
/// <tmp>/home   user-scope roots live under here
/// <tmp>/work   repo-scope roots live under here
/// <tmp>/skillsync   backups and plugin roots
/// ```
pub struct UnitTestFixture {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub home: PathBuf,
    pub work_dir: PathBuf,
    pub skillsync_home: PathBuf,
}

impl Default for UnitTestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitTestFixture {
    #[must_use]
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let home = root.join("home");
        let work_dir = root.join("work");
        let skillsync_home = root.join("skillsync");
        for dir in [&home, &work_dir] {
            std::fs::create_dir_all(dir).expect("Failed to create fixture dir");
        }
        println!("[FIXTURE] Created temp directory: {root:?}");

        Self {
            temp_dir,
            root,
            home,
            work_dir,
            skillsync_home,
        }
    }

    /// Create a file relative to the fixture root.
    #[must_use]
    pub fn create_file(&self, relative_path: &str, content: &str) -> PathBuf {
        write_file(&self.root.join(relative_path), content)
    }

    /// Skills root for a writable scope.
    #[must_use]
    pub fn skill_root(&self, platform: Platform, scope: Scope) -> PathBuf {
        let base = match scope {
            Scope::Repo => &self.work_dir,
            _ => &self.home,
        };
        base.join(platform.config_dir()).join(SKILLS_DIR)
    }

    /// Write a skill using the platform's own layout.
    #[must_use]
    pub fn write_skill(&self, platform: Platform, scope: Scope, name: &str, content: &str) -> PathBuf {
        let path = layout_path(&self.skill_root(platform, scope), platform.layout(), name)
            .expect("fixture skill names are plain");
        write_file(&path, content)
    }

    /// Write `<root>/<name>/SKILL.md` regardless of platform layout.
    #[must_use]
    pub fn write_skill_dir(&self, platform: Platform, scope: Scope, name: &str, content: &str) -> PathBuf {
        let path = self.skill_root(platform, scope).join(name).join("SKILL.md");
        write_file(&path, content)
    }

    #[must_use]
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.paths.skillsync_home = Some(self.skillsync_home.to_string_lossy().into_owned());
        config
    }

    #[must_use]
    pub fn resolver(&self) -> PathResolver {
        PathResolver::new(
            PathInputs::from_config(&self.config(), Some(self.home.clone()))
                .with_repo_root(self.work_dir.clone()),
        )
    }

    #[must_use]
    pub fn engine(&self) -> DiscoveryEngine {
        DiscoveryEngine::new(self.resolver())
    }

    /// App context rooted in the fixture, as the CLI would build it.
    #[must_use]
    pub fn context(&self) -> AppContext {
        AppContext::with_config(self.config(), Some(self.home.clone()), self.work_dir.clone(), true, 0)
    }

    #[must_use]
    pub fn read(&self, path: &Path) -> String {
        std::fs::read_to_string(path).expect("Failed to read fixture file")
    }
}

fn write_file(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
    }
    std::fs::write(path, content).expect("Failed to write file");
    println!("[FIXTURE] Created file: {path:?} ({} bytes)", content.len());
    path.to_path_buf()
}

impl Drop for UnitTestFixture {
    fn drop(&mut self) {
        println!("[FIXTURE] Cleaning up temp directory: {:?}", self.root);
    }
}
