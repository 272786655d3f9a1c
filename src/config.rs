use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SkillsyncError};
use crate::similarity::NameAlgorithm;
use crate::sync::Strategy;
use crate::utils::fs::{expand_path, find_upwards};

pub const CONFIG_FILE: &str = "config.toml";
pub const PROJECT_DIR: &str = ".skillsync";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub similarity: SimilarityConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub backup: BackupConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

impl Config {
    /// Load defaults, then the global and project files (or the explicit
    /// file instead of both), then environment overrides.
    pub fn load(explicit_path: Option<&Path>, working_dir: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("SKILLSYNC_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            match Self::load_patch(&path)? {
                Some(patch) => config.merge_patch(patch),
                None => {
                    return Err(SkillsyncError::Config(format!(
                        "config file {} not found",
                        path.display()
                    )));
                }
            }
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_project(working_dir)? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Parse a TOML document on top of the defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let patch: ConfigPatch = toml::from_str(raw)
            .map_err(|err| SkillsyncError::Config(format!("parse config: {err}")))?;
        let mut config = Self::default();
        config.merge_patch(patch);
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn global_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("skillsync").join(CONFIG_FILE))
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        match Self::global_path() {
            Some(path) => Self::load_patch(&path),
            None => Ok(None),
        }
    }

    fn load_project(working_dir: &Path) -> Result<Option<ConfigPatch>> {
        match find_upwards(working_dir, PROJECT_DIR) {
            Some(dir) => Self::load_patch(&dir.join(CONFIG_FILE)),
            None => Ok(None),
        }
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.is_file() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| SkillsyncError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw).map_err(|err| {
            SkillsyncError::Config(format!("parse config {}: {err}", path.display()))
        })?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.similarity {
            self.similarity.merge(patch);
        }
        if let Some(patch) = patch.sync {
            self.sync.merge(patch);
        }
        if let Some(patch) = patch.backup {
            self.backup.merge(patch);
        }
        if let Some(patch) = patch.paths {
            self.paths.merge(patch);
        }
        if let Some(patch) = patch.discovery {
            self.discovery.merge(patch);
        }
    }

    /// Apply `SKILLSYNC_*` overrides read through `lookup`.
    ///
    /// `SKILLSYNC_HOME` only fills `paths.skillsync_home` when no file set it.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.paths.skillsync_home.is_none() {
            if let Some(value) = lookup("SKILLSYNC_HOME").filter(|v| !v.trim().is_empty()) {
                self.paths.skillsync_home = Some(value);
            }
        }

        if let Some(value) = lookup("SKILLSYNC_SIMILARITY_ALGORITHM") {
            self.similarity.algorithm = value.parse().map_err(as_config_error)?;
        }
        if let Some(value) = env_f64(&lookup, "SKILLSYNC_NAME_THRESHOLD")? {
            self.similarity.name_threshold = value;
        }
        if let Some(value) = env_f64(&lookup, "SKILLSYNC_CONTENT_THRESHOLD")? {
            self.similarity.content_threshold = value;
        }

        if let Some(value) = lookup("SKILLSYNC_SYNC_STRATEGY") {
            self.sync.default_strategy = value.parse().map_err(as_config_error)?;
        }

        if let Some(value) = env_u32(&lookup, "SKILLSYNC_BACKUP_RETENTION_DAYS")? {
            self.backup.retention_days = value;
        }
        if let Some(value) = lookup("SKILLSYNC_BACKUP_DIR") {
            self.backup.dir = Some(value);
        }

        if let Some(value) = env_bool(&lookup, "SKILLSYNC_FOLLOW_SYMLINKS") {
            self.discovery.follow_symlinks = value;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("similarity.name_threshold", self.similarity.name_threshold),
            ("similarity.content_threshold", self.similarity.content_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SkillsyncError::Config(format!(
                    "{key} must be within 0..=1, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// `paths.skillsync_home`, else `<home>/.skillsync`.
    #[must_use]
    pub fn skillsync_home(&self, home: Option<&Path>, base: &Path) -> Option<PathBuf> {
        match &self.paths.skillsync_home {
            Some(raw) => Some(expand_path(raw, home, base)),
            None => home.map(|h| h.join(".skillsync")),
        }
    }

    /// `backup.dir`, else `<skillsync_home>/backups`.
    #[must_use]
    pub fn backup_dir(&self, home: Option<&Path>, base: &Path) -> Option<PathBuf> {
        match &self.backup.dir {
            Some(raw) => Some(expand_path(raw, home, base)),
            None => self
                .skillsync_home(home, base)
                .map(|dir| dir.join("backups")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarityConfig {
    pub name_threshold: f64,
    pub content_threshold: f64,
    pub algorithm: NameAlgorithm,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            name_threshold: 0.8,
            content_threshold: 0.8,
            algorithm: NameAlgorithm::Combined,
        }
    }
}

impl SimilarityConfig {
    fn merge(&mut self, patch: SimilarityPatch) {
        if let Some(value) = patch.name_threshold {
            self.name_threshold = value;
        }
        if let Some(value) = patch.content_threshold {
            self.content_threshold = value;
        }
        if let Some(value) = patch.algorithm {
            self.algorithm = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncConfig {
    pub default_strategy: Strategy,
    pub abort_on_error: bool,
    pub verify_writes: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            default_strategy: Strategy::Overwrite,
            abort_on_error: false,
            verify_writes: true,
        }
    }
}

impl SyncConfig {
    fn merge(&mut self, patch: SyncPatch) {
        if let Some(value) = patch.default_strategy {
            self.default_strategy = value;
        }
        if let Some(value) = patch.abort_on_error {
            self.abort_on_error = value;
        }
        if let Some(value) = patch.verify_writes {
            self.verify_writes = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackupConfig {
    pub retention_days: u32,
    pub dir: Option<String>,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            retention_days: 30,
            dir: None,
        }
    }
}

impl BackupConfig {
    fn merge(&mut self, patch: BackupPatch) {
        if let Some(value) = patch.retention_days {
            self.retention_days = value;
        }
        if let Some(value) = patch.dir {
            self.dir = Some(value);
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PathsConfig {
    pub skillsync_home: Option<String>,
    pub admin: Option<String>,
    pub system: Option<String>,
    pub builtin: Option<String>,
}

impl PathsConfig {
    fn merge(&mut self, patch: PathsPatch) {
        if let Some(value) = patch.skillsync_home {
            self.skillsync_home = Some(value);
        }
        if let Some(value) = patch.admin {
            self.admin = Some(value);
        }
        if let Some(value) = patch.system {
            self.system = Some(value);
        }
        if let Some(value) = patch.builtin {
            self.builtin = Some(value);
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscoveryConfig {
    pub follow_symlinks: bool,
}

impl DiscoveryConfig {
    fn merge(&mut self, patch: DiscoveryPatch) {
        if let Some(value) = patch.follow_symlinks {
            self.follow_symlinks = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    pub similarity: Option<SimilarityPatch>,
    pub sync: Option<SyncPatch>,
    pub backup: Option<BackupPatch>,
    pub paths: Option<PathsPatch>,
    pub discovery: Option<DiscoveryPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SimilarityPatch {
    pub name_threshold: Option<f64>,
    pub content_threshold: Option<f64>,
    pub algorithm: Option<NameAlgorithm>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SyncPatch {
    pub default_strategy: Option<Strategy>,
    pub abort_on_error: Option<bool>,
    pub verify_writes: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct BackupPatch {
    pub retention_days: Option<u32>,
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PathsPatch {
    pub skillsync_home: Option<String>,
    pub admin: Option<String>,
    pub system: Option<String>,
    pub builtin: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DiscoveryPatch {
    pub follow_symlinks: Option<bool>,
}

fn as_config_error(err: SkillsyncError) -> SkillsyncError {
    match err {
        SkillsyncError::Usage(message) => SkillsyncError::Config(message),
        other => other,
    }
}

fn env_bool<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str) -> Option<bool> {
    lookup(key).map(|value| {
        matches!(
            value.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn env_u32<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str) -> Result<Option<u32>> {
    match lookup(key) {
        Some(value) => value.trim().parse::<u32>().map(Some).map_err(|err| {
            SkillsyncError::Config(format!("invalid {key} value {value}: {err}"))
        }),
        None => Ok(None),
    }
}

fn env_f64<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str) -> Result<Option<f64>> {
    match lookup(key) {
        Some(value) => value.trim().parse::<f64>().map(Some).map_err(|err| {
            SkillsyncError::Config(format!("invalid {key} value {value}: {err}"))
        }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use tempfile::tempdir;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert!((config.similarity.name_threshold - 0.8).abs() < f64::EPSILON);
        assert_eq!(config.similarity.algorithm, NameAlgorithm::Combined);
        assert_eq!(config.sync.default_strategy, Strategy::Overwrite);
        assert_eq!(config.backup.retention_days, 30);
        assert!(!config.discovery.follow_symlinks);
    }

    #[test]
    fn toml_patch_only_touches_given_keys() {
        let config = Config::from_toml_str(
            "[similarity]\nalgorithm = \"jaro-winkler\"\n\n[sync]\ndefault_strategy = \"three-way\"\n",
        )
        .unwrap();
        assert_eq!(config.similarity.algorithm, NameAlgorithm::JaroWinkler);
        assert_eq!(config.sync.default_strategy, Strategy::ThreeWay);
        assert!(config.sync.verify_writes);
        assert!((config.similarity.content_threshold - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_strategy_is_config_error() {
        let err = Config::from_toml_str("[sync]\ndefault_strategy = \"yolo\"\n").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }

    #[test]
    fn threshold_out_of_range_is_rejected() {
        let err = Config::from_toml_str("[similarity]\nname_threshold = 1.5\n").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = Config::default();
        config
            .apply_env_overrides(lookup(&[
                ("SKILLSYNC_SIMILARITY_ALGORITHM", "levenshtein"),
                ("SKILLSYNC_NAME_THRESHOLD", "0.6"),
                ("SKILLSYNC_SYNC_STRATEGY", "newer"),
                ("SKILLSYNC_BACKUP_RETENTION_DAYS", "7"),
                ("SKILLSYNC_FOLLOW_SYMLINKS", "yes"),
                ("SKILLSYNC_HOME", "/opt/ss"),
            ]))
            .unwrap();
        assert_eq!(config.similarity.algorithm, NameAlgorithm::Levenshtein);
        assert!((config.similarity.name_threshold - 0.6).abs() < f64::EPSILON);
        assert_eq!(config.sync.default_strategy, Strategy::Newer);
        assert_eq!(config.backup.retention_days, 7);
        assert!(config.discovery.follow_symlinks);
        assert_eq!(config.paths.skillsync_home.as_deref(), Some("/opt/ss"));
    }

    #[test]
    fn configured_home_beats_env_home() {
        let mut config = Config::from_toml_str("[paths]\nskillsync_home = \"/from/file\"\n").unwrap();
        config
            .apply_env_overrides(lookup(&[("SKILLSYNC_HOME", "/from/env")]))
            .unwrap();
        assert_eq!(config.paths.skillsync_home.as_deref(), Some("/from/file"));
    }

    #[test]
    fn invalid_env_number_is_config_error() {
        let mut config = Config::default();
        let err = config
            .apply_env_overrides(lookup(&[("SKILLSYNC_BACKUP_RETENTION_DAYS", "soon")]))
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }

    #[test]
    fn backup_dir_defaults_under_home() {
        let config = Config::default();
        let dir = config
            .backup_dir(Some(Path::new("/home/u")), Path::new("/work"))
            .unwrap();
        assert_eq!(dir, PathBuf::from("/home/u/.skillsync/backups"));
    }

    #[test]
    fn explicit_file_is_loaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[backup]\nretention_days = 3\n").unwrap();
        let config = Config::load(Some(&path), dir.path()).unwrap();
        assert_eq!(config.backup.retention_days, 3);
    }

    #[test]
    fn missing_explicit_file_is_config_error() {
        let dir = tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("absent.toml")), dir.path()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }
}
