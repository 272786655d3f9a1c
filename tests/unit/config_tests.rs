use std::path::Path;

use skillsync::config::Config;
use skillsync::error::ErrorKind;
use skillsync::similarity::NameAlgorithm;
use skillsync::sync::Strategy;

#[test]
fn defaults_match_documented_values() {
    let config = Config::default();
    assert!((config.similarity.name_threshold - 0.8).abs() < f64::EPSILON);
    assert!((config.similarity.content_threshold - 0.8).abs() < f64::EPSILON);
    assert_eq!(config.similarity.algorithm, NameAlgorithm::Combined);
    assert_eq!(config.sync.default_strategy, Strategy::Overwrite);
    assert!(config.sync.verify_writes);
    assert_eq!(config.backup.retention_days, 30);
}

#[test]
fn toml_overrides_only_named_keys() {
    let config = Config::from_toml_str(
        r#"
[similarity]
algorithm = "jaro-winkler"

[sync]
default_strategy = "three-way"

[backup]
retention_days = 7
"#,
    )
    .unwrap();
    assert_eq!(config.similarity.algorithm, NameAlgorithm::JaroWinkler);
    assert!((config.similarity.name_threshold - 0.8).abs() < f64::EPSILON);
    assert_eq!(config.sync.default_strategy, Strategy::ThreeWay);
    assert_eq!(config.backup.retention_days, 7);
}

#[test]
fn invalid_documents_are_config_errors() {
    for raw in [
        "[similarity]\nname_threshold = 1.5\n",
        "[sync]\ndefault_strategy = \"union\"\n",
        "[unknown]\nkey = 1\n",
    ] {
        let err = Config::from_toml_str(raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config, "{raw}");
    }
}

#[test]
fn env_overrides_apply_after_files() {
    let mut config = Config::from_toml_str("[backup]\nretention_days = 7\n").unwrap();
    config
        .apply_env_overrides(|key| match key {
            "SKILLSYNC_BACKUP_RETENTION_DAYS" => Some("90".to_string()),
            "SKILLSYNC_SYNC_STRATEGY" => Some("skip".to_string()),
            "SKILLSYNC_HOME" => Some("/srv/skillsync".to_string()),
            _ => None,
        })
        .unwrap();
    assert_eq!(config.backup.retention_days, 90);
    assert_eq!(config.sync.default_strategy, Strategy::Skip);
    assert_eq!(
        config.backup_dir(None, Path::new("/work")).unwrap(),
        Path::new("/srv/skillsync/backups")
    );

    let err = config
        .apply_env_overrides(|key| (key == "SKILLSYNC_NAME_THRESHOLD").then(|| "high".to_string()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}
