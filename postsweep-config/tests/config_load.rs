use postsweep_config::{PostsweepConfigLoader, StorageMode};
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn file_values_and_placeholders_load() {
    let tmp = TempDir::new().unwrap();
    let file_yaml = r#"
graph:
  base_url: "http://localhost:8080"
  timeout_secs: 5
storage:
  mode: platform
  token: "${PLATFORM_TOKEN}"
  key_value_store_id: "kv-1"
  dataset_id: "ds-1"
logging:
  format: json
"#;
    let p = write_yaml(&tmp, "postsweep.yaml", file_yaml);

    temp_env::with_var("PLATFORM_TOKEN", Some("from-env"), || {
        let config = PostsweepConfigLoader::new()
            .with_file(&p)
            .load()
            .expect("load config");

        assert_eq!(config.graph.base_url, "http://localhost:8080");
        assert_eq!(config.graph.timeout_secs, 5);
        assert_eq!(config.graph.api_version, "v19.0");
        assert_eq!(config.storage.mode, StorageMode::Platform);
        assert_eq!(config.storage.token.as_deref(), Some("from-env"));
        assert_eq!(config.logging.format, "json");
    });
}

#[test]
#[serial]
fn environment_overrides_file() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(
        &tmp,
        "postsweep.yaml",
        "graph:\n  api_version: v17.0\n  timeout_secs: 10\n",
    );

    temp_env::with_vars(
        [
            ("POSTSWEEP__GRAPH__API_VERSION", Some("v20.0")),
            ("POSTSWEEP__GRAPH__TIMEOUT_SECS", Some("3")),
            ("POSTSWEEP__STORAGE__DIR", Some("/tmp/sweep")),
        ],
        || {
            let config = PostsweepConfigLoader::new()
                .with_file(&p)
                .load()
                .expect("load config");

            assert_eq!(config.graph.api_version, "v20.0");
            assert_eq!(config.graph.timeout_secs, 3);
            assert_eq!(config.storage.dir, PathBuf::from("/tmp/sweep"));
        },
    );
}

#[test]
#[serial]
fn missing_optional_file_falls_back_to_defaults() {
    let tmp = TempDir::new().unwrap();
    let config = PostsweepConfigLoader::new()
        .with_optional_file(tmp.path().join("absent.yaml"))
        .load()
        .expect("defaults");

    assert_eq!(config.storage.mode, StorageMode::Local);
    assert_eq!(config.storage.dir, PathBuf::from("storage"));
    assert!(config.logging.stderr);
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let result = PostsweepConfigLoader::new()
        .with_file(tmp.path().join("absent.yaml"))
        .load();
    assert!(result.is_err());
}

#[test]
#[serial]
fn numeric_env_values_load_into_string_fields() {
    temp_env::with_vars(
        [
            ("POSTSWEEP__STORAGE__DATASET_ID", Some("123456")),
            ("POSTSWEEP__STORAGE__KEY_VALUE_STORE_ID", Some("42")),
            ("POSTSWEEP__STORAGE__TOKEN", Some("007")),
            ("POSTSWEEP__STORAGE__INPUT_KEY", Some("1")),
            ("POSTSWEEP__GRAPH__API_VERSION", Some("19")),
            ("POSTSWEEP__LOGGING__STDERR", Some("false")),
        ],
        || {
            let config = PostsweepConfigLoader::new().load().expect("load config");

            assert_eq!(config.storage.dataset_id.as_deref(), Some("123456"));
            assert_eq!(config.storage.key_value_store_id.as_deref(), Some("42"));
            assert_eq!(config.storage.token.as_deref(), Some("007"));
            assert_eq!(config.storage.input_key, "1");
            assert_eq!(config.graph.api_version, "19");
            assert!(!config.logging.stderr);
        },
    );
}
