//! Loader for Postsweep configuration with YAML + environment overlays.
//!
//! Sources, lowest precedence first: built-in defaults, an optional YAML file,
//! then `POSTSWEEP__SECTION__KEY` environment variables. String values may use
//! `${VAR}` placeholders, which are expanded after merging.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct PostsweepConfig {
    pub graph: GraphSettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    pub base_url: String,
    pub api_version: String,
    pub timeout_secs: u64,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            base_url: "https://graph.facebook.com".into(),
            api_version: "v19.0".into(),
            timeout_secs: 30,
        }
    }
}

impl GraphSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    /// Key-value store and dataset live under `storage.dir`.
    #[default]
    Local,
    /// Key-value store and dataset are reached through the platform REST API.
    Platform,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub mode: StorageMode,
    /// Root of the local storage tree.
    pub dir: PathBuf,
    /// Key of the input record in the key-value store.
    pub input_key: String,
    pub api_base_url: String,
    pub token: Option<String>,
    pub key_value_store_id: Option<String>,
    pub dataset_id: Option<String>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            mode: StorageMode::Local,
            dir: PathBuf::from("storage"),
            input_key: "INPUT".into(),
            api_base_url: "https://api.apify.com".into(),
            token: None,
            key_value_store_id: None,
            dataset_id: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `text` or `json`.
    pub format: String,
    pub dir: Option<PathBuf>,
    pub stderr: bool,
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: "text".into(),
            dir: None,
            stderr: true,
            filter: "info".into(),
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct PostsweepConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for PostsweepConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PostsweepConfigLoader {
    /// Start with defaults plus `POSTSWEEP__` env overrides.
    ///
    /// ```
    /// use postsweep_config::{PostsweepConfigLoader, StorageMode};
    ///
    /// let config = PostsweepConfigLoader::new().load().expect("defaults load");
    ///
    /// assert_eq!(config.graph.api_version, "v19.0");
    /// assert_eq!(config.storage.mode, StorageMode::Local);
    /// assert_eq!(config.storage.input_key, "INPUT");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Like [`with_file`](Self::with_file), but a missing file is skipped.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use postsweep_config::{PostsweepConfigLoader, StorageMode};
    ///
    /// let cfg = PostsweepConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// graph:
    ///   api_version: "v18.0"
    /// storage:
    ///   mode: platform
    ///   dataset_id: "ds-1"
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.graph.api_version, "v18.0");
    /// assert_eq!(cfg.graph.base_url, "https://graph.facebook.com");
    /// assert_eq!(cfg.storage.mode, StorageMode::Platform);
    /// assert_eq!(cfg.storage.dataset_id.as_deref(), Some("ds-1"));
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// Environment variables are added last so they win over every file. Env
    /// values stay strings until the typed pass, so `POSTSWEEP__STORAGE__TOKEN=007`
    /// keeps its leading zeros while `POSTSWEEP__GRAPH__TIMEOUT_SECS=3` still
    /// lands in a number field.
    pub fn load(self) -> Result<PostsweepConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(Environment::with_prefix("POSTSWEEP").separator("__"))
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        // Second pass through `config` so its string/number coercions apply.
        Config::try_from(&v)?.try_deserialize()
    }
}
