//! Configuration providers.
//!
//! Uses `figment` to layer a YAML, TOML, or JSON file under environment
//! variables. Keys are read with dot notation (`validation.sample_limit`).

use crate::error::ConfigError;
use figment::{
    Figment,
    providers::{Env, Format, Json, Toml, Yaml},
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Default environment prefix for [`FileConfigProvider`].
pub const ENV_PREFIX: &str = "CLEANFLOW_";

/// Source of tunable settings.
pub trait ConfigProvider: Send + Sync {
    /// Load the configuration. Loading twice is a no-op.
    fn load(&self) -> Result<(), ConfigError>;

    /// Drop any cached configuration and load again.
    fn reload(&self) -> Result<(), ConfigError>;

    /// Value at a dot-separated `key`, or `default` when the key is absent.
    fn get(&self, key: &str, default: Value) -> Value;
}

/// Walk a dot-separated key through nested objects.
pub fn lookup<'a>(tree: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.')
        .try_fold(tree, |node, part| node.as_object()?.get(part))
}

/// File-backed provider, format picked from the file extension.
pub struct FileConfigProvider {
    path: PathBuf,
    env_prefix: Option<String>,
    tree: RwLock<Option<Arc<Value>>>,
}

impl FileConfigProvider {
    /// Provider for `path`, with `CLEANFLOW_*` environment overrides.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            env_prefix: Some(ENV_PREFIX.to_string()),
            tree: RwLock::new(None),
        }
    }

    /// Use a different environment prefix, or none at all.
    pub fn with_env_prefix(mut self, prefix: Option<&str>) -> Self {
        self.env_prefix = prefix.map(str::to_string);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn figment(&self) -> Result<Figment, ConfigError> {
        if !self.path.exists() {
            return Err(ConfigError::FileNotFound {
                path: self.path.clone(),
            });
        }
        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let mut figment = match ext.as_deref() {
            Some("yaml") | Some("yml") => Figment::from(Yaml::file(&self.path)),
            Some("toml") => Figment::from(Toml::file(&self.path)),
            Some("json") => Figment::from(Json::file(&self.path)),
            _ => {
                return Err(ConfigError::UnsupportedFormat {
                    path: self.path.clone(),
                });
            }
        };

        // CLEANFLOW_VALIDATION__SAMPLE_LIMIT -> validation.sample_limit
        if let Some(prefix) = &self.env_prefix {
            figment = figment.merge(Env::prefixed(prefix).split("__"));
        }
        Ok(figment)
    }

    fn read_tree(&self) -> Result<Arc<Value>, ConfigError> {
        let tree: Value = self.figment()?.extract().map_err(Box::new)?;
        tracing::debug!(path = %self.path.display(), "Configuration loaded");
        Ok(Arc::new(tree))
    }

    fn cached(&self) -> Option<Arc<Value>> {
        self.tree
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn store(&self, tree: Option<Arc<Value>>) {
        *self
            .tree
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = tree;
    }
}

impl ConfigProvider for FileConfigProvider {
    fn load(&self) -> Result<(), ConfigError> {
        if self.cached().is_none() {
            self.store(Some(self.read_tree()?));
        }
        Ok(())
    }

    fn reload(&self) -> Result<(), ConfigError> {
        self.store(None);
        self.load()
    }

    /// Loads lazily; if loading fails the failure is logged and `default` returned.
    fn get(&self, key: &str, default: Value) -> Value {
        if let Err(e) = self.load() {
            tracing::warn!(path = %self.path.display(), error = %e, "Configuration unavailable, using default");
            return default;
        }
        self.cached()
            .and_then(|tree| lookup(&tree, key).cloned())
            .unwrap_or(default)
    }
}

/// In-memory provider over a fixed tree.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider {
    tree: Value,
}

impl StaticConfigProvider {
    pub fn new(tree: Value) -> Self {
        Self { tree }
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn load(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    fn reload(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    fn get(&self, key: &str, default: Value) -> Value {
        lookup(&self.tree, key).cloned().unwrap_or(default)
    }
}
