use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::kernel::error::Result;
use crate::storage::error::StorageSystemError;
use crate::storage::StorageProvider;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yml, .yaml)
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            ConfigFormat::Yaml => "yml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

/// In-memory representation of one configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigData {
    #[serde(flatten)]
    values: HashMap<String, serde_json::Value>,
}

impl ConfigData {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a configuration value, `None` if missing or of the wrong shape
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Get a configuration value with default
    pub fn get_or<T: for<'de> Deserialize<'de>>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Set a configuration value
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let json_value =
            serde_json::to_value(value).map_err(|e| StorageSystemError::serialization("json", e))?;
        self.values.insert(key.to_string(), json_value);
        Ok(())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Serialize to string based on format
    pub fn serialize(&self, format: ConfigFormat) -> Result<String> {
        let text = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(&self)
                .map_err(|e| StorageSystemError::serialization("json", e))?,
            ConfigFormat::Yaml => {
                serde_yaml::to_string(&self).map_err(|e| StorageSystemError::serialization("yaml", e))?
            }
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => {
                toml::to_string_pretty(&self).map_err(|e| StorageSystemError::serialization("toml", e))?
            }
        };
        Ok(text)
    }

    /// Deserialize from string based on format
    pub fn deserialize(data: &str, format: ConfigFormat) -> Result<Self> {
        let config = match format {
            ConfigFormat::Json => {
                serde_json::from_str(data).map_err(|e| StorageSystemError::deserialization("json", e))?
            }
            ConfigFormat::Yaml => {
                serde_yaml::from_str(data).map_err(|e| StorageSystemError::deserialization("yaml", e))?
            }
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => {
                toml::from_str(data).map_err(|e| StorageSystemError::deserialization("toml", e))?
            }
        };
        Ok(config)
    }
}

/// Loads, saves and caches named configuration documents under one directory
#[derive(Debug)]
pub struct ConfigManager {
    provider: Arc<dyn StorageProvider>,
    config_dir: PathBuf,
    default_format: ConfigFormat,
    cache: Mutex<HashMap<String, ConfigData>>,
}

impl ConfigManager {
    pub fn new(provider: Arc<dyn StorageProvider>, config_dir: PathBuf, default_format: ConfigFormat) -> Self {
        Self {
            provider,
            config_dir,
            default_format,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn default_format(&self) -> ConfigFormat {
        self.default_format
    }

    /// Find the file backing `name`, preferring an existing file of any
    /// supported format over the default extension
    pub fn resolve_config_path(&self, name: &str) -> PathBuf {
        if Path::new(name).extension().is_some() {
            return self.config_dir.join(name);
        }
        let mut candidates = vec![ConfigFormat::Yaml, ConfigFormat::Json];
        #[cfg(feature = "toml-config")]
        candidates.push(ConfigFormat::Toml);
        candidates
            .into_iter()
            .map(|format| self.config_dir.join(format!("{}.{}", name, format.extension())))
            .find(|path| self.provider.is_file(path))
            .unwrap_or_else(|| {
                self.config_dir
                    .join(format!("{}.{}", name, self.default_format.extension()))
            })
    }

    /// Whether a document for `name` exists on disk
    pub fn exists(&self, name: &str) -> bool {
        self.provider.is_file(&self.resolve_config_path(name))
    }

    /// Load configuration from disk; a missing file yields an empty document
    pub fn load_config(&self, name: &str) -> Result<ConfigData> {
        if let Some(config) = self.cache.lock().get(name) {
            return Ok(config.clone());
        }

        let path = self.resolve_config_path(name);
        let config = if self.provider.exists(&path) {
            let format = ConfigFormat::from_path(&path).ok_or_else(|| {
                StorageSystemError::UnsupportedConfigFormat(path.display().to_string())
            })?;
            let content = self.provider.read_to_string(&path)?;
            ConfigData::deserialize(&content, format)?
        } else {
            ConfigData::new()
        };

        self.cache.lock().insert(name.to_string(), config.clone());
        Ok(config)
    }

    /// Save configuration to disk and refresh the cache
    pub fn save_config(&self, name: &str, config: &ConfigData) -> Result<()> {
        let path = self.resolve_config_path(name);
        let format = ConfigFormat::from_path(&path).unwrap_or(self.default_format);
        let content = config.serialize(format)?;
        self.provider.write_string(&path, &content)?;
        self.cache.lock().insert(name.to_string(), config.clone());
        Ok(())
    }

    /// Drop a cached document so the next load re-reads the file
    pub fn invalidate_cache(&self, name: &str) {
        self.cache.lock().remove(name);
    }
}
