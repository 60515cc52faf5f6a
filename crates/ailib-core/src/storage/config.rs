use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json;
#[cfg(feature = "yaml-config")]
use serde_yaml;
#[cfg(feature = "toml-config")]
use toml;

use crate::kernel::constants;

/// Errors raised while loading or saving a [`ManagerConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown or unsupported config format for path: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Failed to read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize config to {format}: {message}")]
    Serialization { format: String, message: String },

    #[error("Failed to deserialize config from {format}: {message}")]
    Deserialization { format: String, message: String },
}

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
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
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
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
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

/// Settings for discovery and loading.
///
/// Every field has a default, so a config file only needs to name what it
/// overrides. Data directories are searched in order; the first directory
/// that declares a plugin key wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Data directories, highest priority first
    pub data_dirs: Vec<PathBuf>,
    /// Interfaces root, relative to each data directory
    pub interfaces_dir: PathBuf,
    /// Skirmish AIs root, relative to each data directory
    pub skirmish_ais_dir: PathBuf,
    pub interface_info_file: String,
    pub skirmish_ai_info_file: String,
    pub skirmish_ai_options_file: String,
    /// Library stem; `libAIInterface.so`, `AIInterface.dll`, ... depending on platform
    pub interface_library_name: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            data_dirs: Vec::new(),
            interfaces_dir: PathBuf::from(constants::AI_INTERFACES_DATA_DIR),
            skirmish_ais_dir: PathBuf::from(constants::SKIRMISH_AI_DATA_DIR),
            interface_info_file: constants::INTERFACE_INFO_FILE.to_string(),
            skirmish_ai_info_file: constants::SKIRMISH_AI_INFO_FILE.to_string(),
            skirmish_ai_options_file: constants::SKIRMISH_AI_OPTIONS_FILE.to_string(),
            interface_library_name: constants::INTERFACE_LIBRARY_NAME.to_string(),
        }
    }
}

impl ManagerConfig {
    /// Config with the given data directories and default layout
    pub fn with_data_dirs<I, P>(data_dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            data_dirs: data_dirs.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Add a data directory with the lowest priority so far
    pub fn add_data_dir<P: Into<PathBuf>>(&mut self, dir: P) -> &mut Self {
        self.data_dirs.push(dir.into());
        self
    }

    /// Load a config file, choosing the format from its extension
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::deserialize(&content, format)
    }

    /// Serialize to string based on format
    pub fn serialize(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        let failed = |message: String| ConfigError::Serialization {
            format: format.extension().to_string(),
            message,
        };
        match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self).map_err(|e| failed(e.to_string())),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::to_string(self).map_err(|e| failed(e.to_string())),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::to_string_pretty(self).map_err(|e| failed(e.to_string())),
        }
    }

    /// Deserialize from string based on format
    pub fn deserialize(data: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        let failed = |message: String| ConfigError::Deserialization {
            format: format.extension().to_string(),
            message,
        };
        match format {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| failed(e.to_string())),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| failed(e.to_string())),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| failed(e.to_string())),
        }
    }
}
