//! Analysis configuration
//!
//! Loaded from a TOML file, every field optional:
//!
//! ```toml
//! [analysis]
//! selected_player = 12
//! disabled_modules = ["invoke_chiji"]
//!
//! [normalizer]
//! cast_buffer_ms = 150
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default window for linking an application to its cast
pub const DEFAULT_CAST_BUFFER_MS: u64 = 150;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub analysis: AnalysisSection,
    pub normalizer: NormalizerSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSection {
    /// Overrides the replay's selected player
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_player: Option<i64>,
    /// Modules forced dormant regardless of loadout
    pub disabled_modules: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerSection {
    pub cast_buffer_ms: u64,
}

impl Default for NormalizerSection {
    fn default() -> Self {
        Self {
            cast_buffer_ms: DEFAULT_CAST_BUFFER_MS,
        }
    }
}

impl AnalysisConfig {
    /// Load `path` if it exists, defaults otherwise.
    ///
    /// A file that exists but fails to parse is an error, not a silent default.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        load_file(path)
    }

    pub fn is_disabled(&self, module: &str) -> bool {
        self.analysis.disabled_modules.iter().any(|m| m == module)
    }
}

/// Load a single TOML config file
pub fn load_file(path: &Path) -> Result<AnalysisConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Save a config to a TOML file
pub fn save_file(path: &Path, config: &AnalysisConfig) -> Result<(), ConfigError> {
    let contents = toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError {
        path: path.to_path_buf(),
        source: e,
    })?;

    fs::write(path, contents).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// `<user config dir>/linkcast/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("linkcast").join("config.toml"))
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error in {path:?}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Serialize error for {path:?}: {source}")]
    SerializeError {
        path: PathBuf,
        #[source]
        source: toml::ser::Error,
    },
}
