//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/tslkit/tslkit.toml`
//! 3. Local config: `.tslkit.toml` next to the processed document
//! 4. Environment variables: `TSLKIT__*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;

/// Steps of the save pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Give every extension content item its own `Extension` wrapper
    pub split_extensions: bool,
    /// Remove empty elements and placeholder values
    pub remove_empty: bool,
    /// Sort collection elements
    pub sort_children: bool,
    /// Reverse the collection order
    pub descending: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            split_extensions: true,
            remove_empty: true,
            sort_children: true,
            descending: false,
        }
    }
}

/// Raw normalize config for intermediate parsing.
///
/// `None` means "not specified, inherit from the layer below".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawNormalizeConfig {
    pub split_extensions: Option<bool>,
    pub remove_empty: Option<bool>,
    pub sort_children: Option<bool>,
    pub descending: Option<bool>,
}

impl NormalizeConfig {
    /// Overlay wins where it specifies a value.
    pub fn merge(&self, overlay: &RawNormalizeConfig) -> Self {
        Self {
            split_extensions: overlay.split_extensions.unwrap_or(self.split_extensions),
            remove_empty: overlay.remove_empty.unwrap_or(self.remove_empty),
            sort_children: overlay.sort_children.unwrap_or(self.sort_children),
            descending: overlay.descending.unwrap_or(self.descending),
        }
    }
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub indent: Option<usize>,
    #[serde(default)]
    pub normalize: RawNormalizeConfig,
}

/// Unified configuration for tslkit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Spaces per nesting level when writing XML (0 writes a single line)
    pub indent: usize,
    /// Save pipeline steps
    pub normalize: NormalizeConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            indent: 2,
            normalize: NormalizeConfig::default(),
        }
    }
}

/// Get the XDG config directory for tslkit.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "tslkit").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| config_file_in(&dir))
}

/// Config file inside an explicit config directory.
pub fn config_file_in(dir: &Path) -> PathBuf {
    dir.join("tslkit.toml")
}

/// Get the path to the local config file in a document directory.
pub fn local_config_path(document_dir: &Path) -> PathBuf {
    document_dir.join(".tslkit.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            indent: overlay.indent.unwrap_or(self.indent),
            normalize: self.normalize.merge(&overlay.normalize),
        }
    }

    /// Load settings with layered precedence, using the XDG global config.
    ///
    /// # Arguments
    /// * `document_dir` - Optional directory of the processed document for local config
    pub fn load(document_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_with(global_config_path().as_deref(), document_dir)
    }

    /// Load settings with an explicit global config file.
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. `global_path`, if it exists
    /// 3. `<document_dir>/.tslkit.toml`, if it exists
    /// 4. Environment variables: `TSLKIT__*` prefix
    pub fn load_with(global_path: Option<&Path>, document_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_path {
            if global_path.exists() {
                debug!("Loading global config: {}", global_path.display());
                let raw = load_raw_settings(global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = document_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("Loading local config: {}", local_path.display());
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        Self::apply_env_overrides(current)
    }

    /// Apply TSLKIT__* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(Environment::with_prefix("TSLKIT").separator("__"));
        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get::<usize>("indent") {
            settings.indent = val;
        }
        if let Ok(val) = config.get_bool("normalize.split_extensions") {
            settings.normalize.split_extensions = val;
        }
        if let Ok(val) = config.get_bool("normalize.remove_empty") {
            settings.normalize.remove_empty = val;
        }
        if let Ok(val) = config.get_bool("normalize.sort_children") {
            settings.normalize.sort_children = val;
        }
        if let Ok(val) = config.get_bool("normalize.descending") {
            settings.normalize.descending = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# tslkit configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/tslkit/tslkit.toml
#   Local:  .tslkit.toml next to the document
#   Env:    TSLKIT__* environment variables, e.g. TSLKIT__NORMALIZE__DESCENDING=true

# Spaces per nesting level when writing XML, 0 writes a single line
# indent = 2

[normalize]
# Give every extension content item its own Extension element
# split_extensions = true

# Remove empty elements and "----" placeholder values
# remove_empty = true

# Sort pointers, providers, services, history and extensions
# sort_children = true

# Reverse the sort order
# descending = false
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
