//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/skillmix/skillmix.toml`
//! 3. Local config: `<data_dir>/.skillmix.toml`
//! 4. Environment variables: `SKILLMIX_*` prefix, `__` between sections

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Rendering of written dimension files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    /// Indent JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

/// Scenario enumeration defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CombineConfig {
    /// Combinations printed by `combine` unless `--limit` is given
    pub preview_limit: usize,
}

impl Default for CombineConfig {
    fn default() -> Self {
        Self { preview_limit: 10 }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified, inherit").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub data_dir: Option<PathBuf>,
    pub output: RawOutputConfig,
    pub combine: RawCombineConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawOutputConfig {
    pub pretty: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawCombineConfig {
    pub preview_limit: Option<usize>,
}

/// Unified configuration for skillmix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the dimension catalog (`*.json`)
    pub data_dir: PathBuf,
    pub output: OutputConfig,
    pub combine: CombineConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            output: OutputConfig::default(),
            combine: CombineConfig::default(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    ProjectDirs::from("", "", "skillmix")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.local/share/skillmix"))
}

/// Get the XDG config directory for skillmix.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "skillmix").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("skillmix.toml"))
}

/// Get the path to the local config file in a data directory.
pub fn local_config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(".skillmix.toml")
}

/// Expand `~`, `$VAR` and `${VAR}`; unresolvable input is returned unchanged.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
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
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.data_dir.to_string_lossy().as_ref());
        self.data_dir = PathBuf::from(expanded);
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            data_dir: overlay
                .data_dir
                .clone()
                .unwrap_or_else(|| self.data_dir.clone()),
            output: OutputConfig {
                pretty: overlay.output.pretty.unwrap_or(self.output.pretty),
            },
            combine: CombineConfig {
                preview_limit: overlay
                    .combine
                    .preview_limit
                    .unwrap_or(self.combine.preview_limit),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `data_dir` - Data directory whose `.skillmix.toml` is layered over the global config.
    ///   When `None`, the data directory from defaults/global config is used.
    pub fn load(data_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // An explicit data dir beats whatever the global file says
        if let Some(dir) = data_dir {
            current.data_dir = dir.to_path_buf();
        }
        current.expand_paths();

        let local_path = local_config_path(&current.data_dir);
        if local_path.exists() {
            let raw = load_raw_settings(&local_path)?;
            current = current.merge_with(&raw);
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply SKILLMIX_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("SKILLMIX")
                .prefix_separator("_")
                .separator("__"),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("data_dir") {
            settings.data_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_bool("output.pretty") {
            settings.output.pretty = val;
        }
        if let Ok(val) = config.get_int("combine.preview_limit") {
            settings.combine.preview_limit =
                usize::try_from(val).map_err(|_| ApplicationError::Config {
                    message: format!("combine.preview_limit must not be negative: {val}"),
                })?;
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
        r#"# skillmix configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/skillmix/skillmix.toml
#   Local:  <data_dir>/.skillmix.toml
#   Env:    SKILLMIX_* environment variables, e.g. SKILLMIX_COMBINE__PREVIEW_LIMIT=50

# Directory holding dimension files (*.json)
# data_dir = "~/.local/share/skillmix"

[output]
# Indent written JSON
# pretty = true

[combine]
# Combinations printed by `skillmix combine` without --limit
# preview_limit = 10
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_default_settings_when_created_then_has_expected_values() {
        let settings = Settings::default();
        assert!(settings.output.pretty);
        assert_eq!(settings.combine.preview_limit, 10);
        assert!(settings.data_dir.to_string_lossy().contains("skillmix"));
    }

    #[test]
    fn given_partial_overlay_when_merging_then_only_specified_fields_change() {
        let base = Settings::default();
        let overlay = RawSettings {
            data_dir: None,
            output: RawOutputConfig { pretty: Some(false) },
            combine: RawCombineConfig::default(),
        };

        let result = base.merge_with(&overlay);

        assert_eq!(result.data_dir, base.data_dir);
        assert!(!result.output.pretty);
        assert_eq!(result.combine.preview_limit, 10);
    }

    #[test]
    fn given_tilde_in_data_dir_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            data_dir: PathBuf::from("~/taxonomies"),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let data_str = settings.data_dir.to_string_lossy();
        assert!(data_str.starts_with(&home), "data_dir should start with home: {data_str}");
        assert!(!data_str.contains('~'));
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("template parses");
        assert!(raw.data_dir.is_none());
    }
}
