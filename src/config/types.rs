//! Application configuration types.

use crate::groups::TierSettings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub tiers: TierSettings,
}

impl Config {
    /// Load a single YAML file, without tier merging.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }
}

/// File locations used by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Sectioned YAML settings store.
    pub store: PathBuf,
    /// Preset interchange file (JSON).
    pub presets: PathBuf,
    /// Baseline snapshot (JSON, optionally gzipped).
    pub snapshot: PathBuf,
    /// Where `resolve` writes its bundle; stdout when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            store: PathBuf::from("tuning/settings.yaml"),
            presets: PathBuf::from("tuning/presets.json"),
            snapshot: PathBuf::from("tuning/snapshot.json"),
            output: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml(
            r#"
paths:
  presets: presets/all.json
tiers:
  global_enabled: false
"#,
        )
        .unwrap();

        assert_eq!(config.paths.presets, PathBuf::from("presets/all.json"));
        assert_eq!(config.paths.store, PathBuf::from("tuning/settings.yaml"));
        assert!(!config.tiers.global_enabled);
        assert!(!config.tiers.groups_enabled_by_default);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config, Config::default());
    }
}
