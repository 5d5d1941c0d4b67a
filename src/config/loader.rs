//! Configuration loader with tier-based merging.
//!
//! Loads configuration from multiple tiers and merges them field-by-field.

use super::merge::MergedConfig;
use super::types::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// Built-in defaults (lowest priority)
    Defaults = 0,
    /// Project-level config ($CWD/tuning/)
    Project = 1,
    /// User-level config (~/.level-tuning/)
    User = 2,
    /// A file given explicitly with `--config`; replaces Project and User
    Explicit = 3,
    /// Environment variables (highest priority)
    Environment = 4,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
            ConfigTier::Explicit => write!(f, "explicit"),
        }
    }
}

/// Environment variables that override single fields.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("LEVEL_TUNING_STORE_PATH", "paths.store"),
    ("LEVEL_TUNING_PRESETS_PATH", "paths.presets"),
    ("LEVEL_TUNING_SNAPSHOT_PATH", "paths.snapshot"),
];

/// Directories for each file-backed tier.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub project_dir: Option<PathBuf>,
    pub user_dir: Option<PathBuf>,
    /// Explicit config file; replaces the project and user tiers.
    pub explicit: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover configuration paths from environment and defaults.
    pub fn discover() -> Self {
        // User dir: LEVEL_TUNING_USER_DIR or ~/.level-tuning
        let user_dir = std::env::var("LEVEL_TUNING_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".level-tuning")));

        // Project dir: LEVEL_TUNING_PROJECT_DIR or $CWD/tuning
        let project_dir = std::env::var("LEVEL_TUNING_PROJECT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("tuning"));

        let explicit = std::env::var("LEVEL_TUNING_CONFIG_PATH")
            .ok()
            .map(PathBuf::from);

        Self {
            project_dir: Some(project_dir),
            user_dir,
            explicit,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
            explicit: None,
        }
    }

    pub fn with_explicit(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit = Some(path.into());
        self
    }
}

/// Configuration loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    pub paths: ConfigPaths,
    config: Config,
    merged: MergedConfig,
    /// Highest-priority config file that was read
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Load configuration from all tiers with proper merging.
    pub fn load() -> Result<Self> {
        Self::load_with_paths(ConfigPaths::discover())
    }

    /// Load configuration with explicit paths.
    ///
    /// Missing tier files are skipped. An unreadable or invalid tier file is
    /// logged and skipped, except an explicit file, which must load.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        let mut merged = MergedConfig::default();
        let mut config_path = None;

        // Tier 1: Defaults
        merged.push(ConfigTier::Defaults, serde_json::to_value(Config::default())?);

        if let Some(ref explicit) = paths.explicit {
            let value = read_yaml(explicit)?;
            merged.push(ConfigTier::Explicit, value);
            config_path = Some(explicit.clone());
        } else {
            // Tier 2: Project config, Tier 3: User config
            let tiers = [
                (ConfigTier::Project, paths.project_dir.as_deref()),
                (ConfigTier::User, paths.user_dir.as_deref()),
            ];
            for (tier, dir) in tiers {
                let Some(file) = dir.map(|d| d.join("config.yaml")) else {
                    continue;
                };
                if !file.exists() {
                    continue;
                }
                match read_yaml(&file) {
                    Ok(value) => {
                        debug!(tier = %tier, path = %file.display(), "config tier loaded");
                        merged.push(tier, value);
                        config_path = Some(file);
                    }
                    Err(e) => warn!(tier = %tier, "skipping config file: {:#}", e),
                }
            }
        }

        // Tier 4: Environment variable overrides
        for (var, field) in ENV_OVERRIDES {
            if let Ok(value) = std::env::var(var) {
                merged.set(ConfigTier::Environment, field, Value::String(value));
            }
        }

        let config: Config = serde_json::from_value(merged.value.clone())
            .context("merged configuration does not match the expected shape")?;

        Ok(Self {
            paths,
            config,
            merged,
            config_path,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable access to the configuration, e.g. for CLI overrides.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Tier that supplied a dotted field, e.g. `paths.store`.
    pub fn source_of(&self, field: &str) -> Option<ConfigTier> {
        self.merged.source_of(field)
    }

    /// Every effective leaf with the tier it came from.
    pub fn sources(&self) -> impl Iterator<Item = (&str, ConfigTier)> {
        self.merged.sources.iter().map(|(k, t)| (k.as_str(), *t))
    }

    /// The merged document before deserialization.
    pub fn merged_value(&self) -> &Value {
        &self.merged.value
    }
}

fn read_yaml(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let value: Value = serde_yaml::from_str(&content)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_paths_discover() {
        let paths = ConfigPaths::discover();
        assert!(paths.project_dir.is_some());
    }

    #[test]
    fn test_load_defaults_only() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::with_dirs(
            Some(temp.path().join("project")),
            Some(temp.path().join("user")),
        );

        let loader = ConfigLoader::load_with_paths(paths).unwrap();
        assert_eq!(loader.config().paths.store, PathBuf::from("tuning/settings.yaml"));
        assert!(loader.config().tiers.global_enabled);
        assert!(loader.config_path().is_none());
    }

    #[test]
    fn test_user_overrides_project_field_by_field() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("tuning");
        let user_dir = temp.path().join("user");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::create_dir_all(&user_dir).unwrap();

        std::fs::write(
            project_dir.join("config.yaml"),
            "paths:\n  store: project.yaml\n  presets: project.json\n",
        )
        .unwrap();
        std::fs::write(user_dir.join("config.yaml"), "paths:\n  store: user.yaml\n").unwrap();

        let loader =
            ConfigLoader::load_with_paths(ConfigPaths::with_dirs(Some(project_dir), Some(user_dir)))
                .unwrap();
        let config = loader.config();

        assert_eq!(config.paths.store, PathBuf::from("user.yaml"));
        assert_eq!(config.paths.presets, PathBuf::from("project.json"));
        assert_eq!(loader.source_of("paths.store"), Some(ConfigTier::User));
        assert_eq!(loader.source_of("paths.presets"), Some(ConfigTier::Project));
        assert_eq!(loader.source_of("paths.snapshot"), Some(ConfigTier::Defaults));
    }

    #[test]
    fn test_invalid_tier_file_is_skipped() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("tuning");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::write(project_dir.join("config.yaml"), "paths: [unclosed").unwrap();

        let loader =
            ConfigLoader::load_with_paths(ConfigPaths::with_dirs(Some(project_dir), None)).unwrap();
        assert_eq!(loader.config(), &Config::default());
    }

    #[test]
    fn test_explicit_file_replaces_dir_tiers() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("tuning");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::write(project_dir.join("config.yaml"), "paths:\n  store: project.yaml\n").unwrap();
        let explicit = temp.path().join("custom.yaml");
        std::fs::write(&explicit, "tiers:\n  groups_enabled_by_default: true\n").unwrap();

        let paths = ConfigPaths::with_dirs(Some(project_dir), None).with_explicit(&explicit);
        let loader = ConfigLoader::load_with_paths(paths).unwrap();

        assert_eq!(loader.config().paths.store, PathBuf::from("tuning/settings.yaml"));
        assert!(loader.config().tiers.groups_enabled_by_default);
        assert_eq!(loader.config_path(), Some(explicit.as_path()));
    }

    #[test]
    fn test_environment_outranks_explicit_file() {
        assert!(ConfigTier::Defaults < ConfigTier::Project);
        assert!(ConfigTier::User < ConfigTier::Explicit);
        assert!(ConfigTier::Explicit < ConfigTier::Environment);

        // Same order load_with_paths applies them in
        let mut merged = MergedConfig::default();
        merged.push(ConfigTier::Defaults, serde_json::to_value(Config::default()).unwrap());
        merged.push(
            ConfigTier::Explicit,
            serde_json::json!({"paths": {"store": "explicit.yaml"}}),
        );
        merged.set(
            ConfigTier::Environment,
            "paths.store",
            Value::String("env.yaml".into()),
        );

        assert_eq!(merged.value["paths"]["store"], "env.yaml");
        assert_eq!(merged.source_of("paths.store"), Some(ConfigTier::Environment));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::with_dirs(None, None).with_explicit(temp.path().join("nope.yaml"));
        assert!(ConfigLoader::load_with_paths(paths).is_err());
    }
}
