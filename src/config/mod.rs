//! Application configuration.
//!
//! Consolidates configuration from tiers with field-by-field YAML merging:
//! 1. **Defaults** - Built into the binary
//! 2. **Project** - `$CWD/tuning/config.yaml`
//! 3. **User** - `~/.level-tuning/config.yaml`
//! 4. **Explicit** - `--config` or `LEVEL_TUNING_CONFIG_PATH`, replacing 2 and 3
//! 5. **Environment** - single-field overrides, applied last
//!
//! ## Environment Variables
//! - `LEVEL_TUNING_CONFIG_PATH` - Explicit config file
//! - `LEVEL_TUNING_STORE_PATH` - Settings store file
//! - `LEVEL_TUNING_PRESETS_PATH` - Preset file
//! - `LEVEL_TUNING_SNAPSHOT_PATH` - Baseline snapshot
//! - `LEVEL_TUNING_USER_DIR` - User config dir (default: `~/.level-tuning`)
//! - `LEVEL_TUNING_PROJECT_DIR` - Project config dir (default: `./tuning`)

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::{MergedConfig, deep_merge, merge_into};
pub use types::*;
