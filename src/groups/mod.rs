//! Tiered configuration groups.
//!
//! Each group owns one [`ValueSource`] per tunable plus one sub-config per
//! catalog entity. The same types serve the global tier and the level tier;
//! level values are wired to the matching global value as their fallback.

mod dungeon;
mod enemies;
mod prices;
mod scrap;
mod tier;
mod traps;

pub use dungeon::{DungeonConfig, DungeonFlowConfig};
pub use enemies::{EnemiesConfig, EnemyConfig, InsideEnemiesConfig, InsideEnemyConfig};
pub use prices::{DestinationConfig, PriceConfig};
pub use scrap::{ItemConfig, ScrapConfig};
pub use tier::{TierConfig, TierSettings, TuningConfig};
pub use traps::{TrapConfig, TrapsConfig};

use crate::presets::{FieldPath, PresetValue};
use crate::value::{ConfigValue, TierSource, Tunable, ValueSource};
use serde::Serialize;
use std::fmt;

/// One tunable as seen by override resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldEntry {
    pub path: FieldPath,
    /// Value the game would use with no overrides at all.
    pub baseline: PresetValue,
    /// Value placed by the level or global tier, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<(PresetValue, TierSource)>,
}

/// Common surface of every configuration group.
pub trait ConfigGroup: fmt::Debug + Send + Sync {
    /// Group name, which is also the first step of its field paths.
    fn name(&self) -> &'static str;

    fn is_enabled(&self) -> bool;

    /// Every value in the group, entity sub-configs included.
    fn tunables(&self) -> Vec<&dyn Tunable>;

    fn fields(&self) -> Vec<FieldEntry>;

    /// Disabled, or nothing moved off its default.
    fn is_default(&self) -> bool {
        !self.is_enabled() || self.tunables().iter().all(|t| t.is_default())
    }

    /// Enabled with at least one explicit value.
    fn is_set(&self) -> bool {
        self.is_enabled() && self.tunables().iter().any(|t| t.is_locally_set())
    }
}

/// Describe one bound value at `path`.
pub(crate) fn field<T>(path: FieldPath, source: &ValueSource<T>) -> FieldEntry
where
    T: ConfigValue + Into<PresetValue>,
{
    FieldEntry {
        path,
        baseline: source.default_value().clone().into(),
        tier: source
            .override_value()
            .map(|(value, tier)| (value.into(), tier)),
    }
}

/// Names of values in `group` whose stored text does not parse.
pub fn validate(group: &dyn ConfigGroup) -> Vec<String> {
    group
        .tunables()
        .into_iter()
        .filter(|t| t.validate().is_err())
        .map(|t| t.name().to_string())
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::store::{MemoryStore, SettingsStore};

    /// Pre-seed a store entry the way an operator would edit the file.
    pub fn seed(store: &MemoryStore, section: &str, key: &str, value: &str) {
        let entry = store.bind(section, key, value, "").unwrap();
        store.write_string(&entry, value).unwrap();
    }
}
