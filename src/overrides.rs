//! Resolved override bundles, one per level.
//!
//! Precedence per field: the level's preset chain, then the level tier, then
//! the global tier. Tier values only count for groups the level has enabled.
//! Fields none of them touch are left out; the caller keeps the game's own
//! value. Each level is materialized once, so lookups are plain map reads.

use crate::groups::{ConfigGroup, TierConfig, TuningConfig};
use crate::presets::{FieldPath, FromPresetValue, PresetChain, PresetLibrary, PresetValue};
use crate::value::TierSource;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Where an applied value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverrideSource {
    Preset { id: String },
    Level,
    Global,
}

impl From<TierSource> for OverrideSource {
    fn from(tier: TierSource) -> Self {
        match tier {
            TierSource::Level => OverrideSource::Level,
            TierSource::Global => OverrideSource::Global,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedField {
    pub value: PresetValue,
    pub baseline: PresetValue,
    pub source: OverrideSource,
}

/// Everything that changes on one level.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LevelOverrides {
    /// Preset chain applied to this level, origin first.
    pub presets: Vec<String>,
    pub fields: BTreeMap<FieldPath, ResolvedField>,
    /// Groups that are set on the level tier or receive a preset value.
    pub active_groups: BTreeSet<String>,
}

impl LevelOverrides {
    pub fn resolve(tier: &TierConfig, chain: &PresetChain<'_>) -> Self {
        let mut fields = BTreeMap::new();
        let mut active_groups = BTreeSet::new();

        for group in tier.groups() {
            let enabled = group.is_enabled();
            let mut from_preset = false;
            for entry in group.fields() {
                let resolved = match chain.resolve(&entry.path) {
                    Some(found) => {
                        from_preset = true;
                        Some(ResolvedField {
                            value: found.value,
                            baseline: entry.baseline,
                            source: OverrideSource::Preset { id: found.preset },
                        })
                    }
                    None if enabled => entry.tier.map(|(value, source)| ResolvedField {
                        value,
                        baseline: entry.baseline,
                        source: source.into(),
                    }),
                    None => None,
                };
                if let Some(resolved) = resolved {
                    fields.insert(entry.path, resolved);
                }
            }
            if from_preset || group.is_set() {
                active_groups.insert(group.name().to_string());
            }
        }

        Self {
            presets: chain.ids().into_iter().map(String::from).collect(),
            fields,
            active_groups,
        }
    }

    pub fn get(&self, path: &FieldPath) -> Option<&ResolvedField> {
        self.fields.get(path)
    }

    /// True if `group` is set on the level tier (enabled with at least one
    /// explicit value) or a preset supplies one of its fields.
    pub fn is_group_active(&self, group: &str) -> bool {
        self.active_groups.contains(group)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Override bundles for every level. Immutable once built.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ResolvedOverrides {
    levels: BTreeMap<String, LevelOverrides>,
}

impl ResolvedOverrides {
    pub fn resolve(config: &TuningConfig, library: &PresetLibrary) -> Self {
        let mut levels = BTreeMap::new();
        for (id, tier) in &config.levels {
            let chain = library.chain_for_level(id);
            let bundle = LevelOverrides::resolve(tier, &chain);
            debug!(
                level = %id,
                presets = ?bundle.presets,
                overrides = bundle.fields.len(),
                "level overrides resolved"
            );
            levels.insert(id.clone(), bundle);
        }
        Self { levels }
    }

    pub fn level(&self, id: &str) -> Option<&LevelOverrides> {
        self.levels.get(id)
    }

    pub fn levels(&self) -> impl Iterator<Item = (&str, &LevelOverrides)> {
        self.levels.iter().map(|(id, l)| (id.as_str(), l))
    }

    /// Value to apply at `path` on `level`, or `None` to keep the game's own.
    ///
    /// A stored value of a different type than `T` is also `None`.
    pub fn get_resolved_value<T: FromPresetValue>(&self, level: &str, path: &FieldPath) -> Option<T> {
        let field = self.levels.get(level)?.get(path)?;
        T::from_preset_value(&field.value)
    }

    /// Whether anything in `group` changes on `level`.
    pub fn is_group_active(&self, level: &str, group: &str) -> bool {
        self.levels
            .get(level)
            .is_some_and(|l| l.is_group_active(group))
    }
}
