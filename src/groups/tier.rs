//! All groups of one tier, and the full global + per-level configuration.

use super::{
    ConfigGroup, DungeonConfig, EnemiesConfig, FieldEntry, InsideEnemiesConfig, PriceConfig,
    ScrapConfig, TrapsConfig,
};
use crate::catalog::{EntityCatalog, LevelBaseline};
use crate::error::{Diagnostic, Diagnostics};
use crate::store::SettingsStore;
use crate::value::{Binder, Tier};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Every group bound for one tier.
#[derive(Debug)]
pub struct TierConfig {
    tier: Tier,
    pub enemies: InsideEnemiesConfig,
    pub daytime_enemies: EnemiesConfig,
    pub outside_enemies: EnemiesConfig,
    pub scrap: ScrapConfig,
    pub dungeon: DungeonConfig,
    pub traps: TrapsConfig,
    pub price: PriceConfig,
}

impl TierConfig {
    /// Bind every group under `binder`'s section.
    ///
    /// `global` is the already-built global tier; pass `None` when building
    /// the global tier itself.
    pub fn build(
        binder: &Binder,
        catalog: &dyn EntityCatalog,
        baseline: &LevelBaseline,
        global: Option<&TierConfig>,
    ) -> Result<Self> {
        debug!(section = binder.section(), enabled = binder.is_enabled(), "binding tier");
        Ok(Self {
            tier: binder.tier().clone(),
            enemies: InsideEnemiesConfig::build(
                binder,
                catalog,
                &baseline.enemies,
                global.map(|g| &g.enemies),
            )?,
            daytime_enemies: EnemiesConfig::build_daytime(
                binder,
                catalog,
                &baseline.daytime_enemies,
                global.map(|g| &g.daytime_enemies),
            )?,
            outside_enemies: EnemiesConfig::build_outside(
                binder,
                catalog,
                &baseline.outside_enemies,
                global.map(|g| &g.outside_enemies),
            )?,
            scrap: ScrapConfig::build(binder, catalog, &baseline.scrap, global.map(|g| &g.scrap))?,
            dungeon: DungeonConfig::build(
                binder,
                catalog,
                &baseline.dungeon,
                global.map(|g| &g.dungeon),
            )?,
            traps: TrapsConfig::build(binder, catalog, &baseline.traps, global.map(|g| &g.traps))?,
            price: PriceConfig::build(binder, catalog, global.map(|g| &g.price))?,
        })
    }

    pub fn tier(&self) -> &Tier {
        &self.tier
    }

    pub fn groups(&self) -> [&dyn ConfigGroup; 7] {
        [
            &self.enemies,
            &self.daytime_enemies,
            &self.outside_enemies,
            &self.scrap,
            &self.dungeon,
            &self.traps,
            &self.price,
        ]
    }

    pub fn group(&self, name: &str) -> Option<&dyn ConfigGroup> {
        self.groups().into_iter().find(|g| g.name() == name)
    }

    pub fn fields(&self) -> Vec<FieldEntry> {
        self.groups().iter().flat_map(|g| g.fields()).collect()
    }

    pub fn is_default(&self) -> bool {
        self.groups().iter().all(|g| g.is_default())
    }

    pub fn is_set(&self) -> bool {
        self.groups().iter().any(|g| g.is_set())
    }
}

/// Knobs for a binding pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierSettings {
    /// Bind the global tier. When off, every global value reads as its baseline.
    pub global_enabled: bool,
    /// Initial value of each group's `Enabled` toggle.
    pub groups_enabled_by_default: bool,
}

impl Default for TierSettings {
    fn default() -> Self {
        Self {
            global_enabled: true,
            groups_enabled_by_default: false,
        }
    }
}

/// The global tier plus one tier per catalog level.
#[derive(Debug)]
pub struct TuningConfig {
    pub global: TierConfig,
    pub levels: BTreeMap<String, TierConfig>,
}

impl TuningConfig {
    /// Bind everything against `store` in one batch and flush once.
    pub fn build(
        store: Arc<dyn SettingsStore>,
        catalog: &dyn EntityCatalog,
        diagnostics: &Diagnostics,
        settings: &TierSettings,
    ) -> Result<Self> {
        store.set_save_on_set(false);
        let built = Self::bind_all(Arc::clone(&store), catalog, diagnostics, settings);
        store.set_save_on_set(true);
        let config = built?;
        store.flush()?;

        info!(
            levels = config.levels.len(),
            global_set = config.global.is_set(),
            levels_set = config.levels.values().filter(|l| l.is_set()).count(),
            "tuning configuration bound"
        );
        Ok(config)
    }

    fn bind_all(
        store: Arc<dyn SettingsStore>,
        catalog: &dyn EntityCatalog,
        diagnostics: &Diagnostics,
        settings: &TierSettings,
    ) -> Result<Self> {
        let global_binder = Binder::new(Arc::clone(&store), diagnostics.clone(), Tier::Global)
            .with_enabled_default(settings.groups_enabled_by_default)
            .enabled(settings.global_enabled);
        let global = TierConfig::build(&global_binder, catalog, &LevelBaseline::default(), None)?;

        let mut levels = BTreeMap::new();
        for id in catalog.level_ids() {
            if Tier::collides_with_global(id) {
                diagnostics.report(Diagnostic::reserved_level(id));
                continue;
            }
            let Some(baseline) = catalog.level(id) else {
                continue;
            };
            let binder = Binder::new(
                Arc::clone(&store),
                diagnostics.clone(),
                Tier::Level(id.to_string()),
            )
            .with_enabled_default(settings.groups_enabled_by_default);
            levels.insert(
                id.to_string(),
                TierConfig::build(&binder, catalog, baseline, Some(&global))?,
            );
        }

        Ok(Self { global, levels })
    }

    pub fn level(&self, id: &str) -> Option<&TierConfig> {
        self.levels.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DestinationBaseline, TrapBaseline};
    use crate::error::ErrorCode;
    use crate::curve::Curve;
    use crate::export::Snapshot;
    use crate::store::MemoryStore;

    fn catalog() -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.traps.insert(
            "Landmine".into(),
            TrapBaseline {
                spawn_curve: Curve::parse("0:0, 1:4").unwrap(),
                ..TrapBaseline::default()
            },
        );
        snapshot
            .destinations
            .insert("Titan".into(), DestinationBaseline { price: 700 });
        let mut titan = LevelBaseline::default();
        titan
            .traps
            .insert("Landmine".into(), Curve::parse("0:2, 1:10").unwrap());
        snapshot.levels.insert("Titan".into(), titan);
        snapshot.levels.insert("Vow".into(), LevelBaseline::default());
        snapshot
    }

    #[test]
    fn test_builds_one_tier_per_level() {
        let store = Arc::new(MemoryStore::new());
        let config = TuningConfig::build(
            store.clone(),
            &catalog(),
            &Diagnostics::new(),
            &TierSettings::default(),
        )
        .unwrap();

        assert_eq!(config.levels.len(), 2);
        assert_eq!(config.global.tier(), &Tier::Global);
        assert!(config.global.is_default());
        assert!(!config.level("Titan").unwrap().is_set());

        let titan = config.level("Titan").unwrap();
        assert_eq!(
            titan.traps.traps["Landmine"].spawn_curve.default_value(),
            &Curve::parse("0:2, 1:10").unwrap()
        );
        let vow = config.level("Vow").unwrap();
        assert_eq!(
            vow.traps.traps["Landmine"].spawn_curve.default_value(),
            &Curve::parse("0:0, 1:4").unwrap()
        );
    }

    #[test]
    fn test_group_lookup_by_name() {
        let store = Arc::new(MemoryStore::new());
        let config = TuningConfig::build(
            store,
            &catalog(),
            &Diagnostics::new(),
            &TierSettings::default(),
        )
        .unwrap();
        let titan = config.level("Titan").unwrap();

        for name in [
            "enemies",
            "daytime_enemies",
            "outside_enemies",
            "scrap",
            "dungeon",
            "traps",
            "price",
        ] {
            assert_eq!(titan.group(name).map(|g| g.name()), Some(name));
        }
        assert!(titan.group("weather").is_none());
    }

    #[test]
    fn test_groups_enabled_by_default_binds_everything() {
        let store = Arc::new(MemoryStore::new());
        let settings = TierSettings {
            groups_enabled_by_default: true,
            ..TierSettings::default()
        };
        let config =
            TuningConfig::build(store.clone(), &catalog(), &Diagnostics::new(), &settings).unwrap();

        let titan = config.level("Titan").unwrap();
        assert!(titan.price.is_enabled());
        let doc = store.document();
        assert!(doc.sections.contains_key("Titan.Price.Titan"));
        assert!(doc.sections.contains_key("Global.Traps.Landmine"));
    }

    #[test]
    fn test_level_named_global_is_skipped() {
        let mut snapshot = catalog();
        snapshot.levels.insert("Global".into(), LevelBaseline::default());
        snapshot.levels.insert("Global.Moon".into(), LevelBaseline::default());
        snapshot.levels.insert("Globalia".into(), LevelBaseline::default());
        let store = Arc::new(MemoryStore::new());
        let diagnostics = Diagnostics::new();

        let config =
            TuningConfig::build(store, &snapshot, &diagnostics, &TierSettings::default()).unwrap();

        assert!(config.level("Global").is_none());
        assert!(config.level("Global.Moon").is_none());
        assert!(config.level("Globalia").is_some());
        assert_eq!(diagnostics.count(ErrorCode::ReservedName), 2);
    }

    #[test]
    fn test_global_disabled_never_touches_global_sections() {
        let store = Arc::new(MemoryStore::new());
        let settings = TierSettings {
            global_enabled: false,
            groups_enabled_by_default: true,
        };
        TuningConfig::build(store.clone(), &catalog(), &Diagnostics::new(), &settings).unwrap();

        let doc = store.document();
        assert!(!doc.sections.keys().any(|s| s.starts_with("Global")));
        assert!(doc.sections.contains_key("Vow.Scrap"));
    }
}
