//! Enemy spawning groups.
//!
//! Inside enemies carry spawn falloff; daytime and outside enemies do not,
//! so they use a separate, smaller schema.

use super::{ConfigGroup, FieldEntry, field};
use crate::catalog::{EnemyBaseline, EntityCatalog, EntityKind, EnemySpawnBaseline};
use crate::curve::Curve;
use crate::presets::FieldPath;
use crate::value::{Binder, Tunable, ValueSource};
use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Per-enemy values for inside spawning.
#[derive(Debug)]
pub struct InsideEnemyConfig {
    pub rarity: Arc<ValueSource<i32>>,
    pub max_enemy_count: Arc<ValueSource<i32>>,
    pub power_level: Arc<ValueSource<f32>>,
    pub spawn_curve: Arc<ValueSource<Curve>>,
    pub use_falloff: Arc<ValueSource<bool>>,
    pub falloff_curve: Arc<ValueSource<Curve>>,
}

impl InsideEnemyConfig {
    fn build(
        binder: &Binder,
        baseline: &EnemyBaseline,
        rarity: i32,
        global: Option<&Self>,
    ) -> Result<Self> {
        Ok(Self {
            rarity: binder.bind(
                "rarity",
                "Spawn weight of this enemy",
                rarity,
                global.map(|g| &g.rarity),
            )?,
            max_enemy_count: binder.bind(
                "max_enemy_count",
                "Maximum number alive at once",
                baseline.max_enemy_count,
                global.map(|g| &g.max_enemy_count),
            )?,
            power_level: binder.bind(
                "power_level",
                "Power this enemy counts against the power budget",
                baseline.power_level,
                global.map(|g| &g.power_level),
            )?,
            spawn_curve: binder.bind(
                "spawn_curve",
                "Spawn weight multiplier over the course of the day",
                baseline.spawn_curve.clone(),
                global.map(|g| &g.spawn_curve),
            )?,
            use_falloff: binder.bind(
                "use_falloff",
                "Reduce spawn weight as more of this enemy are alive",
                baseline.use_falloff,
                global.map(|g| &g.use_falloff),
            )?,
            falloff_curve: binder.bind(
                "falloff_curve",
                "Spawn weight multiplier by number already alive",
                baseline.falloff_curve.clone(),
                global.map(|g| &g.falloff_curve),
            )?,
        })
    }

    fn tunables(&self) -> [&dyn Tunable; 6] {
        [
            &*self.rarity,
            &*self.max_enemy_count,
            &*self.power_level,
            &*self.spawn_curve,
            &*self.use_falloff,
            &*self.falloff_curve,
        ]
    }

    fn fields(&self, path: &FieldPath) -> [FieldEntry; 6] {
        [
            field(path.clone().field("rarity"), &self.rarity),
            field(path.clone().field("max_enemy_count"), &self.max_enemy_count),
            field(path.clone().field("power_level"), &self.power_level),
            field(path.clone().field("spawn_curve"), &self.spawn_curve),
            field(path.clone().field("use_falloff"), &self.use_falloff),
            field(path.clone().field("falloff_curve"), &self.falloff_curve),
        ]
    }
}

/// Inside enemy spawning for one tier.
#[derive(Debug)]
pub struct InsideEnemiesConfig {
    enabled: bool,
    pub max_power_count: Arc<ValueSource<i32>>,
    pub spawn_chance_curve: Arc<ValueSource<Curve>>,
    pub spawn_probability_range: Arc<ValueSource<f32>>,
    pub enemies: BTreeMap<String, InsideEnemyConfig>,
}

impl InsideEnemiesConfig {
    pub fn build(
        binder: &Binder,
        catalog: &dyn EntityCatalog,
        baseline: &EnemySpawnBaseline,
        global: Option<&Self>,
    ) -> Result<Self> {
        let section = binder.child("Enemies");
        let enabled = section.group_enabled("Apply the inside enemy settings below")?;
        let section = section.enabled(enabled);

        let mut enemies = BTreeMap::new();
        for id in catalog.ids(EntityKind::Enemy) {
            let Some(enemy) = catalog.enemy(id) else {
                continue;
            };
            let rarity = baseline.rarities.get(id).copied().unwrap_or(0);
            let config = InsideEnemyConfig::build(
                &section.child(id),
                enemy,
                rarity,
                global.and_then(|g| g.enemies.get(id)),
            )?;
            enemies.insert(id.to_string(), config);
        }

        Ok(Self {
            enabled,
            max_power_count: section.bind(
                "max_power_count",
                "Maximum total power of inside enemies",
                baseline.max_power_count,
                global.map(|g| &g.max_power_count),
            )?,
            spawn_chance_curve: section.bind(
                "spawn_chance_curve",
                "Number of spawn attempts over the course of the day",
                baseline.spawn_chance_curve.clone(),
                global.map(|g| &g.spawn_chance_curve),
            )?,
            spawn_probability_range: section.bind(
                "spawn_probability_range",
                "Random spread applied to the spawn chance curve",
                baseline.spawn_probability_range,
                global.map(|g| &g.spawn_probability_range),
            )?,
            enemies,
        })
    }
}

impl ConfigGroup for InsideEnemiesConfig {
    fn name(&self) -> &'static str {
        "enemies"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn tunables(&self) -> Vec<&dyn Tunable> {
        let mut all: Vec<&dyn Tunable> = vec![
            &*self.max_power_count,
            &*self.spawn_chance_curve,
            &*self.spawn_probability_range,
        ];
        for enemy in self.enemies.values() {
            all.extend(enemy.tunables());
        }
        all
    }

    fn fields(&self) -> Vec<FieldEntry> {
        let root = FieldPath::root().field(self.name());
        let mut fields = vec![
            field(root.clone().field("max_power_count"), &self.max_power_count),
            field(root.clone().field("spawn_chance_curve"), &self.spawn_chance_curve),
            field(
                root.clone().field("spawn_probability_range"),
                &self.spawn_probability_range,
            ),
        ];
        for (id, enemy) in &self.enemies {
            fields.extend(enemy.fields(&root.clone().select("enemies", id)));
        }
        fields
    }
}

/// Per-enemy values for daytime and outside spawning.
#[derive(Debug)]
pub struct EnemyConfig {
    pub rarity: Arc<ValueSource<i32>>,
    pub max_enemy_count: Arc<ValueSource<i32>>,
    pub power_level: Arc<ValueSource<f32>>,
    pub spawn_curve: Arc<ValueSource<Curve>>,
}

impl EnemyConfig {
    fn build(
        binder: &Binder,
        baseline: &EnemyBaseline,
        rarity: i32,
        global: Option<&Self>,
    ) -> Result<Self> {
        Ok(Self {
            rarity: binder.bind(
                "rarity",
                "Spawn weight of this enemy",
                rarity,
                global.map(|g| &g.rarity),
            )?,
            max_enemy_count: binder.bind(
                "max_enemy_count",
                "Maximum number alive at once",
                baseline.max_enemy_count,
                global.map(|g| &g.max_enemy_count),
            )?,
            power_level: binder.bind(
                "power_level",
                "Power this enemy counts against the power budget",
                baseline.power_level,
                global.map(|g| &g.power_level),
            )?,
            spawn_curve: binder.bind(
                "spawn_curve",
                "Spawn weight multiplier over the course of the day",
                baseline.spawn_curve.clone(),
                global.map(|g| &g.spawn_curve),
            )?,
        })
    }

    fn tunables(&self) -> [&dyn Tunable; 4] {
        [
            &*self.rarity,
            &*self.max_enemy_count,
            &*self.power_level,
            &*self.spawn_curve,
        ]
    }

    fn fields(&self, path: &FieldPath) -> [FieldEntry; 4] {
        [
            field(path.clone().field("rarity"), &self.rarity),
            field(path.clone().field("max_enemy_count"), &self.max_enemy_count),
            field(path.clone().field("power_level"), &self.power_level),
            field(path.clone().field("spawn_curve"), &self.spawn_curve),
        ]
    }
}

/// Daytime or outside enemy spawning for one tier.
#[derive(Debug)]
pub struct EnemiesConfig {
    name: &'static str,
    enabled: bool,
    pub max_power_count: Arc<ValueSource<i32>>,
    pub spawn_chance_curve: Arc<ValueSource<Curve>>,
    pub enemies: BTreeMap<String, EnemyConfig>,
}

impl EnemiesConfig {
    pub fn build_daytime(
        binder: &Binder,
        catalog: &dyn EntityCatalog,
        baseline: &EnemySpawnBaseline,
        global: Option<&Self>,
    ) -> Result<Self> {
        Self::build("daytime_enemies", "DaytimeEnemies", binder, catalog, baseline, global)
    }

    pub fn build_outside(
        binder: &Binder,
        catalog: &dyn EntityCatalog,
        baseline: &EnemySpawnBaseline,
        global: Option<&Self>,
    ) -> Result<Self> {
        Self::build("outside_enemies", "OutsideEnemies", binder, catalog, baseline, global)
    }

    fn build(
        name: &'static str,
        section_name: &str,
        binder: &Binder,
        catalog: &dyn EntityCatalog,
        baseline: &EnemySpawnBaseline,
        global: Option<&Self>,
    ) -> Result<Self> {
        let section = binder.child(section_name);
        let enabled = section.group_enabled(&format!("Apply the {} settings below", name))?;
        let section = section.enabled(enabled);

        let mut enemies = BTreeMap::new();
        for id in catalog.ids(EntityKind::Enemy) {
            let Some(enemy) = catalog.enemy(id) else {
                continue;
            };
            let rarity = baseline.rarities.get(id).copied().unwrap_or(0);
            let config = EnemyConfig::build(
                &section.child(id),
                enemy,
                rarity,
                global.and_then(|g| g.enemies.get(id)),
            )?;
            enemies.insert(id.to_string(), config);
        }

        Ok(Self {
            name,
            enabled,
            max_power_count: section.bind(
                "max_power_count",
                "Maximum total power of enemies in this group",
                baseline.max_power_count,
                global.map(|g| &g.max_power_count),
            )?,
            spawn_chance_curve: section.bind(
                "spawn_chance_curve",
                "Number of spawn attempts over the course of the day",
                baseline.spawn_chance_curve.clone(),
                global.map(|g| &g.spawn_chance_curve),
            )?,
            enemies,
        })
    }
}

impl ConfigGroup for EnemiesConfig {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn tunables(&self) -> Vec<&dyn Tunable> {
        let mut all: Vec<&dyn Tunable> = vec![&*self.max_power_count, &*self.spawn_chance_curve];
        for enemy in self.enemies.values() {
            all.extend(enemy.tunables());
        }
        all
    }

    fn fields(&self) -> Vec<FieldEntry> {
        let root = FieldPath::root().field(self.name);
        let mut fields = vec![
            field(root.clone().field("max_power_count"), &self.max_power_count),
            field(root.clone().field("spawn_chance_curve"), &self.spawn_chance_curve),
        ];
        for (id, enemy) in &self.enemies {
            fields.extend(enemy.fields(&root.clone().select("enemies", id)));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Diagnostics;
    use crate::export::Snapshot;
    use crate::groups::test_support::seed;
    use crate::store::{MemoryStore, SettingsStore};
    use crate::value::Tier;

    fn catalog() -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.enemies.insert(
            "Flowerman".into(),
            EnemyBaseline {
                spawn_curve: Curve::parse("0:0.1, 1:0.9").unwrap(),
                ..EnemyBaseline::default()
            },
        );
        snapshot
            .enemies
            .insert("Blob".into(), EnemyBaseline::default());
        snapshot
    }

    fn binder(store: &Arc<MemoryStore>, tier: Tier) -> Binder {
        let shared: Arc<dyn SettingsStore> = store.clone();
        Binder::new(shared, Diagnostics::new(), tier)
    }

    #[test]
    fn test_sub_config_per_known_enemy() {
        let store = Arc::new(MemoryStore::new());
        let mut baseline = EnemySpawnBaseline::default();
        baseline.rarities.insert("Flowerman".into(), 25);

        let group = InsideEnemiesConfig::build(
            &binder(&store, Tier::Global),
            &catalog(),
            &baseline,
            None,
        )
        .unwrap();

        assert_eq!(group.enemies.len(), 2);
        assert_eq!(group.enemies["Flowerman"].rarity.value(), 25);
        assert_eq!(group.enemies["Blob"].rarity.value(), 0);
    }

    #[test]
    fn test_disabled_group_is_default_and_reads_baseline() {
        let store = Arc::new(MemoryStore::new());
        let catalog = catalog();
        let baseline = EnemySpawnBaseline::default();
        let global =
            InsideEnemiesConfig::build(&binder(&store, Tier::Global), &catalog, &baseline, None)
                .unwrap();
        let level = InsideEnemiesConfig::build(
            &binder(&store, Tier::Level("Titan".into())),
            &catalog,
            &baseline,
            Some(&global),
        )
        .unwrap();

        assert!(!level.is_enabled());
        assert!(level.is_default());
        assert!(!level.is_set());
        assert_eq!(
            level.enemies["Flowerman"].spawn_curve.value(),
            Curve::parse("0:0.1, 1:0.9").unwrap()
        );
        // Only the toggles were bound.
        assert!(store.document().sections.contains_key("Titan.Enemies"));
        assert!(!store.document().sections.contains_key("Titan.Enemies.Flowerman"));
    }

    #[test]
    fn test_enabled_level_group_reports_set() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, "Titan.Enemies", "Enabled", "true");
        seed(&store, "Titan.Enemies.Flowerman", "MaxEnemyCount", "4");

        let catalog = catalog();
        let baseline = EnemySpawnBaseline::default();
        let global =
            InsideEnemiesConfig::build(&binder(&store, Tier::Global), &catalog, &baseline, None)
                .unwrap();
        let level = InsideEnemiesConfig::build(
            &binder(&store, Tier::Level("Titan".into())),
            &catalog,
            &baseline,
            Some(&global),
        )
        .unwrap();

        assert!(level.is_enabled());
        assert!(level.is_set());
        assert!(!level.is_default());
        assert_eq!(level.enemies["Flowerman"].max_enemy_count.value(), 4);
        // Untouched level entries start at GLOBAL.
        assert!(!level.enemies["Blob"].rarity.is_default());
    }

    #[test]
    fn test_outside_schema_has_no_falloff() {
        let store = Arc::new(MemoryStore::new());
        let group = EnemiesConfig::build_outside(
            &binder(&store, Tier::Global),
            &catalog(),
            &EnemySpawnBaseline::default(),
            None,
        )
        .unwrap();

        assert_eq!(group.name(), "outside_enemies");
        let paths: Vec<String> = group.fields().iter().map(|f| f.path.to_string()).collect();
        assert!(paths.contains(&"outside_enemies.enemies[Blob].spawn_curve".to_string()));
        assert!(!paths.iter().any(|p| p.contains("falloff")));
        assert_eq!(group.tunables().len(), 2 + 2 * 4);
    }

    #[test]
    fn test_zero_enemies_is_valid() {
        let store = Arc::new(MemoryStore::new());
        let group = EnemiesConfig::build_daytime(
            &binder(&store, Tier::Global),
            &Snapshot::new(),
            &EnemySpawnBaseline::default(),
            None,
        )
        .unwrap();
        assert!(group.enemies.is_empty());
        assert!(group.is_default());
    }
}
