//! Scrap amount, value, and per-item tuning.

use super::{ConfigGroup, FieldEntry, field};
use crate::catalog::{EntityCatalog, EntityKind, ItemBaseline, ScrapBaseline};
use crate::presets::FieldPath;
use crate::value::{Binder, Tunable, ValueSource};
use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug)]
pub struct ItemConfig {
    pub rarity: Arc<ValueSource<i32>>,
    pub min_value: Arc<ValueSource<i32>>,
    pub max_value: Arc<ValueSource<i32>>,
    pub weight: Arc<ValueSource<f32>>,
    pub conductive: Arc<ValueSource<bool>>,
    pub two_handed: Arc<ValueSource<bool>>,
}

impl ItemConfig {
    fn build(
        binder: &Binder,
        baseline: &ItemBaseline,
        rarity: i32,
        global: Option<&Self>,
    ) -> Result<Self> {
        Ok(Self {
            rarity: binder.bind(
                "rarity",
                "Spawn weight of this item",
                rarity,
                global.map(|g| &g.rarity),
            )?,
            min_value: binder.bind(
                "min_value",
                "Minimum sell value, before the level multiplier",
                baseline.min_value,
                global.map(|g| &g.min_value),
            )?,
            max_value: binder.bind(
                "max_value",
                "Maximum sell value, before the level multiplier",
                baseline.max_value,
                global.map(|g| &g.max_value),
            )?,
            weight: binder.bind(
                "weight",
                "Carry weight",
                baseline.weight,
                global.map(|g| &g.weight),
            )?,
            conductive: binder.bind(
                "conductive",
                "Whether the item attracts lightning",
                baseline.conductive,
                global.map(|g| &g.conductive),
            )?,
            two_handed: binder.bind(
                "two_handed",
                "Whether the item needs both hands",
                baseline.two_handed,
                global.map(|g| &g.two_handed),
            )?,
        })
    }
}

/// Scrap generation for one tier.
#[derive(Debug)]
pub struct ScrapConfig {
    enabled: bool,
    pub min_scrap: Arc<ValueSource<i32>>,
    pub max_scrap: Arc<ValueSource<i32>>,
    pub scrap_amount_multiplier: Arc<ValueSource<f32>>,
    pub scrap_value_multiplier: Arc<ValueSource<f32>>,
    pub items: BTreeMap<String, ItemConfig>,
}

impl ScrapConfig {
    pub fn build(
        binder: &Binder,
        catalog: &dyn EntityCatalog,
        baseline: &ScrapBaseline,
        global: Option<&Self>,
    ) -> Result<Self> {
        let section = binder.child("Scrap");
        let enabled = section.group_enabled("Apply the scrap settings below")?;
        let section = section.enabled(enabled);

        let mut items = BTreeMap::new();
        for id in catalog.ids(EntityKind::Item) {
            let Some(item) = catalog.item(id) else {
                continue;
            };
            let rarity = baseline.rarities.get(id).copied().unwrap_or(0);
            let config = ItemConfig::build(
                &section.child(id),
                item,
                rarity,
                global.and_then(|g| g.items.get(id)),
            )?;
            items.insert(id.to_string(), config);
        }

        Ok(Self {
            enabled,
            min_scrap: section.bind(
                "min_scrap",
                "Minimum number of scrap items generated",
                baseline.min_scrap,
                global.map(|g| &g.min_scrap),
            )?,
            max_scrap: section.bind(
                "max_scrap",
                "Maximum number of scrap items generated",
                baseline.max_scrap,
                global.map(|g| &g.max_scrap),
            )?,
            scrap_amount_multiplier: section.bind(
                "scrap_amount_multiplier",
                "Multiplier on the number of scrap items",
                baseline.scrap_amount_multiplier,
                global.map(|g| &g.scrap_amount_multiplier),
            )?,
            scrap_value_multiplier: section.bind(
                "scrap_value_multiplier",
                "Multiplier on scrap sell value",
                baseline.scrap_value_multiplier,
                global.map(|g| &g.scrap_value_multiplier),
            )?,
            items,
        })
    }
}

impl ConfigGroup for ScrapConfig {
    fn name(&self) -> &'static str {
        "scrap"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn tunables(&self) -> Vec<&dyn Tunable> {
        let mut all: Vec<&dyn Tunable> = vec![
            &*self.min_scrap,
            &*self.max_scrap,
            &*self.scrap_amount_multiplier,
            &*self.scrap_value_multiplier,
        ];
        for item in self.items.values() {
            all.push(&*item.rarity);
            all.push(&*item.min_value);
            all.push(&*item.max_value);
            all.push(&*item.weight);
            all.push(&*item.conductive);
            all.push(&*item.two_handed);
        }
        all
    }

    fn fields(&self) -> Vec<FieldEntry> {
        let root = FieldPath::root().field("scrap");
        let mut fields = vec![
            field(root.clone().field("min_scrap"), &self.min_scrap),
            field(root.clone().field("max_scrap"), &self.max_scrap),
            field(
                root.clone().field("scrap_amount_multiplier"),
                &self.scrap_amount_multiplier,
            ),
            field(
                root.clone().field("scrap_value_multiplier"),
                &self.scrap_value_multiplier,
            ),
        ];
        for (id, item) in &self.items {
            let path = root.clone().select("items", id);
            fields.push(field(path.clone().field("rarity"), &item.rarity));
            fields.push(field(path.clone().field("min_value"), &item.min_value));
            fields.push(field(path.clone().field("max_value"), &item.max_value));
            fields.push(field(path.clone().field("weight"), &item.weight));
            fields.push(field(path.clone().field("conductive"), &item.conductive));
            fields.push(field(path.field("two_handed"), &item.two_handed));
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
    use crate::presets::PresetValue;
    use crate::store::{MemoryStore, SettingsStore};
    use crate::value::{Tier, TierSource};

    fn catalog() -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.items.insert(
            "Bolt".into(),
            ItemBaseline {
                min_value: 20,
                max_value: 40,
                ..ItemBaseline::default()
            },
        );
        snapshot
    }

    fn build(store: &Arc<MemoryStore>) -> (ScrapConfig, ScrapConfig) {
        let shared: Arc<dyn SettingsStore> = store.clone();
        let diagnostics = Diagnostics::new();
        let catalog = catalog();
        let global = ScrapConfig::build(
            &Binder::new(Arc::clone(&shared), diagnostics.clone(), Tier::Global),
            &catalog,
            &ScrapBaseline::default(),
            None,
        )
        .unwrap();
        let level_baseline = ScrapBaseline {
            min_scrap: 8,
            max_scrap: 12,
            rarities: [("Bolt".to_string(), 30)].into_iter().collect(),
            ..ScrapBaseline::default()
        };
        let level = ScrapConfig::build(
            &Binder::new(shared, diagnostics, Tier::Level("Vow".into())),
            &catalog,
            &level_baseline,
            Some(&global),
        )
        .unwrap();
        (global, level)
    }

    #[test]
    fn test_fields_carry_level_baselines() {
        let store = Arc::new(MemoryStore::new());
        let (_, level) = build(&store);
        let fields = level.fields();

        let rarity = fields
            .iter()
            .find(|f| f.path.to_string() == "scrap.items[Bolt].rarity")
            .unwrap();
        assert_eq!(rarity.baseline, PresetValue::Int(30));
        assert_eq!(rarity.tier, None);

        let min = fields
            .iter()
            .find(|f| f.path.to_string() == "scrap.min_scrap")
            .unwrap();
        assert_eq!(min.baseline, PresetValue::Int(8));
    }

    #[test]
    fn test_global_value_reaches_level() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, "Global.Scrap", "Enabled", "true");
        seed(&store, "Global.Scrap.Bolt", "MaxValue", "55");
        seed(&store, "Vow.Scrap", "Enabled", "true");
        seed(&store, "Vow.Scrap", "MinScrap", "10");

        let (global, level) = build(&store);
        assert!(global.is_set());
        assert_eq!(level.items["Bolt"].max_value.value(), 55);
        assert_eq!(level.min_scrap.value(), 10);

        let fields = level.fields();
        let max_value = fields
            .iter()
            .find(|f| f.path.to_string() == "scrap.items[Bolt].max_value")
            .unwrap();
        assert_eq!(max_value.tier, Some((PresetValue::Int(55), TierSource::Global)));
        let min_scrap = fields
            .iter()
            .find(|f| f.path.to_string() == "scrap.min_scrap")
            .unwrap();
        assert_eq!(min_scrap.tier, Some((PresetValue::Int(10), TierSource::Level)));
    }
}
