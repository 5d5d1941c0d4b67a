//! Dungeon generation: map size and interior flow weights.

use super::{ConfigGroup, FieldEntry, field};
use crate::catalog::{DungeonBaseline, DungeonFlowBaseline, EntityCatalog, EntityKind};
use crate::presets::FieldPath;
use crate::value::{Binder, Tunable, ValueSource};
use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug)]
pub struct DungeonFlowConfig {
    pub rarity: Arc<ValueSource<i32>>,
    pub factory_size_multiplier: Arc<ValueSource<f32>>,
}

impl DungeonFlowConfig {
    fn build(
        binder: &Binder,
        baseline: &DungeonFlowBaseline,
        rarity: i32,
        global: Option<&Self>,
    ) -> Result<Self> {
        Ok(Self {
            rarity: binder.bind(
                "rarity",
                "Chance weight of generating this interior",
                rarity,
                global.map(|g| &g.rarity),
            )?,
            factory_size_multiplier: binder.bind(
                "factory_size_multiplier",
                "Size multiplier applied when this interior generates",
                baseline.factory_size_multiplier,
                global.map(|g| &g.factory_size_multiplier),
            )?,
        })
    }
}

#[derive(Debug)]
pub struct DungeonConfig {
    enabled: bool,
    pub map_size_multiplier: Arc<ValueSource<f32>>,
    pub flows: BTreeMap<String, DungeonFlowConfig>,
}

impl DungeonConfig {
    pub fn build(
        binder: &Binder,
        catalog: &dyn EntityCatalog,
        baseline: &DungeonBaseline,
        global: Option<&Self>,
    ) -> Result<Self> {
        let section = binder.child("Dungeon");
        let enabled = section.group_enabled("Apply the dungeon generation settings below")?;
        let section = section.enabled(enabled);

        let mut flows = BTreeMap::new();
        for id in catalog.ids(EntityKind::DungeonFlow) {
            let Some(flow) = catalog.dungeon_flow(id) else {
                continue;
            };
            let rarity = baseline.rarities.get(id).copied().unwrap_or(0);
            let config = DungeonFlowConfig::build(
                &section.child(id),
                flow,
                rarity,
                global.and_then(|g| g.flows.get(id)),
            )?;
            flows.insert(id.to_string(), config);
        }

        Ok(Self {
            enabled,
            map_size_multiplier: section.bind(
                "map_size_multiplier",
                "Multiplier on the generated map size",
                baseline.map_size_multiplier,
                global.map(|g| &g.map_size_multiplier),
            )?,
            flows,
        })
    }
}

impl ConfigGroup for DungeonConfig {
    fn name(&self) -> &'static str {
        "dungeon"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn tunables(&self) -> Vec<&dyn Tunable> {
        let mut all: Vec<&dyn Tunable> = vec![&*self.map_size_multiplier];
        for flow in self.flows.values() {
            all.push(&*flow.rarity);
            all.push(&*flow.factory_size_multiplier);
        }
        all
    }

    fn fields(&self) -> Vec<FieldEntry> {
        let root = FieldPath::root().field("dungeon");
        let mut fields = vec![field(
            root.clone().field("map_size_multiplier"),
            &self.map_size_multiplier,
        )];
        for (id, flow) in &self.flows {
            let path = root.clone().select("flows", id);
            fields.push(field(path.clone().field("rarity"), &flow.rarity));
            fields.push(field(
                path.field("factory_size_multiplier"),
                &flow.factory_size_multiplier,
            ));
        }
        fields
    }
}
