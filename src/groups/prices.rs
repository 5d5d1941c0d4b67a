//! Route prices.

use super::{ConfigGroup, FieldEntry, field};
use crate::catalog::{EntityCatalog, EntityKind};
use crate::presets::FieldPath;
use crate::value::{Binder, Tunable, ValueSource};
use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug)]
pub struct DestinationConfig {
    pub price: Arc<ValueSource<i32>>,
}

#[derive(Debug)]
pub struct PriceConfig {
    enabled: bool,
    pub destinations: BTreeMap<String, DestinationConfig>,
}

impl PriceConfig {
    pub fn build(binder: &Binder, catalog: &dyn EntityCatalog, global: Option<&Self>) -> Result<Self> {
        let section = binder.child("Price");
        let enabled = section.group_enabled("Apply the route prices below")?;
        let section = section.enabled(enabled);

        let mut destinations = BTreeMap::new();
        for id in catalog.ids(EntityKind::Destination) {
            let Some(destination) = catalog.destination(id) else {
                continue;
            };
            let price = section.child(id).bind(
                "price",
                "Credits charged to route to this destination",
                destination.price,
                global.and_then(|g| g.destinations.get(id)).map(|d| &d.price),
            )?;
            destinations.insert(id.to_string(), DestinationConfig { price });
        }

        Ok(Self {
            enabled,
            destinations,
        })
    }
}

impl ConfigGroup for PriceConfig {
    fn name(&self) -> &'static str {
        "price"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn tunables(&self) -> Vec<&dyn Tunable> {
        self.destinations
            .values()
            .map(|d| &*d.price as &dyn Tunable)
            .collect()
    }

    fn fields(&self) -> Vec<FieldEntry> {
        let root = FieldPath::root().field("price");
        self.destinations
            .iter()
            .map(|(id, d)| field(root.clone().select("destinations", id).field("price"), &d.price))
            .collect()
    }
}
