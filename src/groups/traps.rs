//! Map hazard spawning.

use super::{ConfigGroup, FieldEntry, field};
use crate::catalog::{EntityCatalog, EntityKind};
use crate::curve::Curve;
use crate::presets::FieldPath;
use crate::value::{Binder, Tunable, ValueSource};
use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug)]
pub struct TrapConfig {
    pub spawn_curve: Arc<ValueSource<Curve>>,
    pub face_away_from_wall: Arc<ValueSource<bool>>,
}

#[derive(Debug)]
pub struct TrapsConfig {
    enabled: bool,
    pub traps: BTreeMap<String, TrapConfig>,
}

impl TrapsConfig {
    /// `level_curves` holds the level's own spawn curve per trap id; traps
    /// missing from it use the trap's baseline curve.
    pub fn build(
        binder: &Binder,
        catalog: &dyn EntityCatalog,
        level_curves: &BTreeMap<String, Curve>,
        global: Option<&Self>,
    ) -> Result<Self> {
        let section = binder.child("Traps");
        let enabled = section.group_enabled("Apply the trap settings below")?;
        let section = section.enabled(enabled);

        let mut traps = BTreeMap::new();
        for id in catalog.ids(EntityKind::Trap) {
            let Some(trap) = catalog.trap(id) else {
                continue;
            };
            let binder = section.child(id);
            let global = global.and_then(|g| g.traps.get(id));
            let spawn_curve = level_curves
                .get(id)
                .cloned()
                .unwrap_or_else(|| trap.spawn_curve.clone());
            let config = TrapConfig {
                spawn_curve: binder.bind(
                    "spawn_curve",
                    "Number spawned, sampled over a random 0..1 roll",
                    spawn_curve,
                    global.map(|g| &g.spawn_curve),
                )?,
                face_away_from_wall: binder.bind(
                    "face_away_from_wall",
                    "Whether the trap is placed facing away from walls",
                    trap.face_away_from_wall,
                    global.map(|g| &g.face_away_from_wall),
                )?,
            };
            traps.insert(id.to_string(), config);
        }

        Ok(Self { enabled, traps })
    }
}

impl ConfigGroup for TrapsConfig {
    fn name(&self) -> &'static str {
        "traps"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn tunables(&self) -> Vec<&dyn Tunable> {
        let mut all: Vec<&dyn Tunable> = Vec::with_capacity(self.traps.len() * 2);
        for trap in self.traps.values() {
            all.push(&*trap.spawn_curve);
            all.push(&*trap.face_away_from_wall);
        }
        all
    }

    fn fields(&self) -> Vec<FieldEntry> {
        let root = FieldPath::root().field("traps");
        let mut fields = Vec::with_capacity(self.traps.len() * 2);
        for (id, trap) in &self.traps {
            let path = root.clone().select("traps", id);
            fields.push(field(path.clone().field("spawn_curve"), &trap.spawn_curve));
            fields.push(field(
                path.field("face_away_from_wall"),
                &trap.face_away_from_wall,
            ));
        }
        fields
    }
}
