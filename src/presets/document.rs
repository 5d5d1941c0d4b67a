//! Preset document schema.
//!
//! Every tunable is optional: an unset field means "inherit from the parent
//! preset". Override lists are keyed by entity id; a list that is present
//! but lacks an id removes that entity's overrides from inheritance.

use super::path::{Node, PresetRecord, list, record, value};
use crate::catalog::{EntityCatalog, EntityKind, IdentifiedRecord};
use crate::curve::Curve;
use crate::error::{Diagnostic, Diagnostics};
use serde::{Deserialize, Serialize};

/// One named, optionally parented bundle of overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetDocument {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Parent preset id. Empty, or equal to `id`, means no parent.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub parent: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enemies: Option<InsideEnemiesOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daytime_enemies: Option<EnemiesOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outside_enemies: Option<EnemiesOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrap: Option<ScrapOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dungeon: Option<DungeonOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traps: Option<TrapsOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceOptions>,
}

impl PresetDocument {
    /// Parent id, if this preset names a parent other than itself.
    pub fn parent_id(&self) -> Option<&str> {
        let parent = self.parent.trim();
        if parent.is_empty() || parent == self.id {
            None
        } else {
            Some(parent)
        }
    }

    /// Display label: the name, or the id if unnamed.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Drop override entries whose id the catalog does not know.
    ///
    /// Each dropped entry is reported; the rest of the document is kept.
    pub fn prune(&mut self, catalog: &dyn EntityCatalog, diagnostics: &Diagnostics) {
        let preset = self.id.clone();
        let mut keep = |kind: EntityKind, list_name: &str, id: &str| {
            let known = catalog.contains(kind, id);
            if !known {
                diagnostics.report(Diagnostic::unknown_entity(&preset, list_name, id));
            }
            known
        };

        if let Some(o) = self.enemies.as_mut() {
            retain_known(&mut o.enemies, |id| keep(EntityKind::Enemy, "enemies.enemies", id));
        }
        if let Some(o) = self.daytime_enemies.as_mut() {
            retain_known(&mut o.enemies, |id| {
                keep(EntityKind::Enemy, "daytime_enemies.enemies", id)
            });
        }
        if let Some(o) = self.outside_enemies.as_mut() {
            retain_known(&mut o.enemies, |id| {
                keep(EntityKind::Enemy, "outside_enemies.enemies", id)
            });
        }
        if let Some(o) = self.scrap.as_mut() {
            retain_known(&mut o.items, |id| keep(EntityKind::Item, "scrap.items", id));
        }
        if let Some(o) = self.dungeon.as_mut() {
            retain_known(&mut o.flows, |id| keep(EntityKind::DungeonFlow, "dungeon.flows", id));
        }
        if let Some(o) = self.traps.as_mut() {
            retain_known(&mut o.traps, |id| keep(EntityKind::Trap, "traps.traps", id));
        }
        if let Some(o) = self.price.as_mut() {
            retain_known(&mut o.destinations, |id| {
                keep(EntityKind::Destination, "price.destinations", id)
            });
        }
    }
}

/// Keep entries whose id passes `keep`.
///
/// A list left empty only by dropping unknown ids becomes unset again, so it
/// inherits like a list that was never written. An explicitly empty list
/// stays empty.
fn retain_known<T: IdentifiedRecord>(list: &mut Option<Vec<T>>, mut keep: impl FnMut(&str) -> bool) {
    let Some(entries) = list else {
        return;
    };
    if entries.is_empty() {
        return;
    }
    entries.retain(|e| keep(e.id()));
    if entries.is_empty() {
        *list = None;
    }
}

impl PresetRecord for PresetDocument {
    fn field(&self, name: &str) -> Option<Node<'_>> {
        Some(match name {
            "enemies" => record(&self.enemies),
            "daytime_enemies" => record(&self.daytime_enemies),
            "outside_enemies" => record(&self.outside_enemies),
            "scrap" => record(&self.scrap),
            "dungeon" => record(&self.dungeon),
            "traps" => record(&self.traps),
            "price" => record(&self.price),
            _ => return None,
        })
    }

    fn record_id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

/// Inside enemy spawning. Unlike the other enemy groups it has falloff.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsideEnemiesOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_power_count: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawn_chance_curve: Option<Curve>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawn_probability_range: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enemies: Option<Vec<InsideEnemyOption>>,
}

impl PresetRecord for InsideEnemiesOptions {
    fn field(&self, name: &str) -> Option<Node<'_>> {
        Some(match name {
            "max_power_count" => value(&self.max_power_count),
            "spawn_chance_curve" => value(&self.spawn_chance_curve),
            "spawn_probability_range" => value(&self.spawn_probability_range),
            "enemies" => list(&self.enemies),
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsideEnemyOption {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_enemy_count: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_level: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawn_curve: Option<Curve>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_falloff: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub falloff_curve: Option<Curve>,
}

impl IdentifiedRecord for InsideEnemyOption {
    fn id(&self) -> &str {
        &self.id
    }
}

impl PresetRecord for InsideEnemyOption {
    fn field(&self, name: &str) -> Option<Node<'_>> {
        Some(match name {
            "rarity" => value(&self.rarity),
            "max_enemy_count" => value(&self.max_enemy_count),
            "power_level" => value(&self.power_level),
            "spawn_curve" => value(&self.spawn_curve),
            "use_falloff" => value(&self.use_falloff),
            "falloff_curve" => value(&self.falloff_curve),
            _ => return None,
        })
    }

    fn record_id(&self) -> Option<&str> {
        Some(self.id())
    }
}

/// Daytime and outside enemy spawning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnemiesOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_power_count: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawn_chance_curve: Option<Curve>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enemies: Option<Vec<EnemyOption>>,
}

impl PresetRecord for EnemiesOptions {
    fn field(&self, name: &str) -> Option<Node<'_>> {
        Some(match name {
            "max_power_count" => value(&self.max_power_count),
            "spawn_chance_curve" => value(&self.spawn_chance_curve),
            "enemies" => list(&self.enemies),
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnemyOption {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_enemy_count: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_level: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawn_curve: Option<Curve>,
}

impl IdentifiedRecord for EnemyOption {
    fn id(&self) -> &str {
        &self.id
    }
}

impl PresetRecord for EnemyOption {
    fn field(&self, name: &str) -> Option<Node<'_>> {
        Some(match name {
            "rarity" => value(&self.rarity),
            "max_enemy_count" => value(&self.max_enemy_count),
            "power_level" => value(&self.power_level),
            "spawn_curve" => value(&self.spawn_curve),
            _ => return None,
        })
    }

    fn record_id(&self) -> Option<&str> {
        Some(self.id())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_scrap: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_scrap: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrap_amount_multiplier: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrap_value_multiplier: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<ItemOption>>,
}

impl PresetRecord for ScrapOptions {
    fn field(&self, name: &str) -> Option<Node<'_>> {
        Some(match name {
            "min_scrap" => value(&self.min_scrap),
            "max_scrap" => value(&self.max_scrap),
            "scrap_amount_multiplier" => value(&self.scrap_amount_multiplier),
            "scrap_value_multiplier" => value(&self.scrap_value_multiplier),
            "items" => list(&self.items),
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemOption {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conductive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub two_handed: Option<bool>,
}

impl IdentifiedRecord for ItemOption {
    fn id(&self) -> &str {
        &self.id
    }
}

impl PresetRecord for ItemOption {
    fn field(&self, name: &str) -> Option<Node<'_>> {
        Some(match name {
            "rarity" => value(&self.rarity),
            "min_value" => value(&self.min_value),
            "max_value" => value(&self.max_value),
            "weight" => value(&self.weight),
            "conductive" => value(&self.conductive),
            "two_handed" => value(&self.two_handed),
            _ => return None,
        })
    }

    fn record_id(&self) -> Option<&str> {
        Some(self.id())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DungeonOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_size_multiplier: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flows: Option<Vec<DungeonFlowOption>>,
}

impl PresetRecord for DungeonOptions {
    fn field(&self, name: &str) -> Option<Node<'_>> {
        Some(match name {
            "map_size_multiplier" => value(&self.map_size_multiplier),
            "flows" => list(&self.flows),
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DungeonFlowOption {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factory_size_multiplier: Option<f32>,
}

impl IdentifiedRecord for DungeonFlowOption {
    fn id(&self) -> &str {
        &self.id
    }
}

impl PresetRecord for DungeonFlowOption {
    fn field(&self, name: &str) -> Option<Node<'_>> {
        Some(match name {
            "rarity" => value(&self.rarity),
            "factory_size_multiplier" => value(&self.factory_size_multiplier),
            _ => return None,
        })
    }

    fn record_id(&self) -> Option<&str> {
        Some(self.id())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrapsOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traps: Option<Vec<TrapOption>>,
}

impl PresetRecord for TrapsOptions {
    fn field(&self, name: &str) -> Option<Node<'_>> {
        Some(match name {
            "traps" => list(&self.traps),
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrapOption {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawn_curve: Option<Curve>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_away_from_wall: Option<bool>,
}

impl IdentifiedRecord for TrapOption {
    fn id(&self) -> &str {
        &self.id
    }
}

impl PresetRecord for TrapOption {
    fn field(&self, name: &str) -> Option<Node<'_>> {
        Some(match name {
            "spawn_curve" => value(&self.spawn_curve),
            "face_away_from_wall" => value(&self.face_away_from_wall),
            _ => return None,
        })
    }

    fn record_id(&self) -> Option<&str> {
        Some(self.id())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destinations: Option<Vec<DestinationOption>>,
}

impl PresetRecord for PriceOptions {
    fn field(&self, name: &str) -> Option<Node<'_>> {
        Some(match name {
            "destinations" => list(&self.destinations),
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DestinationOption {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i32>,
}

impl IdentifiedRecord for DestinationOption {
    fn id(&self) -> &str {
        &self.id
    }
}

impl PresetRecord for DestinationOption {
    fn field(&self, name: &str) -> Option<Node<'_>> {
        Some(match name {
            "price" => value(&self.price),
            _ => return None,
        })
    }

    fn record_id(&self) -> Option<&str> {
        Some(self.id())
    }
}
