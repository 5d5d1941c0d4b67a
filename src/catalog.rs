//! Entity identities and baseline values.
//!
//! The game's own templates are external; the tuning core only needs each
//! entity's stable id and a handful of baseline numbers, plus per-level
//! spawn tables. [`EntityCatalog`] is that read-only view.

use crate::curve::Curve;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Anything addressable by a stable string id.
pub trait IdentifiedRecord {
    fn id(&self) -> &str;
}

/// Kinds of entity that override lists can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Enemy,
    Item,
    Trap,
    DungeonFlow,
    Destination,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Enemy => write!(f, "enemy"),
            EntityKind::Item => write!(f, "item"),
            EntityKind::Trap => write!(f, "trap"),
            EntityKind::DungeonFlow => write!(f, "dungeon flow"),
            EntityKind::Destination => write!(f, "destination"),
        }
    }
}

/// Baseline values of an enemy template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyBaseline {
    #[serde(default = "default_max_enemy_count")]
    pub max_enemy_count: i32,
    #[serde(default = "default_power_level")]
    pub power_level: f32,
    #[serde(default)]
    pub spawn_curve: Curve,
    #[serde(default)]
    pub use_falloff: bool,
    #[serde(default)]
    pub falloff_curve: Curve,
}

impl Default for EnemyBaseline {
    fn default() -> Self {
        Self {
            max_enemy_count: default_max_enemy_count(),
            power_level: default_power_level(),
            spawn_curve: Curve::default(),
            use_falloff: false,
            falloff_curve: Curve::default(),
        }
    }
}

fn default_max_enemy_count() -> i32 {
    1
}

fn default_power_level() -> f32 {
    1.0
}

/// Baseline values of a scrap item template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemBaseline {
    #[serde(default)]
    pub min_value: i32,
    #[serde(default)]
    pub max_value: i32,
    #[serde(default = "default_weight")]
    pub weight: f32,
    #[serde(default)]
    pub conductive: bool,
    #[serde(default)]
    pub two_handed: bool,
}

impl Default for ItemBaseline {
    fn default() -> Self {
        Self {
            min_value: 0,
            max_value: 0,
            weight: default_weight(),
            conductive: false,
            two_handed: false,
        }
    }
}

fn default_weight() -> f32 {
    1.0
}

/// Baseline values of a trap template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrapBaseline {
    #[serde(default)]
    pub spawn_curve: Curve,
    #[serde(default)]
    pub face_away_from_wall: bool,
}

/// Baseline values of a dungeon flow template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonFlowBaseline {
    #[serde(default = "default_multiplier")]
    pub factory_size_multiplier: f32,
}

impl Default for DungeonFlowBaseline {
    fn default() -> Self {
        Self {
            factory_size_multiplier: default_multiplier(),
        }
    }
}

/// Baseline route price of a destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DestinationBaseline {
    #[serde(default)]
    pub price: i32,
}

fn default_multiplier() -> f32 {
    1.0
}

/// One level's enemy spawn table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawnBaseline {
    #[serde(default)]
    pub max_power_count: i32,
    #[serde(default)]
    pub spawn_chance_curve: Curve,
    /// Only meaningful for inside enemies.
    #[serde(default)]
    pub spawn_probability_range: f32,
    /// Enemy id → rarity.
    #[serde(default)]
    pub rarities: BTreeMap<String, i32>,
}

/// One level's scrap table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapBaseline {
    #[serde(default)]
    pub min_scrap: i32,
    #[serde(default)]
    pub max_scrap: i32,
    #[serde(default = "default_multiplier")]
    pub scrap_amount_multiplier: f32,
    #[serde(default = "default_multiplier")]
    pub scrap_value_multiplier: f32,
    /// Item id → rarity.
    #[serde(default)]
    pub rarities: BTreeMap<String, i32>,
}

impl Default for ScrapBaseline {
    fn default() -> Self {
        Self {
            min_scrap: 0,
            max_scrap: 0,
            scrap_amount_multiplier: default_multiplier(),
            scrap_value_multiplier: default_multiplier(),
            rarities: BTreeMap::new(),
        }
    }
}

/// One level's dungeon generation table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonBaseline {
    #[serde(default = "default_multiplier")]
    pub map_size_multiplier: f32,
    /// Flow id → rarity.
    #[serde(default)]
    pub rarities: BTreeMap<String, i32>,
}

impl Default for DungeonBaseline {
    fn default() -> Self {
        Self {
            map_size_multiplier: default_multiplier(),
            rarities: BTreeMap::new(),
        }
    }
}

/// Everything a level contributes on top of the entity baselines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelBaseline {
    #[serde(default)]
    pub enemies: EnemySpawnBaseline,
    #[serde(default)]
    pub daytime_enemies: EnemySpawnBaseline,
    #[serde(default)]
    pub outside_enemies: EnemySpawnBaseline,
    #[serde(default)]
    pub scrap: ScrapBaseline,
    #[serde(default)]
    pub dungeon: DungeonBaseline,
    /// Trap id → spawn curve on this level.
    #[serde(default)]
    pub traps: BTreeMap<String, Curve>,
}

/// Read-only source of entity identities and baselines.
pub trait EntityCatalog {
    /// All known ids of one kind, in stable order.
    fn ids(&self, kind: EntityKind) -> Vec<&str>;
    fn level_ids(&self) -> Vec<&str>;

    fn enemy(&self, id: &str) -> Option<&EnemyBaseline>;
    fn item(&self, id: &str) -> Option<&ItemBaseline>;
    fn trap(&self, id: &str) -> Option<&TrapBaseline>;
    fn dungeon_flow(&self, id: &str) -> Option<&DungeonFlowBaseline>;
    fn destination(&self, id: &str) -> Option<&DestinationBaseline>;
    fn level(&self, id: &str) -> Option<&LevelBaseline>;

    /// Exact, case-sensitive membership test.
    fn contains(&self, kind: EntityKind, id: &str) -> bool {
        match kind {
            EntityKind::Enemy => self.enemy(id).is_some(),
            EntityKind::Item => self.item(id).is_some(),
            EntityKind::Trap => self.trap(id).is_some(),
            EntityKind::DungeonFlow => self.dungeon_flow(id).is_some(),
            EntityKind::Destination => self.destination(id).is_some(),
        }
    }
}
