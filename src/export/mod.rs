//! Baseline snapshot format.
//!
//! A snapshot is exported from the running game once and is the source of
//! truth for:
//! - which entity ids exist (presets are pruned against it)
//! - every entity's baseline values
//! - each level's own spawn tables and scalars
//!
//! All maps are ordered so snapshots diff cleanly in version control.

pub mod diff;

use crate::catalog::{
    DestinationBaseline, DungeonFlowBaseline, EnemyBaseline, EntityCatalog, EntityKind,
    ItemBaseline, LevelBaseline, TrapBaseline,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Schema version of the snapshot layout.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Export format version (semver).
pub const EXPORT_VERSION: &str = "1.1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub schema_version: i32,

    /// Export format version (semver)
    pub export_version: String,

    /// ISO 8601 timestamp of export
    pub exported_at: String,

    /// Tool name and version that created this export
    pub exported_by: String,

    #[serde(default)]
    pub enemies: BTreeMap<String, EnemyBaseline>,
    #[serde(default)]
    pub items: BTreeMap<String, ItemBaseline>,
    #[serde(default)]
    pub traps: BTreeMap<String, TrapBaseline>,
    #[serde(default)]
    pub dungeon_flows: BTreeMap<String, DungeonFlowBaseline>,
    #[serde(default)]
    pub destinations: BTreeMap<String, DestinationBaseline>,

    /// Per-level tables, keyed by level id.
    #[serde(default)]
    pub levels: BTreeMap<String, LevelBaseline>,
}

impl Snapshot {
    /// Create a new empty snapshot with current metadata.
    pub fn new() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            export_version: EXPORT_VERSION.to_string(),
            exported_at: chrono::Utc::now().to_rfc3339(),
            exported_by: format!("level-tuning v{}", env!("CARGO_PKG_VERSION")),
            enemies: BTreeMap::new(),
            items: BTreeMap::new(),
            traps: BTreeMap::new(),
            dungeon_flows: BTreeMap::new(),
            destinations: BTreeMap::new(),
            levels: BTreeMap::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a snapshot from a file (plain JSON or gzip).
    pub fn from_file(path: &std::path::Path) -> anyhow::Result<Self> {
        use anyhow::Context;
        use std::io::Read;

        let bytes = std::fs::read(path)
            .with_context(|| format!("reading snapshot {}", path.display()))?;

        // Gzip magic bytes
        let parsed = if bytes.starts_with(&[0x1f, 0x8b]) {
            let mut json = String::new();
            flate2::read::GzDecoder::new(bytes.as_slice())
                .read_to_string(&mut json)
                .with_context(|| format!("decompressing snapshot {}", path.display()))?;
            serde_json::from_str(&json)
        } else {
            serde_json::from_slice(&bytes)
        };

        parsed.with_context(|| format!("parsing snapshot {}", path.display()))
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check if this snapshot's layout matches the current version.
    pub fn is_schema_compatible(&self) -> bool {
        self.schema_version == CURRENT_SCHEMA_VERSION
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityCatalog for Snapshot {
    fn ids(&self, kind: EntityKind) -> Vec<&str> {
        match kind {
            EntityKind::Enemy => self.enemies.keys().map(String::as_str).collect(),
            EntityKind::Item => self.items.keys().map(String::as_str).collect(),
            EntityKind::Trap => self.traps.keys().map(String::as_str).collect(),
            EntityKind::DungeonFlow => self.dungeon_flows.keys().map(String::as_str).collect(),
            EntityKind::Destination => self.destinations.keys().map(String::as_str).collect(),
        }
    }

    fn level_ids(&self) -> Vec<&str> {
        self.levels.keys().map(String::as_str).collect()
    }

    fn enemy(&self, id: &str) -> Option<&EnemyBaseline> {
        self.enemies.get(id)
    }

    fn item(&self, id: &str) -> Option<&ItemBaseline> {
        self.items.get(id)
    }

    fn trap(&self, id: &str) -> Option<&TrapBaseline> {
        self.traps.get(id)
    }

    fn dungeon_flow(&self, id: &str) -> Option<&DungeonFlowBaseline> {
        self.dungeon_flows.get(id)
    }

    fn destination(&self, id: &str) -> Option<&DestinationBaseline> {
        self.destinations.get(id)
    }

    fn level(&self, id: &str) -> Option<&LevelBaseline> {
        self.levels.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::Curve;
    use std::io::Write;
    use tempfile::TempDir;

    fn sample() -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.enemies.insert(
            "Flowerman".to_string(),
            EnemyBaseline {
                spawn_curve: Curve::parse("0:0.1, 1:0.9").unwrap(),
                ..EnemyBaseline::default()
            },
        );
        snapshot
            .levels
            .insert("Titan".to_string(), LevelBaseline::default());
        snapshot
    }

    #[test]
    fn test_snapshot_new() {
        let snapshot = Snapshot::new();
        assert_eq!(snapshot.schema_version, CURRENT_SCHEMA_VERSION);
        assert!(snapshot.is_schema_compatible());
        assert!(snapshot.enemies.is_empty());
    }

    #[test]
    fn test_catalog_lookups_are_exact() {
        let snapshot = sample();
        assert!(snapshot.contains(EntityKind::Enemy, "Flowerman"));
        assert!(!snapshot.contains(EntityKind::Enemy, "FlowerMan"));
        assert!(!snapshot.contains(EntityKind::Item, "Flowerman"));
        assert_eq!(snapshot.level_ids(), vec!["Titan"]);
    }

    #[test]
    fn test_minimal_json_uses_defaults() {
        let snapshot = Snapshot::from_json(
            r#"{
                "schema_version": 2,
                "export_version": "1.1.0",
                "exported_at": "2026-01-01T00:00:00Z",
                "exported_by": "test",
                "items": { "Bolt": { "min_value": 20, "max_value": 40 } },
                "levels": { "Vow": { "scrap": { "min_scrap": 10, "rarities": { "Bolt": 30 } } } }
            }"#,
        )
        .unwrap();

        let bolt = snapshot.item("Bolt").unwrap();
        assert_eq!(bolt.weight, 1.0);
        let vow = snapshot.level("Vow").unwrap();
        assert_eq!(vow.scrap.min_scrap, 10);
        assert_eq!(vow.scrap.scrap_value_multiplier, 1.0);
        assert_eq!(vow.scrap.rarities.get("Bolt"), Some(&30));
    }

    #[test]
    fn test_from_file_reads_gzip() {
        let temp = TempDir::new().unwrap();
        let json = sample().to_json_pretty().unwrap();

        let plain = temp.path().join("snapshot.json");
        std::fs::write(&plain, &json).unwrap();

        let gz = temp.path().join("snapshot.json.gz");
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(json.as_bytes()).unwrap();
        std::fs::write(&gz, encoder.finish().unwrap()).unwrap();

        for path in [plain, gz] {
            let loaded = Snapshot::from_file(&path).unwrap();
            assert_eq!(loaded.enemies, sample().enemies);
        }
    }
}
