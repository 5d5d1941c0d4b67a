//! Integration tests for reviewing overrides against baselines.

use level_tuning::catalog::{DestinationBaseline, ItemBaseline, LevelBaseline};
use level_tuning::error::Diagnostics;
use level_tuning::export::Snapshot;
use level_tuning::export::diff::{diff_level, diff_snapshots};
use level_tuning::groups::{TierSettings, TuningConfig};
use level_tuning::overrides::ResolvedOverrides;
use level_tuning::presets::{PresetFile, PresetLibrary};
use level_tuning::store::{MemoryStore, StoreDocument, YamlFileStore};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn snapshot() -> Snapshot {
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
        .destinations
        .insert("Vow".into(), DestinationBaseline { price: 0 });
    snapshot.levels.insert("Vow".into(), LevelBaseline::default());
    snapshot
}

/// Store seeded from a YAML document, the way read-only commands load it.
fn store_from_yaml(yaml: &str) -> Arc<MemoryStore> {
    let doc: StoreDocument = serde_yaml::from_str(yaml).unwrap();
    Arc::new(MemoryStore::from_document(doc))
}

mod level_diff_tests {
    use super::*;

    #[test]
    fn groups_changes_and_counts_noops() {
        let snapshot = snapshot();
        let diagnostics = Diagnostics::new();
        let store = store_from_yaml(
            r#"
Vow.Price:
  Enabled:
    value: "true"
Vow.Price.Vow:
  Price:
    value: "0"
Vow.Scrap:
  Enabled:
    value: "true"
Vow.Scrap.Bolt:
  MaxValue:
    value: "90"
"#,
        );
        let config =
            TuningConfig::build(store.clone(), &snapshot, &diagnostics, &TierSettings::default())
                .unwrap();
        let file = PresetFile::from_json(
            r#"{ "presets": [ { "id": "cheap", "scrap": { "min_scrap": 2 } } ],
                 "levels": { "Vow": "cheap" } }"#,
        )
        .unwrap();
        let library = PresetLibrary::load(file, &snapshot, &diagnostics);
        let resolved = ResolvedOverrides::resolve(&config, &library);

        let diff = diff_level("Vow", resolved.level("Vow").unwrap());
        assert_eq!(diff.presets, vec!["cheap"]);
        assert_eq!(diff.total_changes(), 2);
        assert_eq!(diff.unchanged, 1);
        assert_eq!(
            diff.summary(),
            vec![("scrap".to_string(), 2)]
        );

        let text = diff.to_string();
        assert!(text.contains("scrap.items[Bolt].max_value: 40 -> 90 (level)"));
        assert!(text.contains("scrap.min_scrap: 0 -> 2 (preset cheap)"));
        assert!(text.contains("1 overrides match the baseline"));

        // Diffing never writes back
        assert_eq!(store.document().sections["Vow.Scrap.Bolt"]["MaxValue"].value, "90");
    }

    #[test]
    fn retain_groups_filters_output() {
        let snapshot = snapshot();
        let diagnostics = Diagnostics::new();
        let store = store_from_yaml(
            "Vow.Scrap:\n  Enabled:\n    value: \"true\"\n  MinScrap:\n    value: \"4\"\n",
        );
        let config =
            TuningConfig::build(store, &snapshot, &diagnostics, &TierSettings::default()).unwrap();
        let resolved = ResolvedOverrides::resolve(&config, &PresetLibrary::default());

        let mut diff = diff_level("Vow", resolved.level("Vow").unwrap());
        assert!(!diff.is_empty());
        diff.retain_groups(|g| g == "dungeon");
        assert!(diff.is_empty());
        assert!(diff.to_string().contains("No differences found."));
    }
}

mod snapshot_diff_tests {
    use super::*;

    #[test]
    fn compares_snapshots_written_to_disk() {
        let temp = TempDir::new().unwrap();
        let before = snapshot();
        let mut after = snapshot();
        after.items.get_mut("Bolt").unwrap().max_value = 45;
        after.items.insert("Gear".into(), ItemBaseline::default());
        after.levels.remove("Vow");

        let before_path = temp.path().join("before.json");
        let after_path = temp.path().join("after.json");
        fs::write(&before_path, before.to_json_pretty().unwrap()).unwrap();
        fs::write(&after_path, after.to_json_pretty().unwrap()).unwrap();

        let diff = diff_snapshots(
            &Snapshot::from_file(&before_path).unwrap(),
            &Snapshot::from_file(&after_path).unwrap(),
        );
        let items = &diff.tables["items"];
        assert_eq!(items.added, vec!["Gear"]);
        assert_eq!(items.modified.len(), 1);
        assert_eq!(items.modified[0].id, "Bolt");
        assert_eq!(diff.tables["levels"].removed, vec!["Vow"]);
        assert_eq!(diff.total_changes(), 3);
    }

    #[test]
    fn empty_store_file_loads_as_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.yaml");
        fs::write(&path, "\n").unwrap();
        let store = YamlFileStore::open(&path).unwrap();
        assert!(store.document().is_empty());
    }
}
