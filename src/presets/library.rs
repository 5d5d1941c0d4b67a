//! Loaded preset set plus the level → preset mapping.

use super::chain::PresetChain;
use super::document::PresetDocument;
use crate::catalog::EntityCatalog;
use crate::error::{Diagnostic, Diagnostics};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info};

/// Preset interchange file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresetFile {
    #[serde(default)]
    pub presets: Vec<PresetDocument>,
    /// Level id → preset name.
    #[serde(default)]
    pub levels: BTreeMap<String, String>,
}

impl PresetFile {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading presets {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("parsing presets {}", path.display()))
    }
}

/// Validated presets, pruned against a catalog.
#[derive(Debug, Clone, Default)]
pub struct PresetLibrary {
    presets: Vec<PresetDocument>,
    by_id: HashMap<String, usize>,
    /// Level id → preset id.
    levels: BTreeMap<String, String>,
}

impl PresetLibrary {
    /// Validate a preset file.
    ///
    /// Duplicate ids and names keep the first definition. Unknown entity ids
    /// are pruned, and unknown parents, levels, and preset names are reported.
    /// Nothing here fails; the worst case is an empty library.
    pub fn load(file: PresetFile, catalog: &dyn EntityCatalog, diagnostics: &Diagnostics) -> Self {
        let mut presets: Vec<PresetDocument> = Vec::with_capacity(file.presets.len());
        let mut by_id = HashMap::new();
        let mut by_name: HashMap<String, usize> = HashMap::new();

        for mut doc in file.presets {
            if by_id.contains_key(&doc.id) {
                diagnostics.report(Diagnostic::duplicate_id(&doc.id));
                continue;
            }
            doc.prune(catalog, diagnostics);

            let index = presets.len();
            let name = doc.label().to_string();
            match by_name.get(&name) {
                Some(&kept) => {
                    diagnostics.report(Diagnostic::duplicate_name(&name, &presets[kept].id));
                }
                None => {
                    by_name.insert(name, index);
                }
            }
            by_id.insert(doc.id.clone(), index);
            presets.push(doc);
        }

        for doc in &presets {
            if let Some(parent) = doc.parent_id()
                && !by_id.contains_key(parent)
            {
                diagnostics.report(Diagnostic::unknown_parent(&doc.id, parent));
            }
        }

        let mut levels = BTreeMap::new();
        for (level, name) in file.levels {
            if catalog.level(&level).is_none() {
                diagnostics.report(Diagnostic::unknown_level(&level));
                continue;
            }
            match by_name.get(name.trim()) {
                Some(&index) => {
                    debug!(level = %level, preset = %presets[index].id, "level mapped to preset");
                    levels.insert(level, presets[index].id.clone());
                }
                None => {
                    diagnostics.report(Diagnostic::unknown_preset(&level, &name));
                }
            }
        }

        info!(
            presets = presets.len(),
            mapped_levels = levels.len(),
            "preset library loaded"
        );

        Self {
            presets,
            by_id,
            levels,
        }
    }

    /// Read and validate a preset file. Only I/O and JSON syntax errors fail.
    pub fn from_file(
        path: &Path,
        catalog: &dyn EntityCatalog,
        diagnostics: &Diagnostics,
    ) -> Result<Self> {
        let file = PresetFile::from_file(path)?;
        Ok(Self::load(file, catalog, diagnostics))
    }

    pub fn get(&self, id: &str) -> Option<&PresetDocument> {
        self.by_id.get(id).map(|&i| &self.presets[i])
    }

    pub fn presets(&self) -> &[PresetDocument] {
        &self.presets
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Preset id mapped to `level`, if any.
    pub fn preset_for_level(&self, level: &str) -> Option<&str> {
        self.levels.get(level).map(String::as_str)
    }

    pub fn mapped_levels(&self) -> impl Iterator<Item = &str> {
        self.levels.keys().map(String::as_str)
    }

    /// Chain starting at preset `id`.
    pub fn chain(&self, id: &str) -> Option<PresetChain<'_>> {
        let origin = self.get(id)?;
        Some(PresetChain::build(origin, |parent| self.get(parent)))
    }

    /// Chain applied to `level`; empty when the level has no valid mapping.
    pub fn chain_for_level(&self, level: &str) -> PresetChain<'_> {
        self.preset_for_level(level)
            .and_then(|id| self.chain(id))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ItemBaseline, LevelBaseline};
    use crate::error::ErrorCode;
    use crate::export::Snapshot;

    fn catalog() -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.items.insert("Bolt".into(), ItemBaseline::default());
        snapshot.levels.insert("Vow".into(), LevelBaseline::default());
        snapshot.levels.insert("Titan".into(), LevelBaseline::default());
        snapshot
    }

    const PRESETS: &str = r#"{
        "presets": [
            { "id": "base", "name": "Base", "scrap": { "min_scrap": 5 } },
            { "id": "hard", "name": "Hard", "parent": "base", "scrap": { "max_scrap": 30 } },
            { "id": "hard", "name": "Hard Again" },
            { "id": "other", "name": "Hard" },
            { "id": "lost", "name": "Lost", "parent": "nowhere" }
        ],
        "levels": {
            "Vow": "Hard",
            "Titan": "Missing",
            "Embrion": "Base"
        }
    }"#;

    #[test]
    fn test_load_reports_problems_and_keeps_first() {
        let diagnostics = Diagnostics::new();
        let library =
            PresetLibrary::load(PresetFile::from_json(PRESETS).unwrap(), &catalog(), &diagnostics);

        assert_eq!(library.presets().len(), 4);
        assert_eq!(library.get("hard").unwrap().name, "Hard");
        assert_eq!(diagnostics.count(ErrorCode::DuplicatePreset), 2);
        // nowhere parent, Missing preset, Embrion level
        assert_eq!(diagnostics.count(ErrorCode::UnknownReference), 3);

        assert_eq!(library.preset_for_level("Vow"), Some("hard"));
        assert_eq!(library.preset_for_level("Titan"), None);
        assert_eq!(library.chain_for_level("Vow").ids(), vec!["hard", "base"]);
        assert!(library.chain_for_level("Titan").is_empty());
    }

    #[test]
    fn test_chain_for_unknown_id() {
        let library = PresetLibrary::default();
        assert!(library.chain("nope").is_none());
        assert!(library.chain_for_level("Vow").is_empty());
    }

    #[test]
    fn test_from_file_missing_is_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let result = PresetLibrary::from_file(
            &temp.path().join("absent.json"),
            &catalog(),
            &Diagnostics::new(),
        );
        assert!(result.is_err());
    }
}
