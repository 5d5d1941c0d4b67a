//! Backing key/value store for tunable values.
//!
//! Every tunable lives under a `(section, key)` pair as a plain string, with
//! a human-readable description and the string it was first bound with.
//! The resolution core only talks to the [`SettingsStore`] trait; this module
//! ships an in-memory store and a YAML file store.

mod file;
mod memory;

pub use file::YamlFileStore;
pub use memory::MemoryStore;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Handle to a bound entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryKey {
    pub section: String,
    pub key: String,
}

impl EntryKey {
    pub fn new(section: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section, self.key)
    }
}

/// Narrow contract the tuning groups depend on.
///
/// Implementations use interior mutability so a single store can be shared
/// (`Arc<dyn SettingsStore>`) by every value bound against it.
pub trait SettingsStore: Send + Sync + fmt::Debug {
    /// Bind an entry, creating it with `default` if it does not exist yet.
    ///
    /// Rebinding an existing key returns the same entry and keeps its stored
    /// value; only the description and recorded default are refreshed.
    fn bind(&self, section: &str, key: &str, default: &str, description: &str)
    -> Result<EntryKey>;

    /// Current stored string, or `None` if the key was never bound.
    fn read_string(&self, entry: &EntryKey) -> Option<String>;

    /// Overwrite the stored string.
    fn write_string(&self, entry: &EntryKey, value: &str) -> Result<()>;

    /// Description attached to an entry.
    fn description(&self, entry: &EntryKey) -> Option<String>;

    /// When false, writes and binds only touch memory until [`flush`](Self::flush).
    fn set_save_on_set(&self, enabled: bool);

    /// Persist pending changes.
    fn flush(&self) -> Result<()>;
}

/// One stored entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEntry {
    pub value: String,
    #[serde(default)]
    pub default: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Section → key → entry, ordered for stable files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreDocument {
    pub sections: BTreeMap<String, BTreeMap<String, StoredEntry>>,
}

impl StoreDocument {
    /// Bind semantics shared by every store. Returns true if anything changed.
    pub fn bind(&mut self, section: &str, key: &str, default: &str, description: &str) -> bool {
        let entries = self.sections.entry(section.to_string()).or_default();
        match entries.get_mut(key) {
            Some(existing) => {
                let changed = existing.default != default || existing.description != description;
                existing.default = default.to_string();
                existing.description = description.to_string();
                changed
            }
            None => {
                entries.insert(
                    key.to_string(),
                    StoredEntry {
                        value: default.to_string(),
                        default: default.to_string(),
                        description: description.to_string(),
                    },
                );
                true
            }
        }
    }

    pub fn get(&self, entry: &EntryKey) -> Option<&StoredEntry> {
        self.sections.get(&entry.section)?.get(&entry.key)
    }

    pub fn get_mut(&mut self, entry: &EntryKey) -> Option<&mut StoredEntry> {
        self.sections.get_mut(&entry.section)?.get_mut(&entry.key)
    }

    /// Number of bound entries across all sections.
    pub fn len(&self) -> usize {
        self.sections.values().map(|s| s.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_creates_with_default() {
        let mut doc = StoreDocument::default();
        assert!(doc.bind("Titan.Scrap", "MinScrap", "GLOBAL", "Minimum scrap"));

        let entry = doc.get(&EntryKey::new("Titan.Scrap", "MinScrap")).unwrap();
        assert_eq!(entry.value, "GLOBAL");
        assert_eq!(entry.default, "GLOBAL");
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_rebind_keeps_value() {
        let mut doc = StoreDocument::default();
        doc.bind("S", "K", "DEFAULT", "first");
        doc.get_mut(&EntryKey::new("S", "K")).unwrap().value = "12".to_string();

        assert!(doc.bind("S", "K", "DEFAULT", "second"));
        assert!(!doc.bind("S", "K", "DEFAULT", "second"));

        let entry = doc.get(&EntryKey::new("S", "K")).unwrap();
        assert_eq!(entry.value, "12");
        assert_eq!(entry.description, "second");
        assert_eq!(doc.len(), 1);
    }
}
