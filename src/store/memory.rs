//! In-memory settings store.

use super::{EntryKey, SettingsStore, StoreDocument};
use anyhow::{Result, anyhow};
use std::sync::RwLock;

/// Store that never touches disk. Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: RwLock<StoreDocument>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing document.
    pub fn from_document(doc: StoreDocument) -> Self {
        Self {
            doc: RwLock::new(doc),
        }
    }

    /// Copy of the current contents.
    pub fn document(&self) -> StoreDocument {
        self.doc.read().map(|d| d.clone()).unwrap_or_default()
    }
}

impl SettingsStore for MemoryStore {
    fn bind(
        &self,
        section: &str,
        key: &str,
        default: &str,
        description: &str,
    ) -> Result<EntryKey> {
        let mut doc = self.doc.write().map_err(|_| anyhow!("store lock poisoned"))?;
        doc.bind(section, key, default, description);
        Ok(EntryKey::new(section, key))
    }

    fn read_string(&self, entry: &EntryKey) -> Option<String> {
        let doc = self.doc.read().ok()?;
        doc.get(entry).map(|e| e.value.clone())
    }

    fn write_string(&self, entry: &EntryKey, value: &str) -> Result<()> {
        let mut doc = self.doc.write().map_err(|_| anyhow!("store lock poisoned"))?;
        let stored = doc
            .get_mut(entry)
            .ok_or_else(|| anyhow!("entry {} is not bound", entry))?;
        stored.value = value.to_string();
        Ok(())
    }

    fn description(&self, entry: &EntryKey) -> Option<String> {
        let doc = self.doc.read().ok()?;
        doc.get(entry).map(|e| e.description.clone())
    }

    fn set_save_on_set(&self, _enabled: bool) {}

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}
