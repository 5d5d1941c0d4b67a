//! YAML file-backed settings store.
//!
//! The file is a mapping of section → key → `{value, default, description}`.
//! In batch mode (`save_on_set = false`) binds and writes only mark the
//! store dirty, and a single [`flush`](SettingsStore::flush) writes the file.

use super::{EntryKey, SettingsStore, StoreDocument};
use anyhow::{Context, Result, anyhow};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

#[derive(Debug)]
pub struct YamlFileStore {
    path: PathBuf,
    doc: RwLock<StoreDocument>,
    save_on_set: AtomicBool,
    dirty: AtomicBool,
}

impl YamlFileStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let doc = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("reading settings store {}", path.display()))?;
            if content.trim().is_empty() {
                StoreDocument::default()
            } else {
                serde_yaml::from_str(&content)
                    .with_context(|| format!("parsing settings store {}", path.display()))?
            }
        } else {
            StoreDocument::default()
        };
        debug!(path = %path.display(), entries = doc.len(), "Opened settings store");

        Ok(Self {
            path,
            doc: RwLock::new(doc),
            save_on_set: AtomicBool::new(true),
            dirty: AtomicBool::new(false),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the current in-memory contents.
    pub fn document(&self) -> StoreDocument {
        self.doc.read().map(|d| d.clone()).unwrap_or_default()
    }

    fn save(&self) -> Result<()> {
        let content = {
            let doc = self.doc.read().map_err(|_| anyhow!("store lock poisoned"))?;
            serde_yaml::to_string(&*doc)?
        };
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, content)
            .with_context(|| format!("writing settings store {}", self.path.display()))?;
        self.dirty.store(false, Ordering::Relaxed);
        Ok(())
    }

    fn changed(&self) -> Result<()> {
        self.dirty.store(true, Ordering::Relaxed);
        if self.save_on_set.load(Ordering::Relaxed) {
            self.save()?;
        }
        Ok(())
    }
}

impl SettingsStore for YamlFileStore {
    fn bind(
        &self,
        section: &str,
        key: &str,
        default: &str,
        description: &str,
    ) -> Result<EntryKey> {
        let changed = {
            let mut doc = self.doc.write().map_err(|_| anyhow!("store lock poisoned"))?;
            doc.bind(section, key, default, description)
        };
        if changed {
            self.changed()?;
        }
        Ok(EntryKey::new(section, key))
    }

    fn read_string(&self, entry: &EntryKey) -> Option<String> {
        let doc = self.doc.read().ok()?;
        doc.get(entry).map(|e| e.value.clone())
    }

    fn write_string(&self, entry: &EntryKey, value: &str) -> Result<()> {
        {
            let mut doc = self.doc.write().map_err(|_| anyhow!("store lock poisoned"))?;
            let stored = doc
                .get_mut(entry)
                .ok_or_else(|| anyhow!("entry {} is not bound", entry))?;
            stored.value = value.to_string();
        }
        self.changed()
    }

    fn description(&self, entry: &EntryKey) -> Option<String> {
        let doc = self.doc.read().ok()?;
        doc.get(entry).map(|e| e.description.clone())
    }

    fn set_save_on_set(&self, enabled: bool) {
        self.save_on_set.store(enabled, Ordering::Relaxed);
    }

    fn flush(&self) -> Result<()> {
        if self.dirty.load(Ordering::Relaxed) {
            self.save()?;
        }
        Ok(())
    }
}
