//! Field-by-field merging of configuration tiers.
//!
//! Objects merge recursively, everything else is replaced, and `null` in an
//! overlay means "not specified". Merging also records which tier supplied
//! each leaf so `config --sources` can explain the effective value.

use super::loader::ConfigTier;
use serde_json::Value;
use std::collections::BTreeMap;

/// Merge `overlay` into `base` in place.
pub fn merge_into(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(&key) {
                    Some(existing) => merge_into(existing, value),
                    None => {
                        if !value.is_null() {
                            target.insert(key, value);
                        }
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Merge two values, `overlay` winning.
pub fn deep_merge(mut base: Value, overlay: Value) -> Value {
    merge_into(&mut base, overlay);
    base
}

/// Effective configuration plus the tier each dotted leaf came from.
#[derive(Debug, Clone, Default)]
pub struct MergedConfig {
    pub value: Value,
    pub sources: BTreeMap<String, ConfigTier>,
}

impl MergedConfig {
    /// Apply one tier on top of what is merged so far.
    pub fn push(&mut self, tier: ConfigTier, overlay: Value) {
        record_leaves("", &overlay, tier, &mut self.sources);
        merge_into(&mut self.value, overlay);
    }

    /// Record a single leaf override, e.g. from an environment variable.
    pub fn set(&mut self, tier: ConfigTier, dotted: &str, value: Value) {
        let mut overlay = value;
        for key in dotted.rsplit('.') {
            let mut map = serde_json::Map::new();
            map.insert(key.to_string(), overlay);
            overlay = Value::Object(map);
        }
        self.push(tier, overlay);
    }

    pub fn source_of(&self, dotted: &str) -> Option<ConfigTier> {
        self.sources.get(dotted).copied()
    }
}

fn record_leaves(prefix: &str, value: &Value, tier: ConfigTier, sources: &mut BTreeMap<String, ConfigTier>) {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                record_leaves(&path, child, tier, sources);
            }
        }
        _ => {
            // A leaf replacing an object drops the object's recorded children.
            let nested = format!("{}.", prefix);
            sources.retain(|k, _| !k.starts_with(&nested));
            sources.insert(prefix.to_string(), tier);
        }
    }
}
