//! Diffs for review.
//!
//! - A level's resolved overrides against its baseline
//! - Two snapshots against each other, table by table (entity kinds and levels)

use super::Snapshot;
use crate::overrides::{LevelOverrides, OverrideSource};
use crate::presets::PresetValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A single field that differs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldChange {
    pub field: String,
    pub old_value: Value,
    pub new_value: Value,
}

/// One overridden field on a level.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OverrideChange {
    #[serde(flatten)]
    pub change: FieldChange,
    pub source: OverrideSource,
}

/// Resolved values of one level compared with its baseline, grouped by
/// config group.
#[derive(Debug, Clone, Serialize, Default)]
pub struct LevelDiff {
    pub level: String,
    pub presets: Vec<String>,
    pub groups: BTreeMap<String, Vec<OverrideChange>>,
    /// Overrides that set the value the level already had.
    pub unchanged: usize,
}

impl LevelDiff {
    pub fn is_empty(&self) -> bool {
        self.groups.values().all(|g| g.is_empty())
    }

    pub fn total_changes(&self) -> usize {
        self.groups.values().map(|g| g.len()).sum()
    }

    /// (group, change count) for every group with changes.
    pub fn summary(&self) -> Vec<(String, usize)> {
        self.groups
            .iter()
            .filter(|(_, changes)| !changes.is_empty())
            .map(|(name, changes)| (name.clone(), changes.len()))
            .collect()
    }

    /// Keep only the named groups.
    pub fn retain_groups(&mut self, keep: impl Fn(&str) -> bool) {
        self.groups.retain(|name, _| keep(name));
    }
}

impl fmt::Display for LevelDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Level: {}", self.level)?;
        if !self.presets.is_empty() {
            writeln!(f, "Presets: {}", self.presets.join(" -> "))?;
        }
        writeln!(f, "{}", "=".repeat(60))?;

        if self.is_empty() {
            writeln!(f, "No differences found.")?;
            return Ok(());
        }

        for (group, changes) in &self.groups {
            if changes.is_empty() {
                continue;
            }
            writeln!(f)?;
            writeln!(f, "Group: {}", group)?;
            writeln!(f, "{}", "-".repeat(40))?;
            for c in changes {
                writeln!(
                    f,
                    "  ~ {}: {} -> {} ({})",
                    c.change.field,
                    c.change.old_value,
                    c.change.new_value,
                    source_label(&c.source)
                )?;
            }
        }

        writeln!(f)?;
        write!(f, "Summary: {} changes", self.total_changes())?;
        if self.unchanged > 0 {
            write!(f, ", {} overrides match the baseline", self.unchanged)?;
        }
        writeln!(f)
    }
}

fn source_label(source: &OverrideSource) -> String {
    match source {
        OverrideSource::Preset { id } => format!("preset {}", id),
        OverrideSource::Level => "level".to_string(),
        OverrideSource::Global => "global".to_string(),
    }
}

fn to_json(value: &PresetValue) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Compare values, with a small tolerance for floats.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => (x - y).abs() < 1e-6,
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

/// Diff a level's resolved overrides against its baseline.
pub fn diff_level(level: &str, overrides: &LevelOverrides) -> LevelDiff {
    let mut diff = LevelDiff {
        level: level.to_string(),
        presets: overrides.presets.clone(),
        ..LevelDiff::default()
    };

    for (path, resolved) in &overrides.fields {
        let old_value = to_json(&resolved.baseline);
        let new_value = to_json(&resolved.value);
        if values_equal(&old_value, &new_value) {
            diff.unchanged += 1;
            continue;
        }
        let group = path.group().unwrap_or_default().to_string();
        diff.groups.entry(group).or_default().push(OverrideChange {
            change: FieldChange {
                field: path.to_string(),
                old_value,
                new_value,
            },
            source: resolved.source.clone(),
        });
    }
    diff
}

/// A record whose fields changed between two snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifiedRecord {
    pub id: String,
    pub changes: Vec<FieldChange>,
}

/// Diff of one snapshot table.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TableDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub modified: Vec<ModifiedRecord>,
}

impl TableDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    pub fn change_count(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }
}

/// Complete diff between two snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SnapshotDiff {
    pub source_label: String,
    pub target_label: String,
    pub tables: BTreeMap<String, TableDiff>,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.tables.values().all(|t| t.is_empty())
    }

    pub fn total_changes(&self) -> usize {
        self.tables.values().map(|t| t.change_count()).sum()
    }

    /// (table, added, removed, modified) for every table with changes.
    pub fn summary(&self) -> Vec<(String, usize, usize, usize)> {
        self.tables
            .iter()
            .filter(|(_, diff)| !diff.is_empty())
            .map(|(name, diff)| {
                (
                    name.clone(),
                    diff.added.len(),
                    diff.removed.len(),
                    diff.modified.len(),
                )
            })
            .collect()
    }
}

impl fmt::Display for SnapshotDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            writeln!(f, "No differences found.")?;
            return Ok(());
        }

        writeln!(f, "Diff: {} -> {}", self.source_label, self.target_label)?;
        writeln!(f, "{}", "=".repeat(60))?;

        for (table, diff) in &self.tables {
            if diff.is_empty() {
                continue;
            }
            writeln!(f)?;
            writeln!(f, "Table: {}", table)?;
            writeln!(f, "{}", "-".repeat(40))?;

            if !diff.added.is_empty() {
                writeln!(f, "  Added ({}):", diff.added.len())?;
                for id in &diff.added {
                    writeln!(f, "    + {}", id)?;
                }
            }
            if !diff.removed.is_empty() {
                writeln!(f, "  Removed ({}):", diff.removed.len())?;
                for id in &diff.removed {
                    writeln!(f, "    - {}", id)?;
                }
            }
            if !diff.modified.is_empty() {
                writeln!(f, "  Modified ({}):", diff.modified.len())?;
                for record in &diff.modified {
                    writeln!(f, "    ~ {}", record.id)?;
                    for change in &record.changes {
                        writeln!(
                            f,
                            "        {}: {} -> {}",
                            change.field, change.old_value, change.new_value
                        )?;
                    }
                }
            }
        }

        writeln!(f)?;
        writeln!(f, "Summary: {} total changes", self.total_changes())
    }
}

/// Field differences between two records, recursing into nested objects.
fn diff_records(prefix: &str, source: &Value, target: &Value, changes: &mut Vec<FieldChange>) {
    match (source.as_object(), target.as_object()) {
        (Some(src), Some(tgt)) => {
            let fields: BTreeSet<&String> = src.keys().chain(tgt.keys()).collect();
            for field in fields {
                let name = if prefix.is_empty() {
                    field.clone()
                } else {
                    format!("{}.{}", prefix, field)
                };
                let old = src.get(field).unwrap_or(&Value::Null);
                let new = tgt.get(field).unwrap_or(&Value::Null);
                diff_records(&name, old, new, changes);
            }
        }
        _ => {
            if !values_equal(source, target) {
                changes.push(FieldChange {
                    field: prefix.to_string(),
                    old_value: source.clone(),
                    new_value: target.clone(),
                });
            }
        }
    }
}

fn diff_table<T: Serialize>(source: &BTreeMap<String, T>, target: &BTreeMap<String, T>) -> TableDiff {
    let mut diff = TableDiff::default();

    for (id, src) in source {
        match target.get(id) {
            None => diff.removed.push(id.clone()),
            Some(tgt) => {
                let src = serde_json::to_value(src).unwrap_or(Value::Null);
                let tgt = serde_json::to_value(tgt).unwrap_or(Value::Null);
                let mut changes = Vec::new();
                diff_records("", &src, &tgt, &mut changes);
                if !changes.is_empty() {
                    diff.modified.push(ModifiedRecord {
                        id: id.clone(),
                        changes,
                    });
                }
            }
        }
    }
    diff.added = target
        .keys()
        .filter(|id| !source.contains_key(*id))
        .cloned()
        .collect();
    diff
}

/// Compare two snapshots. Removed ids are what presets will lose on reload.
pub fn diff_snapshots(source: &Snapshot, target: &Snapshot) -> SnapshotDiff {
    let mut tables = BTreeMap::new();
    tables.insert("enemies".to_string(), diff_table(&source.enemies, &target.enemies));
    tables.insert("items".to_string(), diff_table(&source.items, &target.items));
    tables.insert("traps".to_string(), diff_table(&source.traps, &target.traps));
    tables.insert(
        "dungeon_flows".to_string(),
        diff_table(&source.dungeon_flows, &target.dungeon_flows),
    );
    tables.insert(
        "destinations".to_string(),
        diff_table(&source.destinations, &target.destinations),
    );
    tables.insert("levels".to_string(), diff_table(&source.levels, &target.levels));

    SnapshotDiff {
        source_label: String::new(),
        target_label: String::new(),
        tables,
    }
}
