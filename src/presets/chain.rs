//! Preset inheritance chains and path lookup across them.

use super::document::PresetDocument;
use super::path::{FieldPath, FromPresetValue, Node, PathStep, PresetRecord, PresetValue};
use tracing::debug;

/// A preset and its ancestors, most specific first.
#[derive(Debug, Clone, Default)]
pub struct PresetChain<'a> {
    documents: Vec<&'a PresetDocument>,
}

/// A value found in a chain and the preset that supplied it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub value: PresetValue,
    pub preset: String,
}

/// Outcome of walking a path through a single document.
enum Walk {
    Found(PresetValue),
    /// Not set here; ask the next document.
    Inherit,
    /// A list here omits the selected id; nothing further up may supply it.
    Removed,
}

impl<'a> PresetChain<'a> {
    /// A chain with no presets. Every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Follow parent links from `origin`.
    ///
    /// Stops when the parent is empty or unknown, when it closes back on the
    /// origin, or when it was already visited. The origin is always first
    /// and no id appears twice.
    pub fn build<F>(origin: &'a PresetDocument, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<&'a PresetDocument>,
    {
        let mut documents = vec![origin];
        let mut current = origin;

        while let Some(parent_id) = current.parent_id() {
            let Some(parent) = lookup(parent_id) else {
                break;
            };
            if parent.id == origin.id {
                debug!(origin = %origin.id, "preset chain closes back on origin");
                break;
            }
            if documents.iter().any(|d| d.id == parent.id) {
                debug!(origin = %origin.id, parent = %parent.id, "preset chain revisits a parent");
                break;
            }
            documents.push(parent);
            current = parent;
        }

        Self { documents }
    }

    pub fn documents(&self) -> &[&'a PresetDocument] {
        &self.documents
    }

    pub fn ids(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.id.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// First value set at `path`, origin first.
    pub fn resolve(&self, path: &FieldPath) -> Option<Resolution> {
        for doc in &self.documents {
            match walk(*doc, path.steps()) {
                Walk::Found(value) => {
                    return Some(Resolution {
                        value,
                        preset: doc.id.clone(),
                    });
                }
                Walk::Inherit => continue,
                Walk::Removed => {
                    debug!(preset = %doc.id, path = %path, "entry removed by preset list");
                    return None;
                }
            }
        }
        None
    }

    /// Typed form of [`resolve`](Self::resolve). A value of the wrong type is a miss.
    pub fn resolve_as<T: FromPresetValue>(&self, path: &FieldPath) -> Option<T> {
        self.resolve(path)
            .and_then(|r| T::from_preset_value(&r.value))
    }
}

fn walk(doc: &dyn PresetRecord, steps: &[PathStep]) -> Walk {
    let mut cursor = Node::Record(doc);

    for step in steps {
        let Node::Record(record) = cursor else {
            return Walk::Inherit;
        };
        cursor = match step {
            PathStep::Field(name) => match record.field(name) {
                Some(node) => node,
                None => return Walk::Inherit,
            },
            PathStep::Select { list, id } => match record.field(list) {
                Some(Node::List(items)) => {
                    match items.into_iter().find(|item| item.record_id() == Some(id.as_str())) {
                        Some(item) => Node::Record(item),
                        None => return Walk::Removed,
                    }
                }
                _ => return Walk::Inherit,
            },
        };
        if matches!(cursor, Node::Unset) {
            return Walk::Inherit;
        }
    }

    match cursor {
        Node::Value(value) => Walk::Found(value),
        _ => Walk::Inherit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::document::{ItemOption, ScrapOptions};
    use std::collections::HashMap;

    fn preset(id: &str, parent: &str) -> PresetDocument {
        PresetDocument {
            id: id.to_string(),
            name: id.to_string(),
            parent: parent.to_string(),
            ..Default::default()
        }
    }

    fn index(docs: &[PresetDocument]) -> HashMap<&str, &PresetDocument> {
        docs.iter().map(|d| (d.id.as_str(), d)).collect()
    }

    fn chain<'a>(docs: &'a [PresetDocument], origin: &str) -> PresetChain<'a> {
        let map = index(docs);
        let origin = map[origin];
        PresetChain::build(origin, |id| map.get(id).copied())
    }

    fn scrap(min_scrap: Option<i32>, items: Option<Vec<ItemOption>>) -> Option<ScrapOptions> {
        Some(ScrapOptions {
            min_scrap,
            items,
            ..Default::default()
        })
    }

    fn item(id: &str, rarity: Option<i32>) -> ItemOption {
        ItemOption {
            id: id.to_string(),
            rarity,
            ..Default::default()
        }
    }

    #[test]
    fn test_linear_chain() {
        let docs = vec![preset("a", "b"), preset("b", "c"), preset("c", "")];
        assert_eq!(chain(&docs, "a").ids(), vec!["a", "b", "c"]);
        assert_eq!(chain(&docs, "c").ids(), vec!["c"]);
    }

    #[test]
    fn test_mutual_cycle_stops_at_origin() {
        let docs = vec![preset("p1", "p2"), preset("p2", "p1")];
        assert_eq!(chain(&docs, "p1").ids(), vec!["p1", "p2"]);
        assert_eq!(chain(&docs, "p2").ids(), vec!["p2", "p1"]);
    }

    #[test]
    fn test_self_parent_and_unknown_parent() {
        let docs = vec![preset("solo", "solo"), preset("orphan", "missing")];
        assert_eq!(chain(&docs, "solo").ids(), vec!["solo"]);
        assert_eq!(chain(&docs, "orphan").ids(), vec!["orphan"]);
    }

    #[test]
    fn test_cycle_not_involving_origin() {
        let docs = vec![preset("a", "b"), preset("b", "c"), preset("c", "b")];
        assert_eq!(chain(&docs, "a").ids(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_precedence_nearest_set_wins() {
        let mut docs = vec![preset("a", "b"), preset("b", "c"), preset("c", "")];
        docs[1].scrap = scrap(Some(7), None);
        docs[2].scrap = scrap(Some(3), None);

        let path: FieldPath = "scrap.min_scrap".parse().unwrap();
        let found = chain(&docs, "a").resolve(&path).unwrap();
        assert_eq!(found.value, PresetValue::Int(7));
        assert_eq!(found.preset, "b");
        assert_eq!(chain(&docs, "a").resolve_as::<i32>(&path), Some(7));
    }

    #[test]
    fn test_list_without_entry_removes_it() {
        let mut docs = vec![preset("a", "b"), preset("b", "")];
        docs[0].scrap = scrap(None, Some(vec![item("Bolt", Some(5))]));
        docs[1].scrap = scrap(None, Some(vec![item("Airhorn", Some(40))]));

        let path = FieldPath::root()
            .field("scrap")
            .select("items", "Airhorn")
            .field("rarity");
        assert_eq!(chain(&docs, "a").resolve(&path), None);
        assert_eq!(chain(&docs, "b").resolve_as::<i32>(&path), Some(40));
    }

    #[test]
    fn test_unset_list_inherits() {
        let mut docs = vec![preset("a", "b"), preset("b", "")];
        docs[0].scrap = scrap(Some(1), None);
        docs[1].scrap = scrap(None, Some(vec![item("Airhorn", Some(40))]));

        let path: FieldPath = "scrap.items[Airhorn].rarity".parse().unwrap();
        assert_eq!(chain(&docs, "a").resolve_as::<i32>(&path), Some(40));
    }

    #[test]
    fn test_unset_entry_field_inherits() {
        let mut docs = vec![preset("a", "b"), preset("b", "")];
        docs[0].scrap = scrap(None, Some(vec![item("Bolt", None)]));
        docs[1].scrap = scrap(None, Some(vec![item("Bolt", Some(12))]));

        let path: FieldPath = "scrap.items[Bolt].rarity".parse().unwrap();
        let found = chain(&docs, "a").resolve(&path).unwrap();
        assert_eq!(found.preset, "b");
    }

    #[test]
    fn test_empty_chain_and_unknown_field() {
        let path: FieldPath = "scrap.min_scrap".parse().unwrap();
        assert_eq!(PresetChain::empty().resolve(&path), None);

        let docs = vec![preset("a", "")];
        let bogus: FieldPath = "weather.rain".parse().unwrap();
        assert_eq!(chain(&docs, "a").resolve(&bogus), None);
    }
}
