//! Tagged field paths and the node view used to walk preset documents.
//!
//! A path is a list of steps, each either a plain field or a selection from
//! an id-keyed list: `scrap.items[Bolt].rarity` is
//! `[Field("scrap"), Select("items", "Bolt"), Field("rarity")]`.
//! Documents expose their fields through [`PresetRecord::field`], a static
//! accessor per schema, so the walk never needs reflection.

use crate::curve::Curve;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathStep {
    /// Descend into a named field.
    Field(String),
    /// Descend into a list field and pick the element with this id.
    Select { list: String, id: String },
}

/// Path from a document root to one value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    steps: Vec<PathStep>,
}

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.steps.push(PathStep::Field(name.into()));
        self
    }

    pub fn select(mut self, list: impl Into<String>, id: impl Into<String>) -> Self {
        self.steps.push(PathStep::Select {
            list: list.into(),
            id: id.into(),
        });
        self
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Name of the first step, which is the group the path belongs to.
    pub fn group(&self) -> Option<&str> {
        match self.steps.first()? {
            PathStep::Field(name) => Some(name),
            PathStep::Select { list, .. } => Some(list),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match step {
                PathStep::Field(name) => f.write_str(name)?,
                PathStep::Select { list, id } => write!(f, "{}[{}]", list, id)?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid field path: {0}")]
pub struct PathParseError(pub String);

impl FromStr for FieldPath {
    type Err = PathParseError;

    /// Parse `a.b[id].c`. Ids may contain dots and spaces; brackets delimit them.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut path = FieldPath::root();
        let mut rest = s.trim();
        if rest.is_empty() {
            return Err(PathParseError("empty path".to_string()));
        }

        while !rest.is_empty() {
            let end = rest.find(['.', '[']).unwrap_or(rest.len());
            let name = &rest[..end];
            if name.is_empty() {
                return Err(PathParseError(s.to_string()));
            }
            rest = &rest[end..];

            if let Some(after) = rest.strip_prefix('[') {
                let close = after
                    .find(']')
                    .ok_or_else(|| PathParseError(format!("unclosed '[' in {}", s)))?;
                path = path.select(name, &after[..close]);
                rest = &after[close + 1..];
            } else {
                path = path.field(name);
            }

            if let Some(after) = rest.strip_prefix('.') {
                if after.is_empty() {
                    return Err(PathParseError(s.to_string()));
                }
                rest = after;
            } else if !rest.is_empty() {
                return Err(PathParseError(s.to_string()));
            }
        }
        Ok(path)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A leaf value taken from a preset or a tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PresetValue {
    Int(i32),
    Float(f32),
    Bool(bool),
    Text(String),
    Curve(Curve),
}

impl From<i32> for PresetValue {
    fn from(v: i32) -> Self {
        PresetValue::Int(v)
    }
}

impl From<f32> for PresetValue {
    fn from(v: f32) -> Self {
        PresetValue::Float(v)
    }
}

impl From<bool> for PresetValue {
    fn from(v: bool) -> Self {
        PresetValue::Bool(v)
    }
}

impl From<String> for PresetValue {
    fn from(v: String) -> Self {
        PresetValue::Text(v)
    }
}

impl From<Curve> for PresetValue {
    fn from(v: Curve) -> Self {
        PresetValue::Curve(v)
    }
}

/// Typed extraction from a [`PresetValue`].
pub trait FromPresetValue: Sized {
    fn from_preset_value(value: &PresetValue) -> Option<Self>;
}

impl FromPresetValue for i32 {
    fn from_preset_value(value: &PresetValue) -> Option<Self> {
        match value {
            PresetValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromPresetValue for f32 {
    fn from_preset_value(value: &PresetValue) -> Option<Self> {
        match value {
            PresetValue::Float(v) => Some(*v),
            PresetValue::Int(v) => Some(*v as f32),
            _ => None,
        }
    }
}

impl FromPresetValue for bool {
    fn from_preset_value(value: &PresetValue) -> Option<Self> {
        match value {
            PresetValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromPresetValue for String {
    fn from_preset_value(value: &PresetValue) -> Option<Self> {
        match value {
            PresetValue::Text(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FromPresetValue for Curve {
    fn from_preset_value(value: &PresetValue) -> Option<Self> {
        match value {
            PresetValue::Curve(v) => Some(v.clone()),
            _ => None,
        }
    }
}

/// What a field accessor hands back to the path walk.
pub enum Node<'a> {
    /// An optional field that is not set.
    Unset,
    Record(&'a dyn PresetRecord),
    List(Vec<&'a dyn PresetRecord>),
    Value(PresetValue),
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Unset => write!(f, "Unset"),
            Node::Record(r) => write!(f, "Record({:?})", r.record_id()),
            Node::List(items) => write!(f, "List({})", items.len()),
            Node::Value(v) => write!(f, "Value({:?})", v),
        }
    }
}

/// Statically-typed field access for one document schema.
pub trait PresetRecord {
    /// `None` when the schema has no such field at all.
    fn field(&self, name: &str) -> Option<Node<'_>>;

    /// Selector id for records that live in id-keyed lists.
    fn record_id(&self) -> Option<&str> {
        None
    }
}

// Accessor helpers for optional fields.

pub(crate) fn value<T: Clone + Into<PresetValue>>(field: &Option<T>) -> Node<'_> {
    match field {
        Some(v) => Node::Value(v.clone().into()),
        None => Node::Unset,
    }
}

pub(crate) fn record<R: PresetRecord>(field: &Option<R>) -> Node<'_> {
    match field {
        Some(r) => Node::Record(r),
        None => Node::Unset,
    }
}

pub(crate) fn list<R: PresetRecord>(field: &Option<Vec<R>>) -> Node<'_> {
    match field {
        Some(items) => Node::List(items.iter().map(|r| r as &dyn PresetRecord).collect()),
        None => Node::Unset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let path = FieldPath::root()
            .field("scrap")
            .select("items", "Old Bird.v2")
            .field("rarity");
        let text = path.to_string();
        assert_eq!(text, "scrap.items[Old Bird.v2].rarity");
        assert_eq!(text.parse::<FieldPath>().unwrap(), path);
    }

    #[test]
    fn test_parse_simple() {
        let path: FieldPath = "scrap.min_scrap".parse().unwrap();
        assert_eq!(path, FieldPath::root().field("scrap").field("min_scrap"));
        assert_eq!(path.group(), Some("scrap"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "scrap.", ".scrap", "scrap..x", "items[Bolt", "items[Bolt]x"] {
            assert!(bad.parse::<FieldPath>().is_err(), "{bad:?} should not parse");
        }
        let err = "items[Bolt".parse::<FieldPath>().unwrap_err();
        assert_eq!(err.to_string(), "invalid field path: unclosed '[' in items[Bolt");
        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }

    #[test]
    fn test_typed_extraction() {
        assert_eq!(i32::from_preset_value(&PresetValue::Int(3)), Some(3));
        assert_eq!(f32::from_preset_value(&PresetValue::Int(3)), Some(3.0));
        assert_eq!(bool::from_preset_value(&PresetValue::Int(3)), None);
        assert_eq!(
            Curve::from_preset_value(&PresetValue::Curve(Curve::constant(1.0))),
            Some(Curve::constant(1.0))
        );
    }

    #[test]
    fn test_path_serializes_as_string() {
        let path = FieldPath::root().select("traps", "Landmine").field("spawn_curve");
        assert_eq!(
            serde_json::to_value(&path).unwrap(),
            serde_json::json!("traps[Landmine].spawn_curve")
        );
    }
}
