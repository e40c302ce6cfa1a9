//! Schema Document representation.
//!
//! A schema arrives as arbitrary JSON. Every JSON object that sits where a
//! schema belongs is classified once, at conversion time, by the structural
//! keywords it carries, so the projector can match on [`SchemaNode`] variants
//! instead of probing `type` strings. Where a value sits is its [`Slot`]:
//! name → schema maps and keyword data are never classified, whatever keys
//! they happen to hold. All keys stay in the node's [`SchemaMap`]; the tag only
//! records what the map is, which keeps `Value -> SchemaNode -> Value` lossless.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const TYPE: &str = "type";
pub const DESCRIPTION: &str = "description";
pub const PROPERTIES: &str = "properties";
pub const ITEMS: &str = "items";
pub const DEFINITIONS: &str = "definitions";
pub const DEFS: &str = "$defs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnionKind {
    OneOf,
    AnyOf,
    AllOf,
}

impl UnionKind {
    pub const ALL: [UnionKind; 3] = [UnionKind::OneOf, UnionKind::AnyOf, UnionKind::AllOf];

    pub fn keyword(self) -> &'static str {
        match self {
            UnionKind::OneOf => "oneOf",
            UnionKind::AnyOf => "anyOf",
            UnionKind::AllOf => "allOf",
        }
    }

    pub fn from_keyword(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.keyword() == key)
    }
}

/// Role of a value inside a schema document, decided by the keyword chain
/// that leads to it rather than by its own keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// A schema, or a list of schemas under `items` or a union keyword.
    Schema,
    /// A name → schema map: `properties`, `definitions`, `$defs`.
    Members,
    /// Keyword data such as `enum`, `required` or `default`.
    Literal,
}

impl Slot {
    /// Slot of the value held under `key` in a schema map.
    pub fn of_keyword(key: &str) -> Self {
        match key {
            PROPERTIES | DEFINITIONS | DEFS => Slot::Members,
            ITEMS => Slot::Schema,
            other if UnionKind::from_keyword(other).is_some() => Slot::Schema,
            _ => Slot::Literal,
        }
    }

    /// Slot of the members of a list sitting in this slot.
    fn of_list_member(self) -> Self {
        match self {
            Slot::Schema => Slot::Schema,
            Slot::Members | Slot::Literal => Slot::Literal,
        }
    }

    /// Slot of the child reached from `parent` (in this slot) through `segment`.
    pub fn step(self, parent: &SchemaNode, segment: &str) -> Self {
        match (parent, self) {
            (SchemaNode::List(_), slot) => slot.of_list_member(),
            (_, Slot::Schema) => Slot::of_keyword(segment),
            (_, Slot::Members) => Slot::Schema,
            (_, Slot::Literal) => Slot::Literal,
        }
    }
}

/// Keyword bag of a map-shaped schema node, ordered by key.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaMap(BTreeMap<String, SchemaNode>);

impl SchemaMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&SchemaNode> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, node: SchemaNode) -> Option<SchemaNode> {
        self.0.insert(key.into(), node)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SchemaNode)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw `type` keyword, whatever its JSON shape.
    pub fn type_value(&self) -> Option<&SchemaNode> {
        self.get(TYPE)
    }

    /// `type` when it is a single string.
    pub fn type_name(&self) -> Option<&str> {
        match self.get(TYPE) {
            Some(SchemaNode::Scalar(Value::String(name))) => Some(name),
            _ => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self.get(DESCRIPTION) {
            Some(SchemaNode::Scalar(Value::String(text))) => Some(text),
            _ => None,
        }
    }

    /// First union keyword present, in `oneOf`, `anyOf`, `allOf` order.
    pub fn union_kind(&self) -> Option<UnionKind> {
        UnionKind::ALL
            .into_iter()
            .find(|kind| self.contains_key(kind.keyword()))
    }
}

impl FromIterator<(String, SchemaNode)> for SchemaMap {
    fn from_iter<I: IntoIterator<Item = (String, SchemaNode)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for SchemaMap {
    type Item = (String, SchemaNode);
    type IntoIter = std::collections::btree_map::IntoIter<String, SchemaNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a SchemaMap {
    type Item = (&'a String, &'a SchemaNode);
    type IntoIter = std::collections::btree_map::Iter<'a, String, SchemaNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One node of a Schema Document.
///
/// `Clone` is the structural deep copy used everywhere a schema leaves the
/// registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum SchemaNode {
    /// null, boolean, number or string.
    Scalar(Value),
    /// A JSON array: tuple `items`, union members, `enum`/`required` literals.
    List(Vec<SchemaNode>),
    /// `type: "object"`, or untyped with `properties`.
    Object(SchemaMap),
    /// `type: "array"`, or untyped with `items`.
    Array(SchemaMap),
    /// Any other map carrying `oneOf`/`anyOf`/`allOf`.
    Union(UnionKind, SchemaMap),
    /// Any other map: scalar-typed schemas, member maps and keyword data.
    Plain(SchemaMap),
}

impl SchemaNode {
    pub fn classify(map: SchemaMap) -> Self {
        match map.type_name() {
            Some("object") => return Self::Object(map),
            Some("array") => return Self::Array(map),
            Some(_) => {}
            // Untyped, or a type list such as ["object", "null"].
            None => {
                if map.contains_key(PROPERTIES) {
                    return Self::Object(map);
                }
                if map.contains_key(ITEMS) {
                    return Self::Array(map);
                }
            }
        }
        match map.union_kind() {
            Some(kind) => Self::Union(kind, map),
            None => Self::Plain(map),
        }
    }

    pub fn as_map(&self) -> Option<&SchemaMap> {
        match self {
            Self::Object(map) | Self::Array(map) | Self::Union(_, map) | Self::Plain(map) => {
                Some(map)
            }
            Self::Scalar(_) | Self::List(_) => None,
        }
    }

    pub fn into_map(self) -> Option<SchemaMap> {
        match self {
            Self::Object(map) | Self::Array(map) | Self::Union(_, map) | Self::Plain(map) => {
                Some(map)
            }
            Self::Scalar(_) | Self::List(_) => None,
        }
    }

    /// Maps and lists; scalars are leaves.
    pub fn is_structured(&self) -> bool {
        !matches!(self, Self::Scalar(_))
    }

    pub fn get(&self, key: &str) -> Option<&SchemaNode> {
        self.as_map().and_then(|map| map.get(key))
    }

    pub fn type_name(&self) -> Option<&str> {
        self.as_map().and_then(SchemaMap::type_name)
    }

    pub fn description(&self) -> Option<&str> {
        self.as_map().and_then(SchemaMap::description)
    }

    pub fn string(text: impl Into<String>) -> Self {
        Self::Scalar(Value::String(text.into()))
    }

    pub fn to_value(&self) -> Value {
        Value::from(self.clone())
    }

    /// Build the node for `value` sitting in `slot`. Only maps in a
    /// [`Slot::Schema`] position are classified.
    pub fn from_value_in(value: Value, slot: Slot) -> Self {
        match value {
            Value::Array(items) => {
                let member = slot.of_list_member();
                Self::List(
                    items
                        .into_iter()
                        .map(|item| Self::from_value_in(item, member))
                        .collect(),
                )
            }
            Value::Object(fields) => {
                let map = fields
                    .into_iter()
                    .map(|(key, value)| {
                        let child = match slot {
                            Slot::Schema => Slot::of_keyword(&key),
                            Slot::Members => Slot::Schema,
                            Slot::Literal => Slot::Literal,
                        };
                        (key, Self::from_value_in(value, child))
                    })
                    .collect();
                match slot {
                    Slot::Schema => Self::classify(map),
                    Slot::Members | Slot::Literal => Self::Plain(map),
                }
            }
            scalar => Self::Scalar(scalar),
        }
    }
}

/// A bare value is read as a root schema.
impl From<Value> for SchemaNode {
    fn from(value: Value) -> Self {
        Self::from_value_in(value, Slot::Schema)
    }
}

impl From<SchemaNode> for Value {
    fn from(node: SchemaNode) -> Self {
        match node {
            SchemaNode::Scalar(value) => value,
            SchemaNode::List(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            SchemaNode::Object(map)
            | SchemaNode::Array(map)
            | SchemaNode::Union(_, map)
            | SchemaNode::Plain(map) => Value::Object(
                map.into_iter()
                    .map(|(key, node)| (key, Value::from(node)))
                    .collect(),
            ),
        }
    }
}
