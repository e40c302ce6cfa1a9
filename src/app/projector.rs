//! Depth-bounded projection of schema trees.
//!
//! Depth counts structural nesting only: entering a member of `properties`,
//! `definitions` or `$defs`, the `items` schema, or a branch of
//! `oneOf`/`anyOf`/`allOf` adds one. Once the ceiling is reached, object,
//! array and union nodes collapse into self-describing placeholders.

use serde_json::Value;

use crate::domain::{
    schema::{
        SchemaMap, SchemaNode, Slot, UnionKind, DEFINITIONS, DEFS, DESCRIPTION, ITEMS, PROPERTIES,
        TYPE,
    },
    types::DepthLimit,
};

pub const OBJECT_HINT: &str =
    "Object with nested fields omitted (expandable: request this path to see them).";
pub const ARRAY_HINT: &str =
    "Array whose item schema is omitted (expandable: request this path to see it).";
pub const EXPANDABLE_SUFFIX: &str = "(expandable: request this path for nested detail)";
pub const COMPOSITE_HINT: &str = "expandable composite schema";

/// Project `node` with depth counted from `node` itself.
pub fn project(node: &SchemaNode, max_depth: DepthLimit) -> SchemaNode {
    project_at(node, 0, max_depth)
}

/// Project a node that was reached through a path, according to its slot.
/// A member map is transparent: its members sit at depth 0. Keyword data is
/// returned as is.
pub fn project_slot(node: &SchemaNode, slot: Slot, max_depth: DepthLimit) -> SchemaNode {
    match slot {
        Slot::Schema => project(node, max_depth),
        Slot::Members => project_members(node, 0, max_depth),
        Slot::Literal => node.clone(),
    }
}

fn project_at(node: &SchemaNode, depth: usize, limit: DepthLimit) -> SchemaNode {
    match node {
        SchemaNode::Scalar(_) => node.clone(),
        // A list is never a schema boundary itself; its members sit at the
        // depth of the keyword that holds them.
        SchemaNode::List(members) => SchemaNode::List(
            members
                .iter()
                .map(|member| project_at(member, depth, limit))
                .collect(),
        ),
        _ if limit.reached_at(depth) => collapse(node),
        SchemaNode::Object(map)
        | SchemaNode::Array(map)
        | SchemaNode::Union(_, map)
        | SchemaNode::Plain(map) => SchemaNode::classify(descend(map, depth, limit)),
    }
}

fn descend(map: &SchemaMap, depth: usize, limit: DepthLimit) -> SchemaMap {
    map.iter()
        .map(|(key, child)| {
            let projected = match key.as_str() {
                PROPERTIES | DEFINITIONS | DEFS => project_members(child, depth + 1, limit),
                ITEMS => project_at(child, depth + 1, limit),
                other if UnionKind::from_keyword(other).is_some() => {
                    project_at(child, depth + 1, limit)
                }
                _ => child.clone(),
            };
            (key.clone(), projected)
        })
        .collect()
}

/// Project every value of a name → schema map (`properties`, `$defs`, ...).
fn project_members(members: &SchemaNode, depth: usize, limit: DepthLimit) -> SchemaNode {
    match members.as_map() {
        Some(map) => SchemaNode::Plain(
            map.iter()
                .map(|(name, member)| (name.clone(), project_at(member, depth, limit)))
                .collect(),
        ),
        None => members.clone(),
    }
}

fn collapse(node: &SchemaNode) -> SchemaNode {
    match node {
        SchemaNode::Object(map) => placeholder("object", hint(map, OBJECT_HINT)),
        SchemaNode::Array(map) => placeholder("array", hint(map, ARRAY_HINT)),
        SchemaNode::Union(_, map) => {
            let mut out = SchemaMap::new();
            if let Some(type_value) = map.type_value() {
                out.insert(TYPE, type_value.clone());
            }
            out.insert(DESCRIPTION, SchemaNode::string(COMPOSITE_HINT));
            SchemaNode::classify(out)
        }
        SchemaNode::Scalar(_) | SchemaNode::List(_) | SchemaNode::Plain(_) => node.clone(),
    }
}

fn placeholder(type_name: &str, description: String) -> SchemaNode {
    let mut out = SchemaMap::new();
    out.insert(TYPE, SchemaNode::Scalar(Value::String(type_name.to_string())));
    out.insert(DESCRIPTION, SchemaNode::string(description));
    SchemaNode::classify(out)
}

fn hint(map: &SchemaMap, generic: &str) -> String {
    match map.description().map(str::trim).filter(|d| !d.is_empty()) {
        Some(description) => format!("{} {}", description, EXPANDABLE_SUFFIX),
        None => generic.to_string(),
    }
}
