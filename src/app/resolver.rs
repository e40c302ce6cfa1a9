use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::domain::{
    errors::{DomainError, Result},
    schema::{SchemaNode, Slot},
    types::JsonPointer,
};

static ARRAY_INDEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(0|[1-9][0-9]*)$").expect("array index regex must compile"));

/// Resolve a structural path against a schema tree.
///
/// Algorithm:
/// 1. A root pointer (`""` or `"/"`) yields `root` itself.
/// 2. Each segment steps the cursor one level:
///    - null cursor → [`DomainError::InvalidPointer`];
///    - list cursor → segment must be a canonical non-negative index below the
///      list length. `-` (one past the end) and out-of-range indices are
///      [`DomainError::IndexOutOfBounds`]; anything else is `InvalidPointer`;
///    - map cursor → segment must name an existing key;
///    - any other scalar → `InvalidPointer`.
///
/// The returned reference borrows from `root`; nothing is copied or mutated.
pub fn resolve_pointer<'a>(root: &'a SchemaNode, pointer: &JsonPointer) -> Result<&'a SchemaNode> {
    pointer
        .segments()
        .iter()
        .try_fold(root, |current, segment| step(current, segment))
}

/// Like [`resolve_pointer`], also reporting the [`Slot`] of the target, with
/// `root` taken as a schema.
pub fn resolve_slot<'a>(
    root: &'a SchemaNode,
    pointer: &JsonPointer,
) -> Result<(&'a SchemaNode, Slot)> {
    pointer
        .segments()
        .iter()
        .try_fold((root, Slot::Schema), |(current, slot), segment| {
            Ok((step(current, segment)?, slot.step(current, segment)))
        })
}

fn step<'a>(current: &'a SchemaNode, segment: &str) -> Result<&'a SchemaNode> {
    match current {
        SchemaNode::Scalar(Value::Null) => Err(DomainError::invalid_pointer(
            segment,
            "parent value is null",
        )),
        SchemaNode::Scalar(_) => Err(DomainError::invalid_pointer(
            segment,
            "cannot traverse into a scalar value",
        )),
        SchemaNode::List(items) => {
            let index = parse_array_index(segment, items.len())?;
            Ok(&items[index])
        }
        SchemaNode::Object(map)
        | SchemaNode::Array(map)
        | SchemaNode::Union(_, map)
        | SchemaNode::Plain(map) => map
            .get(segment)
            .ok_or_else(|| DomainError::invalid_pointer(segment, "property does not exist")),
    }
}

fn parse_array_index(segment: &str, len: usize) -> Result<usize> {
    if segment == "-" {
        return Err(DomainError::IndexOutOfBounds {
            segment: segment.to_string(),
            index: len,
            len,
        });
    }
    if !ARRAY_INDEX_RE.is_match(segment) {
        return Err(DomainError::invalid_pointer(
            segment,
            "array index must be a non-negative integer",
        ));
    }
    let index = segment.parse::<usize>().map_err(|_| {
        DomainError::invalid_pointer(segment, "array index does not fit in memory")
    })?;
    if index >= len {
        return Err(DomainError::IndexOutOfBounds {
            segment: segment.to_string(),
            index,
            len,
        });
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(value: Value) -> SchemaNode {
        SchemaNode::from(value)
    }

    fn resolve(doc: &SchemaNode, ptr: &str) -> Result<Value> {
        resolve_pointer(doc, &JsonPointer::parse(ptr)).map(SchemaNode::to_value)
    }

    #[test]
    fn root_pointers_return_document() {
        let doc = node(json!({"type": "object"}));
        assert_eq!(resolve(&doc, "").unwrap(), json!({"type": "object"}));
        assert_eq!(resolve(&doc, "/").unwrap(), json!({"type": "object"}));
    }

    #[test]
    fn nested_properties_resolve() {
        let doc = node(json!({
            "properties": {"a": {"properties": {"b": {"type": "string"}}}}
        }));
        assert_eq!(
            resolve(&doc, "/properties/a/properties/b").unwrap(),
            json!({"type": "string"})
        );
        assert_eq!(
            resolve(&doc, "properties/a/properties/b").unwrap(),
            json!({"type": "string"})
        );
    }

    #[test]
    fn escaped_segments_resolve() {
        let doc = node(json!({"properties": {"a/b": {"type": "integer"}, "m~n": true}}));
        assert_eq!(
            resolve(&doc, "/properties/a~1b").unwrap(),
            json!({"type": "integer"})
        );
        assert_eq!(resolve(&doc, "/properties/m~0n").unwrap(), json!(true));
    }

    #[test]
    fn array_indices_resolve() {
        let doc = node(json!({"oneOf": [{"type": "string"}, {"type": "null"}]}));
        assert_eq!(resolve(&doc, "/oneOf/1").unwrap(), json!({"type": "null"}));
    }

    #[test]
    fn missing_property_is_invalid_pointer() {
        let doc = node(json!({"properties": {"a": {"type": "string"}}}));
        let err = resolve(&doc, "/properties/zzz").unwrap_err();
        match err {
            DomainError::InvalidPointer { segment, .. } => assert_eq!(segment, "zzz"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn out_of_range_index_is_bounds_error() {
        let doc = node(json!({"type": "array", "items": ["x"]}));
        let err = resolve(&doc, "/items/5").unwrap_err();
        assert!(matches!(
            err,
            DomainError::IndexOutOfBounds {
                index: 5,
                len: 1,
                ..
            }
        ));
    }

    #[test]
    fn dash_segment_is_bounds_error() {
        let doc = node(json!({"type": "array", "items": ["x"]}));
        let err = resolve(&doc, "/items/-").unwrap_err();
        assert!(matches!(
            err,
            DomainError::IndexOutOfBounds { index: 1, len: 1, .. }
        ));
    }

    #[test]
    fn non_numeric_and_padded_indices_are_invalid() {
        let doc = node(json!({"items": ["x", "y"]}));
        for bad in ["/items/first", "/items/-1", "/items/01", "/items/ 1"] {
            let err = resolve(&doc, bad).unwrap_err();
            assert!(
                matches!(err, DomainError::InvalidPointer { .. }),
                "{bad}: {err:?}"
            );
        }
    }

    #[test]
    fn traversal_into_scalars_fails() {
        let doc = node(json!({"type": "string", "default": null}));
        assert!(matches!(
            resolve(&doc, "/type/x").unwrap_err(),
            DomainError::InvalidPointer { .. }
        ));
        assert!(matches!(
            resolve(&doc, "/default/x").unwrap_err(),
            DomainError::InvalidPointer { .. }
        ));
    }

    #[test]
    fn resolution_does_not_mutate_document() {
        let doc = node(json!({"properties": {"a": {"type": "string"}}}));
        let before = doc.clone();
        let _ = resolve(&doc, "/properties/a");
        let _ = resolve(&doc, "/properties/missing");
        assert_eq!(doc, before);
    }

    #[test]
    fn slot_tracks_member_maps_and_keyword_data() {
        let doc = node(json!({
            "properties": {
                "properties": {"type": "object", "properties": {}},
                "tags": {"type": "array", "items": [{"type": "string"}], "enum": [["a"]]}
            },
            "$defs": {"Id": {"type": "string"}}
        }));
        let slot = |ptr: &str| resolve_slot(&doc, &JsonPointer::parse(ptr)).unwrap().1;

        assert_eq!(slot(""), Slot::Schema);
        assert_eq!(slot("/properties"), Slot::Members);
        assert_eq!(slot("/properties/properties"), Slot::Schema);
        assert_eq!(slot("/properties/properties/properties"), Slot::Members);
        assert_eq!(slot("/$defs"), Slot::Members);
        assert_eq!(slot("/properties/tags/items/0"), Slot::Schema);
        assert_eq!(slot("/properties/tags/enum/0"), Slot::Literal);
        assert!(resolve_slot(&doc, &JsonPointer::parse("/nope")).is_err());
    }
}
