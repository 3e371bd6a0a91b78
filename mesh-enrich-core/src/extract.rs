//! Field extraction over the descriptor response variants
//!
//! The descriptor endpoint has served a few different JSON shapes: flat
//! objects with `label`/`treeNumber`, objects with `name`/`treeNumbers`, and
//! JSON-LD documents wrapping the node in `@graph`. Values appear as plain
//! strings, localized literals (`{"@value": .., "@language": "en"}`), node
//! references (`{"@id": ..}`), or lists of any of these.

use crate::identifier::{normalize, trailing_segment, ConceptIdentifier};
use mesh_vocab::fields;
use serde_json::Value;

/// Fields pulled from one descriptor response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorFields {
    pub label: Option<String>,
    /// Bare tree numbers, IRIs already reduced to their trailing segment
    pub tree_numbers: Vec<String>,
    /// `preferredMappedTo` targets, in document order
    pub mapped_to: Vec<ConceptIdentifier>,
}

/// Extract label, tree numbers and redirect targets from a descriptor.
///
/// Returns `Err` with a short description when the document is not a JSON
/// object at all.
pub fn descriptor_fields(doc: &Value) -> Result<DescriptorFields, String> {
    let Some(top) = doc.as_object() else {
        return Err(format!("expected a JSON object, found {}", kind_name(doc)));
    };
    let graph_node = top
        .get(fields::GRAPH)
        .and_then(Value::as_array)
        .and_then(|nodes| nodes.first())
        .and_then(Value::as_object);

    let label = fields::LABEL_FIELDS
        .iter()
        .find_map(|f| top.get(*f).and_then(literal))
        .or_else(|| {
            graph_node.and_then(|node| {
                fields::LABEL_FIELDS
                    .iter()
                    .find_map(|f| node.get(*f).and_then(literal))
            })
        });

    let raw_trees = fields::TREE_NUMBER_FIELDS
        .iter()
        .find_map(|f| top.get(*f))
        .or_else(|| graph_node.and_then(|node| node.get(fields::TREE_NUMBER)));
    let tree_numbers = raw_trees
        .map(|v| {
            references(v)
                .into_iter()
                .map(|r| trailing_segment(r).to_string())
                .filter(|t| !t.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let raw_mapped = top
        .get(fields::PREFERRED_MAPPED_TO)
        .or_else(|| graph_node.and_then(|node| node.get(fields::PREFERRED_MAPPED_TO)));
    let mapped_to = raw_mapped
        .map(|v| {
            references(v)
                .into_iter()
                .map(|r| normalize(trailing_segment(r)))
                .filter(ConceptIdentifier::is_well_formed)
                .collect()
        })
        .unwrap_or_default();

    Ok(DescriptorFields {
        label,
        tree_numbers,
        mapped_to,
    })
}

/// First usable literal in a label value.
fn literal(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Object(map) => map
            .get(fields::VALUE)
            .or_else(|| map.get(fields::LANG_EN))
            .and_then(literal),
        Value::Array(items) => items.iter().find_map(literal),
        _ => None,
    }
}

/// Flatten a string / `{"@id"}` / list value into its string entries.
fn references(value: &Value) -> Vec<&str> {
    match value {
        Value::String(s) => vec![s.as_str()],
        Value::Object(map) => map
            .get(fields::ID)
            .and_then(Value::as_str)
            .into_iter()
            .collect(),
        Value::Array(items) => items.iter().flat_map(references).collect(),
        _ => Vec::new(),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Label of the first SPARQL JSON result binding, if any.
///
/// `{"results": {"bindings": [{"label": {"type": "literal", "value": ".."}}]}}`
pub fn first_binding_label(doc: &Value) -> Option<String> {
    doc.pointer("/results/bindings")
        .and_then(Value::as_array)
        .and_then(|rows| rows.first())
        .and_then(|row| row.get("label"))
        .and_then(|b| b.get("value"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
