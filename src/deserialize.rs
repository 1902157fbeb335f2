//! JSON:API document normalization.
//!
//! Turns a raw JSON:API document into a flat object graph: each resource
//! becomes `{ type, id, ...attributes }` with relationships resolved
//! against the document's `included` member into nested objects. The
//! orchestrator treats this as an opaque transform and passes the output
//! through untouched.

use serde_json::{Map, Value};

/// Normalize a JSON:API document into an object graph.
///
/// A collection document yields an array, a single-resource document an
/// object, anything else `null`.
pub fn deserialize(document: &Value) -> Value {
    let included = document
        .get("included")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    match document.get("data") {
        Some(Value::Array(items)) => Value::Array(
            items
                .iter()
                .map(|item| normalize_resource(item, included, &mut Vec::new()))
                .collect(),
        ),
        Some(item @ Value::Object(_)) => normalize_resource(item, included, &mut Vec::new()),
        _ => Value::Null,
    }
}

/// Flatten one resource and resolve its relationships.
///
/// `stack` holds the (type, id) pairs currently being normalized so
/// mutually related included resources cannot recurse forever; a cycle
/// falls back to a `{ type, id }` stub.
fn normalize_resource(resource: &Value, included: &[Value], stack: &mut Vec<(String, String)>) -> Value {
    let mut out = Map::new();
    let rtype = resource.get("type").and_then(Value::as_str).unwrap_or_default();
    let id = resource.get("id").and_then(Value::as_str).unwrap_or_default();
    out.insert("type".to_string(), Value::String(rtype.to_string()));
    out.insert("id".to_string(), Value::String(id.to_string()));
    stack.push((rtype.to_string(), id.to_string()));

    if let Some(attributes) = resource.get("attributes").and_then(Value::as_object) {
        for (name, value) in attributes {
            out.insert(name.clone(), value.clone());
        }
    }

    if let Some(relationships) = resource.get("relationships").and_then(Value::as_object) {
        for (name, relationship) in relationships {
            match relationship.get("data") {
                Some(Value::Array(identifiers)) => {
                    let related = identifiers
                        .iter()
                        .map(|identifier| resolve_identifier(identifier, included, stack))
                        .collect();
                    out.insert(name.clone(), Value::Array(related));
                }
                Some(identifier @ Value::Object(_)) => {
                    out.insert(name.clone(), resolve_identifier(identifier, included, stack));
                }
                _ => {
                    out.insert(name.clone(), Value::Null);
                }
            }
        }
    }

    stack.pop();
    Value::Object(out)
}

fn resolve_identifier(identifier: &Value, included: &[Value], stack: &mut Vec<(String, String)>) -> Value {
    let rtype = identifier.get("type").and_then(Value::as_str).unwrap_or_default();
    let id = identifier.get("id").and_then(Value::as_str).unwrap_or_default();
    let key = (rtype.to_string(), id.to_string());

    if !stack.contains(&key) {
        let found = included.iter().find(|resource| {
            resource.get("type").and_then(Value::as_str) == Some(rtype)
                && resource.get("id").and_then(Value::as_str) == Some(id)
        });
        if let Some(resource) = found {
            return normalize_resource(resource, included, stack);
        }
    }

    // Not in `included` (or a cycle): keep the bare identifier
    let mut stub = Map::new();
    stub.insert("type".to_string(), Value::String(rtype.to_string()));
    stub.insert("id".to_string(), Value::String(id.to_string()));
    Value::Object(stub)
}
