use serde_json::Value;

use crate::types::{Segment, Shape};

/// Reads the value addressed by `segments` out of `source`.
///
/// Arrays met along the way are distributed over, producing nested result arrays with
/// `null` in the slots that had no value. A result array holding no value at all, at any
/// depth, is reported as absent. An explicit `null` at the end of the path is returned as
/// `Some(Value::Null)`; a `null` met before the end is absent.
///
/// # Arguments
///
/// * `source` - The value to read from.
/// * `segments` - The parsed path.
pub fn lookup_value(source: &Value, segments: &[Segment]) -> Option<Value> {
    let result = resolve(source, segments)?;
    match result {
        Value::Array(_) if !has_value(&result) => None,
        other => Some(other),
    }
}

fn resolve(current: &Value, segments: &[Segment]) -> Option<Value> {
    let Some((segment, rest)) = segments.split_first() else {
        return Some(current.clone());
    };
    if current.is_null() {
        return None;
    }

    match (segment.shape(), current) {
        // A key applied to an array is applied to each of its elements.
        (Shape::Key | Shape::ValueArray, Value::Array(items)) => Some(distribute(items, segments)),
        (Shape::Key, Value::Object(map)) => map.get(&segment.name).and_then(|v| resolve(v, rest)),
        (Shape::ValueArray, Value::Object(map)) => {
            select(map.get(&segment.name)?, segment, rest)
        }
        (Shape::BareArray, Value::Array(_)) => select(current, segment, rest),
        _ => None,
    }
}

fn select(target: &Value, segment: &Segment, rest: &[Segment]) -> Option<Value> {
    match (target, segment.index()) {
        (Value::Array(items), None) => Some(distribute(items, rest)),
        (Value::Array(items), Some(index)) => items.get(index).and_then(|v| resolve(v, rest)),
        (other, None) => resolve(other, rest),
        (_, Some(_)) => None,
    }
}

fn distribute(items: &[Value], segments: &[Segment]) -> Value {
    Value::Array(
        items
            .iter()
            .map(|item| resolve(item, segments).unwrap_or_default())
            .collect(),
    )
}

/// Whether any leaf of `value` is something other than `null`.
fn has_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Array(items) => items.iter().any(has_value),
        _ => true,
    }
}
