use crate::types::{ArrayKind, Segment, Shape};
use serde_json::{Map, Value};

/// Inserts a value into the JSON value at the specified path segments.
///
/// Missing intermediate objects and arrays are created as the segments demand, and array
/// values are spread over array segments. A `null` value is not written unless the final
/// segment is nullable (`?`). A boolean, number or string met where the path needs an
/// object or array is left as it is, and nothing is written below it.
///
/// # Arguments
///
/// * `destination` - The value to insert into, `null` if there is none yet.
/// * `segments` - The path segments representing where to insert.
/// * `value` - The value to insert.
///
/// # Returns
///
/// The new destination root.
pub fn insert_value(destination: Value, segments: &[Segment], value: &Value) -> Value {
    insert(destination, segments, value, false).unwrap_or_default()
}

/// Recursive step of `insert_value`. `None` tells an array parent to leave the slot alone,
/// which only happens for children that started blank and received nothing.
fn insert(
    destination: Value,
    segments: &[Segment],
    value: &Value,
    parent_is_array: bool,
) -> Option<Value> {
    let Some((segment, rest)) = segments.split_first() else {
        return Some(if value.is_null() { destination } else { value.clone() });
    };

    // Scalars hold neither keys nor elements, so there is nowhere to write into.
    if matches!(destination, Value::Bool(_) | Value::Number(_) | Value::String(_)) {
        return Some(destination);
    }

    let started_empty = is_blank(&destination);
    let destination = if started_empty {
        empty_shape(segment)
    } else {
        destination
    };

    if rest.is_empty() {
        if value.is_null() && !segment.nullable {
            if parent_is_array && started_empty {
                return None;
            }
            return Some(destination);
        }
        return Some(assign(destination, segment, value.clone()));
    }

    let next_is_array = rest.first().is_some_and(Segment::is_array);

    match segment.shape() {
        Shape::Key => {
            let mut map = into_object(destination);
            let child = map.remove(&segment.name).unwrap_or_default();
            if let Some(child) = insert(child, rest, value, false) {
                map.insert(segment.name.clone(), child);
            }
            Some(Value::Object(map))
        }
        Shape::ValueArray => {
            let mut map = into_object(destination);
            let mut items = into_array(map.remove(&segment.name).unwrap_or_default());
            let start = first_slot(segment, &items);

            match value {
                Value::Array(values) if !next_is_array => {
                    for (offset, item) in values.iter().enumerate() {
                        let child = take_slot(&mut items, start + offset);
                        let child = insert(child, rest, item, false).unwrap_or_default();
                        put_slot(&mut items, start + offset, child);
                    }
                }
                Value::Array(values) if is_nested(values) => {
                    for (offset, item) in values.iter().enumerate() {
                        let child = take_slot(&mut items, start + offset);
                        if let Some(child) = insert(child, rest, item, true) {
                            put_slot(&mut items, start + offset, child);
                        }
                    }
                }
                _ => {
                    let child = take_slot(&mut items, start);
                    let child = insert(child, rest, value, false).unwrap_or_default();
                    put_slot(&mut items, start, child);
                }
            }

            map.insert(segment.name.clone(), Value::Array(items));
            Some(Value::Object(map))
        }
        Shape::BareArray => {
            let mut items = into_array(destination);
            let start = first_slot(segment, &items);

            match value {
                Value::Array(values) => {
                    for (offset, item) in values.iter().enumerate() {
                        let child = take_slot(&mut items, start + offset);
                        if let Some(child) = insert(child, rest, item, true) {
                            put_slot(&mut items, start + offset, child);
                        }
                    }
                }
                _ => {
                    let child = take_slot(&mut items, start);
                    if let Some(child) = insert(child, rest, value, true) {
                        put_slot(&mut items, start, child);
                    }
                }
            }

            Some(Value::Array(items))
        }
    }
}

/// Writes `value` for the final segment of a path.
fn assign(destination: Value, segment: &Segment, value: Value) -> Value {
    match segment.shape() {
        Shape::Key => {
            let mut map = into_object(destination);
            map.insert(segment.name.clone(), value);
            Value::Object(map)
        }
        Shape::ValueArray => {
            let mut map = into_object(destination);
            let items = into_array(map.remove(&segment.name).unwrap_or_default());
            map.insert(
                segment.name.clone(),
                Value::Array(place(items, segment, value)),
            );
            Value::Object(map)
        }
        Shape::BareArray => Value::Array(place(into_array(destination), segment, value)),
    }
}

fn place(mut items: Vec<Value>, segment: &Segment, value: Value) -> Vec<Value> {
    match (segment.array, value) {
        (Some(ArrayKind::Append), value) => {
            items.push(value);
            items
        }
        // Writing a whole array through `[]` replaces the target rather than nesting it.
        (Some(ArrayKind::Plain), Value::Array(values)) => values,
        (_, value) => {
            put_slot(&mut items, segment.index().unwrap_or(0), value);
            items
        }
    }
}

fn first_slot(segment: &Segment, items: &[Value]) -> usize {
    if segment.is_append() {
        items.len()
    } else {
        segment.index().unwrap_or(0)
    }
}

fn take_slot(items: &mut [Value], index: usize) -> Value {
    items.get_mut(index).map(Value::take).unwrap_or_default()
}

fn put_slot(items: &mut Vec<Value>, index: usize, value: Value) {
    // Extend the array if necessary, leaving holes as null
    if index >= items.len() {
        items.resize(index + 1, Value::Null);
    }
    items[index] = value;
}

fn empty_shape(segment: &Segment) -> Value {
    match segment.shape() {
        Shape::Key => Value::Object(Map::new()),
        Shape::ValueArray => {
            let mut map = Map::new();
            map.insert(segment.name.clone(), Value::Array(Vec::new()));
            Value::Object(map)
        }
        Shape::BareArray => Value::Array(Vec::new()),
    }
}

fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn into_array(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

/// An array of arrays; `null` entries stand for missing inner arrays.
fn is_nested(values: &[Value]) -> bool {
    values.iter().any(Value::is_array) && values.iter().all(|v| v.is_array() || v.is_null())
}

/// Whether `value` is `null`, an empty object, or an array holding nothing but holes.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.iter().all(is_hole),
        _ => false,
    }
}

fn is_hole(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.iter().all(is_hole),
        _ => false,
    }
}
