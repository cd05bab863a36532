use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::types::Path;

/// A custom pipeline step: receives the whole source and the value read so far.
pub type PipelineFn = Arc<dyn Fn(&Value, Option<Value>) -> Option<Value> + Send + Sync>;

/// A test applied to the value found at a path in the source.
#[derive(Clone)]
pub enum Condition {
    Equals(Value),
    Matches(Arc<dyn Fn(&Value) -> bool + Send + Sync>),
}

impl Condition {
    pub fn matching<F>(predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Condition::Matches(Arc::new(predicate))
    }

    fn holds(&self, found: Option<&Value>) -> bool {
        match (self, found) {
            (Condition::Equals(expected), Some(found)) => found == expected,
            (Condition::Matches(predicate), Some(found)) => predicate(found),
            (_, None) => false,
        }
    }
}

impl From<Value> for Condition {
    fn from(value: Value) -> Self {
        Condition::Equals(value)
    }
}

impl From<&str> for Condition {
    fn from(value: &str) -> Self {
        Condition::Equals(Value::String(value.to_string()))
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Equals(value) => f.debug_tuple("Equals").field(value).finish(),
            Condition::Matches(_) => f.write_str("Matches(..)"),
        }
    }
}

/// One pre-processing step run on a read value before flattening and the main transform.
#[derive(Clone)]
pub enum PipelineStep {
    /// Keep the value only when the condition holds for `path` in the source.
    AcceptIf { path: Path, condition: Condition },
    /// Drop the value when the condition holds for `path` in the source.
    RejectIf { path: Path, condition: Condition },
    /// Keep only these keys of an object (or of each object in an array).
    Keep(Vec<String>),
    /// Remove these keys from an object (or from each object in an array).
    Removing(Vec<String>),
    /// Drop falsy elements from an array.
    Compact,
    First,
    Last,
    /// Stable sort of an array, by the elements themselves or by the value at `key`.
    Sort { key: Option<Path>, descending: bool },
    Custom(PipelineFn),
}

impl PipelineStep {
    pub fn apply(&self, source: &Value, value: Option<Value>) -> Option<Value> {
        match self {
            PipelineStep::AcceptIf { path, condition } => {
                value.filter(|_| condition.holds(path.get(source).as_ref()))
            }
            PipelineStep::RejectIf { path, condition } => {
                value.filter(|_| !condition.holds(path.get(source).as_ref()))
            }
            PipelineStep::Keep(keys) => value.map(|v| {
                each_object(v, &|map: &mut Map<String, Value>| {
                    map.retain(|k, _| keys.contains(k));
                })
            }),
            PipelineStep::Removing(keys) => value.map(|v| {
                each_object(v, &|map: &mut Map<String, Value>| {
                    map.retain(|k, _| !keys.contains(k));
                })
            }),
            PipelineStep::Compact => value.map(|v| match v {
                Value::Array(items) => Value::Array(items.into_iter().filter(is_truthy).collect()),
                other => other,
            }),
            PipelineStep::First => value.and_then(|v| match v {
                Value::Array(items) => items.into_iter().next(),
                other => Some(other),
            }),
            PipelineStep::Last => value.and_then(|v| match v {
                Value::Array(items) => items.into_iter().last(),
                other => Some(other),
            }),
            PipelineStep::Sort { key, descending } => value.map(|v| match v {
                Value::Array(mut items) => {
                    items.sort_by(|a, b| {
                        let ordering = match key {
                            Some(key) => compare_keys(key.get(a), key.get(b)),
                            None => compare_values(a, b),
                        };
                        if *descending {
                            ordering.reverse()
                        } else {
                            ordering
                        }
                    });
                    Value::Array(items)
                }
                other => other,
            }),
            PipelineStep::Custom(step) => step(source, value),
        }
    }
}

impl fmt::Debug for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStep::AcceptIf { path, condition } => f
                .debug_struct("AcceptIf")
                .field("path", path)
                .field("condition", condition)
                .finish(),
            PipelineStep::RejectIf { path, condition } => f
                .debug_struct("RejectIf")
                .field("path", path)
                .field("condition", condition)
                .finish(),
            PipelineStep::Keep(keys) => f.debug_tuple("Keep").field(keys).finish(),
            PipelineStep::Removing(keys) => f.debug_tuple("Removing").field(keys).finish(),
            PipelineStep::Compact => f.write_str("Compact"),
            PipelineStep::First => f.write_str("First"),
            PipelineStep::Last => f.write_str("Last"),
            PipelineStep::Sort { key, descending } => f
                .debug_struct("Sort")
                .field("key", key)
                .field("descending", descending)
                .finish(),
            PipelineStep::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

fn each_object(value: Value, edit: &dyn Fn(&mut Map<String, Value>)) -> Value {
    match value {
        Value::Object(mut map) => {
            edit(&mut map);
            Value::Object(map)
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    Value::Object(mut map) => {
                        edit(&mut map);
                        Value::Object(map)
                    }
                    other => other,
                })
                .collect(),
        ),
        other => other,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn compare_keys(a: Option<Value>, b: Option<Value>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => compare_values(&a, &b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Orders null < bool < number < string < array < object; numbers numerically, strings
/// lexicographically. Arrays and objects of the same kind compare equal.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compare_values_orders_across_types() {
        let mut values = vec![
            json!("b"),
            json!(10),
            json!(null),
            json!(2.5),
            json!("a"),
            json!(true),
        ];
        values.sort_by(compare_values);
        assert_eq!(
            values,
            vec![
                json!(null),
                json!(true),
                json!(2.5),
                json!(10),
                json!("a"),
                json!("b")
            ]
        );
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!(-1)));
    }
}
