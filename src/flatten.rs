use serde_json::Value;

use crate::options::ExecutionOptions;
use crate::types::Path;

/// How values read through one path are reshaped before being written through another.
///
/// When the source path crosses more arrays than the target path, the extra levels of
/// nesting in the read value are collapsed so the shapes line up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlattenPlan {
    pub source_depth: usize,
    pub target_depth: usize,
    pub should_flatten: bool,
    pub inverted: bool,
}

impl FlattenPlan {
    pub fn compute(source: &Path, target: &Path, options: &ExecutionOptions) -> Self {
        let source_depth = source.array_depth();
        let target_depth = target.array_depth();
        Self {
            source_depth,
            target_depth,
            should_flatten: options.flatten && source_depth > target_depth,
            inverted: options.flatten_inverted,
        }
    }

    /// The nesting level at which values are fully flattened; `None` when the target has
    /// no array segment to line up with.
    pub fn seek_depth(&self) -> Option<usize> {
        self.target_depth.checked_sub(1)
    }

    pub fn apply(&self, value: Option<Value>) -> Option<Value> {
        value.map(|v| flatten_value(v, self))
    }
}

/// Collapses the extra array nesting of `value` according to `plan`.
///
/// Normal mode descends `seek_depth` levels and flattens everything below that point.
/// Inverted mode merges the outermost `source_depth - target_depth` levels instead,
/// keeping the innermost grouping intact.
pub fn flatten_value(value: Value, plan: &FlattenPlan) -> Value {
    if !plan.should_flatten {
        return value;
    }
    if plan.inverted {
        return merge_levels(value, plan.source_depth - plan.target_depth);
    }
    match plan.seek_depth() {
        Some(depth) => flatten_at(value, depth),
        None => value,
    }
}

fn flatten_at(value: Value, depth: usize) -> Value {
    match value {
        Value::Array(items) if !items.is_empty() => {
            if depth == 0 {
                Value::Array(flatten_deep(items))
            } else {
                Value::Array(
                    items
                        .into_iter()
                        .map(|item| flatten_at(item, depth - 1))
                        .collect(),
                )
            }
        }
        other => other,
    }
}

fn flatten_deep(items: Vec<Value>) -> Vec<Value> {
    let mut flat = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Array(inner) => flat.extend(flatten_deep(inner)),
            other => flat.push(other),
        }
    }
    flat
}

fn merge_levels(mut value: Value, levels: usize) -> Value {
    for _ in 0..levels {
        value = match value {
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .flat_map(|item| match item {
                        Value::Array(inner) => inner,
                        other => vec![other],
                    })
                    .collect(),
            ),
            other => return other,
        };
    }
    value
}
