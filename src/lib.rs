//! # pathwright
//!
//! A Rust library for declarative object-to-object mapping of JSON values.
//!
//! Given a source value and an ordered set of mapping rules, each made of one or more source
//! paths, a target path and an optional transform, pathwright builds a derived destination
//! value. Paths use a small dotted/bracketed syntax that can reach into nested objects, spread
//! over arrays and create whatever structure the destination needs.
//!
//! ## Path syntax
//!
//! - **Nested keys:** `foo.bar.baz`. Keys containing dots can be quoted: `"complex.key".value`.
//! - **Value arrays:** `items[]` is every element of the array at `items`, `items[2]` a single
//!   element. Indices above [`MAX_ARRAY_INDEX`] are rejected as malformed.
//! - **Bare arrays:** `[]` and `[2]` treat the current value itself as the array.
//! - **Append:** `items[]+` pushes a new element when writing.
//! - **Nullable:** a trailing `?` (`foo.bar?`) writes `null` where a missing value would
//!   otherwise be skipped.
//! - **Root:** the empty path `""` addresses the whole value.
//!
//! ## Examples
//!
//! ### Reading and writing single paths
//!
//! ```rust
//! use pathwright::{get_value, set_value};
//! use serde_json::{json, Value};
//!
//! let source = json!({"a": [{"b": 1}, {"b": 2}]});
//! assert_eq!(get_value(&source, "a[].b").unwrap(), Some(json!([1, 2])));
//! assert_eq!(get_value(&source, "a[].c").unwrap(), None);
//!
//! let destination = set_value(Value::Null, "x[].y", &json!([1, 2])).unwrap();
//! assert_eq!(destination, json!({"x": [{"y": 1}, {"y": 2}]}));
//! ```
//!
//! ### Mapping with rules
//!
//! ```rust
//! use pathwright::{Mapper, Transform};
//! use serde_json::json;
//!
//! let mut mapper = Mapper::new();
//! mapper
//!     .map("fieldName").to("field.name")
//!     .map_all(["apples.count", "oranges.count"]).to_with(
//!         "fruit.count",
//!         Transform::multi(|values| {
//!             let total: i64 = values.iter().flatten().filter_map(|v| v.as_i64()).sum();
//!             Some(json!(total))
//!         }),
//!     );
//!
//! let rules = mapper.build().unwrap();
//! let output = rules
//!     .execute(&json!({
//!         "fieldName": "name1",
//!         "apples": {"count": 3},
//!         "oranges": {"count": 4}
//!     }))
//!     .unwrap();
//!
//! assert_eq!(output, json!({"field": {"name": "name1"}, "fruit": {"count": 7}}));
//! ```
//!
//! ### Reshaping nested arrays
//!
//! When the source path crosses more arrays than the target path, the extra nesting is
//! flattened so the values line up with the target.
//!
//! ```rust
//! use pathwright::Mapper;
//! use serde_json::json;
//!
//! let source = json!({
//!     "one": [
//!         {"two": [{"value": "A"}, {"value": "B"}]},
//!         {"two": [{"value": "C"}, {"value": "D"}]}
//!     ]
//! });
//!
//! let mut mapper = Mapper::new();
//! mapper.map("one[].two[].value").to("one[].value");
//!
//! assert_eq!(
//!     mapper.execute(&source).unwrap(),
//!     json!({"one": [{"value": "A"}, {"value": "B"}, {"value": "C"}, {"value": "D"}]})
//! );
//! ```
//!
//! ## License
//!
//! See the [LICENSE](LICENSE) file for details.

mod flatten;
mod lookup;
mod manipulators;
mod mapper;
mod options;
mod parse;
mod pipeline;
mod rule;
mod types;

pub use flatten::{flatten_value, FlattenPlan};
pub use lookup::lookup_value;
pub use manipulators::insert_value;
pub use mapper::{Mapper, Mapping};
pub use options::ExecutionOptions;
pub use parse::{parse_path, MAX_ARRAY_INDEX};
pub use pipeline::{Condition, PipelineFn, PipelineStep};
pub use rule::{evaluate, MappingRule, RuleMode, RuleSet, Transform};
pub use types::{ArrayKind, MapperError, Path, Segment};

use serde_json::Value;

/// Reads the value at `path` in `source`.
///
/// ## Returns
///
/// `Ok(None)` when the value is missing, including when a read over arrays found nothing but
/// missing values; `Err(MapperError::MalformedPath)` if `path` cannot be parsed.
pub fn get_value(source: &Value, path: &str) -> Result<Option<Value>, MapperError> {
    Ok(Path::parse(path)?.get(source))
}

/// Writes `value` at `path` into `destination`, creating objects and arrays as needed.
///
/// `destination` may be `Value::Null`. A `null` value is only written through a nullable
/// (`?`) final segment.
///
/// ## Returns
///
/// The new destination root, or `Err(MapperError::MalformedPath)` if `path` cannot be parsed.
pub fn set_value(destination: Value, path: &str, value: &Value) -> Result<Value, MapperError> {
    Ok(Path::parse(path)?.set(destination, value))
}
