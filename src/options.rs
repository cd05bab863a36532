use serde::{Deserialize, Serialize};

use crate::rule::Transform;

/// Defaults applied to every mapping rule, overridable per rule.
///
/// Can be loaded from any serde format; `failure_transform` is code and is never
/// (de)serialized.
///
/// ```rust
/// use pathwright::ExecutionOptions;
///
/// let options: ExecutionOptions = serde_json::from_str(r#"{"always_set": true}"#).unwrap();
/// assert!(options.always_set);
/// assert!(!options.always_transform);
/// assert!(options.flatten);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionOptions {
    /// Write to the target even when no value was found.
    pub always_set: bool,
    /// Call the transform even when no value was found.
    pub always_transform: bool,
    /// Collapse extra array nesting when the source path is deeper than the target path.
    pub flatten: bool,
    /// Collapse the outermost levels instead of the innermost ones.
    pub flatten_inverted: bool,
    /// Called with the rule's inputs when the transform leaves no value.
    #[serde(skip)]
    pub failure_transform: Option<Transform>,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            always_set: false,
            always_transform: false,
            flatten: true,
            flatten_inverted: false,
            failure_transform: None,
        }
    }
}
