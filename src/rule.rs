use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::flatten::FlattenPlan;
use crate::options::ExecutionOptions;
use crate::pipeline::PipelineStep;
use crate::types::{MapperError, Path};

/// A rule's transform function, called with one argument per source path.
///
/// Absent source values are passed as `None`; returning `None` means the rule produced
/// no value.
#[derive(Clone)]
pub struct Transform(Arc<dyn Fn(&[Option<Value>]) -> Option<Value> + Send + Sync>);

impl Transform {
    /// A transform taking the single value selected by a rule.
    ///
    /// ```rust
    /// use pathwright::Transform;
    /// use serde_json::{json, Value};
    ///
    /// let upper = Transform::new(|v: Option<Value>| {
    ///     v.and_then(|v| v.as_str().map(|s| Value::from(s.to_uppercase())))
    /// });
    /// assert_eq!(upper.call(&[Some(json!("abc"))]), Some(json!("ABC")));
    /// ```
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Option<Value>) -> Option<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(move |args: &[Option<Value>]| {
            f(args.first().cloned().flatten())
        }))
    }

    /// A transform receiving every selected value in source order.
    pub fn multi<F>(f: F) -> Self
    where
        F: Fn(&[Option<Value>]) -> Option<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, args: &[Option<Value>]) -> Option<Value> {
        (self.0)(args)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transform(..)")
    }
}

/// How a rule combines its source paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleMode {
    /// One source path.
    Single,
    /// Every source path is read and passed to the transform together.
    Multi,
    /// The first source path that yields a non-null value wins.
    OrFallback,
}

/// A compiled mapping rule. Built with [`crate::Mapper`].
#[derive(Debug, Clone)]
pub struct MappingRule {
    pub(crate) mode: RuleMode,
    pub(crate) sources: Vec<Path>,
    pub(crate) target: Option<Path>,
    pub(crate) transform: Option<Transform>,
    pub(crate) pipeline: Vec<PipelineStep>,
    pub(crate) options: ExecutionOptions,
}

impl MappingRule {
    /// How the source values are combined before the transform runs.
    pub fn mode(&self) -> RuleMode {
        self.mode
    }

    /// The source paths in registration order.
    pub fn sources(&self) -> &[Path] {
        &self.sources
    }

    /// The target path; single and or-fallback rules without one write back to their
    /// first source path.
    pub fn target(&self) -> Result<&Path, MapperError> {
        match (&self.target, self.mode) {
            (Some(target), _) => Ok(target),
            (None, RuleMode::Multi) => Err(MapperError::InvalidArgument(
                "multiple selections require a target".to_string(),
            )),
            (None, _) => self.sources.first().ok_or_else(|| {
                MapperError::InvalidArgument("a mapping rule needs a source".to_string())
            }),
        }
    }

    /// The options in effect for this rule, with any per-rule overrides applied.
    pub fn options(&self) -> &ExecutionOptions {
        &self.options
    }

    /// Runs this rule against `source`, writing into `destination`.
    pub fn apply(&self, source: &Value, destination: Value) -> Result<Value, MapperError> {
        let inputs = match self.mode {
            RuleMode::Multi => {
                if self.transform.is_none() {
                    return Err(MapperError::Configuration(
                        "multiple selections must map to a transform, no transform provided"
                            .to_string(),
                    ));
                }
                let target = self.target()?;
                self.sources
                    .iter()
                    .map(|path| {
                        FlattenPlan::compute(path, target, &self.options).apply(path.get(source))
                    })
                    .collect()
            }
            RuleMode::Single | RuleMode::OrFallback => vec![self.select(source)?],
        };
        let target = self.target()?;

        let found = inputs.iter().any(Option::is_some);
        let mut value = match &self.transform {
            Some(transform) if found || self.options.always_transform => transform.call(&inputs),
            Some(_) => None,
            None => inputs.first().cloned().flatten(),
        };

        if value.is_none() {
            if let Some(failure) = &self.options.failure_transform {
                value = failure.call(&inputs);
            }
        }

        if value.is_some() || self.options.always_set {
            return Ok(target.set(destination, value.as_ref().unwrap_or(&Value::Null)));
        }

        tracing::trace!(path = %target, "no value to write, skipping");
        if target.is_array_root() && destination.as_object().is_some_and(Map::is_empty) {
            return Ok(Value::Array(Vec::new()));
        }
        Ok(destination)
    }

    /// Reads the value of a single or or-fallback rule, then runs the pipeline and
    /// flattening on it.
    fn select(&self, source: &Value) -> Result<Option<Value>, MapperError> {
        let target = self.target()?;
        let (path, value) = match self.mode {
            RuleMode::OrFallback => self
                .sources
                .iter()
                .find_map(|path| {
                    path.get(source)
                        .filter(|v| !v.is_null())
                        .map(|v| (path, Some(v)))
                })
                .unwrap_or((target, None)),
            _ => match self.sources.first() {
                Some(path) => (path, path.get(source)),
                None => (target, None),
            },
        };

        let value = self
            .pipeline
            .iter()
            .fold(value, |value, step| step.apply(source, value));

        Ok(FlattenPlan::compute(path, target, &self.options).apply(value))
    }
}

/// An immutable, ordered list of mapping rules ready to run.
///
/// A `RuleSet` holds no per-call state, so one set can serve concurrent `execute` calls.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<MappingRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<MappingRule>) -> Self {
        Self { rules }
    }

    /// The rules in the order they were registered and will be evaluated.
    pub fn rules(&self) -> &[MappingRule] {
        &self.rules
    }

    /// Maps `source` into a fresh object.
    pub fn execute(&self, source: &Value) -> Result<Value, MapperError> {
        evaluate(&self.rules, source, None)
    }

    /// Maps `source` into an existing destination value.
    pub fn execute_into(&self, source: &Value, destination: Value) -> Result<Value, MapperError> {
        evaluate(&self.rules, source, Some(destination))
    }

    /// Maps every element of an array of sources.
    ///
    /// ## Returns
    ///
    /// An array with one result per source, `null` for a `null` or empty input, or
    /// `MapperError::InvalidArgument` if `sources` is not an array.
    pub fn each(&self, sources: &Value) -> Result<Value, MapperError> {
        match sources {
            Value::Null => Ok(Value::Null),
            Value::Array(items) if items.is_empty() => Ok(Value::Null),
            Value::Array(items) => items
                .iter()
                .map(|item| self.execute(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            _ => Err(MapperError::InvalidArgument(
                "the sources parameter must be an array".to_string(),
            )),
        }
    }
}

/// Applies `rules` in order to `source`, accumulating into `destination` (a new object
/// when absent or `null`).
///
/// The first failing rule aborts the whole evaluation.
pub fn evaluate(
    rules: &[MappingRule],
    source: &Value,
    destination: Option<Value>,
) -> Result<Value, MapperError> {
    if source.is_null() {
        return Err(MapperError::InvalidArgument(
            "a source object is required".to_string(),
        ));
    }

    let mut destination = match destination {
        Some(Value::Null) | None => Value::Object(Map::new()),
        Some(destination) => destination,
    };

    tracing::debug!(rules = rules.len(), "executing mapping rules");
    for (index, rule) in rules.iter().enumerate() {
        tracing::trace!(rule = index, mode = ?rule.mode, "applying mapping rule");
        destination = rule.apply(source, destination)?;
    }

    Ok(destination)
}
