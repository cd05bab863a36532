use std::sync::Arc;

use serde_json::Value;

use crate::options::ExecutionOptions;
use crate::pipeline::{Condition, PipelineStep};
use crate::rule::{MappingRule, RuleMode, RuleSet, Transform};
use crate::types::{MapperError, Path};

/// Collects mapping rules and turns them into a [`RuleSet`].
///
/// Rules are registered with [`Mapper::map`] and [`Mapper::map_all`] and refined through
/// the returned [`Mapping`]. Paths are parsed as they are registered; any problem with a
/// rule is kept with it and reported by [`Mapper::build`].
///
/// ```rust
/// use pathwright::Mapper;
/// use serde_json::json;
///
/// let mut mapper = Mapper::new();
/// mapper
///     .map("fieldName").to("field.name")
///     .map("missing").or("fallback").to("field.other");
///
/// let output = mapper
///     .execute(&json!({"fieldName": "name1", "fallback": 2}))
///     .unwrap();
/// assert_eq!(output, json!({"field": {"name": "name1", "other": 2}}));
/// ```
#[derive(Debug, Default)]
pub struct Mapper {
    options: ExecutionOptions,
    rules: Vec<RuleDraft>,
}

#[derive(Debug)]
struct RuleDraft {
    rule: MappingRule,
    error: Option<MapperError>,
}

impl RuleDraft {
    fn fail(&mut self, error: MapperError) {
        // The first problem is the one reported.
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}

impl Mapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mapper whose rules start from `options` instead of the defaults.
    pub fn with_options(options: ExecutionOptions) -> Self {
        Self {
            options,
            rules: Vec::new(),
        }
    }

    /// Registers a rule reading a single source path.
    pub fn map(&mut self, source: &str) -> Mapping<'_> {
        self.register(RuleMode::Single, &[source])
    }

    /// Registers a rule reading several source paths, all handed to its transform.
    pub fn map_all<I, S>(&mut self, sources: I) -> Mapping<'_>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sources: Vec<S> = sources.into_iter().collect();
        let sources: Vec<&str> = sources.iter().map(|s| s.as_ref()).collect();
        self.register(RuleMode::Multi, &sources)
    }

    fn register(&mut self, mode: RuleMode, sources: &[&str]) -> Mapping<'_> {
        let mut draft = RuleDraft {
            rule: MappingRule {
                mode,
                sources: Vec::with_capacity(sources.len()),
                target: None,
                transform: None,
                pipeline: Vec::new(),
                options: self.options.clone(),
            },
            error: None,
        };

        if sources.is_empty() {
            draft.fail(MapperError::InvalidArgument(
                "the source field name cannot be empty".to_string(),
            ));
        }
        for source in sources {
            match parse_source(source) {
                Ok(path) => draft.rule.sources.push(path),
                Err(err) => draft.fail(err),
            }
        }

        self.rules.push(draft);
        let index = self.rules.len() - 1;
        Mapping {
            mapper: self,
            index,
        }
    }

    /// Validates the registered rules and freezes them into a `RuleSet`.
    ///
    /// ## Returns
    ///
    /// The rule set, or the first problem recorded while the rules were registered.
    pub fn build(&self) -> Result<RuleSet, MapperError> {
        let rules = self
            .rules
            .iter()
            .map(|draft| match &draft.error {
                Some(err) => Err(err.clone()),
                None => Ok(draft.rule.clone()),
            })
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(rules = rules.len(), "built mapping rule set");
        Ok(RuleSet::new(rules))
    }

    /// Builds the rules and maps `source` into a new object.
    pub fn execute(&self, source: &Value) -> Result<Value, MapperError> {
        self.build()?.execute(source)
    }

    /// Builds the rules and maps `source` into `destination`.
    pub fn execute_into(&self, source: &Value, destination: Value) -> Result<Value, MapperError> {
        self.build()?.execute_into(source, destination)
    }

    /// Builds the rules and maps every element of the `sources` array.
    pub fn each(&self, sources: &Value) -> Result<Value, MapperError> {
        self.build()?.each(sources)
    }
}

fn parse_source(source: &str) -> Result<Path, MapperError> {
    if source.is_empty() {
        return Err(MapperError::InvalidArgument(
            "the source field name cannot be empty".to_string(),
        ));
    }
    Path::parse(source)
}

/// The rule most recently registered on a [`Mapper`], open for refinement.
///
/// Finish it with [`Mapping::to`] or [`Mapping::to_with`], or move on with
/// [`Mapping::map`]; a rule without a target writes back to its source path.
#[derive(Debug)]
pub struct Mapping<'a> {
    mapper: &'a mut Mapper,
    index: usize,
}

impl<'a> Mapping<'a> {
    fn draft(&mut self) -> &mut RuleDraft {
        &mut self.mapper.rules[self.index]
    }

    fn rule(&mut self) -> &mut MappingRule {
        &mut self.draft().rule
    }

    /// Adds a fallback source path, tried when the earlier ones yield nothing.
    pub fn or(mut self, source: &str) -> Self {
        if self.rule().mode == RuleMode::Multi {
            self.draft().fail(MapperError::Configuration(
                "the or method can only be used with single selections".to_string(),
            ));
            return self;
        }
        match parse_source(source) {
            Ok(path) => {
                let rule = self.rule();
                rule.mode = RuleMode::OrFallback;
                rule.sources.push(path);
            }
            Err(err) => self.draft().fail(err),
        }
        self
    }

    /// Write and transform even when no source value is found.
    pub fn always(mut self) -> Self {
        let options = &mut self.rule().options;
        options.always_set = true;
        options.always_transform = true;
        self
    }

    /// Write and transform only when a source value is found.
    pub fn existing(mut self) -> Self {
        let options = &mut self.rule().options;
        options.always_set = false;
        options.always_transform = false;
        self
    }

    pub fn flatten(mut self, flatten: bool) -> Self {
        self.rule().options.flatten = flatten;
        self
    }

    pub fn flatten_inverted(mut self, inverted: bool) -> Self {
        self.rule().options.flatten_inverted = inverted;
        self
    }

    /// Replaces this rule's options wholesale.
    pub fn with_options(mut self, options: ExecutionOptions) -> Self {
        self.rule().options = options;
        self
    }

    /// Sets the transform used when the main transform yields no value.
    pub fn on_failure(mut self, transform: Transform) -> Self {
        self.rule().options.failure_transform = Some(transform);
        self
    }

    pub fn accept_if(self, key: &str, condition: impl Into<Condition>) -> Self {
        self.conditional(key, condition.into(), true)
    }

    pub fn reject_if(self, key: &str, condition: impl Into<Condition>) -> Self {
        self.conditional(key, condition.into(), false)
    }

    fn conditional(mut self, key: &str, condition: Condition, accept: bool) -> Self {
        if key.is_empty() {
            self.draft().fail(MapperError::InvalidArgument(
                "the key must be a non-empty path".to_string(),
            ));
            return self;
        }
        if matches!(condition, Condition::Equals(Value::Null)) {
            self.draft().fail(MapperError::InvalidArgument(
                "the value cannot be null".to_string(),
            ));
            return self;
        }
        match Path::parse(key) {
            Ok(path) if accept => self.step(PipelineStep::AcceptIf { path, condition }),
            Ok(path) => self.step(PipelineStep::RejectIf { path, condition }),
            Err(err) => {
                self.draft().fail(err);
                self
            }
        }
    }

    pub fn keep<I, S>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.step(PipelineStep::Keep(keys.into_iter().map(Into::into).collect()))
    }

    pub fn removing<I, S>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.step(PipelineStep::Removing(keys.into_iter().map(Into::into).collect()))
    }

    pub fn compact(self) -> Self {
        self.step(PipelineStep::Compact)
    }

    pub fn first(self) -> Self {
        self.step(PipelineStep::First)
    }

    pub fn last(self) -> Self {
        self.step(PipelineStep::Last)
    }

    pub fn sort(self) -> Self {
        self.step(PipelineStep::Sort {
            key: None,
            descending: false,
        })
    }

    /// Sorts array elements by the value found at `key` inside each element.
    pub fn sort_by(self, key: &str) -> Self {
        self.keyed_sort(key, false)
    }

    pub fn reverse_sort(self) -> Self {
        self.step(PipelineStep::Sort {
            key: None,
            descending: true,
        })
    }

    pub fn reverse_sort_by(self, key: &str) -> Self {
        self.keyed_sort(key, true)
    }

    fn keyed_sort(mut self, key: &str, descending: bool) -> Self {
        match Path::parse(key) {
            Ok(path) => self.step(PipelineStep::Sort {
                key: Some(path),
                descending,
            }),
            Err(err) => {
                self.draft().fail(err);
                self
            }
        }
    }

    /// Adds a custom pipeline step, called with the whole source and the current value.
    pub fn pipe<F>(self, step: F) -> Self
    where
        F: Fn(&Value, Option<Value>) -> Option<Value> + Send + Sync + 'static,
    {
        self.step(PipelineStep::Custom(Arc::new(step)))
    }

    fn step(mut self, step: PipelineStep) -> Self {
        if self.rule().mode == RuleMode::Multi {
            self.draft().fail(MapperError::Configuration(
                "multiple selections do not support pipeline transformations".to_string(),
            ));
            return self;
        }
        self.rule().pipeline.push(step);
        self
    }

    /// Sets the target path and finishes the rule.
    pub fn to(mut self, target: &str) -> &'a mut Mapper {
        self.set_target(target);
        self.mapper
    }

    /// Sets the target path and the transform, and finishes the rule.
    pub fn to_with(mut self, target: &str, transform: Transform) -> &'a mut Mapper {
        self.set_target(target);
        self.rule().transform = Some(transform);
        self.mapper
    }

    fn set_target(&mut self, target: &str) {
        if target.is_empty() {
            self.draft().fail(MapperError::InvalidArgument(
                "the target field name cannot be empty".to_string(),
            ));
            return;
        }
        match Path::parse(target) {
            Ok(path) => self.rule().target = Some(path),
            Err(err) => self.draft().fail(err),
        }
    }

    /// Leaves this rule writing back to its source path and registers the next one.
    pub fn map(self, source: &str) -> Mapping<'a> {
        let Mapping { mapper, .. } = self;
        mapper.map(source)
    }

    pub fn map_all<I, S>(self, sources: I) -> Mapping<'a>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let Mapping { mapper, .. } = self;
        mapper.map_all(sources)
    }

    pub fn execute(self, source: &Value) -> Result<Value, MapperError> {
        self.mapper.execute(source)
    }

    pub fn each(self, sources: &Value) -> Result<Value, MapperError> {
        self.mapper.each(sources)
    }
}
