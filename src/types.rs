use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::lookup::lookup_value;
use crate::manipulators::insert_value;
use crate::parse::parse_path;

/// A parsed path expression such as `a.b[].c[2].d?`.
///
/// Paths are parsed once and can then be used to read from and write to any number of
/// values. A path with no segments (parsed from `""`) addresses the root value itself.
///
/// ## Example
///
/// ```rust
/// use pathwright::{ArrayKind, Path};
///
/// let path: Path = "items[].name?".parse().unwrap();
/// assert_eq!(path.segments().len(), 2);
/// assert_eq!(path.segments()[0].array, Some(ArrayKind::Plain));
/// assert!(path.segments()[1].nullable);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Path {
    raw: String,
    segments: Vec<Segment>,
}

impl Path {
    pub(crate) fn new(raw: &str, segments: Vec<Segment>) -> Self {
        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    /// The empty path, addressing the whole value.
    pub fn root() -> Self {
        Self::new("", Vec::new())
    }

    /// Parses a path expression.
    ///
    /// ## Returns
    ///
    /// Returns the parsed `Path`, or `MapperError::MalformedPath` if the expression has
    /// unbalanced brackets, a non-numeric index or an empty segment.
    pub fn parse(input: &str) -> Result<Self, MapperError> {
        parse_path(input)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of array-annotated segments (`[]`, `[n]` and `[]+`) in the path.
    pub fn array_depth(&self) -> usize {
        self.segments.iter().filter(|s| s.is_array()).count()
    }

    /// Whether the path starts with a bare array segment, i.e. the value it addresses
    /// lives directly in a root array.
    pub fn is_array_root(&self) -> bool {
        self.segments
            .first()
            .is_some_and(|s| s.shape() == Shape::BareArray)
    }

    /// Reads the value at this path. See [`crate::get_value`].
    pub fn get(&self, source: &Value) -> Option<Value> {
        lookup_value(source, &self.segments)
    }

    /// Writes `value` at this path, returning the new destination root. See [`crate::set_value`].
    pub fn set(&self, destination: Value, value: &Value) -> Value {
        insert_value(destination, &self.segments, value)
    }
}

impl FromStr for Path {
    type Err = MapperError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        parse_path(input)
    }
}

impl TryFrom<String> for Path {
    type Error = MapperError;

    fn try_from(input: String) -> Result<Self, Self::Error> {
        parse_path(&input)
    }
}

impl From<Path> for String {
    fn from(path: Path) -> Self {
        path.raw
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// One step of a [`Path`]: a key, an optional array annotation and the nullable marker.
///
/// An empty `name` is only produced together with an array annotation, and means the
/// current value is itself the array (`[]`, `[2]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub name: String,
    pub array: Option<ArrayKind>,
    pub nullable: bool,
}

impl Segment {
    /// A plain object key with no array annotation and no nullable marker.
    pub fn key(name: &str) -> Self {
        Self {
            name: name.to_string(),
            array: None,
            nullable: false,
        }
    }

    pub fn is_array(&self) -> bool {
        self.array.is_some()
    }

    pub fn is_append(&self) -> bool {
        self.array == Some(ArrayKind::Append)
    }

    /// The explicit index of an `[n]` annotation.
    pub fn index(&self) -> Option<usize> {
        match self.array {
            Some(ArrayKind::Indexed(index)) => Some(index),
            _ => None,
        }
    }

    pub(crate) fn shape(&self) -> Shape {
        match (&self.array, self.name.is_empty()) {
            (None, _) => Shape::Key,
            (Some(_), false) => Shape::ValueArray,
            (Some(_), true) => Shape::BareArray,
        }
    }
}

/// The array annotation carried by a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrayKind {
    /// `[]`: every element, or the whole array when written to.
    Plain,
    /// `[n]`: a single element.
    Indexed(usize),
    /// `[]+`: a new element pushed onto the end.
    Append,
}

/// How a segment addresses the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    /// `name`
    Key,
    /// `name[]`, `name[n]`, `name[]+`
    ValueArray,
    /// `[]`, `[n]`, `[]+`
    BareArray,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapperError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Malformed path '{path}': {reason}")]
    MalformedPath { path: String, reason: String },
}
