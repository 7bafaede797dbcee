//! Locations inside a configuration tree.
//!
//! A [`Path`] is only used for reporting. [`PathPattern`] adds `*` wildcard
//! segments so callers can scope ignore rules to a part of the tree.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator used when rendering and parsing paths
pub const PATH_SEPARATOR: &str = "->";

/// One step from a node to its child
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Mapping key
    Key(String),

    /// Sequence index
    Index(usize),
}

impl PathSegment {
    /// Key name, if this segment is a mapping key
    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathSegment::Key(key) => Some(key),
            PathSegment::Index(_) => None,
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Ordered segments from the root of both compared trees
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<PathSegment>);

impl Path {
    /// The empty path
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from a list of mapping keys
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keys.into_iter().map(|k| PathSegment::Key(k.into())).collect())
    }

    /// New path extended by a mapping key
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.into()));
        Self(segments)
    }

    /// New path extended by a sequence index
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Last segment, `None` at the root
    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }
}

impl FromIterator<PathSegment> for Path {
    fn from_iter<T: IntoIterator<Item = PathSegment>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }

        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{}", key)?,
                PathSegment::Key(key) => write!(f, "{}{}", PATH_SEPARATOR, key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// Segment of a [`PathPattern`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegment {
    /// `*`, matches any single segment
    Wildcard,

    /// Matches a key with this name, or an index with this decimal form
    Literal(String),
}

impl PatternSegment {
    fn matches(&self, segment: &PathSegment) -> bool {
        match (self, segment) {
            (PatternSegment::Wildcard, _) => true,
            (PatternSegment::Literal(expected), PathSegment::Key(key)) => expected == key,
            (PatternSegment::Literal(expected), PathSegment::Index(index)) => {
                expected.parse::<usize>().map(|e| e == *index).unwrap_or(false)
            }
        }
    }
}

/// Path with optional wildcards, written as `paths->*->get->uri`
///
/// A pattern matches a path of exactly the same length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathPattern(Vec<PatternSegment>);

impl PathPattern {
    pub fn matches(&self, path: &Path) -> bool {
        self.0.len() == path.len()
            && self
                .0
                .iter()
                .zip(path.segments())
                .all(|(pattern, segment)| pattern.matches(segment))
    }

    pub fn segments(&self) -> &[PatternSegment] {
        &self.0
    }
}

impl FromStr for PathPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("path pattern is empty".to_string());
        }

        let mut segments = Vec::new();
        for raw in trimmed.split(PATH_SEPARATOR) {
            let raw = raw.trim();
            if raw.is_empty() {
                return Err(format!("path pattern '{}' has an empty segment", s));
            }
            segments.push(if raw == "*" {
                PatternSegment::Wildcard
            } else {
                PatternSegment::Literal(raw.to_string())
            });
        }
        Ok(Self(segments))
    }
}

impl TryFrom<String> for PathPattern {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PathPattern> for String {
    fn from(pattern: PathPattern) -> Self {
        pattern.to_string()
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<&str> = self
            .0
            .iter()
            .map(|segment| match segment {
                PatternSegment::Wildcard => "*",
                PatternSegment::Literal(text) => text.as_str(),
            })
            .collect();
        write!(f, "{}", rendered.join(PATH_SEPARATOR))
    }
}
