//! Ignore rules for the diff engine.

use crate::node::{Path, PathPattern};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which common keys the engine skips
///
/// Ignore rules only suppress comparison of keys present on both sides;
/// a key missing from either side is always reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffOptions {
    /// Key names skipped at any depth
    #[serde(default)]
    pub ignore_keys: BTreeSet<String>,

    /// Full paths skipped, with `*` wildcards
    #[serde(default)]
    pub ignore_paths: Vec<PathPattern>,
}

impl DiffOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ignore_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ignore_keys: keys.into_iter().map(Into::into).collect(),
            ignore_paths: Vec::new(),
        }
    }

    pub fn ignore_key(mut self, key: impl Into<String>) -> Self {
        self.ignore_keys.insert(key.into());
        self
    }

    pub fn ignore_path(mut self, pattern: PathPattern) -> Self {
        self.ignore_paths.push(pattern);
        self
    }

    /// Add every rule of `other`
    pub fn merge(mut self, other: &DiffOptions) -> Self {
        self.ignore_keys.extend(other.ignore_keys.iter().cloned());
        self.ignore_paths.extend(other.ignore_paths.iter().cloned());
        self
    }

    /// Whether the common key `key` at `path` (which ends in `key`) is skipped
    pub fn is_ignored(&self, key: &str, path: &Path) -> bool {
        self.ignore_keys.contains(key) || self.ignore_paths.iter().any(|p| p.matches(path))
    }
}
