//! Path labels
//!
//! A path label addresses one route through the tree: the 1-based branch id
//! chosen at each level, in level order. Internally it is a plain sequence of
//! ids; the underscore-joined text form (`"2_1_3"`) exists only for callers
//! that exchange labels as strings.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between segments of the textual form
pub const SEGMENT_SEPARATOR: char = '_';

/// Ordered sequence of 1-based branch ids, one per level
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathLabel(Vec<u32>);

impl PathLabel {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn segments(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Id chosen at the deepest level of this path
    pub fn last(&self) -> Option<u32> {
        self.0.last().copied()
    }

    pub fn push(&mut self, relative_id: u32) {
        self.0.push(relative_id);
    }

    /// Path truncated to its first `n` levels
    pub fn prefix(&self, n: usize) -> PathLabel {
        PathLabel(self.0[..n.min(self.0.len())].to_vec())
    }
}

impl From<Vec<u32>> for PathLabel {
    fn from(segments: Vec<u32>) -> Self {
        Self(segments)
    }
}

impl FromStr for PathLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::MalformedLabel("empty label".to_string()));
        }

        s.split(SEGMENT_SEPARATOR)
            .map(|segment| match segment.parse::<u32>() {
                Ok(0) => Err(Error::MalformedLabel(format!(
                    "'{}': branch ids start at 1",
                    s
                ))),
                Ok(id) => Ok(id),
                Err(_) => Err(Error::MalformedLabel(format!(
                    "'{}': segment '{}' is not a branch id",
                    s, segment
                ))),
            })
            .collect::<Result<Vec<u32>>>()
            .map(PathLabel)
    }
}

impl fmt::Display for PathLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", SEGMENT_SEPARATOR)?;
            }
            write!(f, "{}", id)?;
        }
        Ok(())
    }
}
