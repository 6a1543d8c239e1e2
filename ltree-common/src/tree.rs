//! Logic tree container and path weights
//!
//! A [`LogicTree`] owns an ordered sequence of branching levels plus an
//! independent side table mapping path-label strings to attached elements
//! (for example results computed for one realization). The side table is
//! never derived from the levels.
//!
//! Construction needs `&mut self`; queries only `&self`, so a built tree can
//! be shared across threads for read-only use.

use crate::level::BranchingLevel;
use crate::path::PathLabel;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Weighted hierarchical branching tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicTree<E> {
    model_name: String,
    levels: Vec<BranchingLevel>,
    elements: HashMap<String, E>,
}

impl<E> Default for LogicTree<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> LogicTree<E> {
    /// Create an empty, unnamed tree
    pub fn new() -> Self {
        Self {
            model_name: String::new(),
            levels: Vec::new(),
            elements: HashMap::new(),
        }
    }

    /// Create an empty tree with a descriptive model name
    pub fn with_model_name(name: impl Into<String>) -> Self {
        Self {
            model_name: name.into(),
            ..Self::new()
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn set_model_name(&mut self, name: impl Into<String>) {
        self.model_name = name.into();
    }

    /// Append a level at the end of the level sequence
    ///
    /// No ordering or weight checks are made here; see [`LogicTree::validate`].
    pub fn add_branching_level(&mut self, level: BranchingLevel) {
        debug!(
            position = self.levels.len(),
            label = level.label(),
            branches = level.len(),
            "Adding branching level"
        );
        self.levels.push(level);
    }

    /// Insert or overwrite the element associated with `label`
    pub fn add_element_mapping(&mut self, label: impl Into<String>, element: E) {
        let label = label.into();
        debug!(label = %label, "Adding element mapping");
        self.elements.insert(label, element);
    }

    pub fn branching_levels(&self) -> &[BranchingLevel] {
        &self.levels
    }

    /// Level at `index`, or `LevelOutOfRange`
    pub fn branching_level(&self, index: usize) -> Result<&BranchingLevel> {
        self.levels.get(index).ok_or(Error::LevelOutOfRange {
            index,
            depth: self.levels.len(),
        })
    }

    /// Number of branching levels
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn element_map(&self) -> &HashMap<String, E> {
        &self.elements
    }

    pub fn element(&self, label: &str) -> Option<&E> {
        self.elements.get(label)
    }

    /// Iterate over the attached elements
    ///
    /// Each call starts a fresh iteration. Order is unspecified but stays the
    /// same as long as the mapping is not modified.
    pub fn elements(&self) -> impl Iterator<Item = &E> + '_ {
        self.elements.values()
    }

    /// Conditional weight of the last decision in a textual path label
    ///
    /// Only the final segment is consulted, at level `segments - 1`.
    pub fn weight(&self, label: &str) -> Result<f64> {
        self.conditional_weight(&label.parse()?)
    }

    /// Joint weight of a complete textual path label
    pub fn total_weight(&self, label: &str) -> Result<f64> {
        self.path_weight(&label.parse()?)
    }

    /// Weight of the branch chosen at the deepest level of `path`
    pub fn conditional_weight(&self, path: &PathLabel) -> Result<f64> {
        self.ensure_not_empty()?;
        let relative_id = path
            .last()
            .ok_or_else(|| Error::MalformedLabel("empty label".to_string()))?;
        let level = self.branching_level(path.len() - 1)?;
        Ok(level.branch(relative_id)?.weight())
    }

    /// Joint weight of `path`: product of the selected branch weights
    ///
    /// The path must name exactly one branch per level.
    pub fn path_weight(&self, path: &PathLabel) -> Result<f64> {
        self.ensure_not_empty()?;
        if path.len() != self.levels.len() {
            return Err(Error::PathLength {
                expected: self.levels.len(),
                found: path.len(),
            });
        }

        let mut weight = 1.0;
        for (level, &relative_id) in self.levels.iter().zip(path.segments()) {
            weight *= level.branch(relative_id)?.weight();
        }
        Ok(weight)
    }

    /// Every complete path through the tree with its joint weight
    ///
    /// Paths are produced in lexicographic order of branch ids. For a valid
    /// tree the weights sum to 1.0.
    pub fn enumerate_paths(&self) -> Result<Vec<(PathLabel, f64)>> {
        let total = self.path_count()?;
        debug!(paths = total, "Enumerating logic tree paths");

        let mut paths = vec![(PathLabel::new(), 1.0)];
        for level in &self.levels {
            // bounded by `total`, so no overflow here
            let mut next = Vec::with_capacity(paths.len() * level.len());
            for (prefix, weight) in &paths {
                for branch in level.branches() {
                    let mut path = prefix.clone();
                    path.push(branch.relative_id());
                    next.push((path, weight * branch.weight()));
                }
            }
            paths = next;
        }
        Ok(paths)
    }

    /// Number of complete paths: the product of the level sizes
    ///
    /// Computed without building any path. `PathCountOverflow` when the
    /// product does not fit in `usize`.
    pub fn path_count(&self) -> Result<usize> {
        self.ensure_not_empty()?;
        self.levels
            .iter()
            .try_fold(1usize, |count, level| count.checked_mul(level.len()))
            .ok_or(Error::PathCountOverflow {
                depth: self.levels.len(),
            })
    }

    /// Check every level's invariants and that declared level indices match
    /// their position in the tree
    pub fn validate(&self, tolerance: f64) -> Result<()> {
        self.ensure_not_empty()?;
        for (position, level) in self.levels.iter().enumerate() {
            if level.level() != position {
                return Err(Error::InvalidLevel {
                    level: level.level(),
                    reason: format!("declared at index {} but stored at position {}", level.level(), position),
                });
            }
            level.validate(tolerance)?;
        }
        Ok(())
    }

    pub(crate) fn ensure_not_empty(&self) -> Result<()> {
        if self.levels.is_empty() {
            Err(Error::EmptyTree)
        } else {
            Ok(())
        }
    }
}
