//! Branching levels
//!
//! A branching level is one decision point of the tree: an ordered set of
//! mutually exclusive branches whose weights sum to 1.0. Levels are built once
//! with their full branch set and never mutated afterwards.

use crate::branch::Branch;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Tolerance used when checking that branch weights sum to 1.0
pub const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Ordered collection of branches active at one level of the tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchingLevel {
    level: usize,
    label: String,
    applies_to: String,
    branches: Vec<Branch>,
}

impl BranchingLevel {
    /// Create a level from its fully populated branch set
    ///
    /// Inputs are trusted; call [`BranchingLevel::validate`] to check them.
    pub fn new(
        level: usize,
        label: impl Into<String>,
        applies_to: impl Into<String>,
        branches: Vec<Branch>,
    ) -> Self {
        Self {
            level,
            label: label.into(),
            applies_to: applies_to.into(),
            branches,
        }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn applies_to(&self) -> &str {
        &self.applies_to
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Branch by 1-based relative id
    pub fn branch(&self, relative_id: u32) -> Result<&Branch> {
        relative_id
            .checked_sub(1)
            .and_then(|index| self.branches.get(index as usize))
            .ok_or(Error::BranchOutOfRange {
                level: self.level,
                relative_id,
                count: self.branches.len(),
            })
    }

    /// Branch by 0-based storage index
    pub fn branch_at(&self, index: usize) -> Option<&Branch> {
        self.branches.get(index)
    }

    /// Sum of all branch weights
    pub fn weight_sum(&self) -> f64 {
        self.branches.iter().map(Branch::weight).sum()
    }

    /// Check the level invariants
    ///
    /// - at least one branch
    /// - ids run `1..=n` in storage order
    /// - every weight is finite and within `[0, 1]`
    /// - weights sum to 1.0 within `tolerance`
    pub fn validate(&self, tolerance: f64) -> Result<()> {
        if self.branches.is_empty() {
            return Err(self.invalid("no branches".to_string()));
        }

        for (index, branch) in self.branches.iter().enumerate() {
            let expected = index as u32 + 1;
            if branch.relative_id() != expected {
                return Err(self.invalid(format!(
                    "branch at position {} has id {}, expected {}",
                    index,
                    branch.relative_id(),
                    expected
                )));
            }
            let w = branch.weight();
            if !w.is_finite() || !(0.0..=1.0).contains(&w) {
                return Err(self.invalid(format!(
                    "branch {} has weight {} outside [0, 1]",
                    expected, w
                )));
            }
        }

        let sum = self.weight_sum();
        if (sum - 1.0).abs() > tolerance {
            return Err(self.invalid(format!(
                "branch weights sum to {}, expected 1.0 (tolerance {})",
                sum, tolerance
            )));
        }

        Ok(())
    }

    fn invalid(&self, reason: String) -> Error {
        Error::InvalidLevel {
            level: self.level,
            reason,
        }
    }
}
