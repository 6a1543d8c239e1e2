//! # ltree Common Library
//!
//! Weighted hierarchical logic trees for epistemic uncertainty:
//! - Branch and branching level data model
//! - Path labels and path weight computation
//! - Inverse-transform sampling of branches
//! - Structure reporting
//! - Persistence
//! - Configuration loading

pub mod branch;
pub mod config;
pub mod error;
pub mod level;
pub mod path;
pub mod persist;
pub mod report;
pub mod sampling;
pub mod tree;

pub use branch::{Branch, BranchValue, UncertaintyRule};
pub use error::{Error, Result};
pub use level::{BranchingLevel, WEIGHT_TOLERANCE};
pub use path::PathLabel;
pub use sampling::UniformSource;
pub use tree::LogicTree;
