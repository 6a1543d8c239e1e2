//! Branch definitions
//!
//! A branch is one weighted alternative at a branching level. Payloads are
//! opaque to the tree: the tree only reads ids and weights.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque payload carried by a branch or an uncertainty rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum BranchValue {
    /// Free-form text (model identifier, file stem, ...)
    Text(String),
    /// Real-valued parameter
    Number(f64),
    /// Integer-valued parameter
    Integer(i64),
    /// Boolean switch
    Flag(bool),
}

impl fmt::Display for BranchValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchValue::Text(s) => write!(f, "{}", s),
            BranchValue::Number(n) => write!(f, "{}", n),
            BranchValue::Integer(i) => write!(f, "{}", i),
            BranchValue::Flag(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for BranchValue {
    fn from(s: &str) -> Self {
        BranchValue::Text(s.to_string())
    }
}

impl From<String> for BranchValue {
    fn from(s: String) -> Self {
        BranchValue::Text(s)
    }
}

impl From<f64> for BranchValue {
    fn from(n: f64) -> Self {
        BranchValue::Number(n)
    }
}

impl From<i64> for BranchValue {
    fn from(i: i64) -> Self {
        BranchValue::Integer(i)
    }
}

impl From<bool> for BranchValue {
    fn from(b: bool) -> Self {
        BranchValue::Flag(b)
    }
}

/// Uncertainty-modification directive attached to a branch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyRule {
    name: String,
    value: BranchValue,
}

impl UncertaintyRule {
    pub fn new(name: impl Into<String>, value: impl Into<BranchValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &BranchValue {
        &self.value
    }
}

/// One weighted alternative at a branching level
///
/// `relative_id` is 1-based: it is both the sampled outcome and, minus one,
/// the storage index inside the owning level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    relative_id: u32,
    weight: f64,
    value: BranchValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rule: Option<UncertaintyRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    input_file: Option<String>,
}

impl Branch {
    /// Create a branch without rule or input file
    pub fn new(relative_id: u32, weight: f64, value: impl Into<BranchValue>) -> Self {
        Self {
            relative_id,
            weight,
            value: value.into(),
            rule: None,
            input_file: None,
        }
    }

    /// Attach an uncertainty rule
    pub fn with_rule(mut self, rule: UncertaintyRule) -> Self {
        self.rule = Some(rule);
        self
    }

    /// Attach an external input file reference
    pub fn with_input_file(mut self, path: impl Into<String>) -> Self {
        self.input_file = Some(path.into());
        self
    }

    pub fn relative_id(&self) -> u32 {
        self.relative_id
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn value(&self) -> &BranchValue {
        &self.value
    }

    pub fn rule(&self) -> Option<&UncertaintyRule> {
        self.rule.as_ref()
    }

    pub fn input_file(&self) -> Option<&str> {
        self.input_file.as_deref()
    }
}
