//! Human-readable tree structure description
//!
//! Formatting is pure: [`describe_structure`] returns lines and the caller
//! picks the sink (stdout, a log, a file).

use crate::tree::LogicTree;
use std::fmt;
use std::io::{self, Write};

/// One line per level header, branch, file association and rule
pub fn describe_structure<E>(tree: &LogicTree<E>) -> Vec<String> {
    let levels = tree.branching_levels();
    let mut lines = Vec::new();

    if !tree.model_name().is_empty() {
        lines.push(format!("Logic tree model: {}", tree.model_name()));
    }
    lines.push(format!(
        "Total number of branching levels in the logic tree: {}",
        levels.len()
    ));

    for level in levels {
        lines.push(String::new());
        lines.push(format!(
            "Branching level: {}, label: {}, appliesTo: {}",
            level.level(),
            level.label(),
            level.applies_to()
        ));

        for branch in level.branches() {
            lines.push(format!(
                "  Branch number: {}, label: {}, weight: {}",
                branch.relative_id(),
                branch.value(),
                branch.weight()
            ));
            if let Some(file) = branch.input_file() {
                lines.push(format!("    Associated file: {}", file));
            }
            if let Some(rule) = branch.rule() {
                lines.push(format!("    Associated rule: {}", rule.name()));
                lines.push(format!("    Associated uncertainty value: {}", rule.value()));
            }
        }
    }

    lines
}

/// Write the structure description to `sink`, one line at a time
pub fn write_structure<E, W: Write>(tree: &LogicTree<E>, mut sink: W) -> io::Result<()> {
    for line in describe_structure(tree) {
        writeln!(sink, "{}", line)?;
    }
    sink.flush()
}

impl<E> fmt::Display for LogicTree<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in describe_structure(self) {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
