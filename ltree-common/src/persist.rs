//! Tree persistence
//!
//! A tree is stored as a JSON document holding its model name, its levels
//! (branch order, ids, weights and payloads preserved) and its element map.
//! Load failures are returned to the caller; nothing here terminates the
//! process.

use crate::branch::BranchValue;
use crate::tree::LogicTree;
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Encode the full tree state as a byte stream
pub fn to_bytes<E: Serialize>(tree: &LogicTree<E>) -> Result<Vec<u8>> {
    ensure_finite(tree)?;
    Ok(serde_json::to_vec_pretty(tree)?)
}

/// Rebuild a tree from a byte stream produced by [`to_bytes`]
pub fn from_bytes<E: DeserializeOwned>(bytes: &[u8]) -> Result<LogicTree<E>> {
    Ok(serde_json::from_slice(bytes)?)
}

pub fn to_writer<E: Serialize, W: Write>(tree: &LogicTree<E>, writer: W) -> Result<()> {
    ensure_finite(tree)?;
    serde_json::to_writer_pretty(writer, tree)?;
    Ok(())
}

pub fn from_reader<E: DeserializeOwned, R: Read>(reader: R) -> Result<LogicTree<E>> {
    Ok(serde_json::from_reader(reader)?)
}

/// Save a tree to `path`
///
/// Writes to a sibling `.tmp` file first and renames it over the target, so
/// an interrupted save never leaves a truncated tree behind.
pub fn save_to_file<E: Serialize>(tree: &LogicTree<E>, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let bytes = to_bytes(tree)?;
    let temp_path = temp_path_for(path);
    fs::write(&temp_path, &bytes)?;
    debug!("Wrote {} bytes to {}", bytes.len(), temp_path.display());

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    info!(
        "Saved logic tree '{}' ({} levels) to {}",
        tree.model_name(),
        tree.depth(),
        path.display()
    );
    Ok(())
}

/// Load a tree saved with [`save_to_file`]
pub fn load_from_file<E: DeserializeOwned>(path: &Path) -> Result<LogicTree<E>> {
    let bytes = fs::read(path)?;
    let tree: LogicTree<E> = from_bytes(&bytes)?;
    info!(
        "Loaded logic tree '{}' ({} levels, {} elements) from {}",
        tree.model_name(),
        tree.depth(),
        tree.element_map().len(),
        path.display()
    );
    Ok(tree)
}

/// JSON has no NaN or infinity: serde_json writes them as `null`, which
/// then fails to load. Refuse to write such a tree at all.
fn ensure_finite<E>(tree: &LogicTree<E>) -> Result<()> {
    for level in tree.branching_levels() {
        for branch in level.branches() {
            let invalid = |what: String| Error::InvalidLevel {
                level: level.level(),
                reason: format!("branch {} has non-finite {}", branch.relative_id(), what),
            };
            if !branch.weight().is_finite() {
                return Err(invalid(format!("weight {}", branch.weight())));
            }
            if let BranchValue::Number(n) = branch.value() {
                if !n.is_finite() {
                    return Err(invalid(format!("value {}", n)));
                }
            }
            if let Some(rule) = branch.rule() {
                if let BranchValue::Number(n) = rule.value() {
                    if !n.is_finite() {
                        return Err(invalid(format!("rule value {}", n)));
                    }
                }
            }
        }
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
