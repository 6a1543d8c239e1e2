//! Configuration loading and tree file resolution

use crate::level::WEIGHT_TOLERANCE;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming the tree file
pub const TREE_FILE_ENV: &str = "LTREE_TREE_FILE";

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Persisted tree used when none is given on the command line
    pub tree_file: Option<PathBuf>,
    pub sampling: SamplingConfig,
    pub logging: LoggingConfig,
}

/// Sampling and validation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Fixed seed for reproducible realizations; OS entropy when absent
    pub seed: Option<u64>,
    /// Allowed deviation of a level's weight sum from 1.0
    pub weight_tolerance: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            seed: None,
            weight_tolerance: WEIGHT_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing level when RUST_LOG is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Configured level as a tracing level (trace, debug, info, warn, error)
    pub fn tracing_level(&self) -> Result<tracing::Level> {
        self.level.parse().map_err(|_| {
            Error::Config(format!(
                "logging.level must be one of trace, debug, info, warn, error; got '{}'",
                self.level
            ))
        })
    }
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

    if !config.sampling.weight_tolerance.is_finite() || config.sampling.weight_tolerance < 0.0 {
        return Err(Error::Config(format!(
            "{}: weight_tolerance must be a non-negative number, got {}",
            path.display(),
            config.sampling.weight_tolerance
        )));
    }
    config
        .logging
        .tracing_level()
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

    debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Load the platform config file, falling back to defaults
///
/// A missing file is not an error: it is logged and defaults are used. A file
/// that exists but cannot be parsed is an error.
pub fn load_default_config() -> Result<TomlConfig> {
    match default_config_path() {
        Some(path) => load_toml_config(&path),
        None => {
            warn!("No config file found, using defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Write a config file atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let temp_path = path.with_extension("toml.tmp");
    fs::write(&temp_path, content)?;
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }
    Ok(())
}

/// Tree file resolution in priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
///
/// There is no compiled default tree, so nothing found is a `Config` error.
pub fn resolve_tree_file(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    config: &TomlConfig,
) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &config.tree_file {
        return Ok(path.clone());
    }

    Err(Error::Config(format!(
        "No tree file given: pass --tree, set {} or add tree_file to config.toml",
        env_var_name
    )))
}

/// Platform config file path, if one exists
fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("ltree").join("config.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    // System-wide fallback on Linux
    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/ltree/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}
