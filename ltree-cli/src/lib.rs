//! ltree-cli library - logic tree inspection tool
//!
//! Command handling lives here so it can be exercised without spawning the
//! binary. Trees are loaded with `serde_json::Value` elements, so any element
//! payload saved by another tool can be inspected.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ltree_common::config::{resolve_tree_file, TomlConfig, TREE_FILE_ENV};
use ltree_common::persist::load_from_file;
use ltree_common::report::write_structure;
use ltree_common::{Error, LogicTree, PathLabel};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

/// Version plus build stamp, e.g. `ltree v0.1.0 [1a2b3c4d] built 2026-10-19T12:30:45Z (release)`
pub fn build_info() -> String {
    format!(
        "ltree v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    )
}

/// Tree as stored on disk by any producer
pub type StoredTree = LogicTree<serde_json::Value>;

#[derive(Debug, Parser)]
#[command(name = "ltree", version, about = "Inspect, weigh and sample logic trees")]
pub struct Cli {
    /// Persisted logic tree (JSON)
    #[arg(long, global = true)]
    pub tree: Option<PathBuf>,

    /// Config file (defaults to the platform config location)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print every level and branch
    Describe,
    /// Weight of a path label such as 2_1_3
    Weight {
        label: String,
        /// Only the weight of the last decision, not the joint weight
        #[arg(long)]
        conditional: bool,
    },
    /// Sample one complete path
    Sample {
        /// Seed for a reproducible draw (overrides config)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List every complete path with its joint weight
    Paths,
    /// Check level ordering, branch ids and weight sums
    Validate,
    /// List element mapping labels
    Elements,
}

/// Load the tree named by `--tree`, the environment or the config file
pub fn load_tree(cli: &Cli, config: &TomlConfig) -> Result<StoredTree> {
    let path = resolve_tree_file(cli.tree.as_deref(), TREE_FILE_ENV, config)?;
    load_from_file(&path).with_context(|| format!("Failed to load tree from {}", path.display()))
}

/// Execute the parsed command, writing results to `out`
pub fn run<W: Write>(cli: &Cli, config: &TomlConfig, out: &mut W) -> Result<()> {
    let tree = load_tree(cli, config)?;
    execute(&cli.command, &tree, config, out)
}

/// Execute a command against an already loaded tree
pub fn execute<W: Write>(
    command: &Command,
    tree: &StoredTree,
    config: &TomlConfig,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Describe => {
            write_structure(tree, &mut *out)?;
        }
        Command::Weight { label, conditional } => {
            let path: PathLabel = label.parse()?;
            let weight = if *conditional {
                tree.conditional_weight(&path)?
            } else {
                tree.path_weight(&path)?
            };
            writeln!(out, "{}", weight)?;
        }
        Command::Sample { seed } => {
            let mut rng = match seed.or(config.sampling.seed) {
                Some(seed) => {
                    info!("Sampling with seed {}", seed);
                    StdRng::seed_from_u64(seed)
                }
                None => StdRng::from_entropy(),
            };
            let path = tree.sample_path(&mut rng)?;
            let weight = tree.path_weight(&path)?;
            writeln!(out, "{} {}", path, weight)?;
        }
        Command::Paths => {
            for (path, weight) in tree.enumerate_paths()? {
                writeln!(out, "{} {}", path, weight)?;
            }
        }
        Command::Validate => {
            let tolerance = config.sampling.weight_tolerance;
            if let Err(e) = tree.validate(tolerance) {
                warn!("Validation failed: {}", e);
                bail!("Logic tree '{}' is invalid: {}", tree.model_name(), e);
            }
            let paths = match tree.path_count() {
                Ok(count) => count.to_string(),
                Err(Error::PathCountOverflow { .. }) => format!("more than {}", usize::MAX),
                Err(e) => return Err(e.into()),
            };
            writeln!(out, "OK: {} levels, {} paths", tree.depth(), paths)?;
        }
        Command::Elements => {
            let mut labels: Vec<&String> = tree.element_map().keys().collect();
            labels.sort();
            for label in labels {
                writeln!(out, "{}", label)?;
            }
        }
    }
    Ok(())
}
