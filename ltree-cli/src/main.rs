//! ltree - logic tree inspection tool
//!
//! Loads a persisted logic tree and describes, weighs, samples or validates it.

use anyhow::{Context, Result};
use clap::Parser;
use ltree_cli::{build_info, run, Cli};
use ltree_common::config::{load_default_config, load_toml_config};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

/// RUST_LOG directives on top of a default level
fn log_filter(level: tracing::Level) -> EnvFilter {
    EnvFilter::from_default_env().add_directive(level.into())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Tracing first so config loading can log; the configured level is
    // swapped in once the config is known
    let (filter, filter_handle) = reload::Layer::new(log_filter(tracing::Level::INFO));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match &cli.config {
        Some(path) => load_toml_config(path)?,
        None => load_default_config()?,
    };

    let level = config.logging.tracing_level()?;
    filter_handle
        .reload(log_filter(level))
        .context("Failed to apply configured log level")?;
    debug!("Log level set to {}", level);

    info!("Starting {}", build_info());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(&cli, &config, &mut out)
}
