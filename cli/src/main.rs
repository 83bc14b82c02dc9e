//! Dialectic CLI - JSON in, JSON out over the engine library.
//!
//! Every subcommand reads its input from a file (`-` for stdin) in the
//! shapes the engine accepts and prints a JSON response on stdout. Logs go
//! to stderr so stdout stays machine-readable.

mod commands;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use dialectic_config::DialecticConfig;

use crate::commands::Command;

#[derive(Parser, Debug)]
#[command(name = "dialectic", version)]
#[command(about = "Compile dialogues into designs, step them and label argumentation frameworks")]
struct Cli {
    /// Config file (defaults to $DIALECTIC_CONFIG, then ~/.dialectic/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn init_tracing(config_filter: Option<&str>) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config_filter.unwrap_or("info")))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => DialecticConfig::load_from(path),
        None => DialecticConfig::load(),
    };
    let (config, config_error) = match loaded {
        Ok(config) => (config.unwrap_or_default(), None),
        Err(err) => (DialecticConfig::default(), Some(err)),
    };

    init_tracing(config.log_filter().as_deref());
    if let Some(err) = config_error {
        tracing::warn!(path = %err.path().display(), "Using default settings: {err}");
    }

    commands::run(cli.command, commands::engine_settings(&config))
}
