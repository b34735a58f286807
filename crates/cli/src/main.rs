// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! latch - distributed locks and queue jobs, exercised in-process

mod commands;
mod logging;
mod output;
mod settings;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{config, contend, drain};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "latch",
    version,
    about = "latch - distributed locks and queue jobs"
)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enqueue demo entries and drain them with concurrent workers
    Drain(drain::DrainArgs),
    /// Have several tasks contend for one lock
    Contend(contend::ContendArgs),
    /// Print the effective configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::setup_logging(cli.log_file.as_deref())?;
    let config = settings::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Drain(args) => drain::drain(args, &config).await,
        Commands::Contend(args) => contend::contend(args, &config).await,
        Commands::Config(args) => config::show(args, &config),
    }
}
