//! Impacted-test launcher CLI.
//!
//! Spawns the external selection/execution process for one revision window,
//! with the coverage agent attached in local mode, and forwards the
//! executor's exit status to the caller.

#![forbid(unsafe_code)]

mod launcher;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use launcher::{LaunchOrchestrator, LaunchRequest, SystemLauncher};
use tia_common::config::load_config;
use tia_common::types::RevisionPoint;

#[derive(Parser)]
#[command(name = "tia")]
#[command(author, version, about = "Runs impacted tests and collects coverage per test case")]
struct Cli {
    /// Baseline revision; changes after it are considered for impact
    /// analysis
    #[arg(long)]
    baseline: String,

    /// End revision; changes up to and including it are considered for
    /// impact analysis
    #[arg(long)]
    end: String,

    /// Run all tests, but still collect testwise coverage. By default only
    /// impacted tests are executed.
    #[arg(long)]
    run_all_tests: bool,

    /// Path to the launcher configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = load_config(cli.config.as_deref())?;
    let request = LaunchRequest {
        config: &config,
        baseline: RevisionPoint::new(cli.baseline),
        end: RevisionPoint::new(cli.end),
        run_all_tests: cli.run_all_tests,
    };

    let mut orchestrator = LaunchOrchestrator::new(SystemLauncher);
    let code = orchestrator.launch(&request)?;
    info!("Impacted test executor finished with exit code {code}");
    std::process::exit(code);
}
