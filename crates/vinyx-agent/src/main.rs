//! Vinyx — Virtual screening with AutoDock Vina
//! Entry point for the `vinyx` binary.

mod cli;
mod config;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vinyx_collect::{run_collect, TracingObserver};
use vinyx_docking::run_analyze;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = config::Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Analyze(args) => {
            let job = args.resolve(config.analyze)?;
            info!("Analyzing {} against {}", job.input.display(), job.vina.receptor.display());
            let result = run_analyze(&job)
                .await
                .with_context(|| format!("Failed to analyze collection {}", job.input.display()))?;
            info!(
                "✅ {} of {} ligands analyzed ({} failed). Results in {}",
                result.analyzed,
                result.ligands_found,
                result.failed,
                result.results_file.display()
            );
        }
        Command::Collect(args) => {
            let job = args.resolve(config.collect)?;
            info!("Collecting results under {}", job.input.display());
            let output = job.output.clone();
            let result = tokio::task::spawn_blocking(move || run_collect(&job, &TracingObserver))
                .await?
                .context("Failed to collect results")?;
            if result.files_found > 0 {
                info!(
                    "✅ {} results from {} files written to {}",
                    result.records_written,
                    result.files_found,
                    output.display()
                );
            }
        }
    }

    Ok(())
}
