mod cli;
mod engine;
mod error;
mod logging;
mod model;
mod orchestrator;
mod preview;
mod selection;
mod session;
mod text_summary;
#[cfg(feature = "tui")]
mod tui;
mod verdict;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let is_non_tui = args.json || args.text || args.health;

    // A missing log directory should not keep the detector from running.
    if let Err(e) = logging::init() {
        if is_non_tui {
            eprintln!("logging disabled: {e:#}");
        }
    }

    match cli::run(args).await {
        Ok(cli::RunStatus::Completed) => {
            // Explicitly exit on success for non-TUI modes so no stray task keeps us alive.
            if is_non_tui {
                std::process::exit(0);
            }
            Ok(())
        }
        Ok(cli::RunStatus::AnalysisFailed) => std::process::exit(1),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "run failed");
            Err(e)
        }
    }
}
