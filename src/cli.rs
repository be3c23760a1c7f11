use crate::engine::DetectorClient;
use crate::model::{DetectorConfig, ImageFile};
use crate::orchestrator;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Inference service used when `--base-url` is not given. Set
/// `AI_DETECTOR_API_URL` at build time to bake in a different deployment.
pub const DEFAULT_BASE_URL: &str = match option_env!("AI_DETECTOR_API_URL") {
    Some(url) => url,
    None => "http://localhost:5000",
};

#[derive(Debug, Parser, Clone)]
#[command(
    name = "ai-image-detector",
    version,
    about = "Ask an inference service whether an image is real or AI-generated"
)]
pub struct Cli {
    /// Image to analyze (PNG or JPEG, at most 16 MiB)
    pub image: Option<PathBuf>,

    /// Base URL of the inference service
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Request timeout
    #[arg(long, default_value = "30s")]
    pub timeout: humantime::Duration,

    /// Print the result as JSON instead of starting the TUI
    #[arg(long)]
    pub json: bool,

    /// Print a plain-text summary instead of starting the TUI
    #[arg(long)]
    pub text: bool,

    /// Check the service's /health endpoint and exit
    #[arg(long)]
    pub health: bool,
}

/// Build a `DetectorConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> DetectorConfig {
    DetectorConfig {
        base_url: args.base_url.clone(),
        timeout: Duration::from(args.timeout),
        user_agent: format!("ai-image-detector/{}", env!("CARGO_PKG_VERSION")),
    }
}

/// Outcome of a one-shot run, used by `main` to pick the exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    AnalysisFailed,
}

pub async fn run(args: Cli) -> Result<RunStatus> {
    if args.json && args.text {
        return Err(anyhow::anyhow!("--json and --text cannot be used together"));
    }

    let cfg = build_config(&args);
    let client = DetectorClient::new(&cfg)?;
    tracing::info!(base_url = %cfg.base_url, timeout = ?cfg.timeout, "client configured");

    if args.health {
        return run_health(&client).await;
    }

    if !args.json && !args.text {
        #[cfg(feature = "tui")]
        {
            crate::tui::run(args, client).await?;
            return Ok(RunStatus::Completed);
        }
        #[cfg(not(feature = "tui"))]
        {
            return run_one_shot(&args, &client, false).await;
        }
    }

    run_one_shot(&args, &client, args.json).await
}

async fn run_health(client: &DetectorClient) -> Result<RunStatus> {
    let health = client.health().await?;
    println!(
        "{}: {}",
        health.status,
        health.message.as_deref().unwrap_or("-")
    );
    Ok(if health.is_healthy() {
        RunStatus::Completed
    } else {
        RunStatus::AnalysisFailed
    })
}

/// Analyze `args.image` once and print the terminal state.
async fn run_one_shot(args: &Cli, client: &DetectorClient, json: bool) -> Result<RunStatus> {
    let file = match args.image.as_deref() {
        Some(path) => Some(
            ImageFile::load(path).with_context(|| format!("cannot use {}", path.display()))?,
        ),
        None => None,
    };

    let snapshot = orchestrator::analyze_once(client, file).await;

    if json {
        let report = crate::text_summary::build_json_report(&snapshot, client.base_url().as_str());
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let summary = crate::text_summary::build_text_summary(&snapshot);
        for line in summary.lines {
            println!("{}", line);
        }
    }

    Ok(if snapshot.state.error().is_some() {
        RunStatus::AnalysisFailed
    } else {
        RunStatus::Completed
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_service() {
        let args = Cli::parse_from(["ai-image-detector"]);
        let cfg = build_config(&args);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert!(cfg.user_agent.starts_with("ai-image-detector/"));
        assert!(args.image.is_none());
    }

    #[test]
    fn parses_one_shot_flags() {
        let args = Cli::parse_from([
            "ai-image-detector",
            "--json",
            "--timeout",
            "5s",
            "--base-url",
            "http://gpu-box:8080",
            "cat.jpg",
        ]);
        assert!(args.json);
        assert_eq!(args.image, Some(PathBuf::from("cat.jpg")));
        assert_eq!(build_config(&args).timeout, Duration::from_secs(5));
        assert_eq!(build_config(&args).base_url, "http://gpu-box:8080");
    }
}
