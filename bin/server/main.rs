//! Challenge Grader Server
//!
//! Serves the grading endpoints. TLS is expected to be terminated in front
//! of this process.

use anyhow::{Context, Result};
use challenge_grader::config::GraderArgs;
use challenge_grader::{run_server, ApiState, FileChallengeStore, Submitter};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "grader-server")]
#[command(about = "Contract Challenge Grader HTTP Server")]
struct Args {
    /// Server port
    #[arg(short, long, default_value = "5000", env = "PORT")]
    port: u16,

    /// Server host
    #[arg(long, default_value = "0.0.0.0", env = "HOST")]
    host: String,

    /// Challenge catalogue (TOML)
    #[arg(long, default_value = "challenges.toml", env = "CHALLENGES_FILE")]
    challenges: PathBuf,

    #[command(flatten)]
    grader: GraderArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("challenge_grader=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = args.grader.into_config()?;

    info!("Starting Challenge Grader Server");
    info!("  Challenges: {}", args.challenges.display());
    info!("  Workspace root: {}", config.workspace.root.display());
    info!("  Test command: {}", config.harness.command_line());
    info!("  Networks: {}", config.explorer.networks.join(", "));

    if config.explorer.api_key.is_empty() {
        tracing::warn!("No explorer API key configured, requests may be rate limited");
    }

    let store = FileChallengeStore::load(&args.challenges)?;
    let submitter =
        Submitter::new(&config, Arc::new(store)).context("Failed to initialize grader")?;

    run_server(Arc::new(ApiState::new(submitter)), &args.host, args.port).await
}
