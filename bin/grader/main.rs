//! Challenge Grader CLI
//!
//! Grades a single submission from the terminal, or decodes an explorer
//! `SourceCode` value without running anything.

use anyhow::{Context, Result};
use challenge_grader::config::GraderArgs;
use challenge_grader::{normalize, FileChallengeStore, SubmissionRequest, Submitter};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "grader")]
#[command(about = "Grade smart-contract challenge submissions")]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch, stage and test a deployed contract
    Submit {
        /// Challenge id
        challenge: String,
        /// Explorer network key
        network: String,
        /// Contract address
        address: String,

        /// Challenge catalogue (TOML)
        #[arg(long, default_value = "challenges.toml", env = "CHALLENGES_FILE")]
        challenges: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        grader: GraderArgs,
    },
    /// Decode a saved explorer SourceCode value and print the contract body
    Normalize {
        /// File holding the raw SourceCode value
        file: PathBuf,
        /// Contract file to extract, e.g. YourToken.sol
        contract: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "challenge_grader=debug"
    } else {
        "challenge_grader=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Submit {
            challenge,
            network,
            address,
            challenges,
            json,
            grader,
        } => {
            let config = grader.into_config()?;
            let store = FileChallengeStore::load(&challenges)?;
            let submitter = Submitter::new(&config, Arc::new(store))?;
            let request = SubmissionRequest {
                challenge_id: challenge,
                network,
                contract_address: address,
            };

            match submitter.submit(&request).await {
                Ok(outcome) if json => {
                    println!("{}", serde_json::to_string_pretty(&outcome)?);
                }
                Ok(outcome) => {
                    println!("{} {}", "✓".green(), "Test run completed".bold());
                    println!();
                    println!("{}", outcome.result.stdout);
                    if !outcome.result.stderr.is_empty() {
                        println!("{}", outcome.result.stderr.dimmed());
                    }
                    if !outcome.gas_report.is_empty() {
                        println!("{}", "Gas report".bold());
                        for entry in &outcome.gas_report {
                            println!("  {:<32} {:>10}", entry.function_name, entry.gas_used);
                        }
                    }
                }
                Err(e) => {
                    eprintln!("{} {} ({:?})", "✗".red(), e, e.kind());
                    std::process::exit(1);
                }
            }
        }
        Commands::Normalize { file, contract } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let source = normalize(&raw, &contract)?;
            print!("{}", source);
        }
    }

    Ok(())
}
