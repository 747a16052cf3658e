//! # petcare-cli: A CLI for `petcare`
//!
//! This is the main entry point for the `petcare` command-line interface. It
//! manages the local condition database and runs one-off analyses against
//! the configured AI provider.

mod analyze;
mod knowledge;
mod report;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::fs::File;
use tracing_subscriber::{fmt, EnvFilter};

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the condition table and insert the default records
    Seed(knowledge::SeedArgs),
    /// List the condition records in the local database
    Conditions(knowledge::ConditionsArgs),
    /// List the behavior checklist
    Behaviors,
    /// Analyze a photo and/or a symptom description
    Analyze(analyze::AnalyzeArgs),
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Setup logging to a file
    let log_file = File::create("petcare-cli.log")?;
    let subscriber = fmt::Subscriber::builder()
        .with_writer(log_file)
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    // Handle the command
    let (name, outcome) = match &cli.command {
        Commands::Seed(args) => ("Seed", knowledge::handle_seed(args).await),
        Commands::Conditions(args) => ("Conditions", knowledge::handle_conditions(args).await),
        Commands::Behaviors => ("Behaviors", knowledge::handle_behaviors()),
        Commands::Analyze(args) => ("Analysis", analyze::handle_analyze(args).await),
    };

    if let Err(e) = outcome {
        eprintln!("{name} failed: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
