//! Command-line access to the document service.
//!
//! Runs the same pipeline as the HTTP binary against a local file and prints the JSON response.
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docqa::{config::Config, logging, processing::DocumentService};

#[derive(Parser)]
#[command(
    name = "docqa-cli",
    about = "Extract, summarize, and question documents from the command line"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract text and summarize it when long enough.
    Process {
        #[arg(long)]
        file: PathBuf,
    },
    /// Answer a question about a file.
    Ask {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        question: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    logging::init_cli_tracing();

    let config = Config::from_env().context("failed to load configuration")?;
    let service = DocumentService::from_config(&config);

    let output = match cli.command {
        Command::Process { file } => {
            let processed = service
                .process_document(&file.to_string_lossy())
                .await
                .with_context(|| format!("failed to process {}", file.display()))?;
            serde_json::to_string_pretty(&processed)?
        }
        Command::Ask { file, question } => {
            let answer = service
                .ask_document(&question, Some(&*file.to_string_lossy()))
                .await
                .with_context(|| format!("failed to answer question about {}", file.display()))?;
            serde_json::to_string_pretty(&answer)?
        }
    };

    println!("{output}");
    Ok(())
}
