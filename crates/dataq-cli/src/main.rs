mod commands;
mod setup;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Ask a language model to answer questions about a dataset with built-in tools.
#[derive(Debug, Parser)]
#[command(name = "dataq", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Let the model pick a data tool and print its result as JSON.
    Ask {
        /// CSV or JSON-records file to answer from.
        #[arg(short, long)]
        data: PathBuf,
        question: String,
    },
    /// Send the question straight to the model and print the reply.
    Chat { question: String },
    /// List the tools the model can choose from, in prompt order.
    Tools {
        #[arg(short, long)]
        data: PathBuf,
    },
    /// Store backend credentials in ~/.dataq/credentials.json.
    Setup,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Ask { data, question } => commands::ask(&data, &question).await,
        Command::Chat { question } => commands::chat(&question).await,
        Command::Tools { data } => commands::tools(&data),
        Command::Setup => setup::run_setup().map(|_| ()),
    }
}
