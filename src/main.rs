use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use tenet::cli;
use tenet::config::TenetConfig;

#[derive(Parser)]
#[command(name = "tenet", version, about = "Self-curating belief memory for AI agents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record an observation and form or update beliefs
    Remember {
        /// The observation text
        observation: String,
    },
    /// Retrieve the most relevant beliefs for a query
    Recall {
        query: String,
        /// Emit results as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },
    /// Mark a belief as forgotten by id prefix
    Forget {
        prefix: String,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Report near-duplicate clusters and stale beliefs
    Reflect {
        /// Merge each duplicate cluster into its strongest member
        #[arg(long)]
        merge: bool,
    },
    /// Distill thematic clusters into meta-beliefs
    Synthesize,
    /// Scan for contradictory belief pairs
    Scan,
    /// Show store statistics
    Stats,
    /// Export the whole store as JSON to stdout
    Export,
    /// Import a JSON export from a file, or stdin when no path is given
    Import { path: Option<PathBuf> },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = TenetConfig::load()?;

    // Log to stderr so stdout stays clean for JSON output.
    let filter =
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Remember { observation } => cli::remember::remember(&config, &observation),
        Command::Recall { query, json } => cli::recall::recall(&config, &query, json),
        Command::Forget { prefix, reason } => {
            cli::forget::forget(&config, &prefix, reason.as_deref())
        }
        Command::Reflect { merge } => cli::maintenance::reflect(&config, merge),
        Command::Synthesize => cli::maintenance::synthesize(&config),
        Command::Scan => cli::maintenance::scan(&config),
        Command::Stats => cli::stats::stats(&config),
        Command::Export => cli::export::export(&config),
        Command::Import { path } => cli::import::import(&config, path.as_deref()),
    }
}
