//! Resona CLI - Fingerprint Index Tool
//!
//! Features:
//! - WAV ingest into a durable fingerprint index
//! - Clip recognition with confidence labels
//! - Index listing and statistics
//! - Signal inspection (SNR estimate, constellation stats)

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;

/// Resona CLI - acoustic fingerprinting toolkit
#[derive(Parser)]
#[command(name = "resona")]
#[command(version)]
#[command(about = "Acoustic fingerprinting and recognition toolkit", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Path to the index store
    #[arg(long, default_value = "resona.db")]
    db: PathBuf,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fingerprint a WAV file and add it to the index
    Add {
        /// Path to a mono or stereo WAV file
        file: PathBuf,

        /// Recording id; defaults to the file stem
        #[arg(short, long)]
        id: Option<String>,
    },

    /// Identify a clip against the index
    Recognize {
        /// Path to the query WAV file
        file: PathBuf,
    },

    /// List indexed recordings
    List,

    /// Show index statistics
    Stats,

    /// Analyze a WAV file without touching the index
    Inspect {
        /// Path to the WAV file
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .init();

    match cli.command {
        Commands::Add { file, id } => {
            commands::add(&cli.db, &file, id.as_deref(), cli.json)?;
        }
        Commands::Recognize { file } => {
            commands::recognize(&cli.db, &file, cli.json)?;
        }
        Commands::List => {
            commands::list(&cli.db, cli.json)?;
        }
        Commands::Stats => {
            commands::stats(&cli.db, cli.json)?;
        }
        Commands::Inspect { file } => {
            commands::inspect(&file, cli.json)?;
        }
    }

    Ok(())
}
