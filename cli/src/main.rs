//! linkcast - replay analysis from the command line
//!
//! Usage:
//!   linkcast analyze --replay <file> [--config <file>] [--json] [--european]
//!   linkcast links --replay <file> [--config <file>] [--event <index>]
//!   linkcast rules [--config <file>]
//!
//! Logs go to stderr, or are appended to LINKCAST_LOG_PATH when set.

mod commands;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Link, attribute and analyze combat replays")]
struct Cli {
    /// Analysis config (TOML). Defaults to the user config file when present.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every analyzer over a replay and print the report
    Analyze {
        #[arg(short, long)]
        replay: PathBuf,
        /// Emit the report as JSON instead of text
        #[arg(long)]
        json: bool,
        /// Use `,` as the decimal separator in the text report
        #[arg(long)]
        european: bool,
    },
    /// Dump the relation graph written by the link rules
    Links {
        #[arg(short, long)]
        replay: PathBuf,
        /// Only show the event at this stream index and its relations
        #[arg(short, long)]
        event: Option<usize>,
    },
    /// List the configured link rules in declaration order
    Rules,
}

/// Initialize logging, writing to LINKCAST_LOG_PATH if set, otherwise stderr.
fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    if let Ok(path) = std::env::var("LINKCAST_LOG_PATH")
        && let Ok(file) = std::fs::OpenOptions::new().create(true).append(true).open(&path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .with_writer(file)
            .init();
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let config = match commands::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "Failed to load config");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Analyze {
            replay,
            json,
            european,
        } => commands::analyze(&replay, config, json, european),
        Commands::Links { replay, event } => commands::links(&replay, config, event),
        Commands::Rules => commands::rules(config),
    };

    match result {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "Command failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
