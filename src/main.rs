use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::AsyncBufRead;
use tracing_subscriber::EnvFilter;

use metricsbus::{relay, Settings};

#[derive(Parser, Debug)]
#[command(name = "metricsbus")]
#[command(version, about = "Relay and validate metrics events published over a local message bus")]
struct Args {
    /// Settings file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set (e.g., "info", "metricsbus_sdk=debug")
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Publish newline-delimited events to the bus and record them to the configured sinks
    Relay {
        /// Read events from this file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Bus address to publish to and subscribe on
        #[arg(short, long)]
        address: Option<String>,
    },

    /// Decode newline-delimited events and report the result for each line
    Check {
        /// Read events from this file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(level) = args.log_level {
        settings.log_level = level;
    }
    init_tracing(&settings.log_level);

    match args.command {
        Command::Relay { input, address } => {
            if let Some(address) = address {
                settings.sink_address = address;
                settings.validate()?;
            }
            run_relay(input, &settings).await
        }
        Command::Check { input } => run_check(input),
    }
}

fn init_tracing(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
}

/// Relay events from a file or stdin
async fn run_relay(input: Option<PathBuf>, settings: &Settings) -> Result<()> {
    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match input {
        Some(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Box::new(tokio::io::BufReader::new(file))
        }
        None => Box::new(tokio::io::BufReader::new(tokio::io::stdin())),
    };

    relay::relay(reader, settings).await?;
    Ok(())
}

/// Check events from a file or stdin, failing if any line is invalid
fn run_check(input: Option<PathBuf>) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let summary = match input {
        Some(path) => {
            let file = File::open(&path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            relay::check(BufReader::new(file), &mut out)?
        }
        None => relay::check(io::stdin().lock(), &mut out)?,
    };

    if !summary.is_success() {
        bail!(
            "{} of {} lines failed to decode",
            summary.failed,
            summary.ok + summary.failed
        );
    }
    Ok(())
}
