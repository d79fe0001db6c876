//! metarmap CLI - batched METAR/TAF fetcher for aviation weather maps.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod display;

use display::Format;

#[derive(Parser)]
#[command(name = "metarmap")]
#[command(about = "Batched METAR/TAF aviation weather fetcher", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch weather reports for a list of station codes
    Fetch {
        /// Station identifiers (e.g. KORD KJFK EGLL)
        #[arg(required = true)]
        stations: Vec<String>,

        /// Report kind to fetch
        #[arg(short, long, default_value = "metar")]
        report: String,

        /// Hours of data to request
        #[arg(long)]
        hours: Option<f64>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,

        /// Per-request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Attempts per chunk before giving up on it
        #[arg(long)]
        retries: Option<u32>,

        /// Overall deadline for the whole fetch, in seconds
        #[arg(long)]
        deadline_secs: Option<u64>,
    },

    /// Probe the remote data service
    Check,
}

fn init_logging(verbose: u8, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Fetch {
            stations,
            report,
            hours,
            format,
            timeout_secs,
            retries,
            deadline_secs,
        } => {
            commands::fetch(
                &stations,
                &report,
                hours,
                format,
                timeout_secs,
                retries,
                deadline_secs,
                cli.quiet,
            )
            .await
        }
        Commands::Check => commands::check().await,
    }
}
