//! Storesim command-line client.
//!
//! The `storesim` command searches stores, starts reports and simulations,
//! and follows their background jobs until they finish.

use anyhow::Result;
use clap::{Parser, Subcommand};
use storesim_async::Locale;
use storesim_async::config::{ENV_API_BASE_URL, ENV_LOCALE};

mod commands;

#[derive(Parser)]
#[command(name = "storesim")]
#[command(about = "Command-line client for the storesim analytics API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API base URL
    #[arg(long, env = ENV_API_BASE_URL, global = true)]
    base_url: Option<String>,

    /// Language of messages and report labels (en, ko)
    #[arg(long, env = ENV_LOCALE, global = true)]
    locale: Option<Locale>,

    /// Emit compact JSON instead of pretty-printed output
    #[arg(long, global = true)]
    compact: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Store search
    Stores {
        #[command(subcommand)]
        command: commands::stores::StoreCommands,
    },
    /// Background job status
    Jobs {
        #[command(subcommand)]
        command: commands::jobs::JobCommands,
    },
    /// Store diagnostic reports
    #[command(name = "x-report")]
    XReport {
        #[command(subcommand)]
        command: commands::reports::XReportCommands,
    },
    /// Before/after comparison reports
    #[command(name = "y-report")]
    YReport {
        #[command(subcommand)]
        command: commands::reports::YReportCommands,
    },
    /// Agent simulations
    Simulation {
        #[command(subcommand)]
        command: commands::simulations::SimulationCommands,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();

    let ctx = commands::Context::new(cli.base_url, cli.locale, cli.compact);

    match cli.command {
        Commands::Stores { command } => commands::stores::execute(&ctx, command).await,
        Commands::Jobs { command } => commands::jobs::execute(&ctx, command).await,
        Commands::XReport { command } => commands::reports::execute_x(&ctx, command).await,
        Commands::YReport { command } => commands::reports::execute_y(&ctx, command).await,
        Commands::Simulation { command } => commands::simulations::execute(&ctx, command).await,
    }
}
