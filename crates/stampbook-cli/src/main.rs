//! # stampbook CLI entry point
//!
//! Parses command-line arguments, sets up logging, and dispatches to the
//! subcommand handlers in `stampbook_cli`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use stampbook_cli::context::Session;
use stampbook_cli::customer::{run_customer, CustomerArgs};
use stampbook_cli::ledger::{
    run_progress, run_reward, run_stamp, run_summary, ProgressArgs, RewardArgs, StampArgs,
    SummaryArgs,
};
use stampbook_cli::migrate::{run_migrate, MigrateArgs};

/// Loyalty stamp tracker.
///
/// Registers customers, records stamps per purchase, redeems rewards once a
/// card is full, and repairs legacy customer records.
#[derive(Parser, Debug)]
#[command(name = "stampbook", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Path to the YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the customer store (overrides `store_path` in the config).
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register, show and list customers.
    Customer(CustomerArgs),

    /// Add or remove stamps.
    Stamp(StampArgs),

    /// Redeem rewards.
    Reward(RewardArgs),

    /// Show progress towards the next reward.
    Progress(ProgressArgs),

    /// Normalize legacy identity records.
    Migrate(MigrateArgs),

    /// Collection-wide totals.
    Summary(SummaryArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "stampbook starting");

    let result = Session::open(cli.config.as_deref(), cli.store.clone()).and_then(|session| {
        match &cli.command {
            Commands::Customer(args) => run_customer(args, &session),
            Commands::Stamp(args) => run_stamp(args, &session),
            Commands::Reward(args) => run_reward(args, &session),
            Commands::Progress(args) => run_progress(args, &session),
            Commands::Migrate(args) => run_migrate(args, &session),
            Commands::Summary(args) => run_summary(args, &session),
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("ERROR: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// `RUST_LOG` wins when set; otherwise the verbosity count picks the level.
fn init_tracing(verbose: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbose)));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
