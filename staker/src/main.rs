//! Staker
//!
//! Splits a CPU stake budget across a list of receiver accounts and delegates
//! it chunk by chunk, resuming from the progress log after a restart.

mod accounts;
mod config;
mod runner;

use anyhow::{Context, Result};
use clap::Parser;
use config::BotConfiguration;
use staker_sdk::{HttpConnection, K1Signer, ProgressLedger, StakerSigner};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "staker", version, about = "Delegate CPU stake to a list of accounts")]
struct Cli {
    /// Path to the TOML configuration
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Receiver list, overrides `accounts_file`
    #[arg(long)]
    accounts: Option<PathBuf>,

    /// Progress log, overrides `done_file`
    #[arg(long)]
    done: Option<PathBuf>,

    /// More output per occurrence (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = BotConfiguration::load(&cli.config)?;
    if let Some(path) = cli.accounts {
        config.config.accounts_file = path;
    }
    if let Some(path) = cli.done {
        config.config.done_file = path;
    }
    info!(config = ?config.config, "Configuration loaded");

    let signer = K1Signer::from_string(&config.config.pkey).context("loading signing key")?;
    info!(public_key = %signer.public_key(), account = %config.config.account, "Signing as");

    let accounts = accounts::load_accounts(&config.config.accounts_file)?;
    let mut progress = ProgressLedger::open(&config.config.done_file)
        .with_context(|| format!("opening {}", config.config.done_file.display()))?;

    let connection = HttpConnection::new(config.config.wax_node.as_str());
    runner::run(&connection, &signer, &config, &accounts, &mut progress).await?;
    Ok(())
}
