//! # Voting Tracker Client
//!
//! Command-line client for the on-chain voting tracker programs.
//!
//! ## What a run does
//! 1. Makes sure the payer is funded (airdrops when it is not)
//! 2. Creates a votes account unless one is passed in
//! 3. Derives the per-payer tracker account and initializes it when missing
//! 4. Submits the setup as one transaction, then says hello to the voting program
//! 5. Reports what the run cost the payer
//!
//! ## Environment Setup
//! Settings are read from the environment (or a `.env` file):
//! `SOLANA_CLUSTER`, `COMMITMENT`, `RPC_TIMEOUT_SECS`, `SUBMIT_TIMEOUT_SECS`,
//! `PROGRAM_DEPLOY_DIR`, `MIN_PAYER_BALANCE_LAMPORTS`, `AIRDROP_LAMPORTS`.
//!
//! ## Running
//! ```bash
//! cargo run -- [VOTES_ADDRESS] [PAYER_KEYPAIR] [--vote approve|reject]
//! ```

mod cli;
mod config;
mod onchain_instance;
mod runner;
mod services;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::runner::{run_session, ProgramIds, RunReport, SessionInputs, SessionSettings};
use crate::services::{deployment::check_binary_exists, RpcLedger};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Logs go to stderr so `--output json` stays clean on stdout
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    let cli = Cli::parse();
    tracing::info!("🏁 {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    match run(cli).await {
        Ok(()) => {}
        Err(err) => {
            tracing::error!("❌ {:#}", err);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    let payer = cli.load_payer()?;

    // Both programs must have been built before touching the ledger
    let programs = ProgramIds {
        voting: check_binary_exists(&config.programs.voting_keypair())?,
        tracker: check_binary_exists(&config.programs.tracker_keypair())?,
    };
    tracing::info!("Voting program {} / tracker program {}", programs.voting, programs.tracker);

    let ledger = RpcLedger::connect(&config).await?;

    let settings = SessionSettings {
        programs,
        funding: config.funding,
        voting_so_path: config.programs.voting_so(),
    };
    let inputs = SessionInputs {
        payer,
        votes: cli.votes_address,
        vote: cli.vote.map(Into::into),
    };
    let report = run_session(&ledger, &settings, inputs).await?;
    if !report.is_completed() {
        tracing::info!("Deploy the programs and run again");
    }

    print_report(&report, cli.output)
}

fn print_report(report: &RunReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Display => println!("{}", report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}
