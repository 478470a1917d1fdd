//! Configuration module for environment variables and application settings

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use anchor_client::Cluster;
use anyhow::{anyhow, Context, Result};
use solana_sdk::{commitment_config::CommitmentConfig, native_token::LAMPORTS_PER_SOL};

#[derive(Debug, Clone)]
pub struct Config {
    /// Cluster moniker (`localnet`, `devnet`, ...) or RPC URL
    pub cluster: Cluster,

    /// Commitment used for reads, airdrop confirmation and transaction confirmation
    pub commitment: CommitmentConfig,

    /// Upper bound on every single RPC call except transaction submission
    pub rpc_timeout: Duration,

    /// Upper bound on send-and-confirm. Must cover the confirmation window,
    /// which lasts until the transaction's blockhash expires.
    pub submit_timeout: Duration,

    pub programs: ProgramPaths,

    pub funding: FundingPolicy,
}

/// Build artifacts produced by `cargo build-sbf` for the two programs.
#[derive(Debug, Clone)]
pub struct ProgramPaths {
    pub deploy_dir: PathBuf,
}

impl ProgramPaths {
    pub fn voting_so(&self) -> PathBuf {
        self.deploy_dir.join("voting.so")
    }

    pub fn voting_keypair(&self) -> PathBuf {
        self.deploy_dir.join("voting-keypair.json")
    }

    pub fn tracker_keypair(&self) -> PathBuf {
        self.deploy_dir.join("votingtracker-keypair.json")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FundingPolicy {
    /// Payer must hold at least this many lamports before a run
    pub minimum_balance: u64,
    /// Airdrop size when topping up
    pub airdrop_lamports: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let cluster_raw = lookup("SOLANA_CLUSTER").unwrap_or_else(|| "localnet".to_string());
        let cluster = Cluster::from_str(&cluster_raw)
            .map_err(|e| anyhow!("SOLANA_CLUSTER `{}` is not a cluster or URL: {}", cluster_raw, e))?;

        let commitment = match lookup("COMMITMENT").as_deref() {
            None | Some("confirmed") => CommitmentConfig::confirmed(),
            Some("processed") => CommitmentConfig::processed(),
            Some("finalized") => CommitmentConfig::finalized(),
            Some(other) => {
                return Err(anyhow!(
                    "COMMITMENT must be processed, confirmed or finalized, got `{}`",
                    other
                ));
            }
        };

        Ok(Self {
            cluster,
            commitment,
            rpc_timeout: Duration::from_secs(parse_or(&lookup, "RPC_TIMEOUT_SECS", 60)?),
            submit_timeout: Duration::from_secs(parse_or(&lookup, "SUBMIT_TIMEOUT_SECS", 180)?),
            programs: ProgramPaths {
                deploy_dir: lookup("PROGRAM_DEPLOY_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("target/deploy")),
            },
            funding: FundingPolicy {
                minimum_balance: parse_or(&lookup, "MIN_PAYER_BALANCE_LAMPORTS", LAMPORTS_PER_SOL)?,
                airdrop_lamports: parse_or(&lookup, "AIRDROP_LAMPORTS", 2 * LAMPORTS_PER_SOL)?,
            },
        })
    }
}

fn parse_or<F>(lookup: &F, key: &str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{} must be an unsigned integer, got `{}`", key, raw)),
        None => Ok(default),
    }
}
