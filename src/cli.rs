//! Command-line surface: `voting-tracker-client [VOTES_ADDRESS] [PAYER_KEYPAIR]`

use std::{path::PathBuf, str::FromStr};

use clap::{Parser, ValueEnum};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair},
};

use crate::onchain_instance::instructions::Vote;
use crate::runner::types::ClientError;

#[derive(Debug, Parser)]
#[command(name = "voting-tracker-client", version, about = "Drive the voting tracker program from the command line")]
pub struct Cli {
    /// Existing votes account. A new one is created when omitted
    #[arg(value_parser = parse_pubkey)]
    pub votes_address: Option<Pubkey>,

    /// Payer keypair file. An ephemeral payer is generated (and airdropped) when omitted
    pub payer_keypair: Option<PathBuf>,

    /// Also cast a vote through the tracker in the setup transaction
    #[arg(long, value_enum)]
    pub vote: Option<VoteChoice>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Display)]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VoteChoice {
    Approve,
    Reject,
}

impl From<VoteChoice> for Vote {
    fn from(choice: VoteChoice) -> Self {
        match choice {
            VoteChoice::Approve => Vote::Approve,
            VoteChoice::Reject => Vote::Reject,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Display,
    Json,
}

impl Cli {
    pub fn load_payer(&self) -> Result<Keypair, ClientError> {
        match &self.payer_keypair {
            Some(path) => {
                let payer = read_keypair_file(path).map_err(|e| {
                    ClientError::Configuration(format!("failed to read payer keypair {}: {}", path.display(), e))
                })?;
                tracing::info!("🔑 Loaded payer keypair from {}", path.display());
                Ok(payer)
            }
            None => {
                tracing::info!("🔑 No payer keypair given, generating an ephemeral one");
                Ok(Keypair::new())
            }
        }
    }
}

fn parse_pubkey(raw: &str) -> Result<Pubkey, String> {
    Pubkey::from_str(raw).map_err(|e| format!("`{}` is not a valid address: {}", raw, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_means_fresh_everything() {
        let cli = Cli::try_parse_from(["voting-tracker-client"]).unwrap();

        assert!(cli.votes_address.is_none());
        assert!(cli.payer_keypair.is_none());
        assert!(cli.vote.is_none());
        assert_eq!(cli.output, OutputFormat::Display);
    }

    #[test]
    fn positional_votes_and_payer() {
        let votes = Pubkey::new_unique();
        let votes_arg = votes.to_string();
        let cli = Cli::try_parse_from([
            "voting-tracker-client",
            votes_arg.as_str(),
            "/tmp/payer.json",
            "--vote",
            "reject",
            "--output",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.votes_address, Some(votes));
        assert_eq!(cli.payer_keypair, Some(PathBuf::from("/tmp/payer.json")));
        assert_eq!(cli.vote.map(Vote::from), Some(Vote::Reject));
        assert_eq!(cli.output, OutputFormat::Json);
    }

    #[test]
    fn malformed_votes_address_is_rejected() {
        assert!(Cli::try_parse_from(["voting-tracker-client", "not-a-pubkey"]).is_err());
    }

    #[test]
    fn unreadable_payer_is_a_configuration_error() {
        let votes_arg = Pubkey::new_unique().to_string();
        let cli =
            Cli::try_parse_from(["voting-tracker-client", votes_arg.as_str(), "/nonexistent/payer.json"])
                .unwrap();

        assert!(matches!(cli.load_payer(), Err(ClientError::Configuration(_))));
    }
}
