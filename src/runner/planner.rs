//! Transaction planner
//!
//! Decides which setup instructions a run needs from two existence checks
//! (votes account, tracker account) and assembles them into one atomic batch.

use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};

use crate::onchain_instance::{
    instructions::{
        build_create_votes_account, build_increment, build_initialize, build_reject,
        InitializeAccounts, Vote, VoteAccounts, VOTES_ACCOUNT_SPACE,
    },
    pda::{derive_authority, derive_tracker},
};
use crate::runner::types::{ClientError, PlanState, TransactionBatch};
use crate::services::ledger::Ledger;

/// Ids of the two deployed programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramIds {
    pub voting: Pubkey,
    pub tracker: Pubkey,
}

/// Where the votes account comes from.
#[derive(Debug)]
pub enum VotesSource {
    Existing(Pubkey),
    /// Freshly generated; created in the same batch that first uses it.
    Fresh(Keypair),
}

impl VotesSource {
    pub fn resolve(address: Option<Pubkey>) -> Self {
        match address {
            Some(pubkey) => VotesSource::Existing(pubkey),
            None => VotesSource::Fresh(Keypair::new()),
        }
    }

    pub fn pubkey(&self) -> Pubkey {
        match self {
            VotesSource::Existing(pubkey) => *pubkey,
            VotesSource::Fresh(keypair) => keypair.pubkey(),
        }
    }
}

/// Output of one planning pass
#[derive(Debug)]
pub struct Plan {
    pub state: PlanState,
    pub votes: Pubkey,
    pub tracker: Pubkey,
    pub authority: Pubkey,
    pub batch: TransactionBatch,
}

pub struct Planner<'a> {
    ledger: &'a dyn Ledger,
    programs: ProgramIds,
}

impl<'a> Planner<'a> {
    pub fn new(ledger: &'a dyn Ledger, programs: ProgramIds) -> Self {
        Self { ledger, programs }
    }

    pub async fn plan(
        &self,
        payer: &Pubkey,
        votes: VotesSource,
        vote: Option<Vote>,
    ) -> Result<Plan, ClientError> {
        let votes_pubkey = votes.pubkey();
        let votes_is_fresh = match &votes {
            VotesSource::Fresh(_) => {
                tracing::info!("🆕 Generating new votes account {}", votes_pubkey);
                true
            }
            VotesSource::Existing(_) => {
                if !self.ledger.account_exists(&votes_pubkey).await? {
                    tracing::warn!("Votes account {} was supplied but does not exist", votes_pubkey);
                }
                false
            }
        };

        let tracker = derive_tracker(payer, &votes_pubkey, &self.programs.tracker)?;
        let authority = derive_authority(&votes_pubkey, &self.programs.tracker)?;
        tracing::info!("Tracker {} / authority {}", tracker, authority);

        let tracker_exists = self.ledger.account_exists(&tracker).await?;
        if !tracker_exists {
            tracing::info!("    -> No tracker account found. Creating new tracker account");
        }

        let state = PlanState::from_checks(votes_is_fresh, tracker_exists);
        tracing::debug!(
            "creation required: {}, initialization required: {}",
            state.requires_creation(),
            state.requires_initialization()
        );
        let mut batch = TransactionBatch::new();

        // Creation must come first: initialize reads the votes account in the same transaction.
        if let VotesSource::Fresh(keypair) = votes {
            let rent = self
                .ledger
                .get_minimum_balance_for_rent_exemption(VOTES_ACCOUNT_SPACE)
                .await?;
            batch.push(build_create_votes_account(payer, &votes_pubkey, rent, &self.programs.voting));
            batch.add_signer(keypair);
        }

        if state.requires_initialization() {
            let accounts = InitializeAccounts {
                tracker,
                user: *payer,
                authority,
                votes: votes_pubkey,
            };
            batch.push(build_initialize(&accounts, &self.programs.tracker));
        }

        if let Some(vote) = vote {
            let accounts = VoteAccounts {
                tracker,
                user: *payer,
                voting_program: self.programs.voting,
                votes: votes_pubkey,
                authority,
            };
            batch.push(match vote {
                Vote::Approve => build_increment(&accounts, &self.programs.tracker),
                Vote::Reject => build_reject(&accounts, &self.programs.tracker),
            });
        }

        tracing::info!("📋 Plan: {} ({} instruction(s))", state, batch.len());

        Ok(Plan { state, votes: votes_pubkey, tracker, authority, batch })
    }
}
