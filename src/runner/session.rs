//! One end-to-end client run
//!
//! funding -> derivation -> existence checks -> batch assembly ->
//! deployment gate -> submission -> hello -> cost report.

use std::path::PathBuf;

use chrono::Utc;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};

use crate::config::FundingPolicy;
use crate::onchain_instance::instructions::Vote;
use crate::runner::planner::{Planner, ProgramIds, VotesSource};
use crate::runner::submitter::Submitter;
use crate::runner::types::{ClientError, Cost, RunReport, RunStatus, TransactionBatch};
use crate::services::{
    deployment::check_account_deployed,
    funding::{establish_enough_sol, get_balance},
    ledger::Ledger,
};

/// Per-invocation inputs, resolved from the command line.
pub struct SessionInputs {
    pub payer: Keypair,
    pub votes: Option<Pubkey>,
    pub vote: Option<Vote>,
}

/// Static run settings
pub struct SessionSettings {
    pub programs: ProgramIds,
    pub funding: FundingPolicy,
    /// Shown when the voting program is not deployed.
    pub voting_so_path: PathBuf,
}

pub async fn run_session(
    ledger: &dyn Ledger,
    settings: &SessionSettings,
    inputs: SessionInputs,
) -> Result<RunReport, ClientError> {
    let SessionInputs { payer, votes, vote } = inputs;
    let payer_pubkey = payer.pubkey();

    let start_balance = establish_enough_sol(ledger, &payer_pubkey, &settings.funding).await?;

    let plan = Planner::new(ledger, settings.programs)
        .plan(&payer_pubkey, VotesSource::resolve(votes), vote)
        .await?;

    // batch_len counts instructions actually submitted in the setup transaction
    let report = |status: RunStatus, batch_len: usize, cost: Cost| RunReport {
        payer: payer_pubkey.to_string(),
        votes: plan.votes.to_string(),
        tracker: plan.tracker.to_string(),
        authority: plan.authority.to_string(),
        plan: plan.state,
        batch_len,
        status,
        cost,
        finished_at: Utc::now(),
    };

    if let Some(missing) = first_undeployed(ledger, settings, &plan.batch).await? {
        tracing::warn!("🚫 {} not deployed, nothing submitted", missing);
        return Ok(report(RunStatus::NotDeployed { program: missing }, 0, Cost::zero()));
    }

    let submitter = Submitter::new(ledger);
    let setup_signature = if plan.batch.is_empty() {
        tracing::info!("Votes and tracker accounts already set up");
        None
    } else {
        Some(submitter.submit(&plan.batch, &payer).await?)
    };
    let hello_signature = submitter.say_hello(&settings.programs.voting, &payer).await?;

    let end_balance = get_balance(ledger, &payer_pubkey).await?;
    let cost = Cost::between(start_balance, end_balance);
    tracing::info!("💸 Run cost {} lamports", cost.lamports);

    Ok(report(
        RunStatus::completed(setup_signature, hello_signature),
        plan.batch.len(),
        cost,
    ))
}

/// The voting program is always invoked (hello); the tracker program only
/// when the batch carries tracker instructions.
async fn first_undeployed(
    ledger: &dyn Ledger,
    settings: &SessionSettings,
    batch: &TransactionBatch,
) -> Result<Option<String>, ClientError> {
    let programs = &settings.programs;
    if !check_account_deployed(ledger, &programs.voting).await? {
        return Ok(Some(settings.voting_so_path.display().to_string()));
    }
    if batch.invokes(&programs.tracker) && !check_account_deployed(ledger, &programs.tracker).await? {
        return Ok(Some(format!("tracker program {}", programs.tracker)));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use solana_sdk::{account::Account, system_program};

    use super::*;
    use crate::onchain_instance::pda::derive_tracker;
    use crate::runner::types::PlanState;
    use crate::services::ledger::mock::{MockLedger, FEE_PER_SIGNATURE};

    const SOL: u64 = 1_000_000_000;

    fn settings() -> SessionSettings {
        SessionSettings {
            programs: ProgramIds { voting: Pubkey::new_unique(), tracker: Pubkey::new_unique() },
            funding: FundingPolicy { minimum_balance: SOL, airdrop_lamports: 2 * SOL },
            voting_so_path: PathBuf::from("target/deploy/voting.so"),
        }
    }

    fn deployed(settings: &SessionSettings) -> MockLedger {
        MockLedger::new()
            .with_program(settings.programs.voting)
            .with_program(settings.programs.tracker)
    }

    #[tokio::test]
    async fn fresh_run_creates_initializes_and_says_hello() {
        let settings = settings();
        let ledger = deployed(&settings);
        let payer = Keypair::new();
        let payer_pubkey = payer.pubkey();

        let report = run_session(&ledger, &settings, SessionInputs { payer, votes: None, vote: None })
            .await
            .unwrap();

        assert_eq!(ledger.airdrops(), vec![(payer_pubkey, 2 * SOL)]);
        assert_eq!(report.plan, PlanState::NeedsVotesCreation { initialize_tracker: true });
        assert!(report.is_completed());

        let sent = ledger.sent();
        assert_eq!(sent.len(), 2);
        let setup = &sent[0];
        assert_eq!(setup.signatures.len(), 2);
        assert_eq!(setup.message.account_keys[0], payer_pubkey);
        assert_eq!(setup.message.account_keys[1].to_string(), report.votes);
        let programs: Vec<_> = setup
            .message
            .instructions
            .iter()
            .map(|ix| setup.message.account_keys[ix.program_id_index as usize])
            .collect();
        assert_eq!(programs, vec![system_program::ID, settings.programs.tracker]);

        let hello = &sent[1];
        assert_eq!(hello.signatures.len(), 1);
        assert_eq!(report.cost.lamports, 3 * FEE_PER_SIGNATURE as i64);
        assert!(report.cost.sol > 0.0);
    }

    #[tokio::test]
    async fn initialized_tracker_only_says_hello() {
        let settings = settings();
        let payer = Keypair::new();
        let votes = Pubkey::new_unique();
        let tracker = derive_tracker(&payer.pubkey(), &votes, &settings.programs.tracker).unwrap();
        let ledger = deployed(&settings)
            .with_balance(payer.pubkey(), 5 * SOL)
            .with_account(votes, Account::new(1, 51, &settings.programs.voting))
            .with_account(tracker, Account::new(1, 42, &settings.programs.tracker));

        let report = run_session(&ledger, &settings, SessionInputs { payer, votes: Some(votes), vote: None })
            .await
            .unwrap();

        assert_eq!(report.plan, PlanState::Ready);
        assert_eq!(report.batch_len, 0);
        assert!(ledger.airdrops().is_empty());
        let sent = ledger.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].signatures.len(), 1);
        match &report.status {
            RunStatus::Completed { setup_signature, .. } => assert!(setup_signature.is_none()),
            other => panic!("unexpected status {:?}", other),
        }
    }

    #[tokio::test]
    async fn undeployed_program_submits_nothing() {
        let settings = settings();
        let payer = Keypair::new();
        let votes = Pubkey::new_unique();
        let ledger = MockLedger::new()
            .with_balance(payer.pubkey(), 5 * SOL)
            .with_account(votes, Account::new(1, 51, &settings.programs.voting));

        let report = run_session(&ledger, &settings, SessionInputs { payer, votes: Some(votes), vote: None })
            .await
            .unwrap();

        assert!(ledger.sent().is_empty());
        assert_eq!(report.plan, PlanState::NeedsTrackerInit);
        assert_eq!(report.batch_len, 0);
        assert_eq!(report.cost, Cost::zero());
        assert_eq!(
            report.status,
            RunStatus::NotDeployed { program: "target/deploy/voting.so".to_string() }
        );
    }

    #[tokio::test]
    async fn undeployed_tracker_blocks_initialization() {
        let settings = settings();
        let ledger = MockLedger::new().with_program(settings.programs.voting);

        let report = run_session(
            &ledger,
            &settings,
            SessionInputs { payer: Keypair::new(), votes: None, vote: None },
        )
        .await
        .unwrap();

        assert!(ledger.sent().is_empty());
        assert!(matches!(report.status, RunStatus::NotDeployed { ref program } if program.contains("tracker")));
    }

    #[tokio::test]
    async fn vote_rides_in_setup_batch() {
        let settings = settings();
        let ledger = deployed(&settings);

        let report = run_session(
            &ledger,
            &settings,
            SessionInputs { payer: Keypair::new(), votes: None, vote: Some(Vote::Approve) },
        )
        .await
        .unwrap();

        assert_eq!(report.batch_len, 3);
        let setup = &ledger.sent()[0];
        assert_eq!(setup.message.instructions[2].data, vec![1]);
    }

    #[tokio::test]
    async fn rejected_setup_stops_before_hello() {
        let settings = settings();
        let ledger = deployed(&settings).with_failing_send();

        let err = run_session(
            &ledger,
            &settings,
            SessionInputs { payer: Keypair::new(), votes: None, vote: None },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ClientError::Rpc { operation: "send_and_confirm_transaction", .. }));
        let sent = ledger.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].signatures.len(), 2);
        assert_eq!(sent[0].message.instructions.len(), 2);
    }
}
