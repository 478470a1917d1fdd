use std::{fmt, time::Duration};

use chrono::{DateTime, Utc};
use serde::Serialize;
use solana_client::client_error::ClientError as RpcClientError;
use solana_sdk::{
    instruction::Instruction,
    native_token::lamports_to_sol,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
};

/// Errors raised while planning or submitting a voting tracker run
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connectivity(String),

    #[error("Funding error: {0}")]
    Funding(String),

    #[error("Address derivation failed: {0}")]
    Derivation(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("RPC call `{operation}` failed: {source}")]
    Rpc {
        operation: &'static str,
        #[source]
        source: Box<RpcClientError>,
    },

    #[error("RPC call `{operation}` timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ClientError {
    pub fn rpc(operation: &'static str, source: RpcClientError) -> Self {
        Self::Rpc { operation, source: Box::new(source) }
    }
}

/// Which setup steps a run needs, decided once from the two existence checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanState {
    /// Fresh votes account; the tracker almost always needs initializing too.
    NeedsVotesCreation { initialize_tracker: bool },
    NeedsTrackerInit,
    Ready,
}

impl PlanState {
    pub fn from_checks(votes_is_fresh: bool, tracker_exists: bool) -> Self {
        match (votes_is_fresh, tracker_exists) {
            (true, tracker_exists) => PlanState::NeedsVotesCreation {
                initialize_tracker: !tracker_exists,
            },
            (false, false) => PlanState::NeedsTrackerInit,
            (false, true) => PlanState::Ready,
        }
    }

    pub fn requires_creation(self) -> bool {
        matches!(self, PlanState::NeedsVotesCreation { .. })
    }

    pub fn requires_initialization(self) -> bool {
        matches!(
            self,
            PlanState::NeedsVotesCreation { initialize_tracker: true } | PlanState::NeedsTrackerInit
        )
    }
}

impl fmt::Display for PlanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanState::NeedsVotesCreation { initialize_tracker: true } => {
                write!(f, "create votes account + initialize tracker")
            }
            PlanState::NeedsVotesCreation { initialize_tracker: false } => {
                write!(f, "create votes account")
            }
            PlanState::NeedsTrackerInit => write!(f, "initialize tracker"),
            PlanState::Ready => write!(f, "ready"),
        }
    }
}

/// Ordered instructions submitted atomically, plus any signers beyond the payer.
#[derive(Debug, Default)]
pub struct TransactionBatch {
    instructions: Vec<Instruction>,
    extra_signers: Vec<Keypair>,
}

impl TransactionBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(instruction: Instruction) -> Self {
        Self { instructions: vec![instruction], extra_signers: Vec::new() }
    }

    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    pub fn add_signer(&mut self, signer: Keypair) {
        self.extra_signers.push(signer);
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn extra_signers(&self) -> &[Keypair] {
        &self.extra_signers
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Payer first, then the extra signers in the order they were added.
    pub fn signer_pubkeys(&self, payer: &Pubkey) -> Vec<Pubkey> {
        std::iter::once(*payer)
            .chain(self.extra_signers.iter().map(|kp| kp.pubkey()))
            .collect()
    }

    pub fn invokes(&self, program_id: &Pubkey) -> bool {
        self.instructions.iter().any(|ix| ix.program_id == *program_id)
    }
}

/// Payer balance snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Balance {
    pub lamports: u64,
}

impl Balance {
    pub fn sol(&self) -> f64 {
        lamports_to_sol(self.lamports)
    }
}

/// Balance before the run minus balance after it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cost {
    pub lamports: i64,
    pub sol: f64,
}

impl Cost {
    pub fn zero() -> Self {
        Self { lamports: 0, sol: 0.0 }
    }

    /// Saturates at the `i64` range; `sol` is derived from the lamport delta.
    pub fn between(before: Balance, after: Balance) -> Self {
        let delta = i128::from(before.lamports) - i128::from(after.lamports);
        let lamports = i64::try_from(delta).unwrap_or(if delta < 0 { i64::MIN } else { i64::MAX });
        let sol = lamports_to_sol(lamports.unsigned_abs());
        Self {
            lamports,
            sol: if lamports < 0 { -sol } else { sol },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Completed {
        setup_signature: Option<String>,
        hello_signature: String,
    },
    NotDeployed {
        program: String,
    },
}

impl RunStatus {
    pub fn completed(setup: Option<Signature>, hello: Signature) -> Self {
        RunStatus::Completed {
            setup_signature: setup.map(|sig| sig.to_string()),
            hello_signature: hello.to_string(),
        }
    }
}

/// Summary of one run, printed at the end
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub payer: String,
    pub votes: String,
    pub tracker: String,
    pub authority: String,
    pub plan: PlanState,
    pub batch_len: usize,
    #[serde(flatten)]
    pub status: RunStatus,
    pub cost: Cost,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn is_completed(&self) -> bool {
        matches!(self.status, RunStatus::Completed { .. })
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Payer:     {}", self.payer)?;
        writeln!(f, "Votes:     {}", self.votes)?;
        writeln!(f, "Tracker:   {}", self.tracker)?;
        writeln!(f, "Authority: {}", self.authority)?;
        writeln!(f, "Plan:      {}", self.plan)?;
        match &self.status {
            RunStatus::Completed { setup_signature, hello_signature } => {
                if let Some(sig) = setup_signature {
                    writeln!(f, "Setup tx:  {}", sig)?;
                }
                writeln!(f, "Hello tx:  {}", hello_signature)?;
                write!(
                    f,
                    "\nIt cost:\n\t{} SOL\n\t{} Lamports\nto perform the call",
                    self.cost.sol, self.cost.lamports
                )
            }
            RunStatus::NotDeployed { program } => {
                write!(f, "\nProgram {} not deployed!", program)
            }
        }
    }
}
