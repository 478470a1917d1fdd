//! Client-side builders for the voting and tracker program instructions.
//!
//! The tracker program reads its accounts positionally, so every builder takes
//! a struct with named fields and lays the metas out in one fixed order.

use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_instruction,
    system_program,
};

/// Space allocated for a votes account owned by the voting program.
pub const VOTES_ACCOUNT_SPACE: usize = 51;

/// Tracker program instruction tags (single-byte payloads).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TrackerInstruction {
    Initialize = 0,
    Approve = 1,
    Reject = 2,
}

impl TrackerInstruction {
    pub fn opcode(self) -> u8 {
        self as u8
    }
}

/// A vote cast through the tracker program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Approve,
    Reject,
}

impl From<Vote> for TrackerInstruction {
    fn from(vote: Vote) -> Self {
        match vote {
            Vote::Approve => TrackerInstruction::Approve,
            Vote::Reject => TrackerInstruction::Reject,
        }
    }
}

/// Accounts for `TrackerInstruction::Initialize`.
///
/// 0. `[writable]` tracker
/// 1. `[signer]` user
/// 2. `[]` authority
/// 3. `[]` votes
/// 4. `[]` system program
#[derive(Debug, Clone, Copy)]
pub struct InitializeAccounts {
    pub tracker: Pubkey,
    pub user: Pubkey,
    pub authority: Pubkey,
    pub votes: Pubkey,
}

impl InitializeAccounts {
    fn to_account_metas(&self) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.tracker, false),
            AccountMeta::new_readonly(self.user, true),
            AccountMeta::new_readonly(self.authority, false),
            AccountMeta::new_readonly(self.votes, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ]
    }
}

/// Accounts for the vote instructions (`Approve` / `Reject`).
///
/// 0. `[writable]` tracker
/// 1. `[signer]` user
/// 2. `[]` voting program
/// 3. `[writable]` votes
/// 4. `[]` authority
#[derive(Debug, Clone, Copy)]
pub struct VoteAccounts {
    pub tracker: Pubkey,
    pub user: Pubkey,
    pub voting_program: Pubkey,
    pub votes: Pubkey,
    pub authority: Pubkey,
}

impl VoteAccounts {
    fn to_account_metas(&self) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.tracker, false),
            AccountMeta::new_readonly(self.user, true),
            AccountMeta::new_readonly(self.voting_program, false),
            AccountMeta::new(self.votes, false),
            AccountMeta::new_readonly(self.authority, false),
        ]
    }
}

pub fn build_initialize(accounts: &InitializeAccounts, tracker_program: &Pubkey) -> Instruction {
    Instruction::new_with_bytes(
        *tracker_program,
        &[TrackerInstruction::Initialize.opcode()],
        accounts.to_account_metas(),
    )
}

/// Approve vote, tag `1`.
pub fn build_increment(accounts: &VoteAccounts, tracker_program: &Pubkey) -> Instruction {
    build_vote(accounts, Vote::Approve, tracker_program)
}

pub fn build_reject(accounts: &VoteAccounts, tracker_program: &Pubkey) -> Instruction {
    build_vote(accounts, Vote::Reject, tracker_program)
}

fn build_vote(accounts: &VoteAccounts, vote: Vote, tracker_program: &Pubkey) -> Instruction {
    Instruction::new_with_bytes(
        *tracker_program,
        &[TrackerInstruction::from(vote).opcode()],
        accounts.to_account_metas(),
    )
}

/// System `create_account` for a fresh votes account, rent-exempt and owned by
/// the voting program.
pub fn build_create_votes_account(
    payer: &Pubkey,
    votes: &Pubkey,
    rent_exempt_lamports: u64,
    voting_program: &Pubkey,
) -> Instruction {
    system_instruction::create_account(
        payer,
        votes,
        rent_exempt_lamports,
        VOTES_ACCOUNT_SPACE as u64,
        voting_program,
    )
}

/// No accounts, no data. The voting program just logs on receipt.
pub fn build_hello(voting_program: &Pubkey) -> Instruction {
    Instruction::new_with_bytes(*voting_program, &[], vec![])
}
