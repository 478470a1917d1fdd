//! Program-derived addresses used by the voting tracker program.

use solana_sdk::pubkey::Pubkey;

use crate::runner::types::ClientError;

/// Derive the per-(user, votes) tracker account address.
///
/// Seeds are `[payer, votes]`, matching what the tracker program recomputes
/// when it validates the account passed to `initialize` and vote instructions.
pub fn derive_tracker(
    payer: &Pubkey,
    votes: &Pubkey,
    tracker_program: &Pubkey,
) -> Result<Pubkey, ClientError> {
    find_address(&[payer.as_ref(), votes.as_ref()], tracker_program, "tracker")
}

/// Derive the authority address the tracker program signs with when it calls
/// into the voting program on behalf of a votes account.
pub fn derive_authority(votes: &Pubkey, tracker_program: &Pubkey) -> Result<Pubkey, ClientError> {
    find_address(&[votes.as_ref()], tracker_program, "authority")
}

fn find_address(seeds: &[&[u8]], program_id: &Pubkey, label: &str) -> Result<Pubkey, ClientError> {
    Pubkey::try_find_program_address(seeds, program_id)
        .map(|(address, bump)| {
            tracing::debug!("Derived {} address {} (bump {})", label, address, bump);
            address
        })
        .ok_or_else(|| {
            ClientError::Derivation(format!(
                "no valid {} address for program {}",
                label, program_id
            ))
        })
}
