//! Program artifact and deployment checks

use std::path::Path;

use solana_sdk::{
    pubkey::Pubkey,
    signature::{read_keypair_file, Signer},
};

use crate::runner::types::ClientError;
use crate::services::ledger::Ledger;

/// Read the program keypair written by `cargo build-sbf` and return the
/// program id. A missing file means the program has not been built.
pub fn check_binary_exists(keypair_path: &Path) -> Result<Pubkey, ClientError> {
    let keypair = read_keypair_file(keypair_path).map_err(|e| {
        ClientError::Configuration(format!(
            "failed to read program keypair from {}: {}. Build the program first",
            keypair_path.display(),
            e
        ))
    })?;
    Ok(keypair.pubkey())
}

/// `true` when the program account exists and is marked executable.
pub async fn check_account_deployed(ledger: &dyn Ledger, program_id: &Pubkey) -> Result<bool, ClientError> {
    let deployed = ledger
        .get_account(program_id)
        .await?
        .map(|account| account.executable)
        .unwrap_or(false);
    tracing::debug!("Program {} deployed: {}", program_id, deployed);
    Ok(deployed)
}
