//! Payer funding and balance queries

use solana_sdk::pubkey::Pubkey;

use crate::config::FundingPolicy;
use crate::runner::types::{Balance, ClientError};
use crate::services::ledger::Ledger;

pub async fn get_balance(ledger: &dyn Ledger, pubkey: &Pubkey) -> Result<Balance, ClientError> {
    Ok(Balance { lamports: ledger.get_balance(pubkey).await? })
}

/// Make sure `payer` holds at least `policy.minimum_balance` lamports,
/// airdropping when it does not. Returns the balance after any top-up.
pub async fn establish_enough_sol(
    ledger: &dyn Ledger,
    payer: &Pubkey,
    policy: &FundingPolicy,
) -> Result<Balance, ClientError> {
    let balance = get_balance(ledger, payer).await?;
    if balance.lamports >= policy.minimum_balance {
        tracing::info!("💰 Payer {} holds {} SOL, no airdrop needed", payer, balance.sol());
        return Ok(balance);
    }

    let shortfall = policy.minimum_balance - balance.lamports;
    let amount = policy.airdrop_lamports.max(shortfall);
    tracing::info!("🪂 Payer {} holds {} lamports, requesting airdrop of {}", payer, balance.lamports, amount);

    let signature = ledger.request_airdrop(payer, amount).await?;
    ledger.confirm_signature(&signature).await?;
    tracing::debug!("Airdrop {} confirmed", signature);

    let topped_up = get_balance(ledger, payer).await?;
    if topped_up.lamports < policy.minimum_balance {
        return Err(ClientError::Funding(format!(
            "payer {} holds {} lamports after airdrop, need at least {}",
            payer, topped_up.lamports, policy.minimum_balance
        )));
    }

    tracing::info!("💰 Payer {} funded: {} SOL", payer, topped_up.sol());
    Ok(topped_up)
}
