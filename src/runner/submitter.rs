use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};

use crate::onchain_instance::instructions::build_hello;
use crate::runner::types::{ClientError, TransactionBatch};
use crate::services::ledger::Ledger;

/// Signs batches with the payer plus any extra signers and waits for
/// confirmation. Failures are returned as-is; there is no retry here.
pub struct Submitter<'a> {
    ledger: &'a dyn Ledger,
}

impl<'a> Submitter<'a> {
    pub fn new(ledger: &'a dyn Ledger) -> Self {
        Self { ledger }
    }

    pub async fn submit(&self, batch: &TransactionBatch, payer: &Keypair) -> Result<Signature, ClientError> {
        if batch.is_empty() {
            return Err(ClientError::InvalidArgument("refusing to submit an empty batch".to_string()));
        }

        let mut signers: Vec<&Keypair> = vec![payer];
        signers.extend(batch.extra_signers());

        let mut transaction = Transaction::new_with_payer(batch.instructions(), Some(&payer.pubkey()));
        let blockhash = self.ledger.get_latest_blockhash().await?;
        transaction
            .try_sign(&signers, blockhash)
            .map_err(|e| ClientError::Signing(e.to_string()))?;

        tracing::debug!(
            "Submitting {} instruction(s) signed by {:?}",
            batch.len(),
            batch.signer_pubkeys(&payer.pubkey())
        );
        let signature = self.ledger.send_and_confirm_transaction(&transaction).await?;
        tracing::info!("✅ Transaction confirmed: {}", signature);
        Ok(signature)
    }

    /// Send the no-op hello instruction to `program_id`.
    pub async fn say_hello(&self, program_id: &Pubkey, payer: &Keypair) -> Result<Signature, ClientError> {
        tracing::info!("👋 Saying hello to {}", program_id);
        self.submit(&TransactionBatch::single(build_hello(program_id)), payer)
            .await
    }
}
