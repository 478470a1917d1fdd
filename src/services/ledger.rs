//! Ledger access
//!
//! Every RPC call the client makes goes through the [`Ledger`] trait so the
//! planner and submitter can run against an in-memory ledger in tests.

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use solana_client::{client_error::Result as ClientResult, nonblocking::rpc_client::RpcClient};
use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::Transaction,
};
use tokio::time::timeout;

use crate::config::Config;
use crate::runner::types::ClientError;

#[async_trait]
pub trait Ledger: Send + Sync {
    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>, ClientError>;

    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, ClientError>;

    async fn get_minimum_balance_for_rent_exemption(&self, space: usize) -> Result<u64, ClientError>;

    async fn request_airdrop(&self, to: &Pubkey, lamports: u64) -> Result<Signature, ClientError>;

    /// Block until `signature` reaches the ledger's commitment level.
    async fn confirm_signature(&self, signature: &Signature) -> Result<(), ClientError>;

    async fn get_latest_blockhash(&self) -> Result<Hash, ClientError>;

    async fn send_and_confirm_transaction(&self, transaction: &Transaction) -> Result<Signature, ClientError>;

    async fn account_exists(&self, pubkey: &Pubkey) -> Result<bool, ClientError> {
        Ok(self.get_account(pubkey).await?.is_some())
    }
}

/// JSON-RPC backed ledger. Each call is bounded by `rpc_timeout`, except
/// send-and-confirm which gets `submit_timeout`.
pub struct RpcLedger {
    client: RpcClient,
    commitment: CommitmentConfig,
    rpc_timeout: Duration,
    submit_timeout: Duration,
}

impl RpcLedger {
    /// Connect to the configured cluster and make sure the node answers.
    pub async fn connect(config: &Config) -> Result<Self, ClientError> {
        let url = config.cluster.url().to_string();
        let ledger = Self {
            client: RpcClient::new_with_commitment(url.clone(), config.commitment),
            commitment: config.commitment,
            rpc_timeout: config.rpc_timeout,
            submit_timeout: config.submit_timeout,
        };

        let version = ledger
            .bounded("get_version", ledger.client.get_version())
            .await
            .map_err(|e| ClientError::Connectivity(format!("cannot reach {}: {}", url, e)))?;
        tracing::info!("🔗 Connection to cluster established: {} (version {})", url, version.solana_core);

        Ok(ledger)
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, ClientError>
    where
        F: Future<Output = ClientResult<T>>,
    {
        bounded_by(self.rpc_timeout, operation, fut).await
    }
}

async fn bounded_by<T, F>(limit: Duration, operation: &'static str, fut: F) -> Result<T, ClientError>
where
    F: Future<Output = ClientResult<T>>,
{
    match timeout(limit, fut).await {
        Ok(result) => result.map_err(|e| ClientError::rpc(operation, e)),
        Err(_) => Err(ClientError::Timeout { operation, after: limit }),
    }
}

#[async_trait]
impl Ledger for RpcLedger {
    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>, ClientError> {
        let response = self
            .bounded(
                "get_account",
                self.client.get_account_with_commitment(pubkey, self.commitment),
            )
            .await?;
        Ok(response.value)
    }

    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, ClientError> {
        let response = self
            .bounded(
                "get_balance",
                self.client.get_balance_with_commitment(pubkey, self.commitment),
            )
            .await?;
        Ok(response.value)
    }

    async fn get_minimum_balance_for_rent_exemption(&self, space: usize) -> Result<u64, ClientError> {
        self.bounded(
            "get_minimum_balance_for_rent_exemption",
            self.client.get_minimum_balance_for_rent_exemption(space),
        )
        .await
    }

    async fn request_airdrop(&self, to: &Pubkey, lamports: u64) -> Result<Signature, ClientError> {
        self.bounded("request_airdrop", self.client.request_airdrop(to, lamports))
            .await
    }

    async fn confirm_signature(&self, signature: &Signature) -> Result<(), ClientError> {
        self.bounded(
            "confirm_signature",
            self.client
                .poll_for_signature_with_commitment(signature, self.commitment),
        )
        .await
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, ClientError> {
        self.bounded("get_latest_blockhash", self.client.get_latest_blockhash())
            .await
    }

    async fn send_and_confirm_transaction(&self, transaction: &Transaction) -> Result<Signature, ClientError> {
        // Confirmation polls until the blockhash expires, which outlasts a plain RPC call
        bounded_by(
            self.submit_timeout,
            "send_and_confirm_transaction",
            self.client.send_and_confirm_transaction(transaction),
        )
        .await
    }
}


#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use solana_client::client_error::ClientErrorKind;

    use super::*;

    fn quick_ledger() -> RpcLedger {
        RpcLedger {
            client: RpcClient::new_with_commitment("http://127.0.0.1:1".to_string(), CommitmentConfig::confirmed()),
            commitment: CommitmentConfig::confirmed(),
            rpc_timeout: Duration::from_millis(10),
            submit_timeout: Duration::from_millis(20),
        }
    }

    #[tokio::test]
    async fn stalled_call_times_out_with_its_name() {
        let ledger = quick_ledger();

        let err = ledger
            .bounded("get_balance", std::future::pending::<ClientResult<u64>>())
            .await
            .unwrap_err();

        match err {
            ClientError::Timeout { operation, after } => {
                assert_eq!(operation, "get_balance");
                assert_eq!(after, Duration::from_millis(10));
            }
            other => panic!("expected a timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn submission_gets_its_own_bound() {
        let ledger = quick_ledger();

        let err = bounded_by(
            ledger.submit_timeout,
            "send_and_confirm_transaction",
            std::future::pending::<ClientResult<Signature>>(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            ClientError::Timeout { operation: "send_and_confirm_transaction", after }
                if after == Duration::from_millis(20)
        ));
    }

    #[tokio::test]
    async fn failed_call_keeps_operation_name() {
        let ledger = quick_ledger();
        let failing = async { Err(ClientErrorKind::Custom("node is behind".to_string()).into()) };

        let err = ledger.bounded::<u64, _>("get_balance", failing).await.unwrap_err();

        match &err {
            ClientError::Rpc { operation, .. } => assert_eq!(*operation, "get_balance"),
            other => panic!("expected an rpc error, got {:?}", other),
        }
        assert!(err.to_string().contains("node is behind"));
    }

    #[tokio::test]
    async fn unreachable_cluster_is_a_connectivity_error() {
        let vars: HashMap<&str, &str> =
            HashMap::from([("SOLANA_CLUSTER", "http://127.0.0.1:1"), ("RPC_TIMEOUT_SECS", "5")]);
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();

        let err = RpcLedger::connect(&config).await.err().unwrap();

        assert!(matches!(err, ClientError::Connectivity(_)));
    }
}
