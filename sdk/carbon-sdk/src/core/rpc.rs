//! JSON-RPC transport over `solana-client`.

use std::time::Duration;

use async_trait::async_trait;
use solana_client::client_error::{ClientError as RpcClientError, ClientErrorKind};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;

use crate::config::ClientConfig;
use crate::core::connection::{Confirmation, LedgerConnection, TransportError};

/// [`LedgerConnection`] backed by a JSON-RPC node.
pub struct RpcConnection {
    rpc: RpcClient,
    poll_interval: Duration,
    confirm_timeout: Duration,
}

impl RpcConnection {
    pub fn new(url: impl Into<String>) -> Self {
        let config = ClientConfig {
            rpc_url: url.into(),
            ..ClientConfig::default()
        };
        Self::from_config(&config)
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        let commitment = parse_commitment(&config.commitment);
        RpcConnection {
            rpc: RpcClient::new_with_commitment(config.rpc_url.clone(), commitment),
            poll_interval: Duration::from_millis(config.confirm_poll_ms),
            confirm_timeout: Duration::from_secs(config.confirm_timeout_secs),
        }
    }
}

fn parse_commitment(label: &str) -> CommitmentConfig {
    match label {
        "processed" => CommitmentConfig::processed(),
        "finalized" => CommitmentConfig::finalized(),
        _ => CommitmentConfig::confirmed(),
    }
}

/// IO-level interruptions are worth a fresh-blockhash retry; everything the
/// node actively rejected is not.
fn map_rpc_error(error: RpcClientError) -> TransportError {
    let retryable = matches!(
        error.kind,
        ClientErrorKind::Io(_) | ClientErrorKind::Reqwest(_)
    );
    TransportError {
        retryable,
        detail: error.to_string(),
    }
}

#[async_trait]
impl LedgerConnection for RpcConnection {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, TransportError> {
        self.rpc
            .get_account_with_commitment(address, self.rpc.commitment())
            .await
            .map(|response| response.value)
            .map_err(map_rpc_error)
    }

    async fn latest_blockhash(&self) -> Result<Hash, TransportError> {
        self.rpc.get_latest_blockhash().await.map_err(map_rpc_error)
    }

    async fn send_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, TransportError> {
        self.rpc
            .send_transaction(transaction)
            .await
            .map_err(map_rpc_error)
    }

    async fn confirm_transaction(
        &self,
        signature: &Signature,
    ) -> Result<Confirmation, TransportError> {
        let deadline = tokio::time::Instant::now() + self.confirm_timeout;
        loop {
            let statuses = self
                .rpc
                .get_signature_statuses(&[*signature])
                .await
                .map_err(map_rpc_error)?;
            if let Some(status) = statuses.value.into_iter().next().flatten() {
                if let Some(err) = status.err {
                    return Ok(Confirmation::Failed(err.to_string()));
                }
                if status.satisfies_commitment(self.rpc.commitment()) {
                    return Ok(Confirmation::Confirmed);
                }
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(Confirmation::Timeout);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
