//! Transport abstraction.

use async_trait::async_trait;
use solana_sdk::account::Account;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use thiserror::Error;

/// Failure from the transport collaborator.
///
/// `retryable` separates transient conditions (connection drops, timeouts)
/// from permanent ones (malformed request, node rejection). The orchestrator
/// re-attempts retryable failures with a fresh blockhash, up to its
/// configured bound.
#[derive(Debug, Error, Clone)]
#[error("{detail}")]
pub struct TransportError {
    pub retryable: bool,
    pub detail: String,
}

impl TransportError {
    pub fn retryable(detail: impl Into<String>) -> Self {
        TransportError {
            retryable: true,
            detail: detail.into(),
        }
    }

    pub fn permanent(detail: impl Into<String>) -> Self {
        TransportError {
            retryable: false,
            detail: detail.into(),
        }
    }
}

/// Terminal verdict for a sent transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// Landed and executed successfully.
    Confirmed,
    /// Landed and failed; the ledger's error rendering is preserved.
    Failed(String),
    /// Not observed within the confirmation window; its fate is unknown.
    Timeout,
}

/// Minimal ledger surface the client needs.
///
/// Submission alone proves nothing; `confirm_transaction` must deliver a
/// terminal [`Confirmation`] before any operation reports success.
#[async_trait]
pub trait LedgerConnection: Send + Sync {
    /// Fetch raw account data, `None` when the account does not exist.
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, TransportError>;

    /// A fresh transaction expiry token.
    async fn latest_blockhash(&self) -> Result<Hash, TransportError>;

    /// Submit a signed transaction.
    async fn send_transaction(&self, transaction: &Transaction)
        -> Result<Signature, TransportError>;

    /// Await a terminal verdict for `signature`.
    async fn confirm_transaction(
        &self,
        signature: &Signature,
    ) -> Result<Confirmation, TransportError>;
}

#[async_trait]
impl<C: LedgerConnection + ?Sized> LedgerConnection for std::sync::Arc<C> {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, TransportError> {
        (**self).get_account(address).await
    }

    async fn latest_blockhash(&self) -> Result<Hash, TransportError> {
        (**self).latest_blockhash().await
    }

    async fn send_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, TransportError> {
        (**self).send_transaction(transaction).await
    }

    async fn confirm_transaction(
        &self,
        signature: &Signature,
    ) -> Result<Confirmation, TransportError> {
        (**self).confirm_transaction(signature).await
    }
}
