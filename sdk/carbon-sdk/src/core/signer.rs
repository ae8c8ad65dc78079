//! Signing abstraction.

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::transaction::Transaction;
use thiserror::Error;

/// Failure from the signing collaborator.
#[derive(Debug, Error, Clone)]
pub enum SignerError {
    /// The user declined the signature request. Never retried.
    #[error("signature request rejected")]
    Rejected,

    /// The signer cannot produce a signature right now (locked wallet,
    /// unreachable device).
    #[error("signer unavailable: {0}")]
    Unavailable(String),
}

/// An entity that can authorize transactions.
///
/// A local keypair in tests and scripts, a wallet adapter in applications.
/// The client hands over a fully built unsigned transaction and takes back a
/// signed one; key material never crosses the trait boundary.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    fn pubkey(&self) -> Pubkey;

    async fn sign_transaction(
        &self,
        transaction: Transaction,
    ) -> Result<Transaction, SignerError>;
}

/// In-process signer over a [`Keypair`].
pub struct KeypairSigner {
    keypair: Keypair,
}

impl KeypairSigner {
    pub fn new(keypair: Keypair) -> Self {
        KeypairSigner { keypair }
    }
}

#[async_trait]
impl TransactionSigner for KeypairSigner {
    fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    async fn sign_transaction(
        &self,
        mut transaction: Transaction,
    ) -> Result<Transaction, SignerError> {
        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_sign(&[&self.keypair], blockhash)
            .map_err(|e| SignerError::Unavailable(e.to_string()))?;
        Ok(transaction)
    }
}
