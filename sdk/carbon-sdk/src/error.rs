//! Client error taxonomy.
//!
//! Two channels, deliberately kept apart: conditions that abort an operation
//! before a business verdict exists come back as `Err(ClientError)`;
//! expected business rejections travel inside
//! [`SubmissionOutcome::Rejected`](crate::types::SubmissionOutcome) as
//! [`RejectReason`](crate::policy::RejectReason) values and are part of the
//! happy API surface.

use carbon_interface::WireError;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::core::connection::TransportError;
use crate::core::signer::SignerError;
use crate::policy::RejectReason;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Wire-layer failure: bad seeds, malformed data, drifted
    /// discriminator table. Fatal, never retried.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// The deployment has no GlobalState for the configured admin.
    #[error("program not initialized for admin {admin}")]
    NotInitialized { admin: Pubkey },

    /// No ActionType registered under this slug.
    #[error("unknown action type `{0}`")]
    UnknownActionType(String),

    /// No submission record at this address.
    #[error("no submission at {0}")]
    SubmissionNotFound(Pubkey),

    /// The derived slug is taken by a different action type. Invariant
    /// guard for 16-byte prefix collisions.
    #[error("slug `{slug}` already registered with name `{existing}`")]
    SlugCollision { slug: String, existing: String },

    /// The signer's key does not match the configured deployment admin.
    #[error("signer {actual} is not the configured admin {expected}")]
    AdminMismatch { expected: Pubkey, actual: Pubkey },

    /// The user declined to sign.
    #[error("signature request rejected")]
    SignerRejected,

    #[error("signer unavailable: {0}")]
    SignerUnavailable(String),

    /// Transport failure outside the submission pipeline (reads, admin
    /// flows). Inside the pipeline the same condition is reported as
    /// `SubmissionOutcome::TransportFailure`.
    #[error("transport failure (retryable: {retryable}): {detail}")]
    Transport { retryable: bool, detail: String },

    /// A business rejection surfaced through an admin flow, where there is
    /// no outcome value to carry it.
    #[error("rejected: {0}")]
    Rejected(RejectReason),
}

impl From<TransportError> for ClientError {
    fn from(error: TransportError) -> Self {
        ClientError::Transport {
            retryable: error.retryable,
            detail: error.detail,
        }
    }
}

impl From<SignerError> for ClientError {
    fn from(error: SignerError) -> Self {
        match error {
            SignerError::Rejected => ClientError::SignerRejected,
            SignerError::Unavailable(detail) => ClientError::SignerUnavailable(detail),
        }
    }
}
