//! Views assembled from ledger reads and pipeline outcomes.

use carbon_interface::state::Member;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;

use crate::policy::RejectReason;

/// A member read that covers the not-yet-joined case explicitly.
///
/// Membership is account existence; `exists` is this client-side view, not
/// a stored field.
#[derive(Debug, Clone)]
pub struct MemberStatus {
    /// Derived member address for the owner.
    pub address: Pubkey,
    /// Whether the account exists on the ledger.
    pub exists: bool,
    /// Decoded record when it does.
    pub member: Option<Member>,
}

/// Terminal result of a mutating operation.
///
/// `Rejected` is an expected answer, not an error: it carries the business
/// reason whether it was produced by the local evaluator (before signing)
/// or mapped from the program's verdict.
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    /// The ledger confirmed the transaction.
    Confirmed { signature: Signature },
    /// The request was refused, locally or by the program.
    Rejected { reason: RejectReason },
    /// No terminal verdict could be obtained.
    TransportFailure { retryable: bool, detail: String },
}

impl SubmissionOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, SubmissionOutcome::Confirmed { .. })
    }

    pub fn signature(&self) -> Option<&Signature> {
        match self {
            SubmissionOutcome::Confirmed { signature } => Some(signature),
            _ => None,
        }
    }
}
