//! Typed views of the program's accounts.
//!
//! Account data on the wire is an 8-byte discriminator followed by borsh
//! fields in declaration order. Accounts are allocated with fixed space, so
//! decoding tolerates trailing zero padding; anything else that deviates
//! from the layout is malformed.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::discriminator::{account, DISCRIMINATOR_LEN};
use crate::error::WireError;
use crate::slug::Slug;

/// Program-wide tunables, admin controlled.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Params {
    pub paused: bool,
    /// Points a member may earn per rolling day window.
    pub daily_cap: u64,
    /// Fallback per-transaction amount cap for new action types.
    pub per_tx_cap_default: u64,
    /// Fallback cooldown for new action types.
    pub cooldown_secs_default: u32,
}

/// Singleton configuration account, one per admin key.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct GlobalState {
    pub admin: Pubkey,
    /// SPL mint for the points token.
    pub points_mint: Pubkey,
    /// Treasury token account.
    pub vault: Pubkey,
    /// Keys allowed to approve or reject submissions.
    pub verifiers: Vec<Pubkey>,
    pub params: Params,
    /// Stored PDA bump, reused by the program when signing.
    pub bump: u8,
}

impl GlobalState {
    pub fn is_verifier(&self, key: &Pubkey) -> bool {
        self.verifiers.contains(key)
    }
}

/// Measurement unit for an action category. Tags 0, 1, 2 on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum ActionUnit {
    Tree,
    Kilogram,
    Kilometer,
}

/// One registered action category, keyed by `(global, slug)`.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct ActionType {
    pub global: Pubkey,
    pub slug: Slug,
    /// Display name; may be longer than the 16 bytes the slug keeps.
    pub name: String,
    pub points_per_unit: u64,
    pub unit: ActionUnit,
    pub badge_uri: String,
    pub cooldown_secs: u32,
    pub per_tx_cap: u64,
}

/// Cooldown bookkeeping for one action category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct ActionStamp {
    pub slug: Slug,
    pub last_at: i64,
}

/// One participant.
///
/// Existence of the account is membership; there is no `exists` field on the
/// wire. The rate-limit fields are maintained by the program at submission
/// time and mirrored by the client-side evaluator.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Member {
    pub owner: Pubkey,
    pub points: u64,
    pub joined_at: i64,
    pub profile_uri: Option<String>,
    /// Last submission time per action category.
    pub last_action_at: Vec<ActionStamp>,
    /// Points accrued inside the current day window.
    pub points_earned_today: u64,
    /// Start of the current day window, unix seconds.
    pub day_window_start: i64,
}

impl Member {
    pub fn last_action_for(&self, slug: &Slug) -> Option<i64> {
        self.last_action_at
            .iter()
            .find(|stamp| stamp.slug == *slug)
            .map(|stamp| stamp.last_at)
    }

    pub fn record_action(&mut self, slug: Slug, at: i64) {
        match self
            .last_action_at
            .iter_mut()
            .find(|stamp| stamp.slug == slug)
        {
            Some(stamp) => stamp.last_at = at,
            None => self.last_action_at.push(ActionStamp { slug, last_at: at }),
        }
    }
}

/// Lifecycle state of a submission. Tags 0, 1, 2 on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum SubmissionStatus {
    Pending,
    Accepted,
    Rejected,
}

/// One submitted action, keyed by `(owner, client_nonce)`.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Submission {
    /// Member PDA.
    pub member: Pubkey,
    /// The member's wallet key.
    pub member_owner: Pubkey,
    /// ActionType PDA.
    pub action_type: Pubkey,
    pub amount: u64,
    pub evidence_hash: [u8; 32],
    pub location_hash: [u8; 32],
    pub status: SubmissionStatus,
    pub created_at: i64,
    /// Client-chosen idempotency key, part of the PDA seeds.
    pub client_nonce: u64,
}

/// Discriminator-prefixed account (de)serialization.
pub trait ProgramAccount: BorshSerialize + BorshDeserialize + Sized {
    const DISCRIMINATOR: [u8; DISCRIMINATOR_LEN];
    const NAME: &'static str;

    /// Decode account data.
    ///
    /// Trailing zeros after the borsh payload are allocation padding and are
    /// accepted. A short buffer, a wrong discriminator, an unknown enum tag,
    /// or nonzero trailing bytes are all malformed; the caller is looking at
    /// the wrong account or at a layout this crate does not understand.
    fn decode(data: &[u8]) -> Result<Self, WireError> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(WireError::account(
                Self::NAME,
                "buffer shorter than the discriminator",
            ));
        }
        let (disc, rest) = data.split_at(DISCRIMINATOR_LEN);
        if disc != &Self::DISCRIMINATOR[..] {
            return Err(WireError::account(Self::NAME, "discriminator mismatch"));
        }
        let mut cursor = rest;
        let value = Self::deserialize(&mut cursor)
            .map_err(|e| WireError::account(Self::NAME, e.to_string()))?;
        if cursor.iter().any(|&b| b != 0) {
            return Err(WireError::account(Self::NAME, "nonzero trailing bytes"));
        }
        Ok(value)
    }

    /// Encode as discriminator-prefixed account data, without padding.
    fn encode(&self) -> Result<Vec<u8>, WireError> {
        let mut data = Vec::with_capacity(DISCRIMINATOR_LEN + 128);
        data.extend_from_slice(&Self::DISCRIMINATOR);
        self.serialize(&mut data)
            .map_err(|e| WireError::account(Self::NAME, e.to_string()))?;
        Ok(data)
    }
}

impl ProgramAccount for GlobalState {
    const DISCRIMINATOR: [u8; DISCRIMINATOR_LEN] = account::GLOBAL_STATE;
    const NAME: &'static str = "GlobalState";
}

impl ProgramAccount for ActionType {
    const DISCRIMINATOR: [u8; DISCRIMINATOR_LEN] = account::ACTION_TYPE;
    const NAME: &'static str = "ActionType";
}

impl ProgramAccount for Member {
    const DISCRIMINATOR: [u8; DISCRIMINATOR_LEN] = account::MEMBER;
    const NAME: &'static str = "Member";
}

impl ProgramAccount for Submission {
    const DISCRIMINATOR: [u8; DISCRIMINATOR_LEN] = account::SUBMISSION;
    const NAME: &'static str = "Submission";
}
