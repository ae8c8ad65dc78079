//! Deterministic address derivation.
//!
//! Seed schemes are the compatibility surface shared with the on-chain
//! program; the literal byte strings and their order must never change.
//! Derivation is pure. Callers recompute addresses on demand instead of
//! persisting them.

use solana_program::pubkey::Pubkey;

use crate::error::WireError;
use crate::slug::Slug;

pub const GLOBAL_SEED: &[u8] = b"global";
pub const ACTION_TYPE_SEED: &[u8] = b"action_type";
pub const MEMBER_SEED: &[u8] = b"member";
pub const SUBMISSION_SEED: &[u8] = b"submission";

/// `["global", admin]`
pub fn global_state_address(admin: &Pubkey) -> Result<(Pubkey, u8), WireError> {
    derive(&[GLOBAL_SEED, admin.as_ref()], "global")
}

/// `["action_type", global, slug]`
pub fn action_type_address(global: &Pubkey, slug: &Slug) -> Result<(Pubkey, u8), WireError> {
    derive(
        &[ACTION_TYPE_SEED, global.as_ref(), slug.as_bytes()],
        "action_type",
    )
}

/// `["member", owner]`
pub fn member_address(owner: &Pubkey) -> Result<(Pubkey, u8), WireError> {
    derive(&[MEMBER_SEED, owner.as_ref()], "member")
}

/// `["submission", owner, nonce]`
///
/// The nonce is serialized as 8 little-endian bytes. The same
/// `(owner, nonce)` pair always lands on the same address, so a retried
/// submission can only ever collide with its own record.
pub fn submission_address(owner: &Pubkey, nonce: u64) -> Result<(Pubkey, u8), WireError> {
    derive(
        &[SUBMISSION_SEED, owner.as_ref(), &nonce.to_le_bytes()],
        "submission",
    )
}

/// Associated token account for `wallet`, which may itself be a PDA.
pub fn associated_token_address(wallet: &Pubkey, mint: &Pubkey) -> Result<Pubkey, WireError> {
    Pubkey::try_find_program_address(
        &[
            wallet.as_ref(),
            crate::TOKEN_PROGRAM_ID.as_ref(),
            mint.as_ref(),
        ],
        &crate::ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .map(|(address, _)| address)
    .ok_or(WireError::NoValidAddress {
        scheme: "associated_token",
    })
}

/// Canonical bump search, 255 down to 0, first off-curve result wins.
/// Exhaustion means the seed construction itself is broken; nothing should
/// retry this with different seeds.
fn derive(seeds: &[&[u8]], scheme: &'static str) -> Result<(Pubkey, u8), WireError> {
    Pubkey::try_find_program_address(seeds, &crate::ID)
        .ok_or(WireError::NoValidAddress { scheme })
}
