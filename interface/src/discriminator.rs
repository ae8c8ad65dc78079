//! Vendored discriminator table.
//!
//! The program prefixes every instruction with `sha256("global:<method>")[..8]`
//! and every account with `sha256("account:<Name>")[..8]`. The byte values
//! below are generated from the program's published interface and checked in
//! as constants; [`verify_table`] recomputes every entry so a drifted table
//! fails hard at client startup instead of producing transactions the
//! program silently refuses to dispatch.

use solana_program::hash::hashv;

use crate::error::WireError;

/// Width of an instruction or account discriminator.
pub const DISCRIMINATOR_LEN: usize = 8;

/// Instruction discriminators, keyed by method name.
pub mod ix {
    pub const INITIALIZE: [u8; 8] = [0xaf, 0xaf, 0x6d, 0x1f, 0x0d, 0x98, 0x9b, 0xed];
    pub const REGISTER_ACTION_TYPE: [u8; 8] = [0xe5, 0x69, 0x2f, 0x6e, 0xd1, 0x0b, 0x9e, 0xb4];
    pub const JOIN: [u8; 8] = [0xce, 0x37, 0x02, 0x6a, 0x71, 0xdc, 0x11, 0xa3];
    pub const SUBMIT_ACTION: [u8; 8] = [0xde, 0x3b, 0x20, 0x97, 0xc2, 0x89, 0xaf, 0x96];
    pub const VERIFY_ACTION: [u8; 8] = [0x06, 0x04, 0xf3, 0xd6, 0x8c, 0x27, 0x31, 0x03];
    pub const REDEEM_WITH_PARTNER: [u8; 8] = [0xc3, 0xa4, 0x09, 0xa9, 0x4a, 0xb8, 0xa7, 0x46];
    pub const SET_PARAMS: [u8; 8] = [0x1b, 0xea, 0xb2, 0x34, 0x93, 0x02, 0xbb, 0x8d];
    pub const PAUSE: [u8; 8] = [0xd3, 0x16, 0xdd, 0xfb, 0x4a, 0x79, 0xc1, 0x2f];
    pub const UNPAUSE: [u8; 8] = [0xa9, 0x90, 0x04, 0x26, 0x0a, 0x8d, 0xbc, 0xff];
}

/// Account discriminators, keyed by account struct name.
pub mod account {
    pub const GLOBAL_STATE: [u8; 8] = [0xa3, 0x2e, 0x4a, 0xa8, 0xd8, 0x7b, 0x85, 0x62];
    pub const ACTION_TYPE: [u8; 8] = [0xf6, 0x98, 0x47, 0x30, 0x50, 0xbb, 0xbb, 0xaa];
    pub const MEMBER: [u8; 8] = [0x36, 0x13, 0xa2, 0x15, 0x1d, 0xa6, 0x11, 0xc6];
    pub const SUBMISSION: [u8; 8] = [0x3a, 0xc2, 0x9f, 0x9e, 0x4b, 0x66, 0xb2, 0xc5];
}

const TABLE: &[(&str, &str, [u8; 8])] = &[
    ("global", "initialize", ix::INITIALIZE),
    ("global", "register_action_type", ix::REGISTER_ACTION_TYPE),
    ("global", "join", ix::JOIN),
    ("global", "submit_action", ix::SUBMIT_ACTION),
    ("global", "verify_action", ix::VERIFY_ACTION),
    ("global", "redeem_with_partner", ix::REDEEM_WITH_PARTNER),
    ("global", "set_params", ix::SET_PARAMS),
    ("global", "pause", ix::PAUSE),
    ("global", "unpause", ix::UNPAUSE),
    ("account", "GlobalState", account::GLOBAL_STATE),
    ("account", "ActionType", account::ACTION_TYPE),
    ("account", "Member", account::MEMBER),
    ("account", "Submission", account::SUBMISSION),
];

/// Recompute every vendored entry from its preimage and fail on the first
/// mismatch. Cheap enough to run once at client construction.
pub fn verify_table() -> Result<(), WireError> {
    for &(namespace, name, vendored) in TABLE {
        let digest = hashv(&[namespace.as_bytes(), b":", name.as_bytes()]);
        if digest.as_ref()[..DISCRIMINATOR_LEN] != vendored[..] {
            return Err(WireError::DiscriminatorMismatch { name });
        }
    }
    Ok(())
}
