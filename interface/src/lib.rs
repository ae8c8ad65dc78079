//! Carbon Credits Program Interface
//!
//! Everything that must agree byte for byte with the on-chain program lives
//! in this crate: seed schemes for program-derived addresses, the vendored
//! discriminator table, instruction encoding, and typed account layouts.
//! Nothing here talks to the network; the SDK crate layers transport,
//! signing, and orchestration on top.

pub mod discriminator;
pub mod error;
pub mod instruction;
pub mod pda;
pub mod program_error;
pub mod slug;
pub mod state;

pub use error::WireError;
pub use slug::{Slug, SLUG_LEN};

solana_program::declare_id!("8A6sABcgD2sMgQNWADUH2EakHnTy171tkKD11jPXNHkK");

/// SPL token program.
pub const TOKEN_PROGRAM_ID: solana_program::pubkey::Pubkey =
    solana_program::pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

/// SPL associated token account program.
pub const ASSOCIATED_TOKEN_PROGRAM_ID: solana_program::pubkey::Pubkey =
    solana_program::pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");
