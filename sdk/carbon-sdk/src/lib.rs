//! Carbon Credits SDK
//!
//! Async client for the carbon credits program: deterministic addressing,
//! wire-exact instruction encoding, client-side rate-limit evaluation, and a
//! submission pipeline that only reports what the ledger confirmed.
//!
//! The transport and the signer are trait-shaped collaborators
//! ([`LedgerConnection`], [`TransactionSigner`]); production code plugs in
//! [`RpcConnection`] and a wallet-backed signer, tests plug in mocks.
//!
//! ```no_run
//! use carbon_sdk::{CarbonClient, ClientConfig, KeypairSigner, RpcConnection};
//! use solana_sdk::signature::Keypair;
//!
//! # async fn demo() -> carbon_sdk::Result<()> {
//! let admin = solana_sdk::pubkey::Pubkey::new_unique();
//! let config = ClientConfig::devnet(admin);
//! let client = CarbonClient::new(RpcConnection::from_config(&config), config)?;
//!
//! let signer = KeypairSigner::new(Keypair::new());
//! let outcome = client.join(&signer, None).await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

pub mod admin;
pub mod cache;
pub mod client;
pub mod config;
pub mod core;
pub mod error;
pub mod nonce;
pub mod policy;
pub mod types;

pub use admin::{default_action_types, default_params, ActionTypeDefinition};
pub use client::CarbonClient;
pub use config::ClientConfig;
pub use core::connection::{Confirmation, LedgerConnection, TransportError};
pub use core::rpc::RpcConnection;
pub use core::signer::{KeypairSigner, SignerError, TransactionSigner};
pub use error::{ClientError, Result};
pub use policy::{evaluate_join, evaluate_submission, Award, RejectReason};
pub use types::{MemberStatus, SubmissionOutcome};

/// Wire-layer types re-exported for downstream convenience.
pub mod state {
    pub use carbon_interface::state::{
        ActionStamp, ActionType, ActionUnit, GlobalState, Member, Params, ProgramAccount,
        Submission, SubmissionStatus,
    };
    pub use carbon_interface::{Slug, WireError, SLUG_LEN};
}
