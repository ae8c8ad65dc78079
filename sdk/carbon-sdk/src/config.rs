//! Client configuration.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// Tunables for the client pipeline.
///
/// Serializable so deployments can ship it as a config file. Defaults target
/// the devnet deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// JSON-RPC endpoint.
    pub rpc_url: String,

    /// Commitment level label: `processed`, `confirmed` or `finalized`.
    /// Unrecognized labels fall back to `confirmed`.
    pub commitment: String,

    /// Admin key anchoring the GlobalState address. Every derived address in
    /// a deployment hangs off this key.
    pub admin: Pubkey,

    /// Additional attempts after a retryable transport failure. Each attempt
    /// fetches a fresh blockhash.
    pub max_transport_retries: u8,

    /// Milliseconds between confirmation polls.
    pub confirm_poll_ms: u64,

    /// Seconds before an unobserved signature counts as timed out.
    pub confirm_timeout_secs: u64,
}

impl ClientConfig {
    /// Devnet endpoint with default pipeline tunables.
    pub fn devnet(admin: Pubkey) -> Self {
        ClientConfig {
            rpc_url: "https://api.devnet.solana.com".to_string(),
            admin,
            ..ClientConfig::default()
        }
    }

    pub fn localnet(admin: Pubkey) -> Self {
        ClientConfig {
            rpc_url: "http://127.0.0.1:8899".to_string(),
            admin,
            ..ClientConfig::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            rpc_url: "https://api.devnet.solana.com".to_string(),
            commitment: "confirmed".to_string(),
            admin: Pubkey::default(),
            max_transport_retries: 2,
            confirm_poll_ms: 500,
            confirm_timeout_secs: 60,
        }
    }
}
