pub mod connection;
pub mod rpc;
pub mod signer;
