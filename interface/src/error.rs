use thiserror::Error;

/// Errors raised by the wire layer.
///
/// Every variant points at a bug or an incompatibility, not at a transient
/// condition. Callers should surface these, never retry them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WireError {
    /// No bump in 255..=0 produced an off-curve address for the seed scheme.
    #[error("no valid program address for seed scheme `{scheme}`")]
    NoValidAddress { scheme: &'static str },

    /// Account bytes did not match the expected layout.
    #[error("malformed {entity} account data: {detail}")]
    MalformedAccountData {
        entity: &'static str,
        detail: String,
    },

    /// Instruction bytes did not match any known variant layout.
    #[error("malformed instruction data: {0}")]
    MalformedInstructionData(String),

    /// The vendored discriminator table disagrees with the recomputed hash.
    #[error("discriminator table mismatch for `{name}`")]
    DiscriminatorMismatch { name: &'static str },
}

impl WireError {
    pub(crate) fn account(entity: &'static str, detail: impl Into<String>) -> Self {
        WireError::MalformedAccountData {
            entity,
            detail: detail.into(),
        }
    }
}
