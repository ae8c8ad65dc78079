//! Vendored program error codes.
//!
//! Custom error codes surface in transaction failures as
//! `custom program error: 0x...`. The numbering starts at 6000 and follows
//! the program's error enum declaration order.

/// Errors the program can answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ProgramErrorCode {
    Paused = 6000,
    UnauthorizedAdmin = 6001,
    UnauthorizedVerifier = 6002,
    InvalidAmount = 6003,
    NotPending = 6004,
    MathOverflow = 6005,
    BadMintAuthority = 6006,
    CooldownActive = 6007,
    DailyCapExceeded = 6008,
}

impl ProgramErrorCode {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            6000 => Some(Self::Paused),
            6001 => Some(Self::UnauthorizedAdmin),
            6002 => Some(Self::UnauthorizedVerifier),
            6003 => Some(Self::InvalidAmount),
            6004 => Some(Self::NotPending),
            6005 => Some(Self::MathOverflow),
            6006 => Some(Self::BadMintAuthority),
            6007 => Some(Self::CooldownActive),
            6008 => Some(Self::DailyCapExceeded),
            _ => None,
        }
    }

    /// Stable label used in logs and user-facing failure strings.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Paused => "program is paused",
            Self::UnauthorizedAdmin => "unauthorized admin",
            Self::UnauthorizedVerifier => "unauthorized verifier",
            Self::InvalidAmount => "invalid amount",
            Self::NotPending => "submission is not pending",
            Self::MathOverflow => "math overflow",
            Self::BadMintAuthority => "bad mint authority",
            Self::CooldownActive => "cooldown active",
            Self::DailyCapExceeded => "daily cap exceeded",
        }
    }
}
