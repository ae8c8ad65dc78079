//! Instruction codec and account-meta builders.
//!
//! Wire format: `[8-byte discriminator][borsh-encoded args]`. The builders
//! derive every program address from its seed scheme and lay out account
//! metas in the exact order the program declares; both are part of the
//! protocol surface, not a convenience.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::instruction::{AccountMeta, Instruction};
use solana_program::pubkey::Pubkey;
use solana_program::system_program;

use crate::discriminator::{ix, DISCRIMINATOR_LEN};
use crate::error::WireError;
use crate::pda;
use crate::slug::Slug;
use crate::state::{ActionUnit, Params};

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct InitializeArgs {
    pub verifiers: Vec<Pubkey>,
    pub params: Params,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct RegisterActionTypeArgs {
    pub slug: Slug,
    pub name: String,
    pub points_per_unit: u64,
    pub unit: ActionUnit,
    pub badge_uri: String,
    pub cooldown_secs: u32,
    pub per_tx_cap: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct JoinArgs {
    pub profile_uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct SubmitActionArgs {
    pub slug: Slug,
    pub amount: u64,
    pub client_nonce: u64,
    pub evidence_hash: [u8; 32],
    pub location_hash: [u8; 32],
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct VerifyActionArgs {
    pub approve: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct RedeemWithPartnerArgs {
    pub points: u64,
    pub partner_slug: Slug,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct SetParamsArgs {
    pub params: Params,
}

/// Every instruction the program dispatches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CarbonInstruction {
    Initialize(InitializeArgs),
    RegisterActionType(RegisterActionTypeArgs),
    Join(JoinArgs),
    SubmitAction(SubmitActionArgs),
    VerifyAction(VerifyActionArgs),
    RedeemWithPartner(RedeemWithPartnerArgs),
    SetParams(SetParamsArgs),
    Pause,
    Unpause,
}

impl CarbonInstruction {
    pub fn discriminator(&self) -> [u8; DISCRIMINATOR_LEN] {
        match self {
            Self::Initialize(_) => ix::INITIALIZE,
            Self::RegisterActionType(_) => ix::REGISTER_ACTION_TYPE,
            Self::Join(_) => ix::JOIN,
            Self::SubmitAction(_) => ix::SUBMIT_ACTION,
            Self::VerifyAction(_) => ix::VERIFY_ACTION,
            Self::RedeemWithPartner(_) => ix::REDEEM_WITH_PARTNER,
            Self::SetParams(_) => ix::SET_PARAMS,
            Self::Pause => ix::PAUSE,
            Self::Unpause => ix::UNPAUSE,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        match self {
            Self::Initialize(args) => encode_with_args(ix::INITIALIZE, args),
            Self::RegisterActionType(args) => encode_with_args(ix::REGISTER_ACTION_TYPE, args),
            Self::Join(args) => encode_with_args(ix::JOIN, args),
            Self::SubmitAction(args) => encode_with_args(ix::SUBMIT_ACTION, args),
            Self::VerifyAction(args) => encode_with_args(ix::VERIFY_ACTION, args),
            Self::RedeemWithPartner(args) => encode_with_args(ix::REDEEM_WITH_PARTNER, args),
            Self::SetParams(args) => encode_with_args(ix::SET_PARAMS, args),
            Self::Pause => Ok(ix::PAUSE.to_vec()),
            Self::Unpause => Ok(ix::UNPAUSE.to_vec()),
        }
    }

    /// Strict inverse of [`encode`](Self::encode).
    ///
    /// Unlike account decoding there is no padding to tolerate here: an
    /// unknown discriminator, a truncated payload, or trailing bytes all
    /// fail.
    pub fn decode(data: &[u8]) -> Result<Self, WireError> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(WireError::MalformedInstructionData(
                "buffer shorter than the discriminator".to_string(),
            ));
        }
        let (prefix, rest) = data.split_at(DISCRIMINATOR_LEN);
        let mut disc = [0u8; DISCRIMINATOR_LEN];
        disc.copy_from_slice(prefix);
        match disc {
            ix::INITIALIZE => Ok(Self::Initialize(decode_args(rest)?)),
            ix::REGISTER_ACTION_TYPE => Ok(Self::RegisterActionType(decode_args(rest)?)),
            ix::JOIN => Ok(Self::Join(decode_args(rest)?)),
            ix::SUBMIT_ACTION => Ok(Self::SubmitAction(decode_args(rest)?)),
            ix::VERIFY_ACTION => Ok(Self::VerifyAction(decode_args(rest)?)),
            ix::REDEEM_WITH_PARTNER => Ok(Self::RedeemWithPartner(decode_args(rest)?)),
            ix::SET_PARAMS => Ok(Self::SetParams(decode_args(rest)?)),
            ix::PAUSE => decode_empty(rest).map(|_| Self::Pause),
            ix::UNPAUSE => decode_empty(rest).map(|_| Self::Unpause),
            _ => Err(WireError::MalformedInstructionData(format!(
                "unknown discriminator {disc:02x?}"
            ))),
        }
    }
}

fn encode_with_args<T: BorshSerialize>(
    disc: [u8; DISCRIMINATOR_LEN],
    args: &T,
) -> Result<Vec<u8>, WireError> {
    let mut data = Vec::with_capacity(DISCRIMINATOR_LEN + 64);
    data.extend_from_slice(&disc);
    args.serialize(&mut data)
        .map_err(|e| WireError::MalformedInstructionData(e.to_string()))?;
    Ok(data)
}

fn decode_args<T: BorshDeserialize>(mut rest: &[u8]) -> Result<T, WireError> {
    let args = T::deserialize(&mut rest)
        .map_err(|e| WireError::MalformedInstructionData(e.to_string()))?;
    decode_empty(rest)?;
    Ok(args)
}

fn decode_empty(rest: &[u8]) -> Result<(), WireError> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(WireError::MalformedInstructionData(format!(
            "{} trailing bytes",
            rest.len()
        )))
    }
}

//==================================================================
// Builders
//==================================================================

/// One-time program setup, anchored to the signing admin.
pub fn initialize(
    admin: &Pubkey,
    points_mint: &Pubkey,
    vault: &Pubkey,
    verifiers: Vec<Pubkey>,
    params: Params,
) -> Result<Instruction, WireError> {
    let (global, _) = pda::global_state_address(admin)?;
    let data = CarbonInstruction::Initialize(InitializeArgs { verifiers, params }).encode()?;
    Ok(Instruction {
        program_id: crate::ID,
        accounts: vec![
            AccountMeta::new(*admin, true),
            AccountMeta::new(global, false),
            AccountMeta::new(*points_mint, false),
            AccountMeta::new(*vault, false),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(crate::TOKEN_PROGRAM_ID, false),
        ],
        data,
    })
}

#[allow(clippy::too_many_arguments)]
pub fn register_action_type(
    admin: &Pubkey,
    slug: Slug,
    name: String,
    points_per_unit: u64,
    unit: ActionUnit,
    badge_uri: String,
    cooldown_secs: u32,
    per_tx_cap: u64,
) -> Result<Instruction, WireError> {
    let (global, _) = pda::global_state_address(admin)?;
    let (action_type, _) = pda::action_type_address(&global, &slug)?;
    let data = CarbonInstruction::RegisterActionType(RegisterActionTypeArgs {
        slug,
        name,
        points_per_unit,
        unit,
        badge_uri,
        cooldown_secs,
        per_tx_cap,
    })
    .encode()?;
    Ok(Instruction {
        program_id: crate::ID,
        accounts: vec![
            AccountMeta::new(*admin, true),
            AccountMeta::new(global, false),
            AccountMeta::new(action_type, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data,
    })
}

pub fn join(user: &Pubkey, profile_uri: Option<String>) -> Result<Instruction, WireError> {
    let (member, _) = pda::member_address(user)?;
    let data = CarbonInstruction::Join(JoinArgs { profile_uri }).encode()?;
    Ok(Instruction {
        program_id: crate::ID,
        accounts: vec![
            AccountMeta::new(*user, true),
            AccountMeta::new(member, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data,
    })
}

/// `member` is writable: the program updates the cooldown stamp and the
/// daily tally when it accepts a submission.
pub fn submit_action(
    user: &Pubkey,
    admin: &Pubkey,
    slug: Slug,
    amount: u64,
    client_nonce: u64,
    evidence_hash: [u8; 32],
    location_hash: [u8; 32],
) -> Result<Instruction, WireError> {
    let (global, _) = pda::global_state_address(admin)?;
    let (member, _) = pda::member_address(user)?;
    let (action_type, _) = pda::action_type_address(&global, &slug)?;
    let (submission, _) = pda::submission_address(user, client_nonce)?;
    let data = CarbonInstruction::SubmitAction(SubmitActionArgs {
        slug,
        amount,
        client_nonce,
        evidence_hash,
        location_hash,
    })
    .encode()?;
    Ok(Instruction {
        program_id: crate::ID,
        accounts: vec![
            AccountMeta::new(*user, true),
            AccountMeta::new_readonly(global, false),
            AccountMeta::new(member, false),
            AccountMeta::new_readonly(action_type, false),
            AccountMeta::new(submission, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data,
    })
}

#[allow(clippy::too_many_arguments)]
pub fn verify_action(
    verifier: &Pubkey,
    admin: &Pubkey,
    member_owner: &Pubkey,
    action_type: &Pubkey,
    submission: &Pubkey,
    points_mint: &Pubkey,
    member_points_ata: &Pubkey,
    approve: bool,
) -> Result<Instruction, WireError> {
    let (global, _) = pda::global_state_address(admin)?;
    let (member, _) = pda::member_address(member_owner)?;
    let data = CarbonInstruction::VerifyAction(VerifyActionArgs { approve }).encode()?;
    Ok(Instruction {
        program_id: crate::ID,
        accounts: vec![
            AccountMeta::new_readonly(*verifier, true),
            AccountMeta::new(global, false),
            AccountMeta::new_readonly(*action_type, false),
            AccountMeta::new(member, false),
            AccountMeta::new(*submission, false),
            AccountMeta::new(*points_mint, false),
            AccountMeta::new(*member_points_ata, false),
            AccountMeta::new_readonly(crate::TOKEN_PROGRAM_ID, false),
        ],
        data,
    })
}

pub fn redeem_with_partner(
    user: &Pubkey,
    admin: &Pubkey,
    points_mint: &Pubkey,
    member_points_ata: &Pubkey,
    points: u64,
    partner_slug: Slug,
) -> Result<Instruction, WireError> {
    let (global, _) = pda::global_state_address(admin)?;
    let data = CarbonInstruction::RedeemWithPartner(RedeemWithPartnerArgs {
        points,
        partner_slug,
    })
    .encode()?;
    Ok(Instruction {
        program_id: crate::ID,
        accounts: vec![
            AccountMeta::new(*user, true),
            AccountMeta::new_readonly(global, false),
            AccountMeta::new(*points_mint, false),
            AccountMeta::new(*member_points_ata, false),
            AccountMeta::new_readonly(crate::TOKEN_PROGRAM_ID, false),
        ],
        data,
    })
}

pub fn set_params(admin: &Pubkey, params: Params) -> Result<Instruction, WireError> {
    admin_instruction(admin, CarbonInstruction::SetParams(SetParamsArgs { params }))
}

pub fn pause(admin: &Pubkey) -> Result<Instruction, WireError> {
    admin_instruction(admin, CarbonInstruction::Pause)
}

pub fn unpause(admin: &Pubkey) -> Result<Instruction, WireError> {
    admin_instruction(admin, CarbonInstruction::Unpause)
}

fn admin_instruction(
    admin: &Pubkey,
    instruction: CarbonInstruction,
) -> Result<Instruction, WireError> {
    let (global, _) = pda::global_state_address(admin)?;
    let data = instruction.encode()?;
    Ok(Instruction {
        program_id: crate::ID,
        accounts: vec![
            AccountMeta::new_readonly(*admin, true),
            AccountMeta::new(global, false),
        ],
        data,
    })
}
