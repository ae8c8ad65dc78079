//! Rate-limit and lifecycle rules, evaluated client-side.
//!
//! Mirrors the program's enforcement so a doomed request is rejected before
//! it costs a signature and a network round-trip. Evaluation is pure: the
//! caller passes the clock, the function returns a verdict and the
//! post-state without touching shared state. The result is a prediction;
//! the ledger's verdict stays authoritative and a disagreement is logged as
//! protocol drift by the orchestrator, never patched over locally.

use carbon_interface::state::{ActionType, GlobalState, Member};
use thiserror::Error;

/// Seconds in one daily-cap accounting window.
pub const DAY_WINDOW_SECS: i64 = 86_400;

/// Business rejections, produced locally by the evaluator and mapped from
/// the program's error codes when the ledger disagrees.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error("already a member")]
    AlreadyMember,

    #[error("not a member")]
    NotMember,

    #[error("program is paused")]
    ProgramPaused,

    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("amount {amount} exceeds the per-transaction cap {cap}")]
    ExceedsPerTxCap { amount: u64, cap: u64 },

    #[error("cooldown active, {remaining_secs}s remaining")]
    CooldownActive { remaining_secs: u32 },

    #[error("daily cap {cap} would be exceeded: {earned_today} earned, {award} requested")]
    ExceedsDailyCap {
        cap: u64,
        earned_today: u64,
        award: u64,
    },

    /// Checked arithmetic overflowed while computing the award.
    #[error("math overflow")]
    MathOverflow,

    /// The submission address for the chosen nonce is already occupied.
    #[error("duplicate submission nonce")]
    DuplicateNonce,

    /// Rejection reported by the program that has no richer local mapping.
    #[error("rejected by the program: {detail}")]
    RemoteRejection { code: Option<u32>, detail: String },
}

/// Successful evaluation: the award plus the member state the ledger will
/// hold once the submission is accepted and verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Award {
    pub points: u64,
    pub member_after: Member,
}

/// Join gate. Membership is a one-way transition; an existing account means
/// the request must not be signed.
pub fn evaluate_join(existing: Option<&Member>) -> Result<(), RejectReason> {
    match existing {
        Some(_) => Err(RejectReason::AlreadyMember),
        None => Ok(()),
    }
}

/// Submission gate. Checks run in the program's order, first failure wins:
/// paused, amount bounds, cooldown, day-window roll, daily cap.
pub fn evaluate_submission(
    global: &GlobalState,
    action_type: &ActionType,
    member: &Member,
    amount: u64,
    now: i64,
) -> Result<Award, RejectReason> {
    if global.params.paused {
        return Err(RejectReason::ProgramPaused);
    }
    if amount == 0 {
        return Err(RejectReason::ZeroAmount);
    }
    if amount > action_type.per_tx_cap {
        return Err(RejectReason::ExceedsPerTxCap {
            amount,
            cap: action_type.per_tx_cap,
        });
    }

    if let Some(last_at) = member.last_action_for(&action_type.slug) {
        let elapsed = now.saturating_sub(last_at);
        let cooldown = i64::from(action_type.cooldown_secs);
        if elapsed < cooldown {
            // a stamp ahead of the local clock can push this past u32::MAX
            return Err(RejectReason::CooldownActive {
                remaining_secs: u32::try_from(cooldown.saturating_sub(elapsed))
                    .unwrap_or(u32::MAX),
            });
        }
    }

    let mut after = member.clone();
    if now.saturating_sub(after.day_window_start) >= DAY_WINDOW_SECS {
        after.points_earned_today = 0;
        after.day_window_start = now;
    }

    let award = amount
        .checked_mul(action_type.points_per_unit)
        .ok_or(RejectReason::MathOverflow)?;
    let earned = after
        .points_earned_today
        .checked_add(award)
        .ok_or(RejectReason::MathOverflow)?;
    if earned > global.params.daily_cap {
        return Err(RejectReason::ExceedsDailyCap {
            cap: global.params.daily_cap,
            earned_today: after.points_earned_today,
            award,
        });
    }

    after.points = after
        .points
        .checked_add(award)
        .ok_or(RejectReason::MathOverflow)?;
    after.points_earned_today = earned;
    after.record_action(action_type.slug, now);

    Ok(Award {
        points: award,
        member_after: after,
    })
}
