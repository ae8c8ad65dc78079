//! Submission orchestration.
//!
//! [`CarbonClient`] composes the wire layer, the policy evaluator, and the
//! transport/signer collaborators into the member-facing operations. The
//! pipeline for every mutating call is the same: derive addresses, read
//! authoritative state, evaluate locally, encode, sign, send, and wait for
//! a terminal confirmation. Nothing is reported as done on submission
//! alone.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use carbon_interface::instruction as wire;
use carbon_interface::program_error::ProgramErrorCode;
use carbon_interface::state::{ActionType, GlobalState, Member, ProgramAccount, Submission};
use carbon_interface::{discriminator, pda, Slug};

use crate::cache::MembershipCache;
use crate::config::ClientConfig;
use crate::core::connection::{Confirmation, LedgerConnection, TransportError};
use crate::core::signer::TransactionSigner;
use crate::error::{ClientError, Result};
use crate::nonce::NonceSource;
use crate::policy::{self, RejectReason};
use crate::types::{MemberStatus, SubmissionOutcome};

/// Which flow a remote failure belongs to. The ledger reports an occupied
/// address the same way everywhere; what it means depends on what we tried
/// to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RemoteContext {
    Join,
    Submission,
    Other,
}

/// One async mutex per owner. Mutating operations hold it across the whole
/// read/evaluate/sign/send/confirm span, so a second call for the same
/// owner cannot pick a nonce while the first is still in flight.
#[derive(Default)]
struct OwnerLocks {
    inner: Mutex<HashMap<Pubkey, Arc<Mutex<()>>>>,
}

impl OwnerLocks {
    async fn acquire(&self, owner: Pubkey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(owner)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

/// Async client for the carbon credits program.
pub struct CarbonClient<C: LedgerConnection> {
    connection: C,
    config: ClientConfig,
    nonces: NonceSource,
    locks: OwnerLocks,
    cache: MembershipCache,
}

impl<C: LedgerConnection> CarbonClient<C> {
    /// Build a client. Verifies the vendored discriminator table against
    /// recomputed hashes; a drifted table is a hard startup error.
    pub fn new(connection: C, config: ClientConfig) -> Result<Self> {
        discriminator::verify_table()?;
        Ok(CarbonClient {
            connection,
            config,
            nonces: NonceSource::new(),
            locks: OwnerLocks::default(),
            cache: MembershipCache::new(),
        })
    }

    /// Replace the nonce source with one that starts above `floor`.
    /// Deterministic nonce streams for tests and replay tooling.
    pub fn with_nonce_floor(mut self, floor: u64) -> Self {
        self.nonces = NonceSource::starting_at(floor);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    //==================================================================
    // Reads
    //==================================================================

    pub async fn global_state(&self) -> Result<GlobalState> {
        let (address, _) = pda::global_state_address(&self.config.admin)?;
        self.fetch_decoded(&address)
            .await?
            .ok_or(ClientError::NotInitialized {
                admin: self.config.admin,
            })
    }

    pub async fn action_type(&self, slug: &Slug) -> Result<ActionType> {
        let (_, action_type) = self.action_type_with_address(slug).await?;
        Ok(action_type)
    }

    pub async fn member(&self, owner: &Pubkey) -> Result<MemberStatus> {
        let (address, _) = pda::member_address(owner)?;
        let member: Option<Member> = self.fetch_decoded(&address).await?;
        self.cache.record(*owner, member.is_some());
        Ok(MemberStatus {
            address,
            exists: member.is_some(),
            member,
        })
    }

    pub async fn submission(&self, owner: &Pubkey, nonce: u64) -> Result<Option<Submission>> {
        let (address, _) = pda::submission_address(owner, nonce)?;
        self.fetch_decoded(&address).await
    }

    /// Last cached membership observation. Advisory: suitable for UI
    /// affordances, never consulted by the mutating paths.
    pub fn membership_hint(&self, owner: &Pubkey) -> Option<bool> {
        self.cache.hint(owner)
    }

    pub(crate) async fn action_type_with_address(
        &self,
        slug: &Slug,
    ) -> Result<(Pubkey, ActionType)> {
        let (global, _) = pda::global_state_address(&self.config.admin)?;
        let (address, _) = pda::action_type_address(&global, slug)?;
        let action_type = self
            .fetch_decoded(&address)
            .await?
            .ok_or_else(|| ClientError::UnknownActionType(slug.display_name()))?;
        Ok((address, action_type))
    }

    pub(crate) async fn fetch_decoded<T: ProgramAccount>(
        &self,
        address: &Pubkey,
    ) -> Result<Option<T>> {
        let account = self
            .connection
            .get_account(address)
            .await
            .map_err(ClientError::from)?;
        match account {
            None => Ok(None),
            Some(account) => Ok(Some(T::decode(&account.data)?)),
        }
    }

    //==================================================================
    // Member operations
    //==================================================================

    /// Join the program. One-way: an existing member account rejects before
    /// anything is signed.
    pub async fn join(
        &self,
        signer: &dyn TransactionSigner,
        profile_uri: Option<String>,
    ) -> Result<SubmissionOutcome> {
        let owner = signer.pubkey();
        let _guard = self.locks.acquire(owner).await;

        // authoritative read, not the cache
        let status = self.member(&owner).await?;
        if let Err(reason) = policy::evaluate_join(status.member.as_ref()) {
            debug!(%owner, %reason, "join rejected before signing");
            return Ok(SubmissionOutcome::Rejected { reason });
        }

        let instruction = wire::join(&owner, profile_uri)?;
        let outcome = self
            .sign_send_confirm(signer, &owner, instruction, RemoteContext::Join)
            .await?;
        match &outcome {
            SubmissionOutcome::Confirmed { signature } => {
                self.cache.record(owner, true);
                info!(%owner, %signature, "join confirmed");
            }
            SubmissionOutcome::Rejected {
                reason: RejectReason::AlreadyMember,
            } => {
                // lost a race against ourselves or another device; the
                // desired end state holds either way
                self.cache.record(owner, true);
            }
            _ => {}
        }
        Ok(outcome)
    }

    /// Submit an environmental action for verification.
    ///
    /// Local evaluation happens first; a rejection there costs no signature
    /// and no network round-trip. A locally accepted request is signed and
    /// sent, and the ledger's verdict is final: if the program still
    /// rejects, the divergence is logged as protocol drift and the
    /// program's answer is returned.
    pub async fn submit_action(
        &self,
        signer: &dyn TransactionSigner,
        slug: &Slug,
        amount: u64,
        evidence_hash: [u8; 32],
        location_hash: [u8; 32],
    ) -> Result<SubmissionOutcome> {
        let owner = signer.pubkey();
        let _guard = self.locks.acquire(owner).await;

        let global = self.global_state().await?;
        let (action_type_address, action_type) = self.action_type_with_address(slug).await?;
        let status = self.member(&owner).await?;
        let member = match status.member {
            Some(member) => member,
            None => {
                debug!(%owner, "submission from a non-member");
                return Ok(SubmissionOutcome::Rejected {
                    reason: RejectReason::NotMember,
                });
            }
        };

        let now = unix_now();
        let award = match policy::evaluate_submission(&global, &action_type, &member, amount, now)
        {
            Ok(award) => award,
            Err(reason) => {
                debug!(%owner, slug = %slug, %reason, "submission rejected before signing");
                return Ok(SubmissionOutcome::Rejected { reason });
            }
        };
        debug!(%owner, slug = %slug, points = award.points, "submission passed local evaluation");

        let mut fresh_nonce_retries = 0u8;
        loop {
            let nonce = self.nonces.next();
            let (submission_address, _) = pda::submission_address(&owner, nonce)?;

            // the address must be free before we spend a signature on it
            if let Some(account) = self
                .connection
                .get_account(&submission_address)
                .await
                .map_err(ClientError::from)?
            {
                match classify_occupant(&account.data, &owner, nonce, amount, &action_type_address)
                {
                    Occupant::OwnRecord => {
                        info!(%owner, nonce, "submission already recorded under this nonce");
                        return Ok(SubmissionOutcome::Rejected {
                            reason: RejectReason::DuplicateNonce,
                        });
                    }
                    Occupant::Foreign => {
                        if fresh_nonce_retries >= 1 {
                            return Ok(SubmissionOutcome::Rejected {
                                reason: RejectReason::DuplicateNonce,
                            });
                        }
                        fresh_nonce_retries += 1;
                        warn!(%owner, nonce, "submission nonce occupied, retrying with a fresh one");
                        continue;
                    }
                }
            }

            let instruction = wire::submit_action(
                &owner,
                &self.config.admin,
                *slug,
                amount,
                nonce,
                evidence_hash,
                location_hash,
            )?;
            let outcome = self
                .sign_send_confirm(signer, &owner, instruction, RemoteContext::Submission)
                .await?;
            match outcome {
                SubmissionOutcome::Rejected {
                    reason: RejectReason::DuplicateNonce,
                } => {
                    // the address got occupied between our pre-read and
                    // execution; find out by whom before deciding anything
                    let occupant = match self.connection.get_account(&submission_address).await {
                        Ok(Some(account)) => classify_occupant(
                            &account.data,
                            &owner,
                            nonce,
                            amount,
                            &action_type_address,
                        ),
                        // unknown occupant: never risk a double award
                        _ => Occupant::OwnRecord,
                    };
                    match occupant {
                        Occupant::OwnRecord => {
                            info!(%owner, nonce, "submission already recorded under this nonce");
                            return Ok(SubmissionOutcome::Rejected {
                                reason: RejectReason::DuplicateNonce,
                            });
                        }
                        Occupant::Foreign if fresh_nonce_retries < 1 => {
                            fresh_nonce_retries += 1;
                            warn!(%owner, nonce, "submission nonce occupied, retrying with a fresh one");
                            continue;
                        }
                        Occupant::Foreign => {
                            return Ok(SubmissionOutcome::Rejected {
                                reason: RejectReason::DuplicateNonce,
                            });
                        }
                    }
                }
                SubmissionOutcome::Confirmed { signature } => {
                    self.cache.record(owner, true);
                    info!(%owner, nonce, points = award.points, %signature, "submission confirmed");
                    return Ok(SubmissionOutcome::Confirmed { signature });
                }
                SubmissionOutcome::Rejected { reason } => {
                    warn!(
                        %owner, %reason,
                        "program rejected a submission that passed local evaluation (protocol drift)"
                    );
                    return Ok(SubmissionOutcome::Rejected { reason });
                }
                transport_failure => return Ok(transport_failure),
            }
        }
    }

    //==================================================================
    // Pipeline
    //==================================================================

    /// Sign, send, and wait for a terminal verdict. Retryable transport
    /// failures and confirmation timeouts are retried up to the configured
    /// bound, each attempt with a freshly fetched blockhash. Signer refusal
    /// aborts immediately and is never retried.
    pub(crate) async fn sign_send_confirm(
        &self,
        signer: &dyn TransactionSigner,
        payer: &Pubkey,
        instruction: Instruction,
        context: RemoteContext,
    ) -> Result<SubmissionOutcome> {
        let attempts = usize::from(self.config.max_transport_retries) + 1;
        let mut last_failure: Option<TransportError> = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                debug!(attempt, "retrying with a fresh blockhash");
            }

            let blockhash = match self.connection.latest_blockhash().await {
                Ok(hash) => hash,
                Err(err) if err.retryable => {
                    last_failure = Some(err);
                    continue;
                }
                Err(err) => {
                    return Ok(SubmissionOutcome::TransportFailure {
                        retryable: false,
                        detail: err.detail,
                    })
                }
            };

            let message =
                Message::new_with_blockhash(&[instruction.clone()], Some(payer), &blockhash);
            let transaction = Transaction::new_unsigned(message);
            let signed = signer.sign_transaction(transaction).await?;

            let signature = match self.connection.send_transaction(&signed).await {
                Ok(signature) => signature,
                Err(err) if err.retryable => {
                    last_failure = Some(err);
                    continue;
                }
                // permanent send failures carry the preflight verdict when
                // the program already rejected in simulation
                Err(err) => return Ok(reject_or_transport(&err.detail, context)),
            };

            match self.connection.confirm_transaction(&signature).await {
                Ok(Confirmation::Confirmed) => {
                    return Ok(SubmissionOutcome::Confirmed { signature })
                }
                Ok(Confirmation::Failed(detail)) => {
                    return Ok(SubmissionOutcome::Rejected {
                        reason: map_remote_failure(&detail, context),
                    })
                }
                Ok(Confirmation::Timeout) => {
                    // fate unknown; a later attempt that collides with this
                    // one resolves through the occupied-address path
                    last_failure = Some(TransportError::retryable(format!(
                        "confirmation timed out for {signature}"
                    )));
                    continue;
                }
                Err(err) if err.retryable => {
                    last_failure = Some(err);
                    continue;
                }
                Err(err) => {
                    return Ok(SubmissionOutcome::TransportFailure {
                        retryable: false,
                        detail: err.detail,
                    })
                }
            }
        }

        let failure =
            last_failure.unwrap_or_else(|| TransportError::retryable("transport retries exhausted"));
        Ok(SubmissionOutcome::TransportFailure {
            retryable: failure.retryable,
            detail: failure.detail,
        })
    }
}

/// Who holds an occupied submission address.
enum Occupant {
    /// Our own record: same owner, nonce, action type and amount. A retry
    /// of this payload must resolve idempotently, never create a second
    /// submission.
    OwnRecord,
    /// Anything else; a fresh nonce is safe.
    Foreign,
}

fn classify_occupant(
    data: &[u8],
    owner: &Pubkey,
    nonce: u64,
    amount: u64,
    action_type: &Pubkey,
) -> Occupant {
    match Submission::decode(data) {
        Ok(existing)
            if existing.member_owner == *owner
                && existing.client_nonce == nonce
                && existing.action_type == *action_type
                && existing.amount == amount =>
        {
            Occupant::OwnRecord
        }
        _ => Occupant::Foreign,
    }
}

/// Map a remote failure rendering onto the business taxonomy.
///
/// An occupied address surfaces as the system program's account-in-use
/// failure (custom code 0 of instruction 0, or the allocator's log line);
/// what that means depends on the flow. Program codes 6000+ come from the
/// vendored error table.
fn map_remote_failure(detail: &str, context: RemoteContext) -> RejectReason {
    let code = parse_custom_error_code(detail);
    if detail.contains("already in use") || code == Some(0) {
        return match context {
            RemoteContext::Join => RejectReason::AlreadyMember,
            RemoteContext::Submission => RejectReason::DuplicateNonce,
            RemoteContext::Other => RejectReason::RemoteRejection {
                code,
                detail: detail.to_string(),
            },
        };
    }
    match code {
        Some(code) => match ProgramErrorCode::from_code(code) {
            Some(ProgramErrorCode::Paused) => RejectReason::ProgramPaused,
            Some(ProgramErrorCode::MathOverflow) => RejectReason::MathOverflow,
            Some(known) => RejectReason::RemoteRejection {
                code: Some(code),
                detail: known.label().to_string(),
            },
            None => RejectReason::RemoteRejection {
                code: Some(code),
                detail: detail.to_string(),
            },
        },
        None => RejectReason::RemoteRejection {
            code: None,
            detail: detail.to_string(),
        },
    }
}

/// A permanent send failure is a program rejection when the detail carries
/// one, otherwise a transport failure.
fn reject_or_transport(detail: &str, context: RemoteContext) -> SubmissionOutcome {
    if detail.contains("already in use") || parse_custom_error_code(detail).is_some() {
        SubmissionOutcome::Rejected {
            reason: map_remote_failure(detail, context),
        }
    } else {
        SubmissionOutcome::TransportFailure {
            retryable: false,
            detail: detail.to_string(),
        }
    }
}

fn parse_custom_error_code(detail: &str) -> Option<u32> {
    let marker = "custom program error: 0x";
    let start = detail.find(marker)? + marker.len();
    let hex: String = detail[start..]
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .collect();
    u32::from_str_radix(&hex, 16).ok()
}

pub(crate) fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
