//! Administrative and verifier flows.
//!
//! Bootstrap, catalog registration, parameter control, and the verifier
//! approval path, kept next to the member operations so the whole program
//! lifecycle is scriptable against the same pipeline. These are operator
//! tools: business refusals come back as `Err(ClientError::Rejected)`
//! instead of outcome values.

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use tracing::{info, warn};

use carbon_interface::instruction as wire;
use carbon_interface::state::{ActionType, ActionUnit, GlobalState, Params, Submission};
use carbon_interface::{pda, Slug};

use crate::client::{CarbonClient, RemoteContext};
use crate::core::connection::LedgerConnection;
use crate::core::signer::TransactionSigner;
use crate::error::{ClientError, Result};
use crate::types::SubmissionOutcome;

/// Everything needed to register one action category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTypeDefinition {
    /// Canonical slug string; at most 16 bytes survive on the wire.
    pub slug: String,
    pub name: String,
    pub points_per_unit: u64,
    pub unit: ActionUnit,
    pub badge_uri: String,
    pub cooldown_secs: u32,
    pub per_tx_cap: u64,
}

impl ActionTypeDefinition {
    pub fn slug_bytes(&self) -> Slug {
        Slug::new(&self.slug)
    }
}

/// The standard catalog registered at bootstrap.
pub fn default_action_types() -> Vec<ActionTypeDefinition> {
    vec![
        ActionTypeDefinition {
            slug: "tree_planting".to_string(),
            name: "Tree Planting".to_string(),
            points_per_unit: 100,
            unit: ActionUnit::Tree,
            badge_uri: "ipfs://badges/tree_planting".to_string(),
            cooldown_secs: 3_600,
            per_tx_cap: 10,
        },
        ActionTypeDefinition {
            slug: "waste_collection".to_string(),
            name: "Waste Collection".to_string(),
            points_per_unit: 50,
            unit: ActionUnit::Kilogram,
            badge_uri: "ipfs://badges/waste_collection".to_string(),
            cooldown_secs: 1_800,
            per_tx_cap: 20,
        },
    ]
}

/// Bootstrap defaults for the program parameters.
pub fn default_params() -> Params {
    Params {
        paused: false,
        daily_cap: 10_000,
        per_tx_cap_default: 100,
        cooldown_secs_default: 3_600,
    }
}

impl<C: LedgerConnection> CarbonClient<C> {
    /// Idempotent bootstrap: initialize the program unless a GlobalState
    /// already exists for the configured admin. Returns the transaction
    /// signature when something was actually sent.
    pub async fn ensure_initialized(
        &self,
        signer: &dyn TransactionSigner,
        verifiers: Vec<Pubkey>,
        params: Params,
        points_mint: &Pubkey,
        vault: &Pubkey,
    ) -> Result<Option<Signature>> {
        let admin = self.expect_admin(signer)?;
        let (global, _) = pda::global_state_address(&admin)?;

        if self.fetch_decoded::<GlobalState>(&global).await?.is_some() {
            info!(%global, "program already initialized");
            return Ok(None);
        }

        let instruction = wire::initialize(&admin, points_mint, vault, verifiers, params)?;
        let outcome = self
            .sign_send_confirm(signer, &admin, instruction, RemoteContext::Other)
            .await?;
        let signature = expect_confirmed(outcome)?;
        info!(%global, %signature, "program initialized");
        Ok(Some(signature))
    }

    /// Idempotent registration. A record already present under the derived
    /// slug is compared by name: the same name is a no-op, a different name
    /// means two action types collide on their 16-byte prefix and the new
    /// one must be renamed.
    pub async fn register_action_type(
        &self,
        signer: &dyn TransactionSigner,
        definition: &ActionTypeDefinition,
    ) -> Result<Option<Signature>> {
        let admin = self.expect_admin(signer)?;
        let slug = definition.slug_bytes();
        let (global, _) = pda::global_state_address(&admin)?;
        let (address, _) = pda::action_type_address(&global, &slug)?;

        if let Some(existing) = self.fetch_decoded::<ActionType>(&address).await? {
            if existing.name == definition.name {
                info!(slug = %slug, "action type already registered");
                return Ok(None);
            }
            return Err(ClientError::SlugCollision {
                slug: definition.slug.clone(),
                existing: existing.name,
            });
        }

        let instruction = wire::register_action_type(
            &admin,
            slug,
            definition.name.clone(),
            definition.points_per_unit,
            definition.unit,
            definition.badge_uri.clone(),
            definition.cooldown_secs,
            definition.per_tx_cap,
        )?;
        let outcome = self
            .sign_send_confirm(signer, &admin, instruction, RemoteContext::Other)
            .await?;
        let signature = expect_confirmed(outcome)?;
        info!(slug = %slug, %signature, "action type registered");
        Ok(Some(signature))
    }

    pub async fn set_params(
        &self,
        signer: &dyn TransactionSigner,
        params: Params,
    ) -> Result<Signature> {
        let admin = self.expect_admin(signer)?;
        let instruction = wire::set_params(&admin, params)?;
        let outcome = self
            .sign_send_confirm(signer, &admin, instruction, RemoteContext::Other)
            .await?;
        expect_confirmed(outcome)
    }

    pub async fn pause(&self, signer: &dyn TransactionSigner) -> Result<Signature> {
        let admin = self.expect_admin(signer)?;
        let instruction = wire::pause(&admin)?;
        let outcome = self
            .sign_send_confirm(signer, &admin, instruction, RemoteContext::Other)
            .await?;
        let signature = expect_confirmed(outcome)?;
        warn!(%admin, %signature, "program paused");
        Ok(signature)
    }

    pub async fn unpause(&self, signer: &dyn TransactionSigner) -> Result<Signature> {
        let admin = self.expect_admin(signer)?;
        let instruction = wire::unpause(&admin)?;
        let outcome = self
            .sign_send_confirm(signer, &admin, instruction, RemoteContext::Other)
            .await?;
        let signature = expect_confirmed(outcome)?;
        info!(%admin, %signature, "program unpaused");
        Ok(signature)
    }

    /// Approve or reject a pending submission. The verifier signs; the
    /// member's token account for the points mint is derived, matching the
    /// program's constraints.
    pub async fn verify_action(
        &self,
        signer: &dyn TransactionSigner,
        submission_address: &Pubkey,
        approve: bool,
    ) -> Result<Signature> {
        let verifier = signer.pubkey();
        let global = self.global_state().await?;
        if !global.is_verifier(&verifier) {
            warn!(%verifier, "signer is not in the verifier set; the program will reject");
        }

        let submission: Submission = self
            .fetch_decoded(submission_address)
            .await?
            .ok_or(ClientError::SubmissionNotFound(*submission_address))?;
        let member_points_ata =
            pda::associated_token_address(&submission.member_owner, &global.points_mint)?;

        let instruction = wire::verify_action(
            &verifier,
            &self.config().admin,
            &submission.member_owner,
            &submission.action_type,
            submission_address,
            &global.points_mint,
            &member_points_ata,
            approve,
        )?;
        let outcome = self
            .sign_send_confirm(signer, &verifier, instruction, RemoteContext::Other)
            .await?;
        let signature = expect_confirmed(outcome)?;
        info!(
            %submission_address, approve, %signature,
            owner = %submission.member_owner,
            "submission verified"
        );
        Ok(signature)
    }

    /// Burn points against a partner offer.
    pub async fn redeem_with_partner(
        &self,
        signer: &dyn TransactionSigner,
        points: u64,
        partner_slug: &Slug,
    ) -> Result<Signature> {
        let user = signer.pubkey();
        let global = self.global_state().await?;
        let member_points_ata = pda::associated_token_address(&user, &global.points_mint)?;

        let instruction = wire::redeem_with_partner(
            &user,
            &self.config().admin,
            &global.points_mint,
            &member_points_ata,
            points,
            *partner_slug,
        )?;
        let outcome = self
            .sign_send_confirm(signer, &user, instruction, RemoteContext::Other)
            .await?;
        let signature = expect_confirmed(outcome)?;
        info!(%user, points, partner = %partner_slug, %signature, "points redeemed");
        Ok(signature)
    }

    fn expect_admin(&self, signer: &dyn TransactionSigner) -> Result<Pubkey> {
        let actual = signer.pubkey();
        if actual != self.config().admin {
            return Err(ClientError::AdminMismatch {
                expected: self.config().admin,
                actual,
            });
        }
        Ok(actual)
    }
}

fn expect_confirmed(outcome: SubmissionOutcome) -> Result<Signature> {
    match outcome {
        SubmissionOutcome::Confirmed { signature } => Ok(signature),
        SubmissionOutcome::Rejected { reason } => Err(ClientError::Rejected(reason)),
        SubmissionOutcome::TransportFailure { retryable, detail } => {
            Err(ClientError::Transport { retryable, detail })
        }
    }
}
