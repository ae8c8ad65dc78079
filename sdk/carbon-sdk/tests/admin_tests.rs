mod common;

use carbon_interface::instruction::CarbonInstruction;
use carbon_interface::pda;
use carbon_sdk::state::{ActionUnit, GlobalState, ProgramAccount, Slug};
use carbon_sdk::{
    default_action_types, default_params, ActionTypeDefinition, ClientError, RejectReason,
    SubmissionOutcome,
};
use solana_sdk::pubkey::Pubkey;

use common::{decoded_instruction, encode_account, seed_global, submission_record, Harness};

const JOINED: i64 = 1_600_000_000;

#[tokio::test]
async fn test_ensure_initialized_bootstraps_once() {
    let harness = Harness::empty();
    let mint = Pubkey::new_unique();
    let vault = Pubkey::new_unique();
    let verifier = Pubkey::new_unique();

    // mirror the program creating the GlobalState account
    let (global_address, bump) = pda::global_state_address(&harness.admin).unwrap();
    let global = GlobalState {
        admin: harness.admin,
        points_mint: mint,
        vault,
        verifiers: vec![verifier],
        params: default_params(),
        bump,
    };
    harness.ledger.on_next_send(move |accounts| {
        accounts.insert(global_address, encode_account(&global));
    });

    let first = harness
        .client
        .ensure_initialized(
            &harness.admin_signer,
            vec![verifier],
            default_params(),
            &mint,
            &vault,
        )
        .await
        .unwrap();
    assert!(first.is_some());
    assert_eq!(harness.ledger.sent_count(), 1);
    match decoded_instruction(&harness.ledger.sent()[0]) {
        CarbonInstruction::Initialize(args) => {
            assert_eq!(args.verifiers, vec![verifier]);
            assert!(!args.params.paused);
            assert_eq!(args.params.daily_cap, 10_000);
        }
        other => panic!("expected Initialize, got {other:?}"),
    }

    let second = harness
        .client
        .ensure_initialized(
            &harness.admin_signer,
            vec![verifier],
            default_params(),
            &mint,
            &vault,
        )
        .await
        .unwrap();
    assert!(second.is_none());
    assert_eq!(harness.ledger.sent_count(), 1);
}

#[tokio::test]
async fn test_admin_flows_guard_the_signer() {
    let harness = Harness::empty();

    let result = harness
        .client
        .ensure_initialized(
            &harness.signer,
            vec![],
            default_params(),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
        )
        .await;

    assert!(matches!(result, Err(ClientError::AdminMismatch { .. })));
    assert_eq!(harness.ledger.sent_count(), 0);

    let result = harness.client.pause(&harness.signer).await;
    assert!(matches!(result, Err(ClientError::AdminMismatch { .. })));
}

#[tokio::test]
async fn test_register_action_type_is_idempotent_by_name() {
    let harness = Harness::seeded();
    let mut tree = default_action_types().into_iter().next().unwrap();
    assert_eq!(tree.slug, "tree_planting");

    let outcome = harness
        .client
        .register_action_type(&harness.admin_signer, &tree)
        .await
        .unwrap();
    assert!(outcome.is_none());
    assert_eq!(harness.ledger.sent_count(), 0);

    tree.name = "Tree Planting Redux".to_string();
    match harness
        .client
        .register_action_type(&harness.admin_signer, &tree)
        .await
    {
        Err(ClientError::SlugCollision { existing, slug }) => {
            assert_eq!(existing, "Tree Planting");
            assert_eq!(slug, "tree_planting");
        }
        other => panic!("expected slug collision, got {other:?}"),
    }

    let waste = default_action_types().into_iter().nth(1).unwrap();
    let sent = harness
        .client
        .register_action_type(&harness.admin_signer, &waste)
        .await
        .unwrap();
    assert!(sent.is_some());
    match decoded_instruction(&harness.ledger.sent()[0]) {
        CarbonInstruction::RegisterActionType(args) => {
            assert_eq!(args.slug, Slug::new("waste_collection"));
            assert_eq!(args.points_per_unit, 50);
            assert!(matches!(args.unit, ActionUnit::Kilogram));
        }
        other => panic!("expected RegisterActionType, got {other:?}"),
    }
}

#[tokio::test]
async fn test_register_detects_slug_prefix_collisions() {
    let harness = Harness::seeded();
    let first = ActionTypeDefinition {
        slug: "a_very_long_action_one".to_string(),
        name: "Long One".to_string(),
        points_per_unit: 10,
        unit: ActionUnit::Kilometer,
        badge_uri: "ipfs://badges/long".to_string(),
        cooldown_secs: 600,
        per_tx_cap: 5,
    };

    let (address, _) =
        pda::action_type_address(&harness.global_address, &first.slug_bytes()).unwrap();
    let stored = carbon_sdk::state::ActionType {
        global: harness.global_address,
        slug: first.slug_bytes(),
        name: first.name.clone(),
        points_per_unit: first.points_per_unit,
        unit: first.unit,
        badge_uri: first.badge_uri.clone(),
        cooldown_secs: first.cooldown_secs,
        per_tx_cap: first.per_tx_cap,
    };
    harness.ledger.on_next_send(move |accounts| {
        accounts.insert(address, encode_account(&stored));
    });

    let registered = harness
        .client
        .register_action_type(&harness.admin_signer, &first)
        .await
        .unwrap();
    assert!(registered.is_some());

    // distinct slug string, same first 16 bytes
    let second = ActionTypeDefinition {
        slug: "a_very_long_action_two".to_string(),
        name: "Long Two".to_string(),
        ..first.clone()
    };
    assert_eq!(first.slug_bytes(), second.slug_bytes());

    match harness
        .client
        .register_action_type(&harness.admin_signer, &second)
        .await
    {
        Err(ClientError::SlugCollision { existing, .. }) => assert_eq!(existing, "Long One"),
        other => panic!("expected slug collision, got {other:?}"),
    }
}

#[tokio::test]
async fn test_pause_gates_submissions_until_unpause() {
    let harness = Harness::with_member(JOINED);
    let global_address = harness.global_address;

    harness.ledger.on_next_send(move |accounts| {
        let account = accounts.get_mut(&global_address).unwrap();
        let mut global = GlobalState::decode(&account.data).unwrap();
        global.params.paused = true;
        account.data = global.encode().unwrap();
    });
    harness.client.pause(&harness.admin_signer).await.unwrap();

    let outcome = harness
        .client
        .submit_action(&harness.signer, &harness.tree_slug(), 1, [0; 32], [0; 32])
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        SubmissionOutcome::Rejected {
            reason: RejectReason::ProgramPaused
        }
    ));
    assert_eq!(harness.ledger.sent_count(), 1);

    harness.ledger.on_next_send(move |accounts| {
        let account = accounts.get_mut(&global_address).unwrap();
        let mut global = GlobalState::decode(&account.data).unwrap();
        global.params.paused = false;
        account.data = global.encode().unwrap();
    });
    harness.client.unpause(&harness.admin_signer).await.unwrap();

    let outcome = harness
        .client
        .submit_action(&harness.signer, &harness.tree_slug(), 1, [0; 32], [0; 32])
        .await
        .unwrap();
    assert!(outcome.is_confirmed());
    assert_eq!(harness.ledger.sent_count(), 3);
}

#[tokio::test]
async fn test_set_params_reaches_the_ledger() {
    let harness = Harness::seeded();
    let global_address = harness.global_address;
    let mut params = default_params();
    params.daily_cap = 5_000;

    let applied = params.clone();
    harness.ledger.on_next_send(move |accounts| {
        let account = accounts.get_mut(&global_address).unwrap();
        let mut global = GlobalState::decode(&account.data).unwrap();
        global.params = applied;
        account.data = global.encode().unwrap();
    });

    harness
        .client
        .set_params(&harness.admin_signer, params)
        .await
        .unwrap();

    let global = harness.client.global_state().await.unwrap();
    assert_eq!(global.params.daily_cap, 5_000);
}

#[tokio::test]
async fn test_verify_action_requires_a_submission_record() {
    let harness = Harness::seeded();
    let missing = Pubkey::new_unique();

    let result = harness
        .client
        .verify_action(&harness.admin_signer, &missing, true)
        .await;

    assert!(matches!(result, Err(ClientError::SubmissionNotFound(_))));
    assert_eq!(harness.ledger.sent_count(), 0);
}

#[tokio::test]
async fn test_verify_action_signs_as_verifier() {
    let harness = Harness::with_member(JOINED);
    // put the admin in the verifier set for this deployment
    seed_global(
        &harness.ledger,
        &harness.admin,
        vec![harness.admin],
        default_params(),
    );

    let nonce = 42;
    let record = submission_record(&harness.owner, &harness.tree_address, nonce, 5);
    let address = harness.submission_address(nonce);
    harness.ledger.put_account(address, &record);

    harness
        .client
        .verify_action(&harness.admin_signer, &address, true)
        .await
        .unwrap();

    let sent = harness.ledger.sent();
    assert_eq!(sent.len(), 1);
    match decoded_instruction(&sent[0]) {
        CarbonInstruction::VerifyAction(args) => assert!(args.approve),
        other => panic!("expected VerifyAction, got {other:?}"),
    }
    assert_eq!(sent[0].message.account_keys[0], harness.admin);
}

#[tokio::test]
async fn test_redeem_with_partner_encodes_points_and_slug() {
    let harness = Harness::with_member(JOINED);

    harness
        .client
        .redeem_with_partner(&harness.signer, 250, &Slug::new("bike_shop"))
        .await
        .unwrap();

    let sent = harness.ledger.sent();
    assert_eq!(sent.len(), 1);
    match decoded_instruction(&sent[0]) {
        CarbonInstruction::RedeemWithPartner(args) => {
            assert_eq!(args.points, 250);
            assert_eq!(args.partner_slug, Slug::new("bike_shop"));
        }
        other => panic!("expected RedeemWithPartner, got {other:?}"),
    }
    assert_eq!(sent[0].message.account_keys[0], harness.owner);
}
