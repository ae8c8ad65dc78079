mod common;

use carbon_sdk::{KeypairSigner, TransactionSigner};
use common::{decoded_nonce, seed_member, Harness};
use solana_sdk::signature::Keypair;

const FLOOR: u64 = 1_000_000_000_000;
const JOINED: i64 = 1_600_000_000;

#[tokio::test]
async fn test_same_owner_submissions_serialize() {
    let harness = Harness::with_member(JOINED).with_nonce_floor(FLOOR);
    let slug = harness.tree_slug();

    let (first, second) = tokio::join!(
        harness
            .client
            .submit_action(&harness.signer, &slug, 1, [1; 32], [1; 32]),
        harness
            .client
            .submit_action(&harness.signer, &slug, 2, [2; 32], [2; 32]),
    );

    assert!(first.unwrap().is_confirmed());
    assert!(second.unwrap().is_confirmed());

    // the owner lock keeps the pipeline exclusive end to end
    assert_eq!(harness.ledger.max_concurrent_sends(), 1);
    let sent = harness.ledger.sent();
    assert_eq!(sent.len(), 2);
    assert_ne!(decoded_nonce(&sent[0]), decoded_nonce(&sent[1]));
}

#[tokio::test]
async fn test_distinct_owners_share_one_nonce_stream() {
    let harness = Harness::with_member(JOINED).with_nonce_floor(FLOOR);
    let slug = harness.tree_slug();

    let second_signer = KeypairSigner::new(Keypair::new());
    seed_member(&harness.ledger, &second_signer.pubkey(), JOINED);

    let (first, second) = tokio::join!(
        harness
            .client
            .submit_action(&harness.signer, &slug, 1, [1; 32], [1; 32]),
        harness
            .client
            .submit_action(&second_signer, &slug, 2, [2; 32], [2; 32]),
    );

    assert!(first.unwrap().is_confirmed());
    assert!(second.unwrap().is_confirmed());

    let sent = harness.ledger.sent();
    assert_eq!(sent.len(), 2);
    // different fee payers, nonces still unique
    assert_ne!(
        sent[0].message.account_keys[0],
        sent[1].message.account_keys[0]
    );
    assert_ne!(decoded_nonce(&sent[0]), decoded_nonce(&sent[1]));
}
