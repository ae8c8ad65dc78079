#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use solana_sdk::account::Account;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::Transaction;

use carbon_interface::instruction::CarbonInstruction;
use carbon_interface::pda;
use carbon_sdk::state::{
    ActionType, ActionUnit, GlobalState, Member, Params, ProgramAccount, Slug, Submission,
    SubmissionStatus,
};
use carbon_sdk::{
    CarbonClient, ClientConfig, Confirmation, KeypairSigner, LedgerConnection, SignerError,
    TransactionSigner, TransportError,
};

pub const TREE: &str = "tree_planting";

type Effect = Box<dyn FnOnce(&mut HashMap<Pubkey, Account>) + Send>;

/// In-memory ledger with scriptable failure injection.
///
/// Accounts live in a plain map; each successful send applies at most one
/// queued effect, standing in for whatever the program would have done.
/// Confirmations come from a scripted queue, defaulting to `Confirmed`.
#[derive(Default)]
pub struct MockLedger {
    accounts: Mutex<HashMap<Pubkey, Account>>,
    send_failures: Mutex<VecDeque<TransportError>>,
    confirmations: Mutex<VecDeque<Confirmation>>,
    effects: Mutex<VecDeque<Effect>>,
    sent: Mutex<Vec<Transaction>>,
    blockhashes: Mutex<Vec<Hash>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(MockLedger::default())
    }

    pub fn put_account<T: ProgramAccount>(&self, address: Pubkey, value: &T) {
        self.accounts
            .lock()
            .unwrap()
            .insert(address, encode_account(value));
    }

    pub fn remove_account(&self, address: &Pubkey) {
        self.accounts.lock().unwrap().remove(address);
    }

    /// Queue a transport error for the next `send_transaction` call.
    pub fn fail_next_send(&self, error: TransportError) {
        self.send_failures.lock().unwrap().push_back(error);
    }

    /// Queue a confirmation verdict; consumed in order.
    pub fn script_confirmation(&self, confirmation: Confirmation) {
        self.confirmations.lock().unwrap().push_back(confirmation);
    }

    /// Queue a ledger-side effect applied after the next successful send.
    pub fn on_next_send<F>(&self, effect: F)
    where
        F: FnOnce(&mut HashMap<Pubkey, Account>) + Send + 'static,
    {
        self.effects.lock().unwrap().push_back(Box::new(effect));
    }

    pub fn sent(&self) -> Vec<Transaction> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn blockhashes_issued(&self) -> Vec<Hash> {
        self.blockhashes.lock().unwrap().clone()
    }

    /// High-water mark of overlapping `send_transaction` calls.
    pub fn max_concurrent_sends(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerConnection for MockLedger {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, TransportError> {
        Ok(self.accounts.lock().unwrap().get(address).cloned())
    }

    async fn latest_blockhash(&self) -> Result<Hash, TransportError> {
        let hash = Hash::new_unique();
        self.blockhashes.lock().unwrap().push(hash);
        Ok(hash)
    }

    async fn send_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, TransportError> {
        let concurrent = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(concurrent, Ordering::SeqCst);
        // widen the window in which a second unserialized send would overlap
        tokio::time::sleep(Duration::from_millis(5)).await;

        let result = match self.send_failures.lock().unwrap().pop_front() {
            Some(error) => Err(error),
            None => {
                self.sent.lock().unwrap().push(transaction.clone());
                if let Some(effect) = self.effects.lock().unwrap().pop_front() {
                    effect(&mut self.accounts.lock().unwrap());
                }
                Ok(transaction.signatures.first().copied().unwrap_or_default())
            }
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn confirm_transaction(
        &self,
        _signature: &Signature,
    ) -> Result<Confirmation, TransportError> {
        Ok(self
            .confirmations
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Confirmation::Confirmed))
    }
}

/// Signer that refuses every request.
pub struct RejectedSigner {
    key: Pubkey,
}

impl RejectedSigner {
    pub fn new() -> Self {
        RejectedSigner {
            key: Pubkey::new_unique(),
        }
    }
}

#[async_trait]
impl TransactionSigner for RejectedSigner {
    fn pubkey(&self) -> Pubkey {
        self.key
    }

    async fn sign_transaction(
        &self,
        _transaction: Transaction,
    ) -> Result<Transaction, SignerError> {
        Err(SignerError::Rejected)
    }
}

//==================================================================
// Fixtures
//==================================================================

pub fn encode_account<T: ProgramAccount>(value: &T) -> Account {
    Account {
        lamports: 1_000_000,
        data: value.encode().unwrap(),
        owner: carbon_interface::ID,
        executable: false,
        rent_epoch: 0,
    }
}

/// Client over a fresh mock ledger, with keypair signers for the admin and
/// for one would-be member.
pub struct Harness {
    pub ledger: Arc<MockLedger>,
    pub client: CarbonClient<Arc<MockLedger>>,
    pub admin_signer: KeypairSigner,
    pub admin: Pubkey,
    pub global_address: Pubkey,
    pub tree_address: Pubkey,
    pub signer: KeypairSigner,
    pub owner: Pubkey,
}

impl Harness {
    /// Ledger seeded with a GlobalState and the tree_planting action type.
    /// The signing user has not joined.
    pub fn seeded() -> Self {
        let harness = Self::empty();
        seed_program(&harness.ledger, &harness.admin);
        harness
    }

    /// As [`seeded`](Self::seeded), with the user already a member.
    pub fn with_member(joined_at: i64) -> Self {
        let harness = Self::seeded();
        seed_member(&harness.ledger, &harness.owner, joined_at);
        harness
    }

    /// Nothing on the ledger yet; addresses are still derivable.
    pub fn empty() -> Self {
        let ledger = MockLedger::new();
        let admin_keypair = Keypair::new();
        let admin = admin_keypair.pubkey();
        let (global_address, _) = pda::global_state_address(&admin).unwrap();
        let (tree_address, _) = pda::action_type_address(&global_address, &Slug::new(TREE)).unwrap();

        let keypair = Keypair::new();
        let owner = keypair.pubkey();
        let client =
            CarbonClient::new(Arc::clone(&ledger), ClientConfig::localnet(admin)).unwrap();

        Harness {
            ledger,
            client,
            admin_signer: KeypairSigner::new(admin_keypair),
            admin,
            global_address,
            tree_address,
            signer: KeypairSigner::new(keypair),
            owner,
        }
    }

    /// Pin the nonce stream above `floor` for deterministic assertions.
    pub fn with_nonce_floor(mut self, floor: u64) -> Self {
        let client = self.client;
        self.client = client.with_nonce_floor(floor);
        self
    }

    pub fn member_address(&self) -> Pubkey {
        pda::member_address(&self.owner).unwrap().0
    }

    pub fn submission_address(&self, nonce: u64) -> Pubkey {
        pda::submission_address(&self.owner, nonce).unwrap().0
    }

    pub fn tree_slug(&self) -> Slug {
        Slug::new(TREE)
    }
}

pub fn seed_global(
    ledger: &MockLedger,
    admin: &Pubkey,
    verifiers: Vec<Pubkey>,
    params: Params,
) -> Pubkey {
    let (global_address, bump) = pda::global_state_address(admin).unwrap();
    let global = GlobalState {
        admin: *admin,
        points_mint: Pubkey::new_unique(),
        vault: Pubkey::new_unique(),
        verifiers,
        params,
        bump,
    };
    ledger.put_account(global_address, &global);
    global_address
}

pub fn seed_program(ledger: &MockLedger, admin: &Pubkey) -> (Pubkey, Pubkey) {
    let global_address = seed_global(
        ledger,
        admin,
        vec![Pubkey::new_unique()],
        carbon_sdk::default_params(),
    );

    let slug = Slug::new(TREE);
    let (tree_address, _) = pda::action_type_address(&global_address, &slug).unwrap();
    let action_type = ActionType {
        global: global_address,
        slug,
        name: "Tree Planting".to_string(),
        points_per_unit: 100,
        unit: ActionUnit::Tree,
        badge_uri: "ipfs://badges/tree_planting".to_string(),
        cooldown_secs: 3_600,
        per_tx_cap: 10,
    };
    ledger.put_account(tree_address, &action_type);

    (global_address, tree_address)
}

pub fn seed_member(ledger: &MockLedger, owner: &Pubkey, joined_at: i64) -> Pubkey {
    let (address, _) = pda::member_address(owner).unwrap();
    let member = Member {
        owner: *owner,
        points: 0,
        joined_at,
        profile_uri: None,
        last_action_at: vec![],
        points_earned_today: 0,
        day_window_start: joined_at,
    };
    ledger.put_account(address, &member);
    address
}

pub fn submission_record(
    owner: &Pubkey,
    action_type: &Pubkey,
    nonce: u64,
    amount: u64,
) -> Submission {
    let (member, _) = pda::member_address(owner).unwrap();
    Submission {
        member,
        member_owner: *owner,
        action_type: *action_type,
        amount,
        evidence_hash: [7; 32],
        location_hash: [8; 32],
        status: SubmissionStatus::Pending,
        created_at: 1_700_000_000,
        client_nonce: nonce,
    }
}

/// Decode the single instruction a sent transaction carries.
pub fn decoded_instruction(transaction: &Transaction) -> CarbonInstruction {
    let data = &transaction.message.instructions[0].data;
    CarbonInstruction::decode(data).unwrap()
}

pub fn decoded_nonce(transaction: &Transaction) -> u64 {
    match decoded_instruction(transaction) {
        CarbonInstruction::SubmitAction(args) => args.client_nonce,
        other => panic!("expected SubmitAction, got {other:?}"),
    }
}
