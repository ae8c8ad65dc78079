// Example: Joining and submitting an environmental action
//
// This example demonstrates how to:
// 1. Build a client and a keypair signer
// 2. Derive the member's addresses
// 3. Encode a submission at the wire layer

use carbon_interface::{instruction, pda, Slug};
use carbon_sdk::{
    CarbonClient, ClientConfig, KeypairSigner, RpcConnection, TransactionSigner,
};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // 1. Client against devnet; the admin key identifies the deployment
    let admin = Pubkey::new_unique(); // replace with the deployment's admin
    let config = ClientConfig::devnet(admin);
    let client = CarbonClient::new(RpcConnection::from_config(&config), config)?;

    // 2. The member signs with a local keypair
    let signer = KeypairSigner::new(Keypair::new());
    let owner = signer.pubkey();
    let (member, _) = pda::member_address(&owner)?;
    println!("Member {owner}");
    println!("  account: {member}");
    println!("  cached membership: {:?}", client.membership_hint(&owner));

    // 3. One tree planted; hashes come from the evidence pipeline
    let slug = Slug::new("tree_planting");
    let evidence_hash = [0u8; 32]; // sha256 of the uploaded evidence
    let location_hash = [0u8; 32]; // sha256 of the geotag payload

    // submit_action picks the nonce itself; the raw builder takes it
    // explicitly
    let built = instruction::submit_action(
        &owner,
        &admin,
        slug,
        1,
        1_700_000_042,
        evidence_hash,
        location_hash,
    )?;
    println!(
        "  submit_action for {slug}: {} accounts, {} byte payload",
        built.accounts.len(),
        built.data.len()
    );

    // Against a live cluster, with a funded keypair:
    //
    // let outcome = client.join(&signer, Some("ipfs://profile".to_string())).await?;
    // println!("join: {outcome:?}");
    // let outcome = client
    //     .submit_action(&signer, &slug, 1, evidence_hash, location_hash)
    //     .await?;
    // println!("submit: {outcome:?}");

    Ok(())
}
