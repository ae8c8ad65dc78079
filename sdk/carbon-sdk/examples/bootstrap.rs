// Example: Bootstrapping a carbon credits deployment
//
// This example demonstrates how to:
// 1. Configure the client for a deployment admin
// 2. Derive the deployment's addresses
// 3. Prepare the initialize call and the default action catalog

use carbon_interface::pda;
use carbon_sdk::{default_action_types, default_params, CarbonClient, ClientConfig, RpcConnection};
use solana_sdk::signature::{Keypair, Signer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // 1. The admin key anchors every address in the deployment
    let admin = Keypair::new();
    let config = ClientConfig::devnet(admin.pubkey());
    let client = CarbonClient::new(RpcConnection::from_config(&config), config)?;

    println!("Deployment for admin {}", admin.pubkey());
    println!("  RPC endpoint: {}", client.config().rpc_url);

    let (global, _) = pda::global_state_address(&admin.pubkey())?;
    println!("  GlobalState: {global}");

    // 2. The catalog registered at bootstrap
    for definition in default_action_types() {
        let (address, _) = pda::action_type_address(&global, &definition.slug_bytes())?;
        println!(
            "  ActionType {} ({} points per {:?}): {address}",
            definition.slug, definition.points_per_unit, definition.unit
        );
    }

    let params = default_params();
    println!(
        "  daily cap {}, default per-tx cap {}, default cooldown {}s",
        params.daily_cap, params.per_tx_cap_default, params.cooldown_secs_default
    );

    // 3. Against a live cluster, with a funded admin keypair:
    //
    // let signer = KeypairSigner::new(admin);
    // let signature = client
    //     .ensure_initialized(&signer, verifiers, default_params(), &points_mint, &vault)
    //     .await?;
    // for definition in default_action_types() {
    //     client.register_action_type(&signer, &definition).await?;
    // }

    Ok(())
}
