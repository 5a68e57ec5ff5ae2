//! Print the addresses the setup script would use, and their current owners
//! when an RPC endpoint is available.

use alloy::providers::ProviderBuilder;
use anyhow::Result;
use setup_contracts::{ContractHandle, DeploymentConfig, ReceiptSettings, RpcClient};
use std::env;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let environment = env::var("DEPLOY_ENV").unwrap_or_else(|_| "staging".to_string());
    let config_dir = PathBuf::from(env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string()));

    let config = DeploymentConfig::load(&config_dir, &environment)?;
    println!(
        "Config: {}",
        DeploymentConfig::path_for(&config_dir, &environment).display()
    );

    let client = match env::var("RPC_URL") {
        Ok(url) => {
            let provider = ProviderBuilder::new().on_http(url.parse()?);
            Some(RpcClient::new(provider, ReceiptSettings::default()))
        }
        Err(_) => None,
    };

    println!("\nContracts:");
    for (kind, address) in config.contract_addresses() {
        match &client {
            Some(client) => {
                let owner = match client.owner(&ContractHandle::new(kind, address)).await {
                    Ok(owner) => owner.to_string(),
                    Err(e) => format!("unknown ({})", e),
                };
                println!("  {:<20} {} owner {}", kind.contract_name(), address, owner);
            }
            None => println!("  {:<20} {}", kind.contract_name(), address),
        }
    }
    println!("  {:<20} {}", "MultiSigWallet", config.multisig());

    println!("\nAuthorised exchanges:");
    for (name, address) in &config.defi.paraswap.authorised_exchanges {
        println!("  {:<20} {}", name, address);
    }

    println!("\nBackend accounts:");
    for account in config.backend_accounts() {
        println!("  {}", account);
    }

    Ok(())
}
