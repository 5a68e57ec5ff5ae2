use alloy::network::EthereumWallet;
use alloy::providers::ProviderBuilder;
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use clap::Parser;
use setup_contracts::{run_setup, DeploymentConfig, DryRunClient, ReceiptSettings, RpcClient};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser, Debug)]
#[command(author, version, about = "Wire managers and hand contract ownership to the multisig")]
struct Cli {
    /// Deployment environment, selects <config-dir>/<env>.json
    #[arg(long = "env", env = "DEPLOY_ENV", default_value = "staging")]
    environment: String,

    /// Directory holding the per-environment configuration files
    #[arg(long, env = "CONFIG_DIR", default_value = "config")]
    config_dir: PathBuf,

    /// JSON-RPC endpoint
    #[arg(long, env = "RPC_URL")]
    rpc_url: Option<Url>,

    /// Key of the account that currently owns the contracts
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Confirmations to wait for on every transaction
    #[arg(long, env = "CONFIRMATIONS", default_value_t = 1)]
    confirmations: u64,

    /// Give up waiting for a receipt after this many seconds
    #[arg(long, env = "RECEIPT_TIMEOUT_SECS")]
    receipt_timeout_secs: Option<u64>,

    /// Log every call without sending anything
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!("📝 Environment: {}", cli.environment);
    let config = DeploymentConfig::load(&cli.config_dir, &cli.environment)?;
    info!(
        "📋 {} backend accounts, {} authorised exchanges",
        config.backend_accounts().len(),
        config.authorised_exchanges().len()
    );

    if cli.dry_run {
        warn!("🧪 Dry run, nothing will be sent");
        let client = DryRunClient::new();
        run_setup(&client, &config).await?;
        info!("🧾 {} calls recorded", client.calls().len());
        return Ok(());
    }

    let rpc_url = cli.rpc_url.context("RPC_URL must be set")?;
    let private_key = cli.private_key.context("PRIVATE_KEY must be set")?;

    let signer = PrivateKeySigner::from_str(&private_key).context("invalid PRIVATE_KEY")?;
    info!("🔑 Deployer: {}", signer.address());
    info!("🌐 RPC URL: {}", rpc_url);

    let provider = ProviderBuilder::new()
        .with_recommended_fillers()
        .wallet(EthereumWallet::from(signer))
        .on_http(rpc_url);

    let receipts = ReceiptSettings {
        confirmations: cli.confirmations,
        timeout: cli.receipt_timeout_secs.map(Duration::from_secs),
    };

    let client = RpcClient::new(provider, receipts);
    run_setup(&client, &config).await?;

    Ok(())
}
