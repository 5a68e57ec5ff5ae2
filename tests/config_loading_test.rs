//! Loading per-environment configuration files from disk.

use alloy::primitives::Address;
use setup_contracts::{DeploymentConfig, SetupError};
use std::fs;
use tempfile::TempDir;

const STAGING: &str = r#"{
    "contracts": {
        "ENSResolver": "0x0000000000000000000000000000000000000001",
        "ENSManager": "0x0000000000000000000000000000000000000002",
        "WalletFactory": "0x0000000000000000000000000000000000000003",
        "ModuleRegistry": "0x0000000000000000000000000000000000000004",
        "CompoundRegistry": "0x0000000000000000000000000000000000000005",
        "DexRegistry": "0x0000000000000000000000000000000000000006",
        "MultiSigWallet": "0x0000000000000000000000000000000000000007"
    },
    "modules": { "TokenPriceRegistry": "0x0000000000000000000000000000000000000008" },
    "defi": { "paraswap": { "authorisedExchanges": {
        "Uniswap": "0x00000000000000000000000000000000000000e1"
    } } },
    "backend": { "accounts": ["0x00000000000000000000000000000000000000a1"] }
}"#;

fn config_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("staging.json"), STAGING).unwrap();
    dir
}

#[test]
fn test_load_by_environment() {
    let dir = config_dir();

    let config = DeploymentConfig::load(dir.path(), "staging").unwrap();

    assert_eq!(config.multisig(), Address::with_last_byte(0x07));
    assert_eq!(
        config.authorised_exchanges(),
        vec![Address::with_last_byte(0xe1)]
    );
    assert_eq!(config.backend_accounts(), &[Address::with_last_byte(0xa1)]);
}

#[test]
fn test_missing_environment_is_config_error() {
    let dir = config_dir();

    let err = DeploymentConfig::load(dir.path(), "prod").unwrap_err();

    match err {
        SetupError::ConfigLoad(msg) => assert!(msg.contains("prod.json"), "{msg}"),
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn test_malformed_file_is_config_error() {
    let dir = config_dir();
    fs::write(dir.path().join("broken.json"), "{ \"contracts\": ").unwrap();

    let err = DeploymentConfig::load(dir.path(), "broken").unwrap_err();

    match err {
        SetupError::ConfigLoad(msg) => assert!(msg.contains("broken.json"), "{msg}"),
        other => panic!("expected config error, got {other:?}"),
    }
}
