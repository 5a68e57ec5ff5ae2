//! Post-deployment wiring for the wallet contracts.
//!
//! Authorises the configured exchanges on the DexRegistry, grants manager
//! roles and transfers ownership of every contract to the multisig.

pub mod config;
pub mod contracts;
pub mod error;
pub mod setup;

pub use config::DeploymentConfig;
pub use contracts::{
    ContractClient, ContractHandle, ContractKind, DryRunClient, RecordedCall, ReceiptSettings,
    RpcClient,
};
pub use error::SetupError;
pub use setup::{plan_steps, resolve_contracts, run_setup, SetupStep};
