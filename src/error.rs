use alloy::primitives::Address;
use thiserror::Error;

use crate::contracts::ContractKind;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Failed to load configuration: {0}")]
    ConfigLoad(String),

    #[error("No usable {contract} contract at {address}: {source}")]
    HandleResolution {
        contract: ContractKind,
        address: Address,
        #[source]
        source: BoxError,
    },

    #[error("{call} on {contract} failed: {source}")]
    RemoteCall {
        contract: ContractKind,
        call: &'static str,
        #[source]
        source: BoxError,
    },
}

impl SetupError {
    pub fn resolution(contract: ContractKind, address: Address, err: impl Into<BoxError>) -> Self {
        SetupError::HandleResolution {
            contract,
            address,
            source: err.into(),
        }
    }

    pub fn remote(contract: ContractKind, call: &'static str, err: impl Into<BoxError>) -> Self {
        SetupError::RemoteCall {
            contract,
            call,
            source: err.into(),
        }
    }
}

impl From<serde_json::Error> for SetupError {
    fn from(err: serde_json::Error) -> Self {
        SetupError::ConfigLoad(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SetupError>;
