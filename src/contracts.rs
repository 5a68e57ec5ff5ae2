//! Contract handles and the client used to reach them.
//!
//! The setup sequence never talks to the chain directly. It goes through a
//! [`ContractClient`], which is either the alloy-backed [`RpcClient`] or the
//! [`DryRunClient`] that only records what would have been sent.

use alloy::network::Ethereum;
use alloy::primitives::Address;
use alloy::providers::{PendingTransactionBuilder, Provider};
use alloy::sol;
use alloy::transports::http::{Client, Http};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, SetupError};

sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IManaged {
        function addManager(address _manager) external;
        function changeOwner(address _newOwner) external;
        function owner() external view returns (address);
    }
);

sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IDexRegistry {
        function setAuthorised(address[] calldata _dexes, bool[] calldata _authorised) external;
    }
);

/// The seven deployed contracts touched by the setup script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractKind {
    EnsResolver,
    EnsManager,
    WalletFactory,
    ModuleRegistry,
    CompoundRegistry,
    TokenPriceRegistry,
    DexRegistry,
}

impl ContractKind {
    /// Ownership transfer order.
    pub const ALL: [ContractKind; 7] = [
        ContractKind::EnsResolver,
        ContractKind::EnsManager,
        ContractKind::WalletFactory,
        ContractKind::ModuleRegistry,
        ContractKind::CompoundRegistry,
        ContractKind::TokenPriceRegistry,
        ContractKind::DexRegistry,
    ];

    /// Artifact name of the deployed contract.
    pub fn contract_name(&self) -> &'static str {
        match self {
            ContractKind::EnsResolver => "ArgentENSResolver",
            ContractKind::EnsManager => "ArgentENSManager",
            ContractKind::WalletFactory => "WalletFactory",
            ContractKind::ModuleRegistry => "ModuleRegistry",
            ContractKind::CompoundRegistry => "CompoundRegistry",
            ContractKind::TokenPriceRegistry => "TokenPriceRegistry",
            ContractKind::DexRegistry => "DexRegistry",
        }
    }

    /// Name used in progress lines, e.g. "the manager of the ENS Resolver".
    pub fn label(&self) -> &'static str {
        match self {
            ContractKind::EnsResolver => "ENS Resolver",
            ContractKind::EnsManager => "ENS Manager",
            other => other.contract_name(),
        }
    }
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.contract_name())
    }
}

/// A deployed contract bound to its kind, so logging never has to guess a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractHandle {
    pub kind: ContractKind,
    pub address: Address,
}

impl ContractHandle {
    pub fn new(kind: ContractKind, address: Address) -> Self {
        Self { kind, address }
    }
}

/// Remote operations the setup sequence relies on.
///
/// Every mutating call returns only once the transaction has been
/// acknowledged (or has failed). Implementations must not retry.
#[async_trait]
pub trait ContractClient: Send + Sync {
    async fn resolve(&self, kind: ContractKind, address: Address) -> Result<ContractHandle>;

    async fn add_manager(&self, target: &ContractHandle, manager: Address) -> Result<()>;

    async fn change_owner(&self, target: &ContractHandle, owner: Address) -> Result<()>;

    async fn set_authorised(
        &self,
        registry: &ContractHandle,
        exchanges: &[Address],
        flags: &[bool],
    ) -> Result<()>;
}

/// How long and how deep to wait for each receipt.
#[derive(Debug, Clone, Copy)]
pub struct ReceiptSettings {
    pub confirmations: u64,
    /// `None` leaves the decision to the transport.
    pub timeout: Option<Duration>,
}

impl Default for ReceiptSettings {
    fn default() -> Self {
        Self {
            confirmations: 1,
            timeout: None,
        }
    }
}

pub type HttpTransport = Http<Client>;

/// The zero address never holds a contract, whichever client is asked.
fn reject_zero_address(kind: ContractKind, address: Address) -> Result<()> {
    if address == Address::ZERO {
        return Err(SetupError::resolution(kind, address, "zero address"));
    }
    Ok(())
}

/// [`ContractClient`] backed by an alloy HTTP provider with a signing wallet.
pub struct RpcClient<P> {
    provider: P,
    receipts: ReceiptSettings,
}

impl<P> RpcClient<P>
where
    P: Provider<HttpTransport, Ethereum> + Clone,
{
    pub fn new(provider: P, receipts: ReceiptSettings) -> Self {
        Self { provider, receipts }
    }

    /// Current owner of a managed contract.
    pub async fn owner(&self, handle: &ContractHandle) -> Result<Address> {
        let managed = IManaged::new(handle.address, self.provider.clone());
        let owner = managed
            .owner()
            .call()
            .await
            .map_err(|e| SetupError::remote(handle.kind, "owner", e))?
            ._0;
        Ok(owner)
    }

    async fn confirm(
        &self,
        kind: ContractKind,
        call: &'static str,
        pending: PendingTransactionBuilder<HttpTransport, Ethereum>,
    ) -> Result<()> {
        let tx_hash = *pending.tx_hash();
        debug!("   Transaction sent: {}", tx_hash);

        let receipt = pending
            .with_required_confirmations(self.receipts.confirmations)
            .with_timeout(self.receipts.timeout)
            .get_receipt()
            .await
            .map_err(|e| SetupError::remote(kind, call, e))?;

        if !receipt.status() {
            return Err(SetupError::remote(
                kind,
                call,
                format!("transaction {} reverted", tx_hash),
            ));
        }

        debug!(
            "   Confirmed in block {}",
            receipt.block_number.unwrap_or_default()
        );
        Ok(())
    }
}

#[async_trait]
impl<P> ContractClient for RpcClient<P>
where
    P: Provider<HttpTransport, Ethereum> + Clone,
{
    async fn resolve(&self, kind: ContractKind, address: Address) -> Result<ContractHandle> {
        reject_zero_address(kind, address)?;

        let code = self
            .provider
            .get_code_at(address)
            .await
            .map_err(|e| SetupError::resolution(kind, address, e))?;

        if code.is_empty() {
            return Err(SetupError::resolution(kind, address, "no contract code deployed"));
        }

        Ok(ContractHandle::new(kind, address))
    }

    async fn add_manager(&self, target: &ContractHandle, manager: Address) -> Result<()> {
        let managed = IManaged::new(target.address, self.provider.clone());
        let pending = managed
            .addManager(manager)
            .send()
            .await
            .map_err(|e| SetupError::remote(target.kind, "addManager", e))?;
        self.confirm(target.kind, "addManager", pending).await
    }

    async fn change_owner(&self, target: &ContractHandle, owner: Address) -> Result<()> {
        let managed = IManaged::new(target.address, self.provider.clone());
        let pending = managed
            .changeOwner(owner)
            .send()
            .await
            .map_err(|e| SetupError::remote(target.kind, "changeOwner", e))?;
        self.confirm(target.kind, "changeOwner", pending).await
    }

    async fn set_authorised(
        &self,
        registry: &ContractHandle,
        exchanges: &[Address],
        flags: &[bool],
    ) -> Result<()> {
        if exchanges.len() != flags.len() {
            return Err(SetupError::remote(
                registry.kind,
                "setAuthorised",
                format!(
                    "{} exchanges but {} flags",
                    exchanges.len(),
                    flags.len()
                ),
            ));
        }

        let dex_registry = IDexRegistry::new(registry.address, self.provider.clone());
        let pending = dex_registry
            .setAuthorised(exchanges.to_vec(), flags.to_vec())
            .send()
            .await
            .map_err(|e| SetupError::remote(registry.kind, "setAuthorised", e))?;
        self.confirm(registry.kind, "setAuthorised", pending).await
    }
}

/// A mutating call as seen by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    SetAuthorised {
        contract: ContractKind,
        exchanges: Vec<Address>,
        flags: Vec<bool>,
    },
    AddManager {
        contract: ContractKind,
        manager: Address,
    },
    ChangeOwner {
        contract: ContractKind,
        owner: Address,
    },
}

/// Accepts every call and keeps a log of them. Nothing leaves the process.
#[derive(Default)]
pub struct DryRunClient {
    calls: Mutex<Vec<RecordedCall>>,
}

impl DryRunClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ContractClient for DryRunClient {
    async fn resolve(&self, kind: ContractKind, address: Address) -> Result<ContractHandle> {
        reject_zero_address(kind, address)?;
        Ok(ContractHandle::new(kind, address))
    }

    async fn add_manager(&self, target: &ContractHandle, manager: Address) -> Result<()> {
        self.calls.lock().push(RecordedCall::AddManager {
            contract: target.kind,
            manager,
        });
        Ok(())
    }

    async fn change_owner(&self, target: &ContractHandle, owner: Address) -> Result<()> {
        self.calls.lock().push(RecordedCall::ChangeOwner {
            contract: target.kind,
            owner,
        });
        Ok(())
    }

    async fn set_authorised(
        &self,
        registry: &ContractHandle,
        exchanges: &[Address],
        flags: &[bool],
    ) -> Result<()> {
        self.calls.lock().push(RecordedCall::SetAuthorised {
            contract: registry.kind,
            exchanges: exchanges.to_vec(),
            flags: flags.to_vec(),
        });
        Ok(())
    }
}
