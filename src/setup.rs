//! The setup sequence: authorise exchanges, grant manager roles, then hand
//! every contract over to the multisig.
//!
//! Calls are issued one at a time and the first failure stops the run.
//! Nothing already applied is rolled back.

use alloy::primitives::Address;
use std::fmt;
use tracing::{debug, info};

use crate::config::DeploymentConfig;
use crate::contracts::{ContractClient, ContractHandle, ContractKind};
use crate::error::Result;

pub const COMPLETION_LINE: &str = "## completed deployment script 3 ##";

/// Handles for the seven contracts, resolved before any mutation.
#[derive(Debug, Clone)]
pub struct ResolvedContracts {
    pub ens_resolver: ContractHandle,
    pub ens_manager: ContractHandle,
    pub wallet_factory: ContractHandle,
    pub module_registry: ContractHandle,
    pub compound_registry: ContractHandle,
    pub token_price_registry: ContractHandle,
    pub dex_registry: ContractHandle,
}

impl ResolvedContracts {
    pub fn ownership_order(&self) -> [&ContractHandle; 7] {
        [
            &self.ens_resolver,
            &self.ens_manager,
            &self.wallet_factory,
            &self.module_registry,
            &self.compound_registry,
            &self.token_price_registry,
            &self.dex_registry,
        ]
    }
}

/// One mutating call in the setup sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupStep {
    AuthoriseExchanges {
        registry: ContractHandle,
        exchanges: Vec<Address>,
    },
    AddManager {
        target: ContractHandle,
        manager: Address,
        /// How the manager is named in the progress line.
        manager_name: String,
    },
    ChangeOwner {
        target: ContractHandle,
        owner: Address,
    },
}

impl SetupStep {
    pub async fn apply<C>(&self, client: &C) -> Result<()>
    where
        C: ContractClient + ?Sized,
    {
        match self {
            SetupStep::AuthoriseExchanges {
                registry,
                exchanges,
            } => {
                let flags = vec![true; exchanges.len()];
                client.set_authorised(registry, exchanges, &flags).await
            }
            SetupStep::AddManager {
                target, manager, ..
            } => client.add_manager(target, *manager).await,
            SetupStep::ChangeOwner { target, owner } => client.change_owner(target, *owner).await,
        }
    }
}

impl fmt::Display for SetupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupStep::AuthoriseExchanges { registry, .. } => {
                write!(f, "Setting up {}", registry.kind)
            }
            SetupStep::AddManager {
                target,
                manager_name,
                ..
            } => write!(
                f,
                "Set {} as the manager of the {}",
                manager_name,
                target.kind.label()
            ),
            SetupStep::ChangeOwner { target, .. } => {
                write!(f, "Set the MultiSig as the owner of {}", target.kind)
            }
        }
    }
}

pub async fn resolve_contracts<C>(client: &C, config: &DeploymentConfig) -> Result<ResolvedContracts>
where
    C: ContractClient + ?Sized,
{
    let c = &config.contracts;
    Ok(ResolvedContracts {
        ens_resolver: client.resolve(ContractKind::EnsResolver, c.ens_resolver).await?,
        ens_manager: client.resolve(ContractKind::EnsManager, c.ens_manager).await?,
        wallet_factory: client.resolve(ContractKind::WalletFactory, c.wallet_factory).await?,
        module_registry: client.resolve(ContractKind::ModuleRegistry, c.module_registry).await?,
        compound_registry: client
            .resolve(ContractKind::CompoundRegistry, c.compound_registry)
            .await?,
        token_price_registry: client
            .resolve(
                ContractKind::TokenPriceRegistry,
                config.modules.token_price_registry,
            )
            .await?,
        dex_registry: client.resolve(ContractKind::DexRegistry, c.dex_registry).await?,
    })
}

/// Full ordered call sequence for a configuration.
pub fn plan_steps(config: &DeploymentConfig, contracts: &ResolvedContracts) -> Vec<SetupStep> {
    let accounts = config.backend_accounts();
    let mut steps = Vec::with_capacity(1 + 3 + 2 * accounts.len() + 7);

    steps.push(SetupStep::AuthoriseExchanges {
        registry: contracts.dex_registry,
        exchanges: config.authorised_exchanges(),
    });

    let add_manager = |target: ContractHandle, manager: Address, name: String| {
        SetupStep::AddManager {
            target,
            manager,
            manager_name: name,
        }
    };

    steps.push(add_manager(
        contracts.ens_resolver,
        config.contracts.ens_manager,
        "the ENS Manager".to_string(),
    ));
    steps.push(add_manager(
        contracts.ens_resolver,
        config.multisig(),
        "the Multisig".to_string(),
    ));
    steps.push(add_manager(
        contracts.ens_manager,
        config.contracts.wallet_factory,
        "the WalletFactory".to_string(),
    ));

    for account in accounts {
        steps.push(add_manager(
            contracts.wallet_factory,
            *account,
            account.to_string(),
        ));
        steps.push(add_manager(
            contracts.token_price_registry,
            *account,
            account.to_string(),
        ));
    }

    for target in contracts.ownership_order() {
        steps.push(SetupStep::ChangeOwner {
            target: *target,
            owner: config.multisig(),
        });
    }

    steps
}

/// Run the whole sequence against `client`.
pub async fn run_setup<C>(client: &C, config: &DeploymentConfig) -> Result<()>
where
    C: ContractClient + ?Sized,
{
    let contracts = resolve_contracts(client, config).await?;
    for handle in contracts.ownership_order() {
        debug!("{} at {}", handle.kind, handle.address);
    }

    let steps = plan_steps(config, &contracts);
    debug!("{} calls to issue", steps.len());

    for step in &steps {
        info!("{}", step);
        step.apply(client).await?;
    }

    info!("{}", COMPLETION_LINE);
    Ok(())
}
