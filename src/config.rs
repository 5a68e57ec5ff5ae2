//! Deployment configuration, one JSON document per environment.
//!
//! Only the keys the setup script reads are modelled; everything else in the
//! document is ignored.

use alloy::primitives::Address;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::contracts::ContractKind;
use crate::error::{Result, SetupError};

#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentConfig {
    pub contracts: ContractAddresses,
    pub modules: ModuleAddresses,
    pub defi: DefiConfig,
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContractAddresses {
    #[serde(rename = "ENSResolver")]
    pub ens_resolver: Address,
    #[serde(rename = "ENSManager")]
    pub ens_manager: Address,
    #[serde(rename = "WalletFactory")]
    pub wallet_factory: Address,
    #[serde(rename = "ModuleRegistry")]
    pub module_registry: Address,
    #[serde(rename = "CompoundRegistry")]
    pub compound_registry: Address,
    #[serde(rename = "DexRegistry")]
    pub dex_registry: Address,
    #[serde(rename = "MultiSigWallet")]
    pub multisig_wallet: Address,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModuleAddresses {
    #[serde(rename = "TokenPriceRegistry")]
    pub token_price_registry: Address,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DefiConfig {
    pub paraswap: ParaswapConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParaswapConfig {
    /// Name -> exchange address, kept in document order.
    #[serde(
        rename = "authorisedExchanges",
        deserialize_with = "deserialize_ordered_addresses"
    )]
    pub authorised_exchanges: Vec<(String, Address)>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub accounts: Vec<Address>,
}

impl DeploymentConfig {
    /// Path of the document for `env` inside `config_dir`.
    pub fn path_for(config_dir: &Path, env: &str) -> PathBuf {
        config_dir.join(format!("{env}.json"))
    }

    pub fn load(config_dir: &Path, env: &str) -> Result<Self> {
        let path = Self::path_for(config_dir, env);
        let raw = fs::read_to_string(&path)
            .map_err(|e| SetupError::ConfigLoad(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| SetupError::ConfigLoad(format!("{}: {}", path.display(), e)))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Address configured for each contract, in ownership transfer order.
    pub fn contract_addresses(&self) -> [(ContractKind, Address); 7] {
        let c = &self.contracts;
        [
            (ContractKind::EnsResolver, c.ens_resolver),
            (ContractKind::EnsManager, c.ens_manager),
            (ContractKind::WalletFactory, c.wallet_factory),
            (ContractKind::ModuleRegistry, c.module_registry),
            (ContractKind::CompoundRegistry, c.compound_registry),
            (ContractKind::TokenPriceRegistry, self.modules.token_price_registry),
            (ContractKind::DexRegistry, c.dex_registry),
        ]
    }

    pub fn multisig(&self) -> Address {
        self.contracts.multisig_wallet
    }

    pub fn authorised_exchanges(&self) -> Vec<Address> {
        self.defi
            .paraswap
            .authorised_exchanges
            .iter()
            .map(|(_, address)| *address)
            .collect()
    }

    pub fn backend_accounts(&self) -> &[Address] {
        &self.backend.accounts
    }
}

fn deserialize_ordered_addresses<'de, D>(
    deserializer: D,
) -> std::result::Result<Vec<(String, Address)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedAddresses;

    impl<'de> Visitor<'de> for OrderedAddresses {
        type Value = Vec<(String, Address)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of names to addresses")
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, address)) = map.next_entry::<String, Address>()? {
                if entries.iter().any(|(existing, _)| existing == &name) {
                    return Err(de::Error::custom(format!("duplicate exchange {name}")));
                }
                entries.push((name, address));
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(OrderedAddresses)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "ENV": "test",
        "contracts": {
            "ENSResolver": "0x0000000000000000000000000000000000000001",
            "ENSManager": "0x0000000000000000000000000000000000000002",
            "WalletFactory": "0x0000000000000000000000000000000000000003",
            "ModuleRegistry": "0x0000000000000000000000000000000000000004",
            "CompoundRegistry": "0x0000000000000000000000000000000000000005",
            "DexRegistry": "0x0000000000000000000000000000000000000006",
            "MultiSigWallet": "0x0000000000000000000000000000000000000007",
            "BaseWallet": "0x00000000000000000000000000000000000000ff"
        },
        "modules": {
            "TokenPriceRegistry": "0x0000000000000000000000000000000000000008"
        },
        "defi": {
            "paraswap": {
                "contract": "0x00000000000000000000000000000000000000aa",
                "authorisedExchanges": {
                    "Zeta": "0x00000000000000000000000000000000000000b2",
                    "Alpha": "0x00000000000000000000000000000000000000b1"
                }
            }
        },
        "backend": {
            "accounts": [
                "0x00000000000000000000000000000000000000c1",
                "0x00000000000000000000000000000000000000c2"
            ]
        }
    }"#;

    fn addr(last: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = last;
        Address::from(bytes)
    }

    #[test]
    fn test_parse_ignores_unknown_keys() {
        let config = DeploymentConfig::from_json(SAMPLE).unwrap();
        assert_eq!(config.contracts.ens_resolver, addr(1));
        assert_eq!(config.multisig(), addr(7));
        assert_eq!(config.modules.token_price_registry, addr(8));
        assert_eq!(config.backend_accounts(), &[addr(0xc1), addr(0xc2)]);
    }

    #[test]
    fn test_exchanges_keep_document_order() {
        let config = DeploymentConfig::from_json(SAMPLE).unwrap();
        let names: Vec<&str> = config
            .defi
            .paraswap
            .authorised_exchanges
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
        assert_eq!(config.authorised_exchanges(), vec![addr(0xb2), addr(0xb1)]);
    }

    #[test]
    fn test_contract_addresses_follow_ownership_order() {
        let config = DeploymentConfig::from_json(SAMPLE).unwrap();
        let pairs = config.contract_addresses();
        let kinds: Vec<ContractKind> = pairs.iter().map(|(kind, _)| *kind).collect();
        assert_eq!(kinds, ContractKind::ALL.to_vec());
        assert_eq!(pairs[5], (ContractKind::TokenPriceRegistry, addr(8)));
        assert_eq!(pairs[6], (ContractKind::DexRegistry, addr(6)));
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let broken = SAMPLE.replace("\"MultiSigWallet\"", "\"MultiSig\"");
        let err = DeploymentConfig::from_json(&broken).unwrap_err();
        assert!(matches!(err, SetupError::ConfigLoad(ref msg) if msg.contains("MultiSigWallet")));
    }

    #[test]
    fn test_bad_address_is_config_error() {
        let broken = SAMPLE.replace(
            "0x00000000000000000000000000000000000000c2",
            "not-an-address",
        );
        let err = DeploymentConfig::from_json(&broken).unwrap_err();
        assert!(matches!(err, SetupError::ConfigLoad(_)));
    }

    #[test]
    fn test_duplicate_exchange_rejected() {
        let broken = SAMPLE.replace("\"Alpha\"", "\"Zeta\"");
        let err = DeploymentConfig::from_json(&broken).unwrap_err();
        match err {
            SetupError::ConfigLoad(msg) => {
                assert!(msg.contains("duplicate exchange Zeta"), "{msg}")
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }
}
