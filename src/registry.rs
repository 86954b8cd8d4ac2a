//! Read-only provider registry, loaded once at process start.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::Result;
use crate::types::{
    ChainSet, ConnectorType, IdentityProviderDescriptor, RawProviderDescriptor, WebVersion,
};

static BUILTIN_REGISTRY: OnceLock<ProviderRegistry> = OnceLock::new();

/// Static mapping from provider code to descriptor.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, IdentityProviderDescriptor>,
}

impl ProviderRegistry {
    pub fn new(descriptors: impl IntoIterator<Item = IdentityProviderDescriptor>) -> Self {
        Self {
            providers: descriptors
                .into_iter()
                .map(|d| (d.code.clone(), d))
                .collect(),
        }
    }

    /// Build from serialized descriptors. An unrecognized web-version label
    /// fails `UnknownWebVersion` here, at build time, never later.
    pub fn from_raw(raw: impl IntoIterator<Item = RawProviderDescriptor>) -> Result<Self> {
        let descriptors = raw
            .into_iter()
            .map(IdentityProviderDescriptor::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(descriptors))
    }

    /// The built-in provider set.
    pub fn builtin() -> &'static ProviderRegistry {
        BUILTIN_REGISTRY.get_or_init(|| Self::new(builtin_descriptors()))
    }

    pub fn get(&self, code: &str) -> Option<&IdentityProviderDescriptor> {
        self.providers.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.providers.contains_key(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IdentityProviderDescriptor> {
        self.providers.values()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

fn builtin_descriptors() -> Vec<IdentityProviderDescriptor> {
    vec![
        IdentityProviderDescriptor {
            code: "metamask".to_string(),
            display_name: "MetaMask".to_string(),
            web_version: WebVersion::Decentralized,
            connector: ConnectorType::Injected,
            provider_path: Some("ethereum".to_string()),
            chain_constraints: ChainSet::new(),
        },
        IdentityProviderDescriptor {
            code: "coinbase".to_string(),
            display_name: "Coinbase Wallet".to_string(),
            web_version: WebVersion::Decentralized,
            connector: ConnectorType::Injected,
            provider_path: Some("coinbaseWalletExtension".to_string()),
            chain_constraints: ChainSet::new(),
        },
        IdentityProviderDescriptor {
            code: "walletconnect".to_string(),
            display_name: "WalletConnect".to_string(),
            web_version: WebVersion::Decentralized,
            connector: ConnectorType::Remote,
            provider_path: None,
            chain_constraints: ChainSet::new(),
        },
        IdentityProviderDescriptor {
            code: "google".to_string(),
            display_name: "Google".to_string(),
            web_version: WebVersion::Centralized,
            connector: ConnectorType::Remote,
            provider_path: None,
            chain_constraints: ChainSet::new(),
        },
        IdentityProviderDescriptor {
            code: "discord".to_string(),
            display_name: "Discord".to_string(),
            web_version: WebVersion::Centralized,
            connector: ConnectorType::Remote,
            provider_path: None,
            chain_constraints: ChainSet::new(),
        },
        IdentityProviderDescriptor {
            code: "github".to_string(),
            display_name: "GitHub".to_string(),
            web_version: WebVersion::Centralized,
            connector: ConnectorType::Remote,
            provider_path: None,
            chain_constraints: ChainSet::new(),
        },
    ]
}
