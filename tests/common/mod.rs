#![allow(dead_code)]
//! Shared test helpers: mock injected wallet and descriptor fixtures.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use gatekit::channel::{ChannelFactory, ConnectPayload, InjectedChannel, InjectedProvider};
use gatekit::error::{GatekitError, Result};
use gatekit::types::{ChainSet, ConnectorType, IdentityProviderDescriptor, WebVersion};

/// A mock wallet-style injected provider with canned accounts and chain.
pub struct MockWallet {
    pub accounts: Vec<String>,
    pub chain_id: u64,
    pub authorized: bool,
    pub reject_connect: bool,
    /// Simulate providers that report nothing until polled.
    pub omit_chain_on_connect: bool,
    pub connect_calls: AtomicU32,
}

impl MockWallet {
    pub fn new(accounts: &[&str], chain_id: u64) -> Self {
        Self {
            accounts: accounts.iter().map(|a| a.to_string()).collect(),
            chain_id,
            authorized: true,
            reject_connect: false,
            omit_chain_on_connect: false,
            connect_calls: AtomicU32::new(0),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            reject_connect: true,
            ..Self::new(&[], 0)
        }
    }
}

#[async_trait]
impl InjectedProvider for MockWallet {
    fn path(&self) -> &str {
        "ethereum"
    }

    async fn connect(&self, _options: Option<serde_json::Value>) -> Result<ConnectPayload> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_connect {
            return Err(GatekitError::ConnectionRejected(
                "user rejected the request".to_string(),
            ));
        }
        Ok(ConnectPayload {
            accounts: self.accounts.clone(),
            chain_id: (!self.omit_chain_on_connect).then_some(self.chain_id),
            raw: serde_json::json!({"path": "ethereum"}),
        })
    }

    async fn ping(&self) -> Result<Option<serde_json::Value>> {
        Ok(self
            .authorized
            .then(|| serde_json::json!({"accounts": self.accounts})))
    }

    async fn reachable(&self) -> bool {
        true
    }

    async fn request(&self, method: &str, _params: serde_json::Value) -> Result<serde_json::Value> {
        match method {
            "eth_accounts" => Ok(serde_json::json!(self.accounts)),
            // Wallets report the chain id as a hex string.
            "eth_chainId" => Ok(serde_json::json!(format!("{:#x}", self.chain_id))),
            other => Err(GatekitError::RequestFailed(format!(
                "unknown method {other}"
            ))),
        }
    }
}

/// Factory serving one injected wallet for every injected descriptor.
pub struct MockWalletFactory {
    pub wallet: Arc<MockWallet>,
}

impl MockWalletFactory {
    pub fn new(wallet: MockWallet) -> Self {
        Self {
            wallet: Arc::new(wallet),
        }
    }
}

impl ChannelFactory for MockWalletFactory {
    fn channel_for(
        &self,
        descriptor: &IdentityProviderDescriptor,
    ) -> Result<Arc<dyn gatekit::channel::ProviderChannel>> {
        Ok(Arc::new(InjectedChannel::new(
            &descriptor.code,
            descriptor.provider_path.clone().unwrap_or_default(),
            Some(self.wallet.clone() as Arc<dyn InjectedProvider>),
        )))
    }
}

/// Decentralized descriptor with the given chain constraints.
pub fn wallet_descriptor(chains: &[u64]) -> IdentityProviderDescriptor {
    IdentityProviderDescriptor {
        code: "metamask".to_string(),
        display_name: "MetaMask".to_string(),
        web_version: WebVersion::Decentralized,
        connector: ConnectorType::Injected,
        provider_path: Some("ethereum".to_string()),
        chain_constraints: chains.iter().copied().collect::<ChainSet>(),
    }
}
