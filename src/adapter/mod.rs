//! Adapter trait and family implementations over provider channels.

pub mod account;
pub mod chain;

pub use account::AccountAdapter;
pub use chain::{ChainAdapter, MethodMap};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::channel::{EventCallback, MethodCall, Subscription};
use crate::error::{GatekitError, Result};
use crate::types::{ChainSet, EventKind, IdentityProviderDescriptor, Session, WebVersion};

/// Capability descriptor carried by every adapter instance: which provider
/// it serves, over which family, under which chain policy.
#[derive(Debug, Clone)]
pub struct AdapterProfile {
    pub provider_code: String,
    pub provider_path: Option<String>,
    pub web_version: WebVersion,
    pub chain_constraints: ChainSet,
}

impl AdapterProfile {
    pub fn from_descriptor(descriptor: &IdentityProviderDescriptor) -> Self {
        Self {
            provider_code: descriptor.code.clone(),
            provider_path: descriptor.provider_path.clone(),
            web_version: descriptor.web_version,
            chain_constraints: descriptor.chain_constraints.clone(),
        }
    }
}

/// Uniform payload surfaced when a channel signals connection. Accounts and
/// chain id are filled from the adapter's cache when the channel event
/// carried none.
#[derive(Debug, Clone)]
pub struct ConnectNotice {
    pub data: serde_json::Value,
    pub accounts: Vec<String>,
    pub chain_id: Option<u64>,
}

/// Callback invoked once per established connection.
pub type ConnectHook = Arc<dyn Fn(ConnectNotice) + Send + Sync>;

/// Adapter-level contract, identical across channel implementations.
///
/// `get_accounts` / `get_chain_id` are provider-family-specific; families
/// that have no notion of them inherit the `NotImplemented` defaults.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn profile(&self) -> &AdapterProfile;

    fn is_connected(&self) -> bool;

    /// Establish the connection and bring the adapter to a validated,
    /// cached state.
    async fn connect(&self, options: Option<serde_json::Value>) -> Result<()>;

    /// Probe a stored session. The caller re-pings when valid.
    async fn check_session(&self) -> Result<(bool, Option<serde_json::Value>)>;

    async fn check_connection(&self) -> Result<bool>;

    async fn request(
        &self,
        call: MethodCall,
        timeout: Option<Duration>,
    ) -> Result<serde_json::Value>;

    /// Persistable snapshot with the adapter's cached chain id merged in.
    fn get_session(&self) -> Result<Session>;

    async fn get_accounts(&self) -> Result<Vec<String>> {
        Err(GatekitError::NotImplemented("get_accounts"))
    }

    async fn get_chain_id(&self) -> Result<u64> {
        Err(GatekitError::NotImplemented("get_chain_id"))
    }

    /// Register an event listener on the underlying channel.
    fn subscribe(&self, kind: EventKind, callback: EventCallback) -> Result<Subscription>;
}
