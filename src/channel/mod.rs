//! Provider channel trait and transport implementations.

pub mod events;
pub mod injected;
pub mod remote;

pub use events::{EventCallback, EventHub, Subscription};
pub use injected::{InjectedChannel, InjectedProvider};
pub use remote::RemoteChannel;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{GatekitError, Result};
use crate::types::{ConnectorType, EventKind, IdentityProviderDescriptor, Session};

/// One provider method invocation forwarded through a channel.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub params: serde_json::Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }
}

/// Result of a successful channel connect.
#[derive(Debug, Clone)]
pub struct ConnectPayload {
    pub accounts: Vec<String>,
    pub chain_id: Option<u64>,
    /// Provider-specific connect info, carried through untouched.
    pub raw: serde_json::Value,
}

/// Lowest-level transport to one concrete provider.
///
/// Implementations talk to an in-process injected object
/// ([`InjectedChannel`]) or a network endpoint ([`RemoteChannel`]) and keep
/// the persistable session snapshot for the connection they hold.
#[async_trait]
pub trait ProviderChannel: Send + Sync {
    /// Provider code this channel serves (registry key).
    fn provider_code(&self) -> &str;

    fn connector_type(&self) -> ConnectorType;

    /// Establish a connection to the underlying provider.
    async fn connect(&self, options: Option<serde_json::Value>) -> Result<ConnectPayload>;

    /// Probe whether a previously stored session is still live, without
    /// prompting the user. A valid probe marks the channel connected.
    async fn check_session(&self) -> Result<(bool, Option<serde_json::Value>)>;

    /// Transport liveness, distinct from session validity.
    async fn check_connection(&self) -> Result<bool>;

    /// Forward one provider method call, honoring an optional timeout.
    async fn request(
        &self,
        call: MethodCall,
        timeout: Option<Duration>,
    ) -> Result<serde_json::Value>;

    /// Register a listener for provider-originated events. The returned
    /// handle cancels the listener when dropped.
    fn subscribe(&self, kind: EventKind, callback: EventCallback) -> Subscription;

    /// Snapshot current state in the persistable shape. `None` before any
    /// connection or hydration.
    fn session_snapshot(&self) -> Option<Session>;

    /// Restore internal state from a stored session. Does not probe the
    /// provider; pair with [`check_session`](Self::check_session).
    fn hydrate(&self, session: &Session);

    /// True only between a successful connect (or valid session probe) and
    /// an observed disconnect.
    fn is_connected(&self) -> bool;
}

/// Builds the channel for a provider descriptor. Supplied by the
/// application: injected provider objects live on the host side and cannot
/// be conjured by the SDK.
pub trait ChannelFactory: Send + Sync {
    fn channel_for(
        &self,
        descriptor: &IdentityProviderDescriptor,
    ) -> Result<Arc<dyn ProviderChannel>>;
}

/// Default factory: injected providers registered by path, remote providers
/// reached under a common endpoint base.
pub struct StandardChannelFactory {
    injected: HashMap<String, Arc<dyn InjectedProvider>>,
    remote_base_url: String,
}

impl StandardChannelFactory {
    pub fn new(remote_base_url: impl Into<String>) -> Self {
        Self {
            injected: HashMap::new(),
            remote_base_url: remote_base_url.into(),
        }
    }

    /// Register an injected provider object under its path.
    pub fn register_injected(mut self, provider: Arc<dyn InjectedProvider>) -> Self {
        self.injected.insert(provider.path().to_string(), provider);
        self
    }
}

impl ChannelFactory for StandardChannelFactory {
    fn channel_for(
        &self,
        descriptor: &IdentityProviderDescriptor,
    ) -> Result<Arc<dyn ProviderChannel>> {
        match descriptor.connector {
            ConnectorType::Injected => {
                let path = descriptor.provider_path.clone().ok_or_else(|| {
                    GatekitError::Configuration(format!(
                        "descriptor '{}' has no provider path",
                        descriptor.code
                    ))
                })?;
                let provider = self.injected.get(&path).cloned();
                Ok(Arc::new(InjectedChannel::new(
                    &descriptor.code,
                    path,
                    provider,
                )))
            }
            ConnectorType::Remote => Ok(Arc::new(RemoteChannel::new(
                &descriptor.code,
                format!(
                    "{}/{}",
                    self.remote_base_url.trim_end_matches('/'),
                    descriptor.code
                ),
            ))),
        }
    }
}

/// Shared per-channel connection state.
#[derive(Debug, Default)]
pub(crate) struct ChannelState {
    pub connected: bool,
    pub uid: Option<String>,
    pub accounts: Vec<String>,
    pub chain_id: Option<u64>,
    pub raw: serde_json::Value,
    pub connected_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl ChannelState {
    pub fn apply_connect(&mut self, payload: &ConnectPayload) {
        self.connected = true;
        self.accounts = payload.accounts.clone();
        self.chain_id = payload.chain_id;
        self.raw = payload.raw.clone();
        if self.uid.is_none() {
            self.uid = payload
                .raw
                .get("uid")
                .and_then(|v| v.as_str())
                .map(String::from)
                .or_else(|| payload.accounts.first().cloned());
        }
        self.connected_at = Some(chrono::Utc::now());
    }

    pub fn apply_hydrate(&mut self, session: &Session) {
        self.connected = false;
        self.uid = Some(session.uid.clone());
        self.accounts = session.accounts.clone();
        self.chain_id = session.chain_id;
        self.raw = session.raw.clone();
        self.connected_at = Some(session.created_at);
    }

    pub fn snapshot(&self, provider_code: &str, connector_type: ConnectorType) -> Option<Session> {
        let uid = self.uid.clone().or_else(|| self.accounts.first().cloned())?;
        Some(Session {
            uid,
            provider: provider_code.to_string(),
            connector_type,
            chain_id: self.chain_id,
            accounts: self.accounts.clone(),
            raw: self.raw.clone(),
            created_at: self.connected_at.unwrap_or_else(chrono::Utc::now),
        })
    }

    pub fn apply_event(&mut self, event: &crate::types::ChannelEvent) {
        use crate::types::ChannelEvent;
        match event {
            ChannelEvent::Disconnect { .. } => self.connected = false,
            ChannelEvent::AccountsChanged(accounts) => self.accounts = accounts.clone(),
            ChannelEvent::ChainChanged(chain_id) => self.chain_id = Some(*chain_id),
            ChannelEvent::Connect { .. } => {}
        }
    }
}
