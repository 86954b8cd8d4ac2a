//! Channel over an in-process injected provider object.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{GatekitError, Result};
use crate::types::{ChannelEvent, ConnectorType, EventKind, Session};
use crate::util::timeout::with_timeout;

use super::events::{EventCallback, EventHub, Subscription};
use super::{ChannelState, ConnectPayload, MethodCall, ProviderChannel};

/// The injected wallet-style object an [`InjectedChannel`] binds to.
/// Supplied by the host application.
#[async_trait]
pub trait InjectedProvider: Send + Sync {
    /// Name the object is injected under (e.g. `"ethereum"`).
    fn path(&self) -> &str;

    /// Prompt-driven connection. Declining maps to `ConnectionRejected`.
    async fn connect(&self, options: Option<serde_json::Value>) -> Result<ConnectPayload>;

    /// Non-prompting probe: `Some(payload)` when a prior session is still
    /// authorized, `None` otherwise.
    async fn ping(&self) -> Result<Option<serde_json::Value>>;

    /// Whether the provider object responds at all.
    async fn reachable(&self) -> bool;

    /// Forward one provider method call.
    async fn request(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value>;
}

/// Channel backed by an injected provider object. The provider may be
/// absent (not installed in the host); every connecting call then fails
/// `ChannelUnavailable`.
pub struct InjectedChannel {
    provider_code: String,
    provider_path: String,
    provider: Option<Arc<dyn InjectedProvider>>,
    state: Mutex<ChannelState>,
    hub: EventHub,
}

impl InjectedChannel {
    pub fn new(
        provider_code: &str,
        provider_path: impl Into<String>,
        provider: Option<Arc<dyn InjectedProvider>>,
    ) -> Self {
        Self {
            provider_code: provider_code.to_string(),
            provider_path: provider_path.into(),
            provider,
            state: Mutex::new(ChannelState::default()),
            hub: EventHub::new(),
        }
    }

    fn require_provider(&self) -> Result<&Arc<dyn InjectedProvider>> {
        self.provider.as_ref().ok_or_else(|| {
            GatekitError::ChannelUnavailable(format!(
                "no injected provider at path '{}'",
                self.provider_path
            ))
        })
    }

    /// Feed a provider-originated event into the channel. Host wiring calls
    /// this from the injected object's own event mechanism; state is updated
    /// before listeners fire.
    pub fn deliver_event(&self, event: ChannelEvent) {
        self.state.lock().unwrap().apply_event(&event);
        self.hub.emit(&event);
    }
}

#[async_trait]
impl ProviderChannel for InjectedChannel {
    fn provider_code(&self) -> &str {
        &self.provider_code
    }

    fn connector_type(&self) -> ConnectorType {
        ConnectorType::Injected
    }

    async fn connect(&self, options: Option<serde_json::Value>) -> Result<ConnectPayload> {
        let provider = self.require_provider()?;
        if provider.path() != self.provider_path {
            return Err(GatekitError::ChannelUnavailable(format!(
                "injected provider is bound to path '{}', expected '{}'",
                provider.path(),
                self.provider_path
            )));
        }
        let payload = provider.connect(options).await?;
        debug!(
            provider = %self.provider_code,
            accounts = payload.accounts.len(),
            chain_id = ?payload.chain_id,
            "injected channel connected"
        );
        self.state.lock().unwrap().apply_connect(&payload);
        self.hub.emit(&ChannelEvent::Connect {
            data: payload.raw.clone(),
            accounts: Some(payload.accounts.clone()),
            chain_id: payload.chain_id,
        });
        Ok(payload)
    }

    async fn check_session(&self) -> Result<(bool, Option<serde_json::Value>)> {
        let provider = match self.provider.as_ref() {
            Some(p) => p,
            None => return Ok((false, None)),
        };
        match provider.ping().await? {
            Some(payload) => {
                let mut state = self.state.lock().unwrap();
                state.connected = true;
                Ok((true, Some(payload)))
            }
            None => Ok((false, None)),
        }
    }

    async fn check_connection(&self) -> Result<bool> {
        match self.provider.as_ref() {
            Some(provider) => Ok(provider.reachable().await),
            None => Ok(false),
        }
    }

    async fn request(
        &self,
        call: MethodCall,
        timeout: Option<Duration>,
    ) -> Result<serde_json::Value> {
        let provider = Arc::clone(self.require_provider()?);
        let fut = async move { provider.request(&call.method, call.params).await };
        match timeout {
            Some(duration) => with_timeout(duration, fut).await,
            None => fut.await,
        }
    }

    fn subscribe(&self, kind: EventKind, callback: EventCallback) -> Subscription {
        self.hub.subscribe(kind, callback)
    }

    fn session_snapshot(&self) -> Option<Session> {
        self.state
            .lock()
            .unwrap()
            .snapshot(&self.provider_code, ConnectorType::Injected)
    }

    fn hydrate(&self, session: &Session) {
        self.state.lock().unwrap().apply_hydrate(session);
    }

    fn is_connected(&self) -> bool {
        self.state.lock().unwrap().connected
    }
}
