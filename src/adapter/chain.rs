//! Decentralized (chain-aware) adapter.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::channel::{EventCallback, MethodCall, ProviderChannel, Subscription};
use crate::error::{GatekitError, Result};
use crate::types::{ChannelEvent, EventKind, Session};

use super::{AdapterProfile, ConnectHook, ConnectNotice, ProviderAdapter};

/// Provider method names the adapter issues during its ping sequence.
/// Wallet-style providers largely agree on the EVM names; the map exists
/// for the ones that do not.
#[derive(Debug, Clone)]
pub struct MethodMap {
    pub accounts: String,
    pub chain_id: String,
}

impl Default for MethodMap {
    fn default() -> Self {
        Self {
            accounts: "eth_accounts".to_string(),
            chain_id: "eth_chainId".to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct AdapterState {
    connected: bool,
    accounts: Vec<String>,
    chain_id: Option<u64>,
}

/// Chain-aware adapter for decentralized providers.
///
/// Wraps a channel and adds the connect→ping sequence: fetch accounts,
/// fetch chain id, validate against the profile's chain set, cache. The
/// adapter reports connected only after validation passes, even when the
/// underlying channel already connected.
pub struct ChainAdapter {
    inner: Arc<Inner>,
}

struct Inner {
    profile: AdapterProfile,
    channel: Option<Arc<dyn ProviderChannel>>,
    methods: MethodMap,
    state: Mutex<AdapterState>,
    hook: Mutex<Option<ConnectHook>>,
    connect_sub: Mutex<Option<Subscription>>,
    disconnect_sub: Mutex<Option<Subscription>>,
    notified: AtomicBool,
}

impl ChainAdapter {
    pub fn new(profile: AdapterProfile, channel: Option<Arc<dyn ProviderChannel>>) -> Self {
        Self::with_methods(profile, channel, MethodMap::default())
    }

    pub fn with_methods(
        profile: AdapterProfile,
        channel: Option<Arc<dyn ProviderChannel>>,
        methods: MethodMap,
    ) -> Self {
        let adapter = Self {
            inner: Arc::new(Inner {
                profile,
                channel,
                methods,
                state: Mutex::new(AdapterState::default()),
                hook: Mutex::new(None),
                connect_sub: Mutex::new(None),
                disconnect_sub: Mutex::new(None),
                notified: AtomicBool::new(false),
            }),
        };
        adapter.bind_channel_delegations();
        adapter
    }

    /// Register the uniform on-connect callback. Fails `ChannelNotDefined`
    /// without a channel; re-registering replaces the previous binding
    /// instead of stacking listeners.
    pub fn on_connect(&self, hook: ConnectHook) -> Result<()> {
        self.inner.require_channel()?;
        *self.inner.hook.lock().unwrap() = Some(hook);
        self.bind_channel_delegations();
        Ok(())
    }

    /// Ping sequence: fetch accounts, fetch chain id, validate chain
    /// membership, cache. Public so callers can re-ping after a valid
    /// session probe.
    pub async fn ping(&self) -> Result<()> {
        let accounts = ProviderAdapter::get_accounts(self).await?;
        let chain_id = ProviderAdapter::get_chain_id(self).await?;

        if !self.inner.profile.chain_constraints.allows(chain_id) {
            debug!(
                provider = %self.inner.profile.provider_code,
                chain_id,
                "connected chain rejected by adapter policy"
            );
            return Err(GatekitError::ConnectedChainNotAllowed(chain_id));
        }

        let mut state = self.inner.state.lock().unwrap();
        state.accounts = accounts;
        state.chain_id = Some(chain_id);
        state.connected = true;
        Ok(())
    }

    fn bind_channel_delegations(&self) {
        let Some(channel) = self.inner.channel.as_ref() else {
            return;
        };

        // Replacing the stored handles drops (cancels) any prior binding,
        // so rebinding never duplicates listeners.
        let weak = Arc::downgrade(&self.inner);
        let connect_sub = channel.subscribe(
            EventKind::Connect,
            Box::new(move |event| {
                if let Some(inner) = weak.upgrade() {
                    Inner::handle_connect_event(&inner, event);
                }
            }),
        );
        *self.inner.connect_sub.lock().unwrap() = Some(connect_sub);

        let weak = Arc::downgrade(&self.inner);
        let disconnect_sub = channel.subscribe(
            EventKind::Disconnect,
            Box::new(move |_event| {
                if let Some(inner) = weak.upgrade() {
                    inner.state.lock().unwrap().connected = false;
                    inner.notified.store(false, Ordering::SeqCst);
                }
            }),
        );
        *self.inner.disconnect_sub.lock().unwrap() = Some(disconnect_sub);
    }
}

impl Inner {
    fn require_channel(&self) -> Result<&Arc<dyn ProviderChannel>> {
        self.channel
            .as_ref()
            .ok_or(GatekitError::ChannelNotDefined("ChainAdapter"))
    }

    /// Channel connect events may race the ping sequence; the `notified`
    /// guard keeps delivery at most once per connection.
    fn handle_connect_event(inner: &Arc<Inner>, event: &ChannelEvent) {
        let ChannelEvent::Connect {
            data,
            accounts,
            chain_id,
        } = event
        else {
            return;
        };
        if inner.notified.swap(true, Ordering::SeqCst) {
            return;
        }
        let notice = {
            let state = inner.state.lock().unwrap();
            ConnectNotice {
                data: data.clone(),
                accounts: accounts.clone().unwrap_or_else(|| state.accounts.clone()),
                chain_id: chain_id.or(state.chain_id),
            }
        };
        Inner::deliver_notice(inner, notice);
    }

    fn deliver_notice(inner: &Arc<Inner>, notice: ConnectNotice) {
        let hook = inner.hook.lock().unwrap().clone();
        if let Some(hook) = hook {
            hook(notice);
        }
    }
}

#[async_trait]
impl ProviderAdapter for ChainAdapter {
    fn profile(&self) -> &AdapterProfile {
        &self.inner.profile
    }

    fn is_connected(&self) -> bool {
        self.inner.state.lock().unwrap().connected
    }

    async fn connect(&self, options: Option<serde_json::Value>) -> Result<()> {
        let channel = Arc::clone(self.inner.require_channel()?);
        self.inner.notified.store(false, Ordering::SeqCst);

        let payload = channel.connect(options).await?;
        self.ping().await?;

        debug!(
            provider = %self.inner.profile.provider_code,
            chain_id = ?self.inner.state.lock().unwrap().chain_id,
            "adapter connected"
        );

        if !self.inner.notified.swap(true, Ordering::SeqCst) {
            let notice = {
                let state = self.inner.state.lock().unwrap();
                ConnectNotice {
                    data: payload.raw,
                    accounts: state.accounts.clone(),
                    chain_id: state.chain_id,
                }
            };
            Inner::deliver_notice(&self.inner, notice);
        }
        Ok(())
    }

    async fn check_session(&self) -> Result<(bool, Option<serde_json::Value>)> {
        let channel = self.inner.require_channel()?;
        channel.check_session().await
    }

    async fn check_connection(&self) -> Result<bool> {
        let channel = self.inner.require_channel()?;
        channel.check_connection().await
    }

    async fn request(
        &self,
        call: MethodCall,
        timeout: Option<Duration>,
    ) -> Result<serde_json::Value> {
        let channel = self.inner.require_channel()?;
        channel.request(call, timeout).await
    }

    fn get_session(&self) -> Result<Session> {
        let channel = self.inner.require_channel()?;
        let mut session = channel.session_snapshot().ok_or_else(|| {
            GatekitError::InvalidState("no session has been established".to_string())
        })?;
        let state = self.inner.state.lock().unwrap();
        // Adapter cache takes precedence over a stale raw snapshot.
        if state.chain_id.is_some() {
            session.chain_id = state.chain_id;
        }
        if session.accounts.is_empty() && !state.accounts.is_empty() {
            session.accounts = state.accounts.clone();
        }
        Ok(session)
    }

    async fn get_accounts(&self) -> Result<Vec<String>> {
        let channel = self.inner.require_channel()?;
        let value = channel
            .request(
                MethodCall::new(self.inner.methods.accounts.clone(), serde_json::json!([])),
                None,
            )
            .await?;
        parse_accounts(&value)
    }

    async fn get_chain_id(&self) -> Result<u64> {
        let channel = self.inner.require_channel()?;
        let value = channel
            .request(
                MethodCall::new(self.inner.methods.chain_id.clone(), serde_json::json!([])),
                None,
            )
            .await?;
        parse_chain_id(&value)
    }

    fn subscribe(&self, kind: EventKind, callback: EventCallback) -> Result<Subscription> {
        let channel = self.inner.require_channel()?;
        Ok(channel.subscribe(kind, callback))
    }
}

fn parse_accounts(value: &serde_json::Value) -> Result<Vec<String>> {
    value
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.as_str().map(String::from))
                .collect()
        })
        .ok_or_else(|| GatekitError::RequestFailed("malformed accounts response".to_string()))
}

/// Wallet providers report chain ids as integers, hex strings (`"0x1"`),
/// or decimal strings.
fn parse_chain_id(value: &serde_json::Value) -> Result<u64> {
    if let Some(id) = value.as_u64() {
        return Ok(id);
    }
    if let Some(text) = value.as_str() {
        let parsed = if let Some(hex) = text.strip_prefix("0x") {
            u64::from_str_radix(hex, 16).ok()
        } else {
            text.parse::<u64>().ok()
        };
        if let Some(id) = parsed {
            return Ok(id);
        }
    }
    Err(GatekitError::RequestFailed(format!(
        "malformed chain id response: {value}"
    )))
}
