//! Centralized (account-style) adapter.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::channel::{EventCallback, MethodCall, ProviderChannel, Subscription};
use crate::error::{GatekitError, Result};
use crate::types::{EventKind, Session};

use super::{AdapterProfile, ProviderAdapter};

/// Adapter for centralized providers. No chain semantics: connect is a
/// plain delegation and the family-specific calls keep their
/// `NotImplemented` defaults.
pub struct AccountAdapter {
    profile: AdapterProfile,
    channel: Option<Arc<dyn ProviderChannel>>,
}

impl AccountAdapter {
    pub fn new(profile: AdapterProfile, channel: Option<Arc<dyn ProviderChannel>>) -> Self {
        Self { profile, channel }
    }

    fn require_channel(&self) -> Result<&Arc<dyn ProviderChannel>> {
        self.channel
            .as_ref()
            .ok_or(GatekitError::ChannelNotDefined("AccountAdapter"))
    }
}

#[async_trait]
impl ProviderAdapter for AccountAdapter {
    fn profile(&self) -> &AdapterProfile {
        &self.profile
    }

    fn is_connected(&self) -> bool {
        self.channel
            .as_ref()
            .is_some_and(|channel| channel.is_connected())
    }

    async fn connect(&self, options: Option<serde_json::Value>) -> Result<()> {
        let channel = self.require_channel()?;
        channel.connect(options).await?;
        debug!(provider = %self.profile.provider_code, "account adapter connected");
        Ok(())
    }

    async fn check_session(&self) -> Result<(bool, Option<serde_json::Value>)> {
        let channel = self.require_channel()?;
        channel.check_session().await
    }

    async fn check_connection(&self) -> Result<bool> {
        let channel = self.require_channel()?;
        channel.check_connection().await
    }

    async fn request(
        &self,
        call: MethodCall,
        timeout: Option<Duration>,
    ) -> Result<serde_json::Value> {
        let channel = self.require_channel()?;
        channel.request(call, timeout).await
    }

    fn get_session(&self) -> Result<Session> {
        let channel = self.require_channel()?;
        channel.session_snapshot().ok_or_else(|| {
            GatekitError::InvalidState("no session has been established".to_string())
        })
    }

    fn subscribe(&self, kind: EventKind, callback: EventCallback) -> Result<Subscription> {
        let channel = self.require_channel()?;
        Ok(channel.subscribe(kind, callback))
    }
}
