//! Channel over a remote provider endpoint.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::backend::shared_client;
use crate::error::{GatekitError, Result};
use crate::types::{ChannelEvent, ConnectorType, EventKind, Session};
use crate::util::timeout::with_timeout;

use super::events::{EventCallback, EventHub, Subscription};
use super::{ChannelState, ConnectPayload, MethodCall, ProviderChannel};

/// Channel that reaches a provider over JSON POSTs against one endpoint.
pub struct RemoteChannel {
    provider_code: String,
    endpoint: String,
    client: reqwest::Client,
    state: Mutex<ChannelState>,
    hub: EventHub,
}

#[derive(Debug, Deserialize)]
struct RemoteConnectResponse {
    #[serde(default)]
    accounts: Vec<String>,
    #[serde(default)]
    chain_id: Option<u64>,
    #[serde(default)]
    uid: Option<String>,
    #[serde(default)]
    session: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RemoteSessionResponse {
    valid: bool,
    #[serde(default)]
    session: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RemoteRequestResponse {
    result: serde_json::Value,
}

impl RemoteChannel {
    pub fn new(provider_code: &str, endpoint: impl Into<String>) -> Self {
        Self {
            provider_code: provider_code.to_string(),
            endpoint: endpoint.into(),
            client: shared_client().clone(),
            state: Mutex::new(ChannelState::default()),
            hub: EventHub::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), path)
    }

    /// Feed a provider-originated event into the channel (e.g. from a
    /// host-side poller). State is updated before listeners fire.
    pub fn deliver_event(&self, event: ChannelEvent) {
        self.state.lock().unwrap().apply_event(&event);
        self.hub.emit(&event);
    }

    fn map_transport_error(err: reqwest::Error) -> GatekitError {
        if err.is_connect() {
            GatekitError::ChannelUnavailable(err.to_string())
        } else {
            GatekitError::ConnectionRejected(err.to_string())
        }
    }
}

#[async_trait]
impl ProviderChannel for RemoteChannel {
    fn provider_code(&self) -> &str {
        &self.provider_code
    }

    fn connector_type(&self) -> ConnectorType {
        ConnectorType::Remote
    }

    async fn connect(&self, options: Option<serde_json::Value>) -> Result<ConnectPayload> {
        if self.endpoint.is_empty() {
            return Err(GatekitError::ChannelUnavailable(
                "remote channel has no endpoint".to_string(),
            ));
        }
        let response = self
            .client
            .post(self.url("connect"))
            .json(&options.unwrap_or(serde_json::Value::Null))
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatekitError::ConnectionRejected(format!(
                "status {status}: {body}"
            )));
        }

        let parsed: RemoteConnectResponse = response.json().await?;
        let mut raw = parsed.session;
        if let (Some(uid), Some(object)) = (&parsed.uid, raw.as_object_mut()) {
            object
                .entry("uid")
                .or_insert(serde_json::Value::String(uid.clone()));
        }
        let payload = ConnectPayload {
            accounts: parsed.accounts,
            chain_id: parsed.chain_id,
            raw,
        };
        debug!(
            provider = %self.provider_code,
            accounts = payload.accounts.len(),
            chain_id = ?payload.chain_id,
            "remote channel connected"
        );
        {
            let mut state = self.state.lock().unwrap();
            state.apply_connect(&payload);
            if state.uid.is_none() {
                state.uid = parsed.uid;
            }
        }
        self.hub.emit(&ChannelEvent::Connect {
            data: payload.raw.clone(),
            accounts: Some(payload.accounts.clone()),
            chain_id: payload.chain_id,
        });
        Ok(payload)
    }

    async fn check_session(&self) -> Result<(bool, Option<serde_json::Value>)> {
        let snapshot = self.session_snapshot();
        let Some(session) = snapshot else {
            return Ok((false, None));
        };
        let response = match self
            .client
            .post(self.url("session/ping"))
            .json(&session)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                debug!(provider = %self.provider_code, error = %err, "session probe failed");
                return Ok((false, None));
            }
        };
        if !response.status().is_success() {
            return Ok((false, None));
        }
        let parsed: RemoteSessionResponse = response.json().await?;
        if parsed.valid {
            self.state.lock().unwrap().connected = true;
        }
        Ok((parsed.valid, parsed.session))
    }

    async fn check_connection(&self) -> Result<bool> {
        let response = self.client.get(self.url("health")).send().await;
        Ok(matches!(response, Ok(r) if r.status().is_success()))
    }

    async fn request(
        &self,
        call: MethodCall,
        timeout: Option<Duration>,
    ) -> Result<serde_json::Value> {
        let url = self.url("request");
        let client = self.client.clone();
        let fut = async move {
            let response = client
                .post(url)
                .json(&serde_json::json!({
                    "method": call.method,
                    "params": call.params,
                }))
                .send()
                .await
                .map_err(|err| GatekitError::RequestFailed(err.to_string()))?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(GatekitError::RequestFailed(format!(
                    "status {status}: {body}"
                )));
            }
            let parsed: RemoteRequestResponse = response.json().await?;
            Ok(parsed.result)
        };
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
            .snapshot(&self.provider_code, ConnectorType::Remote)
    }

    fn hydrate(&self, session: &Session) {
        self.state.lock().unwrap().apply_hydrate(session);
    }

    fn is_connected(&self) -> bool {
        self.state.lock().unwrap().connected
    }
}
