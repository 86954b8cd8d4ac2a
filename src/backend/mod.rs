//! Auth backend HTTP surface: shared client, bearer helpers, typed calls.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Deserialize;
use tracing::debug;

use crate::config::GatekitConfig;
use crate::error::{GatekitError, Result};
use crate::types::UserData;
use crate::util::retry::RetryPolicy;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to build HTTP client")
    })
}

/// Map a non-success HTTP status to an error.
pub fn status_to_error(status: u16, body: &str) -> GatekitError {
    GatekitError::api(status, body)
}

/// Typed client for the authentication backend.
pub struct AuthBackend {
    client: reqwest::Client,
    auth_base_url: String,
    project_base_url: String,
    retry: RetryPolicy,
}

#[derive(Debug, Deserialize)]
struct UserDataEnvelope {
    data: UserData,
}

#[derive(Debug, Deserialize)]
struct IdentifierResponse {
    identifier: String,
}

impl AuthBackend {
    pub fn new(auth_base_url: impl Into<String>, project_base_url: impl Into<String>) -> Self {
        Self {
            client: shared_client().clone(),
            auth_base_url: auth_base_url.into(),
            project_base_url: project_base_url.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn from_config(config: &GatekitConfig) -> Self {
        Self::new(config.auth_base_url(), config.project_base_url())
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/{}", self.auth_base_url.trim_end_matches('/'), path)
    }

    fn project_url(&self, path: &str) -> String {
        format!("{}/{}", self.project_base_url.trim_end_matches('/'), path)
    }

    /// Whether the backend recognizes `token`. True only on the explicit
    /// success status; any other status or transport failure is "not
    /// verified", never a fault.
    pub async fn verify_token(&self, token: &str) -> bool {
        let result = self
            .client
            .post(self.auth_url("verify"))
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await;
        match result {
            Ok(response) => response.status() == reqwest::StatusCode::OK,
            Err(err) => {
                debug!(error = %err, "token verification transport failure");
                false
            }
        }
    }

    /// Install `token` as a cookie-backed credential. Failures propagate:
    /// the caller must not proceed to its fallback persistence steps.
    pub async fn convert_token_to_cookie(&self, token: &str) -> Result<()> {
        let response = self
            .client
            .post(self.project_url("cooking"))
            .json(&serde_json::json!({
                "type": "jwt",
                "token": token,
            }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_to_error(status.as_u16(), &body));
        }
        Ok(())
    }

    /// Fetch the confirmed user record and linked providers. Idempotent
    /// GET, retried on transient failures.
    pub async fn get_user_data(&self, headers: &HashMap<String, String>) -> Result<UserData> {
        let envelope: UserDataEnvelope = self
            .retry
            .execute(|| async {
                let mut request = self.client.get(self.auth_url("me"));
                for (key, value) in headers {
                    request = request.header(key.as_str(), value.as_str());
                }
                let response = request.send().await?;
                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(status_to_error(status.as_u16(), &body));
                }
                Ok(response.json().await?)
            })
            .await?;
        Ok(envelope.data)
    }

    /// Resolve the canonical identifier the backend uses for `user_id`.
    pub async fn get_user_identifier(
        &self,
        user_id: &str,
        headers: &HashMap<String, String>,
    ) -> Result<String> {
        let mut request = self.client.post(self.auth_url("user/ident"));
        for (key, value) in headers {
            request = request.header(key.as_str(), value.as_str());
        }
        let response = request
            .json(&serde_json::json!({ "user_id": user_id }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_to_error(status.as_u16(), &body));
        }
        let parsed: IdentifierResponse = response.json().await?;
        Ok(parsed.identifier)
    }
}
