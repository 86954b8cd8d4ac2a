//! Top-level session/token orchestration.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use bon::Builder;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::backend::AuthBackend;
use crate::channel::ChannelFactory;
use crate::config::GatekitConfig;
use crate::error::{GatekitError, Result};
use crate::frame::{frame_for, FrameContext, FrameOutcome};
use crate::registry::ProviderRegistry;
use crate::resolver::ResolverRegistry;
use crate::storage::{keys, Storage};
use crate::types::{CurrentSession, ServerSentIdentityProvider, UserData};

/// Header key carrying the bearer credential.
pub const AUTH_HEADER_KEY: &str = "Authorization";

/// Construction options for [`AuthenticationApp`].
#[derive(Builder)]
pub struct AuthenticationAppOptions {
    pub config: GatekitConfig,
    pub storage: Arc<dyn Storage>,
    pub channels: Arc<dyn ChannelFactory>,
    /// Defaults to the built-in provider set.
    pub providers: Option<ProviderRegistry>,
    /// Defaults to a backend derived from `config`.
    pub backend: Option<AuthBackend>,
}

/// A started authentication attempt and how it resolved.
#[derive(Debug)]
pub struct StartedAuthentication {
    pub provider: String,
    pub attempt_id: Uuid,
    pub outcome: FrameOutcome,
}

/// Session/token manager over the whole provider surface.
///
/// Owns the process-wide token cache and is the only writer of the
/// token/session storage keys. Writes are last-write-wins: one current
/// session is meaningful at a time.
pub struct AuthenticationApp {
    config: GatekitConfig,
    backend: AuthBackend,
    storage: Arc<dyn Storage>,
    providers: ProviderRegistry,
    resolvers: ResolverRegistry,
    channels: Arc<dyn ChannelFactory>,
    token: RwLock<Option<String>>,
}

impl AuthenticationApp {
    pub fn new(options: AuthenticationAppOptions) -> Self {
        let providers = options
            .providers
            .unwrap_or_else(|| ProviderRegistry::builtin().clone());
        let backend = options
            .backend
            .unwrap_or_else(|| AuthBackend::from_config(&options.config));
        let resolvers = ResolverRegistry::build(&providers);
        Self {
            config: options.config,
            backend,
            storage: options.storage,
            providers,
            resolvers,
            channels: options.channels,
            token: RwLock::new(None),
        }
    }

    /// Resolve the bearer token: explicit argument, then in-memory cache,
    /// then persisted storage. `None` when no tier has one; absence is
    /// never an error.
    pub async fn get_token(&self, explicit: Option<&str>) -> Option<String> {
        if let Some(token) = explicit {
            return Some(token.to_string());
        }
        if let Some(token) = self.token.read().unwrap().clone() {
            return Some(token);
        }
        match self.storage.get_item::<String>(keys::AUTH_TOKEN).await {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "token storage read failed, treating as absent");
                None
            }
        }
    }

    /// Bearer header map from the explicit token or the in-memory cache.
    /// Empty when no token resolves, never a header with an absent value.
    pub fn get_authentication_headers(&self, token: Option<&str>) -> HashMap<String, String> {
        let resolved = token
            .map(String::from)
            .or_else(|| self.token.read().unwrap().clone());
        match resolved {
            Some(token) => HashMap::from([(
                AUTH_HEADER_KEY.to_string(),
                format!("Bearer {token}"),
            )]),
            None => HashMap::new(),
        }
    }

    /// Whether the backend currently recognizes our token. Time-of-check:
    /// the answer may be stale immediately after.
    pub async fn is_authenticated(&self) -> bool {
        // Fast path: no token anywhere means no header can be built.
        let Some(token) = self.get_token(None).await else {
            return false;
        };
        self.backend.verify_token(&token).await
    }

    /// Remote verification, downgraded to a boolean: any non-success
    /// status or transport failure is "not verified".
    pub async fn verify_token(&self, token: &str) -> bool {
        self.backend.verify_token(token).await
    }

    /// Commit a freshly issued token: install it as a cookie-backed
    /// credential, persist it, then update the cache, in that order. A
    /// cookie-conversion fault aborts before anything local changes.
    pub async fn store_jwt_token(&self, token: &str) -> Result<()> {
        self.backend.convert_token_to_cookie(token).await?;
        self.storage
            .set_item(keys::AUTH_TOKEN, &token.to_string())
            .await?;
        *self.token.write().unwrap() = Some(token.to_string());
        debug!("token committed to cookie, storage, and cache");
        Ok(())
    }

    /// Persist the confirmed user record and linked providers, and make
    /// the user's current session the active one. This is the single place
    /// a successful login becomes the new session.
    pub async fn save_user_data(&self, user: &UserData) -> Result<()> {
        self.storage.set_item(keys::USER, &user.user).await?;
        self.storage.set_item(keys::USER_IDPS, &user.idps).await?;
        self.set_current_session(&user.user.current_session).await
    }

    pub async fn set_current_session(&self, session: &CurrentSession) -> Result<()> {
        self.storage.set_item(keys::CURRENT_SESSION, session).await
    }

    pub async fn get_current_session(&self) -> Result<Option<CurrentSession>> {
        self.storage.get_item(keys::CURRENT_SESSION).await
    }

    pub async fn get_idps_from_store(&self) -> Result<Option<Vec<ServerSentIdentityProvider>>> {
        self.storage.get_item(keys::USER_IDPS).await
    }

    /// Fetch the confirmed user record from the backend.
    pub async fn get_user_data(&self, token: Option<&str>) -> Result<UserData> {
        let headers = self.resolved_headers(token).await;
        self.backend.get_user_data(&headers).await
    }

    /// Canonical identifier for `user_id`, defaulting to the currently
    /// confirmed user.
    pub async fn get_user_identifier(
        &self,
        user_id: Option<&str>,
        token: Option<&str>,
    ) -> Result<String> {
        let user_id = match user_id {
            Some(id) => id.to_string(),
            None => self.get_user_data(token).await?.user.user_id,
        };
        let headers = self.resolved_headers(token).await;
        self.backend.get_user_identifier(&user_id, &headers).await
    }

    /// Start an authentication attempt against `provider`: select and bind
    /// a fresh frame for its family, assemble the query data, and drive
    /// the handshake.
    pub async fn start_authentication(&self, provider: &str) -> Result<StartedAuthentication> {
        let descriptor = self.providers.get(provider).ok_or_else(|| {
            GatekitError::Configuration(format!("unknown provider '{provider}'"))
        })?;
        let resolver = self.resolvers.resolver_for(provider)?;
        let frame = frame_for(resolver, Arc::clone(&self.channels));
        frame.bind()?;

        let project_identifier = self.config.project_identifier().ok_or_else(|| {
            GatekitError::Configuration("project identifier is not configured".to_string())
        })?;

        let user_identifier = if self.is_authenticated().await {
            Some(self.get_user_identifier(None, None).await?)
        } else {
            None
        };

        debug!(
            provider = %descriptor.code,
            attempt_id = %frame.attempt_id(),
            authenticated = user_identifier.is_some(),
            "starting authentication"
        );

        let ctx = FrameContext::builder()
            .project_identifier(project_identifier)
            .provider(descriptor.code.clone())
            .maybe_user_identifier(user_identifier)
            .build();

        let outcome = frame.init_auth(ctx).await?;
        Ok(StartedAuthentication {
            provider: descriptor.code.clone(),
            attempt_id: frame.attempt_id(),
            outcome,
        })
    }

    async fn resolved_headers(&self, token: Option<&str>) -> HashMap<String, String> {
        match token {
            Some(token) => self.get_authentication_headers(Some(token)),
            None => match self.get_token(None).await {
                Some(token) => self.get_authentication_headers(Some(&token)),
                None => HashMap::new(),
            },
        }
    }
}
