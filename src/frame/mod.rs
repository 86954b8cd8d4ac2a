//! Authentication frames: one handshake driver per provider family.

pub mod web2;
pub mod web3;

pub use web2::Web2Frame;
pub use web3::Web3NativeFrame;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bon::Builder;
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::channel::ChannelFactory;
use crate::error::{GatekitError, Result};
use crate::resolver::IdentityResolver;
use crate::types::{Session, WebVersion};

/// Recognized query-parameter keys for starting a provider handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum AllowedQueryParam {
    ProjectId,
    Provider,
    UserIdentifier,
}

/// Everything a frame needs for one authentication attempt. Passed into
/// `init_auth` explicitly; frames hold no reference back to the app.
#[derive(Debug, Clone, Builder)]
pub struct FrameContext {
    #[builder(into)]
    pub project_identifier: String,
    #[builder(into)]
    pub provider: String,
    pub user_identifier: Option<String>,
    /// Provider-specific connect options, forwarded to the channel.
    pub options: Option<serde_json::Value>,
}

impl FrameContext {
    /// Query data for the handshake: project id, provider code, and the
    /// user identifier only when the caller is already authenticated.
    pub fn query_data(&self) -> HashMap<String, String> {
        let mut data = HashMap::new();
        data.insert(
            AllowedQueryParam::ProjectId.to_string(),
            self.project_identifier.clone(),
        );
        data.insert(AllowedQueryParam::Provider.to_string(), self.provider.clone());
        if let Some(user_identifier) = &self.user_identifier {
            data.insert(
                AllowedQueryParam::UserIdentifier.to_string(),
                user_identifier.clone(),
            );
        }
        data
    }
}

/// How an authentication attempt resolved.
#[derive(Debug, Clone)]
pub enum FrameOutcome {
    /// Decentralized handshake completed: the provider connection produced
    /// a session.
    Connected { session: Session },
    /// Centralized handshake prepared: the application forwards these
    /// parameters to its authorization surface.
    AuthorizationRequest { params: HashMap<String, String> },
}

/// Lifecycle of a frame instance. Single-use: a new attempt constructs a
/// fresh frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FrameState {
    Unbound,
    Bound,
    InProgress,
    Resolved,
}

/// Handshake driver for one provider family.
#[async_trait]
pub trait AuthenticationFrame: Send + Sync {
    fn web_version(&self) -> WebVersion;

    fn state(&self) -> FrameState;

    /// Attempt id for log correlation.
    fn attempt_id(&self) -> Uuid;

    /// Attach the frame to an authentication attempt. `Unbound → Bound`.
    fn bind(&self) -> Result<()>;

    /// Drive the handshake. `Bound → InProgress → Resolved`; the frame
    /// resolves exactly once, on success or failure.
    async fn init_auth(&self, ctx: FrameContext) -> Result<FrameOutcome>;
}

/// Select the frame implementation matching the resolver's family.
pub fn frame_for(
    resolver: Arc<dyn IdentityResolver>,
    channels: Arc<dyn ChannelFactory>,
) -> Arc<dyn AuthenticationFrame> {
    match resolver.web_version() {
        WebVersion::Decentralized => Arc::new(Web3NativeFrame::new(resolver, channels)),
        WebVersion::Centralized => Arc::new(Web2Frame::new(resolver)),
    }
}

/// Shared state machine for frame implementations.
pub(crate) struct FrameCore {
    attempt_id: Uuid,
    state: Mutex<FrameState>,
}

impl FrameCore {
    pub fn new() -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            state: Mutex::new(FrameState::Unbound),
        }
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn state(&self) -> FrameState {
        *self.state.lock().unwrap()
    }

    pub fn bind(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        match *state {
            FrameState::Unbound => {
                *state = FrameState::Bound;
                Ok(())
            }
            other => Err(GatekitError::InvalidState(format!(
                "frame cannot bind from state {other}"
            ))),
        }
    }

    pub fn begin(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        match *state {
            FrameState::Bound => {
                *state = FrameState::InProgress;
                Ok(())
            }
            other => Err(GatekitError::InvalidState(format!(
                "frame cannot start authentication from state {other}"
            ))),
        }
    }

    pub fn resolve(&self) {
        *self.state.lock().unwrap() = FrameState::Resolved;
    }
}
