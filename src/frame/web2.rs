//! Frame for centralized providers: prepares the authorization request.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::resolver::IdentityResolver;
use crate::types::WebVersion;

use super::{AuthenticationFrame, FrameContext, FrameCore, FrameOutcome, FrameState};

/// The centralized handshake itself runs on the application's
/// authorization surface; the frame's job is assembling the request.
pub struct Web2Frame {
    resolver: Arc<dyn IdentityResolver>,
    core: FrameCore,
}

impl Web2Frame {
    pub fn new(resolver: Arc<dyn IdentityResolver>) -> Self {
        Self {
            resolver,
            core: FrameCore::new(),
        }
    }
}

#[async_trait]
impl AuthenticationFrame for Web2Frame {
    fn web_version(&self) -> WebVersion {
        WebVersion::Centralized
    }

    fn state(&self) -> FrameState {
        self.core.state()
    }

    fn attempt_id(&self) -> Uuid {
        self.core.attempt_id()
    }

    fn bind(&self) -> Result<()> {
        self.core.bind()
    }

    async fn init_auth(&self, ctx: FrameContext) -> Result<FrameOutcome> {
        self.core.begin()?;
        debug!(
            attempt_id = %self.core.attempt_id(),
            provider = %self.resolver.descriptor().code,
            "preparing centralized authorization request"
        );
        let params = ctx.query_data();
        self.core.resolve();
        Ok(FrameOutcome::AuthorizationRequest { params })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ProviderRegistry;
    use crate::resolver::Web2IdentityResolver;

    fn frame() -> Web2Frame {
        let descriptor = ProviderRegistry::builtin().get("google").unwrap().clone();
        Web2Frame::new(Arc::new(Web2IdentityResolver::new(descriptor)))
    }

    fn ctx() -> FrameContext {
        FrameContext::builder()
            .project_identifier("proj-1")
            .provider("google")
            .build()
    }

    #[tokio::test]
    async fn init_auth_yields_the_authorization_request() {
        let frame = frame();
        frame.bind().unwrap();
        match frame.init_auth(ctx()).await.unwrap() {
            FrameOutcome::AuthorizationRequest { params } => {
                assert_eq!(params["project_id"], "proj-1");
                assert_eq!(params["provider"], "google");
            }
            other => panic!("expected AuthorizationRequest, got {other:?}"),
        }
        assert_eq!(frame.state(), FrameState::Resolved);
    }

    #[tokio::test]
    async fn frame_is_single_use() {
        let frame = frame();
        frame.bind().unwrap();
        frame.init_auth(ctx()).await.unwrap();
        assert!(frame.init_auth(ctx()).await.is_err());
    }

    #[tokio::test]
    async fn init_auth_requires_bind() {
        let frame = frame();
        assert!(frame.init_auth(ctx()).await.is_err());
    }
}
