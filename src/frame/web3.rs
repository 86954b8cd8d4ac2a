//! Frame for decentralized providers: drives the wallet connect natively.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::channel::ChannelFactory;
use crate::error::Result;
use crate::resolver::IdentityResolver;
use crate::types::WebVersion;

use super::{AuthenticationFrame, FrameContext, FrameCore, FrameOutcome, FrameState};

pub struct Web3NativeFrame {
    resolver: Arc<dyn IdentityResolver>,
    channels: Arc<dyn ChannelFactory>,
    core: FrameCore,
}

impl Web3NativeFrame {
    pub fn new(resolver: Arc<dyn IdentityResolver>, channels: Arc<dyn ChannelFactory>) -> Self {
        Self {
            resolver,
            channels,
            core: FrameCore::new(),
        }
    }
}

#[async_trait]
impl AuthenticationFrame for Web3NativeFrame {
    fn web_version(&self) -> WebVersion {
        WebVersion::Decentralized
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
            provider = %ctx.provider,
            "starting decentralized handshake"
        );

        let result = self.drive(&ctx).await;
        self.core.resolve();
        result
    }
}

impl Web3NativeFrame {
    async fn drive(&self, ctx: &FrameContext) -> Result<FrameOutcome> {
        let channel = self.channels.channel_for(self.resolver.descriptor())?;
        let adapter = self.resolver.build_adapter(channel);
        adapter.connect(ctx.options.clone()).await?;
        let session = self.resolver.build_session(adapter.as_ref())?;
        debug!(
            attempt_id = %self.core.attempt_id(),
            uid = %session.uid,
            chain_id = ?session.chain_id,
            "decentralized handshake produced session"
        );
        Ok(FrameOutcome::Connected { session })
    }
}
