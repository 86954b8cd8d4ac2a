//! Convenience re-exports for common use.

pub use crate::adapter::{AdapterProfile, ChainAdapter, ConnectNotice, ProviderAdapter};
pub use crate::app::{AuthenticationApp, AuthenticationAppOptions, StartedAuthentication};
pub use crate::channel::{
    ChannelFactory, ConnectPayload, InjectedProvider, MethodCall, ProviderChannel,
    StandardChannelFactory,
};
pub use crate::config::GatekitConfig;
pub use crate::error::{GatekitError, Result};
pub use crate::frame::{AuthenticationFrame, FrameContext, FrameOutcome, FrameState};
pub use crate::registry::ProviderRegistry;
pub use crate::resolver::{IdentityResolver, ResolverRegistry};
pub use crate::storage::{MemoryStorage, Storage};
pub use crate::types::{
    ChainSet, ConnectorType, CurrentSession, IdentityProviderDescriptor, Session, UserData,
    WebVersion,
};
