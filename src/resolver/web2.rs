//! Resolver for centralized (account-style) providers.

use std::sync::Arc;

use crate::adapter::{AccountAdapter, AdapterProfile, ProviderAdapter};
use crate::channel::ProviderChannel;
use crate::error::{GatekitError, Result};
use crate::types::{IdentityProviderDescriptor, Session};

use super::IdentityResolver;

pub struct Web2IdentityResolver {
    descriptor: IdentityProviderDescriptor,
}

impl Web2IdentityResolver {
    pub fn new(descriptor: IdentityProviderDescriptor) -> Self {
        Self { descriptor }
    }
}

impl IdentityResolver for Web2IdentityResolver {
    fn descriptor(&self) -> &IdentityProviderDescriptor {
        &self.descriptor
    }

    fn build_adapter(&self, channel: Arc<dyn ProviderChannel>) -> Arc<dyn ProviderAdapter> {
        Arc::new(AccountAdapter::new(
            AdapterProfile::from_descriptor(&self.descriptor),
            Some(channel),
        ))
    }

    /// A centralized identity is the opaque account id the provider
    /// reported; the session uid stands in when the payload omits it.
    fn canonical_identifier(&self, session: &Session) -> Result<String> {
        let from_payload = session
            .raw
            .get("account_id")
            .and_then(|v| v.as_str())
            .map(String::from);
        from_payload
            .or_else(|| (!session.uid.is_empty()).then(|| session.uid.clone()))
            .ok_or_else(|| {
                GatekitError::InvalidState("session carries no account id".to_string())
            })
    }
}
