//! Identity resolver dispatch: one strategy per provider family.

pub mod web2;
pub mod web3;

pub use web2::Web2IdentityResolver;
pub use web3::Web3IdentityResolver;

use std::collections::HashMap;
use std::sync::Arc;

use crate::adapter::ProviderAdapter;
use crate::channel::ProviderChannel;
use crate::error::{GatekitError, Result};
use crate::registry::ProviderRegistry;
use crate::types::{IdentityProviderDescriptor, Session, WebVersion};

/// Per-provider strategy: builds the family-correct adapter and session,
/// and computes the canonical identifier sent to the backend.
///
/// Resolvers hold no mutable state beyond the descriptor they were built
/// from.
pub trait IdentityResolver: Send + Sync {
    fn descriptor(&self) -> &IdentityProviderDescriptor;

    fn web_version(&self) -> WebVersion {
        self.descriptor().web_version
    }

    /// Construct the adapter for this provider over the given channel.
    fn build_adapter(&self, channel: Arc<dyn ProviderChannel>) -> Arc<dyn ProviderAdapter>;

    /// Persistable session from a connected adapter.
    fn build_session(&self, adapter: &dyn ProviderAdapter) -> Result<Session> {
        adapter.get_session()
    }

    /// Canonical identifier for this family: chain address for
    /// decentralized providers, opaque account id for centralized ones.
    fn canonical_identifier(&self, session: &Session) -> Result<String>;
}

/// `code -> resolver` map, built in one pass at startup.
///
/// Dispatch over [`WebVersion`] is a closed, exhaustive match; unknown
/// family labels cannot reach this point (raw descriptor parsing rejects
/// them with `UnknownWebVersion`).
pub struct ResolverRegistry {
    resolvers: HashMap<String, Arc<dyn IdentityResolver>>,
}

impl ResolverRegistry {
    pub fn build(providers: &ProviderRegistry) -> Self {
        let resolvers = providers
            .iter()
            .map(|descriptor| {
                let resolver: Arc<dyn IdentityResolver> = match descriptor.web_version {
                    WebVersion::Decentralized => {
                        Arc::new(Web3IdentityResolver::new(descriptor.clone()))
                    }
                    WebVersion::Centralized => {
                        Arc::new(Web2IdentityResolver::new(descriptor.clone()))
                    }
                };
                (descriptor.code.clone(), resolver)
            })
            .collect();
        Self { resolvers }
    }

    pub fn resolver_for(&self, code: &str) -> Result<Arc<dyn IdentityResolver>> {
        self.resolvers.get(code).cloned().ok_or_else(|| {
            GatekitError::Configuration(format!("no resolver registered for provider '{code}'"))
        })
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_builds_a_resolver_per_descriptor() {
        let providers = ProviderRegistry::builtin();
        let resolvers = ResolverRegistry::build(providers);
        assert_eq!(resolvers.len(), providers.len());
    }

    #[test]
    fn dispatch_matches_descriptor_family() {
        let resolvers = ResolverRegistry::build(ProviderRegistry::builtin());
        assert_eq!(
            resolvers.resolver_for("metamask").unwrap().web_version(),
            WebVersion::Decentralized
        );
        assert_eq!(
            resolvers.resolver_for("google").unwrap().web_version(),
            WebVersion::Centralized
        );
    }

    #[test]
    fn unknown_code_fails_resolution() {
        let resolvers = ResolverRegistry::build(ProviderRegistry::builtin());
        assert!(matches!(
            resolvers.resolver_for("nope"),
            Err(GatekitError::Configuration(_))
        ));
    }
}
