//! Resolver for decentralized (wallet-style) providers.

use std::sync::Arc;

use crate::adapter::{AdapterProfile, ChainAdapter, ProviderAdapter};
use crate::channel::ProviderChannel;
use crate::error::{GatekitError, Result};
use crate::types::{IdentityProviderDescriptor, Session};

use super::IdentityResolver;

pub struct Web3IdentityResolver {
    descriptor: IdentityProviderDescriptor,
}

impl Web3IdentityResolver {
    pub fn new(descriptor: IdentityProviderDescriptor) -> Self {
        Self { descriptor }
    }
}

impl IdentityResolver for Web3IdentityResolver {
    fn descriptor(&self) -> &IdentityProviderDescriptor {
        &self.descriptor
    }

    fn build_adapter(&self, channel: Arc<dyn ProviderChannel>) -> Arc<dyn ProviderAdapter> {
        Arc::new(ChainAdapter::new(
            AdapterProfile::from_descriptor(&self.descriptor),
            Some(channel),
        ))
    }

    fn build_session(&self, adapter: &dyn ProviderAdapter) -> Result<Session> {
        let mut session = adapter.get_session()?;
        // The chain address is the identity for this family.
        if let Some(account) = session.accounts.first() {
            session.uid = account.clone();
        }
        Ok(session)
    }

    /// A decentralized identity is its chain address.
    fn canonical_identifier(&self, session: &Session) -> Result<String> {
        session
            .accounts
            .first()
            .cloned()
            .or_else(|| (!session.uid.is_empty()).then(|| session.uid.clone()))
            .ok_or_else(|| {
                GatekitError::InvalidState("session carries no chain address".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ProviderRegistry;
    use crate::types::ConnectorType;
    use chrono::Utc;

    fn resolver() -> Web3IdentityResolver {
        Web3IdentityResolver::new(ProviderRegistry::builtin().get("metamask").unwrap().clone())
    }

    fn session(accounts: Vec<&str>) -> Session {
        Session {
            uid: accounts.first().map(|a| a.to_string()).unwrap_or_default(),
            provider: "metamask".to_string(),
            connector_type: ConnectorType::Injected,
            chain_id: Some(1),
            accounts: accounts.into_iter().map(String::from).collect(),
            raw: serde_json::Value::Null,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn canonical_identifier_is_first_account() {
        let session = session(vec!["0xabc", "0xdef"]);
        assert_eq!(
            resolver().canonical_identifier(&session).unwrap(),
            "0xabc"
        );
    }

    #[test]
    fn canonical_identifier_fails_without_accounts() {
        let session = session(vec![]);
        assert!(resolver().canonical_identifier(&session).is_err());
    }
}
