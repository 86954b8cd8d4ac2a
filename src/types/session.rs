//! Session and user-identity data shapes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::provider::ConnectorType;

/// Persistable snapshot of one provider connection.
///
/// Produced by a channel/adapter at connect or check-session time; owned by
/// the persistence layer once handed to the authentication app. Re-hydrating
/// a channel from a stored `Session` yields the same connected state,
/// accounts, and chain id (modulo live re-validation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Canonical identifier: chain address for decentralized providers,
    /// opaque account id for centralized ones.
    pub uid: String,
    pub provider: String,
    pub connector_type: ConnectorType,
    #[serde(default)]
    pub chain_id: Option<u64>,
    #[serde(default)]
    pub accounts: Vec<String>,
    /// Opaque provider-specific payload carried through untouched.
    #[serde(default)]
    pub raw: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Persisted envelope for the active identity context. At most one current
/// session exists; a new successful authentication overwrites it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentSession {
    pub uid: String,
    pub provider: String,
    pub session: Session,
    pub connector_type: ConnectorType,
}

impl From<Session> for CurrentSession {
    fn from(session: Session) -> Self {
        Self {
            uid: session.uid.clone(),
            provider: session.provider.clone(),
            connector_type: session.connector_type,
            session,
        }
    }
}

/// Server-confirmed user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    pub current_session: CurrentSession,
    #[serde(default)]
    pub email: Option<String>,
}

/// One identity provider previously linked to a user, as reported by the
/// backend. `meta_data.sessions` carries historical sessions keyed by
/// provider path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSentIdentityProvider {
    pub uid: String,
    pub provider: String,
    #[serde(default)]
    pub meta_data: IdpMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdpMetadata {
    #[serde(default)]
    pub sessions: HashMap<String, Vec<Session>>,
}

/// Server-confirmed identity plus every linked identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserData {
    pub user: UserRecord,
    #[serde(default)]
    pub idps: Vec<ServerSentIdentityProvider>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session() -> Session {
        Session {
            uid: "0xabc".to_string(),
            provider: "metamask".to_string(),
            connector_type: ConnectorType::Injected,
            chain_id: Some(1),
            accounts: vec!["0xabc".to_string()],
            raw: serde_json::json!({"path": "ethereum"}),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn session_round_trips_through_json() {
        let session = sample_session();
        let encoded = serde_json::to_value(&session).unwrap();
        let decoded: Session = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, session);
    }

    #[test]
    fn current_session_envelope_mirrors_session_identity() {
        let session = sample_session();
        let current = CurrentSession::from(session.clone());
        assert_eq!(current.uid, session.uid);
        assert_eq!(current.provider, session.provider);
        assert_eq!(current.connector_type, session.connector_type);
        assert_eq!(current.session, session);
    }

    #[test]
    fn session_tolerates_missing_optional_fields() {
        let decoded: Session = serde_json::from_value(serde_json::json!({
            "uid": "acct-1",
            "provider": "google",
            "connector_type": "remote",
            "created_at": "2026-01-01T00:00:00Z",
        }))
        .unwrap();
        assert!(decoded.chain_id.is_none());
        assert!(decoded.accounts.is_empty());
        assert!(decoded.raw.is_null());
    }
}
