//! Provider-originated events delivered through channel subscriptions.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Event kind used to filter subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    Connect,
    Disconnect,
    AccountsChanged,
    ChainChanged,
}

/// A provider-originated event. Delivery is push-based and may occur at any
/// time after a listener is registered.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// Provider signalled connection. Payload shape varies per provider;
    /// some report partial data, some nothing until polled.
    Connect {
        data: serde_json::Value,
        accounts: Option<Vec<String>>,
        chain_id: Option<u64>,
    },
    Disconnect { reason: Option<String> },
    AccountsChanged(Vec<String>),
    ChainChanged(u64),
}

impl ChannelEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Connect { .. } => EventKind::Connect,
            Self::Disconnect { .. } => EventKind::Disconnect,
            Self::AccountsChanged(_) => EventKind::AccountsChanged,
            Self::ChainChanged(_) => EventKind::ChainChanged,
        }
    }
}
