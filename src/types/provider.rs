//! Provider descriptors and chain-membership policy.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::GatekitError;

/// Provider family. Every descriptor declares exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WebVersion {
    Centralized,
    Decentralized,
}

impl WebVersion {
    /// Parse a raw family label. The loud failure point for descriptors
    /// loaded from serialized form.
    pub fn parse(value: &str) -> Result<Self, GatekitError> {
        Self::from_str(value).map_err(|_| GatekitError::UnknownWebVersion(value.to_string()))
    }
}

/// Kind of transport a provider is reached over. Recorded in sessions so a
/// stored session can be re-hydrated through the same kind of channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConnectorType {
    Injected,
    Remote,
}

/// A named set of allowed chain identifiers. Empty means unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSet(BTreeSet<u64>);

impl ChainSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `chain_id` is permitted. An empty set permits everything.
    pub fn allows(&self, chain_id: u64) -> bool {
        self.0.is_empty() || self.0.contains(&chain_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<u64> for ChainSet {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Immutable description of one identity provider, loaded once at process
/// start into the provider registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityProviderDescriptor {
    /// Registry key, e.g. `"metamask"`.
    pub code: String,
    pub display_name: String,
    pub web_version: WebVersion,
    pub connector: ConnectorType,
    /// Name of the injected object an injected channel binds to
    /// (e.g. `"ethereum"`). `None` for centralized providers.
    pub provider_path: Option<String>,
    #[serde(default)]
    pub chain_constraints: ChainSet,
}

/// Descriptor as it appears in serialized registry definitions, before the
/// family label has been validated.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProviderDescriptor {
    pub code: String,
    pub display_name: String,
    pub web_version: String,
    pub connector: ConnectorType,
    #[serde(default)]
    pub provider_path: Option<String>,
    #[serde(default)]
    pub chain_constraints: ChainSet,
}

impl TryFrom<RawProviderDescriptor> for IdentityProviderDescriptor {
    type Error = GatekitError;

    fn try_from(raw: RawProviderDescriptor) -> Result<Self, GatekitError> {
        Ok(Self {
            web_version: WebVersion::parse(&raw.web_version)?,
            code: raw.code,
            display_name: raw.display_name,
            connector: raw.connector,
            provider_path: raw.provider_path,
            chain_constraints: raw.chain_constraints,
        })
    }
}
