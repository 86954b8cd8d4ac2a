//! Persistent key-value storage consumed by the authentication app.

pub mod file;
pub mod memory;

pub use file::{FileStorage, FileStorageConfig};
pub use memory::MemoryStorage;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

/// Well-known storage keys. Each is a fixed string constant; only the
/// authentication app writes the token/session keys.
pub mod keys {
    pub const USER: &str = "gatekit_user";
    pub const USER_IDPS: &str = "gatekit_user_idps";
    pub const CURRENT_SESSION: &str = "gatekit_current_session";
    pub const AUTH_TOKEN: &str = "gatekit_auth_token";
}

/// Async storage abstraction over JSON values.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_raw(&self, key: &str) -> Result<Option<serde_json::Value>>;
    async fn set_raw(&self, key: &str, value: serde_json::Value) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

impl dyn Storage {
    /// Typed read. `None` when the key is absent.
    pub async fn get_item<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_raw(key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Typed write. Last write wins; values are not merged.
    pub async fn set_item<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<()> {
        self.set_raw(key, serde_json::to_value(value)?).await
    }
}
