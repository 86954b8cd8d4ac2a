//! In-memory storage backend.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;

use super::Storage;

/// Process-local storage. The default backend for tests and for hosts
/// without a durable store.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, serde_json::Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_raw(&self, key: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_raw(&self, key: &str, value: serde_json::Value) -> Result<()> {
        self.items.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.items.write().await.remove(key);
        Ok(())
    }
}
