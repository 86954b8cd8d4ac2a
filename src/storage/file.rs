//! File-backed storage using per-key JSON files.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GatekitError, Result};

use super::Storage;

/// Configuration for file-backed storage.
#[derive(Debug, Clone)]
pub struct FileStorageConfig {
    pub base_dir: PathBuf,
}

impl FileStorageConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn default_dir() -> PathBuf {
        default_gatekit_dir()
    }
}

/// File-backed storage. Each key lives in its own JSON file wrapped in a
/// versioned envelope.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_dir: PathBuf,
}

impl FileStorage {
    pub fn new(config: FileStorageConfig) -> Self {
        Self {
            base_dir: config.base_dir,
        }
    }

    pub fn new_default() -> Self {
        Self {
            base_dir: default_gatekit_dir(),
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", normalize_key(key)))
    }

    async fn ensure_parent(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn get_raw(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let path = self.entry_path(key);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(GatekitError::Storage(err.to_string())),
        };
        let entry: StoredEntry = serde_json::from_str(&raw)?;
        Ok(Some(entry.value))
    }

    async fn set_raw(&self, key: &str, value: serde_json::Value) -> Result<()> {
        let path = self.entry_path(key);
        Self::ensure_parent(&path).await?;
        let entry = StoredEntry {
            version: 1,
            key: key.to_string(),
            value,
            saved_at: Utc::now(),
        };
        let serialized = serde_json::to_string_pretty(&entry)?;
        tokio::fs::write(&path, serialized).await?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600)).await?;
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(GatekitError::Storage(err.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    version: u32,
    key: String,
    value: serde_json::Value,
    saved_at: DateTime<Utc>,
}

fn default_gatekit_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".gatekit"))
        .unwrap_or_else(|| PathBuf::from(".gatekit"))
}

fn normalize_key(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "default".to_string();
    }
    let mut out = String::with_capacity(trimmed.len());
    for ch in trimmed.chars() {
        let lower = ch.to_ascii_lowercase();
        if lower.is_ascii_alphanumeric() || lower == '-' || lower == '_' {
            out.push(lower);
        } else {
            out.push('-');
        }
    }
    out
}
