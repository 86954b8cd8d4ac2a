//! Configuration system (layered: code > env > defaults).

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// Global default config (lazy-initialized from env).
static DEFAULT_CONFIG: OnceLock<GatekitConfig> = OnceLock::new();

pub const DEFAULT_AUTH_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_PROJECT_BASE_URL: &str = "http://localhost:3000";

/// Layered configuration for gatekit.
///
/// Resolution order: explicit values set in code, then environment
/// variables, then built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct GatekitConfig {
    values: Arc<RwLock<HashMap<String, String>>>,
}

const PROJECT_IDENTIFIER: &str = "project_identifier";
const AUTH_BASE_URL: &str = "auth_base_url";
const PROJECT_BASE_URL: &str = "project_base_url";

impl GatekitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from environment variables (GATEKIT_PROJECT_ID,
    /// GATEKIT_AUTH_BASE_URL, GATEKIT_PROJECT_BASE_URL).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let config = Self::new();

        let env_mappings = [
            ("GATEKIT_PROJECT_ID", PROJECT_IDENTIFIER),
            ("GATEKIT_AUTH_BASE_URL", AUTH_BASE_URL),
            ("GATEKIT_PROJECT_BASE_URL", PROJECT_BASE_URL),
        ];

        for (env_var, key) in &env_mappings {
            if let Ok(value) = std::env::var(env_var) {
                config.set(key, value);
            }
        }

        config
    }

    /// Get (or create) the global default config.
    pub fn global() -> &'static GatekitConfig {
        DEFAULT_CONFIG.get_or_init(Self::from_env)
    }

    fn set(&self, key: &str, value: String) {
        self.values
            .write()
            .unwrap()
            .insert(key.to_string(), value);
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.read().unwrap().get(key).cloned()
    }

    pub fn set_project_identifier(&self, value: impl Into<String>) {
        self.set(PROJECT_IDENTIFIER, value.into());
    }

    /// The project identifier handed to provider handshakes. `None` until
    /// configured.
    pub fn project_identifier(&self) -> Option<String> {
        self.get(PROJECT_IDENTIFIER)
    }

    pub fn set_auth_base_url(&self, value: impl Into<String>) {
        self.set(AUTH_BASE_URL, value.into());
    }

    pub fn auth_base_url(&self) -> String {
        self.get(AUTH_BASE_URL)
            .unwrap_or_else(|| DEFAULT_AUTH_BASE_URL.to_string())
    }

    pub fn set_project_base_url(&self, value: impl Into<String>) {
        self.set(PROJECT_BASE_URL, value.into());
    }

    pub fn project_base_url(&self) -> String {
        self.get(PROJECT_BASE_URL)
            .unwrap_or_else(|| DEFAULT_PROJECT_BASE_URL.to_string())
    }
}
