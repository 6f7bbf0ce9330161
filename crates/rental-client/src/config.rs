//! # Client Configuration
//!
//! Where the backend lives, how long to wait for it, where stores persist
//! and how long cached queries stay fresh.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     RENTAL_API_URL=https://api.example.com/api/v1                      │
//! │     RENTAL_TIMEOUT_SECS=10                                             │
//! │     RENTAL_DATA_DIR=/var/lib/rental-admin                              │
//! │     RENTAL_STALE_SECS=0                                                │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/rental-admin/admin.toml (Linux)                          │
//! │     ~/Library/Application Support/com.rental.admin/admin.toml (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:8000/api/v1, 10 s timeout                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # admin.toml
//! [api]
//! base_url = "http://localhost:8000/api/v1"
//! timeout_secs = 10
//!
//! [storage]
//! data_dir = "/home/me/.local/share/rental-admin"
//!
//! [cache]
//! stale_secs = 0
//!
//! [auth]
//! rehydrate_timeout_ms = 1000
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

// =============================================================================
// API Settings
// =============================================================================

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL every resource path is appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_timeout() -> u64 {
    10
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Where persisted store snapshots live.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Directory for `auth-storage.json` and `app-storage.json`.
    /// Falls back to the platform data dir when unset.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

// =============================================================================
// Cache Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// How long a cached query counts as fresh. 0 means every fetch
    /// goes to the network.
    #[serde(default)]
    pub stale_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        CacheSettings { stale_secs: 0 }
    }
}

// =============================================================================
// Auth Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// How long the auth store waits for rehydration before it stops
    /// reporting `is_loading`.
    #[serde(default = "default_rehydrate_timeout")]
    pub rehydrate_timeout_ms: u64,
}

fn default_rehydrate_timeout() -> u64 {
    1000
}

impl Default for AuthSettings {
    fn default() -> Self {
        AuthSettings {
            rehydrate_timeout_ms: default_rehydrate_timeout(),
        }
    }
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub auth: AuthSettings,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Config pointing at a specific backend, everything else default.
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.api.base_url = base_url.into();
        config
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (admin.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Client config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        let url = Url::parse(&self.api.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("RENTAL_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Ok(timeout) = std::env::var("RENTAL_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(t) => self.api.timeout_secs = t,
                Err(_) => warn!(value = %timeout, "Ignoring non-numeric RENTAL_TIMEOUT_SECS"),
            }
        }

        if let Ok(dir) = std::env::var("RENTAL_DATA_DIR") {
            debug!(dir = %dir, "Overriding data dir from environment");
            self.storage.data_dir = Some(PathBuf::from(dir));
        }

        if let Ok(stale) = std::env::var("RENTAL_STALE_SECS") {
            if let Ok(s) = stale.parse::<u64>() {
                self.cache.stale_secs = s;
            }
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "rental", "admin")
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("admin.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.api.base_url.trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.cache.stale_secs)
    }

    pub fn rehydrate_timeout(&self) -> Duration {
        Duration::from_millis(self.auth.rehydrate_timeout_ms)
    }

    /// Configured data dir, else the platform data dir.
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.storage
            .data_dir
            .clone()
            .or_else(|| Self::project_dirs().map(|dirs| dirs.data_dir().to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url(), "http://localhost:8000/api/v1");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.stale_time(), Duration::ZERO);
        assert_eq!(config.rehydrate_timeout(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::for_base_url("ftp://example.com");
        assert!(config.validate().is_err());

        config.api.base_url = "not a url".into();
        assert!(config.validate().is_err());

        config.api.base_url = "https://api.example.com/api/v1/".into();
        assert!(config.validate().is_ok());
        assert_eq!(config.base_url(), "https://api.example.com/api/v1");

        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ClientConfig = toml::from_str("[cache]\nstale_secs = 30\n").unwrap();
        assert_eq!(config.cache.stale_secs, 30);
        assert_eq!(config.api.timeout_secs, 10);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("admin.toml");
        let mut config = ClientConfig::for_base_url("http://127.0.0.1:9000/api/v1");
        config.cache.stale_secs = 5;
        config.save(Some(path.clone())).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[api]"));

        let loaded: ClientConfig = toml::from_str(&text).unwrap();
        assert_eq!(loaded.api.base_url, "http://127.0.0.1:9000/api/v1");
        assert_eq!(loaded.cache.stale_secs, 5);
    }
}
