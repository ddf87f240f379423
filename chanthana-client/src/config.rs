//! Client configuration
//!
//! [`AirtableConfig`] holds the credentials and target base, persisted by
//! [`ConfigStore`] as JSON. [`ClientConfig`] holds HTTP-level settings.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{ClientError, ClientResult};

pub const DEFAULT_API_URL: &str = "https://api.airtable.com/v0";
pub const DEFAULT_BASE_ID: &str = "appjSFSHxwJqhnUJj";
pub const DEFAULT_TABLE: &str = "Plats DB";
pub const CONFIG_FILE: &str = "airtable-config.json";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_STALE_SECS: u64 = 5 * 60;

/// Credentials and target base
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirtableConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_id")]
    pub base_id: String,
    /// Table used by the connection test
    #[serde(default = "default_table")]
    pub table_name: String,
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn default_base_id() -> String {
    DEFAULT_BASE_ID.to_string()
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

impl Default for AirtableConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_id: default_base_id(),
            table_name: default_table(),
        }
    }
}

// The key never goes through Debug
impl std::fmt::Debug for AirtableConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirtableConfig")
            .field("api_key", &self.fingerprint())
            .field("base_id", &self.base_id)
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl AirtableConfig {
    pub fn new(api_key: impl Into<String>, base_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_id: base_id.into(),
            ..Default::default()
        }
    }

    pub fn with_table(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    /// Read from `AIRTABLE_API_KEY`, `AIRTABLE_BASE_ID` and `AIRTABLE_TABLE`
    ///
    /// Returns `None` when no API key is set.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(env_var)
    }

    /// Same as [`Self::from_env`] over an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let set = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let api_key = set("AIRTABLE_API_KEY")?;
        let base_id = set("AIRTABLE_BASE_ID").unwrap_or_else(default_base_id);
        let table_name = set("AIRTABLE_TABLE").unwrap_or_else(default_table);

        Some(Self {
            api_key: api_key.trim().to_string(),
            base_id: base_id.trim().to_string(),
            table_name,
        })
    }

    pub fn validate(&self) -> ClientResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(ClientError::Config("API key is required".into()));
        }
        if self.base_id.trim().is_empty() {
            return Err(ClientError::Config("base id is required".into()));
        }
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.validate().is_ok()
    }

    /// First 8 hex chars of the key's SHA-256, safe to log
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.api_key)
    }
}

pub fn fingerprint(api_key: &str) -> String {
    let digest = Sha256::digest(api_key.as_bytes());
    hex::encode(&digest[..4])
}

/// HTTP-level settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root (e.g., "https://api.airtable.com/v0")
    pub api_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Age after which cached lists are refetched
    pub stale_time: Duration,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            timeout: DEFAULT_TIMEOUT_SECS,
            stale_time: Duration::from_secs(DEFAULT_STALE_SECS),
        }
    }

    /// Read from `AIRTABLE_API_URL`, `AIRTABLE_TIMEOUT_SECS` and `AIRTABLE_STALE_SECS`
    pub fn from_env() -> Self {
        Self::from_lookup(env_var)
    }

    /// Same as [`Self::from_env`] over an arbitrary variable source;
    /// unparsable numbers fall back to the defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let seconds = |name: &str, default: u64| {
            lookup(name)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };
        let api_url = lookup("AIRTABLE_API_URL")
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let timeout = seconds("AIRTABLE_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);
        let stale_secs = seconds("AIRTABLE_STALE_SECS", DEFAULT_STALE_SECS);

        Self::new(api_url)
            .with_timeout(timeout)
            .with_stale_time(Duration::from_secs(stale_secs))
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

/// JSON file holding the saved [`AirtableConfig`]
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store at `<dir>/airtable-config.json`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join(CONFIG_FILE),
        }
    }

    /// Ensure the parent directory exists
    pub fn ensure_dir(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    pub fn save(&self, config: &AirtableConfig) -> ClientResult<()> {
        self.ensure_dir()?;
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, json)?;
        tracing::info!(
            path = %self.path.display(),
            key = %config.fingerprint(),
            "Airtable configuration saved"
        );
        Ok(())
    }

    /// Saved configuration; a missing or unreadable file yields `None`
    pub fn load(&self) -> Option<AirtableConfig> {
        if !self.path.exists() {
            return None;
        }
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Cannot read config file");
                return None;
            }
        };
        match serde_json::from_str(&json) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring unparsable config file");
                None
            }
        }
    }

    /// Remove the saved configuration
    pub fn clear(&self) -> ClientResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            tracing::info!(path = %self.path.display(), "Airtable configuration cleared");
        }
        Ok(())
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Environment first, then the saved file
    pub fn resolve(&self) -> Option<AirtableConfig> {
        self.resolve_with(env_var)
    }

    /// [`Self::resolve`] over an arbitrary variable source
    ///
    /// A saved file that fails [`AirtableConfig::validate`] is ignored.
    pub fn resolve_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<AirtableConfig> {
        if let Some(config) = AirtableConfig::from_lookup(lookup) {
            tracing::debug!(key = %config.fingerprint(), "Using Airtable configuration from environment");
            return Some(config);
        }
        self.load().filter(AirtableConfig::is_configured)
    }
}
