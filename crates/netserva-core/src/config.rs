//! Configuration types for domain synchronization
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};

/// Main sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Registrar configuration
    pub registrar: RegistrarConfig,

    /// Local domain cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Optional engine settings
    #[serde(default)]
    pub sync: SyncSettings,
}

impl SyncConfig {
    /// Create a configuration for the given registrar with default settings
    pub fn new(registrar: RegistrarConfig) -> Self {
        Self {
            registrar,
            cache: CacheConfig::default(),
            sync: SyncSettings::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.registrar.validate()?;
        self.cache.validate()?;
        self.sync.validate()?;
        Ok(())
    }
}

/// Registrar configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistrarConfig {
    /// Synergy Wholesale reseller API
    Synergy {
        /// Reseller account ID
        reseller_id: String,
        /// API key; never log this value
        api_key: String,
        /// API base URL override (defaults to the production endpoint)
        #[serde(default)]
        api_url: Option<String>,
        /// Per-request timeout in seconds
        #[serde(default)]
        timeout_secs: Option<u64>,
    },

    /// Custom registrar
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

// Keeps the API key out of logs.
impl std::fmt::Debug for RegistrarConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrarConfig::Synergy {
                reseller_id,
                api_url,
                timeout_secs,
                ..
            } => f
                .debug_struct("Synergy")
                .field("reseller_id", reseller_id)
                .field("api_key", &"<REDACTED>")
                .field("api_url", api_url)
                .field("timeout_secs", timeout_secs)
                .finish(),
            RegistrarConfig::Custom { factory, .. } => f
                .debug_struct("Custom")
                .field("factory", factory)
                .finish_non_exhaustive(),
        }
    }
}

impl RegistrarConfig {
    /// Validate the registrar configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            RegistrarConfig::Synergy {
                reseller_id,
                api_key,
                api_url,
                timeout_secs,
            } => {
                if reseller_id.trim().is_empty() {
                    return Err(crate::Error::config("Synergy reseller ID cannot be empty"));
                }
                if !reseller_id.trim().chars().all(|c| c.is_ascii_digit()) {
                    return Err(crate::Error::config("Synergy reseller ID must be numeric"));
                }
                if api_key.is_empty() {
                    return Err(crate::Error::config("Synergy API key cannot be empty"));
                }
                if let Some(url) = api_url
                    && !url.starts_with("https://")
                    && !url.starts_with("http://")
                {
                    return Err(crate::Error::config(format!(
                        "Synergy API URL must use HTTP or HTTPS scheme. Got: {}",
                        url
                    )));
                }
                if matches!(timeout_secs, Some(0)) {
                    return Err(crate::Error::config("Synergy API timeout must be > 0"));
                }
                Ok(())
            }
            RegistrarConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom registrar factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom registrar config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the registrar type name
    pub fn type_name(&self) -> &str {
        match self {
            RegistrarConfig::Synergy { .. } => "synergy",
            RegistrarConfig::Custom { factory, .. } => factory,
        }
    }
}

/// Domain cache configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CacheConfig {
    /// JSON file cache
    File {
        /// Path to the cache file
        path: String,
    },

    /// In-memory cache (not persistent)
    #[default]
    Memory,

    /// Custom cache store
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl CacheConfig {
    /// Validate the cache configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            CacheConfig::File { path } if path.is_empty() => {
                Err(crate::Error::config("Cache file path cannot be empty"))
            }
            CacheConfig::Custom { factory, .. } if factory.is_empty() => {
                Err(crate::Error::config("Custom cache factory cannot be empty"))
            }
            _ => Ok(()),
        }
    }

    /// Get the cache store type name
    pub fn type_name(&self) -> &str {
        match self {
            CacheConfig::File { .. } => "file",
            CacheConfig::Memory => "memory",
            CacheConfig::Custom { factory, .. } => factory,
        }
    }
}

/// What a sync does with glue records the registry no longer publishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaleGluePolicy {
    /// Keep them, flagged as stale
    #[default]
    Mark,
    /// Drop them from the cache
    Purge,
}

impl std::str::FromStr for StaleGluePolicy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mark" => Ok(Self::Mark),
            "purge" => Ok(Self::Purge),
            other => Err(crate::Error::config(format!(
                "Unknown stale glue policy '{}'. Valid: mark, purge",
                other
            ))),
        }
    }
}

/// Engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Maximum number of retry attempts for failed registrar reads
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Delay between retry attempts (in seconds)
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Pause between domains during a bulk sync (in milliseconds)
    ///
    /// Keeps a sweep over hundreds of domains under the registrar's rate limit.
    #[serde(default = "default_bulk_delay_ms")]
    pub bulk_delay_ms: u64,

    /// Whether bulk sync revisits cancelled records
    #[serde(default)]
    pub include_cancelled: bool,

    /// Stale glue handling
    #[serde(default)]
    pub stale_glue: StaleGluePolicy,

    /// Compute drift and log intended changes without writing anything
    #[serde(default)]
    pub dry_run: bool,

    /// Capacity of the internal event channel
    ///
    /// When full, new events are dropped with a warning log.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl SyncSettings {
    /// Validate the engine settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.max_retries > 10 {
            return Err(crate::Error::config(format!(
                "max_retries must be between 0 and 10. Got: {}",
                self.max_retries
            )));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("event_channel_capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
            bulk_delay_ms: default_bulk_delay_ms(),
            include_cancelled: false,
            stale_glue: StaleGluePolicy::default(),
            dry_run: false,
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_max_retries() -> usize {
    2
}

fn default_retry_delay_secs() -> u64 {
    2
}

fn default_bulk_delay_ms() -> u64 {
    250
}

fn default_event_channel_capacity() -> usize {
    1000
}
