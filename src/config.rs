//! Configuration types for flood-warnings

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, net::SocketAddr, path::PathBuf, time::Duration};

/// Main configuration
///
/// Every field has a default, so an empty document deserializes into a
/// working configuration pointed at the public BOM repository.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote repository connection and staging settings
    #[serde(default)]
    pub repository: RepositoryConfig,

    /// Result cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Region code to remote-naming prefix overrides
    ///
    /// Empty means the built-in table is used as-is.
    #[serde(default)]
    pub regions: HashMap<String, String>,

    /// REST API settings
    #[serde(default)]
    pub api: ApiConfig,
}

/// Remote repository configuration
///
/// Immutable for the lifetime of a gateway.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Repository hostname (default: "ftp.bom.gov.au")
    #[serde(default = "default_host")]
    pub host: String,

    /// Control connection port (default: 21)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Upgrade the control connection with explicit TLS
    #[serde(default)]
    pub use_secure_transport: bool,

    /// Login user (default: "anonymous")
    #[serde(default = "default_username")]
    pub username: String,

    /// Login password (default: "guest")
    #[serde(default = "default_password")]
    pub password: String,

    /// Directory holding the warning products (default: "/anon/gen/fwo/")
    #[serde(default = "default_remote_directory")]
    pub remote_directory: String,

    /// Local directory for staged downloads (default: "downloads")
    #[serde(default = "default_staging_directory")]
    pub local_staging_directory: PathBuf,

    /// Retry policy for establishing connections
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            use_secure_transport: false,
            username: default_username(),
            password: default_password(),
            remote_directory: default_remote_directory(),
            local_staging_directory: default_staging_directory(),
            retry: RetryConfig::default(),
        }
    }
}

impl RepositoryConfig {
    /// Check that the settings needed to reach the repository are present
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Config {
                message: "remote repository host is not configured".to_string(),
                key: Some("host".to_string()),
            });
        }
        if self.remote_directory.trim().is_empty() {
            return Err(Error::Config {
                message: "remote repository directory is not configured".to_string(),
                key: Some("remote_directory".to_string()),
            });
        }
        let multiplier = self.retry.backoff_multiplier;
        if !(multiplier.is_finite() && (1.0..=MAX_BACKOFF_MULTIPLIER).contains(&multiplier)) {
            return Err(Error::Config {
                message: format!(
                    "retry backoff multiplier must be between 1 and {MAX_BACKOFF_MULTIPLIER}, got {multiplier}"
                ),
                key: Some("retry.backoff_multiplier".to_string()),
            });
        }
        Ok(())
    }

    /// `host:port` address of the control connection
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Largest accepted [`RetryConfig::backoff_multiplier`]
pub const MAX_BACKOFF_MULTIPLIER: f64 = 100.0;

/// Retry configuration for transient connection failures
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total number of attempts, including the first (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry, in milliseconds when serialized (default: 1000)
    #[serde(default = "default_initial_delay", with = "millis_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries, in milliseconds when serialized (default: 60000)
    #[serde(default = "default_max_delay", with = "millis_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: false)
    #[serde(default)]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: false,
        }
    }
}

/// Result cache configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Store-wide TTL for entries set without one (default: 86400 seconds)
    ///
    /// Zero means entries never expire.
    #[serde(default = "default_cache_ttl", with = "duration_serde")]
    pub default_ttl: Duration,

    /// Interval between expiry sweeps (default: 18000 seconds)
    #[serde(default = "default_check_period", with = "duration_serde")]
    pub check_period: Duration,

    /// TTL applied to warning lists and details (default: 600 seconds)
    #[serde(default = "default_result_ttl", with = "duration_serde")]
    pub result_ttl: Duration,

    /// Keep the cache warm by refetching every region in the background (default: false)
    #[serde(default)]
    pub hydrate: bool,

    /// Interval between hydration runs (default: 600 seconds)
    #[serde(default = "default_hydrate_interval", with = "duration_serde")]
    pub hydrate_interval: Duration,

    /// Pause after each detail fetched during hydration, in milliseconds when serialized (default: 200)
    #[serde(default = "default_detail_delay", with = "millis_serde")]
    pub detail_delay: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: default_cache_ttl(),
            check_period: default_check_period(),
            result_ttl: default_result_ttl(),
            hydrate: false,
            hydrate_interval: default_hydrate_interval(),
            detail_delay: default_detail_delay(),
        }
    }
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind the API server (default: 127.0.0.1:3000)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins ("*" allows any)
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Serve Swagger UI at /swagger-ui (default: false)
    #[serde(default)]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: false,
        }
    }
}

// Default value functions
fn default_host() -> String {
    "ftp.bom.gov.au".to_string()
}

fn default_port() -> u16 {
    21
}

fn default_username() -> String {
    "anonymous".to_string()
}

fn default_password() -> String {
    "guest".to_string()
}

fn default_remote_directory() -> String {
    "/anon/gen/fwo/".to_string()
}

fn default_staging_directory() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_cache_ttl() -> Duration {
    Duration::from_secs(86_400)
}

fn default_check_period() -> Duration {
    Duration::from_secs(18_000)
}

fn default_result_ttl() -> Duration {
    Duration::from_secs(600)
}

fn default_hydrate_interval() -> Duration {
    Duration::from_secs(600)
}

fn default_detail_delay() -> Duration {
    Duration::from_millis(200)
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

fn default_true() -> bool {
    true
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Millisecond Duration serialization helper (retry delays are sub-second in tests)
mod millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
