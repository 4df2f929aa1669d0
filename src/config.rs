//! Configuration types for gia-vang

use crate::cache::{DEFAULT_CACHE_FILE, DEFAULT_KEY_PREFIX};
use crate::price::Vendor;
use crate::telemetry::LogFormat;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Environment variable overriding the cache file location
pub const CACHE_FILE_ENV: &str = "PRICE_CACHE_FILE";
/// Redis connection URL; selects the Redis backend when set
pub const REDIS_URL_ENV: &str = "REDIS_URL";
/// Redis host; selects the Redis backend when set and no URL is given
pub const REDIS_HOST_ENV: &str = "REDIS_HOST";
pub const REDIS_PORT_ENV: &str = "REDIS_PORT";
pub const REDIS_USERNAME_ENV: &str = "REDIS_USERNAME";
pub const REDIS_PASSWORD_ENV: &str = "REDIS_PASSWORD";
/// Overrides the cache key prefix
pub const REDIS_CACHE_KEY_ENV: &str = "REDIS_CACHE_KEY";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

/// Cache storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Storage backend
    #[serde(default)]
    pub backend: CacheBackendKind,

    /// Cache file path (file backend)
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,

    /// Key prefix; entries are stored under `<prefix>:<vendor>`
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Connection settings (Redis backend)
    #[serde(default)]
    pub redis: RedisConfig,
}

/// Cache backend kind
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    #[default]
    File,
    Memory,
    /// Redis server, falling back to the cache file when unreachable
    Redis,
}

/// Redis connection settings
///
/// `url` wins over `host`/`port`. Credentials apply only to `host`.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default = "default_redis_port")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Connect timeout in seconds
    #[serde(default = "default_redis_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_redis_port() -> u16 {
    6379
}
fn default_redis_timeout_secs() -> u64 {
    5
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: None,
            port: default_redis_port(),
            username: None,
            password: None,
            timeout_secs: default_redis_timeout_secs(),
        }
    }
}

fn default_cache_path() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_FILE)
}
fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackendKind::File,
            path: default_cache_path(),
            key_prefix: default_key_prefix(),
            redis: RedisConfig::default(),
        }
    }
}

/// HTTP fetch configuration shared by all sources
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per fetch before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// User-Agent header sent to vendors
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    10
}
fn default_max_attempts() -> u32 {
    3
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/128.0 Safari/537.36"
        .to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            user_agent: default_user_agent(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Serve Prometheus metrics on this port when set
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
            metrics_port: None,
        }
    }
}

/// A JSON-over-HTTP price source
///
/// `items` points at an array in the response; the first element whose
/// fields equal every entry of `filter` is selected. Without `items` the
/// whole document is the item. `buy` and `sell` are JSON pointers into the
/// item, and extracted prices are multiplied by `scale`.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub vendor: Vendor,
    pub url: String,
    #[serde(default)]
    pub items: Option<String>,
    #[serde(default)]
    pub filter: BTreeMap<String, String>,
    pub buy: String,
    pub sell: String,
    #[serde(default = "default_scale")]
    pub scale: Decimal,
}

fn default_scale() -> Decimal {
    Decimal::ONE
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply environment overrides
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides looked up through `var`; empty values are ignored
    pub fn with_overrides_from(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| var(name).filter(|v| !v.is_empty());

        if let Some(path) = var(CACHE_FILE_ENV) {
            self.cache.path = PathBuf::from(path);
        }
        if let Some(prefix) = var(REDIS_CACHE_KEY_ENV) {
            self.cache.key_prefix = prefix;
        }

        let redis = &mut self.cache.redis;
        if let Some(url) = var(REDIS_URL_ENV) {
            redis.url = Some(url);
        }
        if let Some(host) = var(REDIS_HOST_ENV) {
            redis.host = Some(host);
        }
        if let Some(port) = var(REDIS_PORT_ENV) {
            match port.parse() {
                Ok(port) => redis.port = port,
                Err(_) => tracing::warn!(port = %port, "Ignoring invalid {}", REDIS_PORT_ENV),
            }
        }
        if let Some(username) = var(REDIS_USERNAME_ENV) {
            redis.username = Some(username);
        }
        if let Some(password) = var(REDIS_PASSWORD_ENV) {
            redis.password = Some(password);
        }

        if var(REDIS_URL_ENV).is_some() || var(REDIS_HOST_ENV).is_some() {
            self.cache.backend = CacheBackendKind::Redis;
        }
        self
    }
}
