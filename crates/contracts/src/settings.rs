//! Settings - resolved startup configuration
//!
//! Produced once by the settings resolver and consumed by the composition
//! root to pick and construct a queue source.

use std::fmt;

use serde::{Serialize, Serializer};

/// Default source type selector
pub const DEFAULT_SOURCE_TYPE: &str = "redis";
/// Default store host
pub const DEFAULT_REDIS_HOST: &str = "localhost";
/// Default store port
pub const DEFAULT_REDIS_PORT: &str = "6379";
/// Default store credential (none)
pub const DEFAULT_REDIS_PASSWORD: &str = "";
/// Default logical database index
pub const DEFAULT_REDIS_DATABASE: i64 = 0;

/// Immutable dispatcher settings
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    /// Selects the queue source implementation (registry key)
    pub source_type: String,

    /// Connection parameters for the Redis-backed source
    pub redis: RedisSettings,
}

/// Redis connection parameters
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct RedisSettings {
    pub host: String,
    /// Kept as text; only the source decides how to interpret it
    pub port: String,
    #[serde(serialize_with = "redact")]
    pub password: String,
    pub database: i64,
}

impl RedisSettings {
    /// `host:port` address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_type: DEFAULT_SOURCE_TYPE.to_string(),
            redis: RedisSettings::default(),
        }
    }
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_REDIS_HOST.to_string(),
            port: DEFAULT_REDIS_PORT.to_string(),
            password: DEFAULT_REDIS_PASSWORD.to_string(),
            database: DEFAULT_REDIS_DATABASE,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("source_type", &self.source_type)
            .field("redis", &self.redis)
            .finish()
    }
}

impl fmt::Debug for RedisSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &redacted(&self.password))
            .field("database", &self.database)
            .finish()
    }
}

fn redacted(secret: &str) -> &'static str {
    if secret.is_empty() {
        ""
    } else {
        "***"
    }
}

fn redact<S: Serializer>(secret: &str, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(redacted(secret))
}
