//! # Config Loader
//!
//! Settings resolution for the dispatcher.
//!
//! Responsibilities:
//! - Look up each recognized key across named variable sources
//! - Fall back to documented defaults (with a warning)
//! - Convert typed fields, failing fast on bad values
//!
//! # Example
//!
//! ```no_run
//! use config_loader::SettingsResolver;
//!
//! let settings = SettingsResolver::from_env().resolve().unwrap();
//! println!("source: {}", settings.source_type);
//! ```

mod parser;
mod vars;

pub use contracts::Settings;
pub use parser::ConfigFormat;
pub use vars::{EnvVars, FileVars, VarSource};

use contracts::{
    ContractError, RedisSettings, DEFAULT_REDIS_DATABASE, DEFAULT_REDIS_HOST,
    DEFAULT_REDIS_PASSWORD, DEFAULT_REDIS_PORT, DEFAULT_SOURCE_TYPE,
};
use std::path::Path;
use tracing::{debug, warn};

/// Source type selector key
pub const KEY_SOURCE_TYPE: &str = "TBQ_SOURCE";
/// Store host key
pub const KEY_REDIS_HOST: &str = "TBQ_REDIS_HOST";
/// Store port key
pub const KEY_REDIS_PORT: &str = "TBQ_REDIS_PORT";
/// Store credential key
pub const KEY_REDIS_PASSWORD: &str = "TBQ_REDIS_PWD";
/// Store database index key
pub const KEY_REDIS_DATABASE: &str = "TBQ_REDIS_DB";

/// Resolves [`Settings`] from an ordered list of variable sources.
///
/// The first source holding a key wins; absent keys take their default.
pub struct SettingsResolver {
    sources: Vec<Box<dyn VarSource>>,
}

impl SettingsResolver {
    /// Resolver with no sources: every key takes its default
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Resolver backed by the process environment
    pub fn from_env() -> Self {
        Self::new().with_source(EnvVars)
    }

    /// Resolver backed by the process environment, then a settings file
    ///
    /// # Errors
    /// Fails if the file cannot be read or parsed.
    pub fn from_env_and_file(path: &Path) -> Result<Self, ContractError> {
        let file = FileVars::load_from_path(path)?;
        Ok(Self::from_env().with_source(file))
    }

    /// Append a lower-precedence source
    pub fn with_source(mut self, source: impl VarSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Resolve settings
    ///
    /// # Errors
    /// `ContractError::ConfigValue` when the database index is not an integer.
    /// No partial settings are returned.
    pub fn resolve(&self) -> Result<Settings, ContractError> {
        let source_type = self.lookup_or_default(KEY_SOURCE_TYPE, DEFAULT_SOURCE_TYPE);
        let host = self.lookup_or_default(KEY_REDIS_HOST, DEFAULT_REDIS_HOST);
        let port = self.lookup_or_default(KEY_REDIS_PORT, DEFAULT_REDIS_PORT);
        let password = self.lookup_or_default(KEY_REDIS_PASSWORD, DEFAULT_REDIS_PASSWORD);
        let database =
            self.lookup_or_default(KEY_REDIS_DATABASE, &DEFAULT_REDIS_DATABASE.to_string());
        let database = parse_int(KEY_REDIS_DATABASE, &database)?;

        Ok(Settings {
            source_type,
            redis: RedisSettings {
                host,
                port,
                password,
                database,
            },
        })
    }

    fn lookup_or_default(&self, key: &str, default: &str) -> String {
        for source in &self.sources {
            if let Some(value) = source.lookup(key) {
                debug!(key, source = source.name(), "setting resolved");
                return value;
            }
        }
        warn!(key, default, "setting not found, falling back to default");
        default.to_string()
    }
}

impl Default for SettingsResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve settings from the process environment
pub fn resolve() -> Result<Settings, ContractError> {
    SettingsResolver::from_env().resolve()
}

fn parse_int(key: &str, value: &str) -> Result<i64, ContractError> {
    value
        .parse::<i64>()
        .map_err(|e| ContractError::config_value(key, value, e.to_string()))
}
