//! Layered error definitions
//!
//! Categorized by source: config / queue source / general

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A configuration value could not be converted to its expected type
    #[error("config value error for '{key}': {message} (got {value:?})")]
    ConfigValue {
        key: String,
        value: String,
        message: String,
    },

    // ===== Queue Source Errors =====
    /// Source connection error
    #[error("source '{source_name}' connection error: {message}")]
    SourceConnection {
        source_name: String,
        message: String,
    },

    /// Source enqueue error
    #[error("source '{source_name}' send error: {message}")]
    SourceSend {
        source_name: String,
        message: String,
    },

    /// Source dequeue error
    #[error("source '{source_name}' receive error: {message}")]
    SourceReceive {
        source_name: String,
        message: String,
    },

    /// A bounded call did not complete in time
    #[error("{operation} timed out after {waited_ms}ms")]
    Timeout { operation: String, waited_ms: u64 },

    // ===== Payload Errors =====
    /// Item payload encode/decode error
    #[error("payload error: {message}")]
    Payload {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration value error
    pub fn config_value(
        key: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ConfigValue {
            key: key.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    /// Create source connection error
    pub fn source_connection(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceConnection {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create source send error
    pub fn source_send(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceSend {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create source receive error
    pub fn source_receive(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceReceive {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create timeout error
    pub fn timeout(operation: impl Into<String>, waited_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            waited_ms,
        }
    }

    /// Whether this error originates from configuration resolution
    pub fn is_config(&self) -> bool {
        matches!(self, Self::ConfigParse { .. } | Self::ConfigValue { .. })
    }
}
