//! Dispatcher error types

use contracts::ContractError;
use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Settings could not be resolved
    #[error("failed to load config: {0}")]
    Config(#[source] ContractError),

    /// No source registered under the selector
    #[error("unrecognized source type: {source_type}")]
    UnsupportedSource { source_type: String },

    /// Source constructor failed
    #[error("failed to create source ({source_type}): {source}")]
    SourceInit {
        source_type: String,
        source: ContractError,
    },

    /// Enqueue failed; the cause is logged, not returned
    #[error("failed to publish item")]
    PublishFailed,

    /// Dequeue failed inside the poll loop
    #[error("error while receiving item: {0}")]
    ReceiveFailed(#[source] ContractError),

    /// Processor returned an error
    #[error("error while processing item: {0}")]
    ProcessingFailed(#[source] anyhow::Error),
}

impl DispatcherError {
    /// Create a source construction error
    pub fn source_init(source_type: impl Into<String>, source: ContractError) -> Self {
        Self::SourceInit {
            source_type: source_type.into(),
            source,
        }
    }

    /// Short label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::UnsupportedSource { .. } => "unsupported_source",
            Self::SourceInit { .. } => "source_init",
            Self::PublishFailed => "publish",
            Self::ReceiveFailed(_) => "receive",
            Self::ProcessingFailed(_) => "processing",
        }
    }

    /// Whether the error comes out of the poll loop (and is retried by `consume`)
    pub fn is_operational(&self) -> bool {
        matches!(self, Self::ReceiveFailed(_) | Self::ProcessingFailed(_))
    }
}
