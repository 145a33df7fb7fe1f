//! RedisSource - placeholder Redis-backed queue source
//!
//! No connection is opened: every send is accepted and nothing is ever due.
//! Connection parameters are validated so misconfiguration surfaces at
//! construction time.

use async_trait::async_trait;
use contracts::{CancellationToken, ContractError, Item, QueueSource, RedisSettings};
use tracing::{debug, info};

/// Registry key of the Redis source
pub const REDIS_SOURCE_TYPE: &str = "redis";

/// Placeholder source standing in for a Redis sorted-set queue
#[derive(Debug, Clone)]
pub struct RedisSource {
    name: String,
    address: String,
    database: i64,
}

impl RedisSource {
    /// Create a source from connection parameters
    ///
    /// # Errors
    /// Fails on an empty host or a port that is not a valid TCP port.
    pub fn new(settings: &RedisSettings) -> Result<Self, ContractError> {
        if settings.host.is_empty() {
            return Err(ContractError::source_connection(
                REDIS_SOURCE_TYPE,
                "host must not be empty",
            ));
        }
        settings.port.parse::<u16>().map_err(|e| {
            ContractError::source_connection(
                REDIS_SOURCE_TYPE,
                format!("invalid port {:?}: {e}", settings.port),
            )
        })?;

        let source = Self {
            name: REDIS_SOURCE_TYPE.to_string(),
            address: settings.address(),
            database: settings.database,
        };

        info!(
            address = %source.address,
            database = source.database,
            auth = !settings.password.is_empty(),
            "RedisSource configured"
        );
        Ok(source)
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn database(&self) -> i64 {
        self.database
    }
}

#[async_trait]
impl QueueSource for RedisSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(
        &self,
        _cancel: &CancellationToken,
        item: Item,
        due_at: i64,
    ) -> Result<(), ContractError> {
        debug!(address = %self.address, due_at, len = item.len(), "Item accepted");
        Ok(())
    }

    async fn receive(&self, _cancel: &CancellationToken) -> Result<Option<Item>, ContractError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_with_defaults() {
        let source = RedisSource::new(&RedisSettings::default()).unwrap();
        assert_eq!(source.name(), "redis");
        assert_eq!(source.address(), "localhost:6379");
        assert_eq!(source.database(), 0);
    }

    #[test]
    fn test_invalid_port() {
        let settings = RedisSettings {
            port: "sixty".to_string(),
            ..RedisSettings::default()
        };
        let err = RedisSource::new(&settings).unwrap_err();
        assert!(matches!(err, ContractError::SourceConnection { .. }));
    }

    #[test]
    fn test_empty_host() {
        let settings = RedisSettings {
            host: String::new(),
            ..RedisSettings::default()
        };
        assert!(RedisSource::new(&settings).is_err());
    }

    #[tokio::test]
    async fn test_send_accepts_and_receive_is_empty() {
        let source = RedisSource::new(&RedisSettings::default()).unwrap();
        let cancel = CancellationToken::new();
        source
            .send(&cancel, Item::from("foo-item"), 1_700_000_000)
            .await
            .unwrap();
        assert_eq!(source.receive(&cancel).await.unwrap(), None);
    }
}
