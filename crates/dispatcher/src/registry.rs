//! SourceRegistry - maps a source type selector to its constructor

use std::collections::HashMap;
use std::sync::Arc;

use contracts::{ContractError, QueueSource, Settings};
use tracing::{info, instrument};

use crate::error::DispatcherError;
use crate::sources::{RedisSource, REDIS_SOURCE_TYPE};

/// Builds a queue source from resolved settings
pub type SourceConstructor =
    Box<dyn Fn(&Settings) -> Result<Arc<dyn QueueSource>, ContractError> + Send + Sync>;

/// Registry of queue source constructors keyed by source type
///
/// Adding a variant is a `register` call; construction never branches on names.
pub struct SourceRegistry {
    constructors: HashMap<String, SourceConstructor>,
}

impl SourceRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Registry with the built-in sources
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(REDIS_SOURCE_TYPE, |settings| {
            let source = RedisSource::new(&settings.redis)?;
            Ok(Arc::new(source) as Arc<dyn QueueSource>)
        });
        registry
    }

    /// Register (or replace) a constructor
    pub fn register<F>(&mut self, source_type: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn(&Settings) -> Result<Arc<dyn QueueSource>, ContractError> + Send + Sync + 'static,
    {
        self.constructors
            .insert(source_type.into(), Box::new(constructor));
        self
    }

    pub fn contains(&self, source_type: &str) -> bool {
        self.constructors.contains_key(source_type)
    }

    /// Registered source types, sorted
    pub fn source_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Construct the source selected by `settings.source_type`
    ///
    /// # Errors
    /// - `UnsupportedSource` if nothing is registered under the selector
    /// - `SourceInit` if the constructor fails
    #[instrument(
        name = "registry_create_source",
        skip(self, settings),
        fields(source_type = %settings.source_type)
    )]
    pub fn create(&self, settings: &Settings) -> Result<Arc<dyn QueueSource>, DispatcherError> {
        let constructor = self.constructors.get(&settings.source_type).ok_or_else(|| {
            DispatcherError::UnsupportedSource {
                source_type: settings.source_type.clone(),
            }
        })?;

        let source = constructor(settings)
            .map_err(|e| DispatcherError::source_init(&settings.source_type, e))?;

        info!(source = source.name(), "Queue source created");
        Ok(source)
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use contracts::{CancellationToken, Item};

    struct NullSource;

    #[async_trait]
    impl QueueSource for NullSource {
        fn name(&self) -> &str {
            "null"
        }

        async fn send(
            &self,
            _cancel: &CancellationToken,
            _item: Item,
            _due_at: i64,
        ) -> Result<(), ContractError> {
            Ok(())
        }

        async fn receive(
            &self,
            _cancel: &CancellationToken,
        ) -> Result<Option<Item>, ContractError> {
            Ok(None)
        }
    }

    fn settings_for(source_type: &str) -> Settings {
        Settings {
            source_type: source_type.to_string(),
            ..Settings::default()
        }
    }

    #[test]
    fn test_defaults_contain_redis() {
        let registry = SourceRegistry::with_defaults();
        assert!(registry.contains("redis"));
        assert_eq!(registry.source_types(), vec!["redis"]);

        let source = registry.create(&Settings::default()).unwrap();
        assert_eq!(source.name(), "redis");
    }

    #[test]
    fn test_unknown_source_type() {
        let registry = SourceRegistry::with_defaults();
        let err = registry.create(&settings_for("foo")).err().unwrap();
        assert!(matches!(
            err,
            DispatcherError::UnsupportedSource { ref source_type } if source_type == "foo"
        ));
    }

    #[test]
    fn test_constructor_failure_is_source_init() {
        let mut registry = SourceRegistry::new();
        registry.register("broken", |_| {
            Err(ContractError::source_connection("broken", "refused"))
        });

        let err = registry.create(&settings_for("broken")).err().unwrap();
        assert!(matches!(err, DispatcherError::SourceInit { .. }));
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn test_register_custom_source() {
        let mut registry = SourceRegistry::new();
        registry.register("null", |_| Ok(Arc::new(NullSource) as Arc<dyn QueueSource>));

        let source = registry.create(&settings_for("null")).unwrap();
        assert_eq!(source.name(), "null");
        assert!(!registry.contains("redis"));
    }
}
