//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约冒烟测试
//! - 注册表 -> Dispatcher -> 队列源 -> 处理器 的完整链路

#[cfg(test)]
mod contract_tests {
    use std::collections::HashMap;

    use config_loader::SettingsResolver;
    use contracts::{processor_fn, CancellationToken, Item, ProcessorFunc, Settings};

    #[test]
    fn test_resolver_defaults_match_contract_defaults() {
        let resolved = SettingsResolver::new()
            .with_source(HashMap::<String, String>::new())
            .resolve()
            .unwrap();
        assert_eq!(resolved, Settings::default());
        assert_eq!(resolved.source_type, "redis");
        assert_eq!(resolved.redis.address(), "localhost:6379");
    }

    #[tokio::test]
    async fn test_processor_receives_item_and_token() {
        let processor: ProcessorFunc = processor_fn(|cancel, item: Item| async move {
            anyhow::ensure!(!cancel.is_cancelled(), "cancelled before processing");
            anyhow::ensure!(item.as_bytes() == b"payload", "unexpected item");
            Ok(())
        });

        let token = CancellationToken::new();
        processor(token.clone(), Item::from("payload")).await.unwrap();

        token.cancel();
        let err = processor(token, Item::from("payload")).await.unwrap_err();
        assert!(err.to_string().contains("cancelled"));
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;
    use config_loader::{ConfigFormat, FileVars, SettingsResolver};
    use contracts::{
        processor_fn, CancellationToken, ContractError, Item, ProcessorFunc, QueueSource,
    };
    use dispatcher::{DispatcherBuilder, DispatcherConfig, DispatcherError, SourceRegistry};

    /// Unordered in-memory store: receive returns any item whose due time has passed
    #[derive(Default)]
    struct MemorySource {
        items: Mutex<Vec<(Item, i64)>>,
        receive_calls: AtomicUsize,
    }

    impl MemorySource {
        fn pending(&self) -> usize {
            self.items.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl QueueSource for MemorySource {
        fn name(&self) -> &str {
            "memory"
        }

        async fn send(
            &self,
            _cancel: &CancellationToken,
            item: Item,
            due_at: i64,
        ) -> Result<(), ContractError> {
            self.items.lock().unwrap().push((item, due_at));
            Ok(())
        }

        async fn receive(
            &self,
            _cancel: &CancellationToken,
        ) -> Result<Option<Item>, ContractError> {
            self.receive_calls.fetch_add(1, Ordering::SeqCst);
            let now = Utc::now().timestamp();
            let mut items = self.items.lock().unwrap();
            let due = items.iter().position(|(_, due_at)| *due_at <= now);
            Ok(due.map(|idx| items.remove(idx).0))
        }
    }

    fn registry_with(source: Arc<MemorySource>) -> SourceRegistry {
        let mut registry = SourceRegistry::with_defaults();
        registry.register("memory", move |_| Ok(source.clone() as Arc<dyn QueueSource>));
        registry
    }

    fn memory_resolver() -> SettingsResolver {
        let file = FileVars::load_from_str(r#"{ "TBQ_SOURCE": "memory" }"#, ConfigFormat::Json)
            .unwrap();
        SettingsResolver::new().with_source(file)
    }

    fn fast_config() -> DispatcherConfig {
        DispatcherConfig {
            poll_interval: Duration::from_millis(10),
            max_attempts: 3,
            retry_backoff: Duration::from_millis(20),
            call_timeout: None,
        }
    }

    /// Processor collecting items, cancelling once `expected` have arrived
    fn collecting_processor(
        seen: Arc<Mutex<Vec<Item>>>,
        cancel: CancellationToken,
        expected: usize,
    ) -> ProcessorFunc {
        processor_fn(move |_cancel, item| {
            let seen = Arc::clone(&seen);
            let cancel = cancel.clone();
            async move {
                let mut seen = seen.lock().unwrap();
                seen.push(item);
                if seen.len() >= expected {
                    cancel.cancel();
                }
                Ok(())
            }
        })
    }

    /// End-to-end: settings file -> registry -> publish -> consume -> processor
    #[tokio::test]
    async fn test_e2e_due_items_are_processed() {
        let source = Arc::new(MemorySource::default());
        let cancel = CancellationToken::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let dispatcher =
            DispatcherBuilder::new(collecting_processor(Arc::clone(&seen), cancel.clone(), 2))
                .resolver(memory_resolver())
                .registry(registry_with(Arc::clone(&source)))
                .config(fast_config())
                .build()
                .unwrap();
        assert_eq!(dispatcher.source_name(), "memory");

        let past = Utc::now() - chrono::Duration::seconds(5);
        let future = Utc::now() + chrono::Duration::hours(1);
        dispatcher
            .publish(&cancel, Item::from("due-1"), past)
            .await
            .unwrap();
        dispatcher
            .publish(&cancel, Item::from("later"), future)
            .await
            .unwrap();
        dispatcher
            .publish(&cancel, Item::from("due-2"), past)
            .await
            .unwrap();

        tokio::time::timeout(Duration::from_secs(5), dispatcher.consume(&cancel))
            .await
            .expect("consumer did not stop")
            .unwrap();

        let seen = seen.lock().unwrap();
        let mut payloads: Vec<&str> = seen.iter().filter_map(Item::as_str).collect();
        payloads.sort_unstable();
        assert_eq!(payloads, vec!["due-1", "due-2"]);
        assert_eq!(source.pending(), 1);
    }

    #[tokio::test]
    async fn test_e2e_concurrent_publishers() {
        let source = Arc::new(MemorySource::default());
        let dispatcher = DispatcherBuilder::new(processor_fn(|_cancel, _item| async { Ok(()) }))
            .resolver(memory_resolver())
            .registry(registry_with(Arc::clone(&source)))
            .build()
            .unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let dispatcher = dispatcher.clone();
            handles.push(tokio::spawn(async move {
                let cancel = CancellationToken::new();
                dispatcher
                    .publish(&cancel, Item::from(format!("item-{i}")), Utc::now())
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(source.pending(), 16);
        assert_eq!(source.receive_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_e2e_processing_failure_is_surfaced() {
        let source = Arc::new(MemorySource::default());
        let attempts = Arc::new(AtomicUsize::new(0));
        let processor = {
            let attempts = Arc::clone(&attempts);
            processor_fn(move |_cancel, _item| {
                let attempts = Arc::clone(&attempts);
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    anyhow::bail!("downstream unavailable")
                }
            })
        };

        let dispatcher = DispatcherBuilder::new(processor)
            .resolver(memory_resolver())
            .registry(registry_with(Arc::clone(&source)))
            .config(fast_config())
            .build()
            .unwrap();

        let cancel = CancellationToken::new();
        let past = Utc::now() - chrono::Duration::seconds(1);
        for i in 0..5 {
            dispatcher
                .publish(&cancel, Item::from(format!("job-{i}")), past)
                .await
                .unwrap();
        }

        let err = dispatcher.consume(&cancel).await.unwrap_err();
        assert!(matches!(err, DispatcherError::ProcessingFailed(_)));
        assert!(err.to_string().contains("downstream unavailable"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        // Each failed item was already dequeued; delivery semantics belong to the store
        assert_eq!(source.pending(), 2);
    }

    #[tokio::test]
    async fn test_e2e_default_redis_source() {
        let vars: HashMap<String, String> =
            HashMap::from([("TBQ_REDIS_HOST".to_string(), "queue.internal".to_string())]);
        let dispatcher = DispatcherBuilder::new(processor_fn(|_cancel, _item| async { Ok(()) }))
            .resolver(SettingsResolver::new().with_source(vars))
            .config(fast_config())
            .build()
            .unwrap();
        assert_eq!(dispatcher.source_name(), "redis");

        let cancel = CancellationToken::new();
        dispatcher
            .publish(&cancel, Item::from("accepted"), Utc::now())
            .await
            .unwrap();

        let canceller = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                cancel.cancel();
            })
        };
        dispatcher.consume(&cancel).await.unwrap();
        canceller.await.unwrap();
    }

    #[test]
    fn test_e2e_unknown_source_type() {
        let file = FileVars::load_from_str("TBQ_SOURCE = \"kafka\"", ConfigFormat::Toml).unwrap();
        let err = DispatcherBuilder::new(processor_fn(|_cancel, _item| async { Ok(()) }))
            .resolver(SettingsResolver::new().with_source(file))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, DispatcherError::UnsupportedSource { .. }));
        assert!(err.to_string().contains("kafka"));
    }
}
