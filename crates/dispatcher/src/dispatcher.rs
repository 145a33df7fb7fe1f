//! Dispatcher - publish path, poll loop and bounded-retry supervision

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use config_loader::SettingsResolver;
use contracts::{CancellationToken, ContractError, Item, ProcessorFunc, QueueSource, Settings};
use observability::metrics;
use tokio::time::{interval_at, sleep, timeout, Instant, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use crate::error::DispatcherError;
use crate::registry::SourceRegistry;

/// Default time between two polls of the source
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
/// Default number of poll loop runs before `consume` gives up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default wait between two poll loop runs
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(1000);

/// Dispatcher timing configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Tick interval of the poll loop
    pub poll_interval: Duration,
    /// Poll loop runs before the last error is surfaced (at least 1)
    pub max_attempts: u32,
    /// Constant wait between a failed run and the next one
    pub retry_backoff: Duration,
    /// Deadline for a single receive or process call (None = unbounded)
    pub call_timeout: Option<Duration>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            call_timeout: None,
        }
    }
}

/// Supervision states of `consume`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConsumeState {
    Idle,
    Polling,
    BackingOff,
    Stopped,
    Failed,
}

/// Normalize an instant to whole UTC seconds since the Unix epoch
///
/// Sub-second parts are floored, so instants before the epoch round
/// towards negative infinity.
pub fn due_timestamp<Tz: TimeZone>(process_at: &DateTime<Tz>) -> i64 {
    process_at.with_timezone(&Utc).timestamp()
}

/// Builder for creating a Dispatcher
pub struct DispatcherBuilder {
    processor: ProcessorFunc,
    settings: Option<Settings>,
    resolver: Option<SettingsResolver>,
    registry: SourceRegistry,
    config: DispatcherConfig,
}

impl DispatcherBuilder {
    /// Create a builder resolving settings from the environment
    /// against the built-in sources
    pub fn new(processor: ProcessorFunc) -> Self {
        Self {
            processor,
            settings: None,
            resolver: None,
            registry: SourceRegistry::with_defaults(),
            config: DispatcherConfig::default(),
        }
    }

    /// Use already-resolved settings
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Resolve settings with a custom resolver
    pub fn resolver(mut self, resolver: SettingsResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn registry(mut self, registry: SourceRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolve settings, construct the selected source and bind the processor
    ///
    /// # Errors
    /// - `Config` when settings cannot be resolved
    /// - `UnsupportedSource` / `SourceInit` from the registry
    #[instrument(name = "dispatcher_builder_build", skip(self))]
    pub fn build(self) -> Result<Dispatcher, DispatcherError> {
        let settings = match self.settings {
            Some(settings) => settings,
            None => self
                .resolver
                .unwrap_or_else(SettingsResolver::from_env)
                .resolve()
                .map_err(DispatcherError::Config)?,
        };

        let source = self.registry.create(&settings)?;

        info!(
            source = source.name(),
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            max_attempts = self.config.max_attempts,
            "Dispatcher created"
        );

        Ok(Dispatcher {
            source,
            processor: self.processor,
            config: self.config,
        })
    }
}

/// Time-based queue dispatcher
///
/// Holds one source and one processor. Cloning is cheap and clones share
/// the same source, so publishers can live on other tasks while one task
/// runs `consume`.
#[derive(Clone)]
pub struct Dispatcher {
    source: Arc<dyn QueueSource>,
    processor: ProcessorFunc,
    config: DispatcherConfig,
}

impl Dispatcher {
    /// Create a dispatcher from environment settings and the built-in sources
    ///
    /// # Errors
    /// See [`DispatcherBuilder::build`].
    pub fn new(processor: ProcessorFunc) -> Result<Self, DispatcherError> {
        DispatcherBuilder::new(processor).build()
    }

    /// Create a dispatcher over an existing source
    pub fn with_source(source: Arc<dyn QueueSource>, processor: ProcessorFunc) -> Self {
        Self {
            source,
            processor,
            config: DispatcherConfig::default(),
        }
    }

    /// Replace the timing configuration
    pub fn with_config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Publish `item` to be processed at `process_at`
    ///
    /// The instant is normalized to UTC seconds before reaching the source.
    /// Publishing is never retried here.
    ///
    /// # Errors
    /// `PublishFailed` on any source failure; the cause is logged only.
    #[instrument(name = "dispatcher_publish", skip_all, fields(source = %self.source.name()))]
    pub async fn publish<Tz: TimeZone>(
        &self,
        cancel: &CancellationToken,
        item: Item,
        process_at: DateTime<Tz>,
    ) -> Result<(), DispatcherError> {
        let due_at = due_timestamp(&process_at);

        match self.source.send(cancel, item, due_at).await {
            Ok(()) => {
                metrics::record_item_published(self.source.name(), true);
                debug!(due_at, "Item published");
                Ok(())
            }
            Err(e) => {
                metrics::record_item_published(self.source.name(), false);
                error!(due_at, error = %e, "Publish failed");
                Err(DispatcherError::PublishFailed)
            }
        }
    }

    /// Run the consumer until cancelled or out of attempts
    ///
    /// Each attempt runs the poll loop; a failed attempt is followed by a
    /// constant backoff. Cancellation (also during backoff) returns `Ok`.
    ///
    /// # Errors
    /// The last attempt's `ReceiveFailed` or `ProcessingFailed`.
    #[instrument(name = "dispatcher_consume", skip_all, fields(source = %self.source.name()))]
    pub async fn consume(&self, cancel: &CancellationToken) -> Result<(), DispatcherError> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut state = ConsumeState::Idle;
        let mut attempt = 0;

        loop {
            attempt += 1;
            state = transition(state, ConsumeState::Polling);
            metrics::record_consume_attempt(self.source.name());

            let err = match self.poll_loop(cancel).await {
                Ok(()) => {
                    transition(state, ConsumeState::Stopped);
                    return Ok(());
                }
                Err(err) => err,
            };
            metrics::record_consume_failure(self.source.name(), err.kind());

            if attempt >= max_attempts {
                error!(attempt, max_attempts, error = %err, "Consume attempts exhausted");
                transition(state, ConsumeState::Failed);
                return Err(err);
            }

            warn!(
                attempt,
                max_attempts,
                backoff_ms = self.config.retry_backoff.as_millis() as u64,
                error = %err,
                "Consume attempt failed, retrying"
            );
            state = transition(state, ConsumeState::BackingOff);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Cancelled during backoff, stopping consumer");
                    transition(state, ConsumeState::Stopped);
                    return Ok(());
                }
                _ = sleep(self.config.retry_backoff) => {}
            }
        }
    }

    /// One run of the poll loop
    ///
    /// The first tick fires one interval after start. A slow tick delays the
    /// following ones instead of bursting.
    async fn poll_loop(&self, cancel: &CancellationToken) -> Result<(), DispatcherError> {
        let period = self.config.poll_interval.max(Duration::from_millis(1));
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    // In-flight work has already been awaited; nothing else to drain.
                    info!("Stopping consumer");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    if let Some(item) = self.receive_next(cancel).await? {
                        self.process(cancel, item).await?;
                    }
                }
            }
        }
    }

    async fn receive_next(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<Item>, DispatcherError> {
        let received = match self.config.call_timeout {
            Some(limit) => timeout(limit, self.source.receive(cancel))
                .await
                .map_err(|_| ContractError::timeout("receive", limit.as_millis() as u64))
                .and_then(|result| result),
            None => self.source.receive(cancel).await,
        };

        let item = received.map_err(DispatcherError::ReceiveFailed)?;
        if let Some(ref item) = item {
            metrics::record_item_received(self.source.name());
            debug!(len = item.len(), "Item received");
        }
        Ok(item)
    }

    async fn process(&self, cancel: &CancellationToken, item: Item) -> Result<(), DispatcherError> {
        let started = Instant::now();
        let processing = (self.processor)(cancel.clone(), item);

        let result = match self.config.call_timeout {
            Some(limit) => timeout(limit, processing).await.unwrap_or_else(|_| {
                Err(ContractError::timeout("process", limit.as_millis() as u64).into())
            }),
            None => processing.await,
        };

        metrics::record_item_processed(self.source.name(), result.is_ok(), started.elapsed());
        result.map_err(DispatcherError::ProcessingFailed)
    }
}

fn transition(from: ConsumeState, to: ConsumeState) -> ConsumeState {
    debug!(?from, ?to, "Consume state transition");
    to
}
