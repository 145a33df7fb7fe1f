//! # Dispatcher
//!
//! 时间队列分发模块。
//!
//! 负责：
//! - 发布：将处理时间归一化为 UTC 秒并交给队列源
//! - 消费：按固定间隔轮询队列源，每次最多处理一个条目
//! - 有界重试：消费循环失败后以固定退避重启

pub mod dispatcher;
pub mod error;
pub mod registry;
pub mod sources;

pub use contracts::{processor_fn, CancellationToken, Item, ProcessorFunc, QueueSource, Settings};
pub use dispatcher::{
    due_timestamp, Dispatcher, DispatcherBuilder, DispatcherConfig, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_POLL_INTERVAL, DEFAULT_RETRY_BACKOFF,
};
pub use error::DispatcherError;
pub use registry::{SourceConstructor, SourceRegistry};
pub use sources::RedisSource;
