//! 队列指标记录模块
//!
//! 通过 `metrics` facade 记录；未安装 recorder 时为空操作。

use std::time::Duration;

use metrics::{counter, histogram};

fn status(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

/// 记录一次发布
pub fn record_item_published(source: &str, success: bool) {
    counter!(
        "tbq_items_published_total",
        "source" => source.to_string(),
        "status" => status(success)
    )
    .increment(1);
}

/// 记录取到一个到期条目
pub fn record_item_received(source: &str) {
    counter!("tbq_items_received_total", "source" => source.to_string()).increment(1);
}

/// 记录一次处理及其耗时
pub fn record_item_processed(source: &str, success: bool, latency: Duration) {
    counter!(
        "tbq_items_processed_total",
        "source" => source.to_string(),
        "status" => status(success)
    )
    .increment(1);

    histogram!("tbq_processing_latency_ms", "source" => source.to_string())
        .record(latency.as_secs_f64() * 1000.0);
}

/// 记录一次消费循环启动
pub fn record_consume_attempt(source: &str) {
    counter!("tbq_consume_attempts_total", "source" => source.to_string()).increment(1);
}

/// 记录一次消费循环失败
///
/// `kind` 为错误类别 (receive / processing)。
pub fn record_consume_failure(source: &str, kind: &'static str) {
    counter!(
        "tbq_consume_failures_total",
        "source" => source.to_string(),
        "kind" => kind
    )
    .increment(1);
}
