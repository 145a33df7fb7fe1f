//! Processor - caller-supplied handler for due items

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::Item;

/// Outcome of processing a single item
pub type ProcessResult = anyhow::Result<()>;

/// Processor callback type
///
/// Invoked once per dequeued item. The token is the one passed to
/// `consume`, so long-running handlers can observe shutdown.
/// Uses `Arc` so the dispatcher can be cloned cheaply.
pub type ProcessorFunc =
    Arc<dyn Fn(CancellationToken, Item) -> BoxFuture<'static, ProcessResult> + Send + Sync>;

/// Wrap an async closure into a [`ProcessorFunc`].
///
/// ```
/// use contracts::{processor_fn, Item};
///
/// let processor = processor_fn(|_cancel, item: Item| async move {
///     anyhow::ensure!(!item.is_empty(), "empty item");
///     Ok(())
/// });
/// # let _ = processor;
/// ```
pub fn processor_fn<F, Fut>(f: F) -> ProcessorFunc
where
    F: Fn(CancellationToken, Item) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ProcessResult> + Send + 'static,
{
    Arc::new(move |cancel, item| f(cancel, item).boxed())
}
