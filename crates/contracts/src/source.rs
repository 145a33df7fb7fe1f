//! QueueSource trait - backing store interface
//!
//! The dispatcher only needs two operations from a store: enqueue an item
//! with its due time, and dequeue the next item that is due.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{ContractError, Item};

/// Backing store for time-based items
///
/// Implementations own ordering, durability and delivery semantics.
/// A single instance is shared between concurrent publishers and one
/// consume loop, so it must be `Send + Sync`.
#[async_trait]
pub trait QueueSource: Send + Sync {
    /// Source name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Enqueue `item`, due at `due_at` seconds since the Unix epoch (UTC)
    ///
    /// # Errors
    /// Returns the store's failure (should include context)
    async fn send(
        &self,
        cancel: &CancellationToken,
        item: Item,
        due_at: i64,
    ) -> Result<(), ContractError>;

    /// Dequeue the next due item
    ///
    /// `Ok(None)` means nothing is due yet.
    async fn receive(&self, cancel: &CancellationToken) -> Result<Option<Item>, ContractError>;
}
