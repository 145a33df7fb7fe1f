//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Due timestamps are whole seconds since the Unix epoch (UTC, `i64`)
//! - Normalization from zone-bearing instants happens in the dispatcher, never in a source

mod error;
mod item;
mod processor;
mod settings;
mod source;

pub use error::*;
pub use item::Item;
pub use processor::{processor_fn, ProcessResult, ProcessorFunc};
pub use settings::*;
pub use source::QueueSource;

pub use tokio_util::sync::CancellationToken;
