//! Command implementations.

mod publish;
mod run;
mod settings;

pub use publish::run_publish;
pub use run::run_consumer;
pub use settings::run_settings;
