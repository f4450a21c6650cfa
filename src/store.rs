mod backend;
mod config_store;
mod defaults;
mod error;
mod memory;
mod merger;
mod sqlite;

#[cfg(test)]
mod tests;

pub use backend::{ConfigBackend, RecordUpdate};
pub use config_store::ConfigStore;
pub use defaults::{DefaultConfigBuilder, VolumeSeries};
pub use error::{Result, StoreError};
pub use memory::MemoryBackend;
pub use merger::ConfigMerger;
pub use sqlite::SqliteBackend;
