//! Input stores and dataset sinks.
//!
//! A run reads one record from a key-value store and writes one batch to a
//! dataset. Both sides come in a local filesystem flavour, a platform REST
//! flavour, and an in-memory flavour for tests.
use async_trait::async_trait;
use postsweep_common::Result;
use serde_json::Value;

pub mod local;
pub mod memory;
pub mod platform;

pub use local::{LocalDataset, LocalKeyValueStore};
pub use memory::{MemoryDataset, MemoryKeyValueStore};
pub use platform::PlatformStorage;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch a record; `Ok(None)` when the key does not exist.
    async fn get_record(&self, key: &str) -> Result<Option<Value>>;
}

#[async_trait]
pub trait DatasetSink: Send + Sync {
    /// Append a whole batch. Called once per run, also with an empty batch.
    async fn push_items(&self, items: Vec<Value>) -> Result<()>;
}
