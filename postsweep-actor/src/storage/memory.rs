//! In-memory storage, handy for tests and dry runs.
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use postsweep_common::Result;
use serde_json::Value;
use tokio::sync::Mutex;

use super::{DatasetSink, KeyValueStore};

#[derive(Default, Clone)]
pub struct MemoryKeyValueStore {
    records: HashMap<String, Value>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, key: impl Into<String>, value: Value) -> Self {
        self.records.insert(key.into(), value);
        self
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get_record(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.records.get(key).cloned())
    }
}

/// Records every pushed batch separately, so callers can count pushes.
#[derive(Default, Clone)]
pub struct MemoryDataset {
    batches: Arc<Mutex<Vec<Vec<Value>>>>,
}

impl MemoryDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn batches(&self) -> Vec<Vec<Value>> {
        self.batches.lock().await.clone()
    }
}

#[async_trait]
impl DatasetSink for MemoryDataset {
    async fn push_items(&self, items: Vec<Value>) -> Result<()> {
        self.batches.lock().await.push(items);
        Ok(())
    }
}
