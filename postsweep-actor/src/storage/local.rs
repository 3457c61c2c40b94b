//! Filesystem storage in the local development layout:
//!
//! ```text
//! {root}/key_value_stores/default/{KEY}.json
//! {root}/datasets/default/000000001.json
//! ```
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use postsweep_common::{Result, SweepError};
use serde_json::Value;
use tokio::fs;

use super::{DatasetSink, KeyValueStore};

const DEFAULT_NAME: &str = "default";
const STAGING_EXT: &str = "json.partial";

fn io_err(what: &str, path: &Path, e: std::io::Error) -> SweepError {
    SweepError::Storage(format!("{what} {}: {e}", path.display()))
}

async fn discard(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = fs::remove_file(path).await {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove dataset item");
        }
    }
}

pub struct LocalKeyValueStore {
    dir: PathBuf,
}

impl LocalKeyValueStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            dir: root.as_ref().join("key_value_stores").join(DEFAULT_NAME),
        }
    }

    pub fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl KeyValueStore for LocalKeyValueStore {
    async fn get_record(&self, key: &str) -> Result<Option<Value>> {
        let path = self.record_path(key);
        let raw = match fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no record on disk");
                return Ok(None);
            }
            Err(e) => return Err(io_err("failed to read", &path, e)),
        };

        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|e| SweepError::Input(format!("{} is not valid JSON: {e}", path.display())))
    }
}

pub struct LocalDataset {
    dir: PathBuf,
}

impl LocalDataset {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            dir: root.as_ref().join("datasets").join(DEFAULT_NAME),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn next_index(&self) -> Result<u64> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(1),
            Err(e) => return Err(io_err("failed to list", &self.dir, e)),
        };

        let mut highest = 0u64;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_err("failed to list", &self.dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(n) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<u64>().ok())
            {
                highest = highest.max(n);
            }
        }
        Ok(highest + 1)
    }
}

#[async_trait]
impl DatasetSink for LocalDataset {
    async fn push_items(&self, items: Vec<Value>) -> Result<()> {
        // Render everything before touching the disk.
        let rendered = items
            .iter()
            .map(serde_json::to_vec_pretty)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| SweepError::Storage(format!("failed to encode item: {e}")))?;

        if rendered.is_empty() {
            tracing::debug!(dir = %self.dir.display(), "empty batch, nothing written");
            return Ok(());
        }

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_err("failed to create", &self.dir, e))?;

        let first = self.next_index().await?;
        let finals: Vec<PathBuf> = (0..rendered.len())
            .map(|offset| self.dir.join(format!("{:09}.json", first + offset as u64)))
            .collect();

        // Stage every item, then publish. On failure no item of the batch is left behind.
        let mut staged = Vec::with_capacity(finals.len());
        for (path, bytes) in finals.iter().zip(rendered) {
            let tmp = path.with_extension(STAGING_EXT);
            if let Err(e) = fs::write(&tmp, bytes).await {
                discard(&staged).await;
                return Err(io_err("failed to write", &tmp, e));
            }
            staged.push(tmp);
        }
        for (i, (tmp, path)) in staged.iter().zip(&finals).enumerate() {
            if let Err(e) = fs::rename(tmp, path).await {
                discard(&finals[..i]).await;
                discard(&staged[i..]).await;
                return Err(io_err("failed to publish", path, e));
            }
        }

        tracing::debug!(
            dir = %self.dir.display(),
            first_index = first,
            count = items.len(),
            "dataset items written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_record_is_none() {
        let tmp = TempDir::new().unwrap();
        let store = LocalKeyValueStore::new(tmp.path());
        assert!(store.get_record("INPUT").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_record_is_an_input_error() {
        let tmp = TempDir::new().unwrap();
        let store = LocalKeyValueStore::new(tmp.path());
        let path = store.record_path("INPUT");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();

        let err = store.get_record("INPUT").await.unwrap_err();
        assert!(matches!(err, SweepError::Input(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn numbering_continues_after_existing_items() {
        let tmp = TempDir::new().unwrap();
        let dataset = LocalDataset::new(tmp.path());

        dataset
            .push_items(vec![json!({"id": "1"}), json!({"id": "2"})])
            .await
            .unwrap();
        dataset.push_items(vec![json!({"id": "3"})]).await.unwrap();

        let mut names: Vec<String> = std::fs::read_dir(dataset.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(
            names,
            ["000000001.json", "000000002.json", "000000003.json"]
        );

        let third: Value =
            serde_json::from_slice(&std::fs::read(dataset.dir().join("000000003.json")).unwrap())
                .unwrap();
        assert_eq!(third, json!({"id": "3"}));
    }

    #[tokio::test]
    async fn failed_write_leaves_no_part_of_the_batch() {
        let tmp = TempDir::new().unwrap();
        let dataset = LocalDataset::new(tmp.path());
        // A directory squatting on the second item's staging name makes that write fail.
        std::fs::create_dir_all(dataset.dir().join("000000002.json.partial")).unwrap();

        let err = dataset
            .push_items(vec![json!({"id": "1"}), json!({"id": "2"}), json!({"id": "3"})])
            .await
            .unwrap_err();
        assert!(matches!(err, SweepError::Storage(_)), "got {err:?}");

        let names: Vec<String> = std::fs::read_dir(dataset.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, ["000000002.json.partial"]);
    }

    #[tokio::test]
    async fn empty_batch_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let dataset = LocalDataset::new(tmp.path());
        dataset.push_items(Vec::new()).await.unwrap();
        assert!(!dataset.dir().exists());
    }
}
