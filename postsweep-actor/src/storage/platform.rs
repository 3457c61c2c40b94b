//! Storage reached through the hosting platform's REST API (v2).
use async_trait::async_trait;
use postsweep_common::{Result, SweepError};
use postsweep_http::{Auth, HttpClient, HttpError, RequestOpts};
use serde_json::Value;

use super::{DatasetSink, KeyValueStore};

#[derive(Clone)]
pub struct PlatformStorage {
    http: HttpClient,
    token: String,
    key_value_store_id: String,
    dataset_id: String,
}

impl PlatformStorage {
    pub fn new(
        api_base_url: &str,
        token: impl Into<String>,
        key_value_store_id: impl Into<String>,
        dataset_id: impl Into<String>,
    ) -> Result<Self> {
        let http = HttpClient::new(api_base_url)
            .map_err(|e| SweepError::Config(format!("platform api url: {e}")))?;
        Ok(Self {
            http,
            token: token.into(),
            key_value_store_id: key_value_store_id.into(),
            dataset_id: dataset_id.into(),
        })
    }

    fn opts(&self) -> RequestOpts<'_> {
        RequestOpts {
            auth: Some(Auth::Bearer(&self.token)),
            ..Default::default()
        }
    }
}

#[async_trait]
impl KeyValueStore for PlatformStorage {
    async fn get_record(&self, key: &str) -> Result<Option<Value>> {
        let path = format!(
            "v2/key-value-stores/{}/records/{}",
            self.key_value_store_id, key
        );
        match self.http.get_json::<Value>(&path, self.opts()).await {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.status().is_some_and(|s| s.as_u16() == 404) => Ok(None),
            Err(HttpError::Decode(msg, _)) => Err(SweepError::Input(format!(
                "record `{key}` is not valid JSON: {msg}"
            ))),
            Err(e) => Err(SweepError::Storage(format!("failed to read `{key}`: {e}"))),
        }
    }
}

#[async_trait]
impl DatasetSink for PlatformStorage {
    async fn push_items(&self, items: Vec<Value>) -> Result<()> {
        if items.is_empty() {
            tracing::debug!(dataset_id = %self.dataset_id, "empty batch, nothing sent");
            return Ok(());
        }
        let path = format!("v2/datasets/{}/items", self.dataset_id);
        self.http
            .post_json_no_content(&path, &items, self.opts())
            .await
            .map_err(|e| SweepError::Storage(format!("failed to push dataset items: {e}")))
    }
}
