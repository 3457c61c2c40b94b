//! One-shot actor lifecycle: read an input record, do the work, push a dataset batch.
//!
//! [`Actor::run`] wraps the work in a scope that always logs teardown and maps
//! the outcome onto a process exit code, whether the body succeeds, fails, or
//! is interrupted.
use std::future::Future;

use postsweep_common::{Result, SweepError};
use postsweep_config::{StorageMode, StorageSettings};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

pub mod storage;

use storage::{DatasetSink, KeyValueStore, LocalDataset, LocalKeyValueStore, PlatformStorage};

/// Exit code for a run that was interrupted (128 + SIGINT).
pub const EXIT_CANCELLED: i32 = 130;

/// Handles a run needs from its environment.
pub struct ActorContext {
    store: Box<dyn KeyValueStore>,
    dataset: Box<dyn DatasetSink>,
    input_key: String,
    cancel: CancellationToken,
}

impl ActorContext {
    pub fn new(
        store: impl KeyValueStore + 'static,
        dataset: impl DatasetSink + 'static,
        input_key: impl Into<String>,
    ) -> Self {
        Self {
            store: Box::new(store),
            dataset: Box::new(dataset),
            input_key: input_key.into(),
            cancel: CancellationToken::new(),
        }
    }

    /// Build the context described by the storage settings.
    pub fn from_settings(settings: &StorageSettings) -> Result<Self> {
        match settings.mode {
            StorageMode::Local => {
                tracing::debug!(dir = %settings.dir.display(), "using local storage");
                Ok(Self::new(
                    LocalKeyValueStore::new(&settings.dir),
                    LocalDataset::new(&settings.dir),
                    &settings.input_key,
                ))
            }
            StorageMode::Platform => {
                let require = |field: &Option<String>, name: &str| {
                    field
                        .clone()
                        .filter(|v| !v.trim().is_empty())
                        .ok_or_else(|| {
                            SweepError::Config(format!("storage.{name} is required in platform mode"))
                        })
                };
                let token = require(&settings.token, "token")?;
                let kv_id = require(&settings.key_value_store_id, "key_value_store_id")?;
                let dataset_id = require(&settings.dataset_id, "dataset_id")?;

                tracing::debug!(
                    api = %settings.api_base_url,
                    key_value_store_id = %kv_id,
                    dataset_id = %dataset_id,
                    "using platform storage"
                );
                let platform =
                    PlatformStorage::new(&settings.api_base_url, token, kv_id, dataset_id)?;
                Ok(Self::new(platform.clone(), platform, &settings.input_key))
            }
        }
    }

    /// Load the input record. A missing or `null` record yields `T::default()`.
    pub async fn get_input<T>(&self) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.store.get_record(&self.input_key).await? {
            None | Some(Value::Null) => {
                tracing::info!(key = %self.input_key, "no input record, using defaults");
                Ok(T::default())
            }
            Some(v) => serde_json::from_value(v).map_err(|e| {
                SweepError::Input(format!("input record `{}`: {e}", self.input_key))
            }),
        }
    }

    /// Push a whole batch to the dataset. Every item is encoded before the sink is called.
    pub async fn push_data<T: Serialize>(&self, items: &[T]) -> Result<()> {
        let values = items
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| SweepError::Storage(format!("failed to encode item: {e}")))?;
        let count = values.len();
        self.dataset.push_items(values).await?;
        tracing::info!(count, "pushed items to dataset");
        Ok(())
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

/// Scoped run of one actor body.
pub struct Actor {
    ctx: Result<ActorContext>,
    handle_signals: bool,
}

impl Actor {
    pub fn new(ctx: ActorContext) -> Self {
        Self {
            ctx: Ok(ctx),
            handle_signals: true,
        }
    }

    /// Build the context from storage settings.
    ///
    /// A bad setting is reported by [`Actor::run`] as a failed run, after
    /// "Initializing actor" and before "Exiting actor".
    pub fn from_settings(settings: &StorageSettings) -> Self {
        Self {
            ctx: ActorContext::from_settings(settings),
            handle_signals: true,
        }
    }

    /// Whether Ctrl-C should cancel the run (on by default).
    pub fn handle_signals(mut self, on: bool) -> Self {
        self.handle_signals = on;
        self
    }

    /// Run `body` to completion, cancellation, or failure.
    ///
    /// Teardown is logged on every path, including a panic inside `body`.
    ///
    /// ```
    /// use postsweep_actor::{Actor, ActorContext, exit_code};
    /// use postsweep_actor::storage::{MemoryDataset, MemoryKeyValueStore};
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let ctx = ActorContext::new(MemoryKeyValueStore::new(), MemoryDataset::new(), "INPUT");
    /// let result = Actor::new(ctx)
    ///     .handle_signals(false)
    ///     .run(|_ctx| async { Ok(7) })
    ///     .await;
    /// assert_eq!(exit_code(&result), 0);
    /// assert_eq!(result.unwrap(), 7);
    /// # });
    /// ```
    pub async fn run<F, Fut, T>(self, body: F) -> Result<T>
    where
        F: FnOnce(ActorContext) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let Actor {
            ctx,
            handle_signals,
        } = self;
        let _teardown = Teardown;

        tracing::info!("Initializing actor");

        let result = match ctx {
            Ok(ctx) => {
                let cancel = ctx.cancellation();
                tokio::select! {
                    res = body(ctx) => res,
                    _ = cancel.cancelled() => Err(SweepError::Cancelled),
                    _ = interrupted(handle_signals) => {
                        cancel.cancel();
                        Err(SweepError::Cancelled)
                    }
                }
            }
            Err(e) => Err(e),
        };

        match &result {
            Ok(_) => tracing::info!("Actor finished successfully"),
            Err(SweepError::Cancelled) => tracing::warn!("Actor run was cancelled"),
            Err(e) => tracing::error!(error = %e, "Actor failed"),
        }
        tracing::info!(exit_code = exit_code(&result), "Exiting actor");
        result
    }
}

/// Map a run outcome onto a process exit code.
pub fn exit_code<T>(result: &Result<T>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(SweepError::Cancelled) => EXIT_CANCELLED,
        Err(_) => 1,
    }
}

async fn interrupted(enabled: bool) {
    if enabled && tokio::signal::ctrl_c().await.is_ok() {
        tracing::warn!("interrupt received");
        return;
    }
    std::future::pending::<()>().await
}

struct Teardown;

impl Drop for Teardown {
    fn drop(&mut self) {
        if std::thread::panicking() {
            tracing::error!("Actor panicked, tearing down");
        }
        tracing::debug!("actor scope closed");
    }
}
