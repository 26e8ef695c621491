use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use shared::{original_namespace, OriginalSnapshot, ORIGINAL_MARKER};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::metrics;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("session value '{key}' could not be decoded: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("session value '{key}' could not be encoded: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Sessions untouched for this long are dropped.
    pub idle_timeout: Duration,
    pub max_capacity: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(30 * 60),
            max_capacity: 10_000,
        }
    }
}

/// Per-user key-value storage.
///
/// Keys are namespaces such as `person` (saved values) or `personOriginal`
/// (the snapshot taken when the form was displayed).
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session_id: &str, key: &str) -> Result<Option<Value>, SessionError>;

    async fn set(&self, session_id: &str, key: &str, value: Value) -> Result<(), SessionError>;

    /// Returns whether the key existed.
    async fn delete(&self, session_id: &str, key: &str) -> Result<bool, SessionError>;

    async fn keys(&self, session_id: &str) -> Result<Vec<String>, SessionError>;
}

type SessionData = Arc<RwLock<BTreeMap<String, Value>>>;

/// In-memory sessions on a Moka cache with time-to-idle eviction.
pub struct MemorySessionStore {
    sessions: MokaCache<String, SessionData>,
}

impl MemorySessionStore {
    pub fn new(config: &SessionConfig) -> Self {
        tracing::info!(
            "Session store configured: idle_timeout={:?}, capacity={}",
            config.idle_timeout,
            config.max_capacity
        );
        Self {
            sessions: MokaCache::builder()
                .max_capacity(config.max_capacity)
                .time_to_idle(config.idle_timeout)
                .build(),
        }
    }

    async fn session(&self, session_id: &str) -> SessionData {
        self.sessions
            .get_with(session_id.to_string(), async { Arc::new(RwLock::new(BTreeMap::new())) })
            .await
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, session_id: &str, key: &str) -> Result<Option<Value>, SessionError> {
        metrics::SESSION_OPERATIONS.with_label_values(&["get"]).inc();
        match self.sessions.get(session_id).await {
            Some(data) => Ok(data.read().await.get(key).cloned()),
            None => Ok(None),
        }
    }

    async fn set(&self, session_id: &str, key: &str, value: Value) -> Result<(), SessionError> {
        metrics::SESSION_OPERATIONS.with_label_values(&["set"]).inc();
        let data = self.session(session_id).await;
        data.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, session_id: &str, key: &str) -> Result<bool, SessionError> {
        metrics::SESSION_OPERATIONS.with_label_values(&["delete"]).inc();
        match self.sessions.get(session_id).await {
            Some(data) => Ok(data.write().await.remove(key).is_some()),
            None => Ok(false),
        }
    }

    async fn keys(&self, session_id: &str) -> Result<Vec<String>, SessionError> {
        match self.sessions.get(session_id).await {
            Some(data) => Ok(data.read().await.keys().cloned().collect()),
            None => Ok(vec![]),
        }
    }
}

/// Read and decode a typed value.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn SessionStore,
    session_id: &str,
    key: &str,
) -> Result<Option<T>, SessionError> {
    match store.get(session_id, key).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| SessionError::Decode {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Encode and store a typed value.
pub async fn set_json<T: Serialize>(
    store: &dyn SessionStore,
    session_id: &str,
    key: &str,
    value: &T,
) -> Result<(), SessionError> {
    let value = serde_json::to_value(value).map_err(|source| SessionError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(session_id, key, value).await
}

/// Delete every key containing `needle`. Returns how many were removed.
pub async fn clear_matching(
    store: &dyn SessionStore,
    session_id: &str,
    needle: &str,
) -> Result<usize, SessionError> {
    let mut removed = 0;
    for key in store.keys(session_id).await? {
        if key.contains(needle) && store.delete(session_id, &key).await? {
            removed += 1;
        }
    }
    Ok(removed)
}

pub async fn load_snapshot(
    store: &dyn SessionStore,
    session_id: &str,
    entity: &str,
) -> Result<Option<OriginalSnapshot>, SessionError> {
    get_json(store, session_id, &original_namespace(entity)).await
}

pub async fn save_snapshot(
    store: &dyn SessionStore,
    session_id: &str,
    entity: &str,
    snapshot: &OriginalSnapshot,
) -> Result<(), SessionError> {
    set_json(store, session_id, &original_namespace(entity), snapshot).await
}

/// Drop every original snapshot held by the session.
pub async fn clear_snapshots(store: &dyn SessionStore, session_id: &str) -> Result<usize, SessionError> {
    let removed = clear_matching(store, session_id, ORIGINAL_MARKER).await?;
    tracing::debug!(session_id, removed, "original snapshots cleared");
    Ok(removed)
}
