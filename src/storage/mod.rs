//! External collaborators: remote data store, local cache and notifier
//!
//! The realtime backend, the device key-value store and the notification
//! service are all out of scope; the core consumes them through the
//! narrow traits here. [`MemoryStore`] is the in-process implementation
//! used by tests and single-node deployments.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Change notification delivered to store subscribers
#[derive(Debug, Clone)]
pub enum StoreChange {
    Written { key: String, value: Value },
    Deleted { key: String },
}

/// Remote data store abstraction: read, write, partial update, delete
/// and change subscription, keyed by namespaced string keys.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<Value>>;
    async fn write(&self, key: &str, value: Value) -> Result<()>;
    /// Merge `partial` into the stored object; object-valued keys only
    async fn update(&self, key: &str, partial: Value) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
    /// Subscribe to changes under a key. The receiver lags harmlessly if
    /// the consumer falls behind.
    fn subscribe(&self, key: &str) -> broadcast::Receiver<StoreChange>;
}

/// In-memory remote store with per-key change fan-out
pub struct MemoryStore {
    records: DashMap<String, Value>,
    watchers: DashMap<String, broadcast::Sender<StoreChange>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            watchers: DashMap::new(),
        }
    }

    fn notify(&self, key: &str, change: StoreChange) {
        if let Some(sender) = self.watchers.get(key) {
            // Send fails only when nobody is subscribed
            let _ = sender.send(change);
        }
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn read(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.records.get(key).map(|v| v.clone()))
    }

    async fn write(&self, key: &str, value: Value) -> Result<()> {
        self.records.insert(key.to_string(), value.clone());
        self.notify(
            key,
            StoreChange::Written {
                key: key.to_string(),
                value,
            },
        );
        Ok(())
    }

    async fn update(&self, key: &str, partial: Value) -> Result<()> {
        let mut entry = self
            .records
            .get_mut(key)
            .ok_or_else(|| Error::Storage(format!("update on missing key: {}", key)))?;
        let (Some(base), Some(patch)) = (entry.as_object_mut(), partial.as_object()) else {
            return Err(Error::Storage(format!(
                "update requires object values at key: {}",
                key
            )));
        };
        for (k, v) in patch {
            base.insert(k.clone(), v.clone());
        }
        let merged = entry.clone();
        drop(entry);
        self.notify(
            key,
            StoreChange::Written {
                key: key.to_string(),
                value: merged,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.records.remove(key);
        self.notify(key, StoreChange::Deleted { key: key.to_string() });
        Ok(())
    }

    fn subscribe(&self, key: &str) -> broadcast::Receiver<StoreChange> {
        self.watchers
            .entry(key.to_string())
            .or_insert_with(|| broadcast::channel(64).0)
            .subscribe()
    }
}

/// String-keyed, string-valued local cache; the durability fallback when
/// the remote store is unreachable. Export/import round-trips exactly.
pub struct LocalCache {
    entries: RwLock<HashMap<String, String>>,
}

impl Default for LocalCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    pub fn set_item(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.write().insert(key.into(), value.into());
    }

    pub fn remove_item(&self, key: &str) {
        self.entries.write().remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Serialize the full data set to JSON
    pub fn export(&self) -> Result<String> {
        let entries = self.entries.read();
        Ok(serde_json::to_string(&*entries)?)
    }

    /// Replace the data set with a previously exported snapshot
    pub fn import(&self, snapshot: &str) -> Result<()> {
        let parsed: HashMap<String, String> = serde_json::from_str(snapshot)?;
        *self.entries.write() = parsed;
        Ok(())
    }
}

/// Fire-and-forget notification delivery. Failures are logged and never
/// propagated into game logic.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_local(&self, title: &str, body: &str);
    async fn schedule(&self, title: &str, body: &str, delay_secs: u64) -> u64;
    async fn cancel(&self, id: u64);
}

/// Notifier that routes everything through tracing; the default for
/// tests and headless deployments.
pub struct LogNotifier {
    next_id: AtomicU64,
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LogNotifier {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_local(&self, title: &str, body: &str) {
        debug!(title, body, "notification sent");
    }

    async fn schedule(&self, title: &str, _body: &str, delay_secs: u64) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(title, delay_secs, id, "notification scheduled");
        id
    }

    async fn cancel(&self, id: u64) {
        warn!(id, "notification cancelled");
    }
}
