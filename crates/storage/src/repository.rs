use async_trait::async_trait;
use quiz_core::model::ScoreEntry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Durable string key-value storage.
///
/// Writes must be visible to the next read through the same store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Score entries read back from storage.
///
/// `skipped` counts stored entries that could not be parsed and were left out
/// of `entries`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedScores {
    pub entries: Vec<ScoreEntry>,
    pub skipped: usize,
}

/// Repository contract for the score history blob.
#[async_trait]
pub trait ScoreRepository: Send + Sync {
    /// Load the stored entries, newest first. A missing blob yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failures or a blob that is not a JSON list.
    async fn load_scores(&self) -> Result<LoadedScores, StorageError>;

    /// Replace the stored entries.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the entries cannot be written.
    async fn save_scores(&self, entries: &[ScoreEntry]) -> Result<(), StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

/// Simple in-memory store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

//
// ─── SCORES OVER KEY-VALUE ─────────────────────────────────────────────────────
//

/// Fixed key the score history is stored under.
pub const SCORES_KEY: &str = "scores";

/// Holds the last score blob that could not be read in full.
pub const SCORES_BACKUP_KEY: &str = "scores.unreadable";

/// Stores the score history as one JSON array under `SCORES_KEY`.
///
/// Entries are parsed one by one; unreadable ones are skipped, and the raw
/// blob is copied to `SCORES_BACKUP_KEY` before a later save can replace it.
#[derive(Clone)]
pub struct KvScoreRepository {
    store: Arc<dyn KeyValueStore>,
}

impl KvScoreRepository {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    async fn keep_unreadable(&self, raw: &str) {
        match self.store.set(SCORES_BACKUP_KEY, raw).await {
            Ok(()) => log::warn!("unreadable score history copied to {SCORES_BACKUP_KEY:?}"),
            Err(err) => log::warn!("could not back up unreadable score history: {err}"),
        }
    }
}

#[async_trait]
impl ScoreRepository for KvScoreRepository {
    async fn load_scores(&self) -> Result<LoadedScores, StorageError> {
        let Some(raw) = self.store.get(SCORES_KEY).await? else {
            return Ok(LoadedScores::default());
        };

        let values: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(err) => {
                self.keep_unreadable(&raw).await;
                return Err(StorageError::Serialization(err.to_string()));
            }
        };

        let mut loaded = LoadedScores::default();
        for (index, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<ScoreEntry>(value) {
                Ok(entry) => loaded.entries.push(entry),
                Err(err) => {
                    log::warn!("skipping stored score entry {index}: {err}");
                    loaded.skipped += 1;
                }
            }
        }
        if loaded.skipped > 0 {
            self.keep_unreadable(&raw).await;
        }
        Ok(loaded)
    }

    async fn save_scores(&self, entries: &[ScoreEntry]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(entries)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.set(SCORES_KEY, &raw).await?;
        log::debug!("saved {} score entries", entries.len());
        Ok(())
    }
}

/// Aggregates the key-value store and the repositories built on it.
#[derive(Clone)]
pub struct Storage {
    pub kv: Arc<dyn KeyValueStore>,
    pub scores: Arc<dyn ScoreRepository>,
}

impl Storage {
    #[must_use]
    pub fn from_store(kv: Arc<dyn KeyValueStore>) -> Self {
        let scores: Arc<dyn ScoreRepository> = Arc::new(KvScoreRepository::new(Arc::clone(&kv)));
        Self { kv, scores }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemoryStore::new()))
    }
}
