//! Bounded, persisted history of past estimator runs.
//!
//! Newest first, at most ten entries, re-serialized in full on every append.
//! The in-memory list is the source of truth for the session; the store is
//! best-effort durability.

use crate::model::HistoryEntry;
use crate::storage::KeyValueStore;
use anyhow::Result;

/// Storage key for the serialized history. Bump the version suffix whenever
/// the entry shape changes.
pub const HISTORY_KEY: &str = "cihub_history_v1";

/// Maximum number of retained runs.
pub const HISTORY_CAPACITY: usize = 10;

pub struct HistoryCache {
    entries: Vec<HistoryEntry>,
    store: Box<dyn KeyValueStore>,
    persist_error: Option<String>,
}

impl HistoryCache {
    /// Open a cache over `store` and load whatever it currently holds.
    pub fn open(store: Box<dyn KeyValueStore>) -> Self {
        let mut cache = Self {
            entries: Vec::new(),
            store,
            persist_error: None,
        };
        cache.load();
        cache
    }

    /// Reload from the store. A missing key, a read error, or a blob that no
    /// longer deserializes all reset the cache to empty; none of them raise.
    pub fn load(&mut self) {
        self.entries = match self.store.get(HISTORY_KEY) {
            Ok(Some(blob)) => serde_json::from_str(&blob).unwrap_or_default(),
            Ok(None) | Err(_) => Vec::new(),
        };
    }

    /// Prepend a completed run, evict anything past capacity, and rewrite the
    /// persisted blob. A failed write is swallowed; the in-memory list stays
    /// authoritative for the rest of the session.
    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_CAPACITY);
        match self.persist() {
            Ok(()) => self.persist_error = None,
            Err(e) => self.persist_error = Some(format!("{e:#}")),
        }
    }

    /// The current runs, newest first. Read-only.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The last swallowed write failure, for an optional info line.
    pub fn persist_error(&self) -> Option<&str> {
        self.persist_error.as_deref()
    }

    fn persist(&self) -> Result<()> {
        let blob = serde_json::to_string(&self.entries)?;
        self.store.set(HISTORY_KEY, &blob)
    }
}
