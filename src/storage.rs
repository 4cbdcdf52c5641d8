//! Durable key/value persistence.
//!
//! The history cache only ever stores and reloads one string blob per key, so
//! the backend hides behind a minimal trait. Production uses one JSON file
//! per key under the platform data directory; tests use the in-memory fake.

use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

pub trait KeyValueStore {
    /// Fetch the blob stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Durably replace the blob stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// File-backed store: `<dir>/<key>.json`, whole-blob writes.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store under the platform data directory (e.g. `~/.local/share/cihub`).
    pub fn open_default() -> Result<Self> {
        let dir = dirs::data_dir()
            .ok_or_else(|| anyhow!("no platform data directory"))?
            .join("cihub");
        Ok(Self { dir })
    }

    pub fn open_at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.blob_path(key)) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("read blob for {key}")),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create store directory {}", self.dir.display()))?;
        // Write-then-rename: a failed write leaves the previous blob intact.
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp, value).with_context(|| format!("write blob for {key}"))?;
        fs::rename(&tmp, self.blob_path(key)).with_context(|| format!("commit blob for {key}"))?;
        Ok(())
    }
}

/// In-memory fake for unit tests.
#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self.map.lock().map_err(|_| anyhow!("store mutex poisoned"))?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.map.lock().map_err(|_| anyhow!("store mutex poisoned"))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
