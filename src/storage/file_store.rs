//! JSON-file backed key-value store
//!
//! The whole store is one JSON object in `<data dir>/storage.json`. It is read
//! once on open and rewritten after every change via
//! `tempfile::NamedTempFile::persist()`, so a crash never leaves a half-written file.

use crate::error::{AppScoutError, Result, StringError};
use crate::storage::KeyValueStore;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name of the store inside the data directory
pub const STORAGE_FILE_NAME: &str = "storage.json";

/// Key-value store persisted as a JSON object
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store in `dir`, creating the directory if needed
    ///
    /// A missing file is an empty store. A corrupt file is logged and treated as
    /// empty; it is overwritten on the next change.
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(STORAGE_FILE_NAME);

        let items = if path.exists() {
            let json = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<BTreeMap<String, String>>(&json) {
                Ok(items) => items,
                Err(e) => {
                    warn!("Storage file {} is corrupt, starting empty: {}", path.display(), e);
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        debug!("Opened storage at {} ({} keys)", path.display(), items.len());
        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, items: &BTreeMap<String, String>) -> Result<()> {
        let dir = self.path.parent().ok_or_else(|| {
            AppScoutError::Storage(StringError::new("Invalid storage path"))
        })?;

        let json = serde_json::to_string_pretty(items)?;
        let mut temp = tempfile::NamedTempFile::new_in(dir)
            .map_err(|e| AppScoutError::Storage(Box::new(e)))?;
        temp.write_all(json.as_bytes())?;
        temp.persist(&self.path)
            .map_err(|e| AppScoutError::Storage(Box::new(e)))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.lock();
        let mut next = items.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next)?;
        *items = next;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.lock();
        if !items.contains_key(key) {
            return Ok(());
        }
        let mut next = items.clone();
        next.remove(key);
        self.persist(&next)?;
        *items = next;
        Ok(())
    }
}
