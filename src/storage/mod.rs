//! Persisted key-value storage
//!
//! The dashboard keeps a handful of string values between runs: the session
//! token, the user id, the last time the app went to the background, and the
//! per-install device id. They live behind the [`KeyValueStore`] trait so the
//! controller never cares where they are kept.
//!
//! - [`FileStore`]: a JSON object on disk, rewritten atomically on every change
//! - [`MemoryStore`]: process-local map, for tests and embedding

pub mod file_store;

pub use file_store::FileStore;

use crate::error::Result;
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// Key holding the bearer token returned by login
pub const TOKEN_KEY: &str = "token";
/// Key holding the id of the logged-in user
pub const USER_ID_KEY: &str = "user_id";
/// Key holding the RFC 3339 time the app last went to the background
pub const LAST_CLOSE_DATE_KEY: &str = "lastCloseDate";
/// Key holding the generated per-install device id
pub const DEVICE_ID_KEY: &str = "device_id";

/// String key-value store
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key is absent
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Insert or replace a value
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value; removing an absent key is not an error
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with the given pairs
    pub fn with_items<K, V>(items: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            items: Mutex::new(
                items
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items.lock().remove(key);
        Ok(())
    }
}
