//! Durable key-value storage for the session token.
//!
//! The controller writes one entry, `token`, on each successful login and
//! never reads or clears it. Backends:
//! - `FileTokenStore`: JSON object on disk, the local-storage analogue
//! - `KeyringTokenStore`: OS keychain via keyring
//! - `MemoryTokenStore`: process-local, for tests and throwaway hosts

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use keyring::Entry;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::config::{Config, TokenBackend};

/// Key the access token is stored under
pub const TOKEN_KEY: &str = "token";

/// Storage file name in the data directory
const STORAGE_FILE: &str = "storage.json";

/// Keychain service name
const SERVICE_NAME: &str = "authforms";

pub trait TokenStore: Send + Sync {
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn get_item(&self, key: &str) -> Result<Option<String>>;
}

/// Open the backend selected by the config
pub fn open(config: &Config) -> Result<Arc<dyn TokenStore>> {
    match config.token_store {
        TokenBackend::File => Ok(Arc::new(FileTokenStore::new(config.data_dir()?))),
        TokenBackend::Keyring => Ok(Arc::new(KeyringTokenStore)),
    }
}

// ============================================================================
// File
// ============================================================================

pub struct FileTokenStore {
    dir: PathBuf,
    /// Serializes read-modify-write of the file within this process
    write_lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            write_lock: Mutex::new(()),
        }
    }

    fn storage_path(&self) -> PathBuf {
        self.dir.join(STORAGE_FILE)
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        let path = self.storage_path();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read storage file")?;
        serde_json::from_str(&contents).context("Failed to parse storage file")
    }

    /// Current items for a write. An unreadable file is replaced, not fatal.
    fn load_for_write(&self) -> BTreeMap<String, String> {
        match self.load() {
            Ok(items) => items,
            Err(e) => {
                warn!(path = %self.storage_path().display(), error = %format!("{:#}", e), "Discarding unreadable storage file");
                BTreeMap::new()
            }
        }
    }

    /// Write through a temp file in the same directory so readers never see
    /// a partial file
    fn write_atomic(&self, items: &BTreeMap<String, String>) -> Result<()> {
        std::fs::create_dir_all(&self.dir).context("Failed to create storage directory")?;
        let contents = serde_json::to_string_pretty(items)?;

        let mut tmp = NamedTempFile::new_in(&self.dir).context("Failed to create temp storage file")?;
        tmp.write_all(contents.as_bytes())
            .context("Failed to write storage file")?;
        tmp.as_file().sync_all().context("Failed to flush storage file")?;
        tmp.persist(self.storage_path())
            .map_err(|e| e.error)
            .context("Failed to replace storage file")?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut items = self.load_for_write();
        items.insert(key.to_string(), value.to_string());
        self.write_atomic(&items)?;
        debug!(key, path = %self.storage_path().display(), "Stored item");
        Ok(())
    }

    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }
}

// ============================================================================
// Keyring
// ============================================================================

pub struct KeyringTokenStore;

impl TokenStore for KeyringTokenStore {
    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, key).context("Failed to create keyring entry")?;
        entry
            .set_password(value)
            .context("Failed to store token in keychain")?;
        Ok(())
    }

    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let entry = Entry::new(SERVICE_NAME, key).context("Failed to create keyring entry")?;
        match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve token from keychain"),
        }
    }
}

// ============================================================================
// Memory
// ============================================================================

#[derive(Default)]
pub struct MemoryTokenStore {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }
}
