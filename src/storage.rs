//! Persistent key-value storage for the few strings the dashboard keeps
//! between page loads.
//!
//! - `BrowserStore` wraps `window.localStorage` on wasm
//! - `FileStore` keeps one file per key on native platforms
//! - `MemoryStore` is the in-process fallback (and what tests use)

use std::collections::HashMap;

#[cfg(not(target_arch = "wasm32"))]
use std::{fs, path::PathBuf};

/// Stored primary (Gemini) credential.
pub const PRIMARY_KEY_NAME: &str = "apiKey";
/// Stored secondary (Tavily) credential.
pub const SECONDARY_KEY_NAME: &str = "tavilyKey";
/// Last active dashboard screen.
pub const ACTIVE_SCREEN_KEY: &str = "dashboardActiveScreen";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage is not available on this platform")]
    Unavailable,

    #[error("failed to write `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("browser storage rejected `{key}`: {reason}")]
    Rejected { key: String, reason: String },
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// Write or remove `key`, logging failures instead of returning them.
    fn write(&mut self, key: &str, value: Option<&str>) {
        let result = match value {
            Some(value) => self.set(key, value),
            None => self.remove(key),
        };
        if let Err(err) = result {
            tracing::warn!(key, error = %err, "storage write failed");
        }
    }
}

// ============================================
// In-memory store
// ============================================

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

// ============================================
// File-backed store (native platforms)
// ============================================

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    /// Store rooted at `<data_local_dir>/<namespace>`, or `cache/<namespace>`
    /// when the platform has no data directory.
    pub fn new(namespace: &str) -> Self {
        let safe = sanitize_key(namespace);
        let root = match dirs::data_local_dir() {
            Some(data_dir) => data_dir.join(safe),
            None => PathBuf::from("cache").join(safe),
        };
        Self { root }
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.txt", sanitize_key(key)))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            key: key.to_string(),
            source,
        };
        fs::create_dir_all(&self.root).map_err(io_err)?;
        fs::write(self.path_for(key), value).map_err(io_err)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(path).map_err(|source| StorageError::Io {
                key: key.to_string(),
                source,
            })?;
        }
        Ok(())
    }
}

// ============================================
// localStorage (browser)
// ============================================

#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct BrowserStore {
    prefix: String,
}

#[cfg(target_arch = "wasm32")]
impl BrowserStore {
    /// Returns `None` when the page has no usable `localStorage`
    /// (private browsing modes, sandboxed frames).
    pub fn new(namespace: &str) -> Option<Self> {
        Self::storage()?;
        let prefix = if namespace.is_empty() {
            String::new()
        } else {
            format!("{}_", sanitize_key(namespace))
        };
        Some(Self { prefix })
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }

    fn prefixed(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(&self.prefixed(key)).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = Self::storage().ok_or(StorageError::Unavailable)?;
        storage
            .set_item(&self.prefixed(key), value)
            .map_err(|reason| StorageError::Rejected {
                key: key.to_string(),
                reason: format!("{reason:?}"),
            })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let storage = Self::storage().ok_or(StorageError::Unavailable)?;
        storage
            .remove_item(&self.prefixed(key))
            .map_err(|reason| StorageError::Rejected {
                key: key.to_string(),
                reason: format!("{reason:?}"),
            })
    }
}

/// Best store the current platform offers.
pub fn open_platform_store(namespace: &str) -> Box<dyn KeyValueStore> {
    #[cfg(target_arch = "wasm32")]
    {
        match BrowserStore::new(namespace) {
            Some(store) => Box::new(store),
            None => {
                tracing::warn!("localStorage unavailable; settings will not survive a reload");
                Box::new(MemoryStore::new())
            }
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Box::new(FileStore::new(namespace))
    }
}

/// Sanitize a key for use as a file name or storage prefix.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("apiKey"), "apiKey");
        assert_eq!(sanitize_key("painel fiscal/v1"), "painel_fiscal_v1");
        assert_eq!(sanitize_key(&"x".repeat(100)).len(), 64);
    }

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStore::new();
        store.set(PRIMARY_KEY_NAME, "g-123").unwrap();
        assert_eq!(store.get(PRIMARY_KEY_NAME), Some("g-123".to_string()));

        store.write(PRIMARY_KEY_NAME, None);
        assert_eq!(store.get(PRIMARY_KEY_NAME), None);
        assert!(store.is_empty());
    }

    #[test]
    fn removing_missing_key_is_ok() {
        let mut store = MemoryStore::new();
        assert!(store.remove("never-set").is_ok());
    }
}
