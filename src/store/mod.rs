//! Persisted key-value stores: explicit open / write-through / flush lifecycle.
//!
//! Each store serializes one value under one key. No schema versioning; the last
//! writer wins and an unreadable entry falls back to the default value.

pub mod preferences;
pub mod session;

pub use preferences::{PreferenceStore, Preferences, Theme, APP_STORAGE_KEY};
pub use session::{AuthTokens, Permission, Session, SessionStore, User, AUTH_STORAGE_KEY};

use crate::config::ClientConfig;
use crate::error::AdminError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Raw string storage addressed by key.
pub trait StorageBackend: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, AdminError>;
    fn write(&self, key: &str, value: &str) -> Result<(), AdminError>;
    fn remove(&self, key: &str) -> Result<(), AdminError>;
}

/// One `<key>.json` file per entry under a directory.
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileBackend { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, AdminError> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), AdminError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AdminError> {
        match std::fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, AdminError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), AdminError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AdminError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// A value of `T` mirrored to a storage backend on every update.
pub struct PersistedStore<T> {
    key: String,
    backend: Arc<dyn StorageBackend>,
    value: RwLock<T>,
}

impl<T> PersistedStore<T>
where
    T: Serialize + DeserializeOwned + Default + Clone,
{
    pub fn open(backend: Arc<dyn StorageBackend>, key: impl Into<String>) -> Result<Self, AdminError> {
        let key = key.into();
        let value = match backend.read(&key)? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(key = %key, error = %e, "discarding unreadable persisted state");
                T::default()
            }),
            None => T::default(),
        };
        Ok(PersistedStore {
            key,
            backend,
            value: RwLock::new(value),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> T {
        self.read(T::clone)
    }

    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.value.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Mutate and write through. The in-memory value keeps the change even if the write fails.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, AdminError> {
        let (out, raw) = {
            let mut guard = self.value.write().unwrap_or_else(PoisonError::into_inner);
            let out = f(&mut guard);
            (out, serde_json::to_string(&*guard)?)
        };
        self.backend.write(&self.key, &raw)?;
        Ok(out)
    }

    /// Back to the default value and drop the persisted entry.
    pub fn reset(&self) -> Result<(), AdminError> {
        {
            let mut guard = self.value.write().unwrap_or_else(PoisonError::into_inner);
            *guard = T::default();
        }
        self.backend.remove(&self.key)
    }

    pub fn flush(&self) -> Result<(), AdminError> {
        let raw = self.read(|v| serde_json::to_string(v))?;
        self.backend.write(&self.key, &raw)
    }
}

/// The process's persisted stores, opened once at startup and closed on shutdown.
#[derive(Clone)]
pub struct Stores {
    pub session: Arc<SessionStore>,
    pub preferences: Arc<PreferenceStore>,
}

impl Stores {
    pub fn open(backend: Arc<dyn StorageBackend>) -> Result<Self, AdminError> {
        Ok(Stores {
            session: Arc::new(SessionStore::open(backend.clone())?),
            preferences: Arc::new(PreferenceStore::open(backend)?),
        })
    }

    /// File-backed stores under `ClientConfig::storage_dir`.
    pub fn open_from_config(config: &ClientConfig) -> Result<Self, AdminError> {
        Self::open(Arc::new(FileBackend::new(config.storage_dir.clone())))
    }

    pub fn close(&self) -> Result<(), AdminError> {
        self.session.flush()?;
        self.preferences.flush()
    }
}
