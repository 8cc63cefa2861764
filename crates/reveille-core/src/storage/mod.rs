//! Persistence for the clock stores.
//!
//! State lives in an opaque key-value store holding small JSON blobs under
//! fixed keys. The default backend writes one `<key>.json` file per key
//! under the data directory; tests and embedders can substitute any
//! [`KeyValueStore`] implementation.

mod config;

pub use config::{AlarmConfig, Config, NotificationsConfig};

use std::path::PathBuf;

use crate::error::StorageError;

/// Key holding the ordered alarm collection.
pub const ALARMS_KEY: &str = "alarms";
/// Key holding the ordered timer collection.
pub const TIMERS_KEY: &str = "savedTimers";
/// Key holding the stopwatch snapshot.
pub const STOPWATCH_KEY: &str = "stopwatch.model";
/// Key holding the world-clock city list.
pub const WORLD_CLOCK_KEY: &str = "worldClock";

/// Returns `~/.config/reveille[-dev]/` based on REVEILLE_ENV.
///
/// Set REVEILLE_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("REVEILLE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("reveille-dev")
    } else {
        base_dir.join("reveille")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Opaque key-value persistence boundary.
///
/// `read` distinguishes "key absent" (`Ok(None)`) from a real failure.
pub trait KeyValueStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// File-backed store: one `<key>.json` per key under a base directory.
pub struct JsonFileStore {
    base: PathBuf,
}

impl JsonFileStore {
    /// Open the store rooted at the default data directory.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn open() -> Result<Self, StorageError> {
        Ok(Self { base: data_dir()? })
    }

    /// Store rooted at an explicit directory.
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base.join(format!("{key}.json"))
    }
}

impl KeyValueStore for JsonFileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::LoadFailed {
                key: key.to_string(),
                path,
                message: err.to_string(),
            }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        std::fs::write(&path, value).map_err(|err| StorageError::SaveFailed {
            key: key.to_string(),
            path,
            message: err.to_string(),
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Io(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::with_base(dir.path());
        assert!(store.read("nothing").unwrap().is_none());
    }

    #[test]
    fn write_then_read_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::with_base(dir.path());

        store.write(ALARMS_KEY, "[]").unwrap();
        assert_eq!(store.read(ALARMS_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::with_base(dir.path());

        store.write("k", "v").unwrap();
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(store.read("k").unwrap().is_none());
    }
}
