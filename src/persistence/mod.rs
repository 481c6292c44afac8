//! Key/value persistence for settings and progression
//!
//! Documents are JSON strings stored under a key:
//! - `FileStorage`: `<dir>/<key>.json` (native)
//! - `LocalStorage`: browser LocalStorage (wasm)
//! - `MemoryStorage`: in-process map, optionally failing writes (tests)
//!
//! Loading never fails: a missing or unreadable document yields defaults.

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::PersistError;

/// Settings document key
pub const SETTINGS_KEY: &str = "galactic_justice_settings";
/// Progression document key
pub const PROGRESS_KEY: &str = "galactic_justice_progress";

/// A string store addressed by key
pub trait Storage: std::fmt::Debug {
    /// `Ok(None)` when nothing is stored under `key`
    fn read(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistError>;
}

/// Load `key` as `T`, falling back to `T::default()` on any failure
pub fn load_or_default<T: DeserializeOwned + Default>(storage: &dyn Storage, key: &str) -> T {
    match load(storage, key) {
        Ok(Some(value)) => {
            log::info!("Loaded '{}'", key);
            value
        }
        Ok(None) => {
            log::info!("No stored '{}', using defaults", key);
            T::default()
        }
        Err(e) => {
            log::warn!("{}; using defaults", e);
            T::default()
        }
    }
}

/// Load `key` as `T`
pub fn load<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Result<Option<T>, PersistError> {
    let Some(json) = storage.read(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&json)
        .map(Some)
        .map_err(|source| PersistError::Json {
            key: key.to_string(),
            source,
        })
}

/// Serialize `value` and write it under `key`
pub fn save<T: Serialize>(storage: &mut dyn Storage, key: &str, value: &T) -> Result<(), PersistError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| PersistError::Json {
        key: key.to_string(),
        source,
    })?;
    storage.write(key, &json)
}

/// In-process storage
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    /// Reject every write (simulates a full or read-only backend)
    pub fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            entries: HashMap::new(),
            fail_writes: true,
        }
    }

    /// Raw stored document
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        if self.fail_writes {
            return Err(PersistError::Unavailable(format!("write to '{key}' rejected")));
        }
        self.insert(key, value);
        Ok(())
    }
}

/// One JSON file per key in a directory
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStorage {
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> std::path::PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(json) => Ok(Some(json)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        let io_err = |source| PersistError::Io {
            key: key.to_string(),
            source,
        };
        std::fs::create_dir_all(&self.dir).map_err(io_err)?;
        std::fs::write(self.path_for(key), value).map_err(io_err)
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn backend() -> Result<web_sys::Storage, PersistError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| PersistError::Unavailable("no LocalStorage".to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
impl Storage for LocalStorage {
    fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
        Self::backend()?
            .get_item(key)
            .map_err(|_| PersistError::Unavailable(format!("read of '{key}' failed")))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        Self::backend()?
            .set_item(key, value)
            .map_err(|_| PersistError::Unavailable(format!("write of '{key}' failed")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Doc {
        name: String,
        count: u32,
    }

    #[test]
    fn test_memory_save_and_load() {
        let mut storage = MemoryStorage::new();
        let doc = Doc {
            name: "nebula".into(),
            count: 3,
        };
        save(&mut storage, "doc", &doc).unwrap();
        let loaded: Doc = load_or_default(&storage, "doc");
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_missing_key_gives_default() {
        let storage = MemoryStorage::new();
        let loaded: Doc = load_or_default(&storage, "nothing");
        assert_eq!(loaded, Doc::default());
    }

    #[test]
    fn test_corrupt_document_gives_default() {
        let mut storage = MemoryStorage::new();
        storage.insert("doc", "{ not json");
        assert!(matches!(
            load::<Doc>(&storage, "doc"),
            Err(PersistError::Json { .. })
        ));
        let loaded: Doc = load_or_default(&storage, "doc");
        assert_eq!(loaded, Doc::default());
    }

    #[test]
    fn test_failing_writes_report_error() {
        let mut storage = MemoryStorage::failing();
        let err = save(&mut storage, "doc", &Doc::default()).unwrap_err();
        assert!(matches!(err, PersistError::Unavailable(_)));
        assert!(storage.get("doc").is_none());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_storage_round_trip() {
        let dir = std::env::temp_dir().join(format!("galactic-justice-test-{}", std::process::id()));
        let mut storage = FileStorage::new(&dir);
        assert!(storage.read("doc").unwrap().is_none());

        let doc = Doc {
            name: "frontier".into(),
            count: 9,
        };
        save(&mut storage, "doc", &doc).unwrap();
        assert!(storage.path_for("doc").exists());
        assert_eq!(load::<Doc>(&storage, "doc").unwrap(), Some(doc));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
