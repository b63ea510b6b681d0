//! String key-value persistence: `localStorage` in the browser, one file per
//! key under the platform data directory everywhere else.

#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

use crate::storage::StorageError;

#[derive(Debug, Clone)]
pub struct KeyValueStore {
    #[cfg(not(target_arch = "wasm32"))]
    root: PathBuf,
}

impl KeyValueStore {
    #[cfg(target_arch = "wasm32")]
    pub fn open_default() -> Result<Self, StorageError> {
        local_storage()?;
        Ok(Self {})
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn open_default() -> Result<Self, StorageError> {
        let dirs = directories::ProjectDirs::from("com", "Vaultkeep", "Vaultkeep")
            .ok_or(StorageError::Unavailable("platform data directory"))?;
        Ok(Self::at(dirs.data_dir().join("store")))
    }

    /// Store rooted at an explicit directory.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        local_storage()?
            .get_item(key)
            .map_err(|_| StorageError::Backend(format!("localStorage read of `{key}` failed")))
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        local_storage()?
            .set_item(key, value)
            .map_err(|_| StorageError::Backend(format!("localStorage write of `{key}` failed")))
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    #[cfg(target_arch = "wasm32")]
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        local_storage()?
            .remove_item(key)
            .map_err(|_| StorageError::Backend(format!("localStorage delete of `{key}` failed")))
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Result<web_sys::Storage, StorageError> {
    web_sys::window()
        .ok_or(StorageError::Unavailable("window"))?
        .local_storage()
        .map_err(|_| StorageError::Unavailable("localStorage"))?
        .ok_or(StorageError::Unavailable("localStorage"))
}
