//! Legacy sync service backed by the local key-value store.

use std::cell::RefCell;

use futures::future::LocalBoxFuture;
use serde_json::{json, Value};
use tracing::debug;

use crate::core::kv::KeyValueStore;

use super::backend::apply_document;
use super::{LegacySync, StorageError};

/// Key holding the whole legacy document.
pub const LEGACY_SYNC_KEY: &str = "vaultkeep-sync";

/// Key holding the user's hosted API opt-in.
const API_PERMISSION_KEY: &str = "vaultkeep-api-permission";

const SETTINGS_KEY: &str = "settings-v1.0";

#[derive(Debug)]
pub struct LocalSync {
    store: KeyValueStore,
    settings: RefCell<Option<Value>>,
}

impl LocalSync {
    pub fn new(store: KeyValueStore) -> Self {
        Self {
            store,
            settings: RefCell::new(None),
        }
    }

    pub fn open_default() -> Result<Self, StorageError> {
        Ok(Self::new(KeyValueStore::open_default()?))
    }

    /// Settings block as of the last [`LegacySync::reload_settings`].
    pub fn settings(&self) -> Option<Value> {
        self.settings.borrow().clone()
    }

    pub fn api_permission(&self) -> Result<bool, StorageError> {
        Ok(self
            .store
            .read(API_PERMISSION_KEY)?
            .is_some_and(|raw| raw.trim() == "true"))
    }

    pub fn set_api_permission(&self, granted: bool) -> Result<(), StorageError> {
        self.store
            .write(API_PERMISSION_KEY, if granted { "true" } else { "false" })
    }

    fn read_document(&self) -> Result<Value, StorageError> {
        match self.store.read(LEGACY_SYNC_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(json!({})),
        }
    }

    fn write_document(&self, data: Value, force: bool) -> Result<(), StorageError> {
        let mut doc = self.read_document()?;
        apply_document(&mut doc, data, force)?;
        self.store
            .write(LEGACY_SYNC_KEY, &serde_json::to_string(&doc)?)?;
        debug!(force, "legacy document written");
        Ok(())
    }
}

impl LegacySync for LocalSync {
    fn get(&self) -> LocalBoxFuture<'_, Result<Value, StorageError>> {
        Box::pin(async move { self.read_document() })
    }

    fn set(&self, data: Value, force: bool) -> LocalBoxFuture<'_, Result<(), StorageError>> {
        Box::pin(async move { self.write_document(data, force) })
    }

    fn reload_settings(&self) -> LocalBoxFuture<'_, Result<(), StorageError>> {
        Box::pin(async move {
            let doc = self.read_document()?;
            *self.settings.borrow_mut() = doc.get(SETTINGS_KEY).cloned();
            debug!("settings reloaded from legacy document");
            Ok(())
        })
    }

    fn usage_bytes(&self) -> Option<u64> {
        self.store
            .read(LEGACY_SYNC_KEY)
            .ok()
            .flatten()
            .map(|raw| raw.len() as u64)
    }
}
