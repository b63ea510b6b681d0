//! In-process backend for both sync services.
//!
//! Backs the hosted API in builds without a remote client and stands in for
//! either service in tests. Every call is recorded in order.

use std::cell::RefCell;

use futures::future::LocalBoxFuture;
use serde_json::{json, Value};

use super::backend::apply_document;
use super::{HostedApi, LegacySync, StorageError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    LegacyGet,
    LegacySet { force: bool },
    ReloadSettings,
    ApiLoad,
    ApiExport,
    ApiImport { force: bool },
    ApiDeleteAll,
}

#[derive(Debug)]
pub struct MemoryBackend {
    legacy: RefCell<Value>,
    hosted: RefCell<Value>,
    calls: RefCell<Vec<BackendCall>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            legacy: RefCell::new(json!({})),
            hosted: RefCell::new(json!({})),
            calls: RefCell::default(),
        }
    }

    pub fn with_legacy(self, data: Value) -> Self {
        *self.legacy.borrow_mut() = data;
        self
    }

    pub fn with_hosted(self, data: Value) -> Self {
        *self.hosted.borrow_mut() = data;
        self
    }

    pub fn legacy_data(&self) -> Value {
        self.legacy.borrow().clone()
    }

    pub fn hosted_data(&self) -> Value {
        self.hosted.borrow().clone()
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: BackendCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl LegacySync for MemoryBackend {
    fn get(&self) -> LocalBoxFuture<'_, Result<Value, StorageError>> {
        self.record(BackendCall::LegacyGet);
        let data = self.legacy_data();
        Box::pin(async move { Ok(data) })
    }

    fn set(&self, data: Value, force: bool) -> LocalBoxFuture<'_, Result<(), StorageError>> {
        self.record(BackendCall::LegacySet { force });
        let result = apply_document(&mut self.legacy.borrow_mut(), data, force);
        Box::pin(async move { result })
    }

    fn reload_settings(&self) -> LocalBoxFuture<'_, Result<(), StorageError>> {
        self.record(BackendCall::ReloadSettings);
        Box::pin(async { Ok(()) })
    }

    fn usage_bytes(&self) -> Option<u64> {
        serde_json::to_string(&*self.legacy.borrow())
            .ok()
            .map(|raw| raw.len() as u64)
    }
}

impl HostedApi for MemoryBackend {
    fn load(&self) -> LocalBoxFuture<'_, Result<(), StorageError>> {
        self.record(BackendCall::ApiLoad);
        Box::pin(async { Ok(()) })
    }

    fn export(&self) -> LocalBoxFuture<'_, Result<Value, StorageError>> {
        self.record(BackendCall::ApiExport);
        let data = self.hosted_data();
        Box::pin(async move { Ok(data) })
    }

    fn import_legacy(
        &self,
        data: Value,
        force: bool,
    ) -> LocalBoxFuture<'_, Result<(), StorageError>> {
        self.record(BackendCall::ApiImport { force });
        let result = apply_document(&mut self.hosted.borrow_mut(), data, force);
        Box::pin(async move { result })
    }

    fn delete_all(&self) -> LocalBoxFuture<'_, Result<(), StorageError>> {
        self.record(BackendCall::ApiDeleteAll);
        *self.hosted.borrow_mut() = json!({});
        Box::pin(async { Ok(()) })
    }
}
