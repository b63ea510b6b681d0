use futures::future::LocalBoxFuture;
use serde_json::Value;

use super::{Notice, StorageError};

/// Legacy sync service. Holds the user's data as one JSON document, kept
/// locally and optionally mirrored to a cloud drive.
pub trait LegacySync {
    fn get(&self) -> LocalBoxFuture<'_, Result<Value, StorageError>>;

    /// With `force` the stored document is replaced; otherwise top-level
    /// keys from `data` are merged over it.
    fn set(&self, data: Value, force: bool) -> LocalBoxFuture<'_, Result<(), StorageError>>;

    /// Re-read settings after the document changed underneath them.
    fn reload_settings(&self) -> LocalBoxFuture<'_, Result<(), StorageError>>;

    /// Bytes the document occupies locally, if known.
    fn usage_bytes(&self) -> Option<u64>;
}

/// Hosted sync API.
pub trait HostedApi {
    /// Pull the user's data after permission was granted.
    fn load(&self) -> LocalBoxFuture<'_, Result<(), StorageError>>;

    fn export(&self) -> LocalBoxFuture<'_, Result<Value, StorageError>>;

    /// Upload a legacy-format document.
    fn import_legacy(&self, data: Value, force: bool)
        -> LocalBoxFuture<'_, Result<(), StorageError>>;

    fn delete_all(&self) -> LocalBoxFuture<'_, Result<(), StorageError>>;
}

/// Blocking-style user dialogs.
pub trait Prompter {
    fn confirm<'a>(&'a self, notice: &'a Notice) -> LocalBoxFuture<'a, bool>;

    fn alert<'a>(&'a self, notice: &'a Notice) -> LocalBoxFuture<'a, ()>;
}

/// Write `incoming` into `target` with [`LegacySync::set`] semantics.
pub(crate) fn apply_document(
    target: &mut Value,
    incoming: Value,
    force: bool,
) -> Result<(), StorageError> {
    let Value::Object(incoming) = incoming else {
        return Err(StorageError::NotAnObject);
    };

    if force || !target.is_object() {
        *target = Value::Object(incoming);
        return Ok(());
    }

    if let Value::Object(existing) = target {
        existing.extend(incoming);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_keeps_untouched_keys() {
        let mut doc = json!({ "a": 1, "b": 2 });
        apply_document(&mut doc, json!({ "b": 3, "c": 4 }), false).unwrap();
        assert_eq!(doc, json!({ "a": 1, "b": 3, "c": 4 }));
    }

    #[test]
    fn force_replaces_document() {
        let mut doc = json!({ "a": 1, "b": 2 });
        apply_document(&mut doc, json!({ "c": 4 }), true).unwrap();
        assert_eq!(doc, json!({ "c": 4 }));
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let mut doc = json!({ "a": 1 });
        let err = apply_document(&mut doc, json!([1, 2]), true).unwrap_err();
        assert!(matches!(err, StorageError::NotAnObject));
        assert_eq!(doc, json!({ "a": 1 }));
    }
}
