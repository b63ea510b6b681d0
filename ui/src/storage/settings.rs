use serde_json::Value;
use tracing::{info, warn};

use crate::core::config::FeatureFlags;

use super::{data_stats, DataStats, HostedApi, LegacySync, Prompter, StorageError};

/// Message shown to the user through a [`Prompter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Importing will overwrite data held by the hosted API.
    ImportConfirmHosted,
    /// Importing will overwrite the legacy document; lists what is coming in.
    ImportConfirm { stats: DataStats },
    ImportSuccess,
    /// Deleting hosted data is refused until an export happened this session.
    BackUpFirst,
    DeleteAllConfirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveBackend {
    LegacySync,
    HostedApi,
}

/// Which blocks the settings panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelSections {
    pub audit_log: bool,
    pub delete_all: bool,
    pub cloud_drive: bool,
    pub local_storage_details: bool,
    pub legacy_import: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Imported,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
    NeedsBackup,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageSettings {
    flags: FeatureFlags,
    api_permission_granted: bool,
    has_backed_up: bool,
}

impl StorageSettings {
    pub fn new(flags: FeatureFlags, api_permission_granted: bool) -> Self {
        Self {
            flags,
            api_permission_granted,
            has_backed_up: false,
        }
    }

    pub fn flags(&self) -> FeatureFlags {
        self.flags
    }

    pub fn api_permission_granted(&self) -> bool {
        self.api_permission_granted
    }

    pub fn has_backed_up(&self) -> bool {
        self.has_backed_up
    }

    pub fn active_backend(&self) -> ActiveBackend {
        if self.flags.hosted_api && self.api_permission_granted {
            ActiveBackend::HostedApi
        } else {
            ActiveBackend::LegacySync
        }
    }

    pub fn sections(&self) -> PanelSections {
        let hosted = self.active_backend() == ActiveBackend::HostedApi;
        PanelSections {
            audit_log: hosted,
            delete_all: self.flags.hosted_api,
            cloud_drive: !hosted,
            local_storage_details: !hosted,
            legacy_import: hosted,
        }
    }

    /// Store the user's choice without touching any backend. Returns whether
    /// the hosted API should now be loaded.
    pub fn record_permission(&mut self, granted: bool) -> bool {
        self.api_permission_granted = granted;
        info!(granted, backend = ?self.active_backend(), "hosted API permission changed");
        granted
    }

    /// Record the user's choice; granting kicks off a load from the API.
    pub async fn set_permission<A>(&mut self, granted: bool, api: &A) -> Result<(), StorageError>
    where
        A: HostedApi + ?Sized,
    {
        if self.record_permission(granted) {
            api.load().await?;
        }
        Ok(())
    }

    pub fn mark_backed_up(&mut self) {
        self.has_backed_up = true;
    }

    /// Fetch everything from the active backend. Counts as a backup even if
    /// the fetch then fails.
    pub async fn export<L, A>(&mut self, legacy: &L, api: &A) -> Result<Value, StorageError>
    where
        L: LegacySync + ?Sized,
        A: HostedApi + ?Sized,
    {
        self.mark_backed_up();
        self.fetch_active(legacy, api).await
    }

    /// Read the whole document from whichever backend is active.
    pub async fn fetch_active<L, A>(&self, legacy: &L, api: &A) -> Result<Value, StorageError>
    where
        L: LegacySync + ?Sized,
        A: HostedApi + ?Sized,
    {
        match self.active_backend() {
            ActiveBackend::HostedApi => api.export().await,
            ActiveBackend::LegacySync => legacy.get().await,
        }
    }

    /// Overwrite the active backend with `data` after the user confirms.
    pub async fn import<L, A, P>(
        &self,
        data: Value,
        legacy: &L,
        api: &A,
        prompter: &P,
    ) -> Result<ImportOutcome, StorageError>
    where
        L: LegacySync + ?Sized,
        A: HostedApi + ?Sized,
        P: Prompter + ?Sized,
    {
        if !data.is_object() {
            return Err(StorageError::NotAnObject);
        }

        match self.active_backend() {
            ActiveBackend::HostedApi => {
                if !prompter.confirm(&Notice::ImportConfirmHosted).await {
                    return Ok(ImportOutcome::Cancelled);
                }
                api.import_legacy(data, true).await?;
            }
            ActiveBackend::LegacySync => {
                let stats = data_stats(&data);
                if !prompter.confirm(&Notice::ImportConfirm { stats }).await {
                    return Ok(ImportOutcome::Cancelled);
                }
                legacy.set(data, true).await?;
                legacy.reload_settings().await?;
            }
        }

        info!(backend = ?self.active_backend(), "import finished");
        prompter.alert(&Notice::ImportSuccess).await;
        Ok(ImportOutcome::Imported)
    }

    /// Import whatever the legacy service holds into the active backend.
    pub async fn import_from_legacy<L, A, P>(
        &self,
        legacy: &L,
        api: &A,
        prompter: &P,
    ) -> Result<ImportOutcome, StorageError>
    where
        L: LegacySync + ?Sized,
        A: HostedApi + ?Sized,
        P: Prompter + ?Sized,
    {
        let data = legacy.get().await?;
        self.import(data, legacy, api, prompter).await
    }

    pub async fn delete_all<A, P>(&self, api: &A, prompter: &P) -> Result<DeleteOutcome, StorageError>
    where
        A: HostedApi + ?Sized,
        P: Prompter + ?Sized,
    {
        if self.api_permission_granted && !self.has_backed_up {
            warn!("refusing to delete hosted data before an export");
            prompter.alert(&Notice::BackUpFirst).await;
            return Ok(DeleteOutcome::NeedsBackup);
        }

        if !prompter.confirm(&Notice::DeleteAllConfirm).await {
            return Ok(DeleteOutcome::Cancelled);
        }

        api.delete_all().await?;
        info!("hosted data deleted");
        Ok(DeleteOutcome::Deleted)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use futures::executor::block_on;
    use futures::future::LocalBoxFuture;
    use serde_json::json;

    use super::*;
    use crate::storage::{BackendCall, MemoryBackend};

    /// Answers confirms from a script and records every notice shown.
    #[derive(Default)]
    struct ScriptedPrompter {
        answers: RefCell<VecDeque<bool>>,
        shown: RefCell<Vec<Notice>>,
    }

    impl ScriptedPrompter {
        fn answering(answers: &[bool]) -> Self {
            Self {
                answers: RefCell::new(answers.iter().copied().collect()),
                shown: RefCell::default(),
            }
        }

        fn shown(&self) -> Vec<Notice> {
            self.shown.borrow().clone()
        }
    }

    impl Prompter for ScriptedPrompter {
        fn confirm<'a>(&'a self, notice: &'a Notice) -> LocalBoxFuture<'a, bool> {
            self.shown.borrow_mut().push(notice.clone());
            let answer = self.answers.borrow_mut().pop_front().unwrap_or(false);
            Box::pin(async move { answer })
        }

        fn alert<'a>(&'a self, notice: &'a Notice) -> LocalBoxFuture<'a, ()> {
            self.shown.borrow_mut().push(notice.clone());
            Box::pin(async {})
        }
    }

    fn hosted_flags() -> FeatureFlags {
        FeatureFlags { hosted_api: true }
    }

    fn legacy_doc() -> Value {
        json!({
            "loadouts-v3.0": ["l1"],
            "l1": { "destinyVersion": 2 },
            "ignoredUsers": ["u1", "u2"]
        })
    }

    #[test]
    fn backend_needs_flag_and_permission() {
        let off = FeatureFlags { hosted_api: false };
        assert_eq!(
            StorageSettings::new(off, true).active_backend(),
            ActiveBackend::LegacySync
        );
        assert_eq!(
            StorageSettings::new(hosted_flags(), false).active_backend(),
            ActiveBackend::LegacySync
        );
        assert_eq!(
            StorageSettings::new(hosted_flags(), true).active_backend(),
            ActiveBackend::HostedApi
        );
    }

    #[test]
    fn sections_follow_backend() {
        let legacy = StorageSettings::new(FeatureFlags { hosted_api: false }, false).sections();
        assert!(!legacy.audit_log && !legacy.delete_all && !legacy.legacy_import);
        assert!(legacy.cloud_drive && legacy.local_storage_details);

        let opted_out = StorageSettings::new(hosted_flags(), false).sections();
        assert!(opted_out.delete_all && opted_out.cloud_drive);
        assert!(!opted_out.audit_log);

        let hosted = StorageSettings::new(hosted_flags(), true).sections();
        assert!(hosted.audit_log && hosted.delete_all && hosted.legacy_import);
        assert!(!hosted.cloud_drive && !hosted.local_storage_details);
    }

    #[test]
    fn granting_permission_loads_hosted_data() {
        let api = MemoryBackend::new();
        let mut settings = StorageSettings::new(hosted_flags(), false);

        block_on(settings.set_permission(true, &api)).unwrap();
        assert!(settings.api_permission_granted());
        assert_eq!(api.calls(), vec![BackendCall::ApiLoad]);

        block_on(settings.set_permission(false, &api)).unwrap();
        assert_eq!(api.calls(), vec![BackendCall::ApiLoad]);
        assert_eq!(settings.active_backend(), ActiveBackend::LegacySync);
    }

    #[test]
    fn export_reads_active_backend_and_marks_backup() {
        let legacy = MemoryBackend::new().with_legacy(json!({ "from": "legacy" }));
        let api = MemoryBackend::new().with_hosted(json!({ "from": "hosted" }));

        let mut settings = StorageSettings::new(hosted_flags(), false);
        let data = block_on(settings.export(&legacy, &api)).unwrap();
        assert_eq!(data, json!({ "from": "legacy" }));
        assert!(settings.has_backed_up());

        let mut settings = StorageSettings::new(hosted_flags(), true);
        let data = block_on(settings.export(&legacy, &api)).unwrap();
        assert_eq!(data, json!({ "from": "hosted" }));
    }

    #[test]
    fn legacy_import_confirms_with_stats_then_reloads() {
        let backend = MemoryBackend::new().with_legacy(json!({ "old": true }));
        let prompter = ScriptedPrompter::answering(&[true]);
        let settings = StorageSettings::new(FeatureFlags { hosted_api: false }, false);

        let outcome = block_on(settings.import(legacy_doc(), &backend, &backend, &prompter)).unwrap();

        assert_eq!(outcome, ImportOutcome::Imported);
        assert_eq!(backend.legacy_data(), legacy_doc());
        assert_eq!(
            backend.calls(),
            vec![
                BackendCall::LegacySet { force: true },
                BackendCall::ReloadSettings
            ]
        );
        assert_eq!(
            prompter.shown(),
            vec![
                Notice::ImportConfirm {
                    stats: DataStats {
                        loadouts_d2: 1,
                        ignored_users: 2,
                        ..DataStats::default()
                    }
                },
                Notice::ImportSuccess,
            ]
        );
    }

    #[test]
    fn declined_import_writes_nothing() {
        let backend = MemoryBackend::new().with_legacy(json!({ "old": true }));
        let prompter = ScriptedPrompter::answering(&[false]);
        let settings = StorageSettings::new(FeatureFlags { hosted_api: false }, false);

        let outcome = block_on(settings.import(legacy_doc(), &backend, &backend, &prompter)).unwrap();

        assert_eq!(outcome, ImportOutcome::Cancelled);
        assert_eq!(backend.legacy_data(), json!({ "old": true }));
        assert!(backend.calls().is_empty());
        assert_eq!(prompter.shown().len(), 1);
    }

    #[test]
    fn hosted_import_goes_to_api() {
        let backend = MemoryBackend::new();
        let prompter = ScriptedPrompter::answering(&[true]);
        let settings = StorageSettings::new(hosted_flags(), true);

        let outcome = block_on(settings.import(legacy_doc(), &backend, &backend, &prompter)).unwrap();

        assert_eq!(outcome, ImportOutcome::Imported);
        assert_eq!(backend.hosted_data(), legacy_doc());
        assert_eq!(backend.calls(), vec![BackendCall::ApiImport { force: true }]);
        assert_eq!(
            prompter.shown(),
            vec![Notice::ImportConfirmHosted, Notice::ImportSuccess]
        );
    }

    #[test]
    fn import_rejects_non_object_payload() {
        let backend = MemoryBackend::new();
        let prompter = ScriptedPrompter::answering(&[true]);
        let settings = StorageSettings::new(hosted_flags(), true);

        let err = block_on(settings.import(json!("nope"), &backend, &backend, &prompter)).unwrap_err();
        assert!(matches!(err, StorageError::NotAnObject));
        assert!(prompter.shown().is_empty());
    }

    #[test]
    fn import_from_legacy_uploads_legacy_document() {
        let backend = MemoryBackend::new().with_legacy(legacy_doc());
        let prompter = ScriptedPrompter::answering(&[true]);
        let settings = StorageSettings::new(hosted_flags(), true);

        let outcome = block_on(settings.import_from_legacy(&backend, &backend, &prompter)).unwrap();

        assert_eq!(outcome, ImportOutcome::Imported);
        assert_eq!(backend.hosted_data(), legacy_doc());
        assert_eq!(
            backend.calls(),
            vec![BackendCall::LegacyGet, BackendCall::ApiImport { force: true }]
        );
    }

    #[test]
    fn delete_requires_backup_when_permission_granted() {
        let api = MemoryBackend::new().with_hosted(json!({ "keep": 1 }));
        let prompter = ScriptedPrompter::answering(&[true]);
        let mut settings = StorageSettings::new(hosted_flags(), true);

        let outcome = block_on(settings.delete_all(&api, &prompter)).unwrap();
        assert_eq!(outcome, DeleteOutcome::NeedsBackup);
        assert_eq!(prompter.shown(), vec![Notice::BackUpFirst]);
        assert_eq!(api.hosted_data(), json!({ "keep": 1 }));

        block_on(settings.export(&api, &api)).unwrap();
        let outcome = block_on(settings.delete_all(&api, &prompter)).unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert_eq!(api.hosted_data(), json!({}));
        assert_eq!(api.calls().last(), Some(&BackendCall::ApiDeleteAll));
    }

    #[test]
    fn permission_change_during_export_survives() {
        let legacy = MemoryBackend::new().with_legacy(json!({ "from": "legacy" }));
        let api = MemoryBackend::new().with_hosted(json!({ "from": "hosted" }));
        let mut live = StorageSettings::new(hosted_flags(), false);

        // Export starts: backup is recorded up front, the fetch runs on a copy.
        live.mark_backed_up();
        let in_flight = live.clone();

        // User opts in while the fetch is pending.
        assert!(live.record_permission(true));

        let data = block_on(in_flight.fetch_active(&legacy, &api)).unwrap();
        assert_eq!(data, json!({ "from": "legacy" }));
        assert!(live.api_permission_granted());
        assert!(live.has_backed_up());
        assert_eq!(live.active_backend(), ActiveBackend::HostedApi);
    }

    #[test]
    fn revoking_permission_does_not_load() {
        let mut settings = StorageSettings::new(hosted_flags(), true);
        assert!(!settings.record_permission(false));
        assert_eq!(settings.active_backend(), ActiveBackend::LegacySync);
    }

    #[test]
    fn delete_without_permission_only_asks_to_confirm() {
        let api = MemoryBackend::new();
        let prompter = ScriptedPrompter::answering(&[false]);
        let settings = StorageSettings::new(hosted_flags(), false);

        let outcome = block_on(settings.delete_all(&api, &prompter)).unwrap();
        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert_eq!(prompter.shown(), vec![Notice::DeleteAllConfirm]);
        assert!(api.calls().is_empty());
    }
}
