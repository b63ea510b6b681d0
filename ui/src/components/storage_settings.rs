use std::future::Future;
use std::rc::Rc;

use dioxus::prelude::*;
use futures::future::LocalBoxFuture;
use serde_json::Value;
use tracing::warn;

use crate::components::ExpandableTextBlock;
use crate::core::config::FeatureFlags;
use crate::core::platform::{self, Delivery};
use crate::storage::{
    DataStats, DeleteOutcome, HostedApi, ImportOutcome, LegacySync, LocalSync, MemoryBackend,
    Notice, Prompter, StatKind, StorageError, StorageSettings,
};
use crate::t;

pub const HOSTED_API_HELP_LINK: &str = "https://github.com/vaultkeep/vaultkeep/wiki/Hosted-sync";
pub const AUDIT_LOG_LINK: &str = "https://sync.vaultkeep.app/audit";

/// Backends the panel talks to. Platforms may provide their own through
/// context; otherwise the local legacy store and an in-memory hosted API
/// are used.
#[derive(Clone)]
pub struct StorageServices {
    pub legacy: Rc<dyn LegacySync>,
    pub api: Rc<dyn HostedApi>,
    /// Persists the hosted API opt-in across sessions.
    pub permission: Option<Rc<LocalSync>>,
}

impl StorageServices {
    pub fn local() -> Self {
        match LocalSync::open_default() {
            Ok(sync) => {
                let sync = Rc::new(sync);
                Self {
                    legacy: sync.clone(),
                    api: Rc::new(MemoryBackend::new()),
                    permission: Some(sync),
                }
            }
            Err(err) => {
                warn!("local storage unavailable ({err}); keeping data in memory");
                let memory = Rc::new(MemoryBackend::new());
                Self {
                    legacy: memory.clone(),
                    api: memory,
                    permission: None,
                }
            }
        }
    }

    fn load_permission(&self) -> bool {
        let Some(store) = self.permission.as_ref() else {
            return false;
        };
        store.api_permission().unwrap_or_else(|err| {
            warn!("reading hosted API permission failed: {err}");
            false
        })
    }

    fn save_permission(&self, granted: bool) {
        if let Some(store) = self.permission.as_ref() {
            if let Err(err) = store.set_api_permission(granted) {
                warn!("saving hosted API permission failed: {err}");
            }
        }
    }
}

/// Browser `confirm` / `alert`, run through the renderer's JS bridge.
#[derive(Debug, Clone, Copy, Default)]
pub struct DialogPrompter;

impl Prompter for DialogPrompter {
    fn confirm<'a>(&'a self, notice: &'a Notice) -> LocalBoxFuture<'a, bool> {
        let script = format!("return window.confirm({});", js_string(&notice_text(notice)));
        Box::pin(async move {
            match document::eval(&script).join::<bool>().await {
                Ok(answer) => answer,
                Err(err) => {
                    warn!("confirm dialog failed: {err:?}");
                    false
                }
            }
        })
    }

    fn alert<'a>(&'a self, notice: &'a Notice) -> LocalBoxFuture<'a, ()> {
        let script = format!(
            "window.alert({}); return true;",
            js_string(&notice_text(notice))
        );
        Box::pin(async move {
            if let Err(err) = document::eval(&script).join::<bool>().await {
                warn!("alert dialog failed: {err:?}");
            }
        })
    }
}

fn js_string(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}

/// Localized dialog text.
pub fn notice_text(notice: &Notice) -> String {
    match notice {
        Notice::ImportConfirmHosted => t!("storage-import-confirm-hosted"),
        Notice::ImportConfirm { stats } => t!("storage-import-confirm", stats = stats_line(stats)),
        Notice::ImportSuccess => t!("storage-import-success"),
        Notice::BackUpFirst => t!("storage-backup-first"),
        Notice::DeleteAllConfirm => t!("storage-delete-all-confirm"),
    }
}

/// "3 D2 loadouts, 1 settings" style summary of the non-zero counts.
pub fn stats_line(stats: &DataStats) -> String {
    let parts: Vec<String> = stats
        .non_zero()
        .map(|(kind, value)| match kind {
            StatKind::LoadoutsD1 => t!("storage-loadouts-d1", value = value),
            StatKind::LoadoutsD2 => t!("storage-loadouts-d2", value = value),
            StatKind::TagNotesD1 => t!("storage-tag-notes-d1", value = value),
            StatKind::TagNotesD2 => t!("storage-tag-notes-d2", value = value),
            StatKind::Settings => t!("storage-settings-count", value = value),
            StatKind::IgnoredUsers => t!("storage-ignored-users", value = value),
        })
        .collect();

    if parts.is_empty() {
        t!("storage-import-nothing")
    } else {
        parts.join(", ")
    }
}

fn format_kib(bytes: u64) -> String {
    format!("{:.1} KiB", bytes as f64 / 1024.0)
}

fn usage_text(bytes: Option<u64>) -> String {
    match bytes {
        Some(bytes) => t!("storage-local-usage", size = format_kib(bytes)),
        None => t!("storage-local-usage-unknown"),
    }
}

#[derive(Clone, Debug, PartialEq)]
enum PanelStatus {
    Idle,
    Working(String),
    Done(String),
    Error(String),
}

fn failed(err: StorageError) -> PanelStatus {
    warn!("storage action failed: {err}");
    PanelStatus::Error(t!("storage-status-failed", error = err.to_string()))
}

fn import_status(result: Result<ImportOutcome, StorageError>) -> PanelStatus {
    match result {
        Ok(ImportOutcome::Imported) => PanelStatus::Done(t!("storage-status-imported")),
        Ok(ImportOutcome::Cancelled) => PanelStatus::Done(t!("storage-status-cancelled")),
        Err(err) => failed(err),
    }
}

fn deliver_export(data: &Value) -> Result<Delivery, StorageError> {
    let json = serde_json::to_string_pretty(data)?;
    let filename = format!("vaultkeep-data-{}.json", platform::timestamp_slug());
    platform::download_bytes(&filename, "application/json", json.into_bytes())
}

/// Runs one panel action at a time, reporting progress on the status line.
fn run_action<F>(busy: Signal<bool>, status: Signal<PanelStatus>, working: String, action: F)
where
    F: Future<Output = PanelStatus> + 'static,
{
    let mut busy_signal = busy;
    let mut status_signal = status;
    if busy_signal() {
        return;
    }
    busy_signal.set(true);
    status_signal.set(PanelStatus::Working(working));
    spawn(async move {
        let outcome = action.await;
        status_signal.set(outcome);
        busy_signal.set(false);
    });
}

#[component]
pub fn StorageSettingsPanel() -> Element {
    let services = use_hook(|| {
        try_consume_context::<StorageServices>().unwrap_or_else(StorageServices::local)
    });
    let settings = use_signal({
        let services = services.clone();
        move || StorageSettings::new(FeatureFlags::load(), services.load_permission())
    });
    let status = use_signal(|| PanelStatus::Idle);
    let busy = use_signal(|| false);
    // Reading usage hits the store, so it is refreshed after writes only.
    let usage_bytes = use_signal({
        let services = services.clone();
        move || services.legacy.usage_bytes()
    });

    let on_permission = {
        let services = services.clone();
        let mut settings_signal = settings;
        let mut status_signal = status;
        move |evt: FormEvent| {
            let granted = evt.checked();
            let services = services.clone();
            services.save_permission(granted);
            if !settings_signal.write().record_permission(granted) {
                return;
            }
            spawn(async move {
                if let Err(err) = services.api.load().await {
                    status_signal.set(failed(err));
                }
            });
        }
    };

    let on_export = {
        let services = services.clone();
        let mut settings_signal = settings;
        move |_: MouseEvent| {
            if busy() {
                return;
            }
            settings_signal.write().mark_backed_up();
            let services = services.clone();
            run_action(busy, status, t!("storage-status-exporting"), async move {
                let snapshot = settings_signal();
                let result = snapshot.fetch_active(&*services.legacy, &*services.api).await;
                match result.and_then(|data| deliver_export(&data)) {
                    Ok(Delivery::Saved(location)) => {
                        PanelStatus::Done(t!("storage-status-exported", location = location))
                    }
                    Ok(Delivery::Browser) => PanelStatus::Done(t!("storage-status-downloaded")),
                    Err(err) => failed(err),
                }
            });
        }
    };

    let on_import_file = {
        let services = services.clone();
        let mut usage_signal = usage_bytes;
        move |evt: FormEvent| {
            let Some(engine) = evt.files() else {
                return;
            };
            let Some(name) = engine.files().into_iter().next() else {
                return;
            };
            let services = services.clone();
            run_action(busy, status, t!("storage-status-importing"), async move {
                let Some(raw) = engine.read_file_to_string(&name).await else {
                    return PanelStatus::Error(t!("storage-status-unreadable-file"));
                };
                let data: Value = match serde_json::from_str(&raw) {
                    Ok(data) => data,
                    Err(err) => return failed(err.into()),
                };
                let current = settings();
                let result = current
                    .import(data, &*services.legacy, &*services.api, &DialogPrompter)
                    .await;
                usage_signal.set(services.legacy.usage_bytes());
                import_status(result)
            });
        }
    };

    let on_legacy_import = {
        let services = services.clone();
        let mut usage_signal = usage_bytes;
        move |_: MouseEvent| {
            let services = services.clone();
            run_action(busy, status, t!("storage-status-importing"), async move {
                let current = settings();
                let result = current
                    .import_from_legacy(&*services.legacy, &*services.api, &DialogPrompter)
                    .await;
                usage_signal.set(services.legacy.usage_bytes());
                import_status(result)
            });
        }
    };

    let on_delete = {
        let services = services.clone();
        move |_: MouseEvent| {
            let services = services.clone();
            run_action(busy, status, t!("storage-status-deleting"), async move {
                let current = settings();
                match current.delete_all(&*services.api, &DialogPrompter).await {
                    Ok(DeleteOutcome::Deleted) => PanelStatus::Done(t!("storage-status-deleted")),
                    Ok(DeleteOutcome::Cancelled) => {
                        PanelStatus::Done(t!("storage-status-cancelled"))
                    }
                    Ok(DeleteOutcome::NeedsBackup) => {
                        PanelStatus::Error(t!("storage-status-needs-backup"))
                    }
                    Err(err) => failed(err),
                }
            });
        }
    };

    let current = settings();
    let sections = current.sections();
    let usage = usage_text(usage_bytes());

    let feedback = match status() {
        PanelStatus::Idle => None,
        PanelStatus::Working(label) => Some(("storage__status".to_string(), format!("{label}…"))),
        PanelStatus::Done(message) => Some((
            "storage__status storage__status--success".to_string(),
            message,
        )),
        PanelStatus::Error(message) => Some((
            "storage__status storage__status--error".to_string(),
            format!("⚠️ {message}"),
        )),
    };

    rsx! {
        section { class: "storage", id: "storage",
            h2 { {t!("storage-menu-title")} }

            div { class: "setting",
                div { class: "horizontal",
                    label { r#for: "apiPermissionGranted",
                        {t!("storage-enable-hosted-api")}
                        " "
                        a {
                            class: "help-link",
                            href: HOSTED_API_HELP_LINK,
                            target: "_blank",
                            rel: "noopener noreferrer",
                            {t!("storage-help-link")}
                        }
                    }
                    input {
                        r#type: "checkbox",
                        id: "apiPermissionGranted",
                        name: "apiPermissionGranted",
                        checked: current.api_permission_granted(),
                        disabled: busy(),
                        onchange: on_permission,
                    }
                }
                ExpandableTextBlock { lines_when_closed: 2, class: "fineprint",
                    {t!("storage-hosted-fineprint")}
                }
            }

            if sections.audit_log {
                div { class: "setting horizontal",
                    label { {t!("storage-audit-log-label")} }
                    a {
                        class: "button",
                        href: AUDIT_LOG_LINK,
                        target: "_blank",
                        rel: "noopener noreferrer",
                        {t!("storage-audit-log")}
                    }
                }
            }

            if sections.delete_all {
                div { class: "setting horizontal",
                    label { {t!("storage-delete-all-label")} }
                    button {
                        r#type: "button",
                        class: "button button--danger",
                        disabled: busy(),
                        onclick: on_delete,
                        {t!("storage-delete-all")}
                    }
                }
            }

            if sections.cloud_drive {
                div { class: "setting storage__cloud-drive",
                    h3 { {t!("storage-cloud-drive-title")} }
                    p { {t!("storage-cloud-drive-body")} }
                }
            }

            if sections.local_storage_details {
                p { class: "setting storage__usage", "{usage}" }
            }

            div { class: "setting storage__import-export",
                button {
                    r#type: "button",
                    class: "button button--primary",
                    disabled: busy(),
                    onclick: on_export,
                    {t!("storage-export")}
                }
                label { class: "button", r#for: "storage-import-file",
                    {t!("storage-import")}
                }
                input {
                    id: "storage-import-file",
                    class: "visually-hidden",
                    r#type: "file",
                    accept: ".json,application/json",
                    title: t!("storage-import-label"),
                    disabled: busy(),
                    onchange: on_import_file,
                }
            }

            if sections.legacy_import {
                div { class: "setting horizontal",
                    label { {t!("storage-legacy-import-label")} }
                    button {
                        r#type: "button",
                        class: "button",
                        disabled: busy(),
                        onclick: on_legacy_import,
                        {t!("storage-legacy-import")}
                    }
                }
            }

            if let Some((class_name, message)) = feedback {
                p { class: "{class_name}", "{message}" }
            }
        }
    }
}
