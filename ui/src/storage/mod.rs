//! Storage settings: which sync backend is active and the import, export and
//! delete flows that run against it.
//!
//! Two backends exist side by side. The legacy sync service keeps a single
//! JSON document (locally, optionally mirrored to a cloud drive). The hosted
//! API is opt-in: it must be enabled by [`FeatureFlags`](crate::core::config::FeatureFlags)
//! *and* granted by the user. Both sit behind traits so the panel logic can
//! be driven by in-memory fakes.

mod backend;
pub use backend::{HostedApi, LegacySync, Prompter};

mod error;
pub use error::StorageError;

mod local;
pub use local::{LocalSync, LEGACY_SYNC_KEY};

mod memory;
pub use memory::{BackendCall, MemoryBackend};

mod settings;
pub use settings::{
    ActiveBackend, DeleteOutcome, ImportOutcome, Notice, PanelSections, StorageSettings,
};

mod stats;
pub use stats::{data_stats, DataStats, StatKind};
