//! Runtime feature flags.
//!
//! Defaults come from cargo features; a JSON object stored under
//! [`FLAGS_KEY`] overrides individual fields, e.g. `{"hosted_api": true}`.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::kv::KeyValueStore;

/// Key-value entry holding flag overrides.
pub const FLAGS_KEY: &str = "vaultkeep-flags";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// The hosted sync API can be enabled by the user.
    pub hosted_api: bool,
}

impl FeatureFlags {
    /// Flags as compiled, with no overrides.
    pub fn compiled() -> Self {
        Self {
            hosted_api: cfg!(feature = "hosted-api"),
        }
    }

    /// Parse an override object; absent fields keep their compiled value.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Compiled flags merged with whatever override is stored. Any failure
    /// falls back to the compiled flags.
    pub fn load() -> Self {
        match KeyValueStore::open_default() {
            Ok(store) => Self::load_from(&store),
            Err(err) => {
                warn!("feature flag store unavailable ({err}); using compiled flags");
                Self::compiled()
            }
        }
    }

    pub fn load_from(store: &KeyValueStore) -> Self {
        match store.read(FLAGS_KEY) {
            Ok(Some(raw)) => Self::from_json(&raw).unwrap_or_else(|err| {
                warn!("ignoring malformed `{FLAGS_KEY}` override: {err}");
                Self::compiled()
            }),
            Ok(None) => Self::compiled(),
            Err(err) => {
                warn!("reading `{FLAGS_KEY}` failed ({err}); using compiled flags");
                Self::compiled()
            }
        }
    }
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self::compiled()
    }
}
