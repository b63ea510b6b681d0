//! Counts shown to the user before a legacy import overwrites their data.
//!
//! Document layout read here:
//! - `"loadouts-v3.0"`: array of loadout ids; each id keys an object whose
//!   `destinyVersion` is `1` or `2` (missing means `1`)
//! - `"dimItemInfo-<account>-d1"` / `"...-d2"`: maps of item tags and notes
//! - `"settings-v1.0"`: the settings block
//! - `"ignoredUsers"`: array of ignored user ids

use serde::Serialize;
use serde_json::Value;

const LOADOUT_INDEX_KEY: &str = "loadouts-v3.0";
const ITEM_INFO_PREFIX: &str = "dimItemInfo-";
const SETTINGS_KEY: &str = "settings-v1.0";
const IGNORED_USERS_KEY: &str = "ignoredUsers";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    LoadoutsD1,
    LoadoutsD2,
    TagNotesD1,
    TagNotesD2,
    Settings,
    IgnoredUsers,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DataStats {
    pub loadouts_d1: usize,
    pub loadouts_d2: usize,
    pub tag_notes_d1: usize,
    pub tag_notes_d2: usize,
    pub settings: usize,
    pub ignored_users: usize,
}

impl DataStats {
    pub fn entries(&self) -> [(StatKind, usize); 6] {
        [
            (StatKind::LoadoutsD1, self.loadouts_d1),
            (StatKind::LoadoutsD2, self.loadouts_d2),
            (StatKind::TagNotesD1, self.tag_notes_d1),
            (StatKind::TagNotesD2, self.tag_notes_d2),
            (StatKind::Settings, self.settings),
            (StatKind::IgnoredUsers, self.ignored_users),
        ]
    }

    /// Entries worth mentioning, in display order.
    pub fn non_zero(&self) -> impl Iterator<Item = (StatKind, usize)> {
        self.entries().into_iter().filter(|(_, count)| *count > 0)
    }

    pub fn is_empty(&self) -> bool {
        self.non_zero().next().is_none()
    }
}

pub fn data_stats(data: &Value) -> DataStats {
    let Some(doc) = data.as_object() else {
        return DataStats::default();
    };

    let mut stats = DataStats::default();

    let loadout_ids = doc
        .get(LOADOUT_INDEX_KEY)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str);
    for id in loadout_ids {
        let Some(loadout) = doc.get(id).and_then(Value::as_object) else {
            continue;
        };
        match loadout.get("destinyVersion").and_then(Value::as_u64) {
            Some(2) => stats.loadouts_d2 += 1,
            _ => stats.loadouts_d1 += 1,
        }
    }

    for (key, value) in doc.iter().filter(|(k, _)| k.starts_with(ITEM_INFO_PREFIX)) {
        let count = value.as_object().map_or(0, |infos| infos.len());
        if key.ends_with("-d2") {
            stats.tag_notes_d2 += count;
        } else if key.ends_with("-d1") {
            stats.tag_notes_d1 += count;
        }
    }

    if doc.contains_key(SETTINGS_KEY) {
        stats.settings = 1;
    }

    stats.ignored_users = doc
        .get(IGNORED_USERS_KEY)
        .and_then(Value::as_array)
        .map_or(0, Vec::len);

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn counts_a_full_document() {
        let doc = json!({
            "loadouts-v3.0": ["a", "b", "c", "dangling"],
            "a": { "name": "Raid", "destinyVersion": 2 },
            "b": { "name": "Crucible", "destinyVersion": 1 },
            "c": { "name": "Old" },
            "dimItemInfo-m4611686018-d2": {
                "6917529": { "tag": "favorite" },
                "6917530": { "notes": "god roll" }
            },
            "dimItemInfo-m4611686018-d1": { "1": { "tag": "junk" } },
            "dimItemInfo-m4611686018-d3": { "1": { "tag": "junk" } },
            "settings-v1.0": { "itemSize": 50 },
            "ignoredUsers": ["x", "y", "z"]
        });

        assert_eq!(
            data_stats(&doc),
            DataStats {
                loadouts_d1: 2,
                loadouts_d2: 1,
                tag_notes_d1: 1,
                tag_notes_d2: 2,
                settings: 1,
                ignored_users: 3,
            }
        );
    }

    #[test]
    fn non_object_documents_are_empty() {
        assert!(data_stats(&json!(null)).is_empty());
        assert!(data_stats(&json!([1, 2, 3])).is_empty());
        assert!(data_stats(&json!({})).is_empty());
    }

    #[test]
    fn non_zero_skips_missing_categories() {
        let stats = DataStats {
            loadouts_d2: 4,
            ignored_users: 1,
            ..DataStats::default()
        };
        let kinds: Vec<_> = stats.non_zero().collect();
        assert_eq!(
            kinds,
            vec![(StatKind::LoadoutsD2, 4), (StatKind::IgnoredUsers, 1)]
        );
    }
}
