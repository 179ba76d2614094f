//! JSON root construction.
//!
//! The root document for path evaluation is the ordered array of entry
//! payloads: index `0` is the earliest entry, `-1` (in path syntax) the
//! most recent. It is rebuilt on every evaluation call — the build is
//! cheap and must always reflect the freshest entry list.

use serde_json::Value;

use crate::entry::Entry;

/// Flatten an ordered entry list into the array-rooted query document.
#[must_use]
pub fn build_json_root(entries: &[Entry]) -> Value {
    Value::Array(
        entries
            .iter()
            .map(|entry| Value::Object(entry.json.clone()))
            .collect(),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};

    fn entry(key: &str, value: i64) -> Entry {
        let mut map = Map::new();
        let _ = map.insert(key.to_owned(), Value::from(value));
        Entry::live(map)
    }

    #[test]
    fn empty_entries_build_empty_array() {
        assert_eq!(build_json_root(&[]), json!([]));
    }

    #[test]
    fn order_is_preserved_and_nothing_dropped() {
        let root = build_json_root(&[entry("a", 1), entry("b", 2), entry("c", 3)]);
        assert_eq!(root, json!([{"a": 1}, {"b": 2}, {"c": 3}]));
    }
}
