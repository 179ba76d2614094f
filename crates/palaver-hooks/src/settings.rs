//! Hooks settings loading.
//!
//! Loading flow:
//! 1. Start with compiled [`HooksSettings::default()`]
//! 2. If the settings file exists, deep-merge its values over the defaults
//! 3. Substitute `${VAR}` environment references in string leaves
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::SettingsError;
use crate::types::HooksSettings;

/// Matches `${VAR}` environment references. `${{` is placeholder syntax,
/// not an environment reference, so a brace is excluded after the opener.
static ENV_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env-ref pattern is valid")
});

/// Resolve the path to the hooks settings file (`~/.palaver/hooks.json`).
#[must_use]
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_owned());
    PathBuf::from(home).join(".palaver").join("hooks.json")
}

/// Load settings from the default path with environment substitution.
pub fn load_settings() -> Result<HooksSettings, SettingsError> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with environment substitution.
///
/// A missing file yields the defaults. Invalid JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<HooksSettings, SettingsError> {
    let defaults = serde_json::to_value(HooksSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading hooks settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "hooks settings file not found, using defaults");
        defaults
    };

    let substituted = substitute_env(merged, &|name| std::env::var(name).ok());
    Ok(serde_json::from_value(substituted)?)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
#[must_use]
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Substitute `${VAR}` references in every string leaf of `value`.
///
/// The lookup is injected so tests never have to mutate the process
/// environment. An unresolvable reference is left verbatim and warned
/// about — a missing variable should be visible in the outgoing request,
/// not silently erased.
#[must_use]
pub fn substitute_env(value: Value, lookup: &impl Fn(&str) -> Option<String>) -> Value {
    match value {
        Value::String(s) => Value::String(substitute_env_str(&s, lookup)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|v| substitute_env(v, lookup))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, substitute_env(v, lookup)))
                .collect(),
        ),
        scalar => scalar,
    }
}

fn substitute_env_str(input: &str, lookup: &impl Fn(&str) -> Option<String>) -> String {
    ENV_REF
        .replace_all(input, |caps: &Captures<'_>| {
            let name = &caps[1];
            match lookup(name) {
                Some(value) => value,
                None => {
                    warn!(var = name, "environment variable not set, leaving reference verbatim");
                    caps[0].to_owned()
                }
            }
        })
        .into_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
