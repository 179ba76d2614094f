//! `${{ … }}` placeholder evaluation.
//!
//! [`evaluate_placeholders`] recursively rewrites a value, replacing every
//! `${{ expr }}` marker inside strings with the result of a JSONPath query
//! over the entry list's JSON root. Two substitution modes:
//!
//! - **Whole-string**: a string that is exactly one placeholder (after
//!   trimming) yields the raw query result with its native type — the only
//!   path by which non-string values are produced.
//! - **Embedded**: placeholders inside a larger string are stringified in
//!   place. A missing result renders as the empty string, string results
//!   are inserted verbatim, anything else is JSON-encoded.
//!
//! Backslash escapes (`\${{` and `\$`) are masked with sentinel tokens
//! before scanning and restored verbatim afterwards, so escaped sequences
//! are never evaluated.
//!
//! Bad expressions never escape: a failed parse or query logs a warning
//! and evaluates to nothing.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;
use serde_json_path::JsonPath;
use tracing::warn;

use crate::entry::Entry;
use crate::root::build_json_root;

/// Sentinel for an escaped `\${{` sequence. Private-use codepoints keep it
/// out of any realistic template text.
const ESC_OPEN: &str = "\u{e000}plv-esc-open\u{e000}";
/// Sentinel for an escaped `\$`.
const ESC_DOLLAR: &str = "\u{e000}plv-esc-dollar\u{e000}";

/// A string that is exactly one placeholder.
static WHOLE_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\$\{\{(.+?)\}\}$").expect("whole-placeholder pattern is valid")
});

/// A placeholder occurring anywhere inside a string.
static EMBEDDED_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\$\{\{(.+?)\}\}").expect("embedded-placeholder pattern is valid")
});

/// Recursively evaluate all placeholders in `value` against `entries`.
///
/// Arrays and objects are rewritten shape-preserving; non-string scalars
/// and nulls pass through unchanged. The JSON root is rebuilt from the
/// entry list on every call.
#[must_use]
pub fn evaluate_placeholders(value: &Value, entries: &[Entry]) -> Value {
    let root = build_json_root(entries);
    rewrite(value, &root)
}

fn rewrite(value: &Value, root: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(|v| rewrite(v, root)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), rewrite(v, root)))
                .collect(),
        ),
        Value::String(s) => substitute(s, root),
        Value::Null | Value::Bool(_) | Value::Number(_) => value.clone(),
    }
}

/// Apply the string substitution rule.
fn substitute(input: &str, root: &Value) -> Value {
    // Step 1: mask escapes so they are not mistaken for placeholder syntax.
    // `\${{` must be handled before `\$`, which is its prefix.
    let masked = input.replace(r"\${{", ESC_OPEN).replace(r"\$", ESC_DOLLAR);

    // Step 2: whole-string placeholder — type-preserving.
    if let Some(caps) = WHOLE_PLACEHOLDER.captures(masked.trim()) {
        let expr = normalize_expression(caps[1].trim());
        // A failed or empty-match query yields null here; Value::Null is
        // the faithful carrier for "no result" in whole-string position.
        return safe_eval(&expr, root).unwrap_or(Value::Null);
    }

    // Step 3: embedded placeholders — stringifying.
    let replaced = EMBEDDED_PLACEHOLDER.replace_all(&masked, |caps: &Captures<'_>| {
        let expr = normalize_expression(caps[1].trim());
        match safe_eval(&expr, root) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s,
            Some(other) => serde_json::to_string(&other).unwrap_or_else(|_| other.to_string()),
        }
    });

    // Step 4: restore escapes last, so they were never candidates above.
    Value::String(
        replaced
            .replace(ESC_OPEN, "${{")
            .replace(ESC_DOLLAR, "$"),
    )
}

/// Root any plain expression at the JSON root array.
///
/// Expressions already starting with `$` pass through. A bracket start
/// gets a bare `$` prefix; a bare key gets `$.` so the result is valid
/// path syntax.
fn normalize_expression(expr: &str) -> String {
    if expr.starts_with('$') {
        expr.to_owned()
    } else if expr.starts_with('[') {
        format!("${expr}")
    } else {
        format!("$.{expr}")
    }
}

/// Evaluate one path expression against the root, never panicking.
///
/// The engine returns a wrapped node list. A list of exactly one node
/// unwraps to that node's value; any other length (0 or ≥2) is returned
/// as an array. Parse failures log a warning and yield `None`.
fn safe_eval(expr: &str, root: &Value) -> Option<Value> {
    let path = match JsonPath::parse(expr) {
        Ok(path) => path,
        Err(error) => {
            warn!(expr = %expr, %error, "invalid placeholder expression");
            return None;
        }
    };
    let nodes = path.query(root).all();
    if nodes.len() == 1 {
        Some(nodes[0].clone())
    } else {
        Some(Value::Array(nodes.into_iter().cloned().collect()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
