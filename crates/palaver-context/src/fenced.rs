//! Lexical scan for fenced ```json code blocks.
//!
//! This is deliberately a dumb scan: it finds candidate block bodies in
//! left-to-right order and leaves JSON validation to the caller, so the two
//! steps stay independently testable.

use std::sync::LazyLock;

use regex::Regex;

/// Matches ```json … ``` blocks: case-insensitive, multi-line, non-greedy.
static FENCED_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)```json\s*(.*?)```").expect("fenced-block pattern is valid")
});

/// Extract the bodies of all fenced ```json blocks in `text`.
///
/// Blocks are returned in source order with surrounding whitespace trimmed.
/// No JSON parsing happens here — bodies may be malformed.
#[must_use]
pub fn fenced_json_blocks(text: &str) -> Vec<String> {
    FENCED_JSON
        .captures_iter(text)
        .map(|caps| caps[1].trim().to_owned())
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
