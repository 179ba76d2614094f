//! Entry extraction from chat messages and tool results.
//!
//! One message can yield any number of [`Entry`] values. All rules apply to
//! every message, in a fixed order:
//!
//! 1. **Tool-call outputs** — each tool-call part's output string is parsed
//!    as JSON. Arrays of `{type: "text"}` items are unwrapped by parsing
//!    each item's `text`; an array where no item parses is kept whole,
//!    wrapped under an `items` key so the object-payload invariant holds.
//! 2. **Fenced blocks** — every ```json block in the message text, then in
//!    each text content part, in source order. Objects only.
//! 3. **Whole-text fallback** — a superseded extractor variant, off by
//!    default: the full message text (or concatenated text parts) parsed
//!    directly. When enabled it replaces the message-level fenced scan but
//!    not the per-part scans.
//!
//! Malformed JSON is never an error here. Every decision — added or
//! skipped, and why — is recorded as an [`ExtractEvent`] so callers and
//! tests can observe the reasons; the events have no behavioral effect.

use serde_json::{Map, Value};
use tracing::debug;

use palaver_core::json::JsonShape;
use palaver_core::messages::{ChatMessage, ContentPart};

use crate::entry::Entry;
use crate::fenced::fenced_json_blocks;

// ─────────────────────────────────────────────────────────────────────────────
// Diagnostics
// ─────────────────────────────────────────────────────────────────────────────

/// Where a candidate payload came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtractSource {
    /// A tool-call part's output string.
    ToolCallOutput,
    /// One `{type: "text"}` item inside a tool-call output array.
    ToolCallTextItem,
    /// A fenced ```json block in message text or a text part.
    FencedBlock,
    /// Whole-message text (superseded variant).
    WholeText,
}

/// Why a candidate payload was not turned into an entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Tool-call part had no output, or the output was not a string.
    MissingOutput,
    /// The candidate did not parse as JSON.
    InvalidJson,
    /// The candidate parsed to a scalar, which cannot be an entry payload.
    NotAnObject,
    /// The candidate parsed to an array where only objects are accepted.
    ArrayRejected,
    /// There was no text to parse.
    EmptyText,
}

/// One extraction decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtractEvent {
    /// A payload became an entry.
    Added {
        /// Where the payload came from.
        source: ExtractSource,
    },
    /// A candidate was dropped.
    Skipped {
        /// Where the candidate came from.
        source: ExtractSource,
        /// Why it was dropped.
        reason: SkipReason,
    },
}

/// Extractor output: the entries plus the decisions that produced them.
#[derive(Clone, Debug, Default)]
pub struct Extraction {
    /// Extracted entries, in extraction order.
    pub entries: Vec<Entry>,
    /// One event per extraction decision, in order.
    pub events: Vec<ExtractEvent>,
}

impl Extraction {
    /// Number of entries produced.
    #[must_use]
    pub fn added(&self) -> usize {
        self.entries.len()
    }

    /// Number of candidates skipped.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, ExtractEvent::Skipped { .. }))
            .count()
    }
}

/// Extractor configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtractOptions {
    /// Parse whole-message text directly instead of scanning it for fenced
    /// blocks. Superseded by tool-call output extraction; kept for
    /// histories written by the earlier platform version.
    pub whole_text_fallback: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Extraction
// ─────────────────────────────────────────────────────────────────────────────

/// Extract all entries from one persisted chat message.
#[must_use]
pub fn extract_from_message(message: &ChatMessage, options: ExtractOptions) -> Extraction {
    let mut out = Extraction::default();
    let attach = |json: Map<String, Value>| {
        Entry::from_message(
            json,
            message.created_at,
            message.message_id.clone(),
            message.sender,
        )
    };

    // Rule 1: tool-call outputs, in part order.
    for part in &message.content {
        if let ContentPart::ToolCall { .. } = part {
            match part.tool_output_str() {
                Some(output) => collect_tool_output(output, &attach, &mut out),
                None => out.events.push(ExtractEvent::Skipped {
                    source: ExtractSource::ToolCallOutput,
                    reason: SkipReason::MissingOutput,
                }),
            }
        }
    }

    // Rule 2 / rule 3 at the whole-message level.
    let text = message.text.as_deref().unwrap_or("");
    if options.whole_text_fallback {
        let body = if text.trim().is_empty() {
            message.joined_part_text()
        } else {
            text.to_owned()
        };
        collect_whole_text(&body, &attach, &mut out);
    } else {
        collect_fenced(text, &attach, &mut out);
    }

    // Rule 2 per text part, after the message-level pass.
    for part in &message.content {
        if let ContentPart::Text { text } = part {
            collect_fenced(text, &attach, &mut out);
        }
    }

    debug!(
        message_id = %message.message_id,
        added = out.added(),
        skipped = out.skipped(),
        "message extraction complete"
    );
    out
}

/// Extract entries from a live tool result that has not been persisted yet.
///
/// A string result is parsed as JSON; any other value is shape-decoded
/// directly. The same unwrap rules as persisted tool-call outputs apply.
/// Resulting entries are synthetic: no message ID, no role.
#[must_use]
pub fn extract_from_tool_result(result: &Value) -> Extraction {
    let mut out = Extraction::default();
    match result {
        Value::String(raw) => collect_tool_output(raw, &Entry::live, &mut out),
        other => collect_parsed_output(JsonShape::from_value(other.clone()), &Entry::live, &mut out),
    }
    debug!(
        added = out.added(),
        skipped = out.skipped(),
        "live tool result extraction complete"
    );
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Rule helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Rule 1: parse a tool output string and collect its entries.
fn collect_tool_output(
    output: &str,
    attach: &impl Fn(Map<String, Value>) -> Entry,
    out: &mut Extraction,
) {
    match JsonShape::parse(output) {
        Ok(shape) => collect_parsed_output(shape, attach, out),
        Err(error) => {
            debug!(%error, "tool output is not JSON, skipping");
            out.events.push(ExtractEvent::Skipped {
                source: ExtractSource::ToolCallOutput,
                reason: SkipReason::InvalidJson,
            });
        }
    }
}

/// Shape dispatch for a parsed tool output.
fn collect_parsed_output(
    shape: JsonShape,
    attach: &impl Fn(Map<String, Value>) -> Entry,
    out: &mut Extraction,
) {
    match shape {
        JsonShape::Object(map) => {
            out.entries.push(attach(map));
            out.events.push(ExtractEvent::Added {
                source: ExtractSource::ToolCallOutput,
            });
        }
        JsonShape::Array(items) => collect_text_item_array(items, attach, out),
        JsonShape::Scalar(_) => out.events.push(ExtractEvent::Skipped {
            source: ExtractSource::ToolCallOutput,
            reason: SkipReason::NotAnObject,
        }),
    }
}

/// Unwrap an array of `{type: "text", text: "…"}` items.
///
/// Each item's `text` is itself JSON-parsed; each object result is one
/// entry. When no item yields one, the whole array is kept as a single
/// entry wrapped under an `items` key (entry payloads must be objects).
fn collect_text_item_array(
    items: Vec<Value>,
    attach: &impl Fn(Map<String, Value>) -> Entry,
    out: &mut Extraction,
) {
    let mut inner_added = 0usize;
    let mut inner_events = Vec::new();

    for item in &items {
        let Some(text) = item
            .as_object()
            .filter(|obj| obj.get("type").and_then(Value::as_str) == Some("text"))
            .and_then(|obj| obj.get("text"))
            .and_then(Value::as_str)
        else {
            continue;
        };
        match JsonShape::parse(text) {
            Ok(JsonShape::Object(map)) => {
                out.entries.push(attach(map));
                inner_events.push(ExtractEvent::Added {
                    source: ExtractSource::ToolCallTextItem,
                });
                inner_added += 1;
            }
            Ok(JsonShape::Array(_) | JsonShape::Scalar(_)) => {
                inner_events.push(ExtractEvent::Skipped {
                    source: ExtractSource::ToolCallTextItem,
                    reason: SkipReason::NotAnObject,
                });
            }
            Err(_) => inner_events.push(ExtractEvent::Skipped {
                source: ExtractSource::ToolCallTextItem,
                reason: SkipReason::InvalidJson,
            }),
        }
    }

    if inner_added == 0 {
        // Nothing unwrapped: keep the array whole as one entry.
        let mut map = Map::new();
        let _ = map.insert("items".to_owned(), Value::Array(items));
        out.entries.push(attach(map));
        out.events.push(ExtractEvent::Added {
            source: ExtractSource::ToolCallOutput,
        });
    }
    out.events.extend(inner_events);
}

/// Rule 2: collect entries from every fenced ```json block in `text`.
fn collect_fenced(text: &str, attach: &impl Fn(Map<String, Value>) -> Entry, out: &mut Extraction) {
    for block in fenced_json_blocks(text) {
        match JsonShape::parse(&block) {
            Ok(JsonShape::Object(map)) => {
                out.entries.push(attach(map));
                out.events.push(ExtractEvent::Added {
                    source: ExtractSource::FencedBlock,
                });
            }
            Ok(JsonShape::Array(_)) => out.events.push(ExtractEvent::Skipped {
                source: ExtractSource::FencedBlock,
                reason: SkipReason::ArrayRejected,
            }),
            Ok(JsonShape::Scalar(_)) => out.events.push(ExtractEvent::Skipped {
                source: ExtractSource::FencedBlock,
                reason: SkipReason::NotAnObject,
            }),
            Err(_) => out.events.push(ExtractEvent::Skipped {
                source: ExtractSource::FencedBlock,
                reason: SkipReason::InvalidJson,
            }),
        }
    }
}

/// Rule 3 (superseded variant): parse the whole message body as JSON.
fn collect_whole_text(
    body: &str,
    attach: &impl Fn(Map<String, Value>) -> Entry,
    out: &mut Extraction,
) {
    if body.trim().is_empty() {
        out.events.push(ExtractEvent::Skipped {
            source: ExtractSource::WholeText,
            reason: SkipReason::EmptyText,
        });
        return;
    }
    match JsonShape::parse(body) {
        Ok(JsonShape::Object(map)) => {
            out.entries.push(attach(map));
            out.events.push(ExtractEvent::Added {
                source: ExtractSource::WholeText,
            });
        }
        Ok(JsonShape::Array(_)) => out.events.push(ExtractEvent::Skipped {
            source: ExtractSource::WholeText,
            reason: SkipReason::ArrayRejected,
        }),
        Ok(JsonShape::Scalar(_)) => out.events.push(ExtractEvent::Skipped {
            source: ExtractSource::WholeText,
            reason: SkipReason::NotAnObject,
        }),
        Err(_) => out.events.push(ExtractEvent::Skipped {
            source: ExtractSource::WholeText,
            reason: SkipReason::InvalidJson,
        }),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use palaver_core::messages::{ChatMessage, ContentPart};

    fn msg_with_parts(parts: Vec<ContentPart>) -> ChatMessage {
        ChatMessage::assistant("").with_content(parts)
    }

    fn payloads(extraction: &Extraction) -> Vec<Value> {
        extraction
            .entries
            .iter()
            .map(|e| Value::Object(e.json.clone()))
            .collect()
    }

    // -- rule 1: tool-call outputs --

    #[test]
    fn object_output_is_one_entry() {
        let msg = msg_with_parts(vec![ContentPart::tool_call_with_output(
            "lookup",
            r#"{"k": 1}"#,
        )]);
        let result = extract_from_message(&msg, ExtractOptions::default());
        assert_eq!(payloads(&result), vec![json!({"k": 1})]);
        assert_eq!(result.entries[0].role, Some(palaver_core::messages::Sender::Assistant));
    }

    #[test]
    fn text_item_array_is_unwrapped() {
        let output = r#"[{"type":"text","text":"{\"k\":1}"}]"#;
        let msg = msg_with_parts(vec![ContentPart::tool_call_with_output("t", output)]);
        let result = extract_from_message(&msg, ExtractOptions::default());
        // Exactly one entry with the inner payload, not the enclosing array.
        assert_eq!(payloads(&result), vec![json!({"k": 1})]);
    }

    #[test]
    fn text_item_array_with_multiple_items() {
        let output = r#"[
            {"type":"text","text":"{\"a\":1}"},
            {"type":"text","text":"{\"b\":2}"}
        ]"#;
        let msg = msg_with_parts(vec![ContentPart::tool_call_with_output("t", output)]);
        let result = extract_from_message(&msg, ExtractOptions::default());
        assert_eq!(payloads(&result), vec![json!({"a": 1}), json!({"b": 2})]);
    }

    #[test]
    fn array_without_parsable_items_is_wrapped_whole() {
        let output = r#"[{"type":"text","text":"not json"}, {"type":"image"}]"#;
        let msg = msg_with_parts(vec![ContentPart::tool_call_with_output("t", output)]);
        let result = extract_from_message(&msg, ExtractOptions::default());
        assert_eq!(result.entries.len(), 1);
        assert!(result.entries[0].json.contains_key("items"));
        assert!(result.events.contains(&ExtractEvent::Skipped {
            source: ExtractSource::ToolCallTextItem,
            reason: SkipReason::InvalidJson,
        }));
    }

    #[test]
    fn missing_output_is_skipped_with_reason() {
        let msg = msg_with_parts(vec![ContentPart::ToolCall {
            id: None,
            name: Some("pending".into()),
            function: None,
            output: None,
        }]);
        let result = extract_from_message(&msg, ExtractOptions::default());
        assert!(result.entries.is_empty());
        assert_eq!(
            result.events,
            vec![ExtractEvent::Skipped {
                source: ExtractSource::ToolCallOutput,
                reason: SkipReason::MissingOutput,
            }]
        );
    }

    #[test]
    fn non_json_output_is_skipped_silently() {
        let msg = msg_with_parts(vec![ContentPart::tool_call_with_output("t", "plain prose")]);
        let result = extract_from_message(&msg, ExtractOptions::default());
        assert!(result.entries.is_empty());
        assert_eq!(result.skipped(), 1);
    }

    #[test]
    fn scalar_output_is_rejected() {
        let msg = msg_with_parts(vec![ContentPart::tool_call_with_output("t", "42")]);
        let result = extract_from_message(&msg, ExtractOptions::default());
        assert!(result.entries.is_empty());
        assert_eq!(
            result.events,
            vec![ExtractEvent::Skipped {
                source: ExtractSource::ToolCallOutput,
                reason: SkipReason::NotAnObject,
            }]
        );
    }

    // -- rule 2: fenced blocks --

    #[test]
    fn fenced_blocks_preserve_order() {
        let mut msg = ChatMessage::user("");
        msg.text = Some(
            "```json\n{\"first\": 1}\n```\ntext\n```json\n{\"second\": 2}\n```".to_owned(),
        );
        let result = extract_from_message(&msg, ExtractOptions::default());
        assert_eq!(payloads(&result), vec![json!({"first": 1}), json!({"second": 2})]);
    }

    #[test]
    fn fenced_array_is_rejected() {
        let mut msg = ChatMessage::user("");
        msg.text = Some("```json\n[1, 2]\n```".to_owned());
        let result = extract_from_message(&msg, ExtractOptions::default());
        assert!(result.entries.is_empty());
        assert_eq!(
            result.events,
            vec![ExtractEvent::Skipped {
                source: ExtractSource::FencedBlock,
                reason: SkipReason::ArrayRejected,
            }]
        );
    }

    #[test]
    fn message_text_blocks_come_before_part_blocks() {
        let mut msg = msg_with_parts(vec![ContentPart::text("```json\n{\"part\": 1}\n```")]);
        msg.text = Some("```json\n{\"message\": 1}\n```".to_owned());
        let result = extract_from_message(&msg, ExtractOptions::default());
        assert_eq!(payloads(&result), vec![json!({"message": 1}), json!({"part": 1})]);
    }

    #[test]
    fn tool_outputs_come_before_fenced_blocks() {
        let mut msg = msg_with_parts(vec![
            ContentPart::text("```json\n{\"fenced\": 1}\n```"),
            ContentPart::tool_call_with_output("t", r#"{"tool": 1}"#),
        ]);
        msg.text = None;
        let result = extract_from_message(&msg, ExtractOptions::default());
        // Tool output first even though the text part appears earlier.
        assert_eq!(payloads(&result), vec![json!({"tool": 1}), json!({"fenced": 1})]);
    }

    // -- rule 3: whole-text fallback --

    #[test]
    fn whole_text_variant_parses_message_body() {
        let msg = ChatMessage::user(r#"{"whole": true}"#);
        let opts = ExtractOptions {
            whole_text_fallback: true,
        };
        let result = extract_from_message(&msg, opts);
        assert_eq!(payloads(&result), vec![json!({"whole": true})]);
    }

    #[test]
    fn whole_text_variant_suppresses_message_level_fenced_scan_only() {
        let mut msg = msg_with_parts(vec![ContentPart::text("```json\n{\"part\": 1}\n```")]);
        msg.text = Some("```json\n{\"message\": 1}\n```".to_owned());
        let opts = ExtractOptions {
            whole_text_fallback: true,
        };
        let result = extract_from_message(&msg, opts);
        // Message text fails direct JSON parse; the part-level scan still runs.
        assert_eq!(payloads(&result), vec![json!({"part": 1})]);
    }

    #[test]
    fn whole_text_variant_concatenates_parts_when_text_empty() {
        let mut msg = msg_with_parts(vec![
            ContentPart::text(r#"{"joined":"#),
            ContentPart::text(" 1}"),
        ]);
        msg.text = None;
        let opts = ExtractOptions {
            whole_text_fallback: true,
        };
        let result = extract_from_message(&msg, opts);
        assert_eq!(payloads(&result), vec![json!({"joined": 1})]);
    }

    #[test]
    fn whole_text_variant_empty_body_skips() {
        let mut msg = ChatMessage::user("");
        msg.text = None;
        let opts = ExtractOptions {
            whole_text_fallback: true,
        };
        let result = extract_from_message(&msg, opts);
        assert!(result.entries.is_empty());
        assert!(result.events.contains(&ExtractEvent::Skipped {
            source: ExtractSource::WholeText,
            reason: SkipReason::EmptyText,
        }));
    }

    // -- live tool results --

    #[test]
    fn live_string_result_is_parsed() {
        let result = extract_from_tool_result(&json!(r#"{"live": 1}"#));
        assert_eq!(payloads(&result), vec![json!({"live": 1})]);
        assert!(result.entries[0].message_id.is_none());
    }

    #[test]
    fn live_object_result_is_taken_directly() {
        let result = extract_from_tool_result(&json!({"direct": true}));
        assert_eq!(payloads(&result), vec![json!({"direct": true})]);
    }

    #[test]
    fn live_text_item_array_unwraps() {
        let result =
            extract_from_tool_result(&json!([{"type": "text", "text": "{\"k\":1}"}]));
        assert_eq!(payloads(&result), vec![json!({"k": 1})]);
    }

    #[test]
    fn live_scalar_is_rejected() {
        let result = extract_from_tool_result(&json!(17));
        assert!(result.entries.is_empty());
        assert_eq!(result.skipped(), 1);
    }
}
