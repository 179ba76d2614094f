//! Structured context entries.
//!
//! An [`Entry`] is one semantically meaningful unit of JSON context pulled
//! out of the conversation: a tool-call output, a fenced ```json block, or
//! (in the superseded extractor variant) a whole message body.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use palaver_core::ids::MessageId;
use palaver_core::messages::Sender;

/// One structured JSON entry with provenance metadata.
///
/// The payload is always a JSON object — never a bare array or scalar.
/// Arrays of `{type: "text"}` items are unwrapped at extraction time, and
/// scalar payloads are rejected there, so the invariant holds by
/// construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// The JSON payload usable for path queries.
    pub json: Map<String, Value>,
    /// Logical timestamp: message creation time, or extraction time for
    /// live entries. Used for ordering only, never for eviction.
    pub time: DateTime<Utc>,
    /// Source message, when the entry came from a persisted message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<MessageId>,
    /// Sender role of the source message, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Sender>,
}

impl Entry {
    /// Create an entry tied to a persisted message.
    #[must_use]
    pub fn from_message(
        json: Map<String, Value>,
        time: DateTime<Utc>,
        message_id: MessageId,
        role: Sender,
    ) -> Self {
        Self {
            json,
            time,
            message_id: Some(message_id),
            role: Some(role),
        }
    }

    /// Create a synthetic entry (live tool result, no backing message).
    ///
    /// The timestamp is the extraction time.
    #[must_use]
    pub fn live(json: Map<String, Value>) -> Self {
        Self {
            json,
            time: Utc::now(),
            message_id: None,
            role: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn live_entry_has_no_provenance() {
        let entry = Entry::live(obj(json!({"k": 1})));
        assert!(entry.message_id.is_none());
        assert!(entry.role.is_none());
    }

    #[test]
    fn message_entry_keeps_provenance() {
        let entry = Entry::from_message(
            obj(json!({"k": 1})),
            Utc::now(),
            MessageId::from("m-1"),
            Sender::Assistant,
        );
        assert_eq!(entry.message_id.as_deref(), Some("m-1"));
        assert_eq!(entry.role, Some(Sender::Assistant));
    }

    #[test]
    fn serializes_camel_case() {
        let entry = Entry::from_message(
            obj(json!({})),
            Utc::now(),
            MessageId::from("m-2"),
            Sender::User,
        );
        let v = serde_json::to_value(&entry).unwrap();
        assert!(v.get("messageId").is_some());
        assert!(v.get("message_id").is_none());
    }
}
