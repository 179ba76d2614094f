//! Message types for the Palaver conversation model.
//!
//! A [`ChatMessage`] is one persisted message: free text, an ordered list of
//! typed content parts, and provenance metadata. Content parts cover plain
//! text and tool calls; unknown part types are tolerated on deserialize so
//! the extractor can walk histories written by newer platform versions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{MessageId, ToolCallId};

// ─────────────────────────────────────────────────────────────────────────────
// Sender
// ─────────────────────────────────────────────────────────────────────────────

/// Role of a message sender.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// A human user.
    User,
    /// The assistant.
    Assistant,
    /// Platform-generated message.
    System,
    /// A tool result persisted as its own message.
    Tool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Content parts
// ─────────────────────────────────────────────────────────────────────────────

/// Nested function payload of a tool call.
///
/// Mirrors the wire shape some providers use, where the call details and
/// output live under a `function` key rather than on the part itself.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Tool name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Tool arguments (JSON).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
    /// Tool output, when the call has completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
}

/// One typed content part of a message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text.
    Text {
        /// The text content.
        text: String,
    },
    /// A tool invocation, possibly carrying its output.
    ToolCall {
        /// Tool call ID.
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<ToolCallId>,
        /// Tool name (flat wire shape).
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        /// Nested call payload (provider wire shape).
        #[serde(skip_serializing_if = "Option::is_none")]
        function: Option<FunctionCall>,
        /// Tool output (flat wire shape).
        #[serde(skip_serializing_if = "Option::is_none")]
        output: Option<Value>,
    },
    /// Any part type this version does not model.
    #[serde(other)]
    Other,
}

impl ContentPart {
    /// Create a text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create a completed tool call part with a flat string output.
    #[must_use]
    pub fn tool_call_with_output(name: impl Into<String>, output: impl Into<String>) -> Self {
        Self::ToolCall {
            id: Some(ToolCallId::new()),
            name: Some(name.into()),
            function: None,
            output: Some(Value::String(output.into())),
        }
    }

    /// Resolve the output string of a tool call part.
    ///
    /// Location is decided first (`function.output` wins over `output`),
    /// then the located value must be a JSON string — a non-string value in
    /// the preferred location does not fall through to the other one.
    /// Returns `None` for non-tool-call parts.
    #[must_use]
    pub fn tool_output_str(&self) -> Option<&str> {
        let Self::ToolCall {
            function, output, ..
        } = self
        else {
            return None;
        };
        let located = function
            .as_ref()
            .and_then(|f| f.output.as_ref())
            .or(output.as_ref())?;
        located.as_str()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ChatMessage
// ─────────────────────────────────────────────────────────────────────────────

/// One persisted chat message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Identifier of this message.
    pub message_id: MessageId,
    /// Sender role.
    pub sender: Sender,
    /// Free-text body, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Ordered typed content parts.
    #[serde(default)]
    pub content: Vec<ContentPart>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a text-only message from the given sender.
    #[must_use]
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            message_id: MessageId::new(),
            sender,
            text: Some(text.into()),
            content: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Create a user message.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    /// Create an assistant message.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, text)
    }

    /// Attach content parts, builder-style.
    #[must_use]
    pub fn with_content(mut self, content: Vec<ContentPart>) -> Self {
        self.content = content;
        self
    }

    /// Concatenated text of all text content parts, in order.
    #[must_use]
    pub fn joined_part_text(&self) -> String {
        let mut out = String::new();
        for part in &self.content {
            if let ContentPart::Text { text } = part {
                out.push_str(text);
            }
        }
        out
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
