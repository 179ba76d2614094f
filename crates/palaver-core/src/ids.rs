//! Branded ID newtypes for type safety.
//!
//! Every entity in the Palaver system has a distinct ID type implemented as
//! a newtype wrapper around `String`. This prevents accidentally passing a
//! conversation ID where a run ID is expected.
//!
//! Generated IDs are UUID v7 (time-ordered) via [`uuid::Uuid::now_v7`].

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Generate a new UUID v7 string (time-ordered).
fn new_v7() -> String {
    Uuid::now_v7().to_string()
}

macro_rules! branded_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new random ID (UUID v7, time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(new_v7())
            }

            /// Create from an existing string value.
            #[must_use]
            pub fn from_string(s: String) -> Self {
                Self(s)
            }

            /// Return the inner string as a slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

branded_id! {
    /// Unique identifier for a conversation.
    ConversationId
}

branded_id! {
    /// Unique identifier for one agent run (turn) within a conversation.
    RunId
}

branded_id! {
    /// Unique identifier for a persisted message.
    MessageId
}

branded_id! {
    /// Unique identifier for a tool call within a run.
    ToolCallId
}

/// Sentinel run value used when a caller has no active run.
pub const NO_RUN: &str = "no-run";

impl RunId {
    /// The sentinel "no active run" value.
    ///
    /// Runtime-cache keys always carry a run component; callers without a
    /// run use this sentinel so their entries still share one cache slot.
    #[must_use]
    pub fn none() -> Self {
        Self(NO_RUN.to_owned())
    }

    /// Returns `true` if this is the sentinel "no run" value.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.0 == NO_RUN
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
