//! # palaver-context
//!
//! Conversation JSON context assembly and `${{ … }}` placeholder evaluation.
//!
//! The pipeline, leaf to root:
//!
//! - **Entry extraction**: one chat message (or one live tool result) yields
//!   zero or more structured JSON [`Entry`](entry::Entry) values — from
//!   tool-call outputs, fenced ```json blocks, or whole-message text.
//! - **History loading**: the ordered entry list for a `(conversation, run)`
//!   pair, served from a TTL-bound runtime cache when present, rebuilt from
//!   persisted messages otherwise.
//! - **JSON root**: the entry payloads flattened into the array that roots
//!   every path query.
//! - **Placeholder evaluation**: `${{ expr }}` markers inside a value are
//!   evaluated as JSONPath queries over the root — type-preserving when a
//!   string is exactly one placeholder, stringifying when inline.
//!
//! ## Failure policy
//!
//! Nothing in this crate propagates an error to its caller. Malformed JSON
//! is skipped with a diagnostic event, collaborator failures degrade to an
//! empty entry list, and bad path expressions evaluate to nothing. Callers
//! always get a best-effort result.

#![deny(unsafe_code)]

pub mod cache;
pub mod entry;
pub mod eval;
pub mod extract;
pub mod fenced;
pub mod history;
pub mod root;
pub mod store;
