//! # palaver-core
//!
//! Foundation types for the Palaver chat platform.
//!
//! This crate provides the shared vocabulary the context and hook crates
//! depend on:
//!
//! - **Branded IDs**: `ConversationId`, `RunId`, `MessageId`, `ToolCallId`
//!   as newtypes for type safety
//! - **Messages**: `ChatMessage` with typed content parts (text, tool calls)
//! - **JSON shapes**: `JsonShape` tagged decode replacing ad-hoc runtime
//!   type checks on parsed JSON
//! - **Errors**: collaborator-boundary errors via `thiserror`

#![deny(unsafe_code)]

pub mod errors;
pub mod ids;
pub mod json;
pub mod messages;
