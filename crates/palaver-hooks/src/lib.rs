//! # palaver-hooks
//!
//! Webhook configuration and dispatch for the Palaver chat platform.
//!
//! Webhooks are declared in a JSON settings file. Their request bodies and
//! header values are templates: `${{ … }}` placeholders are evaluated
//! against the conversation's accumulated JSON context (via
//! `palaver-context`) and `${VAR}` references are filled from the process
//! environment at settings load time.
//!
//! ## Fail-soft
//!
//! A webhook that cannot be delivered is logged and reported to the job
//! runner as an error; it never panics and never blocks the conversation.

#![deny(unsafe_code)]

pub mod dispatch;
pub mod errors;
pub mod settings;
pub mod types;
