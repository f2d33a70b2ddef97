//! Core domain types and utilities for reservation-relay.
//!
//! Shared by the conversation tracker, the NLU clients and the webhook
//! server: the rootcause-backed `Result` alias and typed identifiers.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{ConversationSessionId, ParseIdError};
