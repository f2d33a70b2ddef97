//! Error types for the conversation crate.
//!
//! - `DialogueError`: a message could not advance the reservation dialogue

use crate::session::Slot;
use std::fmt;

/// Errors from advancing a reservation dialogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueError {
    /// A count slot received input with no usable number in it.
    InvalidSlotValue { slot: Slot, input: String },
}

impl fmt::Display for DialogueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSlotValue { slot, input } => {
                write!(f, "invalid value for {slot}: {input:?}")
            }
        }
    }
}

impl std::error::Error for DialogueError {}
