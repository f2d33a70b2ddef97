//! Reservation dialogue tracking for reservation-relay.
//!
//! This crate provides:
//!
//! - **Sessions**: the forward-only adults → children → date → time dialogue
//! - **Slots**: number extraction and pricing
//! - **Store**: per-caller sessions with per-key serialization

pub mod error;
pub mod reply;
pub mod session;
pub mod slot;
pub mod store;

pub use error::DialogueError;
pub use reply::OutboundReply;
pub use session::{
    ASK_ADULTS_PROMPT, ASK_CHILDREN_PROMPT, ASK_DATE_PROMPT, ASK_TIME_PROMPT, ConversationSession,
    DialogueState, Slot,
};
pub use slot::{ADULT_UNIT_PRICE, CHILD_UNIT_PRICE, extract_first_integer, total_price};
pub use store::{SessionKey, SessionStore, StoreConfig};
