//! Natural-language-understanding clients for reservation-relay.
//!
//! The relay treats the NLU service as an opaque collaborator behind
//! [`NluClient`]. Two implementations ship here:
//!
//! - [`DialogflowClient`]: Dialogflow ES `detectIntent` over REST
//! - [`EchoClient`]: offline, repeats the user's text back

pub mod client;
pub mod dialogflow;
pub mod echo;
pub mod error;

pub use client::{DetectIntentResponse, NluClient, NluProvider};
pub use dialogflow::{DialogflowClient, DialogflowConfig};
pub use echo::EchoClient;
pub use error::NluError;
