//! NLU client abstraction.
//!
//! The relay only needs one thing from a natural-language-understanding
//! service: given a session and the user's text, the reply text and any
//! extracted parameters.

use crate::error::NluError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;

/// Available NLU providers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NluProvider {
    /// Offline echo, no remote service.
    #[default]
    Echo,
    /// Google Dialogflow ES over REST.
    Dialogflow,
}

impl fmt::Display for NluProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Echo => f.write_str("echo"),
            Self::Dialogflow => f.write_str("dialogflow"),
        }
    }
}

/// Result of a detect-intent call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectIntentResponse {
    /// The service's reply text for this message.
    pub fulfillment_text: String,
    /// Parameters the service extracted from the message.
    pub parameters: Map<String, JsonValue>,
}

impl DetectIntentResponse {
    /// Creates a response carrying only text.
    #[must_use]
    pub fn new(fulfillment_text: impl Into<String>) -> Self {
        Self {
            fulfillment_text: fulfillment_text.into(),
            parameters: Map::new(),
        }
    }

    /// Adds an extracted parameter.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: JsonValue) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }
}

/// Trait for NLU services.
#[async_trait]
pub trait NluClient: Send + Sync {
    /// Runs intent detection for one user message.
    ///
    /// # Errors
    ///
    /// Returns an error on network, auth or quota failures, or when the
    /// reply can't be understood. Callers don't retry.
    async fn detect_intent(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<DetectIntentResponse, NluError>;

    /// Returns the provider type.
    fn provider(&self) -> NluProvider;
}
