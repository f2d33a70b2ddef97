//! Offline NLU client.
//!
//! Replies with the user's own words, which is enough to exercise the
//! reservation dialogue without a Dialogflow agent.

use crate::client::{DetectIntentResponse, NluClient, NluProvider};
use crate::error::NluError;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, Default)]
pub struct EchoClient;

impl EchoClient {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NluClient for EchoClient {
    async fn detect_intent(
        &self,
        _session_id: &str,
        text: &str,
    ) -> Result<DetectIntentResponse, NluError> {
        Ok(DetectIntentResponse::new(format!("You said: \"{text}\"")))
    }

    fn provider(&self) -> NluProvider {
        NluProvider::Echo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echoes_the_message() {
        let response = EchoClient::new()
            .detect_intent("sess", "a table for two")
            .await
            .expect("echo never fails");

        assert_eq!(response.fulfillment_text, "You said: \"a table for two\"");
        assert!(response.parameters.is_empty());
    }
}
