//! Inbound webhook payload.
//!
//! Two callers share the endpoint: a chat front end posting
//! `{"message": ..., "sessionId": ...}`, and a Dialogflow fulfillment
//! webhook posting its `queryResult` and `session` path.

use reservation_relay_conversation::SessionKey;
use serde::Deserialize;

/// Body of `POST /webhook`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    /// Text typed by the user (front-end shape).
    #[serde(default)]
    pub message: Option<String>,
    /// Dialogflow's query result (fulfillment-webhook shape).
    #[serde(default)]
    pub query_result: Option<QueryResult>,
    /// Caller-chosen session key.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Dialogflow session path, `projects/<p>/agent/sessions/<id>`.
    #[serde(default)]
    pub session: Option<String>,
}

/// The part of a Dialogflow query result the relay reads.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(default)]
    pub query_text: Option<String>,
    #[serde(default)]
    pub fulfillment_text: Option<String>,
}

impl WebhookRequest {
    /// The user's text: `message` first, then `queryResult.queryText`.
    ///
    /// Blank values count as absent.
    #[must_use]
    pub fn user_text(&self) -> Option<&str> {
        non_blank(self.message.as_deref()).or_else(|| {
            self.query_result
                .as_ref()
                .and_then(|q| non_blank(q.query_text.as_deref()))
        })
    }

    /// Fulfillment text already computed by Dialogflow for this message.
    ///
    /// Present only when Dialogflow itself is calling the webhook, in
    /// which case there is no need to ask it again.
    #[must_use]
    pub fn upstream_fulfillment(&self) -> Option<&str> {
        self.query_result.as_ref()?.fulfillment_text.as_deref()
    }

    /// Session key named in the body, if any.
    #[must_use]
    pub fn session_key(&self) -> Option<SessionKey> {
        if let Some(id) = non_blank(self.session_id.as_deref()) {
            return Some(SessionKey::new(id));
        }
        let path = non_blank(self.session.as_deref())?;
        non_blank(path.rsplit('/').next()).map(SessionKey::new)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
