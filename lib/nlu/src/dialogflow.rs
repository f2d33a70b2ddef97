//! Dialogflow ES client over the REST `detectIntent` endpoint.

use crate::client::{DetectIntentResponse, NluClient, NluProvider};
use crate::error::NluError;
use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::time::Duration;
use tracing::{debug, instrument};

/// Public Dialogflow API host.
pub const DEFAULT_BASE_URL: &str = "https://dialogflow.googleapis.com";

/// Connection settings for a Dialogflow agent.
#[derive(Debug, Clone)]
pub struct DialogflowConfig {
    /// API host, without the `/v2` suffix.
    pub base_url: String,
    /// Google Cloud project that owns the agent.
    pub project_id: String,
    /// OAuth access token sent as a bearer token.
    pub access_token: String,
    /// Language of the user's text, e.g. `en-US`.
    pub language_code: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl DialogflowConfig {
    /// Settings for the public endpoint with `en-US` and a 10 second timeout.
    #[must_use]
    pub fn new(project_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            project_id: project_id.into(),
            access_token: access_token.into(),
            language_code: "en-US".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Talks to one Dialogflow agent.
#[derive(Debug, Clone)]
pub struct DialogflowClient {
    http: reqwest::Client,
    config: DialogflowConfig,
}

impl DialogflowClient {
    /// Builds a client with its own connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`NluError::InvalidConfig`] if the base URL is unusable or
    /// the HTTP client can't be constructed.
    pub fn new(config: DialogflowConfig) -> Result<Self, NluError> {
        Url::parse(&config.base_url).map_err(|e| NluError::InvalidConfig {
            reason: format!("base url {:?}: {e}", config.base_url),
        })?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NluError::InvalidConfig {
                reason: e.to_string(),
            })?;

        Ok(Self { http, config })
    }

    #[must_use]
    pub fn config(&self) -> &DialogflowConfig {
        &self.config
    }

    /// URL of the detect-intent call for `session_id`.
    fn endpoint(&self, session_id: &str) -> Result<Url, NluError> {
        let mut url = Url::parse(&self.config.base_url).map_err(|e| NluError::InvalidConfig {
            reason: e.to_string(),
        })?;
        let method = format!("{session_id}:detectIntent");
        url.path_segments_mut()
            .map_err(|()| NluError::InvalidConfig {
                reason: format!("base url {:?} cannot carry a path", self.config.base_url),
            })?
            .pop_if_empty()
            .extend([
                "v2",
                "projects",
                self.config.project_id.as_str(),
                "agent",
                "sessions",
                method.as_str(),
            ]);
        Ok(url)
    }

    fn request_body<'a>(&'a self, text: &'a str) -> DetectIntentRequest<'a> {
        DetectIntentRequest {
            query_input: QueryInput {
                text: TextInput {
                    text,
                    language_code: &self.config.language_code,
                },
            },
        }
    }
}

#[async_trait]
impl NluClient for DialogflowClient {
    #[instrument(skip(self, text), fields(project = %self.config.project_id))]
    async fn detect_intent(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<DetectIntentResponse, NluError> {
        let url = self.endpoint(session_id)?;

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.config.access_token)
            .json(&self.request_body(text))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(NluError::RemoteService {
                status: Some(status.as_u16()),
                message: remote_error_message(&body),
            });
        }

        let parsed = parse_detect_intent(&body)?;
        debug!(
            parameters = parsed.parameters.len(),
            "detect intent succeeded"
        );
        Ok(parsed)
    }

    fn provider(&self) -> NluProvider {
        NluProvider::Dialogflow
    }
}

fn transport_error(error: reqwest::Error) -> NluError {
    if error.is_timeout() {
        NluError::Timeout
    } else {
        NluError::RemoteService {
            status: error.status().map(|s| s.as_u16()),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DetectIntentRequest<'a> {
    query_input: QueryInput<'a>,
}

#[derive(Debug, Serialize)]
struct QueryInput<'a> {
    text: TextInput<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextInput<'a> {
    text: &'a str,
    language_code: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectIntentWire {
    query_result: Option<QueryResultWire>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResultWire {
    #[serde(default)]
    fulfillment_text: String,
    #[serde(default)]
    parameters: Map<String, JsonValue>,
}

/// Parses a successful detect-intent body.
///
/// A missing `queryResult` is treated as an empty reply; Dialogflow omits
/// it for some no-match outcomes.
fn parse_detect_intent(body: &[u8]) -> Result<DetectIntentResponse, NluError> {
    let wire: DetectIntentWire =
        serde_json::from_slice(body).map_err(|e| NluError::ResponseParseFailed {
            reason: e.to_string(),
        })?;
    let result = wire.query_result.unwrap_or_default();

    Ok(DetectIntentResponse {
        fulfillment_text: result.fulfillment_text,
        parameters: result.parameters,
    })
}

/// Pulls `error.message` out of a Google API error body, falling back to
/// the raw body text.
fn remote_error_message(body: &[u8]) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: ErrorDetail,
    }
    #[derive(Deserialize)]
    struct ErrorDetail {
        message: String,
    }

    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => String::from_utf8_lossy(body).trim().to_string(),
    }
}
