//! Error types for the webhook server.
//!
//! - `ConfigError`: configuration could not be loaded or is invalid
//! - `StartupError`: the server could not start serving
//! - `WebhookError`: a single webhook request failed

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use reservation_relay_conversation::{DialogueError, OutboundReply};
use reservation_relay_nlu::NluError;
use std::fmt;

/// Reply sent when the NLU service fails. Details stay in the logs.
pub const GENERIC_FAILURE_REPLY: &str = "Sorry, something went wrong. Please try again later.";

/// Configuration errors, raised once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The environment could not be read into the config structure.
    Load { details: String },
    /// A field holds a value the server can't run with.
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load { details } => write!(f, "failed to load configuration: {details}"),
            Self::Invalid { field, reason } => {
                write!(f, "invalid configuration for '{field}': {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors that stop the server from starting or keep it from serving.
#[derive(Debug)]
pub enum StartupError {
    /// Configuration failed to load or validate.
    Config { details: String },
    /// The NLU client could not be constructed.
    NluClient { details: String },
    /// The listener could not be bound.
    Bind { addr: String, details: String },
    /// The server loop exited with an error.
    Serve { details: String },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { details } => write!(f, "configuration error: {details}"),
            Self::NluClient { details } => {
                write!(f, "failed to create NLU client: {details}")
            }
            Self::Bind { addr, details } => {
                write!(f, "failed to bind to {addr}: {details}")
            }
            Self::Serve { details } => write!(f, "server error: {details}"),
        }
    }
}

impl std::error::Error for StartupError {}

/// Per-request webhook failures.
#[derive(Debug)]
pub enum WebhookError {
    /// The request carried no user text.
    MissingInput,
    /// The NLU service call failed.
    RemoteService(NluError),
    /// A count answer had no number in it (strict mode only).
    InvalidSlotValue(DialogueError),
}

impl fmt::Display for WebhookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput => write!(f, "request has no message text"),
            Self::RemoteService(e) => write!(f, "NLU call failed: {e}"),
            Self::InvalidSlotValue(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for WebhookError {}

impl From<NluError> for WebhookError {
    fn from(error: NluError) -> Self {
        Self::RemoteService(error)
    }
}

impl From<DialogueError> for WebhookError {
    fn from(error: DialogueError) -> Self {
        Self::InvalidSlotValue(error)
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        match self {
            Self::MissingInput => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": "message text is required" })),
            )
                .into_response(),
            Self::RemoteService(e) => {
                tracing::error!(error = %e, status = ?e.status(), "NLU request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    Json(OutboundReply::text(GENERIC_FAILURE_REPLY)),
                )
                    .into_response()
            }
            Self::InvalidSlotValue(DialogueError::InvalidSlotValue { slot, input }) => {
                tracing::debug!(%slot, input = %input, "rejected count without a number");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(OutboundReply::text(format!(
                        "Sorry, I need a number. {}",
                        slot.prompt()
                    ))),
                )
                    .into_response()
            }
        }
    }
}
