//! HTTP handlers.

use crate::error::WebhookError;
use crate::payload::WebhookRequest;
use crate::session_key::resolve_session_key;
use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use reservation_relay_conversation::{OutboundReply, SessionKey};
use reservation_relay_nlu::NluProvider;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};

/// `POST /webhook`: relays one user message through the NLU service and
/// the caller's reservation dialogue.
pub async fn webhook(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<WebhookRequest>,
) -> Response {
    let Some(text) = request.user_text() else {
        return WebhookError::MissingInput.into_response();
    };

    let (key, jar) = resolve_session_key(&request, jar, &state.session_config);
    let result = relay(&state, &key, text, request.upstream_fulfillment())
        .await
        .map(Json);

    // The cookie goes out even when the relay fails, so a retry lands in
    // the same session.
    (jar, result).into_response()
}

#[instrument(skip(state, text, upstream), fields(session = %key))]
async fn relay(
    state: &AppState,
    key: &SessionKey,
    text: &str,
    upstream: Option<&str>,
) -> Result<OutboundReply, WebhookError> {
    debug!(text, "user message received");

    let fulfillment = match upstream {
        Some(fulfillment) => fulfillment.to_string(),
        None => state.nlu.detect_intent(key.as_str(), text).await?.fulfillment_text,
    };

    let reply = state.store.advance(key, text, &fulfillment).await?;
    debug!(reply = %reply.fulfillment_text, "replying");
    Ok(reply)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub sessions: usize,
    pub nlu: NluProvider,
}

/// `GET /health`.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        sessions: state.store.len().await,
        nlu: state.nlu.provider(),
    })
}
