//! Resolves which dialogue a webhook request belongs to.
//!
//! Order: `sessionId` in the body, the last segment of a Dialogflow
//! `session` path, the `session` cookie, and finally a freshly minted id
//! handed back as a cookie.

use crate::config::SessionConfig;
use crate::payload::WebhookRequest;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use reservation_relay_conversation::SessionKey;
use reservation_relay_core::ConversationSessionId;
use time::Duration as TimeDuration;
use tracing::debug;

/// Cookie carrying the session id for browser callers.
pub const SESSION_COOKIE: &str = "session";

/// Picks the session key for `request`.
///
/// Cookie-identified sessions get their cookie reissued so the expiry
/// follows the idle timeout.
pub fn resolve_session_key(
    request: &WebhookRequest,
    jar: CookieJar,
    config: &SessionConfig,
) -> (SessionKey, CookieJar) {
    if let Some(key) = request.session_key() {
        return (key, jar);
    }

    let id = match jar.get(SESSION_COOKIE) {
        Some(cookie) => match cookie.value().parse::<ConversationSessionId>() {
            Ok(id) => id,
            Err(e) => {
                debug!(error = %e, "ignoring malformed session cookie");
                mint_session_id()
            }
        },
        None => mint_session_id(),
    };

    let jar = jar.add(session_cookie(id, config));
    (SessionKey::new(id.to_string()), jar)
}

fn mint_session_id() -> ConversationSessionId {
    let id = ConversationSessionId::new();
    debug!(session = %id, "minted session id");
    id
}

fn session_cookie(id: ConversationSessionId, config: &SessionConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::minutes(config.idle_timeout_minutes))
        .build()
}
