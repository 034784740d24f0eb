//! Cookie sessions for the admin surface.
//!
//! The session is an encrypted private cookie holding the admin email and the
//! time it was issued. Expiry is enforced by the cookie's max age and again
//! on every read from the embedded issue time.

use std::fmt;
use std::time::Duration;

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use serde::{Deserialize, Serialize};
use serde_json::json;
use subtle::ConstantTimeEq;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::config::AuthSettings;

use super::HttpState;
use super::error::ApiError;

pub const SESSION_COOKIE: &str = "gazette_session";

const SOURCE: &str = "infra::http::auth";

/// Credentials and cookie policy for admin sessions.
#[derive(Clone)]
pub struct SessionConfig {
    admin_email: String,
    admin_password: Option<String>,
    cookie_secure: bool,
    max_age: Duration,
}

impl SessionConfig {
    pub fn new(
        admin_email: impl Into<String>,
        admin_password: Option<String>,
        cookie_secure: bool,
        max_age: Duration,
    ) -> Self {
        Self {
            admin_email: admin_email.into(),
            admin_password,
            cookie_secure,
            max_age,
        }
    }

    fn credentials_match(&self, email: &str, password: &str) -> bool {
        let Some(expected) = self.admin_password.as_deref() else {
            return false;
        };
        let email_ok = email.as_bytes().ct_eq(self.admin_email.as_bytes());
        let password_ok = password.as_bytes().ct_eq(expected.as_bytes());
        bool::from(email_ok & password_ok)
    }
}

impl From<&AuthSettings> for SessionConfig {
    fn from(settings: &AuthSettings) -> Self {
        Self::new(
            settings.admin_email.clone(),
            settings.admin_password.clone(),
            settings.cookie_secure,
            settings.session_max_age,
        )
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("admin_email", &self.admin_email)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .field("cookie_secure", &self.cookie_secure)
            .field("max_age", &self.max_age)
            .finish()
    }
}

/// Cookie encryption key from the configured secret, or a random key that
/// invalidates sessions on restart.
pub fn session_key(settings: &AuthSettings) -> Key {
    match settings.session_secret.as_deref() {
        Some(secret) => Key::derive_from(secret.as_bytes()),
        None => {
            warn!(
                target = "gazette::http::auth",
                "auth.session_secret is not set; sessions will not survive a restart"
            );
            Key::generate()
        }
    }
}

/// An authenticated admin, available to gated handlers as an extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    pub email: String,
    pub issued_at: i64,
}

impl AdminSession {
    fn is_fresh(&self, max_age: Duration, now: OffsetDateTime) -> bool {
        let age = now.unix_timestamp() - self.issued_at;
        age >= 0 && u64::try_from(age).is_ok_and(|age| age <= max_age.as_secs())
    }
}

pub fn current_session(
    jar: &PrivateCookieJar,
    config: &SessionConfig,
    now: OffsetDateTime,
) -> Option<AdminSession> {
    let cookie = jar.get(SESSION_COOKIE)?;
    let session: AdminSession = serde_json::from_str(cookie.value()).ok()?;
    (session.email == config.admin_email && session.is_fresh(config.max_age, now))
        .then_some(session)
}

fn session_cookie(value: String, config: &SessionConfig) -> Cookie<'static> {
    let max_age =
        time::Duration::seconds(i64::try_from(config.max_age.as_secs()).unwrap_or(i64::MAX));
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .max_age(max_age)
        .build()
}

pub async fn require_admin(
    State(state): State<HttpState>,
    jar: PrivateCookieJar,
    request: Request<Body>,
    next: Next,
) -> Response {
    match current_session(&jar, &state.sessions, OffsetDateTime::now_utc()) {
        Some(_) => next.run(request).await,
        None => ApiError::unauthorized(SOURCE).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<HttpState>,
    jar: PrivateCookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        ApiError::from_error(SOURCE, StatusCode::BAD_REQUEST, "Invalid request body", &rejection)
    })?;

    let email = payload.email.trim();
    if !email.contains('@') {
        return Err(ApiError::bad_request(SOURCE, "Invalid email"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::bad_request(SOURCE, "Password is required"));
    }

    if !state.sessions.credentials_match(email, &payload.password) {
        return Err(ApiError::new(
            SOURCE,
            StatusCode::UNAUTHORIZED,
            "Invalid email or password",
        ));
    }

    let session = AdminSession {
        email: email.to_string(),
        issued_at: OffsetDateTime::now_utc().unix_timestamp(),
    };
    let value = serde_json::to_string(&session).map_err(|err| ApiError::internal(SOURCE, &err))?;
    let jar = jar.add(session_cookie(value, &state.sessions));

    info!(
        target = "gazette::http::auth",
        email = %session.email,
        "Admin signed in"
    );

    Ok((jar, Json(json!({ "success": true, "email": session.email }))))
}

pub async fn logout(jar: PrivateCookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Json(json!({ "success": true })))
}

pub async fn session(State(state): State<HttpState>, jar: PrivateCookieJar) -> Response {
    match current_session(&jar, &state.sessions, OffsetDateTime::now_utc()) {
        Some(session) => Json(json!({
            "is_authenticated": true,
            "email": session.email,
        }))
        .into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "is_authenticated": false })),
        )
            .into_response(),
    }
}
