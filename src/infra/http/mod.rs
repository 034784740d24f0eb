mod admin;
pub mod auth;
pub mod error;
pub mod middleware;
mod public;
pub mod rate_limit;
pub mod response;

pub use auth::{SessionConfig, session_key};
pub use rate_limit::{ApiRateLimiter, spawn_pruner};

use std::sync::Arc;

use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Router, middleware as axum_middleware};
use axum_extra::extract::cookie::Key;

use crate::application::admin::posts::AdminPostService;
use crate::application::error::ErrorReport;
use crate::application::posts::PostQueryService;
use crate::application::repos::{PostsRepo, RepoError};
use crate::cache::PostCache;
use crate::monitor::PerformanceMonitor;

/// Everything the handlers share, cloned per request.
#[derive(Clone)]
pub struct HttpState {
    pub posts: Arc<PostQueryService>,
    pub admin_posts: Arc<AdminPostService>,
    pub store: Arc<dyn PostsRepo>,
    pub cache: Arc<PostCache>,
    pub monitor: Arc<PerformanceMonitor>,
    pub sessions: Arc<SessionConfig>,
    pub session_key: Key,
    pub rate_limiter: Arc<ApiRateLimiter>,
}

impl FromRef<HttpState> for Key {
    fn from_ref(state: &HttpState) -> Self {
        state.session_key.clone()
    }
}

pub fn build_router(state: HttpState) -> Router {
    let public = Router::new()
        .route("/api/posts", get(public::list_posts))
        .route("/api/posts/{slug}", get(public::get_post))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            rate_limit::limit_public,
        ));

    let auth = Router::new()
        .route(
            "/api/auth/login",
            post(auth::login).route_layer(axum_middleware::from_fn_with_state(
                state.clone(),
                rate_limit::limit_login,
            )),
        )
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/session", get(auth::session));

    Router::new()
        .merge(public)
        .merge(auth)
        .merge(admin::build_admin_router(state.clone()))
        .route("/_health/db", get(db_health))
        .with_state(state.clone())
        .layer(axum_middleware::from_fn_with_state(
            state,
            middleware::record_timing,
        ))
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}

async fn db_health(State(state): State<HttpState>) -> Response {
    db_health_response(state.store.ping().await)
}

fn db_health_response(result: Result<(), RepoError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}
