//! Per-client sliding-window request limiting.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, HeaderValue, Request, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::config::RateLimitSettings;

use super::HttpState;
use super::error::ApiError;

const SOURCE: &str = "infra::http::rate_limit";
const LIMIT_HEADER: &str = "x-ratelimit-limit";
const REMAINING_HEADER: &str = "x-ratelimit-remaining";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after_secs: u64 },
}

#[derive(Debug, Clone)]
pub struct ApiRateLimiter {
    window: Duration,
    max_requests: u32,
    buckets: Arc<DashMap<String, Vec<Instant>>>,
}

impl ApiRateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            buckets: Arc::new(DashMap::new()),
        }
    }

    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        Self::new(
            Duration::from_secs(u64::from(settings.window_seconds.get())),
            settings.max_requests.get(),
        )
    }

    /// Count one request for `client` within `scope`.
    pub fn check(&self, client: &str, scope: &str) -> RateDecision {
        let bucket_key = format!("{client}:{scope}");
        let now = Instant::now();
        let window = self.window;

        let mut entry = self.buckets.entry(bucket_key).or_default();
        entry.retain(|instant| now.duration_since(*instant) < window);

        let used = u32::try_from(entry.len()).unwrap_or(u32::MAX);
        if used >= self.max_requests {
            let oldest = entry.first().copied().unwrap_or(now);
            let wait = window.saturating_sub(now.duration_since(oldest));
            let retry_after_secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
            return RateDecision::Limited {
                retry_after_secs: retry_after_secs.max(1),
            };
        }

        entry.push(now);
        RateDecision::Allowed {
            remaining: self.max_requests - used - 1,
        }
    }

    /// Drop buckets whose requests have all left the window.
    pub fn prune(&self) -> usize {
        let now = Instant::now();
        let window = self.window;
        let before = self.buckets.len();
        self.buckets.retain(|_, hits| {
            hits.retain(|instant| now.duration_since(*instant) < window);
            !hits.is_empty()
        });
        before.saturating_sub(self.buckets.len())
    }

    pub fn limit(&self) -> u32 {
        self.max_requests
    }
}

pub fn spawn_pruner(limiter: Arc<ApiRateLimiter>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = limiter.prune();
            if removed > 0 {
                debug!(
                    target = "gazette::http::rate_limit",
                    removed, "Pruned idle rate-limit buckets"
                );
            }
        }
    })
}

pub async fn limit_public(
    State(state): State<HttpState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    enforce(&state.rate_limiter, "public", request, next).await
}

pub async fn limit_login(
    State(state): State<HttpState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    enforce(&state.rate_limiter, "login", request, next).await
}

async fn enforce(
    limiter: &ApiRateLimiter,
    scope: &'static str,
    request: Request<Body>,
    next: Next,
) -> Response {
    let client = client_key(&request);
    match limiter.check(&client, scope) {
        RateDecision::Limited { retry_after_secs } => {
            rate_limited(limiter.limit(), retry_after_secs)
        }
        RateDecision::Allowed { remaining } => {
            let mut response = next.run(request).await;
            insert_limit_headers(response.headers_mut(), limiter.limit(), remaining);
            response
        }
    }
}

/// First `X-Forwarded-For` hop, falling back to the peer address.
fn client_key(request: &Request<Body>) -> String {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn insert_limit_headers(headers: &mut HeaderMap, limit: u32, remaining: u32) {
    headers.insert(LIMIT_HEADER, HeaderValue::from(limit));
    headers.insert(REMAINING_HEADER, HeaderValue::from(remaining));
}

fn rate_limited(limit: u32, retry_after_secs: u64) -> Response {
    let mut response = ApiError::new(
        SOURCE,
        StatusCode::TOO_MANY_REQUESTS,
        "Too many requests, please try again later",
    )
    .into_response();
    let headers = response.headers_mut();
    headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
    insert_limit_headers(headers, limit, 0);
    response
}
