//! Fixed-window rate limiting per client address
//!
//! Each client gets `max_requests` per window. The window opens on the
//! client's first request and resets once it has fully elapsed.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use tracing::{debug, warn};

use crate::config::RateLimitConfig;
use crate::interfaces::http::common::error::{ErrorResponse, RATE_LIMITED};

pub const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
pub const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Shared per-address request counters
#[derive(Clone)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    windows: Arc<DashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Arc::new(DashMap::new()),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, config.window())
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Count one request from `client`.
    pub fn check(&self, client: &str) -> RateDecision {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: &str, now: Instant) -> RateDecision {
        let mut entry = self
            .windows
            .entry(client.to_string())
            .or_insert(Window {
                started: now,
                count: 0,
            });

        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        if entry.count >= self.max_requests {
            let elapsed = now.duration_since(entry.started);
            return RateDecision::Limited {
                retry_after: self.window.saturating_sub(elapsed),
            };
        }

        entry.count += 1;
        RateDecision::Allowed {
            remaining: self.max_requests - entry.count,
        }
    }

    /// Drop counters whose window has elapsed.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.duration_since(w.started) < self.window);
        let purged = before.saturating_sub(self.windows.len());
        if purged > 0 {
            debug!(purged, "Purged expired rate limit windows");
        }
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

/// Peer address, else the first `X-Forwarded-For` entry, else `unknown`.
fn client_key(request: &Request<Body>) -> String {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn quota_headers(headers: &mut HeaderMap, limit: u32, remaining: u32) {
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(remaining));
}

pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let client = client_key(&request);

    match limiter.check(&client) {
        RateDecision::Allowed { remaining } => {
            let mut response = next.run(request).await;
            quota_headers(response.headers_mut(), limiter.max_requests, remaining);
            response
        }
        RateDecision::Limited { retry_after } => {
            warn!(client = %client, "Rate limit exceeded");
            metrics::counter!("rate_limited_requests_total").increment(1);

            let retry_secs = retry_after.as_secs_f64().ceil().max(1.0) as u64;
            let body = ErrorResponse::new(
                "Too many requests from this address, please try again later.",
                RATE_LIMITED,
            );
            let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
            let headers = response.headers_mut();
            headers.insert("retry-after", HeaderValue::from(retry_secs));
            quota_headers(headers, limiter.max_requests, 0);
            response
        }
    }
}
