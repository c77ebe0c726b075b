//! Per-client request limiting.
//!
//! Each client address gets a fixed window; once `max_requests` have been
//! seen inside it, further requests are answered with 429 until the window
//! rolls over.

use std::{
    collections::HashMap,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::RETRY_AFTER, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::RwLock;
use tracing::warn;

use crate::{config::RateLimitConfig, error::ApiError};

const GLOBAL_MESSAGE: &str = "Too many requests from this IP, please try again later.";
const AUTH_MESSAGE: &str = "Too many authentication attempts, please try again later.";

// expired windows are swept once this many clients are tracked
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug)]
struct Window {
    started: Instant,
    hits: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    Allowed,
    Limited {
        /// Seconds until the client's window resets.
        retry_after: u64,
    },
}

#[derive(Clone)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    trust_proxy: bool,
    message: &'static str,
    windows: Arc<RwLock<HashMap<IpAddr, Window>>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration, message: &'static str) -> Self {
        Self {
            max_requests,
            window,
            trust_proxy: false,
            message,
            windows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Limiter applied to every request.
    pub fn global(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, config.window, GLOBAL_MESSAGE)
            .trust_proxy(config.trust_proxy)
    }

    /// Stricter limiter for `/api/auth`.
    pub fn auth(config: &RateLimitConfig) -> Self {
        Self::new(config.auth_max_requests, config.window, AUTH_MESSAGE)
            .trust_proxy(config.trust_proxy)
    }

    pub fn trust_proxy(mut self, trust: bool) -> Self {
        self.trust_proxy = trust;
        self
    }

    pub async fn check(&self, ip: IpAddr) -> RateLimitResult {
        let now = Instant::now();
        let mut windows = self.windows.write().await;

        if windows.len() >= SWEEP_THRESHOLD {
            let window = self.window;
            windows.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = windows.entry(ip).or_insert(Window {
            started: now,
            hits: 0,
        });
        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.hits = 0;
        }

        if entry.hits < self.max_requests {
            entry.hits += 1;
            RateLimitResult::Allowed
        } else {
            let remaining = self.window.saturating_sub(now.duration_since(entry.started));
            RateLimitResult::Limited {
                retry_after: remaining.as_secs_f64().ceil().max(1.0) as u64,
            }
        }
    }

    pub async fn tracked_clients(&self) -> usize {
        self.windows.read().await.len()
    }

    fn client_ip(&self, request: &Request) -> IpAddr {
        if self.trust_proxy {
            let forwarded = request
                .headers()
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .or_else(|| {
                    request
                        .headers()
                        .get("x-real-ip")
                        .and_then(|v| v.to_str().ok())
                });
            if let Some(ip) = forwarded.and_then(|v| v.trim().parse().ok()) {
                return ip;
            }
        }

        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
    }
}

pub async fn rate_limit(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let ip = limiter.client_ip(&request);
    match limiter.check(ip).await {
        RateLimitResult::Allowed => next.run(request).await,
        RateLimitResult::Limited { retry_after } => {
            warn!(client_ip = %ip, retry_after, path = %request.uri().path(), "rate limit exceeded");
            let mut response = ApiError::TooManyRequests(limiter.message.into()).into_response();
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after));
            response
        }
    }
}
