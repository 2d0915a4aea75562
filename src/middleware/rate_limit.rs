//! Per-client-IP rate limiting.
//!
//! A fixed window counter per IP, kept in a bounded mutex-guarded map.
//! Counter resets are last-writer-wins at the window boundary; the benign
//! race where two threads reset concurrently is tolerated. The map never
//! exceeds its capacity: when full, entries with elapsed windows are evicted
//! first, and if every window is still active the stalest entry is dropped
//! to admit the new IP, so address churn cannot grow the map without bound.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::warn;

use crate::config::rate_limit::RateLimitConfig;
use crate::state::AppState;
use crate::utils::fingerprint::client_ip;

const MAX_TRACKED_CLIENTS: usize = 10_000;

struct Window {
    count: u32,
    started: Instant,
}

/// Fixed-window per-IP request counter.
#[derive(Clone)]
pub struct RateLimiter {
    entries: Arc<Mutex<HashMap<IpAddr, Window>>>,
    window: Duration,
    max_requests: u32,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            window: Duration::from_secs(config.window_secs),
            max_requests: config.max_requests,
        }
    }

    /// Counts one request for the IP; false when the client is over limit.
    pub fn check(&self, ip: IpAddr) -> bool {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let now = Instant::now();

        if entries.len() >= MAX_TRACKED_CLIENTS && !entries.contains_key(&ip) {
            entries.retain(|_, window| now.duration_since(window.started) < self.window);

            // Every tracked window still active: drop the stalest entry so
            // the cap holds even under spoofed-address churn.
            if entries.len() >= MAX_TRACKED_CLIENTS {
                let stalest = entries
                    .iter()
                    .min_by_key(|(_, window)| window.started)
                    .map(|(ip, _)| *ip);
                if let Some(stalest) = stalest {
                    entries.remove(&stalest);
                }
            }
        }

        let window = entries.entry(ip).or_insert(Window {
            count: 0,
            started: now,
        });

        if now.duration_since(window.started) >= self.window {
            window.count = 0;
            window.started = now;
        }

        window.count += 1;
        window.count <= self.max_requests
    }
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    if state.rate_limit_config.is_exempt(req.uri().path()) {
        return next.run(req).await;
    }

    let Some(ip) = client_ip(req.headers(), req.extensions()) else {
        // No identifiable client; the limiter is strictly per-IP.
        return next.run(req).await;
    };

    if !state.rate_limiter.check(ip) {
        warn!(client_ip = %ip, path = %req.uri().path(), "Rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "code": "429",
                "message": "Too many requests",
            })),
        )
            .into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(window_secs: u64, max_requests: u32) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            window_secs,
            max_requests,
            exempt_prefixes: vec![],
        })
    }

    #[test]
    fn test_allows_up_to_limit() {
        let limiter = limiter(60, 3);
        let ip: IpAddr = "10.0.0.1".parse().unwrap();

        assert!(limiter.check(ip));
        assert!(limiter.check(ip));
        assert!(limiter.check(ip));
        assert!(!limiter.check(ip));
    }

    #[test]
    fn test_separate_ips_have_separate_counters() {
        let limiter = limiter(60, 1);
        let first: IpAddr = "10.0.0.1".parse().unwrap();
        let second: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(limiter.check(first));
        assert!(!limiter.check(first));
        assert!(limiter.check(second));
    }

    #[test]
    fn test_map_never_exceeds_capacity() {
        let limiter = limiter(60, 1);

        // All windows stay active for the full minute, so nothing is
        // evictable by expiry alone.
        for i in 0..(MAX_TRACKED_CLIENTS as u32 + 500) {
            let ip = IpAddr::V4(std::net::Ipv4Addr::from(i + 1));
            assert!(limiter.check(ip));
        }

        let entries = limiter.entries.lock().unwrap();
        assert!(entries.len() <= MAX_TRACKED_CLIENTS);
    }

    #[test]
    fn test_new_client_admitted_at_capacity() {
        let limiter = limiter(60, 2);

        for i in 0..MAX_TRACKED_CLIENTS as u32 {
            limiter.check(IpAddr::V4(std::net::Ipv4Addr::from(i + 1)));
        }

        // A fresh IP at capacity displaces the stalest entry and starts its
        // own window rather than being rejected outright.
        let newcomer: IpAddr = "203.0.113.50".parse().unwrap();
        assert!(limiter.check(newcomer));
        assert!(limiter.check(newcomer));
        assert!(!limiter.check(newcomer));
    }

    #[test]
    fn test_window_reset() {
        let limiter = limiter(0, 1);
        let ip: IpAddr = "10.0.0.1".parse().unwrap();

        // Zero-length window: every request starts a fresh window.
        assert!(limiter.check(ip));
        assert!(limiter.check(ip));
    }
}
