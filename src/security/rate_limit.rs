//! Sliding-window rate limiting.
//!
//! Each (client identity, route path) pair gets an independent window of
//! admission timestamps. The window limit is soft: once it is reached,
//! requests keep being admitted as burst until the trailing 10-second
//! sub-window hits the burst limit, which is the hard cutoff. State is a
//! single mutex-guarded map; checks are serialized, which keeps the count
//! exact under concurrency.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use axum::http::HeaderMap;
use chrono::Utc;

use crate::config::RateLimitConfig;

/// Length of the burst sub-window.
const BURST_WINDOW: Duration = Duration::from_secs(10);

/// Snapshot of a client's window, for `X-RateLimit-*` response headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    /// Full-window limit that applied to this request.
    pub limit: u32,
    /// Admissions left in the current window.
    pub remaining: u32,
    /// Unix timestamp when the current window ends.
    pub reset: i64,
}

#[derive(Debug)]
pub struct SlidingWindowLimiter {
    config: RateLimitConfig,
    window: Duration,
    state: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl SlidingWindowLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        let window = Duration::from_secs(config.window_seconds);
        Self {
            config,
            window,
            state: Mutex::new(HashMap::new()),
        }
    }

    /// Whether the path bypasses rate limiting entirely.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.config
            .excluded_paths
            .iter()
            .any(|p| path.starts_with(p.as_str()))
    }

    /// Effective (limit, burst) for a path; first matching override wins.
    fn limits_for(&self, path: &str) -> (u32, u32) {
        self.config
            .overrides
            .iter()
            .find(|o| path.starts_with(o.prefix.as_str()))
            .map(|o| (o.limit, o.burst))
            .unwrap_or((self.config.default_limit, self.config.burst_limit))
    }

    /// Admit or reject a request. `Ok` means admitted and recorded; `Err`
    /// means rejected and not recorded. Both carry the window snapshot.
    pub fn check(&self, identity: &str, path: &str) -> Result<RateLimitStatus, RateLimitStatus> {
        self.check_at(identity, path, Instant::now(), Utc::now().timestamp())
    }

    /// Like `check`, with an explicit clock for tests.
    pub fn check_at(
        &self,
        identity: &str,
        path: &str,
        now: Instant,
        now_unix: i64,
    ) -> Result<RateLimitStatus, RateLimitStatus> {
        let (limit, burst_limit) = self.limits_for(path);
        let key = format!("{identity}:{path}");

        let mut state = self.lock_state();
        let window = state.entry(key).or_default();

        // Drop entries that have aged out of the window.
        while window
            .front()
            .is_some_and(|t| now.duration_since(*t) >= self.window)
        {
            window.pop_front();
        }

        let used = window.len() as u32;
        let reset = now_unix + self.window.as_secs() as i64;

        // The window limit is soft; once it is reached, admission falls
        // through to the burst sub-window, which is the hard cutoff.
        if used >= limit {
            let recent_burst = window
                .iter()
                .rev()
                .take_while(|t| now.duration_since(**t) <= BURST_WINDOW)
                .count() as u32;
            if recent_burst >= burst_limit {
                tracing::warn!(client = %identity, path = %path, limit, burst_limit, "Rate limit exceeded");
                return Err(RateLimitStatus {
                    limit,
                    remaining: 0,
                    reset,
                });
            }
        }

        window.push_back(now);
        Ok(RateLimitStatus {
            limit,
            remaining: limit.saturating_sub(used + 1),
            reset,
        })
    }

    /// Drop keys whose entries have all aged out. Run periodically so
    /// one-off clients do not grow the map forever.
    pub fn sweep(&self) {
        self.sweep_at(Instant::now())
    }

    fn sweep_at(&self, now: Instant) {
        let mut state = self.lock_state();
        let before = state.len();
        state.retain(|_, window| {
            window
                .back()
                .is_some_and(|t| now.duration_since(*t) < self.window)
        });
        let removed = before - state.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = state.len(), "Swept idle rate-limit keys");
        }
    }

    /// Number of tracked (client, path) keys.
    pub fn tracked_keys(&self) -> usize {
        self.lock_state().len()
    }

    fn lock_state(&self) -> MutexGuard<'_, HashMap<String, VecDeque<Instant>>> {
        // A poisoned lock only means a panic elsewhere; the timestamps
        // themselves are still coherent.
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Periodically sweep idle limiter keys until the process exits.
pub fn spawn_sweeper(limiter: Arc<SlidingWindowLimiter>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_seconds));
        ticker.tick().await;
        loop {
            ticker.tick().await;
            limiter.sweep();
        }
    });
}

/// Resolve the client identity for limiter keys: proxy headers first, then
/// the socket address, then a shared fallback bucket.
pub fn resolve_client_identity(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }
    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
