use dashmap::DashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

struct RateLimitEntry {
    window_start: Instant,
    count: u32,
}

/// Fixed-window request counter keyed by client.
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    clients: DashMap<String, RateLimitEntry>,
    last_sweep: Mutex<Instant>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        RateLimiter {
            max_requests,
            window,
            clients: DashMap::new(),
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    pub fn tracked_clients(&self) -> usize {
        self.clients.len()
    }

    // Drops clients whose window has lapsed, at most once per window.
    fn sweep_expired(&self, now: Instant) {
        let Ok(mut last_sweep) = self.last_sweep.try_lock() else {
            return;
        };
        if now.duration_since(*last_sweep) < self.window {
            return;
        }
        *last_sweep = now;
        self.clients
            .retain(|_, entry| now.duration_since(entry.window_start) < self.window);
    }

    /// Counts one request for `client` and reports whether it is allowed.
    pub fn check(&self, client: &str) -> bool {
        let now = Instant::now();
        // Must run before the entry guard below is taken.
        self.sweep_expired(now);
        let mut entry = self.clients.entry(client.to_string()).or_insert(RateLimitEntry {
            window_start: now,
            count: 0,
        });
        if now.duration_since(entry.window_start) >= self.window {
            entry.window_start = now;
            entry.count = 0;
        }
        if entry.count >= self.max_requests {
            return false;
        }
        entry.count += 1;
        true
    }
}
