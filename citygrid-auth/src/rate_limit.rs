//! Request rate limiting
//!
//! A fixed-window, in-process counter keyed by an arbitrary string
//! (typically the caller IP), used to bound abuse of unauthenticated
//! endpoints. The limiter is an explicit service instance owned by the
//! request-handling layer and injected into handlers; its map is guarded
//! by a single mutex. Cross-process sharing is out of scope.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Per-key counter state.
struct WindowEntry {
    count: u32,
    window_start: Instant,
}

/// Fixed-window request rate limiter.
///
/// Within a window of `window` starting at a key's first hit, up to
/// `max_requests` hits are allowed; the next hit is denied. Once the
/// window has elapsed, the next hit starts a fresh window.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use citygrid_auth::RateLimiter;
///
/// let limiter = RateLimiter::new(Duration::from_secs(60), 3);
/// assert!(limiter.check_limit("203.0.113.7"));
/// assert!(limiter.check_limit("203.0.113.7"));
/// assert!(limiter.check_limit("203.0.113.7"));
/// assert!(!limiter.check_limit("203.0.113.7"));
/// ```
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    entries: Mutex<HashMap<String, WindowEntry>>,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("window", &self.window)
            .field("max_requests", &self.max_requests)
            .finish()
    }
}

impl RateLimiter {
    /// Create a limiter allowing `max_requests` hits per `window`.
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Record a hit for `key` and report whether it is allowed.
    pub fn check_limit(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    /// Drop every key whose window has fully elapsed, bounding memory
    /// growth. Keys whose window is still counting are kept.
    pub fn cleanup(&self) {
        self.cleanup_at(Instant::now());
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.lock_entries().len()
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut entries = self.lock_entries();
        if let Some(entry) = entries.get_mut(key) {
            if now.duration_since(entry.window_start) < self.window {
                entry.count += 1;
                return entry.count <= self.max_requests;
            }
        }
        // First hit for the key, or its window has elapsed.
        entries.insert(
            key.to_string(),
            WindowEntry {
                count: 1,
                window_start: now,
            },
        );
        true
    }

    fn cleanup_at(&self, now: Instant) {
        self.lock_entries()
            .retain(|_, entry| now.duration_since(entry.window_start) < self.window);
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, WindowEntry>> {
        // A panic while holding this lock leaves only counter state
        // behind; recover the map rather than poisoning every request.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
