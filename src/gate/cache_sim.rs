//! Cache-simulation annotator for synthetic load tests.
//!
//! Nothing is cached here. The simulator remembers when each path was last
//! requested and reports HIT if the previous request fell inside the window.
//! It exists so load-test tooling can chart a plausible hit rate.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;

/// Entries older than this are swept on every observation
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

/// Millisecond clock, injectable so tests control time.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start_ms)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Snapshot of the simulator for the diagnostics endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CacheSimReport {
    /// Paths currently tracked
    pub entries: usize,

    pub hits: usize,

    pub misses: usize,

    /// Hit rate as a percentage (0-100)
    pub hit_rate: f64,
}

pub trait CacheSim: Send + Sync {
    /// Record a request for `path` and report whether it would have been cached.
    fn observe(&self, path: &str) -> CacheStatus;

    fn report(&self) -> CacheSimReport;
}

/// Path -> last-seen timestamp map with a fixed time window.
pub struct WindowedCacheSim<C: Clock = SystemClock> {
    clock: C,
    window_ms: i64,
    last_seen: Mutex<HashMap<String, i64>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl WindowedCacheSim<SystemClock> {
    pub fn with_default_window() -> Self {
        Self::new(SystemClock, DEFAULT_WINDOW)
    }
}

impl<C: Clock> WindowedCacheSim<C> {
    pub fn new(clock: C, window: Duration) -> Self {
        Self {
            clock,
            window_ms: window.as_millis() as i64,
            last_seen: Mutex::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Whether `path` is currently tracked.
    pub fn contains(&self, path: &str) -> bool {
        self.entries().contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A poisoned lock still holds valid timestamps
    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, i64>> {
        self.last_seen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C: Clock> CacheSim for WindowedCacheSim<C> {
    fn observe(&self, path: &str) -> CacheStatus {
        let now = self.clock.now_ms();
        let window = self.window_ms;

        let status = {
            let mut entries = self.entries();
            let hit = matches!(entries.get(path), Some(prev) if now - prev < window);
            entries.insert(path.to_string(), now);
            entries.retain(|_, seen| now - *seen < window);
            if hit {
                CacheStatus::Hit
            } else {
                CacheStatus::Miss
            }
        };

        match status {
            CacheStatus::Hit => self.hits.fetch_add(1, Ordering::Relaxed),
            CacheStatus::Miss => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        status
    }

    fn report(&self) -> CacheSimReport {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        CacheSimReport {
            entries: self.len(),
            hits,
            misses,
            hit_rate,
        }
    }
}
