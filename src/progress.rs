//! Progress tracking for a running search.
//!
//! Workers batch their attempt counts locally and publish them with one
//! relaxed atomic add per poll checkpoint, so the hot loop never contends
//! on shared state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Shared attempt counter for one search run.
pub struct SearchStats {
    attempts: AtomicU64,
    started: Instant,
}

impl SearchStats {
    pub fn new() -> Self {
        Self {
            attempts: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    /// Publish a batch of attempts (zero-overhead atomic increment).
    pub fn record_attempts(&self, count: u64) {
        if count > 0 {
            self.attempts.fetch_add(count, Ordering::Relaxed);
        }
    }

    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Snapshot the current state against the keyspace size.
    pub fn snapshot(&self, total: u64) -> SearchProgress {
        let attempts = self.attempts();
        let elapsed = self.elapsed();
        let secs = elapsed.as_secs_f64();
        let rate = if secs > 0.0 { attempts as f64 / secs } else { 0.0 };
        let percent = if total > 0 {
            (attempts as f64 / total as f64 * 100.0).min(100.0) as f32
        } else {
            100.0
        };
        SearchProgress { attempts, total, elapsed, rate, percent }
    }
}

impl Default for SearchStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of a search, handed to progress callbacks.
#[derive(Debug, Clone)]
pub struct SearchProgress {
    pub attempts: u64,
    pub total: u64,
    pub elapsed: Duration,
    /// Candidates tried per second since the search started.
    pub rate: f64,
    pub percent: f32,
}

/// Progress callback function type.
pub type ProgressCallback = dyn Fn(SearchProgress) + Sync;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batched_attempts_accumulate() {
        let stats = SearchStats::new();
        stats.record_attempts(1000);
        stats.record_attempts(0);
        stats.record_attempts(24);
        assert_eq!(stats.attempts(), 1024);
    }

    #[test]
    fn snapshot_caps_percent_at_hundred() {
        let stats = SearchStats::new();
        stats.record_attempts(16);
        let progress = stats.snapshot(8);
        assert_eq!(progress.percent, 100.0);
        assert_eq!(progress.attempts, 16);
    }
}
