use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Process-wide job counters. Shared across concurrent jobs; counters only
/// ever grow and reset only with the process.
#[derive(Debug)]
pub struct Stats {
    total_attempts: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
    started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct StatsSnapshot {
    pub total_attempts: u64,
    pub successes: u64,
    pub failures: u64,
    pub started_at: DateTime<Utc>,
}

impl Stats {
    pub fn new() -> Self {
        Self::started_at(Utc::now())
    }

    pub fn started_at(started_at: DateTime<Utc>) -> Self {
        Self {
            total_attempts: AtomicU64::new(0),
            successes: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            started_at,
        }
    }

    pub fn record_attempt(&self) {
        self.total_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_success(&self) {
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total_attempts: self.total_attempts.load(Ordering::Relaxed),
            successes: self.successes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            started_at: self.started_at,
        }
    }

    pub fn success_rate(&self) -> f64 {
        self.snapshot().success_rate()
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsSnapshot {
    /// Percentage of attempts that succeeded; 0 before the first attempt.
    pub fn success_rate(&self) -> f64 {
        if self.total_attempts == 0 {
            return 0.0;
        }
        self.successes as f64 / self.total_attempts as f64 * 100.0
    }

    pub fn uptime(&self, now: DateTime<Utc>) -> chrono::Duration {
        (now - self.started_at).max(chrono::Duration::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn success_rate_zero_without_attempts() {
        let stats = Stats::new();
        assert_eq!(stats.success_rate(), 0.0);
    }

    #[test]
    fn success_rate_one_decimal() {
        let stats = Stats::new();
        for _ in 0..3 {
            stats.record_attempt();
        }
        stats.record_success();
        stats.record_failure();
        stats.record_failure();
        assert_eq!(format!("{:.1}", stats.success_rate()), "33.3");

        let snap = stats.snapshot();
        assert_eq!(snap.total_attempts, 3);
        assert_eq!(snap.successes, 1);
        assert_eq!(snap.failures, 2);
    }

    #[test]
    fn uptime_from_start() {
        let start = Utc::now() - chrono::Duration::minutes(90);
        let stats = Stats::started_at(start);
        let uptime = stats.snapshot().uptime(start + chrono::Duration::minutes(90));
        assert_eq!(uptime.num_hours(), 1);
        assert_eq!(uptime.num_minutes() % 60, 30);
    }

    #[test]
    fn concurrent_updates_are_counted() {
        let stats = Arc::new(Stats::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = stats.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        stats.record_attempt();
                        stats.record_success();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let snap = stats.snapshot();
        assert_eq!(snap.total_attempts, 8000);
        assert_eq!(snap.successes, 8000);
        assert_eq!(snap.success_rate(), 100.0);
    }
}
