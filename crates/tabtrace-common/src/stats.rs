//! Per-session network counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonically non-decreasing counters shared by every page's network
/// capture. `logged + filtered == total` holds after every request-start
/// handler completes.
#[derive(Debug, Default)]
pub struct NetworkStats {
    total: AtomicU64,
    logged: AtomicU64,
    filtered: AtomicU64,
}

impl NetworkStats {
    /// Records one request and its filtering decision.
    pub fn count_request(&self, logged: bool) {
        self.total.fetch_add(1, Ordering::Relaxed);
        if logged {
            self.logged.fetch_add(1, Ordering::Relaxed);
        } else {
            self.filtered.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total: self.total.load(Ordering::Relaxed),
            logged: self.logged.load(Ordering::Relaxed),
            filtered: self.filtered.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the counters, read at shutdown for the footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub total: u64,
    pub logged: u64,
    pub filtered: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn counters_partition_total() {
        let stats = NetworkStats::default();
        stats.count_request(true);
        stats.count_request(true);
        stats.count_request(false);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total, 3);
        assert_eq!(snapshot.logged, 2);
        assert_eq!(snapshot.filtered, 1);
        assert_eq!(snapshot.total, snapshot.logged + snapshot.filtered);
    }

    #[test]
    fn invariant_holds_across_threads() {
        let stats = Arc::new(NetworkStats::default());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let stats = stats.clone();
                std::thread::spawn(move || {
                    for n in 0..250 {
                        stats.count_request((n + i) % 3 == 0);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total, 1000);
        assert_eq!(snapshot.total, snapshot.logged + snapshot.filtered);
    }
}
