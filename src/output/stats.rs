//! Live crawl statistics
//!
//! Counters are updated from every scan task without locking and read back
//! as a [`StatsSnapshot`] once the run is over.

use crate::state::RejectReason;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by all scan tasks of one run
#[derive(Debug, Default)]
pub struct CrawlStats {
    attempts: AtomicU64,
    rejected_depth: AtomicU64,
    rejected_scheme: AtomicU64,
    rejected_duplicate: AtomicU64,
    rejected_cancelled: AtomicU64,
    fetched: AtomicU64,
    failed: AtomicU64,
    dispatched: AtomicU64,
    dropped: AtomicU64,
}

impl CrawlStats {
    /// Creates a zeroed set of counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts a scan attempt, before any guard runs
    pub fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts an attempt stopped at a guard
    pub fn record_rejection(&self, reason: RejectReason) {
        self.rejection_counter(reason)
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a successful fetch
    pub fn record_fetched(&self) {
        self.fetched.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a failed fetch
    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts child scans dispatched from one page
    pub fn record_dispatched(&self, count: usize) {
        self.dispatched.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Counts a result that was produced after the funnel stopped listening
    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Copies the current counter values
    pub fn snapshot(&self) -> StatsSnapshot {
        let rejections = RejectReason::all()
            .into_iter()
            .map(|reason| (reason, self.rejection_counter(reason).load(Ordering::Relaxed)))
            .filter(|(_, count)| *count > 0)
            .collect();

        StatsSnapshot {
            attempts: self.attempts.load(Ordering::Relaxed),
            rejections,
            fetched: self.fetched.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }

    fn rejection_counter(&self, reason: RejectReason) -> &AtomicU64 {
        match reason {
            RejectReason::Depth => &self.rejected_depth,
            RejectReason::Scheme => &self.rejected_scheme,
            RejectReason::Duplicate => &self.rejected_duplicate,
            RejectReason::Cancelled => &self.rejected_cancelled,
        }
    }
}

/// Point-in-time copy of [`CrawlStats`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Scan attempts started
    pub attempts: u64,

    /// Attempts stopped at a guard, by reason (zero counts omitted)
    pub rejections: HashMap<RejectReason, u64>,

    /// Successful fetches
    pub fetched: u64,

    /// Failed fetches
    pub failed: u64,

    /// Child scans dispatched
    pub dispatched: u64,

    /// Results produced after the run stopped consuming
    pub dropped: u64,
}

impl StatsSnapshot {
    /// Number of attempts rejected for the given reason
    pub fn rejected(&self, reason: RejectReason) -> u64 {
        self.rejections.get(&reason).copied().unwrap_or(0)
    }

    /// Total number of rejected attempts
    pub fn total_rejected(&self) -> u64 {
        self.rejections.values().sum()
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &StatsSnapshot) {
    println!("Scan Attempts:");
    println!("  Started: {}", stats.attempts);
    println!("  Fetched: {}", stats.fetched);
    println!("  Failed: {}", stats.failed);
    println!("  Child scans dispatched: {}", stats.dispatched);
    if stats.dropped > 0 {
        println!("  Dropped at shutdown: {}", stats.dropped);
    }
    println!();

    if !stats.rejections.is_empty() {
        println!("Rejections ({} total):", stats.total_rejected());
        let mut counts: Vec<_> = stats.rejections.iter().collect();
        counts.sort_by(|a, b| b.1.cmp(a.1));

        for (reason, count) in counts {
            let percentage = if stats.attempts > 0 {
                (*count as f64 / stats.attempts as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", reason, count, percentage);
        }
        println!();
    }
}
