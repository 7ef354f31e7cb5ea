//! Global atomic counters for agreement runs.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. at the end of a batch).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters.
pub struct Metrics {
    tasks_processed: AtomicU64,
    submissions_accepted: AtomicU64,
    submissions_excluded: AtomicU64,
    rows_dropped: AtomicU64,
    tables_scored: AtomicU64,
    tables_skipped: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            tasks_processed: AtomicU64::new(0),
            submissions_accepted: AtomicU64::new(0),
            submissions_excluded: AtomicU64::new(0),
            rows_dropped: AtomicU64::new(0),
            tables_scored: AtomicU64::new(0),
            tables_skipped: AtomicU64::new(0),
        }
    }

    /// Increment the tasks-processed counter by one.
    pub fn inc_tasks(&self) {
        self.tasks_processed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "tasks_processed", "counter incremented");
    }

    /// Add `n` to the submissions-accepted counter.
    pub fn add_submissions_accepted(&self, n: u64) {
        self.submissions_accepted.fetch_add(n, Ordering::Relaxed);
    }

    /// Increment the submissions-excluded counter by one.
    pub fn inc_submissions_excluded(&self) {
        self.submissions_excluded.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "submissions_excluded", "counter incremented");
    }

    /// Increment the rows-dropped counter by one.
    pub fn inc_rows_dropped(&self) {
        self.rows_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the tables-scored counter by one.
    pub fn inc_tables_scored(&self) {
        self.tables_scored.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the tables-skipped counter by one.
    pub fn inc_tables_skipped(&self) {
        self.tables_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Emit all current counter values as a single `info!` event.
    ///
    /// Call this at natural boundaries (end of a batch) rather than on
    /// every increment.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            tasks_processed = self.tasks_processed(),
            submissions_accepted = self.submissions_accepted(),
            submissions_excluded = self.submissions_excluded(),
            rows_dropped = self.rows_dropped(),
            tables_scored = self.tables_scored(),
            tables_skipped = self.tables_skipped(),
        );
    }

    /// Read the current tasks-processed count.
    pub fn tasks_processed(&self) -> u64 {
        self.tasks_processed.load(Ordering::Relaxed)
    }

    /// Read the current submissions-accepted count.
    pub fn submissions_accepted(&self) -> u64 {
        self.submissions_accepted.load(Ordering::Relaxed)
    }

    /// Read the current submissions-excluded count.
    pub fn submissions_excluded(&self) -> u64 {
        self.submissions_excluded.load(Ordering::Relaxed)
    }

    /// Read the current rows-dropped count.
    pub fn rows_dropped(&self) -> u64 {
        self.rows_dropped.load(Ordering::Relaxed)
    }

    /// Read the current tables-scored count.
    pub fn tables_scored(&self) -> u64 {
        self.tables_scored.load(Ordering::Relaxed)
    }

    /// Read the current tables-skipped count.
    pub fn tables_skipped(&self) -> u64 {
        self.tables_skipped.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.tasks_processed.store(0, Ordering::Relaxed);
        self.submissions_accepted.store(0, Ordering::Relaxed);
        self.submissions_excluded.store(0, Ordering::Relaxed);
        self.rows_dropped.store(0, Ordering::Relaxed);
        self.tables_scored.store(0, Ordering::Relaxed);
        self.tables_skipped.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment() {
        let m = Metrics::new();
        assert_eq!(m.tasks_processed(), 0);
        m.inc_tasks();
        m.inc_tasks();
        assert_eq!(m.tasks_processed(), 2);

        m.add_submissions_accepted(3);
        assert_eq!(m.submissions_accepted(), 3);

        m.inc_submissions_excluded();
        m.inc_rows_dropped();
        m.inc_tables_scored();
        m.inc_tables_skipped();
        assert_eq!(m.submissions_excluded(), 1);
        assert_eq!(m.rows_dropped(), 1);
        assert_eq!(m.tables_scored(), 1);
        assert_eq!(m.tables_skipped(), 1);
    }

    #[test]
    fn reset_zeroes_all() {
        let m = Metrics::new();
        m.inc_tasks();
        m.add_submissions_accepted(2);
        m.inc_tables_scored();
        m.reset();
        assert_eq!(m.tasks_processed(), 0);
        assert_eq!(m.submissions_accepted(), 0);
        assert_eq!(m.tables_scored(), 0);
    }
}
