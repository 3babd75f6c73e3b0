//! Progress tracking utilities
//!
//! A thread-safe tracker that logs progress when the running count crosses
//! interval boundaries.

use log::info;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe progress tracker for logging progress at regular intervals.
///
/// # Example
/// ```
/// use gafsort_lib::progress::ProgressTracker;
///
/// let tracker = ProgressTracker::new("Sorted records").with_interval(100);
///
/// for _ in 0..250 {
///     tracker.log_if_needed(1); // Logs at 100, 200
/// }
/// tracker.log_final(); // Logs "Sorted records 250 (complete)"
/// ```
pub struct ProgressTracker {
    /// The logging interval - progress is logged when count crosses multiples of this.
    interval: u64,
    /// Message prefix for log output.
    message: String,
    /// Internal count of items processed (thread-safe).
    count: AtomicU64,
}

impl ProgressTracker {
    /// Create a new progress tracker with the specified message and the
    /// default interval of 1,000,000.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { interval: 1_000_000, message: message.into(), count: AtomicU64::new(0) }
    }

    /// Set the logging interval.
    #[must_use]
    pub fn with_interval(mut self, interval: u64) -> Self {
        self.interval = interval.max(1);
        self
    }

    /// Add to the count and log for each interval boundary crossed.
    ///
    /// Returns `true` if the final count is exactly a multiple of the
    /// interval (so `log_final` knows whether a message is still needed).
    pub fn log_if_needed(&self, additional: u64) -> bool {
        if additional == 0 {
            let count = self.count.load(Ordering::Relaxed);
            return count > 0 && count.is_multiple_of(self.interval);
        }

        let prev = self.count.fetch_add(additional, Ordering::Relaxed);
        let new_count = prev + additional;

        let prev_intervals = prev / self.interval;
        let new_intervals = new_count / self.interval;
        for i in (prev_intervals + 1)..=new_intervals {
            info!("{} {}", self.message, i * self.interval);
        }

        new_count.is_multiple_of(self.interval)
    }

    /// Current count.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Log the final count unless the last `log_if_needed` already did.
    pub fn log_final(&self) {
        let count = self.count.load(Ordering::Relaxed);
        if count > 0 && !count.is_multiple_of(self.interval) {
            info!("{} {} (complete)", self.message, count);
        }
    }
}
