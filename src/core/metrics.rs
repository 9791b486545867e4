//! Adapter metrics for observability
//!
//! Counters for emitted records and for failures that were routed to the
//! side channel instead of the log stream.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for adapter observability
///
/// # Example
///
/// ```
/// use rust_log_adapter::AdapterMetrics;
///
/// let metrics = AdapterMetrics::new();
/// metrics.record_emitted();
/// metrics.record_file_failure();
///
/// assert_eq!(metrics.records_emitted(), 1);
/// assert_eq!(metrics.sink_failures(), 1);
/// ```
#[derive(Debug, Default)]
pub struct AdapterMetrics {
    /// Records passed to `emit`
    records_emitted: AtomicU64,

    /// Failed writes to the file sink
    file_failures: AtomicU64,

    /// Failed writes to the console sink
    console_failures: AtomicU64,

    /// Lock calls that errored or timed out; the write was still attempted
    lock_failures: AtomicU64,
}

impl AdapterMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            records_emitted: AtomicU64::new(0),
            file_failures: AtomicU64::new(0),
            console_failures: AtomicU64::new(0),
            lock_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn records_emitted(&self) -> u64 {
        self.records_emitted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn file_failures(&self) -> u64 {
        self.file_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn console_failures(&self) -> u64 {
        self.console_failures.load(Ordering::Relaxed)
    }

    /// Failed writes across both sinks
    #[inline]
    pub fn sink_failures(&self) -> u64 {
        self.file_failures() + self.console_failures()
    }

    #[inline]
    pub fn lock_failures(&self) -> u64 {
        self.lock_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_emitted(&self) -> u64 {
        self.records_emitted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_file_failure(&self) -> u64 {
        self.file_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_console_failure(&self) -> u64 {
        self.console_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_lock_failure(&self) -> u64 {
        self.lock_failures.fetch_add(1, Ordering::Relaxed)
    }
}
