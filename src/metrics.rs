//! Optional compile-time instrumentation for monitoring pipe activity.
//!
//! Unlike the single-writer/single-reader rings this pattern is borrowed
//! from, `try_read_back` is called concurrently by any number of consumer
//! threads, so every counter here has to be an atomic rather than a plain
//! field bumped under exclusive access. Gated behind the `metrics` feature
//! so the no-instrumentation build pays nothing for it — this is a
//! compile-time switch, not the runtime configuration §6 rules out.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic activity counters for one [`Pipe`](crate::Pipe).
#[derive(Debug, Default)]
pub struct Metrics {
    pub(crate) writes: AtomicU64,
    pub(crate) writes_full: AtomicU64,
    pub(crate) front_reads: AtomicU64,
    pub(crate) front_reads_empty: AtomicU64,
    pub(crate) back_reads: AtomicU64,
    pub(crate) back_reads_empty: AtomicU64,
    pub(crate) cas_contended: AtomicU64,
}

impl Metrics {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_write_full(&self) {
        self.writes_full.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_front_read(&self) {
        self.front_reads.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_front_read_empty(&self) {
        self.front_reads_empty.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_back_read(&self) {
        self.back_reads.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_back_read_empty(&self) {
        self.back_reads_empty.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_cas_contended(&self) {
        self.cas_contended.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot the counters. Each load is independent and `Relaxed`; the
    /// result is a best-effort view, not a consistent point-in-time snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            writes: self.writes.load(Ordering::Relaxed),
            writes_full: self.writes_full.load(Ordering::Relaxed),
            front_reads: self.front_reads.load(Ordering::Relaxed),
            front_reads_empty: self.front_reads_empty.load(Ordering::Relaxed),
            back_reads: self.back_reads.load(Ordering::Relaxed),
            back_reads_empty: self.back_reads_empty.load(Ordering::Relaxed),
            cas_contended: self.cas_contended.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time (best-effort) read of [`Metrics`]'s counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub writes: u64,
    pub writes_full: u64,
    pub front_reads: u64,
    pub front_reads_empty: u64,
    pub back_reads: u64,
    pub back_reads_empty: u64,
    pub cas_contended: u64,
}
