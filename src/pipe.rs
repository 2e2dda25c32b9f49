//! The core SPMC pipe: a fixed-capacity ring of slots, each independently
//! coordinated by the atomic flag protocol in [`crate::flag`].
//!
//! See `SPEC_FULL.md` §2-§5 for the full design rationale. This module is
//! deliberately a single value type with three hot operations plus
//! initialization and an advisory emptiness query — everything else in the
//! crate (metrics, backoff, invariants) is support tooling around it, not
//! part of the protocol itself.

use crate::flag::SlotFlag;
use crate::invariants::{
    debug_assert_bounded_occupancy, debug_assert_loop_bounded, debug_assert_monotonic,
};
#[cfg(feature = "metrics")]
use crate::metrics::Metrics;
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicU32, Ordering};

/// Wrapper that pads a hot field to 128 bytes, so that `writeIndex`,
/// `readIndex`, and `readCount` each land on their own cache line pair and
/// never false-share with each other or with the slot array. 128 rather than
/// 64 because some prefetchers pull in the adjacent line too.
#[repr(C)]
#[repr(align(128))]
struct CacheAligned<T> {
    value: T,
}

impl<T> CacheAligned<T> {
    const fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T> std::ops::Deref for CacheAligned<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

/// Validates the capacity constraint from §4.5 / §6: `N` must be a nonzero
/// power of two with `LOG2(N) < 32`.
const fn assert_valid_capacity<const N: usize>() {
    assert!(N > 0, "Pipe capacity must be > 0");
    assert!(N.is_power_of_two(), "Pipe capacity must be a power of two");
    assert!(N.trailing_zeros() < 32, "LOG2(capacity) must be < 32");
}

/// A fixed-capacity, lock-free, bounded single-producer / multi-consumer
/// pipe.
///
/// `T` must be `Copy`: every successful read is a plain load out of the slot
/// (the preceding CAS already establishes the happens-before edge), so there
/// is no ownership-transfer machinery to thread through `MaybeUninit`.
///
/// `N` is the compile-time capacity and must be a power of two (reference:
/// 512). There is no runtime `Config` — capacity is a type parameter, the
/// way the corpus's own stack-allocated ring variants fix theirs.
#[repr(C)]
pub struct Pipe<T, const N: usize> {
    /// Head; next position the writer will publish into. Writer-owned.
    write_index: CacheAligned<AtomicU32>,
    /// Writer-visible lower bound hint: "no unread item lies below this".
    read_index: CacheAligned<AtomicU32>,
    /// Count of items delivered via tail-read. Consumer-owned (aggregate).
    read_count: CacheAligned<AtomicU32>,
    /// Per-slot state flags.
    flags: [SlotFlag; N],
    /// Payload storage. `UnsafeCell` because multiple consumers share `&Pipe`.
    buffer: [UnsafeCell<MaybeUninit<T>>; N],
    #[cfg(feature = "metrics")]
    metrics: Metrics,
}

// Safety: access to `buffer` slots is serialized entirely through the
// per-slot `SlotFlag` CAS protocol (§4.1); a slot is never read by more than
// one agent at a time, and the writer never touches a slot concurrently with
// whoever holds its IN_FLIGHT claim.
unsafe impl<T: Send, const N: usize> Send for Pipe<T, N> {}
unsafe impl<T: Send, const N: usize> Sync for Pipe<T, N> {}

impl<T, const N: usize> Pipe<T, N>
where
    T: Copy,
{
    /// Defensive cap on the retry loops in `try_read_back` / `try_read_front`.
    /// Never externally observable — see INV-LOOP-01 and §4.2/§4.3.
    const RETRY_CAP: u32 = 4 * N as u32 + 64;

    const MASK: u32 = N as u32 - 1;

    #[inline]
    fn slot(index: u32) -> usize {
        (index & Self::MASK) as usize
    }

    /// `true` iff `a` is at-or-after `b` in 32-bit modular order, i.e. the
    /// wraparound-safe equivalent of `a >= b`. A plain `>=` only agrees with
    /// modular order while `a` and `b` stay within `2^31` of each other,
    /// which is not guaranteed once `writeIndex`/`readIndex` wrap past
    /// `u32::MAX` — see the wraparound test in this module.
    #[inline]
    fn at_or_after(a: u32, b: u32) -> bool {
        a.wrapping_sub(b) < (1u32 << 31)
    }

    /// Initializes a fresh pipe: zeroed counters, all flags `WRITABLE`.
    ///
    /// # Panics
    ///
    /// Panics if `N` is not a nonzero power of two, or if `LOG2(N) >= 32`.
    pub fn new() -> Self {
        assert_valid_capacity::<N>();

        Self {
            write_index: CacheAligned::new(AtomicU32::new(0)),
            read_index: CacheAligned::new(AtomicU32::new(0)),
            read_count: CacheAligned::new(AtomicU32::new(0)),
            flags: std::array::from_fn(|_| SlotFlag::new()),
            buffer: std::array::from_fn(|_| UnsafeCell::new(MaybeUninit::uninit())),
            #[cfg(feature = "metrics")]
            metrics: Metrics::new(),
        }
    }

    /// Returns the compile-time capacity `N`.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Advisory only: `true` iff `writeIndex == readCount` under `Relaxed`
    /// loads. Not authoritative in the presence of in-flight claims.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.write_index.load(Ordering::Relaxed) == self.read_count.load(Ordering::Relaxed)
    }

    /// Access to the optional atomic activity counters.
    #[cfg(feature = "metrics")]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Diagnostic only: samples every slot's raw flag value without
    /// participating in the protocol. Meant for test probes that sample
    /// concurrently with writer/consumer activity and check the result with
    /// [`crate::is_legal_flag_state`]; never called from the three core
    /// operations.
    pub fn sample_flags(&self) -> Vec<u32> {
        self.flags.iter().map(SlotFlag::sample).collect()
    }

    // -------------------------------------------------------------------
    // Writer-only: try-write-front (§4.4)
    // -------------------------------------------------------------------

    /// Pushes `value` at the head. Writer-only.
    ///
    /// Returns `true` on success, `false` if the head slot is still
    /// occupied (the ring has lapped the slowest consumer).
    pub fn try_write_front(&self, value: T) -> bool {
        let wi = self.write_index.load(Ordering::Relaxed);
        let idx = Self::slot(wi);

        if !self.flags[idx].is_writable_acquire() {
            #[cfg(feature = "metrics")]
            self.metrics.record_write_full();
            return false;
        }

        // SAFETY: the flag load above observed WRITABLE, and only the
        // writer ever stores into a WRITABLE slot's payload.
        unsafe {
            (*self.buffer[idx].get()).write(value);
        }

        self.flags[idx].publish();

        let new_wi = wi.wrapping_add(1);
        debug_assert_monotonic!("writeIndex", wi, new_wi);
        self.write_index.store(new_wi, Ordering::Relaxed);

        #[cfg(feature = "metrics")]
        self.metrics.record_write();
        true
    }

    // -------------------------------------------------------------------
    // Writer-only: try-read-front (§4.3)
    // -------------------------------------------------------------------

    /// Steals the most recently published item back from the head.
    /// Writer-only.
    ///
    /// Returns `true` and writes the value to `*out` on success, `false` if
    /// the pipe is empty or the head slot is already claimed by a consumer.
    pub fn try_read_front(&self, out: &mut T) -> bool {
        let wi = self.write_index.load(Ordering::Relaxed);
        let mut f = wi;
        let mut iterations: u32 = 0;

        let idx = loop {
            debug_assert_loop_bounded!(iterations, Self::RETRY_CAP);
            iterations += 1;

            let rc = self.read_count.load(Ordering::Relaxed);
            if wi.wrapping_sub(rc) == 0 {
                self.read_index.store(rc, Ordering::Release);
                #[cfg(feature = "metrics")]
                self.metrics.record_front_read_empty();
                return false;
            }

            f = f.wrapping_sub(1);
            let candidate = Self::slot(f);

            if self.flags[candidate].try_claim() {
                break candidate;
            }

            #[cfg(feature = "metrics")]
            self.metrics.record_cas_contended();

            let read_index = self.read_index.load(Ordering::Acquire);
            if Self::at_or_after(read_index, f) {
                #[cfg(feature = "metrics")]
                self.metrics.record_front_read_empty();
                return false;
            }
        };

        // SAFETY: we hold the winning CAS (IN_FLIGHT) on this slot, so no
        // other agent will touch its payload concurrently.
        let value = unsafe { (*self.buffer[idx].get()).assume_init() };
        *out = value;

        // RELAXED: no consumer reads this slot's payload anymore (we, the
        // writer, just consumed it); our own next publish's RELEASE is what
        // establishes the real handoff. See SPEC_FULL.md §9.6.
        self.flags[idx].release_from_front_read();

        // Retract writeIndex by exactly one relative to the snapshot taken
        // at the top of this call — not to the physical slot `idx` actually
        // claimed. Deliberate; see SPEC_FULL.md §4.3 step 5 / §9.6.
        let new_wi = wi.wrapping_sub(1);
        debug_assert_bounded_occupancy!(
            new_wi.wrapping_sub(self.read_count.load(Ordering::Relaxed)),
            N as u32
        );
        self.write_index.store(new_wi, Ordering::Relaxed);

        #[cfg(feature = "metrics")]
        self.metrics.record_front_read();
        true
    }

    // -------------------------------------------------------------------
    // Any reader: try-read-back (§4.2)
    // -------------------------------------------------------------------

    /// Pops the oldest available item from the tail. Safe for any number of
    /// concurrent callers, racing the writer and each other.
    ///
    /// Returns `true` and writes the value to `*out` on success, `false` on
    /// empty (or on losing every race attempted within this call).
    pub fn try_read_back(&self, out: &mut T) -> bool {
        let mut rc = self.read_count.load(Ordering::Relaxed);
        let mut i = rc;
        let mut iterations: u32 = 0;

        let idx = loop {
            debug_assert_loop_bounded!(iterations, Self::RETRY_CAP);
            iterations += 1;

            let wi = self.write_index.load(Ordering::Relaxed);
            if wi.wrapping_sub(rc) == 0 {
                #[cfg(feature = "metrics")]
                self.metrics.record_back_read_empty();
                return false;
            }

            if Self::at_or_after(i, wi) {
                i = self.read_index.load(Ordering::Relaxed);
            }

            let candidate = Self::slot(i);
            if self.flags[candidate].try_claim() {
                break candidate;
            }

            #[cfg(feature = "metrics")]
            self.metrics.record_cas_contended();

            i = i.wrapping_add(1);
            rc = self.read_count.load(Ordering::Relaxed);
        };

        self.read_count.fetch_add(1, Ordering::Relaxed);

        // SAFETY: we hold the winning CAS (IN_FLIGHT) on this slot.
        let value = unsafe { (*self.buffer[idx].get()).assume_init() };
        *out = value;

        self.flags[idx].release_from_back_read();

        #[cfg(feature = "metrics")]
        self.metrics.record_back_read();
        true
    }
}

impl<T, const N: usize> Default for Pipe<T, N>
where
    T: Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl<T, const N: usize> Pipe<T, N>
where
    T: Copy,
{
    /// Test-only: builds a pipe with its three counters pre-seeded, so
    /// wraparound behavior near `u32::MAX` can be exercised directly
    /// instead of looping billions of times.
    fn new_with_counters(write_index: u32, read_index: u32, read_count: u32) -> Self {
        let pipe = Self::new();
        pipe.write_index.store(write_index, Ordering::Relaxed);
        pipe.read_index.store(read_index, Ordering::Relaxed);
        pipe.read_count.store(read_count, Ordering::Relaxed);
        pipe
    }
}
