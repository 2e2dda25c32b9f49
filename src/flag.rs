//! Per-slot atomic state flag: the serialization point of the pipe.
//!
//! Every slot cycles through exactly three states, and every transition is a
//! single atomic operation with an explicit ordering (see `spec.md` §4.1):
//!
//! ```text
//! WRITABLE --(writer store, RELEASE)--> READABLE
//! READABLE --(CAS by any reader, ACQ_REL on success)--> IN_FLIGHT
//! IN_FLIGHT --(holder store, RELEASE for back, RELAXED for front)--> WRITABLE
//! ```
//!
//! Readers coordinate through this per-slot CAS instead of a single shared
//! dispenser counter, which is what lets any number of consumers race the
//! writer (and each other) without a contended hot spot.

use std::sync::atomic::{AtomicU32, Ordering};

/// Slot is empty; the writer may store a payload and publish.
pub(crate) const WRITABLE: u32 = 0;
/// Slot holds a published payload not yet claimed by any reader.
pub(crate) const READABLE: u32 = 1;
/// Some reader won the CAS on this slot and is transferring its payload out.
pub(crate) const IN_FLIGHT: u32 = 2;

/// The atomic state word for one ring slot.
///
/// `WRITABLE` is the zero pattern, so a freshly allocated `AtomicU32::new(0)`
/// is already in the correct initial state — but it is still constructed
/// explicitly rather than left as zeroed-but-uninitialized memory.
#[derive(Debug)]
pub(crate) struct SlotFlag(AtomicU32);

impl SlotFlag {
    #[inline]
    pub(crate) fn new() -> Self {
        Self(AtomicU32::new(WRITABLE))
    }

    /// Writer-only: publish a just-written payload. §4.4 step 4.
    #[inline]
    pub(crate) fn publish(&self) {
        self.0.store(READABLE, Ordering::Release);
    }

    /// Any reader: try to win this slot. Success moves READABLE -> IN_FLIGHT
    /// and establishes the happens-before edge back to the writer's publish.
    #[inline]
    pub(crate) fn try_claim(&self) -> bool {
        self.0
            .compare_exchange(READABLE, IN_FLIGHT, Ordering::AcqRel, Ordering::Relaxed)
            .is_ok()
    }

    /// Consumer (tail) release: §4.2 step 6, RELEASE so the writer's next
    /// ACQUIRE load of this flag sees a slot it may safely reuse.
    #[inline]
    pub(crate) fn release_from_back_read(&self) {
        self.0.store(WRITABLE, Ordering::Release);
    }

    /// Writer (front) release: §4.3 step 4, RELAXED — no consumer reads this
    /// slot's payload anymore, since the writer just consumed it and the
    /// writer's own subsequent RELEASE publish is what readers actually
    /// synchronize with.
    #[inline]
    pub(crate) fn release_from_front_read(&self) {
        self.0.store(WRITABLE, Ordering::Relaxed);
    }

    /// §4.4 step 2: ACQUIRE load, since a `true` result gates a plain payload
    /// store with no further synchronization of its own.
    #[inline]
    pub(crate) fn is_writable_acquire(&self) -> bool {
        self.0.load(Ordering::Acquire) == WRITABLE
    }

    /// Diagnostic: sample the raw state without participating in the
    /// protocol. Used by sampling-probe tests; never called from the three
    /// core operations. Asserts INV-FLAG-01 on every sample in debug builds.
    #[inline]
    pub(crate) fn sample(&self) -> u32 {
        let value = self.0.load(Ordering::Relaxed);
        crate::invariants::debug_assert_legal_flag_state!(value);
        value
    }
}

/// `true` iff `value` is one of the three legal slot states (`WRITABLE`,
/// `READABLE`, `IN_FLIGHT`). Exposed for sampling-probe tests outside the
/// crate; the crate's own internal checks use
/// [`crate::invariants::debug_assert_legal_flag_state`] directly instead.
pub fn is_legal_flag_state(value: u32) -> bool {
    matches!(value, WRITABLE | READABLE | IN_FLIGHT)
}
