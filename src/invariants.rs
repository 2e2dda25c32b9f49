//! Debug assertion macros for pipe invariants.
//!
//! These macros provide runtime checks for the invariants documented in
//! `SPEC_FULL.md` §3 and §4.1. They are only active in debug builds
//! (`#[cfg(debug_assertions)]`), so there is zero overhead in release builds.

// =============================================================================
// INV-OCC-01: Bounded Occupancy
// =============================================================================

/// Assert that occupancy never exceeds capacity.
///
/// **Invariant**: `0 ≤ (writeIndex - readCount) ≤ capacity`
macro_rules! debug_assert_bounded_occupancy {
    ($occupancy:expr, $capacity:expr) => {
        debug_assert!(
            $occupancy <= $capacity,
            "INV-OCC-01 violated: occupancy {} exceeds capacity {}",
            $occupancy,
            $capacity
        )
    };
}

// =============================================================================
// INV-MONO-01: Monotonic Progress
// =============================================================================

/// Assert that a counter only increases (modular comparison; wraps are rare
/// and handled by `wrapping_sub`, not by this macro).
macro_rules! debug_assert_monotonic {
    ($name:literal, $old:expr, $new:expr) => {
        debug_assert!(
            $new.wrapping_sub($old) < (1u32 << 31),
            "INV-MONO-01 violated: {} decreased from {} to {}",
            $name,
            $old,
            $new
        )
    };
}

// =============================================================================
// INV-FLAG-01: Valid Flag History
// =============================================================================

/// Assert that a sampled flag value is one of the three legal states.
macro_rules! debug_assert_legal_flag_state {
    ($state:expr) => {
        debug_assert!(
            $state == crate::flag::WRITABLE
                || $state == crate::flag::READABLE
                || $state == crate::flag::IN_FLIGHT,
            "INV-FLAG-01 violated: slot observed in illegal state {}",
            $state
        )
    };
}

// =============================================================================
// INV-LOOP-01: Defensive Iteration Cap
// =============================================================================

/// Assert that a retry loop inside try-read-back / try-read-front did not
/// run away. The cap itself never changes externally observable behavior
/// (§4.2 / §4.3 both note implementers may add one); this only documents
/// that, in well-formed usage, the cap is never actually reached.
macro_rules! debug_assert_loop_bounded {
    ($iterations:expr, $cap:expr) => {
        debug_assert!(
            $iterations <= $cap,
            "INV-LOOP-01 violated: retry loop exceeded defensive cap {}",
            $cap
        )
    };
}

pub(crate) use debug_assert_bounded_occupancy;
pub(crate) use debug_assert_legal_flag_state;
pub(crate) use debug_assert_loop_bounded;
pub(crate) use debug_assert_monotonic;
