//! A fixed-capacity, lock-free, single-producer / multi-consumer pipe.
//!
//! Every slot carries its own atomic state flag (`WRITABLE` -> `READABLE` ->
//! `IN_FLIGHT` -> `WRITABLE`), so any number of consumer threads can race the
//! writer and each other through per-slot CAS instead of a single shared
//! dispenser counter. The writer additionally gets to steal its own
//! most-recently-published item back off the head, for work that turns out
//! not to need publishing after all.
//!
//! # Example
//!
//! ```
//! use spmc_pipe_rs::Pipe;
//!
//! let pipe: Pipe<u64, 8> = Pipe::new();
//! assert!(pipe.try_write_front(42));
//!
//! let mut out = 0u64;
//! assert!(pipe.try_read_back(&mut out));
//! assert_eq!(out, 42);
//! ```

mod backoff;
mod flag;
mod invariants;
mod metrics;
mod pipe;

pub use backoff::Backoff;
pub use flag::is_legal_flag_state;
#[cfg(feature = "metrics")]
pub use metrics::{Metrics, MetricsSnapshot};
pub use pipe::Pipe;
