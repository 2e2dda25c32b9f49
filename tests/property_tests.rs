//! Property-based tests: conservation and bounded-occupancy invariants
//! across arbitrary interleavings of the three single-threaded operations.

use proptest::prelude::*;
use spmc_pipe_rs::Pipe;

#[derive(Debug, Clone, Copy)]
enum Op {
    WriteFront(u32),
    ReadFront,
    ReadBack,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u32>().prop_map(Op::WriteFront),
        Just(Op::ReadFront),
        Just(Op::ReadBack),
    ]
}

proptest! {
    /// No sequence of single-threaded operations ever yields a value that
    /// was not previously written, loses one, or duplicates one: the full
    /// multiset delivered (across front- and back-reads, including a final
    /// drain) must equal the full multiset ever successfully written.
    #[test]
    fn never_reads_more_than_written(ops in prop::collection::vec(op_strategy(), 0..500)) {
        let pipe: Pipe<u32, 16> = Pipe::new();
        let mut written: Vec<u32> = Vec::new();
        // Models exactly what `try_read_front` must return next: the most
        // recently written item not yet delivered by either read path.
        let mut front_order: Vec<u32> = Vec::new();
        let mut delivered: Vec<u32> = Vec::new();

        for op in ops {
            match op {
                Op::WriteFront(v) => {
                    if pipe.try_write_front(v) {
                        written.push(v);
                        front_order.push(v);
                    }
                }
                Op::ReadFront => {
                    let mut out = 0;
                    if pipe.try_read_front(&mut out) {
                        let popped = front_order.pop();
                        prop_assert_eq!(Some(out), popped);
                        delivered.push(out);
                    }
                }
                Op::ReadBack => {
                    let mut out = 0;
                    if pipe.try_read_back(&mut out) {
                        if let Some(pos) = front_order.iter().position(|&x| x == out) {
                            front_order.remove(pos);
                        }
                        delivered.push(out);
                    }
                }
            }
        }

        // Drain whatever is left so the comparison below covers every item
        // ever written, not just the ones the op sequence happened to read.
        let mut out = 0;
        while pipe.try_read_back(&mut out) {
            if let Some(pos) = front_order.iter().position(|&x| x == out) {
                front_order.remove(pos);
            }
            delivered.push(out);
        }

        prop_assert!(front_order.is_empty(), "items unaccounted for after full drain");

        let mut sorted_written = written.clone();
        sorted_written.sort_unstable();
        let mut sorted_delivered = delivered.clone();
        sorted_delivered.sort_unstable();
        prop_assert_eq!(sorted_delivered, sorted_written);
    }

    /// `is_empty` agrees with whether a tail read can succeed, when no other
    /// thread is touching the pipe concurrently.
    #[test]
    fn is_empty_matches_single_threaded_drain(values in prop::collection::vec(any::<u32>(), 0..64)) {
        let pipe: Pipe<u32, 128> = Pipe::new();
        let mut pushed = 0;
        for v in &values {
            if pipe.try_write_front(*v) {
                pushed += 1;
            }
        }
        prop_assert_eq!(pipe.is_empty(), pushed == 0);

        let mut out = 0;
        let mut drained = 0;
        while pipe.try_read_back(&mut out) {
            drained += 1;
        }
        prop_assert_eq!(drained, pushed);
        prop_assert!(pipe.is_empty());
    }
}
