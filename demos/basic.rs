use spmc_pipe_rs::Pipe;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

fn main() {
    println!("spmc-pipe-rs basic example");
    println!("==========================\n");

    const N_CONSUMERS: usize = 4;
    const TOTAL_ITEMS: u32 = 4_000_000;

    println!("Configuration:");
    println!("  Capacity: 4096");
    println!("  Consumers: {N_CONSUMERS}");
    println!("  Total items: {TOTAL_ITEMS}\n");

    let pipe: Arc<Pipe<u32, 4096>> = Arc::new(Pipe::new());
    let start = Instant::now();

    let writer = {
        let pipe = Arc::clone(&pipe);
        thread::spawn(move || {
            let mut sent = 0u32;
            while sent < TOTAL_ITEMS {
                if pipe.try_write_front(sent) {
                    sent += 1;
                } else {
                    thread::yield_now();
                }
            }
            println!("Writer finished");
        })
    };

    let received = Arc::new(AtomicU32::new(0));
    let mut consumers = Vec::new();
    for id in 0..N_CONSUMERS {
        let pipe = Arc::clone(&pipe);
        let received = Arc::clone(&received);
        consumers.push(thread::spawn(move || {
            let mut local_count = 0u64;
            let mut local_sum = 0u64;
            let mut out = 0u32;
            loop {
                if pipe.try_read_back(&mut out) {
                    local_count += 1;
                    local_sum += u64::from(out);
                    received.fetch_add(1, Ordering::Relaxed);
                } else if received.load(Ordering::Relaxed) >= TOTAL_ITEMS {
                    break;
                } else {
                    thread::yield_now();
                }
            }
            println!("Consumer {id} drained {local_count} items");
            (local_count, local_sum)
        }));
    }

    writer.join().unwrap();
    let mut total = 0u64;
    let mut sum = 0u64;
    for c in consumers {
        let (count, partial_sum) = c.join().unwrap();
        total += count;
        sum += partial_sum;
    }

    let duration = start.elapsed();
    let expected_sum: u64 = (0..TOTAL_ITEMS).map(u64::from).sum();

    println!("\nResults:");
    println!("  Items consumed: {total}");
    println!("  Sum: {sum} (expected {expected_sum})");
    println!("  Duration: {duration:.2?}");
    println!(
        "  Throughput: {:.2} million items/sec",
        total as f64 / duration.as_secs_f64() / 1_000_000.0
    );
}
