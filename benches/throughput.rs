use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use spmc_pipe_rs::Pipe;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;

const MSGS: u64 = 2_000_000;

fn bench_single_writer_single_consumer(c: &mut Criterion) {
    let mut group = c.benchmark_group("spsc");
    group.throughput(Throughput::Elements(MSGS));

    group.bench_function("write_front_read_back", |b| {
        b.iter(|| {
            let pipe: Arc<Pipe<u32, 4096>> = Arc::new(Pipe::new());

            let writer_pipe = Arc::clone(&pipe);
            let writer = thread::spawn(move || {
                let mut sent = 0u64;
                while sent < MSGS {
                    if writer_pipe.try_write_front(sent as u32) {
                        sent += 1;
                    } else {
                        std::hint::spin_loop();
                    }
                }
            });

            let mut received = 0u64;
            let mut out = 0u32;
            while received < MSGS {
                if pipe.try_read_back(&mut out) {
                    black_box(out);
                    received += 1;
                } else {
                    std::hint::spin_loop();
                }
            }

            writer.join().unwrap();
        });
    });

    group.finish();
}

fn bench_single_writer_many_consumers(c: &mut Criterion) {
    let mut group = c.benchmark_group("spmc");

    for num_consumers in [2, 4, 8].iter() {
        group.throughput(Throughput::Elements(MSGS));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("1W_{}C", num_consumers)),
            num_consumers,
            |b, &n| {
                b.iter(|| {
                    let pipe: Arc<Pipe<u32, 4096>> = Arc::new(Pipe::new());
                    let received = Arc::new(AtomicU32::new(0));

                    let writer_pipe = Arc::clone(&pipe);
                    let writer = thread::spawn(move || {
                        let mut sent = 0u64;
                        while sent < MSGS {
                            if writer_pipe.try_write_front(sent as u32) {
                                sent += 1;
                            } else {
                                std::hint::spin_loop();
                            }
                        }
                    });

                    let mut consumers = Vec::new();
                    for _ in 0..n {
                        let pipe = Arc::clone(&pipe);
                        let received = Arc::clone(&received);
                        consumers.push(thread::spawn(move || {
                            let mut out = 0u32;
                            loop {
                                if pipe.try_read_back(&mut out) {
                                    black_box(out);
                                    if u64::from(received.fetch_add(1, Ordering::Relaxed) + 1)
                                        >= MSGS
                                    {
                                        break;
                                    }
                                } else if u64::from(received.load(Ordering::Relaxed)) >= MSGS {
                                    break;
                                } else {
                                    std::hint::spin_loop();
                                }
                            }
                        }));
                    }

                    writer.join().unwrap();
                    for c in consumers {
                        c.join().unwrap();
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_writer_side_steal(c: &mut Criterion) {
    let mut group = c.benchmark_group("front_read");
    let msgs = 500_000u64;
    group.throughput(Throughput::Elements(msgs));

    group.bench_function("write_then_steal_back", |b| {
        b.iter(|| {
            let pipe: Pipe<u32, 1024> = Pipe::new();
            let mut out = 0u32;
            for i in 0..msgs {
                pipe.try_write_front(i as u32);
                pipe.try_read_front(&mut out);
                black_box(out);
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_single_writer_single_consumer,
    bench_single_writer_many_consumers,
    bench_writer_side_steal
);
criterion_main!(benches);
