use core::hint::black_box;
use core::time::Duration;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use snowfall::{
    AtomicIdGenerator, Config, IdGenStatus, IdGenerator, Identity, Layout, LockIdGenerator, Reseed,
    SnowflakeId, ThreadRandom, TimeSource,
};
use std::{
    sync::{Arc, Barrier},
    thread::scope,
    time::Instant,
};

struct FixedMockTime {
    millis: u64,
}

impl TimeSource for FixedMockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

// One full millisecond of sequence values with the standard layout, so a
// fixed clock never runs out.
const TOTAL_IDS: usize = 4096;

fn fixed_config() -> Config {
    Config {
        epoch: Duration::ZERO,
        reseed: Reseed::Zero,
        ..Config::standard()
    }
}

fn fixed_identity() -> Identity {
    Identity::new(&Layout::STANDARD, 1, 0).unwrap()
}

fn fixed_lock() -> LockIdGenerator<FixedMockTime, ThreadRandom> {
    LockIdGenerator::from_config(
        &fixed_config(),
        fixed_identity(),
        FixedMockTime { millis: 1 },
        ThreadRandom,
    )
    .unwrap()
}

fn fixed_atomic() -> AtomicIdGenerator<FixedMockTime, ThreadRandom> {
    AtomicIdGenerator::from_config(
        &fixed_config(),
        fixed_identity(),
        FixedMockTime { millis: 1 },
        ThreadRandom,
    )
    .unwrap()
}

fn wallclock_lock() -> LockIdGenerator {
    LockIdGenerator::new(1, 0).unwrap()
}

fn wallclock_atomic() -> AtomicIdGenerator {
    AtomicIdGenerator::new(1, 0).unwrap()
}

/// Spins on `Pending { yield_for: 0 }`, which only a lost race produces.
fn poll_until_ready<G: IdGenerator>(generator: &G) -> SnowflakeId {
    loop {
        match generator.poll_id().unwrap() {
            IdGenStatus::Ready { id } => break id,
            IdGenStatus::Pending { yield_for: 0 } => core::hint::spin_loop(),
            IdGenStatus::Pending { .. } => unreachable!(),
        }
    }
}

/// Benchmarks a hot-path generator where IDs are always `Ready`.
fn bench_generator<G>(c: &mut Criterion, group_name: &str, generator_factory: impl Fn() -> G)
where
    G: IdGenerator,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let generator = generator_factory();
                for _ in 0..TOTAL_IDS {
                    match generator.poll_id().unwrap() {
                        IdGenStatus::Ready { id } => {
                            black_box(id);
                        }
                        IdGenStatus::Pending { .. } => unreachable!(),
                    }
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks generators on the wall clock, spinning when a millisecond's
/// sequence runs out.
fn bench_generator_wallclock<G>(
    c: &mut Criterion,
    group_name: &str,
    generator_factory: impl Fn() -> G,
) where
    G: IdGenerator,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let generator = generator_factory();
                for _ in 0..TOTAL_IDS {
                    black_box(generator.next_id().unwrap());
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks a generator shared across threads on a fixed clock.
fn bench_generator_contended<G>(c: &mut Criterion, group_name: &str, generator_fn: impl Fn() -> G)
where
    G: IdGenerator + Send + Sync,
{
    let mut group = c.benchmark_group(group_name);

    for thread_count in [1, 2, 4, 8, 16] {
        let ids_per_thread = TOTAL_IDS / thread_count;

        group.throughput(Throughput::Elements(TOTAL_IDS as u64));
        group.bench_function(format!("elems/{TOTAL_IDS}/threads/{thread_count}"), |b| {
            b.iter_custom(|iters| {
                let start = Instant::now();

                for _ in 0..iters {
                    let generator = Arc::new(generator_fn());
                    let barrier = Arc::new(Barrier::new(thread_count + 1));
                    scope(|s| {
                        for _ in 0..thread_count {
                            let generator = Arc::clone(&generator);
                            let barrier = Arc::clone(&barrier);
                            s.spawn(move || {
                                barrier.wait();
                                for _ in 0..ids_per_thread {
                                    black_box(poll_until_ready(&*generator));
                                }
                            });
                        }
                        barrier.wait();
                    });
                }

                start.elapsed()
            });
        });
    }

    group.finish();
}

fn benchmark_mock_sequential(c: &mut Criterion) {
    bench_generator(c, "mock/sequential/lock", fixed_lock);
    bench_generator(c, "mock/sequential/atomic", fixed_atomic);
}

fn benchmark_mock_contended(c: &mut Criterion) {
    bench_generator_contended(c, "mock/contended/lock", fixed_lock);
    bench_generator_contended(c, "mock/contended/atomic", fixed_atomic);
}

fn benchmark_wallclock(c: &mut Criterion) {
    bench_generator_wallclock(c, "wallclock/lock", wallclock_lock);
    bench_generator_wallclock(c, "wallclock/atomic", wallclock_atomic);
}

criterion_group!(
    benches,
    benchmark_mock_sequential,
    benchmark_mock_contended,
    benchmark_wallclock,
);
criterion_main!(benches);
