//! Hot path benchmarks for the instrumentation core.
//!
//! The increment and record paths sit inside application request handling,
//! so their per-call cost matters more than anything else in this crate.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use metron::{StripedAdder, TimeUnit, TimerMetric};
use std::sync::Arc;
use std::time::Duration;

/// Benchmark striped adder increments, uncontended and contended.
fn bench_striped_adder(c: &mut Criterion) {
    let mut group = c.benchmark_group("striped_adder");

    group.bench_function("increment_uncontended", |b| {
        let adder = StripedAdder::new();
        b.iter(|| {
            adder.add(black_box(1));
        });
    });

    group.bench_function("increment_contended", |b| {
        let adder = Arc::new(StripedAdder::new());
        let stop = Arc::new(std::sync::atomic::AtomicBool::new(false));

        // Background writers keep the base cell hot so the striped path
        // is what gets measured.
        let mut writers = vec![];
        for _ in 0..4 {
            let adder = adder.clone();
            let stop = stop.clone();
            writers.push(std::thread::spawn(move || {
                while !stop.load(std::sync::atomic::Ordering::Relaxed) {
                    adder.add(1);
                }
            }));
        }

        b.iter(|| {
            adder.add(black_box(1));
        });

        stop.store(true, std::sync::atomic::Ordering::Relaxed);
        for writer in writers {
            writer.join().unwrap();
        }
    });

    group.bench_function("value_with_stripes", |b| {
        let adder = StripedAdder::new();
        for _ in 0..100_000 {
            adder.add(1);
        }
        b.iter(|| {
            black_box(adder.value());
        });
    });

    group.finish();
}

/// Benchmark reservoir insertion at and over capacity.
fn bench_reservoir_update(c: &mut Criterion) {
    use metron::reservoir::{ExponentiallyDecayingReservoir, Reservoir};
    use metron::MonotonicClock;

    let mut group = c.benchmark_group("reservoir");

    group.bench_function("update_at_capacity", |b| {
        let reservoir = ExponentiallyDecayingReservoir::new(Arc::new(MonotonicClock::new()));
        for i in 0..2_000 {
            reservoir.update(i, None);
        }
        let mut i = 0i64;
        b.iter(|| {
            i += 1;
            reservoir.update(black_box(i), None);
        });
    });

    group.bench_function("snapshot_1028", |b| {
        let reservoir = ExponentiallyDecayingReservoir::new(Arc::new(MonotonicClock::new()));
        for i in 0..2_000 {
            reservoir.update(i, None);
        }
        b.iter(|| {
            black_box(reservoir.snapshot(false));
        });
    });

    group.finish();
}

/// Benchmark the full timer record path: histogram + meter + total adder.
fn bench_timer_record(c: &mut Criterion) {
    let mut group = c.benchmark_group("timer");

    group.bench_function("record_millis", |b| {
        let timer = TimerMetric::new();
        b.iter(|| {
            timer.record(black_box(12), TimeUnit::Milliseconds, None);
        });
    });

    group.bench_function("record_tagged", |b| {
        let timer = TimerMetric::new();
        b.iter(|| {
            timer.record(black_box(12), TimeUnit::Milliseconds, Some("route"));
        });
    });

    group.bench_function("time_closure", |b| {
        let timer = TimerMetric::new();
        b.iter(|| {
            let out = timer.time(|| black_box(6 * 7), None);
            black_box(out);
        });
    });

    group.finish();
}

criterion_group! {
    name = hot_paths;
    config = Criterion::default()
        .significance_level(0.01)
        .sample_size(500)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(2));
    targets = bench_striped_adder, bench_reservoir_update, bench_timer_record
}

criterion_main!(hot_paths);
