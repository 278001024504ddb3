//! Throughput of value delivery through the callback subscriber.

use std::hint::black_box;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use flowable_core::credits::NO_FLOW_CONTROL;
use flowable_core::subscriber::factory;
use flowable_core::subscription::CallbackSubscription;
use flowable_core::{BatchSize, Subscriber};

const VALUES: u64 = 10_000;

fn deliver(c: &mut Criterion) {
    let mut group = c.benchmark_group("on_next");
    group.throughput(Throughput::Elements(VALUES));

    for credits in [1, 64, NO_FLOW_CONTROL] {
        let Ok(batch) = BatchSize::new(credits) else {
            continue;
        };
        let label = match batch.limit() {
            Some(n) => n.to_string(),
            None => "unbounded".to_string(),
        };

        group.bench_with_input(BenchmarkId::new("batch", label), &batch, |b, &batch| {
            b.iter(|| {
                let granted = Arc::new(AtomicU64::new(0));
                let granted_clone = granted.clone();
                let subscription = CallbackSubscription::new(
                    move |n| {
                        granted_clone.fetch_add(n as u64, Ordering::Relaxed);
                    },
                    || {},
                );

                let subscriber = factory::with_next(
                    |v: u64| {
                        black_box(v);
                    },
                    batch,
                );
                subscriber.on_subscribe(subscription);
                for v in 0..VALUES {
                    subscriber.on_next(v);
                }
                subscriber.on_complete();
                black_box(granted.load(Ordering::Relaxed));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, deliver);
criterion_main!(benches);
