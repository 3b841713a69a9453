//! Benchmarks for a full reconciliation pass.
//!
//! Benchmark targets:
//! - 50-agent fleet: <1ms per pass
//! - 500-agent fleet: <10ms per pass

// Criterion macros generate items without docs - this is expected for benchmarks
#![allow(missing_docs)]

use chrono::{TimeZone, Utc};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use std::time::Duration;

use topoview::{AgentRecord, EngineConfig, LinkRecord, Reconciler, Snapshot, ViewOptions};

/// Builds a fleet with a mix of root children and one-deep chains.
fn fleet(size: usize) -> Snapshot {
    let base = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let mut agents = Vec::with_capacity(size);
    let mut links = Vec::new();

    for i in 0..size {
        let mut record = AgentRecord::new(format!("agent-{i:04}"));
        if i % 7 != 0 {
            record = record.with_heartbeat(base - chrono::Duration::seconds((i as i64) % 900));
        }
        agents.push(record);

        // Every third agent chains under its predecessor.
        if i % 3 == 0 && i > 0 {
            links.push(LinkRecord::new(
                format!("agent-{i:04}"),
                format!("agent-{:04}", i - 1),
            ));
        }
    }

    Snapshot::new(agents, links)
}

fn bench_reconcile_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_pass");
    group.measurement_time(Duration::from_secs(5));
    let now = Utc.timestamp_opt(1_700_000_100, 0).unwrap();

    for size in [50, 200, 500] {
        let snapshot = fleet(size);
        group.bench_with_input(BenchmarkId::new("fleet", size), &snapshot, |b, snapshot| {
            b.iter(|| {
                let mut engine = Reconciler::new(EngineConfig::default());
                black_box(engine.reconcile(black_box(snapshot), now, &ViewOptions::default()))
            });
        });
    }

    group.finish();
}

fn bench_steady_state(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_steady_state");
    let now = Utc.timestamp_opt(1_700_000_100, 0).unwrap();
    let snapshot = fleet(200);

    // Warm engine: every node already tracked and positioned.
    let mut engine = Reconciler::new(EngineConfig::default());
    engine.reconcile(&snapshot, now, &ViewOptions::default());

    group.bench_function("repoll_200", |b| {
        b.iter(|| black_box(engine.reconcile(black_box(&snapshot), now, &ViewOptions::default())));
    });

    group.finish();
}

criterion_group!(benches, bench_reconcile_pass, bench_steady_state);
criterion_main!(benches);
