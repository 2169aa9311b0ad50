//! Listener dispatch benchmark suite.
//!
//! Measures the cost of fanning one inbound frame out to its listeners:
//! - Listener counts: 1, 10, 100
//! - Raw registry emit vs. parse-then-emit of a text frame
//!
//! Run with: cargo bench --bench dispatch
//! Results saved to: target/criterion/

use std::hint::black_box;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::{Value, json};

use openslam_client::realtime::events::EVALUATION_COMPLETE;
use openslam_client::realtime::{Frame, ListenerRegistry};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const LISTENER_COUNTS: &[usize] = &[1, 10, 100];

const FRAME: &str = r#"{"type":"evaluation_complete","payload":{"name":"run1","ate_rmse":0.0421,"rpe_rmse":0.0133}}"#;

fn registry_with(listeners: usize, hits: &Arc<AtomicU64>) -> ListenerRegistry {
    let registry = ListenerRegistry::new();
    for _ in 0..listeners {
        let hits = Arc::clone(hits);
        registry.add(
            EVALUATION_COMPLETE,
            Arc::new(move |_: &Value| {
                hits.fetch_add(1, Ordering::Relaxed);
            }),
        );
    }
    registry
}

// ============================================================================
// Benchmark: Registry Emit
// ============================================================================

fn bench_emit(c: &mut Criterion) {
    let mut group = c.benchmark_group("emit");
    let payload = json!({ "name": "run1" });

    for &count in LISTENER_COUNTS {
        let hits = Arc::new(AtomicU64::new(0));
        let registry = registry_with(count, &hits);

        group.bench_with_input(BenchmarkId::new("listeners", count), &count, |b, _| {
            b.iter(|| registry.emit(black_box(EVALUATION_COMPLETE), black_box(&payload)));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Parse + Emit
// ============================================================================

fn bench_parse_and_emit(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_and_emit");

    for &count in LISTENER_COUNTS {
        let hits = Arc::new(AtomicU64::new(0));
        let registry = registry_with(count, &hits);

        group.bench_with_input(BenchmarkId::new("listeners", count), &count, |b, _| {
            b.iter(|| {
                let frame = Frame::parse(black_box(FRAME)).unwrap();
                registry.emit(&frame.event_type, &frame.payload)
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Unmatched Event
// ============================================================================

fn bench_unmatched(c: &mut Criterion) {
    let hits = Arc::new(AtomicU64::new(0));
    let registry = registry_with(100, &hits);

    c.bench_function("emit_unmatched", |b| {
        b.iter(|| registry.emit(black_box("config_update"), black_box(&Value::Null)));
    });
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(benches, bench_emit, bench_parse_and_emit, bench_unmatched);
criterion_main!(benches);
