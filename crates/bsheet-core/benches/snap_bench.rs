//! Benchmark: snap resolution and height resolution per release/layout pass.
//!
//! Run with: `cargo bench -p bsheet-core --bench snap_bench`
//!
//! Both run on the host's scheduler thread (snap at every release, height
//! resolution on every layout pass), so they should stay in the nanosecond
//! range even with many targets.

use std::hint::black_box;

use bsheet_core::geometry::resting_offsets;
use bsheet_core::{
    ContentHeight, ContentHeights, FixedContent, Insets, Layout, Size, SnapResolver,
};
use criterion::{Criterion, criterion_group, criterion_main};

fn bench_snap(c: &mut Criterion) {
    let resolver = SnapResolver::default();
    let few = [120.0, 420.0, 700.0];
    let many: Vec<f64> = (0u32..64).map(|i| f64::from(i) * 12.5).collect();

    let mut group = c.benchmark_group("snap_resolve");
    group.bench_function("three_targets_slow", |b| {
        b.iter(|| resolver.resolve(black_box(&few), black_box(300.0), black_box(20.0)));
    });
    group.bench_function("three_targets_flick", |b| {
        b.iter(|| resolver.resolve(black_box(&few), black_box(300.0), black_box(1200.0)));
    });
    group.bench_function("sixty_four_targets", |b| {
        b.iter(|| resolver.resolve(black_box(&many), black_box(401.0), black_box(-900.0)));
    });
    group.finish();
}

fn bench_geometry(c: &mut Criterion) {
    let layout = Layout::new(Size::new(390.0, 844.0), Insets::vertical(47.0, 34.0));
    let heights = ContentHeights::new([
        ContentHeight::Automatic,
        ContentHeight::Fixed(400.0),
        ContentHeight::Fixed(644.0),
    ])
    .expect("non-empty heights");
    let content = FixedContent(260.0);

    c.bench_function("resting_offsets_three", |b| {
        b.iter(|| resting_offsets(black_box(&heights), black_box(&layout), true, &content));
    });
}

criterion_group!(benches, bench_snap, bench_geometry);
criterion_main!(benches);
