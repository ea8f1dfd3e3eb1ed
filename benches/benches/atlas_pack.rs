//! Benchmark suite for atlas packing
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml --bench atlas_pack

use asebake_benches::generate_frames;
use asebake_types::atlas::{AtlasBuilder, AtlasConfig, SizePolicy};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

fn bench_pack(c: &mut Criterion) {
	let mut group = c.benchmark_group("atlas_pack");

	for count in [16, 64, 256] {
		let frames = generate_frames(count, 16, 64);
		group.throughput(Throughput::Elements(count as u64));

		let builder = AtlasBuilder::new(AtlasConfig::default());
		group.bench_with_input(BenchmarkId::new("power_of_two", count), &frames, |b, frames| {
			b.iter(|| black_box(builder.pack(black_box(frames))));
		});

		let tight = AtlasBuilder::new(AtlasConfig {
			padding: 2,
			size_policy: SizePolicy::Tight,
			..AtlasConfig::default()
		});
		group.bench_with_input(BenchmarkId::new("tight_padded", count), &frames, |b, frames| {
			b.iter(|| black_box(tight.pack(black_box(frames))));
		});
	}

	group.finish();
}

criterion_group!(benches, bench_pack);
criterion_main!(benches);
