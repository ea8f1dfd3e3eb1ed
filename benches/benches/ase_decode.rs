//! Benchmark suite for `.ase` decoding and frame rasterization
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml --bench ase_decode

use asebake_benches::{generate_test_ase, sizes};
use asebake_types::file::AseFile;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

fn bench_decode(c: &mut Criterion) {
	let mut group = c.benchmark_group("ase_decode");

	for (name, (width, height)) in [("sprite", sizes::SPRITE), ("character", sizes::CHARACTER), ("canvas", sizes::CANVAS)]
	{
		for compress in [false, true] {
			let data = generate_test_ase(width, height, 8, 3, compress);
			let label = if compress { format!("{name}_zlib") } else { format!("{name}_raw") };

			group.throughput(Throughput::Bytes(data.len() as u64));
			group.bench_with_input(BenchmarkId::new("from_bytes", label), &data, |b, data| {
				b.iter(|| black_box(AseFile::from_bytes(black_box(data))));
			});
		}
	}

	group.finish();
}

fn bench_render(c: &mut Criterion) {
	let mut group = c.benchmark_group("ase_render");

	for layers in [1, 4, 8] {
		let data = generate_test_ase(sizes::CHARACTER.0, sizes::CHARACTER.1, 8, layers, true);
		let Ok(doc) = AseFile::from_bytes(&data) else {
			eprintln!("Warning: could not decode generated file with {layers} layers");
			continue;
		};

		let pixels = doc.width() as u64 * doc.height() as u64 * doc.frames().len() as u64;
		group.throughput(Throughput::Elements(pixels));
		group.bench_with_input(BenchmarkId::new("render_frames", layers), &doc, |b, doc| {
			b.iter(|| black_box(doc.render_frames(true)));
		});
	}

	group.finish();
}

criterion_group!(benches, bench_decode, bench_render);
criterion_main!(benches);
