//! Benchmark helper utilities for asebake-rs
//!
//! Generates synthetic `.ase` files and frame sets so the benchmarks do not
//! depend on assets checked into the repository.

use asebake_types::file::ase::{CelChunk, ColorDepth, FileBuilder, LayerChunk, LoopDirection, Tag};
use image::{Rgba, RgbaImage};

/// Generates an RGBA document with `frames` frames and `layers` layers.
///
/// Every layer covers a moving square of noise-like pixels, so the cels do not
/// compress to nothing. One forward tag spans all frames.
pub fn generate_test_ase(width: u16, height: u16, frames: usize, layers: usize, compress: bool) -> Vec<u8> {
	let mut builder = FileBuilder::new(width, height, ColorDepth::Rgba).compress_cels(compress);
	for layer in 0..layers {
		builder = builder.layer(LayerChunk::new(format!("layer{layer}")));
	}

	let (cel_width, cel_height) = (width.max(2) / 2, height.max(2) / 2);
	for frame in 0..frames {
		builder = builder.frame(100);
		for layer in 0..layers {
			let x = ((frame + layer) % (width as usize - cel_width as usize + 1)) as i16;
			let y = ((frame * 2 + layer) % (height as usize - cel_height as usize + 1)) as i16;
			let pixels = pattern(cel_width as u32, cel_height as u32, (frame * 31 + layer * 7) as u32);
			builder = builder.cel(frame, CelChunk::image(layer as u16, x, y, cel_width, cel_height, pixels));
		}
	}

	if frames > 0 {
		builder = builder.tag(Tag::new("all", 0, frames as u16 - 1, LoopDirection::Forward));
	}

	builder.build().unwrap_or_default()
}

/// Generates `count` opaque images with varying sizes between `min` and `max`.
pub fn generate_frames(count: usize, min: u32, max: u32) -> Vec<RgbaImage> {
	let span = max.saturating_sub(min) + 1;
	(0..count as u32)
		.map(|i| {
			let width = min + (i * 7) % span;
			let height = min + (i * 13) % span;
			RgbaImage::from_pixel(width, height, Rgba([i as u8, 128, 255 - i as u8, 255]))
		})
		.collect()
}

fn pattern(width: u32, height: u32, seed: u32) -> Vec<u8> {
	let mut pixels = Vec::with_capacity((width * height * 4) as usize);
	for y in 0..height {
		for x in 0..width {
			let v = x.wrapping_mul(31) ^ y.wrapping_mul(17) ^ seed;
			pixels.extend_from_slice(&[v as u8, (v >> 3) as u8, (v >> 5) as u8, if v % 5 == 0 { 0 } else { 255 }]);
		}
	}
	pixels
}

/// Common benchmark sizes for synthetic test data
pub mod sizes {
	/// Small sprite: 32x32
	pub const SPRITE: (u16, u16) = (32, 32);
	/// Character sheet frame: 128x128
	pub const CHARACTER: (u16, u16) = (128, 128);
	/// Large canvas: 512x512
	pub const CANVAS: (u16, u16) = (512, 512);
}

#[cfg(test)]
mod tests {
	use asebake_types::file::AseFile;

	use super::*;

	#[test]
	fn test_generate_test_ase() {
		let data = generate_test_ase(32, 32, 4, 2, true);
		let doc = AseFile::from_bytes(&data).unwrap();

		assert_eq!(doc.frames().len(), 4);
		assert_eq!(doc.layers().len(), 2);
		assert_eq!(doc.tags().len(), 1);
	}

	#[test]
	fn test_generate_frames() {
		let frames = generate_frames(10, 8, 16);
		assert_eq!(frames.len(), 10);
		assert!(frames.iter().all(|f| (8..=16).contains(&f.width()) && (8..=16).contains(&f.height())));
	}
}
