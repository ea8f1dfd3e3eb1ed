//! Texture atlas packing.
//!
//! [`AtlasBuilder`] places a list of RGBA images into one atlas using shelf
//! packing. Images are placed largest first, and the atlas grows by powers of
//! two until everything fits; a side that would pass `max_size` is clamped to
//! it. Placement only depends on the image sizes and their order, so
//! identical inputs always produce identical atlases.
//!
//! # Examples
//!
//! ```
//! use asebake_types::atlas::{AtlasBuilder, AtlasConfig};
//! use image::RgbaImage;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let images = vec![RgbaImage::new(32, 32), RgbaImage::new(16, 8)];
//! let atlas = AtlasBuilder::new(AtlasConfig::default()).pack(&images)?;
//!
//! assert_eq!(atlas.rects.len(), 2);
//! assert_eq!((atlas.width, atlas.height), (64, 32));
//! # Ok(())
//! # }
//! ```

use std::cmp::Reverse;

use glam::Vec2;
use image::{Rgba, RgbaImage, imageops};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default upper bound for either atlas side.
pub const DEFAULT_MAX_SIZE: u32 = 8192;

/// Errors that can occur while packing an atlas.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AtlasError {
	/// An image, or the atlas needed to hold every image, is larger than allowed
	#[error("Atlas overflow: {width}x{height} exceeds the maximum size of {max_size}")]
	Overflow {
		/// Width that did not fit
		width: u32,
		/// Height that did not fit
		height: u32,
		/// Configured maximum side length
		max_size: u32,
	},
}

/// How the final atlas size is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizePolicy {
	/// Both sides are powers of two, unless clamped to `max_size`
	#[default]
	PowerOfTwo,
	/// The atlas is cropped to the area actually used
	Tight,
}

/// How transparent pixels are identified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransparencyMode {
	/// Trust the alpha channel
	#[default]
	Alpha,
	/// Pixels with this RGB color become fully transparent
	ColorKey([u8; 3]),
}

/// Atlas packing limits and layout options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
	/// Largest allowed atlas side in pixels
	pub max_size: u32,
	/// Gap in pixels between neighbouring images
	pub padding: u32,
	/// Final size policy
	pub size_policy: SizePolicy,
}

impl Default for AtlasConfig {
	fn default() -> Self {
		Self {
			max_size: DEFAULT_MAX_SIZE,
			padding: 0,
			size_policy: SizePolicy::PowerOfTwo,
		}
	}
}

/// Border insets of a sprite, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteBorder {
	/// Left inset
	pub left: u32,
	/// Bottom inset
	pub bottom: u32,
	/// Right inset
	pub right: u32,
	/// Top inset
	pub top: u32,
}

/// Placement of one input image inside the atlas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpriteRect {
	/// Left edge in pixels
	pub x: u32,
	/// Top edge in pixels
	pub y: u32,
	/// Width in pixels
	pub width: u32,
	/// Height in pixels
	pub height: u32,
	/// Pivot in pixels, relative to the bottom-left corner of the sprite
	pub pivot: Vec2,
	/// Border insets
	pub border: SpriteBorder,
}

impl SpriteRect {
	/// Returns `true` if the two rectangles share at least one pixel.
	pub fn overlaps(&self, other: &Self) -> bool {
		self.x < other.x + other.width
			&& other.x < self.x + self.width
			&& self.y < other.y + other.height
			&& other.y < self.y + self.height
	}
}

/// Packed atlas image plus one rectangle per input, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackedAtlas {
	/// Atlas width in pixels
	pub width: u32,
	/// Atlas height in pixels
	pub height: u32,
	/// Placement of each input image
	pub rects: Vec<SpriteRect>,
	/// Atlas pixels
	#[serde(skip)]
	pub image: RgbaImage,
}

/// Packs images into a [`PackedAtlas`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasBuilder {
	config: AtlasConfig,
	pivot: Vec2,
	border: SpriteBorder,
	transparency: TransparencyMode,
}

impl AtlasBuilder {
	/// Creates a builder with a centered pivot and no border.
	pub fn new(config: AtlasConfig) -> Self {
		Self {
			config,
			pivot: Vec2::splat(0.5),
			border: SpriteBorder::default(),
			transparency: TransparencyMode::Alpha,
		}
	}

	/// Sets the normalized pivot applied to every sprite.
	pub fn pivot(mut self, pivot: Vec2) -> Self {
		self.pivot = pivot;
		self
	}

	/// Sets the border insets applied to every sprite.
	pub fn border(mut self, border: SpriteBorder) -> Self {
		self.border = border;
		self
	}

	/// Sets how transparent pixels are identified.
	pub fn transparency(mut self, mode: TransparencyMode) -> Self {
		self.transparency = mode;
		self
	}

	/// Packs `images` into one atlas.
	///
	/// An empty input produces a 1x1 transparent atlas with no rectangles.
	///
	/// # Errors
	///
	/// Returns [`AtlasError::Overflow`] if a single image is larger than
	/// `max_size` on either axis, or the images cannot fit an atlas of at most
	/// `max_size` per side.
	pub fn pack(&self, images: &[RgbaImage]) -> Result<PackedAtlas, AtlasError> {
		if images.is_empty() {
			return Ok(PackedAtlas {
				width: 1,
				height: 1,
				rects: Vec::new(),
				image: RgbaImage::new(1, 1),
			});
		}

		let sizes: Vec<(u32, u32)> = images.iter().map(RgbaImage::dimensions).collect();
		let max_size = self.config.max_size;
		if let Some(&(width, height)) = sizes.iter().find(|(w, h)| *w > max_size || *h > max_size) {
			return Err(AtlasError::Overflow {
				width,
				height,
				max_size,
			});
		}

		let (mut width, mut height, placements) = self.layout(&sizes)?;
		if self.config.size_policy == SizePolicy::Tight {
			width = placements.iter().zip(&sizes).map(|((x, _), (w, _))| x + w).max().unwrap_or(1).max(1);
			height = placements.iter().zip(&sizes).map(|((_, y), (_, h))| y + h).max().unwrap_or(1).max(1);
		}

		let mut image = RgbaImage::new(width, height);
		let mut rects = Vec::with_capacity(images.len());
		for (source, &(x, y)) in images.iter().zip(&placements) {
			match self.transparency {
				TransparencyMode::Alpha => imageops::replace(&mut image, source, x as i64, y as i64),
				TransparencyMode::ColorKey(key) => {
					imageops::replace(&mut image, &apply_color_key(source, key), x as i64, y as i64);
				}
			}
			rects.push(SpriteRect {
				x,
				y,
				width: source.width(),
				height: source.height(),
				pivot: self.pivot * Vec2::new(source.width() as f32, source.height() as f32),
				border: self.border,
			});
		}

		log::debug!("Packed {} images into a {width}x{height} atlas", images.len());

		Ok(PackedAtlas {
			width,
			height,
			rects,
			image,
		})
	}

	/// Finds the atlas size and the top-left corner of every image.
	fn layout(&self, sizes: &[(u32, u32)]) -> Result<(u32, u32, Vec<(u32, u32)>), AtlasError> {
		let padding = self.config.padding;
		let max_size = self.config.max_size;

		let mut order: Vec<usize> = (0..sizes.len()).collect();
		order.sort_by_key(|&i| {
			let (w, h) = sizes[i];
			(Reverse(w as u64 * h as u64), Reverse(h), i)
		});

		let total_area: u64 =
			sizes.iter().map(|&(w, h)| (w + padding) as u64 * (h + padding) as u64).sum();
		let start = |side: u32| side.max(1).checked_next_power_of_two().map_or(max_size, |p| p.min(max_size));
		let mut width = start(sizes.iter().map(|s| s.0).max().unwrap_or(1));
		let mut height = start(sizes.iter().map(|s| s.1).max().unwrap_or(1));
		while (width as u64 * height as u64) < total_area && grow(&mut width, &mut height, max_size) {}

		loop {
			if let Some(placements) = place_shelves(sizes, &order, width, height, padding) {
				return Ok((width, height, placements));
			}
			log::debug!("{} images do not fit a {width}x{height} atlas, growing", sizes.len());
			if !grow(&mut width, &mut height, max_size) {
				return Err(AtlasError::Overflow {
					width,
					height,
					max_size,
				});
			}
		}
	}
}

/// Doubles the smaller side, the width when both are equal.
///
/// Sides never pass `max_size`; returns `false` once both sides have reached it.
fn grow(width: &mut u32, height: &mut u32, max_size: u32) -> bool {
	let double = |side: u32| side.checked_mul(2).map_or(max_size, |doubled| doubled.min(max_size));
	if *width <= *height && *width < max_size {
		*width = double(*width);
	} else if *height < max_size {
		*height = double(*height);
	} else {
		return false;
	}
	true
}

/// Places images on shelves, left to right and top to bottom.
///
/// Returns `None` if they do not fit in `width` x `height`.
fn place_shelves(
	sizes: &[(u32, u32)],
	order: &[usize],
	width: u32,
	height: u32,
	padding: u32,
) -> Option<Vec<(u32, u32)>> {
	let mut placements = vec![(0, 0); sizes.len()];
	let (mut x, mut y, mut shelf_height) = (0u32, 0u32, 0u32);

	for &index in order {
		let (w, h) = sizes[index];
		if x > 0 && x + w > width {
			y += shelf_height + padding;
			x = 0;
			shelf_height = 0;
		}
		if x + w > width || y + h > height {
			return None;
		}
		placements[index] = (x, y);
		x += w + padding;
		shelf_height = shelf_height.max(h);
	}
	Some(placements)
}

fn apply_color_key(source: &RgbaImage, key: [u8; 3]) -> RgbaImage {
	let mut keyed = source.clone();
	for pixel in keyed.pixels_mut() {
		if pixel.0[..3] == key {
			*pixel = Rgba([0, 0, 0, 0]);
		}
	}
	keyed
}
