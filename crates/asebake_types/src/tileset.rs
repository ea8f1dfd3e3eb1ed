//! Slicing an atlas into a regular tile grid.

use glam::Vec2;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::atlas::{SpriteBorder, SpriteRect};

/// What to do with tiles whose pixels are all transparent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyTileBehaviour {
	/// Emit empty tiles like any other
	#[default]
	Keep,
	/// Skip empty tiles but still consume their index
	Index,
	/// Skip empty tiles entirely
	Remove,
}

/// One tile cut from the atlas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileSprite {
	/// Tile name, `<file>_<index>`
	pub name: String,
	/// Tile index
	pub index: usize,
	/// Tile rectangle in atlas pixels
	pub rect: SpriteRect,
}

/// Cuts `atlas` into `tile_width` x `tile_height` tiles.
///
/// Tiles are numbered row by row from the top, left to right. Partial tiles
/// at the right edge are dropped; rows are anchored to the bottom edge, so a
/// partial row is dropped at the top.
pub fn slice_tiles(
	atlas: &RgbaImage,
	tile_size: [u32; 2],
	behaviour: EmptyTileBehaviour,
	file_name: &str,
	pivot: Vec2,
) -> Vec<TileSprite> {
	let [tile_width, tile_height] = tile_size;
	if tile_width == 0 || tile_height == 0 {
		log::warn!("Tile size {tile_width}x{tile_height} is empty, no tiles produced");
		return Vec::new();
	}

	let cols = atlas.width() / tile_width;
	let rows = atlas.height() / tile_height;
	let top = atlas.height() - rows * tile_height;

	let mut tiles = Vec::new();
	let mut index = 0;
	for row in 0..rows {
		for col in 0..cols {
			let (x, y) = (col * tile_width, top + row * tile_height);
			if behaviour != EmptyTileBehaviour::Keep && is_tile_empty(atlas, x, y, tile_width, tile_height) {
				if behaviour == EmptyTileBehaviour::Index {
					index += 1;
				}
				continue;
			}

			tiles.push(TileSprite {
				name: format!("{file_name}_{index}"),
				index,
				rect: SpriteRect {
					x,
					y,
					width: tile_width,
					height: tile_height,
					pivot: pivot * Vec2::new(tile_width as f32, tile_height as f32),
					border: SpriteBorder::default(),
				},
			});
			index += 1;
		}
	}

	log::debug!("Sliced {} tiles from a {cols}x{rows} grid", tiles.len());
	tiles
}

fn is_tile_empty(atlas: &RgbaImage, x: u32, y: u32, width: u32, height: u32) -> bool {
	(y..y + height).all(|py| (x..x + width).all(|px| atlas.get_pixel(px, py).0[3] == 0))
}

#[cfg(test)]
mod tests {
	use image::Rgba;

	use super::*;

	/// 3x2 grid of 2x2 tiles; the top-middle and bottom-left tiles are empty.
	fn grid() -> RgbaImage {
		let mut atlas = RgbaImage::from_pixel(6, 4, Rgba([9, 9, 9, 255]));
		for (x, y) in [(2, 0), (3, 0), (2, 1), (3, 1), (0, 2), (1, 2), (0, 3), (1, 3)] {
			atlas.put_pixel(x, y, Rgba([0, 0, 0, 0]));
		}
		atlas
	}

	fn names(tiles: &[TileSprite]) -> Vec<&str> {
		tiles.iter().map(|tile| tile.name.as_str()).collect()
	}

	#[test]
	fn test_keep_emits_every_tile() {
		let tiles = slice_tiles(&grid(), [2, 2], EmptyTileBehaviour::Keep, "map", Vec2::ZERO);
		assert_eq!(names(&tiles), vec!["map_0", "map_1", "map_2", "map_3", "map_4", "map_5"]);
		assert_eq!((tiles[1].rect.x, tiles[1].rect.y), (2, 0));
		assert_eq!((tiles[3].rect.x, tiles[3].rect.y), (0, 2));
	}

	#[test]
	fn test_index_skips_but_counts_empty_tiles() {
		let tiles = slice_tiles(&grid(), [2, 2], EmptyTileBehaviour::Index, "map", Vec2::ZERO);
		assert_eq!(names(&tiles), vec!["map_0", "map_2", "map_4", "map_5"]);
	}

	#[test]
	fn test_remove_drops_empty_tiles() {
		let tiles = slice_tiles(&grid(), [2, 2], EmptyTileBehaviour::Remove, "map", Vec2::ZERO);
		assert_eq!(names(&tiles), vec!["map_0", "map_1", "map_2", "map_3"]);
		assert_eq!((tiles[1].rect.x, tiles[1].rect.y), (4, 0));
	}

	#[test]
	fn test_partial_tiles_are_dropped() {
		let atlas = RgbaImage::from_pixel(5, 5, Rgba([1, 1, 1, 255]));
		let tiles = slice_tiles(&atlas, [2, 2], EmptyTileBehaviour::Keep, "t", Vec2::splat(0.5));

		assert_eq!(tiles.len(), 4);
		assert_eq!((tiles[0].rect.x, tiles[0].rect.y), (0, 1));
		assert_eq!(tiles[0].rect.pivot, Vec2::new(1.0, 1.0));
	}

	#[test]
	fn test_zero_tile_size() {
		assert!(slice_tiles(&grid(), [0, 2], EmptyTileBehaviour::Keep, "map", Vec2::ZERO).is_empty());
	}
}
