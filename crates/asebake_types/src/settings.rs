//! Import settings.
//!
//! Every field has a default, so partial settings files deserialize:
//!
//! ```
//! use asebake_types::settings::{ImportMode, ImportSettings};
//!
//! let settings: ImportSettings = serde_json::from_str(r#"{ "import_mode": "tileset" }"#).unwrap();
//! assert_eq!(settings.import_mode, ImportMode::Tileset);
//! assert_eq!(settings.pixels_per_unit, 100.0);
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::atlas::{AtlasConfig, SpriteBorder, TransparencyMode};
use crate::tileset::EmptyTileBehaviour;

/// What the importer produces from a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
	/// One sprite per frame plus animation tracks
	#[default]
	Sprite,
	/// Frames packed into an atlas cut into tiles
	Tileset,
	/// One sprite per layer
	LayerToSprite,
}

/// Texture sampling filter, passed through to the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
	/// Nearest neighbour
	#[default]
	Point,
	/// Bilinear
	Bilinear,
	/// Trilinear
	Trilinear,
}

/// Texture addressing mode, passed through to the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureWrap {
	/// Clamp to the edge
	#[default]
	Clamp,
	/// Tile the texture
	Repeat,
	/// Tile the texture, mirroring every other copy
	Mirror,
}

/// Settings of one import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
	/// Pixels per world unit
	pub pixels_per_unit: f32,
	/// Normalized sprite pivot, origin at the bottom-left corner
	pub sprite_pivot: Vec2,
	/// How transparent pixels are identified
	pub transparency_mode: TransparencyMode,
	/// Sampling filter of the produced textures
	pub filter_mode: FilterMode,
	/// Addressing mode of the produced textures
	pub wrap_mode: TextureWrap,
	/// Leave the background layer out of the frames (per-frame modes only)
	pub ignore_background: bool,
	/// What to produce
	pub import_mode: ImportMode,
	/// Tile width and height (tileset mode)
	pub tile_size: [u32; 2],
	/// Handling of fully transparent tiles (tileset mode)
	pub empty_tile_behaviour: EmptyTileBehaviour,
	/// Atlas packing options
	pub atlas: AtlasConfig,
	/// Border insets applied to every sprite
	pub sprite_border: SpriteBorder,
}

impl Default for ImportSettings {
	fn default() -> Self {
		Self {
			pixels_per_unit: 100.0,
			sprite_pivot: Vec2::splat(0.5),
			transparency_mode: TransparencyMode::Alpha,
			filter_mode: FilterMode::Point,
			wrap_mode: TextureWrap::Clamp,
			ignore_background: true,
			import_mode: ImportMode::Sprite,
			tile_size: [16, 16],
			empty_tile_behaviour: EmptyTileBehaviour::Keep,
			atlas: AtlasConfig::default(),
			sprite_border: SpriteBorder::default(),
		}
	}
}

impl ImportSettings {
	/// Checks values the pipeline cannot work with.
	///
	/// # Errors
	///
	/// Returns a description of the first invalid field.
	pub fn validate(&self) -> Result<(), String> {
		if !(self.pixels_per_unit.is_finite() && self.pixels_per_unit > 0.0) {
			return Err(format!("pixels_per_unit must be positive, got {}", self.pixels_per_unit));
		}
		if self.atlas.max_size == 0 {
			return Err("atlas.max_size must be positive".to_string());
		}
		if self.import_mode == ImportMode::Tileset && self.tile_size.contains(&0) {
			return Err(format!("tile_size must be positive, got {:?}", self.tile_size));
		}
		Ok(())
	}
}
