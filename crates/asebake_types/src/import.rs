//! The import pipeline.
//!
//! [`Importer::import`] runs every stage on one file:
//!
//! 1. decode the document
//! 2. rasterize frames (or layers in [`ImportMode::LayerToSprite`])
//! 3. pack the atlas
//! 4. read layer directives and sample transform positions
//! 5. render and pack secondary textures
//! 6. build animation tracks (sprite mode) or tiles (tileset mode)
//!
//! Any failure aborts the import; there is no partial output.
//!
//! # Examples
//!
//! ```no_run
//! use asebake_types::import::Importer;
//! use asebake_types::settings::ImportSettings;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let output = Importer::new(ImportSettings::default()).import_file("hero.aseprite", &[])?;
//!
//! output.atlas.image.save("hero.png")?;
//! for track in &output.tracks {
//!     println!("{}: {} keys, {:.2}s", track.clip_name, track.keyframes.len(), track.length);
//! }
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::anim::{AnimationSettings, AnimationTrack, reconcile, synthesize};
use crate::atlas::{AtlasBuilder, AtlasError, PackedAtlas, SpriteRect};
use crate::file::{AseFile, AseFileError};
use crate::meta::{MetaData, MetaDataKind, extract_metadata, sample_transforms};
use crate::settings::{FilterMode, ImportMode, ImportSettings, TextureWrap};
use crate::tileset::{TileSprite, slice_tiles};

/// Errors that abort an import.
#[derive(Debug, Error)]
pub enum ImportError {
	/// The file could not be decoded
	#[error(transparent)]
	File(#[from] AseFileError),

	/// The atlas could not be packed
	#[error(transparent)]
	Atlas(#[from] AtlasError),

	/// The settings cannot be used
	#[error("Invalid import settings: {0}")]
	InvalidSettings(String),
}

/// Sprite rectangle with its output name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedSprite {
	/// `<file>_<index>`
	pub name: String,
	/// Placement in the atlas
	pub rect: SpriteRect,
}

/// Auxiliary texture produced from a `@secondary` layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecondaryTexture {
	/// Texture name from the directive, e.g. `_NormalMap`
	pub name: String,
	/// Packed frames of the layer
	pub atlas: PackedAtlas,
}

/// Everything produced by one import.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportOutput {
	/// File name without extension
	pub name: String,
	/// Main atlas
	pub atlas: PackedAtlas,
	/// One sprite per packed frame or layer
	pub sprites: Vec<NamedSprite>,
	/// Secondary textures, in layer order
	pub secondary_textures: Vec<SecondaryTexture>,
	/// Animation tracks (sprite mode only)
	pub tracks: Vec<AnimationTrack>,
	/// Tiles (tileset mode only)
	pub tiles: Vec<TileSprite>,
	/// Animation settings to persist for the next import
	pub animation_settings: Vec<AnimationSettings>,
	/// Directive layers
	pub metadata: Vec<MetaData>,
	/// Sampling filter for the produced textures
	pub filter_mode: FilterMode,
	/// Addressing mode for the produced textures
	pub wrap_mode: TextureWrap,
}

/// Runs the import pipeline with fixed settings.
#[derive(Debug, Clone, Default)]
pub struct Importer {
	settings: ImportSettings,
}

impl Importer {
	/// Creates an importer.
	pub fn new(settings: ImportSettings) -> Self {
		Self {
			settings,
		}
	}

	/// Settings used by this importer.
	pub fn settings(&self) -> &ImportSettings {
		&self.settings
	}

	/// Imports a file, naming outputs after its file stem.
	///
	/// # Errors
	///
	/// Returns an error if the file cannot be read or any stage fails.
	pub fn import_file(
		&self,
		path: impl AsRef<Path>,
		previous_settings: &[AnimationSettings],
	) -> Result<ImportOutput, ImportError> {
		let path = path.as_ref();
		let name = path.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_default();
		let bytes = std::fs::read(path).map_err(AseFileError::from)?;
		self.import(&name, &bytes, previous_settings)
	}

	/// Imports an in-memory file.
	///
	/// # Arguments
	///
	/// * `name` - File name without extension, used to name sprites and clips
	/// * `bytes` - Raw `.ase` data
	/// * `previous_settings` - Animation settings from the last import
	///
	/// # Errors
	///
	/// Returns an error if the settings are invalid, the data cannot be
	/// decoded or the atlas overflows.
	pub fn import(
		&self,
		name: &str,
		bytes: &[u8],
		previous_settings: &[AnimationSettings],
	) -> Result<ImportOutput, ImportError> {
		let doc = AseFile::from_bytes(bytes)?;
		self.import_document(name, &doc, previous_settings)
	}

	/// Imports an already decoded document.
	///
	/// # Errors
	///
	/// Returns an error if the settings are invalid or the atlas overflows.
	pub fn import_document(
		&self,
		name: &str,
		doc: &AseFile,
		previous_settings: &[AnimationSettings],
	) -> Result<ImportOutput, ImportError> {
		let settings = &self.settings;
		settings.validate().map_err(ImportError::InvalidSettings)?;

		let images = match settings.import_mode {
			ImportMode::LayerToSprite => doc.render_layers(),
			ImportMode::Sprite | ImportMode::Tileset => doc.render_frames(settings.ignore_background),
		};

		let builder = AtlasBuilder::new(settings.atlas)
			.pivot(settings.sprite_pivot)
			.border(settings.sprite_border)
			.transparency(settings.transparency_mode);
		let atlas = builder.pack(&images)?;

		let sprites = atlas
			.rects
			.iter()
			.enumerate()
			.map(|(index, rect)| NamedSprite {
				name: format!("{name}_{index}"),
				rect: *rect,
			})
			.collect();

		let mut metadata = extract_metadata(doc);
		sample_transforms(doc, &mut metadata, settings.sprite_pivot, settings.pixels_per_unit);

		let mut secondary_textures = Vec::new();
		for meta in metadata.iter().filter(|meta| meta.kind == MetaDataKind::SecondaryTexture) {
			let Some(texture) = meta.target() else {
				continue;
			};
			let layer_frames = doc.render_layer_frames(meta.layer_index);
			secondary_textures.push(SecondaryTexture {
				name: texture.to_string(),
				atlas: builder.pack(&layer_frames)?,
			});
		}

		let (tracks, animation_settings) = if settings.import_mode == ImportMode::Sprite {
			let reconciled = reconcile(previous_settings, &doc.tags());
			(synthesize(doc, name, &metadata, &reconciled), reconciled)
		} else {
			(Vec::new(), previous_settings.to_vec())
		};

		let tiles = if settings.import_mode == ImportMode::Tileset {
			slice_tiles(&atlas.image, settings.tile_size, settings.empty_tile_behaviour, name, settings.sprite_pivot)
		} else {
			Vec::new()
		};

		log::info!(
			"Imported {name}: {}x{} atlas, {} sprites, {} secondary textures, {} tracks, {} tiles",
			atlas.width,
			atlas.height,
			atlas.rects.len(),
			secondary_textures.len(),
			tracks.len(),
			tiles.len()
		);

		Ok(ImportOutput {
			name: name.to_string(),
			atlas,
			sprites,
			secondary_textures,
			tracks,
			tiles,
			animation_settings,
			metadata,
			filter_mode: settings.filter_mode,
			wrap_mode: settings.wrap_mode,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::atlas::AtlasConfig;
	use crate::file::ase::{CelChunk, ColorDepth, FileBuilder, LayerChunk, LoopDirection, Tag};
	use crate::tileset::EmptyTileBehaviour;

	const OPAQUE: [u8; 4] = [200, 100, 50, 255];

	fn sample_file() -> Vec<u8> {
		FileBuilder::new(8, 8, ColorDepth::Rgba)
			.layer(LayerChunk::new("body"))
			.layer(LayerChunk::new("@normal"))
			.layer(LayerChunk::new("@transform(\"hand\")"))
			.frame(100)
			.cel(0, CelChunk::image(0, 0, 0, 8, 8, OPAQUE.repeat(64)))
			.cel(0, CelChunk::image(1, 0, 0, 8, 8, [128, 128, 255, 255].repeat(64)))
			.cel(0, CelChunk::image(2, 4, 4, 1, 1, OPAQUE.to_vec()))
			.frame(150)
			.cel(1, CelChunk::linked(0, 0))
			.frame(100)
			.tag(Tag::new("idle", 0, 2, LoopDirection::Forward))
			.build()
			.unwrap()
	}

	#[test_log::test]
	fn test_sprite_mode_import() {
		let output = Importer::default().import("hero", &sample_file(), &[]).unwrap();

		assert_eq!(output.sprites.len(), 3);
		assert_eq!(output.sprites[2].name, "hero_2");
		assert_eq!(output.secondary_textures.len(), 1);
		assert_eq!(output.secondary_textures[0].name, "_NormalMap");
		assert_eq!(output.secondary_textures[0].atlas.rects, output.atlas.rects);

		assert_eq!(output.tracks.len(), 1);
		let track = &output.tracks[0];
		assert_eq!(track.clip_name, "hero_idle");
		assert_eq!(track.keyframes.len(), 4);
		assert!(track.curve("hand").is_some());
		assert!(output.tiles.is_empty());

		assert_eq!(output.animation_settings.len(), 1);
		assert_eq!(output.animation_settings[0].animation_name, "idle");
		assert_eq!(output.metadata.len(), 2);
	}

	#[test]
	fn test_directive_layers_stay_out_of_frames() {
		let output = Importer::default().import("hero", &sample_file(), &[]).unwrap();
		let rect = output.sprites[0].rect;
		assert_eq!(output.atlas.image.get_pixel(rect.x, rect.y).0, OPAQUE);
	}

	#[test]
	fn test_tileset_mode_import() {
		let settings = ImportSettings {
			import_mode: ImportMode::Tileset,
			tile_size: [8, 8],
			empty_tile_behaviour: EmptyTileBehaviour::Remove,
			..ImportSettings::default()
		};
		let previous = vec![AnimationSettings::new("old")];
		let output = Importer::new(settings).import("map", &sample_file(), &previous).unwrap();

		assert!(output.tracks.is_empty());
		assert_eq!(output.animation_settings, previous);
		// 16x16 atlas: frames 0 and 1 on top, the empty frame 2 and a free slot below
		assert_eq!((output.atlas.width, output.atlas.height), (16, 16));
		assert_eq!(output.tiles.len(), 2);
		assert_eq!(output.tiles[1].name, "map_1");
	}

	#[test]
	fn test_layer_to_sprite_import() {
		let settings = ImportSettings {
			import_mode: ImportMode::LayerToSprite,
			..ImportSettings::default()
		};
		let output = Importer::new(settings).import("hero", &sample_file(), &[]).unwrap();

		assert_eq!(output.sprites.len(), 1);
		assert!(output.tracks.is_empty());
	}

	#[test]
	fn test_layer_to_sprite_keeps_background_layer() {
		let mut background = LayerChunk::new("Background");
		background.flags = crate::file::LayerFlags::VISIBLE | crate::file::LayerFlags::BACKGROUND;
		let bytes = FileBuilder::new(4, 4, ColorDepth::Rgba)
			.layer(background)
			.layer(LayerChunk::new("variant"))
			.frame(100)
			.cel(0, CelChunk::image(0, 0, 0, 4, 4, [10, 20, 30, 255].repeat(16)))
			.cel(0, CelChunk::image(1, 0, 0, 2, 2, OPAQUE.repeat(4)))
			.build()
			.unwrap();
		let settings = ImportSettings {
			import_mode: ImportMode::LayerToSprite,
			..ImportSettings::default()
		};
		assert!(settings.ignore_background);

		let output = Importer::new(settings).import("variants", &bytes, &[]).unwrap();
		assert_eq!(output.sprites.len(), 2);
		let background_rect = output.sprites[0].rect;
		assert_eq!(output.atlas.image.get_pixel(background_rect.x, background_rect.y).0, [10, 20, 30, 255]);
		let variant_rect = output.sprites[1].rect;
		assert_eq!(output.atlas.image.get_pixel(variant_rect.x + 3, variant_rect.y + 3).0, [0, 0, 0, 0]);
	}

	#[test]
	fn test_errors_abort_the_import() {
		assert!(matches!(
			Importer::default().import("bad", &[0u8; 16], &[]),
			Err(ImportError::File(AseFileError::Malformed { .. }))
		));

		let tiny = ImportSettings {
			atlas: AtlasConfig {
				max_size: 4,
				..AtlasConfig::default()
			},
			..ImportSettings::default()
		};
		assert!(matches!(
			Importer::new(tiny).import("hero", &sample_file(), &[]),
			Err(ImportError::Atlas(AtlasError::Overflow { .. }))
		));

		let invalid = ImportSettings {
			pixels_per_unit: -1.0,
			..ImportSettings::default()
		};
		assert!(matches!(
			Importer::new(invalid).import("hero", &sample_file(), &[]),
			Err(ImportError::InvalidSettings(_))
		));
	}
}
