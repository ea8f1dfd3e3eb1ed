//! Prelude module for `asebake_types`.
//!
//! This module provides a convenient way to import commonly used types and functions.
//!
//! # Examples
//!
//! ```no_run
//! use asebake_types::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let doc = AseFile::open("hero.aseprite")?;
//! let atlas = AtlasBuilder::new(AtlasConfig::default()).pack(&doc.render_frames(true))?;
//! # Ok(())
//! # }
//! ```

// Decoder types
#[doc(inline)]
pub use crate::file::{
	AseFile, AseFileBuilder, AseFileError, AseFrame, AseHeader, BlendMode, CelChunk, CelContent, ColorDepth,
	LayerChunk, LoopDirection, Tag,
};

// Directives
#[doc(inline)]
pub use crate::meta::{MetaData, MetaDataKind, classify, extract_metadata, sample_transforms};

// Atlas packing
#[doc(inline)]
pub use crate::atlas::{
	AtlasBuilder, AtlasConfig, AtlasError, PackedAtlas, SizePolicy, SpriteBorder, SpriteRect, TransparencyMode,
};

// Animation
#[doc(inline)]
pub use crate::anim::{AnimationSettings, AnimationTrack, TransformCurve, WrapMode, reconcile, synthesize};

// Tiles
#[doc(inline)]
pub use crate::tileset::{EmptyTileBehaviour, TileSprite, slice_tiles};

// Pipeline
#[doc(inline)]
pub use crate::import::{ImportError, ImportOutput, Importer, NamedSprite, SecondaryTexture};

#[doc(inline)]
pub use crate::settings::{FilterMode, ImportMode, ImportSettings, TextureWrap};

// Re-export the file module for advanced usage
#[doc(inline)]
pub use crate::file;
