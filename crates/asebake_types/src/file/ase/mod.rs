//! Aseprite file support for `asebake-rs` project.
//!
//! This module reads `.ase` / `.aseprite` documents: the 128-byte header, the
//! frame list and the chunks stored in each frame. Only the chunks needed to
//! rebuild the images and animations are decoded; every other chunk is skipped
//! by its declared size.
//!
//! # File Structure
//!
//! - Header (128 bytes, magic `0xA5E0` at offset 4)
//! - Frames, each with a 16-byte header (magic `0xF1FA`) followed by chunks
//! - Chunks: `u32` size (header included), `u16` type, payload
//!
//! Decoded chunk types:
//!
//! | Type     | Chunk        |
//! |----------|--------------|
//! | `0x0004` | Old palette  |
//! | `0x2004` | Layer        |
//! | `0x2005` | Cel          |
//! | `0x2018` | Tags         |
//! | `0x2019` | Palette      |
//!
//! All integers are little-endian.
//!
//! # Examples
//!
//! ```no_run
//! use asebake_types::file::ase::Document;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let doc = Document::open("hero.aseprite")?;
//! let frames = doc.render_frames(false);
//!
//! for (index, image) in frames.iter().enumerate() {
//!     image.save(format!("hero_{index}.png"))?;
//! }
//! # Ok(())
//! # }
//! ```

// Module declarations
mod builder;
mod chunk;
mod file;
mod frame;
mod header;
mod reader;

/// Byte layout constants
pub mod constants;

/// Canvas rasterization
pub mod render;

// Re-export public types
pub use self::builder::FileBuilder;
pub use self::chunk::{
	BlendMode, CelChunk, CelContent, Chunk, LayerChunk, LayerFlags, LayerKind, LoopDirection, PaletteChunk,
	PaletteEntry, Tag,
};
pub use self::file::Document;
pub use self::frame::Frame;
pub use self::header::{ColorDepth, Header};
pub use self::render::DIRECTIVE_PREFIX;

#[cfg(test)]
mod tests;
