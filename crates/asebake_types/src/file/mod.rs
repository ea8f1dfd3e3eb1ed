//! File type support for `asebake`.

mod error;

pub mod ase;

// Re-export unified error type
pub use error::AseFileError;

// Re-export main file types
pub use ase::{
	BlendMode, CelChunk, CelContent, Chunk, ColorDepth, Document as AseFile, FileBuilder as AseFileBuilder,
	Frame as AseFrame, Header as AseHeader, LayerChunk, LayerFlags, LayerKind, LoopDirection, PaletteChunk,
	Tag,
};
