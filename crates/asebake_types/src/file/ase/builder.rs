//! File construction and serialization for ASE files.
//!
//! [`FileBuilder`] assembles layers, cels, tags and palettes into a byte stream
//! that follows the on-disk layout exactly. It is what the test suites and
//! benchmarks use to produce fixtures.

use std::io::Write;

use flate2::{Compression, write::ZlibEncoder};

use crate::file::AseFileError;

use super::{
	CelChunk, CelContent, ColorDepth, Document, Header, LayerChunk, PaletteChunk, Tag, constants,
	frame::encode_frame,
};

/// Builder for `.ase` byte streams.
///
/// # Examples
///
/// ```
/// use asebake_types::file::ase::{CelChunk, ColorDepth, FileBuilder, LayerChunk, LoopDirection, Tag};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let doc = FileBuilder::new(2, 2, ColorDepth::Rgba)
///     .layer(LayerChunk::new("body"))
///     .frame(100)
///     .cel(0, CelChunk::image(0, 0, 0, 1, 1, vec![255, 0, 0, 255]))
///     .frame(150)
///     .tag(Tag::new("idle", 0, 1, LoopDirection::Forward))
///     .to_document()?;
///
/// assert_eq!(doc.frames().len(), 2);
/// assert_eq!(doc.frame_durations(), vec![100, 150]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FileBuilder {
	header: Header,
	layers: Vec<LayerChunk>,
	tags: Vec<Tag>,
	palette: Option<PaletteChunk>,
	frames: Vec<FrameEntry>,
	compress: bool,
}

#[derive(Debug, Clone)]
struct FrameEntry {
	duration: u16,
	cels: Vec<CelChunk>,
	raw: Vec<(u16, Vec<u8>)>,
}

impl FileBuilder {
	/// Starts a document with the given canvas size and pixel format.
	pub fn new(width: u16, height: u16, color_depth: ColorDepth) -> Self {
		Self {
			header: Header::new(width, height, color_depth),
			layers: Vec::new(),
			tags: Vec::new(),
			palette: None,
			frames: Vec::new(),
			compress: true,
		}
	}

	/// Stores image cels zlib-compressed (the default) or raw.
	pub fn compress_cels(mut self, compress: bool) -> Self {
		self.compress = compress;
		self
	}

	/// Sets the palette index treated as transparent.
	pub fn transparent_index(mut self, index: u8) -> Self {
		self.header.set_transparent_index(index);
		self
	}

	/// Sets the palette from a list of RGBA colors.
	pub fn palette(mut self, colors: &[[u8; 4]]) -> Self {
		self.palette = Some(PaletteChunk::from_colors(colors));
		self
	}

	/// Appends a layer; its index is the number of layers added before it.
	pub fn layer(mut self, mut layer: LayerChunk) -> Self {
		layer.index = self.layers.len();
		self.layers.push(layer);
		self
	}

	/// Appends a frame with the given duration in milliseconds.
	pub fn frame(mut self, duration: u16) -> Self {
		self.frames.push(FrameEntry {
			duration,
			cels: Vec::new(),
			raw: Vec::new(),
		});
		self
	}

	/// Adds a cel to an existing frame.
	///
	/// # Panics
	///
	/// Panics if `frame` has not been added yet.
	pub fn cel(mut self, frame: usize, cel: CelChunk) -> Self {
		self.frames[frame].cels.push(cel);
		self
	}

	/// Adds a tag.
	pub fn tag(mut self, tag: Tag) -> Self {
		self.tags.push(tag);
		self
	}

	/// Adds an arbitrary chunk payload to an existing frame.
	///
	/// # Panics
	///
	/// Panics if `frame` has not been added yet.
	pub fn raw_chunk(mut self, frame: usize, kind: u16, payload: Vec<u8>) -> Self {
		self.frames[frame].raw.push((kind, payload));
		self
	}

	/// Serializes the document.
	///
	/// # Errors
	///
	/// Returns an error if cel compression fails.
	pub fn build(&self) -> Result<Vec<u8>, AseFileError> {
		let mut body = Vec::new();
		for (index, entry) in self.frames.iter().enumerate() {
			let mut payloads = Vec::new();
			if index == 0 {
				if let Some(palette) = &self.palette {
					payloads.push((constants::CHUNK_PALETTE, palette.to_bytes()));
				}
				for layer in &self.layers {
					payloads.push((constants::CHUNK_LAYER, layer.to_bytes()));
				}
				if !self.tags.is_empty() {
					payloads.push((constants::CHUNK_TAGS, Tag::to_chunk_bytes(&self.tags)));
				}
			}
			for cel in &entry.cels {
				payloads.push((constants::CHUNK_CEL, self.encode_cel(cel)?));
			}
			payloads.extend(entry.raw.iter().cloned());
			body.extend_from_slice(&encode_frame(entry.duration, &payloads));
		}

		let mut header = self.header;
		header.set_frames(self.frames.len() as u16);
		header.set_file_size((constants::HEADER_SIZE + body.len()) as u32);

		let mut bytes = Vec::with_capacity(constants::HEADER_SIZE + body.len());
		bytes.extend_from_slice(&header.to_bytes());
		bytes.extend_from_slice(&body);
		Ok(bytes)
	}

	/// Serializes and decodes the document.
	pub fn to_document(&self) -> Result<Document, AseFileError> {
		Document::from_bytes(&self.build()?)
	}

	fn encode_cel(&self, cel: &CelChunk) -> Result<Vec<u8>, AseFileError> {
		let CelContent::Image {
			width,
			height,
			pixels,
		} = &cel.content
		else {
			return Ok(cel.to_bytes());
		};
		if !self.compress {
			return Ok(cel.to_bytes());
		}

		let mut bytes = cel.fixed_bytes(constants::CEL_COMPRESSED_IMAGE);
		bytes.extend_from_slice(&width.to_le_bytes());
		bytes.extend_from_slice(&height.to_le_bytes());
		let mut encoder = ZlibEncoder::new(bytes, Compression::default());
		encoder.write_all(pixels)?;
		Ok(encoder.finish()?)
	}
}
