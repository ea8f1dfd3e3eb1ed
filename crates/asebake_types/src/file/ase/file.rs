//! ASE document structure and decoding.
//!
//! This module defines [`Document`], the in-memory form of a whole `.ase`
//! file: the header plus every frame with its chunks.

use std::io::Read;

use crate::file::AseFileError;

use super::{
	CelChunk, CelContent, Chunk, Header, LayerChunk, Tag, constants,
	frame::{Frame, FrameContext},
};

/// Fallback frame duration when neither the frame nor the header carry one.
const DEFAULT_FRAME_DURATION_MS: u16 = 100;

/// Decoded `.ase` / `.aseprite` file.
///
/// Frames and chunks keep the exact order found in the file. Layers are
/// numbered in decode order and cels refer to them by that index.
///
/// # Examples
///
/// ```no_run
/// use asebake_types::file::ase::Document;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let doc = Document::open("player.aseprite")?;
///
/// println!("{}x{}, {} frames", doc.width(), doc.height(), doc.frames().len());
/// for tag in doc.tags() {
///     println!("{}: {}..={} ({})", tag.name, tag.from, tag.to, tag.direction);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
	/// File header
	header: Header,

	/// Frames in file order
	frames: Vec<Frame>,
}

impl Document {
	/// Creates a document from a header and frames.
	///
	/// The header's frame count is updated to match `frames`.
	pub fn new(mut header: Header, frames: Vec<Frame>) -> Self {
		header.set_frames(frames.len() as u16);
		Self {
			header,
			frames,
		}
	}

	/// Opens an `.ase` file from the specified path.
	///
	/// # Errors
	///
	/// Returns an error if the file cannot be read or is not a valid `.ase` file.
	pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, AseFileError> {
		let data = std::fs::read(path)?;
		Self::from_bytes(&data)
	}

	/// Decodes a document from any reader.
	///
	/// Note: the whole stream is read into memory first; chunk sizes are
	/// validated against the remaining length, which needs random access.
	pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self, AseFileError> {
		let mut data = Vec::new();
		reader.read_to_end(&mut data)?;
		Self::from_bytes(&data)
	}

	/// Decodes a document from a byte slice.
	///
	/// # Errors
	///
	/// Returns an error if:
	/// - The header is truncated, has a bad magic number or unsupported color depth
	/// - The declared file size exceeds the data
	/// - A frame or chunk size is inconsistent with the remaining stream
	/// - The number of frames differs from the header
	pub fn from_bytes(data: &[u8]) -> Result<Self, AseFileError> {
		let header = Header::from_bytes(data)?;

		let declared = header.file_size() as usize;
		if declared > data.len() {
			return Err(AseFileError::malformed(data.len(), "file data up to the declared file size"));
		}
		// Old writers leave the size at 0; trust the buffer length then.
		let data = if declared >= constants::HEADER_SIZE {
			&data[..declared]
		} else {
			data
		};

		let mut context = FrameContext {
			color_depth: header.color_depth(),
			default_duration: match header.speed() {
				0 => DEFAULT_FRAME_DURATION_MS,
				speed => speed,
			},
			frame_count: header.frames(),
			layer_count: 0,
		};

		let mut frames = Vec::with_capacity(header.frames() as usize);
		let mut offset = constants::HEADER_SIZE;
		while offset < data.len() {
			if data.len() - offset < constants::FRAME_HEADER_SIZE {
				return Err(AseFileError::malformed(offset, "16-byte frame header"));
			}
			let (frame, len) = Frame::decode(data, offset, &mut context)?;
			frames.push(frame);
			offset += len;
		}

		if frames.len() != header.frames() as usize {
			return Err(AseFileError::FrameCountMismatch {
				expected: header.frames(),
				actual: frames.len(),
			});
		}

		log::debug!(
			"Decoded {}x{} document: {} frames, {} layers",
			header.width(),
			header.height(),
			frames.len(),
			context.layer_count
		);

		Ok(Self {
			header,
			frames,
		})
	}

	/// Returns a reference to the file header.
	pub fn header(&self) -> &Header {
		&self.header
	}

	/// Canvas width in pixels.
	pub fn width(&self) -> u32 {
		self.header.width() as u32
	}

	/// Canvas height in pixels.
	pub fn height(&self) -> u32 {
		self.header.height() as u32
	}

	/// Frames in file order.
	pub fn frames(&self) -> &[Frame] {
		&self.frames
	}

	/// Frame durations in milliseconds, index-aligned with [`Self::frames`].
	pub fn frame_durations(&self) -> Vec<u16> {
		self.frames.iter().map(Frame::duration).collect()
	}

	/// Every layer chunk, ordered by layer index.
	pub fn layers(&self) -> Vec<&LayerChunk> {
		self.chunks()
			.filter_map(|chunk| match chunk {
				Chunk::Layer(layer) => Some(layer),
				_ => None,
			})
			.collect()
	}

	/// Every tag, in file order.
	pub fn tags(&self) -> Vec<&Tag> {
		self.chunks()
			.filter_map(|chunk| match chunk {
				Chunk::Tags(tags) => Some(tags.iter()),
				_ => None,
			})
			.flatten()
			.collect()
	}

	/// Resolved palette as RGBA colors.
	///
	/// The newer palette chunk takes precedence; the old palette chunk is only
	/// used by files that have no other palette.
	pub fn palette(&self) -> Vec<[u8; 4]> {
		let has_new = self.chunks().any(|chunk| matches!(chunk, Chunk::Palette(_)));
		let mut colors: Vec<[u8; 4]> = Vec::new();

		for chunk in self.chunks() {
			let palette = match chunk {
				Chunk::Palette(palette) => palette,
				Chunk::OldPalette(palette) if !has_new => palette,
				_ => continue,
			};
			if colors.len() < palette.size as usize {
				colors.resize(palette.size as usize, [0, 0, 0, 0]);
			}
			for entry in &palette.entries {
				let index = entry.index as usize;
				if index >= colors.len() {
					colors.resize(index + 1, [0, 0, 0, 0]);
				}
				colors[index] = entry.color;
			}
		}
		colors
	}

	/// Returns the cel of `layer` in `frame`, following linked cels.
	///
	/// Returns `None` when the layer has no cel in that frame, or when a linked
	/// cel points at a frame that holds no image for the layer.
	pub fn cel(&self, frame: usize, layer: usize) -> Option<&CelChunk> {
		let mut frame_index = frame;
		// A chain of links can never be longer than the frame list.
		for _ in 0..=self.frames.len() {
			let cel = self.raw_cel(frame_index, layer)?;
			match cel.content {
				CelContent::Linked {
					frame: target,
				} => {
					if target as usize >= self.frames.len() || target as usize == frame_index {
						log::warn!(
							"Layer {layer} frame {frame} links to invalid frame {target}, ignoring cel"
						);
						return None;
					}
					frame_index = target as usize;
				}
				_ => return Some(cel),
			}
		}
		log::warn!("Layer {layer} frame {frame} has a cyclic cel link, ignoring cel");
		None
	}

	fn raw_cel(&self, frame: usize, layer: usize) -> Option<&CelChunk> {
		self.frames.get(frame)?.chunks().iter().find_map(|chunk| match chunk {
			Chunk::Cel(cel) if cel.layer_index as usize == layer => Some(cel),
			_ => None,
		})
	}

	fn chunks(&self) -> impl Iterator<Item = &Chunk> {
		self.frames.iter().flat_map(|frame| frame.chunks().iter())
	}
}

impl std::fmt::Display for Document {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"ASE File: {}x{}, {} frames, {} layers, {} tags",
			self.header.width(),
			self.header.height(),
			self.frames.len(),
			self.layers().len(),
			self.tags().len()
		)
	}
}
