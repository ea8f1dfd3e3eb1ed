//! Frame structure of ASE files.

use crate::file::AseFileError;

use super::{Chunk, ColorDepth, constants, reader::Reader};

/// One animation frame: a duration and the chunks stored with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
	/// Display duration in milliseconds
	duration: u16,

	/// Chunks in file order
	chunks: Vec<Chunk>,
}

/// State threaded through frame decoding.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrameContext {
	pub color_depth: ColorDepth,
	pub default_duration: u16,
	pub frame_count: u16,
	pub layer_count: usize,
}

impl Frame {
	/// Creates a frame with the given duration and chunks.
	pub fn new(duration: u16, chunks: Vec<Chunk>) -> Self {
		Self {
			duration,
			chunks,
		}
	}

	/// Display duration in milliseconds.
	#[inline]
	pub fn duration(&self) -> u16 {
		self.duration
	}

	/// Chunks in file order.
	#[inline]
	pub fn chunks(&self) -> &[Chunk] {
		&self.chunks
	}

	/// Decodes the frame starting at `offset`.
	///
	/// # Returns
	///
	/// The decoded frame and the number of bytes it occupies.
	pub(crate) fn decode(
		data: &[u8],
		offset: usize,
		context: &mut FrameContext,
	) -> Result<(Self, usize), AseFileError> {
		let mut header = Reader::new(&data[offset..], offset);
		let frame_bytes = header.u32("frame size")? as usize;
		let magic_offset = header.offset();
		let magic = header.u16("frame magic")?;
		if magic != constants::FRAME_MAGIC {
			return Err(AseFileError::InvalidMagic {
				offset: magic_offset,
				expected: constants::FRAME_MAGIC,
				actual: magic,
			});
		}
		let old_chunk_count = header.u16("old chunk count")?;
		let duration = match header.u16("frame duration")? {
			0 => context.default_duration,
			ms => ms,
		};
		header.skip(2, "frame reserved bytes")?;
		let new_chunk_count = header.u32("chunk count")?;

		if frame_bytes < constants::FRAME_HEADER_SIZE || frame_bytes > data.len() - offset {
			return Err(AseFileError::malformed(offset, "frame size within the remaining stream"));
		}

		let chunk_count = if new_chunk_count == 0 {
			old_chunk_count as u32
		} else {
			new_chunk_count
		};

		let body_start = offset + constants::FRAME_HEADER_SIZE;
		let mut body = Reader::new(&data[body_start..offset + frame_bytes], body_start);
		let capacity = (chunk_count as usize).min(body.remaining() / constants::CHUNK_HEADER_SIZE);
		let mut chunks = Vec::with_capacity(capacity);

		for _ in 0..chunk_count {
			let chunk_offset = body.offset();
			let size = body.u32("chunk size")? as usize;
			if size < constants::CHUNK_HEADER_SIZE || size - 4 > body.remaining() {
				return Err(AseFileError::malformed(chunk_offset, "chunk size within the frame"));
			}
			let kind = body.u16("chunk type")?;
			let payload_offset = body.offset();
			let mut payload = Reader::new(
				body.bytes(size - constants::CHUNK_HEADER_SIZE, "chunk payload")?,
				payload_offset,
			);

			let Some(chunk) = Chunk::decode(kind, &mut payload, context.color_depth, context.layer_count)?
			else {
				continue;
			};

			match &chunk {
				Chunk::Layer(_) => context.layer_count += 1,
				Chunk::Cel(cel) if cel.layer_index as usize >= context.layer_count => {
					return Err(AseFileError::malformed(
						payload_offset,
						"cel layer index referencing a decoded layer",
					));
				}
				Chunk::Tags(tags) if tags.iter().any(|tag| tag.to >= context.frame_count) => {
					return Err(AseFileError::malformed(payload_offset, "tag range inside the frame count"));
				}
				_ => {}
			}
			chunks.push(chunk);
		}

		if old_chunk_count == constants::EXTENDED_CHUNK_COUNT && new_chunk_count == 0 {
			log::warn!("Frame at 0x{offset:08X} declares an extended chunk count of 0");
		}

		Ok((
			Self {
				duration,
				chunks,
			},
			frame_bytes,
		))
	}

	/// Serializes the frame, header included.
	///
	/// Cel chunks are written with uncompressed image data; use
	/// [`super::FileBuilder`] to produce compressed cels.
	pub fn to_bytes(&self) -> Vec<u8> {
		let payloads: Vec<(u16, Vec<u8>)> = self
			.chunks
			.iter()
			.map(|chunk| {
				let payload = match chunk {
					Chunk::Layer(layer) => layer.to_bytes(),
					Chunk::Cel(cel) => cel.to_bytes(),
					Chunk::Tags(tags) => super::Tag::to_chunk_bytes(tags),
					Chunk::Palette(palette) | Chunk::OldPalette(palette) => palette.to_bytes(),
				};
				let kind = match chunk {
					Chunk::OldPalette(_) => constants::CHUNK_PALETTE,
					_ => chunk.kind(),
				};
				(kind, payload)
			})
			.collect();
		encode_frame(self.duration, &payloads)
	}
}

/// Writes a frame header followed by `(chunk type, payload)` pairs.
pub(crate) fn encode_frame(duration: u16, payloads: &[(u16, Vec<u8>)]) -> Vec<u8> {
	let body_len: usize =
		payloads.iter().map(|(_, payload)| constants::CHUNK_HEADER_SIZE + payload.len()).sum();
	let frame_bytes = constants::FRAME_HEADER_SIZE + body_len;

	let mut bytes = Vec::with_capacity(frame_bytes);
	bytes.extend_from_slice(&(frame_bytes as u32).to_le_bytes());
	bytes.extend_from_slice(&constants::FRAME_MAGIC.to_le_bytes());
	let old_count = u16::try_from(payloads.len()).unwrap_or(constants::EXTENDED_CHUNK_COUNT);
	bytes.extend_from_slice(&old_count.to_le_bytes());
	bytes.extend_from_slice(&duration.to_le_bytes());
	bytes.extend_from_slice(&[0u8; 2]);
	bytes.extend_from_slice(&(payloads.len() as u32).to_le_bytes());

	for (kind, payload) in payloads {
		bytes.extend_from_slice(&((constants::CHUNK_HEADER_SIZE + payload.len()) as u32).to_le_bytes());
		bytes.extend_from_slice(&kind.to_le_bytes());
		bytes.extend_from_slice(payload);
	}
	bytes
}
