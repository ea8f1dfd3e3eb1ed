//! Chunk types stored inside ASE frames.
//!
//! Each frame carries an ordered list of chunks. Only the chunk types needed
//! to rebuild images and animations are decoded; every other chunk is skipped
//! by its declared size so newer files stay readable.

use std::{fmt::Display, io::Read};

use flate2::read::ZlibDecoder;
use serde::Serialize;

use crate::file::AseFileError;

use super::{ColorDepth, constants, reader::Reader};

/// A decoded chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
	/// Layer definition (0x2004)
	Layer(LayerChunk),

	/// Image content of one layer in this frame (0x2005)
	Cel(CelChunk),

	/// Animation tags (0x2018)
	Tags(Vec<Tag>),

	/// Palette (0x2019)
	Palette(PaletteChunk),

	/// Palette written by old versions of the editor (0x0004)
	OldPalette(PaletteChunk),
}

impl Chunk {
	/// Decodes one chunk payload.
	///
	/// # Arguments
	///
	/// * `kind` - Chunk type from the chunk header
	/// * `payload` - Reader over the chunk payload only
	/// * `color_depth` - Pixel format declared in the file header
	/// * `next_layer_index` - Index assigned to the next layer chunk
	///
	/// # Returns
	///
	/// `None` for chunk types that are skipped.
	pub(crate) fn decode(
		kind: u16,
		payload: &mut Reader<'_>,
		color_depth: ColorDepth,
		next_layer_index: usize,
	) -> Result<Option<Self>, AseFileError> {
		let chunk = match kind {
			constants::CHUNK_LAYER => Self::Layer(LayerChunk::decode(payload, next_layer_index)?),
			constants::CHUNK_CEL => Self::Cel(CelChunk::decode(payload, color_depth)?),
			constants::CHUNK_TAGS => Self::Tags(Tag::decode_all(payload)?),
			constants::CHUNK_PALETTE => Self::Palette(PaletteChunk::decode(payload)?),
			constants::CHUNK_OLD_PALETTE => Self::OldPalette(PaletteChunk::decode_old(payload)?),
			_ => {
				log::debug!("Skipping chunk 0x{kind:04X} ({} bytes)", payload.remaining());
				return Ok(None);
			}
		};
		Ok(Some(chunk))
	}

	/// Chunk type identifier written to the chunk header.
	pub fn kind(&self) -> u16 {
		match self {
			Self::Layer(_) => constants::CHUNK_LAYER,
			Self::Cel(_) => constants::CHUNK_CEL,
			Self::Tags(_) => constants::CHUNK_TAGS,
			Self::Palette(_) => constants::CHUNK_PALETTE,
			Self::OldPalette(_) => constants::CHUNK_OLD_PALETTE,
		}
	}
}

/// Layer flags bit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct LayerFlags(u16);

impl LayerFlags {
	/// Layer is visible
	pub const VISIBLE: Self = Self(1);
	/// Layer is editable
	pub const EDITABLE: Self = Self(2);
	/// Layer movement is locked
	pub const LOCK_MOVEMENT: Self = Self(4);
	/// Layer is the background layer
	pub const BACKGROUND: Self = Self(8);
	/// Prefer linked cels
	pub const PREFER_LINKED_CELS: Self = Self(16);
	/// Group is displayed collapsed
	pub const COLLAPSED: Self = Self(32);
	/// Layer is a reference layer
	pub const REFERENCE: Self = Self(64);

	/// Creates flags from the raw field.
	pub const fn from_bits(bits: u16) -> Self {
		Self(bits)
	}

	/// Raw bits.
	pub const fn bits(self) -> u16 {
		self.0
	}

	/// Returns `true` if every bit of `other` is set.
	pub const fn contains(self, other: Self) -> bool {
		self.0 & other.0 == other.0
	}
}

impl std::ops::BitOr for LayerFlags {
	type Output = Self;

	fn bitor(self, rhs: Self) -> Self {
		Self(self.0 | rhs.0)
	}
}

/// Kind of layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LayerKind {
	/// Image layer
	Normal,
	/// Group of layers (no cels of its own)
	Group,
	/// Tilemap layer referencing a tileset
	Tilemap {
		/// Tileset index
		tileset: u32,
	},
}

impl LayerKind {
	fn raw(self) -> u16 {
		match self {
			Self::Normal => 0,
			Self::Group => 1,
			Self::Tilemap {
				..
			} => 2,
		}
	}
}

/// Layer blend mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[repr(u16)]
#[allow(missing_docs)]
pub enum BlendMode {
	#[default]
	Normal = 0,
	Multiply = 1,
	Screen = 2,
	Overlay = 3,
	Darken = 4,
	Lighten = 5,
	ColorDodge = 6,
	ColorBurn = 7,
	HardLight = 8,
	SoftLight = 9,
	Difference = 10,
	Exclusion = 11,
	Hue = 12,
	Saturation = 13,
	Color = 14,
	Luminosity = 15,
	Addition = 16,
	Subtract = 17,
	Divide = 18,
}

impl BlendMode {
	/// Converts the layer field to a blend mode; unknown values fall back to normal.
	pub fn from_u16(value: u16) -> Self {
		match value {
			1 => Self::Multiply,
			2 => Self::Screen,
			3 => Self::Overlay,
			4 => Self::Darken,
			5 => Self::Lighten,
			6 => Self::ColorDodge,
			7 => Self::ColorBurn,
			8 => Self::HardLight,
			9 => Self::SoftLight,
			10 => Self::Difference,
			11 => Self::Exclusion,
			12 => Self::Hue,
			13 => Self::Saturation,
			14 => Self::Color,
			15 => Self::Luminosity,
			16 => Self::Addition,
			17 => Self::Subtract,
			18 => Self::Divide,
			_ => Self::Normal,
		}
	}
}

/// Layer chunk (0x2004).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerChunk {
	/// Position of the layer in decode order; cels refer to layers by this index
	pub index: usize,
	/// Layer flags
	pub flags: LayerFlags,
	/// Layer kind
	pub kind: LayerKind,
	/// Nesting depth below the closest preceding group with a lower level
	pub child_level: u16,
	/// Blend mode
	pub blend_mode: BlendMode,
	/// Layer opacity (only honored when the header flag says so)
	pub opacity: u8,
	/// Layer name
	pub name: String,
}

impl LayerChunk {
	/// Creates a visible normal layer.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			index: 0,
			flags: LayerFlags::VISIBLE | LayerFlags::EDITABLE,
			kind: LayerKind::Normal,
			child_level: 0,
			blend_mode: BlendMode::Normal,
			opacity: 255,
			name: name.into(),
		}
	}

	/// Returns `true` if the visible flag is set.
	pub fn is_visible(&self) -> bool {
		self.flags.contains(LayerFlags::VISIBLE)
	}

	/// Returns `true` if this is the background layer.
	pub fn is_background(&self) -> bool {
		self.flags.contains(LayerFlags::BACKGROUND)
	}

	/// Returns `true` if this is a group layer.
	pub fn is_group(&self) -> bool {
		self.kind == LayerKind::Group
	}

	fn decode(reader: &mut Reader<'_>, index: usize) -> Result<Self, AseFileError> {
		let flags = LayerFlags::from_bits(reader.u16("layer flags")?);
		let raw_kind = reader.u16("layer type")?;
		let child_level = reader.u16("layer child level")?;
		reader.skip(4, "layer default size")?;
		let blend_mode = BlendMode::from_u16(reader.u16("layer blend mode")?);
		let opacity = reader.u8("layer opacity")?;
		reader.skip(3, "layer reserved bytes")?;
		let name = reader.string("layer name")?;
		let kind = match raw_kind {
			1 => LayerKind::Group,
			2 => LayerKind::Tilemap {
				tileset: reader.u32("layer tileset index")?,
			},
			_ => LayerKind::Normal,
		};

		Ok(Self {
			index,
			flags,
			kind,
			child_level,
			blend_mode,
			opacity,
			name,
		})
	}

	/// Serializes the chunk payload.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut bytes = Vec::with_capacity(constants::LAYER_FIXED_SIZE + 2 + self.name.len());
		bytes.extend_from_slice(&self.flags.bits().to_le_bytes());
		bytes.extend_from_slice(&self.kind.raw().to_le_bytes());
		bytes.extend_from_slice(&self.child_level.to_le_bytes());
		bytes.extend_from_slice(&[0u8; 4]);
		bytes.extend_from_slice(&(self.blend_mode as u16).to_le_bytes());
		bytes.push(self.opacity);
		bytes.extend_from_slice(&[0u8; 3]);
		write_string(&mut bytes, &self.name);
		if let LayerKind::Tilemap {
			tileset,
		} = self.kind
		{
			bytes.extend_from_slice(&tileset.to_le_bytes());
		}
		bytes
	}
}

/// Content of a cel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CelContent {
	/// Pixel data in the file's color depth, row-major, already inflated
	Image {
		/// Image width in pixels
		width: u16,
		/// Image height in pixels
		height: u16,
		/// Raw pixels (`width * height * bytes_per_pixel` bytes)
		pixels: Vec<u8>,
	},

	/// Reuses the cel of the same layer in another frame
	Linked {
		/// Frame position holding the actual cel
		frame: u16,
	},

	/// Compressed tilemap; kept opaque and never rendered
	Tilemap {
		/// Width in tiles
		width: u16,
		/// Height in tiles
		height: u16,
	},
}

/// Cel chunk (0x2005).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CelChunk {
	/// Index of the layer this cel belongs to
	pub layer_index: u16,
	/// X position on the canvas
	pub x: i16,
	/// Y position on the canvas
	pub y: i16,
	/// Cel opacity
	pub opacity: u8,
	/// Z-index offset relative to the layer order
	pub z_index: i16,
	/// Cel content
	pub content: CelContent,
}

impl CelChunk {
	/// Creates an opaque image cel.
	pub fn image(layer_index: u16, x: i16, y: i16, width: u16, height: u16, pixels: Vec<u8>) -> Self {
		Self {
			layer_index,
			x,
			y,
			opacity: 255,
			z_index: 0,
			content: CelContent::Image {
				width,
				height,
				pixels,
			},
		}
	}

	/// Creates a cel linked to the cel of `frame`.
	pub fn linked(layer_index: u16, frame: u16) -> Self {
		Self {
			layer_index,
			x: 0,
			y: 0,
			opacity: 255,
			z_index: 0,
			content: CelContent::Linked {
				frame,
			},
		}
	}

	fn decode(reader: &mut Reader<'_>, color_depth: ColorDepth) -> Result<Self, AseFileError> {
		let layer_index = reader.u16("cel layer index")?;
		let x = reader.i16("cel x position")?;
		let y = reader.i16("cel y position")?;
		let opacity = reader.u8("cel opacity")?;
		let cel_type_offset = reader.offset();
		let cel_type = reader.u16("cel type")?;
		let z_index = reader.i16("cel z-index")?;
		reader.skip(5, "cel reserved bytes")?;

		let content = match cel_type {
			constants::CEL_RAW_IMAGE => {
				let width = reader.u16("raw cel width")?;
				let height = reader.u16("raw cel height")?;
				let len = width as usize * height as usize * color_depth.bytes_per_pixel();
				let pixels = reader.bytes(len, "raw cel pixels")?.to_vec();
				CelContent::Image {
					width,
					height,
					pixels,
				}
			}
			constants::CEL_LINKED => CelContent::Linked {
				frame: reader.u16("linked cel frame position")?,
			},
			constants::CEL_COMPRESSED_IMAGE => {
				let width = reader.u16("compressed cel width")?;
				let height = reader.u16("compressed cel height")?;
				let len = width as usize * height as usize * color_depth.bytes_per_pixel();
				let offset = reader.offset();
				let data = reader.rest();
				if len > data.len().saturating_mul(constants::MAX_DEFLATE_RATIO) {
					return Err(AseFileError::malformed(offset, "compressed cel data matching the cel size"));
				}
				let pixels = inflate(data, len, offset)?;
				CelContent::Image {
					width,
					height,
					pixels,
				}
			}
			constants::CEL_COMPRESSED_TILEMAP => {
				let width = reader.u16("tilemap width")?;
				let height = reader.u16("tilemap height")?;
				reader.rest();
				CelContent::Tilemap {
					width,
					height,
				}
			}
			_ => return Err(AseFileError::malformed(cel_type_offset, "cel type 0..=3")),
		};

		Ok(Self {
			layer_index,
			x,
			y,
			opacity,
			z_index,
			content,
		})
	}

	/// Serializes the chunk payload, storing image data uncompressed.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut bytes = self.fixed_bytes(match self.content {
			CelContent::Image {
				..
			} => constants::CEL_RAW_IMAGE,
			CelContent::Linked {
				..
			} => constants::CEL_LINKED,
			CelContent::Tilemap {
				..
			} => constants::CEL_COMPRESSED_TILEMAP,
		});
		match &self.content {
			CelContent::Image {
				width,
				height,
				pixels,
			} => {
				bytes.extend_from_slice(&width.to_le_bytes());
				bytes.extend_from_slice(&height.to_le_bytes());
				bytes.extend_from_slice(pixels);
			}
			CelContent::Linked {
				frame,
			} => bytes.extend_from_slice(&frame.to_le_bytes()),
			CelContent::Tilemap {
				width,
				height,
			} => {
				bytes.extend_from_slice(&width.to_le_bytes());
				bytes.extend_from_slice(&height.to_le_bytes());
			}
		}
		bytes
	}

	/// Writes the fixed 16-byte part of the payload for the given cel type.
	pub(crate) fn fixed_bytes(&self, cel_type: u16) -> Vec<u8> {
		let mut bytes = Vec::with_capacity(constants::CEL_FIXED_SIZE + 4);
		bytes.extend_from_slice(&self.layer_index.to_le_bytes());
		bytes.extend_from_slice(&self.x.to_le_bytes());
		bytes.extend_from_slice(&self.y.to_le_bytes());
		bytes.push(self.opacity);
		bytes.extend_from_slice(&cel_type.to_le_bytes());
		bytes.extend_from_slice(&self.z_index.to_le_bytes());
		bytes.extend_from_slice(&[0u8; 5]);
		bytes
	}
}

/// Inflates a zlib stream and checks it holds at least `expected` bytes.
fn inflate(data: &[u8], expected: usize, offset: usize) -> Result<Vec<u8>, AseFileError> {
	let mut pixels = Vec::new();
	ZlibDecoder::new(data).take(expected as u64).read_to_end(&mut pixels).map_err(|e| {
		AseFileError::Decompress {
			offset,
			message: e.to_string(),
		}
	})?;

	if pixels.len() < expected {
		return Err(AseFileError::Decompress {
			offset,
			message: format!("expected {expected} bytes of pixel data, got {}", pixels.len()),
		});
	}
	Ok(pixels)
}

/// Animation direction of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum LoopDirection {
	/// Play `from..=to`
	#[default]
	Forward,
	/// Play `to..=from`
	Reverse,
	/// Alternate forward and reverse, starting forward
	PingPong,
	/// Alternate reverse and forward, starting reverse
	PingPongReverse,
}

impl LoopDirection {
	/// Converts the tag field to a direction; unknown values play forward.
	pub fn from_u8(value: u8) -> Self {
		match value {
			1 => Self::Reverse,
			2 => Self::PingPong,
			3 => Self::PingPongReverse,
			_ => Self::Forward,
		}
	}

	/// Converts the direction back to the tag field.
	pub fn to_u8(self) -> u8 {
		match self {
			Self::Forward => 0,
			Self::Reverse => 1,
			Self::PingPong => 2,
			Self::PingPongReverse => 3,
		}
	}

	/// Returns `true` if a single pass visits frames from last to first.
	pub fn is_reversed(self) -> bool {
		matches!(self, Self::Reverse | Self::PingPongReverse)
	}
}

impl Display for LoopDirection {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Forward => write!(f, "Forward"),
			Self::Reverse => write!(f, "Reverse"),
			Self::PingPong => write!(f, "PingPong"),
			Self::PingPongReverse => write!(f, "PingPongReverse"),
		}
	}
}

/// Named frame range (one entry of the tags chunk).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
	/// Tag name
	pub name: String,
	/// First frame (inclusive)
	pub from: u16,
	/// Last frame (inclusive)
	pub to: u16,
	/// Playback direction
	pub direction: LoopDirection,
	/// Repeat count (0 means infinite)
	pub repeat: u16,
	/// Tag color as RGB
	pub color: [u8; 3],
}

impl Tag {
	/// Creates a tag over `from..=to`.
	pub fn new(name: impl Into<String>, from: u16, to: u16, direction: LoopDirection) -> Self {
		Self {
			name: name.into(),
			from,
			to,
			direction,
			repeat: 0,
			color: [0, 0, 0],
		}
	}

	/// Number of frames covered by the tag, zero when `to` precedes `from`.
	pub fn frame_count(&self) -> usize {
		if self.to < self.from {
			0
		} else {
			usize::from(self.to - self.from) + 1
		}
	}

	fn decode_all(reader: &mut Reader<'_>) -> Result<Vec<Self>, AseFileError> {
		let count = reader.u16("tag count")?;
		reader.skip(8, "tags reserved bytes")?;

		let mut tags = Vec::with_capacity(count as usize);
		for _ in 0..count {
			let offset = reader.offset();
			let from = reader.u16("tag from frame")?;
			let to = reader.u16("tag to frame")?;
			let direction = LoopDirection::from_u8(reader.u8("tag direction")?);
			let repeat = reader.u16("tag repeat")?;
			reader.skip(6, "tag reserved bytes")?;
			let rgb = reader.bytes(3, "tag color")?;
			let color = [rgb[0], rgb[1], rgb[2]];
			reader.skip(1, "tag extra byte")?;
			let name = reader.string("tag name")?;

			if from > to {
				return Err(AseFileError::malformed(offset, "tag range with from <= to"));
			}

			tags.push(Self {
				name,
				from,
				to,
				direction,
				repeat,
				color,
			});
		}
		Ok(tags)
	}

	/// Serializes a tags chunk payload.
	pub fn to_chunk_bytes(tags: &[Self]) -> Vec<u8> {
		let mut bytes = Vec::with_capacity(constants::TAGS_FIXED_SIZE + tags.len() * 32);
		bytes.extend_from_slice(&(tags.len() as u16).to_le_bytes());
		bytes.extend_from_slice(&[0u8; 8]);
		for tag in tags {
			bytes.extend_from_slice(&tag.from.to_le_bytes());
			bytes.extend_from_slice(&tag.to.to_le_bytes());
			bytes.push(tag.direction.to_u8());
			bytes.extend_from_slice(&tag.repeat.to_le_bytes());
			bytes.extend_from_slice(&[0u8; 6]);
			bytes.extend_from_slice(&tag.color);
			bytes.push(0);
			write_string(&mut bytes, &tag.name);
		}
		bytes
	}
}

/// One palette color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaletteEntry {
	/// Palette index
	pub index: u32,
	/// RGBA color
	pub color: [u8; 4],
	/// Optional color name
	pub name: Option<String>,
}

/// Palette chunk (0x2019), also used for the old 0x0004 chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaletteChunk {
	/// Total number of palette entries after applying this chunk
	pub size: u32,
	/// Entries changed by this chunk
	pub entries: Vec<PaletteEntry>,
}

impl PaletteChunk {
	/// Creates a palette chunk holding `colors` starting at index 0.
	pub fn from_colors(colors: &[[u8; 4]]) -> Self {
		Self {
			size: colors.len() as u32,
			entries: colors
				.iter()
				.enumerate()
				.map(|(i, &color)| PaletteEntry {
					index: i as u32,
					color,
					name: None,
				})
				.collect(),
		}
	}

	fn decode(reader: &mut Reader<'_>) -> Result<Self, AseFileError> {
		let size_offset = reader.offset();
		let size = reader.u32("palette size")?;
		if size > constants::MAX_PALETTE_SIZE {
			return Err(AseFileError::malformed(size_offset, "palette size of at most 65536 entries"));
		}
		let first_offset = reader.offset();
		let first = reader.u32("palette first index")?;
		let last = reader.u32("palette last index")?;
		reader.skip(8, "palette reserved bytes")?;

		if first > last || last >= size.max(1) {
			return Err(AseFileError::malformed(first_offset, "palette range inside palette size"));
		}

		let mut entries = Vec::with_capacity((last - first + 1) as usize);
		for index in first..=last {
			let flags = reader.u16("palette entry flags")?;
			let rgba = reader.bytes(4, "palette entry color")?;
			let name = if flags & constants::PALETTE_ENTRY_HAS_NAME != 0 {
				Some(reader.string("palette entry name")?)
			} else {
				None
			};
			entries.push(PaletteEntry {
				index,
				color: [rgba[0], rgba[1], rgba[2], rgba[3]],
				name,
			});
		}

		Ok(Self {
			size,
			entries,
		})
	}

	fn decode_old(reader: &mut Reader<'_>) -> Result<Self, AseFileError> {
		let packets = reader.u16("old palette packet count")?;
		let mut entries = Vec::new();
		let mut index = 0u32;
		for _ in 0..packets {
			index += reader.u8("old palette skip count")? as u32;
			let count = match reader.u8("old palette color count")? {
				0 => 256,
				n => n as u32,
			};
			for _ in 0..count {
				let rgb = reader.bytes(3, "old palette color")?;
				entries.push(PaletteEntry {
					index,
					color: [rgb[0], rgb[1], rgb[2], 255],
					name: None,
				});
				index += 1;
			}
		}

		Ok(Self {
			size: index,
			entries,
		})
	}

	/// Serializes a 0x2019 palette chunk payload.
	///
	/// Entries must be contiguous and sorted by index.
	pub fn to_bytes(&self) -> Vec<u8> {
		let first = self.entries.first().map_or(0, |e| e.index);
		let last = self.entries.last().map_or(0, |e| e.index);

		let mut bytes = Vec::with_capacity(constants::PALETTE_FIXED_SIZE + self.entries.len() * 6);
		bytes.extend_from_slice(&self.size.to_le_bytes());
		bytes.extend_from_slice(&first.to_le_bytes());
		bytes.extend_from_slice(&last.to_le_bytes());
		bytes.extend_from_slice(&[0u8; 8]);
		for entry in &self.entries {
			let flags = if entry.name.is_some() {
				constants::PALETTE_ENTRY_HAS_NAME
			} else {
				0
			};
			bytes.extend_from_slice(&flags.to_le_bytes());
			bytes.extend_from_slice(&entry.color);
			if let Some(name) = &entry.name {
				write_string(&mut bytes, name);
			}
		}
		bytes
	}
}

fn write_string(bytes: &mut Vec<u8>, value: &str) {
	bytes.extend_from_slice(&(value.len() as u16).to_le_bytes());
	bytes.extend_from_slice(value.as_bytes());
}
