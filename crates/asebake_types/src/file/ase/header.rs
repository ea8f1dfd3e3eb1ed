//! ASE file header (128 bytes).

use std::fmt::Display;

use serde::Serialize;

use crate::file::AseFileError;

use super::{constants, reader::Reader};

/// Pixel format of every image in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u16)]
pub enum ColorDepth {
	/// 8 bits per pixel, palette indices
	Indexed = 8,

	/// 16 bits per pixel, value + alpha
	Grayscale = 16,

	/// 32 bits per pixel, RGBA
	Rgba = 32,
}

impl ColorDepth {
	/// Converts the header field to a `ColorDepth`.
	pub fn from_u16(value: u16) -> Result<Self, AseFileError> {
		match value {
			8 => Ok(Self::Indexed),
			16 => Ok(Self::Grayscale),
			32 => Ok(Self::Rgba),
			_ => Err(AseFileError::UnsupportedColorDepth(value)),
		}
	}

	/// Number of bytes used by one pixel.
	#[inline]
	pub fn bytes_per_pixel(self) -> usize {
		match self {
			Self::Indexed => 1,
			Self::Grayscale => 2,
			Self::Rgba => 4,
		}
	}
}

impl Display for ColorDepth {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Indexed => write!(f, "Indexed"),
			Self::Grayscale => write!(f, "Grayscale"),
			Self::Rgba => write!(f, "RGBA"),
		}
	}
}

/// Header structure for `.ase` files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Header {
	file_size: u32,
	frames: u16,
	width: u16,
	height: u16,
	color_depth: ColorDepth,
	flags: u32,
	speed: u16,
	transparent_index: u8,
	color_count: u16,
	pixel_width: u8,
	pixel_height: u8,
	grid_x: i16,
	grid_y: i16,
	grid_width: u16,
	grid_height: u16,
}

impl Default for Header {
	fn default() -> Self {
		Self {
			file_size: 0,
			frames: 0,
			width: 0,
			height: 0,
			color_depth: ColorDepth::Rgba,
			flags: constants::FLAG_LAYER_OPACITY_VALID,
			speed: 100,
			transparent_index: 0,
			color_count: 256,
			pixel_width: 1,
			pixel_height: 1,
			grid_x: 0,
			grid_y: 0,
			grid_width: 16,
			grid_height: 16,
		}
	}
}

impl Header {
	/// Size of the header in bytes
	pub const SIZE: usize = constants::HEADER_SIZE;

	/// Creates a header for a canvas of the given size.
	pub fn new(width: u16, height: u16, color_depth: ColorDepth) -> Self {
		Self {
			width,
			height,
			color_depth,
			..Self::default()
		}
	}

	/// Total file size declared in the header.
	pub fn file_size(&self) -> u32 {
		self.file_size
	}

	/// Number of frames declared in the header.
	pub fn frames(&self) -> u16 {
		self.frames
	}

	/// Canvas width in pixels.
	pub fn width(&self) -> u16 {
		self.width
	}

	/// Canvas height in pixels.
	pub fn height(&self) -> u16 {
		self.height
	}

	/// Pixel format of the cels.
	pub fn color_depth(&self) -> ColorDepth {
		self.color_depth
	}

	/// Raw header flags.
	pub fn flags(&self) -> u32 {
		self.flags
	}

	/// Returns `true` if layer opacity values should be honored.
	pub fn layer_opacity_valid(&self) -> bool {
		self.flags & constants::FLAG_LAYER_OPACITY_VALID != 0
	}

	/// Deprecated global animation speed (milliseconds per frame).
	pub fn speed(&self) -> u16 {
		self.speed
	}

	/// Palette index treated as transparent in indexed images.
	pub fn transparent_index(&self) -> u8 {
		self.transparent_index
	}

	/// Number of palette colors (a stored 0 means 256).
	pub fn color_count(&self) -> u16 {
		self.color_count
	}

	/// Pixel aspect ratio as `(width, height)`.
	pub fn pixel_ratio(&self) -> (u8, u8) {
		(self.pixel_width, self.pixel_height)
	}

	/// Grid origin and cell size as `(x, y, width, height)`.
	pub fn grid(&self) -> (i16, i16, u16, u16) {
		(self.grid_x, self.grid_y, self.grid_width, self.grid_height)
	}

	pub(crate) fn set_frames(&mut self, frames: u16) {
		self.frames = frames;
	}

	pub(crate) fn set_file_size(&mut self, file_size: u32) {
		self.file_size = file_size;
	}

	pub(crate) fn set_transparent_index(&mut self, index: u8) {
		self.transparent_index = index;
	}

	/// Parses the header from the start of the file.
	pub fn from_bytes(data: &[u8]) -> Result<Self, AseFileError> {
		let mut reader = Reader::new(data, 0);
		if reader.remaining() < constants::HEADER_SIZE {
			return Err(AseFileError::malformed(0, "128-byte file header"));
		}

		let file_size = reader.u32("file size")?;
		let magic_offset = reader.offset();
		let magic = reader.u16("file magic")?;
		if magic != constants::FILE_MAGIC {
			return Err(AseFileError::InvalidMagic {
				offset: magic_offset,
				expected: constants::FILE_MAGIC,
				actual: magic,
			});
		}

		let frames = reader.u16("frame count")?;
		let width = reader.u16("canvas width")?;
		let height = reader.u16("canvas height")?;
		let color_depth = ColorDepth::from_u16(reader.u16("color depth")?)?;
		let flags = reader.u32("header flags")?;
		let speed = reader.u16("speed")?;
		reader.skip(8, "reserved header fields")?;
		let transparent_index = reader.u8("transparent index")?;
		reader.skip(3, "reserved header bytes")?;
		let color_count = match reader.u16("color count")? {
			0 => 256,
			n => n,
		};
		let pixel_width = reader.u8("pixel width")?;
		let pixel_height = reader.u8("pixel height")?;
		let grid_x = reader.i16("grid x")?;
		let grid_y = reader.i16("grid y")?;
		let grid_width = reader.u16("grid width")?;
		let grid_height = reader.u16("grid height")?;

		if width == 0 || height == 0 {
			return Err(AseFileError::InvalidDimensions {
				width,
				height,
			});
		}

		Ok(Self {
			file_size,
			frames,
			width,
			height,
			color_depth,
			flags,
			speed,
			transparent_index,
			color_count,
			pixel_width,
			pixel_height,
			grid_x,
			grid_y,
			grid_width,
			grid_height,
		})
	}

	/// Converts the header to bytes.
	pub fn to_bytes(&self) -> [u8; constants::HEADER_SIZE] {
		let mut bytes = [0u8; constants::HEADER_SIZE];

		bytes[0..4].copy_from_slice(&self.file_size.to_le_bytes());
		bytes[4..6].copy_from_slice(&constants::FILE_MAGIC.to_le_bytes());
		bytes[6..8].copy_from_slice(&self.frames.to_le_bytes());
		bytes[8..10].copy_from_slice(&self.width.to_le_bytes());
		bytes[10..12].copy_from_slice(&self.height.to_le_bytes());
		bytes[12..14].copy_from_slice(&(self.color_depth as u16).to_le_bytes());
		bytes[14..18].copy_from_slice(&self.flags.to_le_bytes());
		bytes[18..20].copy_from_slice(&self.speed.to_le_bytes());
		// 20..28 reserved
		bytes[28] = self.transparent_index;
		// 29..32 reserved
		let color_count = if self.color_count == 256 {
			0
		} else {
			self.color_count
		};
		bytes[32..34].copy_from_slice(&color_count.to_le_bytes());
		bytes[34] = self.pixel_width;
		bytes[35] = self.pixel_height;
		bytes[36..38].copy_from_slice(&self.grid_x.to_le_bytes());
		bytes[38..40].copy_from_slice(&self.grid_y.to_le_bytes());
		bytes[40..42].copy_from_slice(&self.grid_width.to_le_bytes());
		bytes[42..44].copy_from_slice(&self.grid_height.to_le_bytes());

		bytes
	}
}

impl Display for Header {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			".ase File Header:\n\
			- File Size: {} bytes\n\
			- Frames: {}\n\
			- Canvas: {}x{} pixels\n\
			- Color Depth: {}\n\
			- Transparent Index: {}\n\
			- Colors: {}",
			self.file_size,
			self.frames,
			self.width,
			self.height,
			self.color_depth,
			self.transparent_index,
			self.color_count,
		)
	}
}
