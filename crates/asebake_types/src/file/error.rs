//! Error types for file format parsing.

use thiserror::Error;

/// Errors that can occur when decoding an `.ase` / `.aseprite` file.
///
/// Every structural failure carries the absolute byte offset at which decoding
/// stopped, so a broken file can be inspected with a hex viewer.
#[derive(Debug, Error)]
pub enum AseFileError {
	/// A field or structure could not be read at the given offset
	#[error("Malformed file at offset 0x{offset:08X}: expected {expected}")]
	Malformed {
		/// Absolute offset in the input stream
		offset: usize,
		/// Description of the structure that was expected there
		expected: &'static str,
	},

	/// Invalid magic number in the file or frame header
	#[error("Invalid magic number at offset 0x{offset:08X}: expected 0x{expected:04X}, got 0x{actual:04X}")]
	InvalidMagic {
		/// Absolute offset of the magic field
		offset: usize,
		/// Expected magic value
		expected: u16,
		/// Value found in the file
		actual: u16,
	},

	/// The number of decoded frames differs from the header
	#[error("Frame count mismatch: header specifies {expected} frames, but found {actual}")]
	FrameCountMismatch {
		/// Frame count declared in the header
		expected: u16,
		/// Number of frames actually decoded
		actual: usize,
	},

	/// Color depth other than 8, 16 or 32 bits per pixel
	#[error("Unsupported color depth: {0} bits per pixel")]
	UnsupportedColorDepth(u16),

	/// Canvas dimensions must be positive
	#[error("Invalid canvas dimensions: {width}x{height}")]
	InvalidDimensions {
		/// Canvas width
		width: u16,
		/// Canvas height
		height: u16,
	},

	/// Compressed cel data could not be inflated
	#[error("Failed to decompress cel at offset 0x{offset:08X}: {message}")]
	Decompress {
		/// Absolute offset of the compressed payload
		offset: usize,
		/// Underlying zlib error
		message: String,
	},

	/// IO error
	#[error(transparent)]
	IOError(#[from] std::io::Error),
}

impl AseFileError {
	/// Shorthand for [`AseFileError::Malformed`].
	pub fn malformed(offset: usize, expected: &'static str) -> Self {
		Self::Malformed {
			offset,
			expected,
		}
	}
}
