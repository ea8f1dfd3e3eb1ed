//! Bounds-checked little-endian reader over an ASE byte window.

use crate::file::AseFileError;

/// Cursor over a byte window that reports failures with absolute offsets.
///
/// `base` is the absolute offset of `data[0]` within the whole file, so a chunk
/// payload reader still reports positions relative to the start of the stream.
#[derive(Debug, Clone)]
pub(crate) struct Reader<'a> {
	data: &'a [u8],
	pos: usize,
	base: usize,
}

impl<'a> Reader<'a> {
	pub(crate) fn new(data: &'a [u8], base: usize) -> Self {
		Self {
			data,
			pos: 0,
			base,
		}
	}

	/// Absolute offset of the next unread byte.
	#[inline]
	pub(crate) fn offset(&self) -> usize {
		self.base + self.pos
	}

	/// Bytes left in the window.
	#[inline]
	pub(crate) fn remaining(&self) -> usize {
		self.data.len() - self.pos
	}

	pub(crate) fn bytes(&mut self, len: usize, expected: &'static str) -> Result<&'a [u8], AseFileError> {
		if self.remaining() < len {
			return Err(AseFileError::malformed(self.offset(), expected));
		}
		let slice = &self.data[self.pos..self.pos + len];
		self.pos += len;
		Ok(slice)
	}

	pub(crate) fn skip(&mut self, len: usize, expected: &'static str) -> Result<(), AseFileError> {
		self.bytes(len, expected).map(|_| ())
	}

	pub(crate) fn u8(&mut self, expected: &'static str) -> Result<u8, AseFileError> {
		Ok(self.bytes(1, expected)?[0])
	}

	pub(crate) fn u16(&mut self, expected: &'static str) -> Result<u16, AseFileError> {
		let b = self.bytes(2, expected)?;
		Ok(u16::from_le_bytes([b[0], b[1]]))
	}

	pub(crate) fn i16(&mut self, expected: &'static str) -> Result<i16, AseFileError> {
		let b = self.bytes(2, expected)?;
		Ok(i16::from_le_bytes([b[0], b[1]]))
	}

	pub(crate) fn u32(&mut self, expected: &'static str) -> Result<u32, AseFileError> {
		let b = self.bytes(4, expected)?;
		Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
	}

	/// Reads a `u16` length-prefixed UTF-8 string.
	///
	/// Invalid UTF-8 is replaced rather than rejected; layer names written by old
	/// versions of the editor are not always valid.
	pub(crate) fn string(&mut self, expected: &'static str) -> Result<String, AseFileError> {
		let len = self.u16(expected)? as usize;
		let raw = self.bytes(len, expected)?;
		Ok(String::from_utf8_lossy(raw).into_owned())
	}

	/// Consumes the rest of the window.
	pub(crate) fn rest(&mut self) -> &'a [u8] {
		let slice = &self.data[self.pos..];
		self.pos = self.data.len();
		slice
	}
}
