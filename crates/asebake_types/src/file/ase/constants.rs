//! ASE file format constants.
//!
//! Structure sizes, magic numbers and chunk type identifiers used by the
//! Aseprite binary container.

/// Size of the file header (128 bytes)
pub const HEADER_SIZE: usize = 128;

/// Magic number stored at offset 4 of the file header
pub const FILE_MAGIC: u16 = 0xA5E0;

/// Size of each frame header (16 bytes)
pub const FRAME_HEADER_SIZE: usize = 16;

/// Magic number stored at offset 4 of every frame header
pub const FRAME_MAGIC: u16 = 0xF1FA;

/// Old chunk count value meaning "read the 32-bit count instead"
pub const EXTENDED_CHUNK_COUNT: u16 = 0xFFFF;

/// Size of the chunk header (`u32` size + `u16` type)
pub const CHUNK_HEADER_SIZE: usize = 6;

/// Header flag: layer opacity field holds a valid value
pub const FLAG_LAYER_OPACITY_VALID: u32 = 1;

/// Old palette chunk (256 color version)
pub const CHUNK_OLD_PALETTE: u16 = 0x0004;

/// Old palette chunk (64 color version)
pub const CHUNK_OLD_PALETTE_64: u16 = 0x0011;

/// Layer chunk
pub const CHUNK_LAYER: u16 = 0x2004;

/// Cel chunk
pub const CHUNK_CEL: u16 = 0x2005;

/// Cel extra chunk
pub const CHUNK_CEL_EXTRA: u16 = 0x2006;

/// Color profile chunk
pub const CHUNK_COLOR_PROFILE: u16 = 0x2007;

/// Tags chunk
pub const CHUNK_TAGS: u16 = 0x2018;

/// Palette chunk
pub const CHUNK_PALETTE: u16 = 0x2019;

/// User data chunk
pub const CHUNK_USER_DATA: u16 = 0x2020;

/// Slice chunk
pub const CHUNK_SLICE: u16 = 0x2022;

/// Tileset chunk
pub const CHUNK_TILESET: u16 = 0x2023;

/// Cel type: raw image data
pub const CEL_RAW_IMAGE: u16 = 0;

/// Cel type: linked to the cel of another frame
pub const CEL_LINKED: u16 = 1;

/// Cel type: zlib-compressed image data
pub const CEL_COMPRESSED_IMAGE: u16 = 2;

/// Cel type: zlib-compressed tilemap
pub const CEL_COMPRESSED_TILEMAP: u16 = 3;

/// Upper bound of the deflate expansion ratio
pub const MAX_DEFLATE_RATIO: usize = 1032;

/// Largest palette a file may declare
pub const MAX_PALETTE_SIZE: u32 = 65536;

/// Size of the fixed part of a cel chunk payload
pub const CEL_FIXED_SIZE: usize = 16;

/// Size of the fixed part of a layer chunk payload (before the name)
pub const LAYER_FIXED_SIZE: usize = 16;

/// Size of the fixed part of a tags chunk payload
pub const TAGS_FIXED_SIZE: usize = 10;

/// Size of the fixed part of each tag entry (before the name)
pub const TAG_ENTRY_FIXED_SIZE: usize = 17;

/// Size of the fixed part of a palette chunk payload
pub const PALETTE_FIXED_SIZE: usize = 20;

/// Palette entry flag: entry carries a name string
pub const PALETTE_ENTRY_HAS_NAME: u16 = 1;
