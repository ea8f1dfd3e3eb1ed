//! Unit tests for ASE document decoding

use super::*;
use crate::file::AseFileError;

fn pixels(w: u16, h: u16) -> Vec<u8> {
	(0..w as usize * h as usize * 4).map(|i| (i * 7 % 251) as u8).collect()
}

fn two_frame_builder() -> FileBuilder {
	FileBuilder::new(4, 4, ColorDepth::Rgba)
		.layer(LayerChunk::new("body"))
		.frame(100)
		.cel(0, CelChunk::image(0, 1, 1, 2, 2, pixels(2, 2)))
		.frame(200)
		.cel(1, CelChunk::image(0, 0, 0, 4, 4, pixels(4, 4)))
		.tag(Tag::new("walk", 0, 1, LoopDirection::PingPong))
}

fn write_u32(bytes: &mut [u8], offset: usize, value: u32) {
	bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

#[test]
fn test_decode_frames_layers_and_tags() {
	let doc = two_frame_builder().to_document().unwrap();

	assert_eq!(doc.width(), 4);
	assert_eq!(doc.height(), 4);
	assert_eq!(doc.header().frames(), 2);
	assert_eq!(doc.frames().len(), 2);
	assert_eq!(doc.frame_durations(), vec![100, 200]);

	let layers = doc.layers();
	assert_eq!(layers.len(), 1);
	assert_eq!(layers[0].name, "body");
	assert_eq!(layers[0].index, 0);

	let tags = doc.tags();
	assert_eq!(tags.len(), 1);
	assert_eq!(tags[0].name, "walk");
	assert_eq!((tags[0].from, tags[0].to), (0, 1));
	assert_eq!(tags[0].direction, LoopDirection::PingPong);
}

#[test]
fn test_compressed_and_raw_cels_decode_identically() {
	let compressed = two_frame_builder().to_document().unwrap();
	let raw = two_frame_builder().compress_cels(false).to_document().unwrap();

	assert_eq!(compressed.cel(0, 0), raw.cel(0, 0));
	assert_eq!(compressed.cel(1, 0), raw.cel(1, 0));

	let CelContent::Image {
		width,
		height,
		pixels: data,
	} = &compressed.cel(0, 0).unwrap().content
	else {
		panic!("expected an image cel");
	};
	assert_eq!((*width, *height), (2, 2));
	assert_eq!(*data, pixels(2, 2));
}

#[test]
fn test_unknown_chunks_are_skipped() {
	let doc = two_frame_builder()
		.raw_chunk(0, constants::CHUNK_USER_DATA, vec![1, 0, 0, 0, 4, 0, b'n', b'o', b't', b'e'])
		.raw_chunk(1, 0x7777, vec![0xAB; 33])
		.to_document()
		.unwrap();

	assert_eq!(doc.frames().len(), 2);
	// palette-less builder: layer + tags + cel in frame 0, cel in frame 1
	assert_eq!(doc.frames()[0].chunks().len(), 3);
	assert_eq!(doc.frames()[1].chunks().len(), 1);
}

#[test]
fn test_chunk_size_past_frame_end_is_malformed() {
	let mut bytes = two_frame_builder().build().unwrap();
	let first_chunk = constants::HEADER_SIZE + constants::FRAME_HEADER_SIZE;
	write_u32(&mut bytes, first_chunk, 10_000);

	let result = Document::from_bytes(&bytes);
	assert!(matches!(
		result,
		Err(AseFileError::Malformed { offset, .. }) if offset == first_chunk
	));
}

#[test]
fn test_truncated_stream_is_malformed() {
	let bytes = two_frame_builder().compress_cels(false).build().unwrap();
	let mut truncated = bytes[..bytes.len() - 10].to_vec();
	// Keep the header consistent with the shorter buffer
	write_u32(&mut truncated, 0, 0);

	assert!(matches!(Document::from_bytes(&truncated), Err(AseFileError::Malformed { .. })));
}

#[test]
fn test_declared_size_beyond_data_is_malformed() {
	let mut bytes = two_frame_builder().build().unwrap();
	let len = bytes.len() as u32;
	write_u32(&mut bytes, 0, len + 64);

	assert!(matches!(Document::from_bytes(&bytes), Err(AseFileError::Malformed { .. })));
}

#[test]
fn test_frame_count_mismatch() {
	let mut bytes = two_frame_builder().build().unwrap();
	bytes[6..8].copy_from_slice(&3u16.to_le_bytes());

	let result = Document::from_bytes(&bytes);
	assert!(matches!(
		result,
		Err(AseFileError::FrameCountMismatch {
			expected: 3,
			actual: 2
		})
	));
}

#[test]
fn test_bad_frame_magic() {
	let mut bytes = two_frame_builder().build().unwrap();
	let magic = constants::HEADER_SIZE + 4;
	bytes[magic..magic + 2].copy_from_slice(&0x1234u16.to_le_bytes());

	assert!(matches!(
		Document::from_bytes(&bytes),
		Err(AseFileError::InvalidMagic {
			expected: constants::FRAME_MAGIC,
			actual: 0x1234,
			..
		})
	));
}

#[test]
fn test_zero_duration_uses_header_speed() {
	let doc = FileBuilder::new(1, 1, ColorDepth::Rgba).frame(0).frame(40).to_document().unwrap();

	assert_eq!(doc.frame_durations(), vec![doc.header().speed(), 40]);
}

#[test]
fn test_cel_for_undeclared_layer_is_malformed() {
	let result = FileBuilder::new(1, 1, ColorDepth::Rgba)
		.layer(LayerChunk::new("only"))
		.frame(100)
		.cel(0, CelChunk::image(3, 0, 0, 1, 1, vec![0; 4]))
		.to_document();

	assert!(matches!(result, Err(AseFileError::Malformed { .. })));
}

#[test]
fn test_tag_past_last_frame_is_malformed() {
	let result = FileBuilder::new(1, 1, ColorDepth::Rgba)
		.frame(100)
		.tag(Tag::new("too_long", 0, 4, LoopDirection::Forward))
		.to_document();

	assert!(matches!(result, Err(AseFileError::Malformed { .. })));
}

#[test]
fn test_linked_cel_resolution() {
	let doc = FileBuilder::new(2, 2, ColorDepth::Rgba)
		.layer(LayerChunk::new("body"))
		.frame(100)
		.cel(0, CelChunk::image(0, 0, 0, 2, 2, pixels(2, 2)))
		.frame(100)
		.cel(1, CelChunk::linked(0, 0))
		.frame(100)
		.cel(2, CelChunk::linked(0, 9))
		.to_document()
		.unwrap();

	assert_eq!(doc.cel(1, 0), doc.cel(0, 0));
	assert!(doc.cel(2, 0).is_none());
	assert!(doc.cel(0, 1).is_none());
}

#[test]
fn test_new_palette_takes_precedence_over_old() {
	// One packet: skip 0, two colors
	let old = vec![1, 0, 0, 2, 9, 9, 9, 8, 8, 8];
	let doc = FileBuilder::new(1, 1, ColorDepth::Indexed)
		.palette(&[[1, 2, 3, 255], [4, 5, 6, 128]])
		.frame(100)
		.raw_chunk(0, constants::CHUNK_OLD_PALETTE, old.clone())
		.to_document()
		.unwrap();
	assert_eq!(doc.palette(), vec![[1, 2, 3, 255], [4, 5, 6, 128]]);

	let legacy = FileBuilder::new(1, 1, ColorDepth::Indexed)
		.frame(100)
		.raw_chunk(0, constants::CHUNK_OLD_PALETTE, old)
		.to_document()
		.unwrap();
	assert_eq!(legacy.palette(), vec![[9, 9, 9, 255], [8, 8, 8, 255]]);
}

#[test]
fn test_oversized_compressed_cel_is_malformed() {
	let mut payload = CelChunk::image(0, 0, 0, 1, 1, pixels(1, 1)).fixed_bytes(constants::CEL_COMPRESSED_IMAGE);
	payload.extend_from_slice(&u16::MAX.to_le_bytes());
	payload.extend_from_slice(&u16::MAX.to_le_bytes());
	payload.extend_from_slice(&[0x78, 0x9C, 0x63, 0x60, 0x00, 0x00, 0x00, 0x02]);

	let bytes = FileBuilder::new(4, 4, ColorDepth::Rgba)
		.layer(LayerChunk::new("body"))
		.frame(100)
		.raw_chunk(0, constants::CHUNK_CEL, payload)
		.build()
		.unwrap();

	assert!(matches!(Document::from_bytes(&bytes), Err(AseFileError::Malformed { .. })));
}

#[test]
fn test_oversized_palette_is_malformed() {
	let palette = |size: u32| {
		let mut payload = Vec::new();
		payload.extend_from_slice(&size.to_le_bytes());
		payload.extend_from_slice(&0u32.to_le_bytes());
		payload.extend_from_slice(&0u32.to_le_bytes());
		payload.extend_from_slice(&[0u8; 8]);
		payload.extend_from_slice(&0u16.to_le_bytes());
		payload.extend_from_slice(&[1, 2, 3, 255]);
		FileBuilder::new(1, 1, ColorDepth::Indexed)
			.frame(100)
			.raw_chunk(0, constants::CHUNK_PALETTE, payload)
			.build()
			.unwrap()
	};

	for size in [0x4000_0000, u32::MAX] {
		assert!(matches!(Document::from_bytes(&palette(size)), Err(AseFileError::Malformed { .. })));
	}

	let doc = Document::from_bytes(&palette(constants::MAX_PALETTE_SIZE)).unwrap();
	assert_eq!(doc.palette().len(), constants::MAX_PALETTE_SIZE as usize);
	assert_eq!(doc.palette()[0], [1, 2, 3, 255]);
}

#[test]
fn test_from_reader_matches_from_bytes() {
	let bytes = two_frame_builder().build().unwrap();
	let mut cursor = std::io::Cursor::new(bytes.clone());

	assert_eq!(Document::from_reader(&mut cursor).unwrap(), Document::from_bytes(&bytes).unwrap());
}

#[test]
fn test_frame_to_bytes_decodes_back() {
	let doc = two_frame_builder().to_document().unwrap();
	let mut bytes = doc.header().to_bytes().to_vec();
	for frame in doc.frames() {
		bytes.extend_from_slice(&frame.to_bytes());
	}
	let len = bytes.len() as u32;
	write_u32(&mut bytes, 0, len);

	assert_eq!(Document::from_bytes(&bytes).unwrap().frames(), doc.frames());
}

#[test]
fn test_display() {
	let doc = two_frame_builder().to_document().unwrap();
	assert_eq!(doc.to_string(), "ASE File: 4x4, 2 frames, 1 layers, 1 tags");
}
