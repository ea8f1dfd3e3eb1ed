use asebake_rs::prelude::*;

use crate::fixtures::{self, DURATIONS, GROUND, SKIN};

#[test]
fn decoded_frame_count_matches_header() {
	for compress in [true, false] {
		let bytes = fixtures::hero().compress_cels(compress).build().unwrap();
		let doc = AseFile::from_bytes(&bytes).unwrap();

		assert_eq!(doc.header().frames() as usize, doc.frames().len());
		assert_eq!(doc.frame_durations(), DURATIONS.to_vec());
	}
}

#[test]
fn layers_keep_file_order() {
	let doc = fixtures::hero().to_document().unwrap();
	let names: Vec<&str> = doc.layers().iter().map(|layer| layer.name.as_str()).collect();

	assert_eq!(names, vec![
		"Background",
		"body",
		"fx",
		"sparks",
		"@transform(\"hand\")",
		"@emission",
		"@secondary(\"_Mask\")",
		"@outline",
	]);
	assert!(doc.layers().iter().enumerate().all(|(i, layer)| layer.index == i));
}

#[test]
fn frames_composite_visible_layers_only() {
	let doc = fixtures::hero().to_document().unwrap();

	let with_background = doc.render_frames(false);
	assert_eq!(with_background.len(), 4);
	assert_eq!(with_background[0].get_pixel(0, 15).0, GROUND);
	assert_eq!(with_background[0].get_pixel(4, 2).0, SKIN);
	// hidden group child and directive layers are not drawn
	assert_eq!(with_background[0].get_pixel(0, 0).0, [0, 0, 0, 0]);

	let without_background = doc.render_frames(true);
	assert_eq!(without_background[0].get_pixel(0, 15).0, [0, 0, 0, 0]);
	assert_eq!(without_background[3].get_pixel(7, 2).0, SKIN);
}

#[test]
fn truncated_file_fails_without_partial_document() {
	let bytes = fixtures::hero().build().unwrap();
	for len in [0, 64, 200, bytes.len() / 2] {
		assert!(AseFile::from_bytes(&bytes[..len]).is_err(), "{len} bytes decoded");
	}
}
