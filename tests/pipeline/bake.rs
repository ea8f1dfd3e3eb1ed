use asebake_rs::prelude::*;

use crate::fixtures::{self, NORMAL};

fn import(settings: ImportSettings, previous: &[AnimationSettings]) -> ImportOutput {
	let bytes = fixtures::hero().build().unwrap();
	Importer::new(settings).import("hero", &bytes, previous).unwrap()
}

#[test_log::test]
fn sprite_import_produces_every_output() {
	let output = import(ImportSettings::default(), &[]);

	assert_eq!(output.sprites.len(), 4);
	assert_eq!(output.sprites[0].name, "hero_0");
	for (i, a) in output.sprites.iter().enumerate() {
		for b in &output.sprites[i + 1..] {
			assert!(!a.rect.overlaps(&b.rect));
		}
	}

	let kinds: Vec<(MetaDataKind, Option<&str>)> =
		output.metadata.iter().map(|meta| (meta.kind, meta.target())).collect();
	assert_eq!(kinds, vec![
		(MetaDataKind::Transform, Some("hand")),
		(MetaDataKind::SecondaryTexture, Some("_Emission")),
		(MetaDataKind::SecondaryTexture, Some("_Mask")),
	]);

	let names: Vec<&str> = output.secondary_textures.iter().map(|texture| texture.name.as_str()).collect();
	assert_eq!(names, vec!["_Emission", "_Mask"]);
	for texture in &output.secondary_textures {
		assert_eq!(texture.atlas.rects, output.atlas.rects);
		assert_eq!(texture.atlas.image.dimensions(), output.atlas.image.dimensions());
	}

	let emission = &output.secondary_textures[0].atlas;
	let rect = output.sprites[1].rect;
	assert_eq!(emission.image.get_pixel(rect.x + 5, rect.y + 2).0, NORMAL);

	assert!(output.tiles.is_empty());
}

#[test]
fn clips_follow_tag_direction_and_timing() {
	let output = import(ImportSettings::default(), &[]);
	let clips: Vec<&str> = output.tracks.iter().map(|track| track.clip_name.as_str()).collect();
	assert_eq!(clips, vec!["hero_walk", "hero_back", "hero_bounce"]);

	let walk = &output.tracks[0];
	assert!((walk.length - 0.35).abs() < 1e-5);
	assert_eq!(walk.keyframes.len(), 4);
	assert_eq!(walk.wrap_mode, WrapMode::Loop);

	let back = &output.tracks[1];
	let sprites: Vec<usize> = back.keyframes.iter().map(|key| key.sprite).collect();
	assert_eq!(sprites, vec![3, 2, 1, 1]);

	assert_eq!(output.tracks[2].wrap_mode, WrapMode::PingPong);
}

#[test]
fn transform_curve_holds_over_missing_sample() {
	let output = import(ImportSettings::default(), &[]);
	let curve = output.tracks[0].curve("hand").unwrap();

	// walk visits frames 0, 1, 2; frame 2 has no hand pixel
	let times: Vec<f32> = curve.y.iter().map(|key| key.time).collect();
	assert_eq!(times, vec![0.0, 1.0]);
	assert_eq!(curve.sample(2.0), curve.sample(1.0));

	// frame 1 draws the hand one pixel higher than frame 0
	let first = curve.sample(0.0).unwrap();
	let second = curve.sample(1.0).unwrap();
	assert!((second.y - first.y - 0.01).abs() < 1e-6);
	assert!((first.x - 0.005).abs() < 1e-6);
}

#[test]
fn animation_settings_are_reconciled() {
	let previous = vec![
		AnimationSettings {
			loop_time: false,
			..AnimationSettings::new("back")
		},
		AnimationSettings::new("removed"),
	];
	let output = import(ImportSettings::default(), &previous);

	let names: Vec<&str> = output.animation_settings.iter().map(|entry| entry.animation_name.as_str()).collect();
	assert_eq!(names, vec!["back", "walk", "bounce"]);
	assert!(output.animation_settings[0].about.contains("Reverse"));
	assert_eq!(output.tracks[1].wrap_mode, WrapMode::Once);
	assert!(!output.tracks[1].loop_time);

	let json = serde_json::to_string(&output.animation_settings).unwrap();
	let restored: Vec<AnimationSettings> = serde_json::from_str(&json).unwrap();
	assert_eq!(restored, output.animation_settings);
}

#[test]
fn tileset_import_slices_the_atlas() {
	let settings = ImportSettings {
		import_mode: ImportMode::Tileset,
		tile_size: [16, 16],
		empty_tile_behaviour: EmptyTileBehaviour::Index,
		..ImportSettings::default()
	};
	let output = import(settings, &[]);

	assert!(output.tracks.is_empty());
	assert_eq!((output.atlas.width, output.atlas.height), (32, 32));
	let indices: Vec<usize> = output.tiles.iter().map(|tile| tile.index).collect();
	assert_eq!(indices, vec![0, 1, 2, 3]);
}

#[test]
fn overflow_aborts_the_import() {
	let settings = ImportSettings {
		atlas: AtlasConfig {
			max_size: 16,
			..AtlasConfig::default()
		},
		..ImportSettings::default()
	};
	let bytes = fixtures::hero().build().unwrap();

	let result = Importer::new(settings).import("hero", &bytes, &[]);
	assert!(matches!(result, Err(ImportError::Atlas(AtlasError::Overflow { .. }))));
}
