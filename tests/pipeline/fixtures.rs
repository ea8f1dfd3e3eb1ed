use asebake_rs::prelude::*;

pub(crate) const SKIN: [u8; 4] = [220, 180, 140, 255];
pub(crate) const GROUND: [u8; 4] = [40, 90, 40, 255];
pub(crate) const NORMAL: [u8; 4] = [128, 128, 255, 255];
pub(crate) const DURATIONS: [u16; 4] = [100, 150, 100, 200];

fn fill(color: [u8; 4], width: u16, height: u16) -> Vec<u8> {
	color.repeat(width as usize * height as usize)
}

/// A 16x16 walk cycle with a background, a hidden group, a hand marker and
/// two secondary maps.
pub(crate) fn hero() -> AseFileBuilder {
	let mut background = LayerChunk::new("Background");
	background.flags = file::LayerFlags::VISIBLE | file::LayerFlags::BACKGROUND;
	let mut group = LayerChunk::new("fx");
	group.kind = file::LayerKind::Group;
	group.flags = file::LayerFlags::EDITABLE;
	let mut sparks = LayerChunk::new("sparks");
	sparks.child_level = 1;

	let mut builder = AseFileBuilder::new(16, 16, ColorDepth::Rgba)
		.layer(background)
		.layer(LayerChunk::new("body"))
		.layer(group)
		.layer(sparks)
		.layer(LayerChunk::new("@transform(\"hand\")"))
		.layer(LayerChunk::new("@emission"))
		.layer(LayerChunk::new("@secondary(\"_Mask\")"))
		.layer(LayerChunk::new("@outline"));

	for (frame, &duration) in DURATIONS.iter().enumerate() {
		builder = builder
			.frame(duration)
			.cel(frame, CelChunk::image(0, 0, 12, 16, 4, fill(GROUND, 16, 4)))
			.cel(frame, CelChunk::image(1, 4 + frame as i16, 2, 6, 10, fill(SKIN, 6, 10)))
			.cel(frame, CelChunk::image(3, 0, 0, 16, 16, fill([255, 255, 0, 255], 16, 16)))
			.cel(frame, CelChunk::image(5, 4 + frame as i16, 2, 6, 10, fill(NORMAL, 6, 10)));
		// The hand marker is missing in frame 2
		if frame != 2 {
			builder = builder.cel(frame, CelChunk::image(4, 8, 8 - frame as i16, 1, 1, fill(SKIN, 1, 1)));
		}
	}

	builder
		.cel(0, CelChunk::image(6, 0, 0, 2, 2, fill([255, 255, 255, 255], 2, 2)))
		.tag(Tag::new("walk", 0, 2, LoopDirection::Forward))
		.tag(Tag::new("back", 1, 3, LoopDirection::Reverse))
		.tag(Tag::new("bounce", 0, 3, LoopDirection::PingPong))
}
