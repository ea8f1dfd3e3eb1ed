//! Animation clips built from tags.
//!
//! Every tag becomes one [`AnimationTrack`]: a list of sprite keyframes timed
//! from the frame durations, plus step curves for each `@transform` target.
//!
//! A clip of `n` frames has `n + 1` sprite keyframes. The extra key repeats
//! the last sprite one output frame (1/25 s) before the end of the clip, so
//! players that stop at the last key still show the final frame for its full
//! duration.

mod settings;

use glam::Vec2;
use serde::Serialize;

use crate::file::ase::{Document, LoopDirection, Tag};
use crate::meta::{MetaData, MetaDataKind};

pub use self::settings::{AnimationSettings, reconcile, settings_for};

/// Sample rate of the produced clips, in frames per second.
pub const OUTPUT_FRAME_RATE: f32 = 25.0;

/// Playback behaviour once the clip reaches its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
	/// Play once and stop
	Once,
	/// Restart from the beginning
	Loop,
	/// Alternate direction every cycle
	PingPong,
}

/// One sprite keyframe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpriteKeyframe {
	/// Time in seconds
	pub time: f32,
	/// Index of the sprite shown from this time on
	pub sprite: usize,
}

/// One key of a scalar curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurveKey {
	/// Key position, in keyframe indices
	pub time: f32,
	/// Value held from this key on
	pub value: f32,
}

/// Step curves for the local position of one transform target.
///
/// Keys are positioned by keyframe index rather than seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformCurve {
	/// Target name from the `@transform` directive
	pub target: String,
	/// Keys of the x coordinate
	pub x: Vec<CurveKey>,
	/// Keys of the y coordinate
	pub y: Vec<CurveKey>,
}

impl TransformCurve {
	fn new(target: &str) -> Self {
		Self {
			target: target.to_string(),
			x: Vec::new(),
			y: Vec::new(),
		}
	}

	fn push(&mut self, time: f32, position: Vec2) {
		self.x.push(CurveKey {
			time,
			value: position.x,
		});
		self.y.push(CurveKey {
			time,
			value: position.y,
		});
	}

	/// Evaluates the curve with constant interpolation.
	///
	/// Returns the value of the last key at or before `time`, or `None`
	/// before the first key.
	pub fn sample(&self, time: f32) -> Option<Vec2> {
		let x = step(&self.x, time)?;
		let y = step(&self.y, time)?;
		Some(Vec2::new(x, y))
	}
}

fn step(keys: &[CurveKey], time: f32) -> Option<f32> {
	keys.iter().take_while(|key| key.time <= time).last().map(|key| key.value)
}

/// Animation clip for one tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationTrack {
	/// Tag name
	pub tag: String,
	/// Clip name, `<file>_<tag>`
	pub clip_name: String,
	/// Direction of the tag
	pub direction: LoopDirection,
	/// Clip length in seconds, the sum of the traversed frame durations
	pub length: f32,
	/// Sprite keyframes, the trailing hold key included
	pub keyframes: Vec<SpriteKeyframe>,
	/// Transform curves in order of first appearance
	pub curves: Vec<TransformCurve>,
	/// Wrap mode
	pub wrap_mode: WrapMode,
	/// Whether the clip loops
	pub loop_time: bool,
}

impl AnimationTrack {
	/// Looks up the curve of a transform target.
	pub fn curve(&self, target: &str) -> Option<&TransformCurve> {
		self.curves.iter().find(|curve| curve.target == target)
	}

	/// Builds the clip of one tag.
	///
	/// # Arguments
	///
	/// * `file_name` - Prefix of the clip name
	/// * `tag` - Frame range and direction
	/// * `durations` - Duration of every frame of the document, in milliseconds
	/// * `metadata` - Directive layers; only transforms are used
	/// * `loop_time` - `false` forces [`WrapMode::Once`]
	///
	/// Sprite indices are frame indices. Frames outside `durations` are
	/// treated as lasting zero milliseconds.
	pub fn from_tag(
		file_name: &str,
		tag: &Tag,
		durations: &[u16],
		metadata: &[MetaData],
		loop_time: bool,
	) -> Self {
		let order: Vec<usize> = if tag.direction.is_reversed() {
			(tag.from as usize..=tag.to as usize).rev().collect()
		} else {
			(tag.from as usize..=tag.to as usize).collect()
		};

		let transforms: Vec<&MetaData> =
			metadata.iter().filter(|meta| meta.kind == MetaDataKind::Transform).collect();
		let mut curves: Vec<TransformCurve> = Vec::new();
		let mut keyframes = Vec::with_capacity(order.len() + 1);
		let mut time = 0.0f32;

		for (i, &frame) in order.iter().enumerate() {
			keyframes.push(SpriteKeyframe {
				time,
				sprite: frame,
			});
			time += durations.get(frame).copied().unwrap_or_default() as f32 / 1000.0;
			add_transform_keys(&mut curves, &transforms, frame, i as f32);
		}

		if let Some(&last) = order.last() {
			keyframes.push(SpriteKeyframe {
				time: time - 1.0 / OUTPUT_FRAME_RATE,
				sprite: last,
			});
			add_transform_keys(&mut curves, &transforms, last, order.len() as f32);
		}

		let wrap_mode = match (loop_time, tag.direction) {
			(false, _) => WrapMode::Once,
			(true, LoopDirection::Forward | LoopDirection::Reverse) => WrapMode::Loop,
			(true, LoopDirection::PingPong | LoopDirection::PingPongReverse) => WrapMode::PingPong,
		};

		Self {
			tag: tag.name.clone(),
			clip_name: format!("{file_name}_{}", tag.name),
			direction: tag.direction,
			length: time,
			keyframes,
			curves,
			wrap_mode,
			loop_time,
		}
	}
}

fn add_transform_keys(curves: &mut Vec<TransformCurve>, transforms: &[&MetaData], frame: usize, time: f32) {
	for meta in transforms {
		let (Some(target), Some(&position)) = (meta.target(), meta.transforms.get(&frame)) else {
			continue;
		};
		let index = match curves.iter().position(|curve| curve.target == target) {
			Some(index) => index,
			None => {
				curves.push(TransformCurve::new(target));
				curves.len() - 1
			}
		};
		curves[index].push(time, position);
	}
}

/// Builds one track per tag of the document.
///
/// The loop flag of each tag comes from its entry in `settings`; tags
/// without an entry loop. A document without tags yields no tracks.
pub fn synthesize(
	doc: &Document,
	file_name: &str,
	metadata: &[MetaData],
	settings: &[AnimationSettings],
) -> Vec<AnimationTrack> {
	let durations = doc.frame_durations();
	doc.tags()
		.into_iter()
		.map(|tag| {
			let loop_time = settings_for(settings, &tag.name).is_none_or(|entry| entry.loop_time);
			AnimationTrack::from_tag(file_name, tag, &durations, metadata, loop_time)
		})
		.collect()
}
