//! Layer name directives.
//!
//! Layers whose name starts with `@` carry processing instructions instead of
//! artwork:
//!
//! | Name                  | Meaning                                   |
//! |-----------------------|-------------------------------------------|
//! | `@transform("arm")`   | Track the layer's position as `arm`       |
//! | `@secondary("_Glow")` | Export the layer as the `_Glow` texture   |
//! | `@emission`           | Shortcut for `@secondary("_Emission")`    |
//! | `@normal`             | Shortcut for `@secondary("_NormalMap")`   |
//!
//! The shortcuts match the whole name, ignoring case.
//!
//! # Examples
//!
//! ```
//! use asebake_types::meta::{MetaDataKind, classify};
//!
//! let (kind, args) = classify("@transform(\"arm\")");
//! assert_eq!(kind, MetaDataKind::Transform);
//! assert_eq!(args, vec!["arm".to_string()]);
//!
//! assert_eq!(classify("plainLayer").0, MetaDataKind::Unknown);
//! ```

use std::collections::BTreeMap;
use std::sync::LazyLock;

use glam::Vec2;
use regex::{Captures, Regex};
use serde::Serialize;

use crate::file::ase::{DIRECTIVE_PREFIX, Document};

/// Classification of a directive layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaDataKind {
	/// Plain layer or unsupported directive
	Unknown,
	/// Position tracking for a child transform
	Transform,
	/// Auxiliary texture map
	SecondaryTexture,
}

impl std::fmt::Display for MetaDataKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			Self::Unknown => "none",
			Self::Transform => "transform",
			Self::SecondaryTexture => "secondary texture",
		};
		f.write_str(name)
	}
}

/// Directive information extracted from one layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetaData {
	/// Classification
	pub kind: MetaDataKind,
	/// Index of the layer carrying the directive
	pub layer_index: usize,
	/// Full layer name
	pub layer_name: String,
	/// Directive arguments
	pub args: Vec<String>,
	/// Average position per frame index, in world units (transforms only)
	pub transforms: BTreeMap<usize, Vec2>,
}

impl MetaData {
	/// First directive argument: the transform target or texture name.
	pub fn target(&self) -> Option<&str> {
		self.args.first().map(String::as_str)
	}
}

type Handler = fn(&Captures<'_>) -> (MetaDataKind, Vec<String>);

struct Rule {
	pattern: Regex,
	handler: Handler,
}

impl Rule {
	fn new(pattern: &str, handler: Handler) -> Self {
		Self {
			pattern: Regex::new(pattern).expect("directive patterns are valid regexes"),
			handler,
		}
	}
}

/// Directive rules, evaluated top to bottom.
static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
	vec![
		Rule::new(r#"@transform\("(.*)"\)"#, |caps| (MetaDataKind::Transform, vec![caps[1].to_string()])),
		Rule::new(r#"@secondary\("(.*)"\)"#, |caps| {
			(MetaDataKind::SecondaryTexture, vec![caps[1].to_string()])
		}),
		Rule::new(r"(?i)^@emission$", |_| (MetaDataKind::SecondaryTexture, vec!["_Emission".to_string()])),
		Rule::new(r"(?i)^@normal$", |_| (MetaDataKind::SecondaryTexture, vec!["_NormalMap".to_string()])),
	]
});

/// Classifies a layer name.
///
/// Names that do not start with `@` are plain layers. An `@` name that no
/// rule recognizes is reported with a warning and also classifies as
/// [`MetaDataKind::Unknown`].
pub fn classify(name: &str) -> (MetaDataKind, Vec<String>) {
	if !name.starts_with(DIRECTIVE_PREFIX) {
		return (MetaDataKind::Unknown, Vec::new());
	}

	for rule in RULES.iter() {
		if let Some(caps) = rule.pattern.captures(name) {
			return (rule.handler)(&caps);
		}
	}

	log::warn!("Unsupported aseprite metadata {name}");
	(MetaDataKind::Unknown, Vec::new())
}

/// Collects one [`MetaData`] per recognized directive layer, in layer order.
///
/// Transform samples are left empty; see [`sample_transforms`].
pub fn extract_metadata(doc: &Document) -> Vec<MetaData> {
	doc.layers()
		.into_iter()
		.filter_map(|layer| {
			let (kind, args) = classify(&layer.name);
			(kind != MetaDataKind::Unknown).then(|| MetaData {
				kind,
				layer_index: layer.index,
				layer_name: layer.name.clone(),
				args,
				transforms: BTreeMap::new(),
			})
		})
		.collect()
}

/// Fills the per-frame position samples of every transform entry.
///
/// The sample is the average center of all pixels with non-zero alpha in the
/// layer's cel, expressed relative to the sprite pivot with y pointing up and
/// scaled by `pixels_per_unit`. Frames where the layer has no cel, or only
/// transparent pixels, get no sample.
pub fn sample_transforms(doc: &Document, metadata: &mut [MetaData], pivot: Vec2, pixels_per_unit: f32) {
	let layers = doc.layers();
	let canvas = Vec2::new(doc.width() as f32, doc.height() as f32);
	let origin = pivot * canvas;

	for meta in metadata.iter_mut().filter(|meta| meta.kind == MetaDataKind::Transform) {
		let Some(layer) = layers.get(meta.layer_index).copied() else {
			continue;
		};

		for frame in 0..doc.frames().len() {
			let Some(cel) = doc.cel(frame, meta.layer_index) else {
				continue;
			};
			let Some(image) = doc.cel_image(cel, layer) else {
				continue;
			};

			let mut sum = Vec2::ZERO;
			let mut count = 0u32;
			for (x, y, pixel) in image.enumerate_pixels() {
				if pixel.0[3] > 0 {
					sum += Vec2::new(cel.x as f32 + x as f32 + 0.5, cel.y as f32 + y as f32 + 0.5);
					count += 1;
				}
			}
			if count == 0 {
				continue;
			}

			let average = sum / count as f32;
			let up = Vec2::new(average.x, canvas.y - average.y);
			meta.transforms.insert(frame, (up - origin) / pixels_per_unit);
		}

		log::debug!(
			"Sampled {} frames for transform `{}`",
			meta.transforms.len(),
			meta.target().unwrap_or_default()
		);
	}
}
