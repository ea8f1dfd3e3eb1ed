//! Persisted per-tag animation settings.

use serde::{Deserialize, Serialize};

use crate::file::ase::Tag;

/// User-editable settings of one animation clip, keyed by tag name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
	/// Name of the tag these settings belong to
	pub animation_name: String,
	/// Whether the clip loops; `false` plays it once
	pub loop_time: bool,
	/// Read-only summary of the tag, refreshed on every import
	pub about: String,
}

impl Default for AnimationSettings {
	fn default() -> Self {
		Self {
			animation_name: String::new(),
			loop_time: true,
			about: String::new(),
		}
	}
}

impl AnimationSettings {
	/// Creates default settings for the named tag.
	pub fn new(animation_name: impl Into<String>) -> Self {
		Self {
			animation_name: animation_name.into(),
			..Self::default()
		}
	}

	/// Summary text describing a tag.
	pub fn describe(tag: &Tag) -> String {
		format!("Animation Type:\t{}\nAnimation:\tFrom: {}; To: {}", tag.direction, tag.from, tag.to)
	}
}

/// Looks up the settings entry for a tag name.
pub fn settings_for<'a>(settings: &'a [AnimationSettings], name: &str) -> Option<&'a AnimationSettings> {
	settings.iter().find(|entry| entry.animation_name == name)
}

/// Brings persisted settings in line with the tags of a file.
///
/// Entries without a matching tag are dropped, keeping the order of the
/// rest. Tags without an entry get default settings appended in tag order.
/// Every kept entry's `about` text is refreshed. With no tags at all the
/// existing settings are returned unchanged.
pub fn reconcile(existing: &[AnimationSettings], tags: &[&Tag]) -> Vec<AnimationSettings> {
	if tags.is_empty() {
		return existing.to_vec();
	}

	let mut settings: Vec<AnimationSettings> = existing
		.iter()
		.filter(|entry| tags.iter().any(|tag| tag.name == entry.animation_name))
		.cloned()
		.collect();
	let pruned = existing.len() - settings.len();

	for tag in tags {
		match settings.iter_mut().find(|entry| entry.animation_name == tag.name) {
			Some(entry) => entry.about = AnimationSettings::describe(tag),
			None => settings.push(AnimationSettings {
				about: AnimationSettings::describe(tag),
				..AnimationSettings::new(&tag.name)
			}),
		}
	}

	if pruned > 0 {
		log::debug!("Reconciled animation settings: {} entries, {pruned} pruned", settings.len());
	}
	settings
}
