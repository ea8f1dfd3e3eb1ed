//! Rasterization of decoded documents into RGBA canvases.
//!
//! Three outputs are supported:
//! - [`Document::render_frames`]: one composited canvas per frame
//! - [`Document::render_layers`]: one canvas per layer, for files where each
//!   layer is a sprite variant rather than an animation step
//! - [`Document::render_layer_frames`]: one layer alone in every frame, used
//!   for secondary texture maps that must line up with the frame atlas
//!
//! Layers whose name starts with `@` are directive layers and never take part
//! in regular compositing.

use image::{Rgba, RgbaImage};

use super::{BlendMode, CelChunk, CelContent, ColorDepth, Document, LayerChunk, LayerKind};

/// Prefix marking directive layers.
pub const DIRECTIVE_PREFIX: char = '@';

impl Document {
	/// Composites every renderable layer into one canvas per frame.
	///
	/// # Arguments
	///
	/// * `ignore_background` - Skip the layer flagged as background
	///
	/// # Returns
	///
	/// Canvases index-aligned with [`Document::frames`].
	pub fn render_frames(&self, ignore_background: bool) -> Vec<RgbaImage> {
		let layers = self.layers();
		let renderable = self.renderable_layers(&layers, ignore_background);
		let palette = self.palette();

		(0..self.frames().len())
			.map(|frame| {
				let mut canvas = self.blank_canvas();
				let mut cels: Vec<(&CelChunk, &LayerChunk)> = renderable
					.iter()
					.filter_map(|&layer| self.cel(frame, layer.index).map(|cel| (cel, layer)))
					.collect();
				// Cels draw in layer order shifted by their z-index; ties keep the lower z-index first.
				cels.sort_by_key(|(cel, layer)| (layer.index as i64 + cel.z_index as i64, cel.z_index));

				for (cel, layer) in cels {
					let opacity = self.effective_opacity(cel, layer);
					self.draw_cel(&mut canvas, cel, layer, opacity, &palette);
				}
				canvas
			})
			.collect()
	}

	/// Renders one canvas per renderable layer.
	///
	/// Each canvas holds the layer's content from the first frame that has a
	/// cel for it, or stays transparent when the layer is empty. The
	/// background layer is a variant like any other and gets its own canvas.
	pub fn render_layers(&self) -> Vec<RgbaImage> {
		let layers = self.layers();
		let palette = self.palette();

		self.renderable_layers(&layers, false)
			.into_iter()
			.map(|layer| {
				let mut canvas = self.blank_canvas();
				let first = (0..self.frames().len()).find_map(|frame| self.cel(frame, layer.index));
				if let Some(cel) = first {
					let opacity = self.effective_opacity(cel, layer);
					self.draw_cel(&mut canvas, cel, layer, opacity, &palette);
				}
				canvas
			})
			.collect()
	}

	/// Renders a single layer on its own in every frame.
	///
	/// Visibility and the directive prefix are ignored: secondary texture
	/// layers are usually hidden in the editor. Frames without a cel for the
	/// layer produce a transparent canvas, so the output always has one entry
	/// per frame.
	pub fn render_layer_frames(&self, layer_index: usize) -> Vec<RgbaImage> {
		let layers = self.layers();
		let palette = self.palette();
		let Some(layer) = layers.get(layer_index).copied() else {
			return vec![self.blank_canvas(); self.frames().len()];
		};

		(0..self.frames().len())
			.map(|frame| {
				let mut canvas = self.blank_canvas();
				if let Some(cel) = self.cel(frame, layer_index) {
					let opacity = cel.opacity as f32 / 255.0;
					self.draw_cel_with_mode(&mut canvas, cel, layer, opacity, BlendMode::Normal, &palette);
				}
				canvas
			})
			.collect()
	}

	/// Converts a cel's pixel data to an RGBA image.
	///
	/// Returns `None` for linked and tilemap cels.
	pub fn cel_image(&self, cel: &CelChunk, layer: &LayerChunk) -> Option<RgbaImage> {
		self.cel_image_with_palette(cel, layer, &self.palette())
	}

	fn cel_image_with_palette(
		&self,
		cel: &CelChunk,
		layer: &LayerChunk,
		palette: &[[u8; 4]],
	) -> Option<RgbaImage> {
		let CelContent::Image {
			width,
			height,
			pixels,
		} = &cel.content
		else {
			if matches!(cel.content, CelContent::Tilemap { .. }) {
				log::warn!("Tilemap cel on layer {} is not rendered", cel.layer_index);
			}
			return None;
		};

		let depth = self.header().color_depth();
		let transparent = self.header().transparent_index();
		let mut rgba = Vec::with_capacity(*width as usize * *height as usize * 4);
		for pixel in pixels.chunks_exact(depth.bytes_per_pixel()) {
			let color = match depth {
				ColorDepth::Rgba => [pixel[0], pixel[1], pixel[2], pixel[3]],
				ColorDepth::Grayscale => [pixel[0], pixel[0], pixel[0], pixel[1]],
				ColorDepth::Indexed => {
					let index = pixel[0];
					if index == transparent && !layer.is_background() {
						[0, 0, 0, 0]
					} else {
						palette.get(index as usize).copied().unwrap_or([0, 0, 0, 0])
					}
				}
			};
			rgba.extend_from_slice(&color);
		}
		RgbaImage::from_raw(*width as u32, *height as u32, rgba)
	}

	/// Layers that take part in regular compositing, in layer order.
	fn renderable_layers<'a>(
		&self,
		layers: &[&'a LayerChunk],
		ignore_background: bool,
	) -> Vec<&'a LayerChunk> {
		let visible = effective_visibility(layers);
		layers
			.iter()
			.zip(visible)
			.filter(|(layer, visible)| {
				*visible
					&& layer.kind == LayerKind::Normal
					&& !layer.name.starts_with(DIRECTIVE_PREFIX)
					&& !(ignore_background && layer.is_background())
			})
			.map(|(layer, _)| *layer)
			.collect()
	}

	fn effective_opacity(&self, cel: &CelChunk, layer: &LayerChunk) -> f32 {
		let layer_opacity = if self.header().layer_opacity_valid() {
			layer.opacity as f32 / 255.0
		} else {
			1.0
		};
		cel.opacity as f32 / 255.0 * layer_opacity
	}

	fn blank_canvas(&self) -> RgbaImage {
		RgbaImage::from_pixel(self.width(), self.height(), Rgba([0, 0, 0, 0]))
	}

	fn draw_cel(
		&self,
		canvas: &mut RgbaImage,
		cel: &CelChunk,
		layer: &LayerChunk,
		opacity: f32,
		palette: &[[u8; 4]],
	) {
		self.draw_cel_with_mode(canvas, cel, layer, opacity, layer.blend_mode, palette);
	}

	fn draw_cel_with_mode(
		&self,
		canvas: &mut RgbaImage,
		cel: &CelChunk,
		layer: &LayerChunk,
		opacity: f32,
		mode: BlendMode,
		palette: &[[u8; 4]],
	) {
		let Some(image) = self.cel_image_with_palette(cel, layer, palette) else {
			return;
		};

		let (canvas_w, canvas_h) = (canvas.width() as i64, canvas.height() as i64);
		for (x, y, src) in image.enumerate_pixels() {
			let cx = cel.x as i64 + x as i64;
			let cy = cel.y as i64 + y as i64;
			if cx < 0 || cy < 0 || cx >= canvas_w || cy >= canvas_h {
				continue;
			}
			let dst = canvas.get_pixel_mut(cx as u32, cy as u32);
			*dst = Rgba(blend_pixel(dst.0, src.0, opacity, mode));
		}
	}
}

/// Visibility of each layer, taking every ancestor group into account.
fn effective_visibility(layers: &[&LayerChunk]) -> Vec<bool> {
	let mut groups: Vec<(u16, bool)> = Vec::new();
	layers
		.iter()
		.map(|layer| {
			while groups.last().is_some_and(|&(level, _)| level >= layer.child_level) {
				groups.pop();
			}
			let parent_visible = groups.last().is_none_or(|&(_, visible)| visible);
			let visible = parent_visible && layer.is_visible();
			if layer.is_group() {
				groups.push((layer.child_level, visible));
			}
			visible
		})
		.collect()
}

/// Composites `src` over `dst` with the given opacity and blend mode.
pub(crate) fn blend_pixel(dst: [u8; 4], src: [u8; 4], opacity: f32, mode: BlendMode) -> [u8; 4] {
	let sa = src[3] as f32 / 255.0 * opacity;
	if sa <= 0.0 {
		return dst;
	}
	let da = dst[3] as f32 / 255.0;
	let ra = sa + da * (1.0 - sa);

	let mut out = [0u8; 4];
	for c in 0..3 {
		let cs = src[c] as f32 / 255.0;
		let cb = dst[c] as f32 / 255.0;
		let mixed = (1.0 - da) * cs + da * blend_channel(mode, cb, cs);
		let rc = (mixed * sa + cb * da * (1.0 - sa)) / ra;
		out[c] = to_u8(rc);
	}
	out[3] = to_u8(ra);
	out
}

fn blend_channel(mode: BlendMode, cb: f32, cs: f32) -> f32 {
	match mode {
		BlendMode::Multiply => cb * cs,
		BlendMode::Screen => screen(cb, cs),
		BlendMode::Overlay => hard_light(cs, cb),
		BlendMode::Darken => cb.min(cs),
		BlendMode::Lighten => cb.max(cs),
		BlendMode::HardLight => hard_light(cb, cs),
		BlendMode::Difference => (cb - cs).abs(),
		BlendMode::Exclusion => cb + cs - 2.0 * cb * cs,
		BlendMode::Addition => (cb + cs).min(1.0),
		BlendMode::Subtract => (cb - cs).max(0.0),
		BlendMode::Divide => {
			if cs <= 0.0 {
				1.0
			} else {
				(cb / cs).min(1.0)
			}
		}
		_ => cs,
	}
}

fn screen(cb: f32, cs: f32) -> f32 {
	cb + cs - cb * cs
}

fn hard_light(cb: f32, cs: f32) -> f32 {
	if cs <= 0.5 {
		cb * 2.0 * cs
	} else {
		screen(cb, 2.0 * cs - 1.0)
	}
}

#[inline]
fn to_u8(value: f32) -> u8 {
	(value * 255.0).round().clamp(0.0, 255.0) as u8
}
