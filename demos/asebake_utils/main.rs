//! Aseprite baking utility.
//!
//! Provides two subcommands:
//! - `import`: run the import pipeline on a file and write the atlas, the
//!   secondary textures and a JSON description of sprites, clips and tiles.
//! - `info`: print the header, layers (with their directive), tags and frame
//!   durations of a file.
//!
//! # Settings
//!
//! Import settings are read from an optional TOML file, then from
//! `ASEBAKE_`-prefixed environment variables (nested keys use `__`, e.g.
//! `ASEBAKE_ATLAS__PADDING=2`), then from command-line flags.
//!
//! ```toml
//! pixels_per_unit = 16
//! sprite_pivot = [0.5, 0.0]
//! import_mode = "sprite"
//!
//! [atlas]
//! padding = 1
//! size_policy = "tight"
//! ```
//!
//! # Usage
//!
//! ```bash
//! # Bake a file next to it
//! cargo run --example asebake_utils -- import hero.aseprite
//!
//! # Bake with settings into another directory
//! cargo run --example asebake_utils -- import hero.aseprite -c bake.toml -o out/
//!
//! # Cut a tileset into 16x16 tiles, dropping empty ones
//! cargo run --example asebake_utils -- import tiles.aseprite --mode tileset --tile-size 16 --empty-tiles remove
//!
//! # Show file information
//! cargo run --example asebake_utils -- info hero.aseprite
//! ```

use std::{
	fs,
	path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use asebake_rs::prelude::*;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

fn main() -> Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let cli = Cli::parse();
	match cli.command {
		Command::Import(opts) => run_import(opts),
		Command::Info(opts) => run_info(opts),
	}
}

#[derive(Parser)]
#[command(name = "asebake_utils")]
#[command(author = "asebake-rs project")]
#[command(version)]
#[command(about = "Bake Aseprite files into atlases and animation clips", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Bake a file into an atlas, sprites, clips and tiles
	Import(ImportArgs),
	/// Show information about a file
	Info(InfoArgs),
}

#[derive(Args)]
struct ImportArgs {
	/// Input .ase / .aseprite file
	#[arg(value_name = "FILE")]
	input: PathBuf,

	/// Output directory (defaults to the directory of the input)
	#[arg(short, long, value_name = "DIR")]
	output: Option<PathBuf>,

	/// TOML settings file
	#[arg(short, long, value_name = "SETTINGS")]
	config: Option<PathBuf>,

	/// Animation settings JSON from a previous import
	/// (defaults to `<name>.anim.json` in the output directory)
	#[arg(short, long, value_name = "JSON")]
	animations: Option<PathBuf>,

	/// Import mode
	#[arg(short, long, value_enum)]
	mode: Option<ModeArg>,

	/// Pixels per world unit
	#[arg(long, value_name = "PPU")]
	pixels_per_unit: Option<f32>,

	/// Gap between packed sprites, in pixels
	#[arg(long, value_name = "PIXELS")]
	padding: Option<u32>,

	/// Crop the atlas to the used area instead of a power of two
	#[arg(long, default_value_t = false)]
	tight: bool,

	/// Keep the background layer in the frames
	#[arg(long, default_value_t = false)]
	keep_background: bool,

	/// Square tile size for tileset mode
	#[arg(long, value_name = "PIXELS")]
	tile_size: Option<u32>,

	/// Handling of empty tiles in tileset mode
	#[arg(long, value_enum)]
	empty_tiles: Option<EmptyTilesArg>,
}

#[derive(Args)]
struct InfoArgs {
	/// Input .ase / .aseprite file
	#[arg(value_name = "FILE")]
	input: PathBuf,

	/// Also list the chunks of every frame
	#[arg(short, long, default_value_t = false)]
	detailed: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
	Sprite,
	Tileset,
	LayerToSprite,
}

impl From<ModeArg> for ImportMode {
	fn from(mode: ModeArg) -> Self {
		match mode {
			ModeArg::Sprite => Self::Sprite,
			ModeArg::Tileset => Self::Tileset,
			ModeArg::LayerToSprite => Self::LayerToSprite,
		}
	}
}

#[derive(Clone, Copy, ValueEnum)]
enum EmptyTilesArg {
	Keep,
	Index,
	Remove,
}

impl From<EmptyTilesArg> for EmptyTileBehaviour {
	fn from(value: EmptyTilesArg) -> Self {
		match value {
			EmptyTilesArg::Keep => Self::Keep,
			EmptyTilesArg::Index => Self::Index,
			EmptyTilesArg::Remove => Self::Remove,
		}
	}
}

/// JSON description written next to the atlas.
#[derive(Serialize)]
struct BakeReport<'a> {
	name: &'a str,
	texture: String,
	width: u32,
	height: u32,
	filter_mode: FilterMode,
	wrap_mode: TextureWrap,
	sprites: &'a [NamedSprite],
	secondary_textures: Vec<SecondaryReport>,
	tracks: &'a [AnimationTrack],
	tiles: &'a [TileSprite],
	metadata: &'a [MetaData],
}

#[derive(Serialize)]
struct SecondaryReport {
	name: String,
	texture: String,
}

/// Layers settings from the TOML file, the environment and the flags.
fn load_settings(args: &ImportArgs) -> Result<ImportSettings> {
	let mut builder = config::Config::builder();
	if let Some(path) = &args.config {
		builder = builder.add_source(config::File::from(path.as_path()).required(true));
	}
	builder = builder.add_source(
		config::Environment::with_prefix("ASEBAKE").prefix_separator("_").separator("__").try_parsing(true),
	);

	let mut settings: ImportSettings = builder
		.build()
		.context("Failed to load import settings")?
		.try_deserialize()
		.context("Invalid import settings")?;

	if let Some(mode) = args.mode {
		settings.import_mode = mode.into();
	}
	if let Some(ppu) = args.pixels_per_unit {
		settings.pixels_per_unit = ppu;
	}
	if let Some(padding) = args.padding {
		settings.atlas.padding = padding;
	}
	if args.tight {
		settings.atlas.size_policy = SizePolicy::Tight;
	}
	if args.keep_background {
		settings.ignore_background = false;
	}
	if let Some(size) = args.tile_size {
		settings.tile_size = [size, size];
	}
	if let Some(empty) = args.empty_tiles {
		settings.empty_tile_behaviour = empty.into();
	}

	Ok(settings)
}

fn load_animation_settings(path: &Path) -> Result<Vec<AnimationSettings>> {
	if !path.exists() {
		return Ok(Vec::new());
	}
	let json = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
	serde_json::from_str(&json).with_context(|| format!("Failed to parse {}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
	let json = serde_json::to_string_pretty(value)?;
	fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

fn run_import(args: ImportArgs) -> Result<()> {
	if !args.input.is_file() {
		bail!("Input file {} does not exist", args.input.display());
	}

	let settings = load_settings(&args)?;
	let name = args
		.input
		.file_stem()
		.map(|stem| stem.to_string_lossy().into_owned())
		.context("Input path has no file name")?;
	let output_dir = match &args.output {
		Some(dir) => dir.clone(),
		None => args.input.parent().map(Path::to_path_buf).unwrap_or_default(),
	};
	fs::create_dir_all(&output_dir)
		.with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

	let animations_path = args.animations.clone().unwrap_or_else(|| output_dir.join(format!("{name}.anim.json")));
	let previous = load_animation_settings(&animations_path)?;

	let bytes = fs::read(&args.input).with_context(|| format!("Failed to read {}", args.input.display()))?;
	let output = Importer::new(settings)
		.import(&name, &bytes, &previous)
		.with_context(|| format!("Failed to import {}", args.input.display()))?;

	let texture = format!("{name}.png");
	output
		.atlas
		.image
		.save(output_dir.join(&texture))
		.with_context(|| format!("Failed to save {texture}"))?;

	let mut secondary_textures = Vec::with_capacity(output.secondary_textures.len());
	for secondary in &output.secondary_textures {
		let file = format!("{name}{}.png", texture_suffix(&secondary.name));
		secondary.atlas.image.save(output_dir.join(&file)).with_context(|| format!("Failed to save {file}"))?;
		secondary_textures.push(SecondaryReport {
			name: secondary.name.clone(),
			texture: file,
		});
	}

	let report = BakeReport {
		name: &name,
		texture,
		width: output.atlas.width,
		height: output.atlas.height,
		filter_mode: output.filter_mode,
		wrap_mode: output.wrap_mode,
		sprites: &output.sprites,
		secondary_textures,
		tracks: &output.tracks,
		tiles: &output.tiles,
		metadata: &output.metadata,
	};
	write_json(&output_dir.join(format!("{name}.json")), &report)?;
	write_json(&animations_path, &output.animation_settings)?;

	println!(
		"{} -> {} ({}x{}, {} sprites, {} clips, {} tiles, {} secondary textures)",
		args.input.display(),
		output_dir.display(),
		output.atlas.width,
		output.atlas.height,
		output.sprites.len(),
		output.tracks.len(),
		output.tiles.len(),
		output.secondary_textures.len()
	);
	Ok(())
}

/// File name suffix for a secondary texture, `_NormalMap` stays as is.
fn texture_suffix(name: &str) -> String {
	if name.starts_with('_') {
		name.to_string()
	} else {
		format!("_{name}")
	}
}

fn run_info(args: InfoArgs) -> Result<()> {
	let doc = AseFile::open(&args.input).with_context(|| format!("Failed to open {}", args.input.display()))?;
	let header = doc.header();

	println!("File: {}", args.input.display());
	println!("{header}");
	println!();

	let layers = doc.layers();
	println!("Layers ({}):", layers.len());
	for layer in &layers {
		let (kind, directive_args) = classify(&layer.name);
		let indent = "  ".repeat(layer.child_level as usize + 1);
		let mut line = format!("{indent}[{}] {} ({:?}, {:?}", layer.index, layer.name, layer.kind, layer.blend_mode);
		if !layer.is_visible() {
			line.push_str(", hidden");
		}
		if layer.is_background() {
			line.push_str(", background");
		}
		line.push(')');
		if kind != MetaDataKind::Unknown {
			line.push_str(&format!(" -> {kind} {directive_args:?}"));
		}
		println!("{line}");
	}
	println!();

	let tags = doc.tags();
	println!("Tags ({}):", tags.len());
	for tag in &tags {
		println!("  {}: {}..={} {} ({} frames)", tag.name, tag.from, tag.to, tag.direction, tag.frame_count());
	}
	println!();

	let durations = doc.frame_durations();
	let total: u32 = durations.iter().map(|&ms| ms as u32).sum();
	println!("Frames ({}, {total} ms total):", durations.len());
	for (index, frame) in doc.frames().iter().enumerate() {
		if args.detailed {
			let kinds: Vec<String> = frame.chunks().iter().map(|chunk| format!("0x{:04X}", chunk.kind())).collect();
			println!("  #{index}: {} ms, chunks [{}]", frame.duration(), kinds.join(", "));
		} else {
			println!("  #{index}: {} ms", frame.duration());
		}
	}

	Ok(())
}
