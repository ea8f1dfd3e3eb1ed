//! This crate provides the data types and processing stages of the `asebake-rs` project.
//!
//! # Stages
//!
//! - **Decoding** ([`file`]): `.ase` / `.aseprite` documents and their rasterization
//! - **Directives** ([`meta`]): `@`-prefixed layer names such as `@transform("arm")`
//! - **Packing** ([`atlas`]): shelf-packed texture atlases
//! - **Animation** ([`anim`]): sprite keyframes and transform curves per tag
//! - **Tiles** ([`tileset`]): regular tile grids cut from an atlas
//! - **Pipeline** ([`import`]): all of the above driven by [`settings::ImportSettings`]
//!
//! # Examples
//!
//! Using the prelude (recommended):
//!
//! ```no_run
//! use asebake_types::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let output = Importer::new(ImportSettings::default()).import_file("hero.aseprite", &[])?;
//! println!("{} sprites, {} clips", output.sprites.len(), output.tracks.len());
//! # Ok(())
//! # }
//! ```
//!
//! Or use explicit paths:
//!
//! ```no_run
//! use asebake_types::file::AseFile;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let doc = AseFile::open("hero.aseprite")?;
//! let frames = doc.render_frames(true);
//! # Ok(())
//! # }
//! ```

pub mod anim;
pub mod atlas;
pub mod file;
pub mod import;
pub mod meta;
pub mod settings;
pub mod tileset;

/// `use asebake_types::prelude::*;` to import commonly used items.
pub mod prelude;
