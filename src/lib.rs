#![allow(clippy::single_component_path_imports)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! `asebake-rs` bakes Aseprite documents into texture atlases, sprite
//! rectangles and keyframe animation tracks.
//!
//! ```no_run
//! use asebake_rs::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let output = Importer::new(ImportSettings::default()).import_file("hero.aseprite", &[])?;
//! output.atlas.image.save("hero.png")?;
//! # Ok(())
//! # }
//! ```
pub use asebake_internal::*;

#[cfg(all(feature = "dynamic_linking", not(target_family = "wasm")))]
#[allow(unused_imports)]
use asebake_dylib;
