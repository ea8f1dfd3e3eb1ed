//! This module is separated into its own crate to enable simple dynamic linking for `asebake`, and should not be used directly.

/// `use asebake::prelude::*;` to import commonly used items.
pub mod prelude;

// Re-export asebake_types for convenience
pub use asebake_types;

// Re-export the stage modules at crate root
pub use asebake_types::{anim, atlas, file, import, meta, settings, tileset};
