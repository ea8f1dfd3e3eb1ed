//! Prelude module for `asebake_internal`.
//!
//! This module provides a convenient way to import commonly used types and traits.
//!
//! # Examples
//!
//! ```rust
//! use asebake_internal::prelude::*;
//!
//! // Now you can use all common types directly
//! let settings = ImportSettings::default();
//! let importer = Importer::new(settings);
//! assert_eq!(importer.settings().import_mode, ImportMode::Sprite);
//! ```

// Re-export everything from asebake_types::prelude
#[doc(inline)]
pub use asebake_types::prelude::*;

// Re-export the entire asebake_types module for advanced usage
#[doc(inline)]
pub use asebake_types;
