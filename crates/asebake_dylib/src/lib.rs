#![allow(clippy::single_component_path_imports)]

//! Forces dynamic linking of `asebake_internal` when the `dynamic_linking`
//! feature of `asebake-rs` is enabled.
//!
//! This crate should not be used directly.

#[allow(unused_imports)]
use asebake_internal;
