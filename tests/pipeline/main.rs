//! End-to-end tests for `asebake-rs`

mod bake;
mod decode;
mod fixtures;
