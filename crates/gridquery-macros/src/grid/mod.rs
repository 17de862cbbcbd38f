//! Implementation of the `#[derive(Gridable)]` macro.
//!
//! Generates the static schema descriptor, the field accessor and field
//! name constants from struct annotations.

mod attrs;
mod derive;

pub use derive::gridable_derive_impl;
