//! Collection aliases used throughout the crate.
//!
//! The hashing, small-vector and slot-map choices live here so the rest of the
//! crate never names a concrete backend.

mod aliases;
mod helpers;

pub use aliases::*;
pub use helpers::*;
