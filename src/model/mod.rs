//! Shared constants.
//!
//! Pure data with no FFI dependencies, usable from every surface system.

pub mod constants;

pub use constants::*;
