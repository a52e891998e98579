//! Utility types for the geometry cache.
//!
//! This module contains fundamental types used throughout the library:
//! - [`Error`] / [`Result`] - Error handling
//! - [`BBox3f`] - Bounding box for decoded frames
//! - Math type re-exports from glam
//! - [`Chrono`] / [`FrameIndex`] scalar aliases

mod error;
mod math;

pub use error::*;
pub use math::*;
