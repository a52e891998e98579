//! Core layer - frame ranges, sample metadata, streaming traits.
//!
//! This module provides:
//! - [`FrameRange`] - Half-open frame range with time-to-index resolution
//! - [`SampleInfo`] / [`SampleInfoTable`] - Lazily cached per-frame metadata
//! - [`TrackId`] - Registration identity for tracks
//! - [`FrameStream`] - Stream object bound to a backend at registration
//! - [`FrameStreamer`] - Abstract trait for streaming backends

mod range;
mod sample_info;
mod traits;

pub use range::FrameRange;
pub use sample_info::{SampleInfo, SampleInfoTable};
pub use traits::{DecodeFn, FrameStream, FrameStreamer, TrackId};
