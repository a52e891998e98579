//! # geomcache
//!
//! Time-indexed geometry-cache streaming and frame sampling for animated
//! meshes.
//!
//! A [`GeometryTrack`](track::GeometryTrack) maps continuous playback time
//! onto discrete frame samples of an animated mesh stream. Decoded frames
//! come from a shared streaming backend (anything implementing
//! [`FrameStreamer`](core::FrameStreamer); [`CachingStreamer`](stream::CachingStreamer)
//! is the built-in one), which owns decode cost, a byte-budgeted frame
//! cache, and best-effort asynchronous prefetch. Per-frame metadata
//! (bounds, vertex/index counts) is cached lazily on the track and kept
//! for the session.
//!
//! ## Modules
//!
//! - [`util`] - Basic types (errors, math, scalar aliases)
//! - [`geom`] - Decoded mesh payloads
//! - [`core`] - Frame ranges, sample metadata, streaming traits
//! - [`stream`] - The built-in caching backend
//! - [`track`] - The high-level track API
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use geomcache::prelude::*;
//! use geomcache::util::Vec3;
//!
//! let streamer = Arc::new(CachingStreamer::new());
//!
//! // The decode callback is opaque to the library - here a procedural
//! // stand-in for a USD/Alembic reader.
//! let mut track = GeometryTrack::new(
//!     streamer,
//!     |_source, frame| {
//!         let mut mesh = MeshData::new();
//!         mesh.positions = vec![Vec3::splat(frame as f32)];
//!         mesh.indices = vec![0, 0, 0];
//!         Ok(mesh)
//!     },
//!     "memory:demo",
//!     FrameRange::new(0, 24),
//! );
//!
//! let mut cursor = FRAME_INDEX_NONE;
//! let mesh = track.update_mesh_data(3.9, false, &mut cursor);
//! assert!(mesh.is_some());
//! assert_eq!(cursor, 3);
//!
//! // Same resolved frame: no new data this tick
//! assert!(track.update_mesh_data(3.2, false, &mut cursor).is_none());
//! ```

pub mod util;
pub mod geom;
pub mod core;
pub mod stream;
pub mod track;

// Re-export commonly used types
pub use util::{Error, Result};
pub use track::GeometryTrack;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        DecodeFn, FrameRange, FrameStream, FrameStreamer, SampleInfo, TrackId,
    };
    pub use crate::geom::MeshData;
    pub use crate::stream::{CachingStreamer, FrameCache};
    pub use crate::track::GeometryTrack;
    pub use crate::util::{
        BBox3f, Chrono, Error, FrameIndex, Result, FRAME_INDEX_NONE,
    };
}
