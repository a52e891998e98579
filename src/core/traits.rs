//! Abstract traits for streaming backends.
//!
//! These types define the seam between a track (owner-thread playback
//! state) and the streaming backend that decodes and caches frames.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::core::FrameRange;
use crate::geom::MeshData;
use crate::util::{Error, FrameIndex, Result};

/// Identity of one registered track within a streaming backend.
///
/// Process-unique; a dropped track's id is never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TrackId(u64);

impl TrackId {
    /// Allocate the next unique id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value, for diagnostics.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "track#{}", self.0)
    }
}

/// Decode callback: produces the geometry of one frame from a source.
///
/// Opaque to this crate - typically a USD/Alembic reader or a procedural
/// generator. Must be callable from backend worker threads.
pub type DecodeFn = dyn Fn(&Path, FrameIndex) -> Result<MeshData> + Send + Sync;

/// Stream object bound to a backend when a track registers.
///
/// Holds everything the backend needs to produce frames on its own:
/// the source path, the decode callback, and the addressable range.
#[derive(Clone)]
pub struct FrameStream {
    source: PathBuf,
    range: FrameRange,
    decode: Arc<DecodeFn>,
}

impl FrameStream {
    /// Create a stream handle from a decode callback and source path.
    pub fn new<F>(decode: F, source: impl Into<PathBuf>, range: FrameRange) -> Self
    where
        F: Fn(&Path, FrameIndex) -> Result<MeshData> + Send + Sync + 'static,
    {
        Self {
            source: source.into(),
            range,
            decode: Arc::new(decode),
        }
    }

    /// Source path handed to the decode callback.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Addressable frame range.
    pub fn range(&self) -> FrameRange {
        self.range
    }

    /// Decode the frame at `index`.
    ///
    /// Out-of-range indices are rejected before the callback runs.
    pub fn decode_frame(&self, index: FrameIndex) -> Result<MeshData> {
        if !self.range.contains(index) {
            return Err(Error::FrameOutOfRange {
                index,
                start: self.range.start,
                end: self.range.end,
            });
        }
        (self.decode)(&self.source, index)
    }
}

impl fmt::Debug for FrameStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameStream")
            .field("source", &self.source)
            .field("range", &self.range)
            .finish_non_exhaustive()
    }
}

/// Streaming backend: decodes, caches, and prefetches frames for
/// registered tracks.
///
/// A track holds an `Arc<dyn FrameStreamer>` for its whole lifetime and
/// must unregister on drop; registration is the gate for every fetch.
pub trait FrameStreamer: Send + Sync {
    /// Bind a track to its frame stream. Rebinding an already registered
    /// id replaces the previous stream and drops its cached frames.
    fn register(&self, id: TrackId, stream: FrameStream);

    /// Remove a track's binding and drop its cached frames. Idempotent.
    fn unregister(&self, id: TrackId);

    /// Check whether `id` is currently registered.
    fn is_registered(&self, id: TrackId) -> bool;

    /// Fetch the decoded frame at `index`, decoding on a cache miss.
    ///
    /// Fails closed (`None`) when the track is not registered. Decode
    /// failures also surface as `None`: the caller keeps its previous
    /// frame and retries on a later tick.
    fn try_get_frame(&self, id: TrackId, index: FrameIndex) -> Option<Arc<MeshData>>;

    /// Hint that `index` will be needed soon. Best effort, fire-and-forget.
    fn prefetch(&self, id: TrackId, index: FrameIndex);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_ids_unique() {
        let a = TrackId::next();
        let b = TrackId::next();
        assert_ne!(a, b);
        assert!(b.raw() > a.raw());
        assert_eq!(format!("{a}"), format!("track#{}", a.raw()));
    }

    #[test]
    fn test_stream_decode_gates_range() {
        let stream = FrameStream::new(
            |_path, frame| {
                let mut mesh = MeshData::new();
                mesh.positions = vec![glam::Vec3::splat(frame as f32)];
                Ok(mesh)
            },
            "memory:test",
            FrameRange::new(2, 5),
        );

        assert_eq!(stream.range().num_frames(), 3);

        let mesh = stream.decode_frame(4).unwrap();
        assert_eq!(mesh.positions[0], glam::Vec3::splat(4.0));

        let err = stream.decode_frame(5).unwrap_err();
        assert!(matches!(err, Error::FrameOutOfRange { index: 5, .. }));
        assert!(stream.decode_frame(1).is_err());
    }

    #[test]
    fn test_stream_decode_propagates_errors() {
        let stream = FrameStream::new(
            |_path, _frame| Err(Error::invalid("corrupt frame")),
            "memory:test",
            FrameRange::new(0, 1),
        );
        assert!(matches!(
            stream.decode_frame(0),
            Err(Error::InvalidFrameData(_))
        ));
    }
}
