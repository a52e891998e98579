//! Track state: resolves playback time to cached decoded geometry.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::{FrameRange, FrameStream, FrameStreamer, SampleInfo, SampleInfoTable, TrackId};
use crate::geom::MeshData;
use crate::util::{Chrono, FrameIndex, Result, FRAME_INDEX_NONE};

/// One animated-geometry stream, bound to a streaming backend.
///
/// A track turns continuous playback time into discrete frame fetches,
/// keeps the most recent decoded frame, and lazily caches per-frame
/// metadata. It is driven from a single owner thread (`&mut self`); the
/// backend does its own threading.
///
/// Construction registers the track with the backend, requests a prefetch
/// of the start frame, and synchronously warms up the first payload.
/// Dropping the track unregisters it, so no decode callback or stream
/// object outlives it.
pub struct GeometryTrack {
    id: TrackId,
    range: FrameRange,
    streamer: Arc<dyn FrameStreamer>,
    current: Option<Arc<MeshData>>,
    infos: SampleInfoTable,
}

impl GeometryTrack {
    /// Create a track over `range`, decoding frames of `source` with
    /// `decode` through the injected backend.
    pub fn new<F>(
        streamer: Arc<dyn FrameStreamer>,
        decode: F,
        source: impl Into<PathBuf>,
        range: FrameRange,
    ) -> Self
    where
        F: Fn(&Path, FrameIndex) -> Result<MeshData> + Send + Sync + 'static,
    {
        let id = TrackId::next();
        streamer.register(id, FrameStream::new(decode, source, range));

        let mut track = Self {
            id,
            range,
            streamer,
            current: None,
            infos: SampleInfoTable::new(),
        };
        if !range.is_empty() {
            track.streamer.prefetch(id, range.start);
            // Synchronous warm-up of the first frame
            track.current = track.streamer.try_get_frame(id, range.start);
        }
        track
    }

    /// Registration identity within the backend.
    pub fn id(&self) -> TrackId {
        self.id
    }

    /// Frame range of the stream.
    pub fn range(&self) -> FrameRange {
        self.range
    }

    /// Most recently fetched payload, if any frame has decoded yet.
    pub fn current_mesh(&self) -> Option<&MeshData> {
        self.current.as_deref()
    }

    /// Advance playback to `time` and fetch the frame it resolves to.
    ///
    /// `last_index` is the caller-held cursor, [`FRAME_INDEX_NONE`] before
    /// the first call; each evaluation site can keep its own. Returns the
    /// freshly fetched payload when the resolved index differs from the
    /// cursor and the backend produced the frame. Returns `None` when the
    /// index is unchanged, or on a failed fetch - then the cursor and the
    /// current payload keep their previous values and the caller reuses
    /// its last good frame.
    pub fn update_mesh_data(
        &mut self,
        time: Chrono,
        looping: bool,
        last_index: &mut FrameIndex,
    ) -> Option<&MeshData> {
        let index = self.range.frame_at_time(time, looping);
        if *last_index != FRAME_INDEX_NONE && index == *last_index {
            return None;
        }

        let mesh = self.fetch_frame(index)?;
        *last_index = index;
        self.current = Some(mesh);
        self.current.as_deref()
    }

    /// Metadata for the frame `time` resolves to.
    ///
    /// Degenerate ranges return the shared [`SampleInfo::EMPTY`] sentinel
    /// without allocating. The first query for a frame decodes it into a
    /// scratch payload and caches its bounds and counts permanently; the
    /// supplied `time` is stored verbatim. A failed decode leaves the slot
    /// unpopulated (retried on the next query) and returns the sentinel.
    pub fn sample_info(&mut self, time: Chrono, looping: bool) -> &SampleInfo {
        if self.range.is_empty() {
            return &SampleInfo::EMPTY;
        }
        self.infos.ensure_allocated(self.range.num_frames());

        let index = self.range.frame_at_time(time, looping);
        let offset = self.range.offset_of(index);

        if self.infos.get(offset).is_none() {
            if let Some(mesh) = self.fetch_frame(index) {
                let info = SampleInfo::from_mesh(time, &mesh);
                return self.infos.populate(offset, info);
            }
            return &SampleInfo::EMPTY;
        }
        self.infos.get(offset).unwrap_or(&SampleInfo::EMPTY)
    }

    /// Fetch a frame through the registration gate.
    ///
    /// An unregistered track fails closed without attempting a decode;
    /// at the call site that is indistinguishable from a transient decode
    /// failure.
    fn fetch_frame(&self, index: FrameIndex) -> Option<Arc<MeshData>> {
        if !self.streamer.is_registered(self.id) {
            return None;
        }
        self.streamer.try_get_frame(self.id, index)
    }
}

impl Drop for GeometryTrack {
    fn drop(&mut self) {
        self.streamer.unregister(self.id);
    }
}

impl fmt::Debug for GeometryTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeometryTrack")
            .field("id", &self.id)
            .field("range", &self.range)
            .field("has_mesh", &self.current.is_some())
            .finish()
    }
}
