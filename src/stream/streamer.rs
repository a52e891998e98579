//! Caching streaming backend with asynchronous prefetch.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::core::{FrameStream, FrameStreamer, TrackId};
use crate::geom::MeshData;
use crate::stream::FrameCache;
use crate::util::FrameIndex;

/// Per-track backend state: the registered stream, its decoded-frame
/// cache, and the indices currently being prefetched.
struct TrackEntry {
    stream: FrameStream,
    cache: FrameCache,
    pending: Mutex<SmallVec<[FrameIndex; 8]>>,
}

impl TrackEntry {
    /// Decode `index` and publish it to the cache. Decode failures are
    /// absorbed: the caller sees `None` and keeps its previous frame.
    fn decode_into_cache(&self, index: FrameIndex) -> Option<Arc<MeshData>> {
        match self.stream.decode_frame(index) {
            Ok(mesh) => {
                let mesh = Arc::new(mesh);
                self.cache.insert(index, Arc::clone(&mesh));
                Some(mesh)
            }
            Err(err) => {
                debug!(frame = index, error = %err, "frame decode failed");
                None
            }
        }
    }
}

/// Default [`FrameStreamer`] implementation.
///
/// Keeps one [`FrameCache`] per registered track, serves fetches from it,
/// decodes synchronously on a miss, and runs prefetch decodes on the rayon
/// global pool. Shared between tracks and worker threads behind an `Arc`.
pub struct CachingStreamer {
    tracks: RwLock<HashMap<TrackId, Arc<TrackEntry>>>,
    cache_bytes: usize,
}

impl CachingStreamer {
    /// Create a streamer with the default per-track cache budget.
    pub fn new() -> Self {
        Self::with_cache_size(FrameCache::DEFAULT_MAX_BYTES)
    }

    /// Create a streamer with a per-track cache budget in bytes.
    pub fn with_cache_size(cache_bytes: usize) -> Self {
        Self {
            tracks: RwLock::new(HashMap::new()),
            cache_bytes,
        }
    }

    /// Number of registered tracks.
    pub fn num_tracks(&self) -> usize {
        self.tracks.read().len()
    }

    /// Number of decoded frames resident for a track.
    pub fn cached_frames(&self, id: TrackId) -> usize {
        self.tracks.read().get(&id).map_or(0, |e| e.cache.len())
    }

    /// Number of prefetch decodes still in flight for a track.
    pub fn pending_prefetches(&self, id: TrackId) -> usize {
        self.tracks.read().get(&id).map_or(0, |e| e.pending.lock().len())
    }

    fn entry(&self, id: TrackId) -> Option<Arc<TrackEntry>> {
        self.tracks.read().get(&id).cloned()
    }
}

impl Default for CachingStreamer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameStreamer for CachingStreamer {
    fn register(&self, id: TrackId, stream: FrameStream) {
        debug!(track = %id, source = %stream.source().display(), "register track");
        let entry = Arc::new(TrackEntry {
            stream,
            cache: FrameCache::new(self.cache_bytes),
            pending: Mutex::new(SmallVec::new()),
        });
        if self.tracks.write().insert(id, entry).is_some() {
            warn!(track = %id, "replaced existing stream registration");
        }
    }

    fn unregister(&self, id: TrackId) {
        if self.tracks.write().remove(&id).is_some() {
            debug!(track = %id, "unregister track");
        }
    }

    fn is_registered(&self, id: TrackId) -> bool {
        self.tracks.read().contains_key(&id)
    }

    fn try_get_frame(&self, id: TrackId, index: FrameIndex) -> Option<Arc<MeshData>> {
        // Fails closed: unregistered tracks never reach the decoder
        let entry = self.entry(id)?;

        if let Some(mesh) = entry.cache.get(index) {
            trace!(track = %id, frame = index, "cache hit");
            return Some(mesh);
        }
        entry.decode_into_cache(index)
    }

    fn prefetch(&self, id: TrackId, index: FrameIndex) {
        let Some(entry) = self.entry(id) else {
            return;
        };
        if entry.cache.get(index).is_some() {
            return;
        }
        {
            let mut pending = entry.pending.lock();
            if pending.contains(&index) {
                return;
            }
            pending.push(index);
        }

        trace!(track = %id, frame = index, "prefetch scheduled");
        rayon::spawn(move || {
            entry.decode_into_cache(index);
            entry.pending.lock().retain(|i| *i != index);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FrameRange;
    use crate::geom::safe_cast_slice;
    use crate::util::{Error, Result, Vec3};
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn frame_mesh(frame: FrameIndex) -> MeshData {
        let mut mesh = MeshData::new();
        mesh.positions = vec![Vec3::splat(frame as f32); 3];
        mesh.indices = vec![0, 1, 2];
        mesh
    }

    fn counting_stream(range: FrameRange, counter: Arc<AtomicUsize>) -> FrameStream {
        FrameStream::new(
            move |_path, frame| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(frame_mesh(frame))
            },
            "memory:counting",
            range,
        )
    }

    fn wait_for_prefetch(streamer: &CachingStreamer, id: TrackId) {
        for _ in 0..2000 {
            if streamer.pending_prefetches(id) == 0 {
                return;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        panic!("prefetch did not settle");
    }

    #[test]
    fn test_register_unregister() {
        let streamer = CachingStreamer::new();
        let id = TrackId::next();
        assert!(!streamer.is_registered(id));

        streamer.register(id, counting_stream(FrameRange::new(0, 10), Arc::default()));
        assert!(streamer.is_registered(id));
        assert_eq!(streamer.num_tracks(), 1);

        streamer.unregister(id);
        assert!(!streamer.is_registered(id));

        // Idempotent
        streamer.unregister(id);
        assert_eq!(streamer.num_tracks(), 0);
    }

    #[test]
    fn test_fetch_unregistered_fails_closed() {
        let counter = Arc::new(AtomicUsize::new(0));
        let streamer = CachingStreamer::new();
        let id = TrackId::next();

        assert!(streamer.try_get_frame(id, 0).is_none());

        streamer.register(id, counting_stream(FrameRange::new(0, 10), Arc::clone(&counter)));
        streamer.unregister(id);

        assert!(streamer.try_get_frame(id, 0).is_none());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_fetch_decodes_once_then_hits_cache() {
        let counter = Arc::new(AtomicUsize::new(0));
        let streamer = CachingStreamer::new();
        let id = TrackId::next();
        streamer.register(id, counting_stream(FrameRange::new(0, 10), Arc::clone(&counter)));

        let first = streamer.try_get_frame(id, 4).expect("decoded frame");
        assert_eq!(first.positions[0], Vec3::splat(4.0));
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        let second = streamer.try_get_frame(id, 4).expect("cached frame");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fetch_out_of_range_fails() {
        let streamer = CachingStreamer::new();
        let id = TrackId::next();
        streamer.register(id, counting_stream(FrameRange::new(0, 10), Arc::default()));

        assert!(streamer.try_get_frame(id, 10).is_none());
        assert!(streamer.try_get_frame(id, -1).is_none());
    }

    #[test]
    fn test_decode_failure_absorbed() {
        let streamer = CachingStreamer::new();
        let id = TrackId::next();
        streamer.register(
            id,
            FrameStream::new(
                |_path, frame| {
                    if frame % 2 == 1 {
                        Err(Error::invalid("odd frames are corrupt"))
                    } else {
                        Ok(frame_mesh(frame))
                    }
                },
                "memory:flaky",
                FrameRange::new(0, 10),
            ),
        );

        assert!(streamer.try_get_frame(id, 1).is_none());
        assert!(streamer.try_get_frame(id, 2).is_some());
        // The failed frame is not cached and is retried on the next fetch
        assert_eq!(streamer.cached_frames(id), 1);
    }

    #[test]
    fn test_prefetch_lands_frame() {
        let counter = Arc::new(AtomicUsize::new(0));
        let streamer = CachingStreamer::new();
        let id = TrackId::next();
        streamer.register(id, counting_stream(FrameRange::new(0, 10), Arc::clone(&counter)));

        streamer.prefetch(id, 6);
        wait_for_prefetch(&streamer, id);

        assert_eq!(streamer.cached_frames(id), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        // The fetch is served from cache, no second decode
        assert!(streamer.try_get_frame(id, 6).is_some());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_prefetch_unregistered_is_noop() {
        let streamer = CachingStreamer::new();
        let id = TrackId::next();
        streamer.prefetch(id, 0);
        assert_eq!(streamer.pending_prefetches(id), 0);
        assert_eq!(streamer.cached_frames(id), 0);
    }

    #[test]
    fn test_prefetch_cached_frame_skipped() {
        let counter = Arc::new(AtomicUsize::new(0));
        let streamer = CachingStreamer::new();
        let id = TrackId::next();
        streamer.register(id, counting_stream(FrameRange::new(0, 10), Arc::clone(&counter)));

        streamer.try_get_frame(id, 3);
        streamer.prefetch(id, 3);

        assert_eq!(streamer.pending_prefetches(id), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_decode_from_file_source() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("rest_positions.bin");

        let rest = [
            0.0f32, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0,
        ];
        std::fs::write(&path, bytemuck::cast_slice::<f32, u8>(&rest)).expect("write frame data");

        // Reads the rest pose from disk and offsets it per frame
        let decode = |path: &Path, frame: FrameIndex| -> Result<MeshData> {
            let raw = std::fs::read(path)?;
            let floats: &[f32] =
                safe_cast_slice(&raw).ok_or_else(|| Error::invalid("misaligned position data"))?;

            let mut mesh = MeshData::new();
            mesh.positions = floats
                .chunks_exact(3)
                .map(|c| Vec3::new(c[0], c[1], c[2]) + Vec3::Y * frame as f32)
                .collect();
            mesh.indices = vec![0, 1, 2];
            Ok(mesh)
        };

        let streamer = CachingStreamer::new();
        let id = TrackId::next();
        streamer.register(id, FrameStream::new(decode, &path, FrameRange::new(0, 5)));

        let mesh = streamer.try_get_frame(id, 2).expect("decoded from file");
        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.positions[1], Vec3::new(1.0, 2.0, 0.0));

        // A vanished source surfaces as "no frame", not a panic
        drop(dir);
        assert!(streamer.try_get_frame(id, 3).is_none());
    }
}
