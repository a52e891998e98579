//! Decoded-frame cache.
//!
//! Holds the decoded payloads of one track, keyed by frame index, so
//! repeated fetches and prefetched frames are served without re-decoding.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::geom::MeshData;
use crate::util::FrameIndex;

/// Thread-safe cache of decoded frames for a single track.
///
/// Uses `parking_lot::RwLock` for fast, non-poisoning locks and an
/// `AtomicUsize` for lock-free size tracking.
pub struct FrameCache {
    /// Cache storage.
    frames: RwLock<HashMap<FrameIndex, Arc<MeshData>>>,
    /// Maximum cache size in bytes.
    max_bytes: usize,
    /// Current cache size in bytes.
    current_bytes: AtomicUsize,
}

impl FrameCache {
    /// Default cache budget per track (256 MiB).
    pub const DEFAULT_MAX_BYTES: usize = 256 * 1024 * 1024;

    /// Create a cache with the given maximum size in bytes.
    pub fn new(max_bytes: usize) -> Self {
        Self {
            frames: RwLock::new(HashMap::new()),
            max_bytes,
            current_bytes: AtomicUsize::new(0),
        }
    }

    /// Get a cached frame if it exists.
    #[inline]
    pub fn get(&self, index: FrameIndex) -> Option<Arc<MeshData>> {
        let frames = self.frames.read();
        frames.get(&index).map(Arc::clone)
    }

    /// Insert a decoded frame.
    ///
    /// Frames larger than the whole budget are not cached. Crossing the
    /// budget evicts roughly half the resident frames first. Duplicate
    /// inserts for an index already cached are dropped.
    pub fn insert(&self, index: FrameIndex, mesh: Arc<MeshData>) {
        let size = mesh.byte_size();

        if size > self.max_bytes {
            return;
        }

        // Relaxed ordering is fine for an eviction heuristic
        let current = self.current_bytes.load(Ordering::Relaxed);
        if current + size > self.max_bytes {
            self.evict_some();
        }

        let mut frames = self.frames.write();
        if frames.contains_key(&index) {
            return;
        }

        frames.insert(index, mesh);
        self.current_bytes.fetch_add(size, Ordering::Relaxed);
    }

    /// Evict approximately half of the cached frames.
    fn evict_some(&self) {
        let mut frames = self.frames.write();
        let keys: Vec<_> = frames.keys().copied().collect();
        let evict_count = keys.len() / 2;

        let mut evicted_bytes = 0;
        for key in keys.into_iter().take(evict_count) {
            if let Some(mesh) = frames.remove(&key) {
                evicted_bytes += mesh.byte_size();
            }
        }

        let _ = self.current_bytes.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |x| {
            Some(x.saturating_sub(evicted_bytes))
        });
    }

    /// Drop every cached frame.
    pub fn clear(&self) {
        let mut frames = self.frames.write();
        frames.clear();
        self.current_bytes.store(0, Ordering::Relaxed);
    }

    /// Number of cached frames.
    #[inline]
    pub fn len(&self) -> usize {
        self.frames.read().len()
    }

    /// Check if the cache is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current cache size in bytes.
    #[inline]
    pub fn bytes(&self) -> usize {
        self.current_bytes.load(Ordering::Relaxed)
    }

    /// Maximum cache size in bytes.
    #[inline]
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }
}

impl Default for FrameCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_BYTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn mesh_with_vertices(n: usize) -> Arc<MeshData> {
        let mut mesh = MeshData::new();
        mesh.positions = vec![Vec3::ZERO; n];
        Arc::new(mesh)
    }

    #[test]
    fn test_cache_insert_get() {
        let cache = FrameCache::new(1024);
        let mesh = mesh_with_vertices(4);

        cache.insert(7, Arc::clone(&mesh));

        let hit = cache.get(7).expect("cached frame");
        assert!(Arc::ptr_eq(&hit, &mesh));
        assert_eq!(cache.bytes(), mesh.byte_size());
    }

    #[test]
    fn test_cache_miss() {
        let cache = FrameCache::new(1024);
        assert!(cache.get(0).is_none());
    }

    #[test]
    fn test_cache_duplicate_insert_dropped() {
        let cache = FrameCache::new(1024);
        cache.insert(3, mesh_with_vertices(2));
        cache.insert(3, mesh_with_vertices(8));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(3).unwrap().num_vertices(), 2);
    }

    #[test]
    fn test_cache_clear() {
        let cache = FrameCache::new(1024);
        cache.insert(0, mesh_with_vertices(4));
        assert!(!cache.is_empty());

        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.bytes(), 0);
        assert!(cache.get(0).is_none());
    }

    #[test]
    fn test_cache_eviction() {
        // Budget for about five 12-byte frames
        let cache = FrameCache::new(60);

        for i in 0..10 {
            cache.insert(i, mesh_with_vertices(1));
        }

        assert!(cache.len() <= 5);
    }

    #[test]
    fn test_cache_skip_oversized() {
        let cache = FrameCache::new(100);

        // 20 vertices = 240 bytes, larger than the whole budget
        cache.insert(0, mesh_with_vertices(20));

        assert!(cache.get(0).is_none());
        assert_eq!(cache.bytes(), 0);
    }
}
