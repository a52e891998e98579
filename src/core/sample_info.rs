//! Lazily cached per-frame metadata.

use crate::geom::MeshData;
use crate::util::{BBox3f, Chrono};

/// Cached metadata for one frame of a track.
///
/// Cheap to copy; queried for culling and allocation sizing without
/// touching the decoded payload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleInfo {
    /// Playback time this slot was first queried at, stored verbatim.
    pub time: Chrono,
    /// Bounding box of the decoded frame.
    pub bounds: BBox3f,
    /// Vertex count of the decoded frame.
    pub num_vertices: u32,
    /// Index count of the decoded frame.
    pub num_indices: u32,
}

impl SampleInfo {
    /// Shared sentinel returned for degenerate ranges and failed decodes.
    pub const EMPTY: Self = Self {
        time: 0.0,
        bounds: BBox3f::ZERO,
        num_vertices: 0,
        num_indices: 0,
    };

    /// Build metadata from a decoded frame.
    ///
    /// `time` is the caller-supplied query time, not a recomputed sample
    /// time. Bounds fall back to a scan over positions when the decoder
    /// did not provide them.
    pub fn from_mesh(time: Chrono, mesh: &MeshData) -> Self {
        Self {
            time,
            bounds: mesh.bounds.unwrap_or_else(|| mesh.compute_bounds()),
            num_vertices: mesh.num_vertices() as u32,
            num_indices: mesh.num_indices() as u32,
        }
    }
}

/// Per-track table of lazily populated [`SampleInfo`] slots.
///
/// Presence is tracked explicitly per slot, so a legitimately empty frame
/// never collides with "not yet computed". Slots are populated once and
/// never refreshed - the cache is permanent for the session even if the
/// underlying stream changes.
#[derive(Debug, Default)]
pub struct SampleInfoTable {
    slots: Vec<Option<SampleInfo>>,
}

impl SampleInfoTable {
    /// Create an unallocated table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate `num_frames` empty slots on first use. No-op if the table
    /// is already allocated or `num_frames` is zero.
    pub fn ensure_allocated(&mut self, num_frames: usize) {
        if self.slots.is_empty() && num_frames > 0 {
            self.slots = vec![None; num_frames];
        }
    }

    /// Check whether the backing storage exists yet.
    pub fn is_allocated(&self) -> bool {
        !self.slots.is_empty()
    }

    /// Number of slots (zero before allocation).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the table has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Get the populated entry at `offset`, if any.
    pub fn get(&self, offset: usize) -> Option<&SampleInfo> {
        self.slots.get(offset).and_then(|slot| slot.as_ref())
    }

    /// Populate the slot at `offset`. First write wins: an already
    /// populated slot keeps its original entry.
    pub fn populate(&mut self, offset: usize, info: SampleInfo) -> &SampleInfo {
        self.slots[offset].get_or_insert(info)
    }
}
