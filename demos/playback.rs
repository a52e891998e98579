//! Streams a procedurally animated wave mesh through a track.
//!
//! Drives `update_mesh_data` at a fractional frame step with a one-frame
//! prefetch lookahead, the way an animation evaluator would, and reports
//! cache behavior at the end.
//!
//! ```sh
//! RUST_LOG=geomcache=trace cargo run --example playback
//! ```

use std::path::Path;
use std::sync::Arc;

use geomcache::prelude::*;
use geomcache::util::Vec3;
use tracing::info;
use tracing_subscriber::EnvFilter;

const GRID: usize = 32;
const FRAMES: i64 = 120;

/// Decode one frame of a sine-wave-deformed grid.
fn decode_wave(_source: &Path, frame: FrameIndex) -> Result<MeshData> {
    let phase = frame as f32 * 0.25;
    let mut mesh = MeshData::new();

    for z in 0..GRID {
        for x in 0..GRID {
            let (fx, fz) = (x as f32, z as f32);
            let y = ((fx * 0.4 + phase).sin() + (fz * 0.4 + phase).cos()) * 0.5;
            mesh.positions.push(Vec3::new(fx, y, fz));
        }
    }
    let n = GRID as u32;
    for z in 0..GRID as u32 - 1 {
        for x in 0..n - 1 {
            let i = z * n + x;
            mesh.indices
                .extend_from_slice(&[i, i + n, i + 1, i + 1, i + n, i + n + 1]);
        }
    }
    mesh.bounds = Some(mesh.compute_bounds());
    Ok(mesh)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let streamer = Arc::new(CachingStreamer::with_cache_size(64 * 1024 * 1024));
    let mut track = GeometryTrack::new(
        Arc::clone(&streamer) as Arc<dyn FrameStreamer>,
        decode_wave,
        "memory:wave",
        FrameRange::new(0, FRAMES),
    );

    info!(track = %track.id(), frames = FRAMES, "playback start");

    let mut cursor = FRAME_INDEX_NONE;
    let mut updates = 0usize;
    let mut ticks = 0usize;

    // 24 fps content driven at a non-integer step, like a host evaluator
    // running at a mismatched display rate.
    let mut time: Chrono = 0.0;
    while time < FRAMES as Chrono + 5.0 {
        if let Some(mesh) = track.update_mesh_data(time, false, &mut cursor) {
            updates += 1;
            let vertices = mesh.num_vertices();
            if updates % 24 == 0 {
                let bounds = track.sample_info(time, false).bounds;
                info!(frame = cursor, vertices, center_y = bounds.center().y, "frame");
            }
        }
        // Hint the next frame while the current one renders
        streamer.prefetch(track.id(), (cursor + 1).min(FRAMES - 1));

        ticks += 1;
        time += 0.45;
    }

    info!(
        ticks,
        updates,
        cached = streamer.cached_frames(track.id()),
        pending = streamer.pending_prefetches(track.id()),
        "playback done"
    );
}
