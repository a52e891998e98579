//! Default streaming backend.
//!
//! [`CachingStreamer`] implements [`crate::core::FrameStreamer`] with a
//! byte-budgeted decoded-frame cache per track ([`FrameCache`]) and
//! best-effort asynchronous prefetch on the rayon global pool.

mod cache;
mod streamer;

pub use cache::FrameCache;
pub use streamer::CachingStreamer;
